//! 连接目录公共模块
//!
//! 各服务共享的模型、错误、配置、响应封装与中间件。

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
