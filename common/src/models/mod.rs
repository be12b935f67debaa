//! Shared data models for the directory services.

pub mod connection;
pub mod selection;

// Re-export commonly used types
pub use connection::{ConnectionRecord, Driver, Password};
pub use selection::{SelectionCatalog, SelectionCriterion};
