//! Client side of the connection directory.
//!
//! - [`ConnectionDirectory`] / [`HttpDirectoryClient`]: check, list, create,
//!   update and delete connection records over the REST contract.
//! - [`SelectionForm`]: pick a table and some of its columns, then hand the
//!   resulting [`SelectionCriterion`](common::models::SelectionCriterion) to a
//!   callback.

pub mod client;
pub mod error;
pub mod selection;

pub use client::{ConnectionDirectory, HttpDirectoryClient};
pub use error::{DirectoryError, DirectoryResult, SelectionError};
pub use selection::{load_catalog, SelectionForm};
