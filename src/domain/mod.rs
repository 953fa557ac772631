//! Core domain types
//!
//! Pure types with no I/O dependencies: errors, hardware tables, discovery
//! metadata and saved profiles.

pub mod config;
pub mod error;
pub mod tables;
pub mod types;

pub use config::*;
pub use error::*;
pub use tables::{DecimationTable, PortTable};
pub use types::*;
