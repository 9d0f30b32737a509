//! Shared types and models for the Cold Storage Inventory backend
//!
//! This crate contains the domain models, the active-stock selection window
//! and the number/text formatting rules used by the report pipeline. It does
//! no I/O so it can be reused by any front end or tool.

pub mod format;
pub mod models;
pub mod selection;
pub mod types;

pub use format::*;
pub use models::*;
pub use selection::*;
pub use types::*;
