//! Domain models for the Cold Storage Inventory backend

mod movement;
mod report;
mod snapshot;
mod stock;
mod supplier;

pub use movement::*;
pub use report::*;
pub use snapshot::*;
pub use stock::*;
pub use supplier::*;
