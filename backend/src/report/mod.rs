//! Stock report rendering

pub mod layout;
pub mod pdf;
pub mod renderer;

pub use layout::{Column, LayoutVariant, ReportLayout};
pub use renderer::{RemarkPolicy, RenderedReport, ReportRenderer, ReportTotals};
