//! Output renderers for per-root totals.
//!
//! # Available Formatters
//!
//! - **Terminal**: `<size>     <path>` lines, one per root, in input order
//! - **CSV**: `path,blocks,bytes` rows for further processing
//!
//! Both accept the totals exactly as the engine produced them and contain
//! no aggregation logic of their own.

pub mod csv;
pub mod terminal;

/// CSV output renderer function.
///
/// See [`csv::render`] for full documentation.
pub use csv::render as render_csv;

/// Terminal output renderer function.
///
/// See [`terminal::render`] for full documentation.
pub use terminal::render as render_terminal;
