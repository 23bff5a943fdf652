//! Driver layer for browser automation.
//!
//! This crate wraps a `fantoccini` WebDriver client and exposes the handful
//! of page operations the harvester needs, with "element missing", "not
//! clickable" and "timed out" reported as values instead of errors.
//!
//! - [`shelf_browser::driver::ShelfDriver`]: WebDriver session lifecycle
//! - [`shelf_browser::page::ShelfPage`]: element queries, bounded waits, clicks
//! - [`shelf_browser::options`]: Chrome capabilities built from configuration
pub mod shelf_browser;

pub use fantoccini::elements::Element;
pub use shelf_browser::driver::ShelfDriver;
pub use shelf_browser::page::{ClickOutcome, ShelfPage};
