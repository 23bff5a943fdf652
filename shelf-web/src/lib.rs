//! Catalog acquisition: drive a "load more" page to exhaustion, then turn its
//! markup into [`shelf_common::Record`]s.
//!
//! - [`session`]: the browsing capability the core depends on
//! - [`browser`]: that capability backed by the fantoccini driver
//! - [`expand`]: the expansion loop
//! - [`extract`]: tolerant record extraction
//! - [`consent`], [`export`], [`harvest`]: the collaborators around the core

pub mod browser;
pub mod consent;
pub mod expand;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod session;

pub use expand::{DynamicContentExpander, ExpansionReport, Termination};
pub use export::{CsvSink, ExportError, RecordSink};
pub use extract::{Diagnostic, Extraction, ItemError, RecordExtractor};
pub use harvest::{CategoryReport, HarvestError, HarvestSummary, Harvester};
pub use session::{Activation, BrowsingSession, Lookup, SessionError, Wait};
