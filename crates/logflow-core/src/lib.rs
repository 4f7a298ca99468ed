//! LogFlow core - data model and cross-view coordination
//!
//! Everything the console views share lives here: the log/metric data
//! model, civil-time normalization, citation scanning, degraded-mode
//! fallback data, the window/highlight coordinator, and local report
//! rendering. This crate performs no I/O of its own.

pub mod citation;
pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod report;
pub mod timeconv;
pub mod types;

pub use citation::*;
pub use coordinator::*;
pub use error::*;
pub use fallback::*;
pub use timeconv::*;
pub use types::*;
