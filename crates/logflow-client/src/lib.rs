//! LogFlow client - typed backend access and resilient polling
//!
//! [`api`] wraps every backend HTTP capability behind one method each and
//! classifies all failures into the shared [`logflow_core::ApiError`]
//! taxonomy. [`poll`] schedules repeated fetches with backpressure and a
//! cancellation guarantee. Neither layer retries: one-shot callers see
//! their error directly, periodic callers ride the next tick.

pub mod api;
pub mod poll;

pub use api::{ApiClient, Attachment};
pub use poll::Poller;
