//! Campaign attribution — touchpoint ingestion, organic-vs-paid credit
//! assignment across three weighting models, and per-campaign reports.

pub mod attribution;
pub mod models;
pub mod store;

pub use attribution::AttributionService;
pub use store::{EventStore, InMemoryEventStore};
