//! insights-core: customer-segmentation analytics over batch run results.
//!
//! Turns one run's cluster summary and recommendation list into
//! persona-labelled cluster statistics, ranked sales opportunities and a
//! searchable recommendation listing.

pub mod aggregator;
pub mod comparison;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod filter;
pub mod format;
pub mod kpi;
pub mod model;
pub mod name_generator;
pub mod opportunity;
pub mod persona;
pub mod poller;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod types;

pub use engine::InsightsEngine;
pub use error::{InsightsError, InsightsResult};
pub use persona::Persona;
pub use snapshot::RunSnapshot;
pub use store::InsightsStore;
