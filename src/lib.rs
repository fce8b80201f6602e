//! Vehicle listing data for the sales dashboard: loading, a TTL cache,
//! the preparation pipeline and the chart models the UI draws from.

pub mod chart;
pub mod config;
pub mod data;
pub mod error;

pub use error::{DataError, Result};
