//! Usage statistics: counters, running average and popularity maps.
//!
//! The [`StatisticsEngine`] persists everything through the shared key-value
//! store. Counter updates use the store's atomic increment; whole-value
//! updates (the running average, the frequency maps) go through
//! compare-and-swap loops so concurrent requests never lose an update.

mod engine;
mod frequency;

pub use engine::{
    format_average_ms, format_ratio, keys, StatisticsEngine, StatisticsSnapshot, ORIGINAL_LABEL,
};
pub use frequency::FrequencyMap;
