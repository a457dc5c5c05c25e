//! Plot types.
//!
//! Time-series plots translate samples into stroked paths with explicit gap
//! and line-style policy.

mod timeseries;

pub use timeseries::{
    parse_timestamp, runs, step_path, LineStyle, LocalClock, Sample, Series, TimeSeriesPlot,
};
