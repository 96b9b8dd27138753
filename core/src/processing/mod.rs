pub mod aggregator;
pub mod parser;
pub mod smoothing;

pub use aggregator::BatchAggregator;
pub use parser::{parse_field, parse_line, parse_raw};
pub use smoothing::{moving_average, DEFAULT_WINDOW};
