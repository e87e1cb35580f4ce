pub mod formatting;

pub use formatting::{format_percentage, format_ratio, truncate_value};
