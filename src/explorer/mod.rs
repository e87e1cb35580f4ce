pub mod stats;
pub mod view;
pub mod window;

pub use stats::{rank_values, summarize, RankedTagStat, ValueShare, TOP_VALUES};
pub use view::derive_view;
pub use window::{window, RowExtents, RowWindow, DEFAULT_OVERSCAN};
