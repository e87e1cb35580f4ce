pub mod explorer_panel;
pub mod pipeline_panel;
pub mod stats_panel;

pub use explorer_panel::{explorer_panel, tag_table_id};
pub use pipeline_panel::pipeline_panel;
pub use stats_panel::stats_panel;
