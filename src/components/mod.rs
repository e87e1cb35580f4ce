pub mod segmented_toggle;

pub use segmented_toggle::workbench_mode_toggle;
