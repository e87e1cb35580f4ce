pub mod pins;
pub mod report;
pub mod tag;

pub use pins::{PinSet, DEFAULT_PINS};
pub use report::{
    AnonymizationReport, ConversionReport, ConversionType, FileDescriptor, LogEntry,
    PipelineRun, ProgressEvent, ProgressStatus, ScanProgress, TagDetails, TagStat,
    TagValueDetail,
};
pub use tag::{parse_tag, parse_tag_list, TagId, TagParseError, TagRow};

/// Which surface of the workbench is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkbenchMode {
    #[default]
    Explorer,
    Pipeline,
}
