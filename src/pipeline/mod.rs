pub mod orchestrator;
pub mod progress;

pub use orchestrator::{
    chain_conversion, run_pipeline, PipelineError, PipelineRequest, RunState, StageKind,
    ANONYMIZED_SUBDIR,
};
pub use progress::ProgressAggregator;
