use crate::gateway::{EngineEvent, GatewayError};
use crate::model::{
    FileDescriptor, PipelineRun, TagDetails, TagId, TagRow, TagStat, WorkbenchMode,
};
use crate::pipeline::PipelineError;
use iced::widget::scrollable;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Message {
    SetMode(WorkbenchMode),
    DismissError,

    // Tag explorer
    PickTagRoot,
    TagRootPicked(Option<PathBuf>),
    RecordsLoaded(Result<Vec<FileDescriptor>, GatewayError>),
    SelectRecord(usize),
    TagsLoaded(usize, Result<Vec<TagRow>, GatewayError>),
    FilterChanged(String),
    TogglePin(TagId),
    TagTableScrolled(scrollable::Viewport),
    OpenStats,
    CloseStats,
    StatsLoaded(Result<Vec<TagStat>, GatewayError>),
    ShowTagDetails(TagId),
    TagDetailsLoaded(Result<TagDetails, GatewayError>),
    CloseTagDetails,

    // Pipeline
    PickInputFolder,
    InputFolderPicked(Option<PathBuf>),
    PickOutputFolder,
    OutputFolderPicked(Option<PathBuf>),
    SetAnonymizeEnabled(bool),
    SetConvertEnabled(bool),
    TagsInputChanged(String),
    ReplacementChanged(String),
    SetSkipExcel(bool),
    SetFlatten(bool),
    StartPipeline,
    PipelineFinished(Result<PipelineRun, PipelineError>),

    Engine(EngineEvent),
}
