pub mod bus;
pub mod offline;

use crate::model::{
    AnonymizationReport, ConversionReport, FileDescriptor, LogEntry, ProgressEvent,
    ScanProgress, TagDetails, TagId, TagRow, TagStat,
};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use bus::EngineEventBus;
pub use offline::OfflineGateway;

/// An invocation failure at the engine boundary. Partial failures inside a
/// completed stage are reported as data, never as this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("engine backend is not attached")]
    Unavailable,
    #[error("{operation} rejected by engine: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("engine connection lost: {0}")]
    Disconnected(String),
}

/// Everything the engine emits while work is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AnonymizationProgress(ProgressEvent),
    ConversionProgress(ProgressEvent),
    Log(LogEntry),
    TagScanProgress(ScanProgress),
}

pub type EventStream = BoxStream<'static, EngineEvent>;

/// Programmatic form of the engine's `anonymize` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizeSpec {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tags: Vec<TagId>,
    pub replacement: String,
}

/// Programmatic form of the engine's `convert` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSpec {
    pub input: PathBuf,
    pub output: PathBuf,
    pub skip_excel: bool,
    pub flatten: bool,
}

/// Narrow seam to the engine process: one request/response call per
/// operation, plus a subscription to its event stream. Implementations live
/// outside this crate; the workbench only holds `Arc<dyn EngineGateway>`.
#[async_trait]
pub trait EngineGateway: Send + Sync {
    async fn list_records(&self, folder: &Path) -> Result<Vec<PathBuf>, GatewayError>;

    async fn list_file_descriptors(
        &self,
        folder: &Path,
    ) -> Result<Vec<FileDescriptor>, GatewayError>;

    async fn tags(&self, file: &Path) -> Result<Vec<TagRow>, GatewayError>;

    async fn tag_details(&self, folder: &Path, id: TagId) -> Result<TagDetails, GatewayError>;

    async fn pinned_tag_stats(
        &self,
        folder: &Path,
        ids: &[TagId],
    ) -> Result<Vec<TagStat>, GatewayError>;

    async fn anonymize(&self, spec: AnonymizeSpec) -> Result<AnonymizationReport, GatewayError>;

    async fn convert(&self, spec: ConvertSpec) -> Result<ConversionReport, GatewayError>;

    fn events(&self) -> EventStream;
}
