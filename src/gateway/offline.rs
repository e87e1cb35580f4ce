use super::{
    AnonymizeSpec, ConvertSpec, EngineEventBus, EngineGateway, EventStream, GatewayError,
};
use crate::model::{
    AnonymizationReport, ConversionReport, FileDescriptor, TagDetails, TagId, TagRow, TagStat,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stand-in gateway for builds without an engine backend attached. Every
/// operation reports the engine as unavailable, which the workbench surfaces
/// as a blocking error state; the event stream stays open but silent.
#[derive(Default)]
pub struct OfflineGateway {
    events: EngineEventBus,
}

impl OfflineGateway {
    pub fn shared() -> Arc<dyn EngineGateway> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl EngineGateway for OfflineGateway {
    async fn list_records(&self, _folder: &Path) -> Result<Vec<PathBuf>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn list_file_descriptors(
        &self,
        _folder: &Path,
    ) -> Result<Vec<FileDescriptor>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn tags(&self, _file: &Path) -> Result<Vec<TagRow>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn tag_details(&self, _folder: &Path, _id: TagId) -> Result<TagDetails, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn pinned_tag_stats(
        &self,
        _folder: &Path,
        _ids: &[TagId],
    ) -> Result<Vec<TagStat>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn anonymize(&self, _spec: AnonymizeSpec) -> Result<AnonymizationReport, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn convert(&self, _spec: ConvertSpec) -> Result<ConversionReport, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    fn events(&self) -> EventStream {
        self.events.stream()
    }
}
