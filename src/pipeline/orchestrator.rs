use crate::gateway::{AnonymizeSpec, ConvertSpec, EngineGateway, GatewayError};
use crate::model::{AnonymizationReport, PipelineRun};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Subfolder (below an anonymization run's output root) where the engine
/// places the anonymized records themselves.
pub const ANONYMIZED_SUBDIR: &str = "dicom_file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Anonymization,
    Conversion,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Anonymization => write!(f, "anonymization"),
            StageKind::Conversion => write!(f, "conversion"),
        }
    }
}

/// What one run should do; at least one stage must be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineRequest {
    pub anonymize: Option<AnonymizeSpec>,
    pub convert: Option<ConvertSpec>,
}

impl PipelineRequest {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.anonymize.is_none() && self.convert.is_none() {
            return Err(PipelineError::NoStagesRequested);
        }
        Ok(())
    }

    pub fn first_stage(&self) -> Option<StageKind> {
        if self.anonymize.is_some() {
            Some(StageKind::Anonymization)
        } else if self.convert.is_some() {
            Some(StageKind::Conversion)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("nothing to run: enable at least one stage")]
    NoStagesRequested,
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: StageKind,
        #[source]
        source: GatewayError,
    },
}

/// Orchestrator lifecycle. `Failed` is reached only on remote-call
/// rejection; a report with nonzero failure counts is a partial result and
/// still completes the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Anonymizing,
    Converting,
    Complete,
    Failed,
}

impl RunState {
    pub fn is_running(self) -> bool {
        matches!(self, RunState::Anonymizing | RunState::Converting)
    }

    /// Enters the first requested stage. Rejects re-entry while a run is in
    /// flight and empty requests before any remote call is issued.
    pub fn begin(&mut self, request: &PipelineRequest) -> Result<(), PipelineError> {
        if self.is_running() {
            return Err(PipelineError::AlreadyRunning);
        }
        request.validate()?;

        *self = match request.first_stage() {
            Some(StageKind::Anonymization) => RunState::Anonymizing,
            _ => RunState::Converting,
        };
        Ok(())
    }

    /// Advances on observed stage activity. Stage-one events arriving after
    /// stage two started never move the state backwards.
    pub fn observe_stage(&mut self, stage: StageKind) {
        if *self == RunState::Anonymizing && stage == StageKind::Conversion {
            *self = RunState::Converting;
        }
    }

    pub fn complete(&mut self) {
        if self.is_running() {
            *self = RunState::Complete;
        }
    }

    pub fn fail(&mut self) {
        if self.is_running() {
            *self = RunState::Failed;
        }
    }

    pub fn reset(&mut self) {
        *self = RunState::Idle;
    }
}

/// Rewrites a conversion spec to consume an anonymization run's output: the
/// anonymized records under `ANONYMIZED_SUBDIR` become the input, the
/// conversion lands in the same output root, and flattening is forced so
/// the run's folder naming is not nested a second time.
pub fn chain_conversion(spec: &ConvertSpec, report: &AnonymizationReport) -> ConvertSpec {
    ConvertSpec {
        input: report.output_folder.join(ANONYMIZED_SUBDIR),
        output: report.output_folder.clone(),
        skip_excel: spec.skip_excel,
        flatten: true,
    }
}

/// Drives the requested stages in order. Anonymization runs first when both
/// are requested, and its report rewires the conversion stage. A stage
/// whose report carries failures is carried forward as data; only a
/// rejected remote call aborts the run (no conversion call is made after an
/// anonymization rejection).
pub async fn run_pipeline(
    gateway: Arc<dyn EngineGateway>,
    request: PipelineRequest,
) -> Result<PipelineRun, PipelineError> {
    request.validate()?;

    let mut run = PipelineRun::default();

    if let Some(spec) = &request.anonymize {
        log::info!("anonymization stage starting: {}", spec.input.display());
        let report = gateway
            .anonymize(spec.clone())
            .await
            .map_err(|source| PipelineError::Stage {
                stage: StageKind::Anonymization,
                source,
            })?;
        log::info!(
            "anonymization stage done: {}/{} succeeded, {} failed",
            report.successful,
            report.total,
            report.failed
        );
        run.anonymization = Some(report);
    }

    if let Some(spec) = &request.convert {
        // A total anonymization failure still flows into conversion; the
        // conversion report makes the damage visible instead of hiding it.
        let spec = match &run.anonymization {
            Some(report) => chain_conversion(spec, report),
            None => spec.clone(),
        };

        log::info!("conversion stage starting: {}", spec.input.display());
        let report = gateway
            .convert(spec)
            .await
            .map_err(|source| PipelineError::Stage {
                stage: StageKind::Conversion,
                source,
            })?;
        log::info!(
            "conversion stage done: {}/{} succeeded, {} failed",
            report.successful,
            report.total,
            report.failed
        );
        run.conversion = Some(report);
    }

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{EngineEvent, EventStream};
    use crate::model::{
        ConversionReport, FileDescriptor, TagDetails, TagId, TagRow, TagStat,
    };
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct ScriptedGateway {
        anonymize_result: Mutex<Option<Result<AnonymizationReport, GatewayError>>>,
        convert_result: Mutex<Option<Result<ConversionReport, GatewayError>>>,
        anonymize_calls: Mutex<Vec<AnonymizeSpec>>,
        convert_calls: Mutex<Vec<ConvertSpec>>,
    }

    impl ScriptedGateway {
        fn new(
            anonymize: Option<Result<AnonymizationReport, GatewayError>>,
            convert: Option<Result<ConversionReport, GatewayError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                anonymize_result: Mutex::new(anonymize),
                convert_result: Mutex::new(convert),
                anonymize_calls: Mutex::new(Vec::new()),
                convert_calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EngineGateway for ScriptedGateway {
        async fn list_records(&self, _folder: &Path) -> Result<Vec<PathBuf>, GatewayError> {
            Ok(Vec::new())
        }

        async fn list_file_descriptors(
            &self,
            _folder: &Path,
        ) -> Result<Vec<FileDescriptor>, GatewayError> {
            Ok(Vec::new())
        }

        async fn tags(&self, _file: &Path) -> Result<Vec<TagRow>, GatewayError> {
            Ok(Vec::new())
        }

        async fn tag_details(
            &self,
            _folder: &Path,
            _id: TagId,
        ) -> Result<TagDetails, GatewayError> {
            Err(GatewayError::Unavailable)
        }

        async fn pinned_tag_stats(
            &self,
            _folder: &Path,
            _ids: &[TagId],
        ) -> Result<Vec<TagStat>, GatewayError> {
            Ok(Vec::new())
        }

        async fn anonymize(
            &self,
            spec: AnonymizeSpec,
        ) -> Result<AnonymizationReport, GatewayError> {
            self.anonymize_calls.lock().unwrap().push(spec);
            self.anonymize_result
                .lock()
                .unwrap()
                .take()
                .expect("unexpected anonymize call")
        }

        async fn convert(&self, spec: ConvertSpec) -> Result<ConversionReport, GatewayError> {
            self.convert_calls.lock().unwrap().push(spec);
            self.convert_result
                .lock()
                .unwrap()
                .take()
                .expect("unexpected convert call")
        }

        fn events(&self) -> EventStream {
            futures_util::stream::empty::<EngineEvent>().boxed()
        }
    }

    fn anonymize_spec() -> AnonymizeSpec {
        AnonymizeSpec {
            input: PathBuf::from("/data/in"),
            output: PathBuf::from("/data/out"),
            tags: vec![TagId::new(0x0010, 0x0010)],
            replacement: "ANONYMIZED".to_string(),
        }
    }

    fn convert_spec() -> ConvertSpec {
        ConvertSpec {
            input: PathBuf::from("/data/in"),
            output: PathBuf::from("/data/png"),
            skip_excel: false,
            flatten: false,
        }
    }

    fn anonymize_report(total: usize, failed: usize) -> AnonymizationReport {
        AnonymizationReport {
            total,
            successful: total - failed,
            failed,
            output_folder: PathBuf::from("/data/out/in_output"),
            ..AnonymizationReport::default()
        }
    }

    #[tokio::test]
    async fn empty_request_is_rejected_before_any_call() {
        let gateway = ScriptedGateway::new(None, None);
        let result = run_pipeline(gateway.clone(), PipelineRequest::default()).await;

        assert_eq!(result, Err(PipelineError::NoStagesRequested));
        assert!(gateway.anonymize_calls.lock().unwrap().is_empty());
        assert!(gateway.convert_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymize_only_run_has_no_conversion_report() {
        let gateway = ScriptedGateway::new(Some(Ok(anonymize_report(10, 2))), None);
        let request = PipelineRequest {
            anonymize: Some(anonymize_spec()),
            convert: None,
        };

        let run = run_pipeline(gateway.clone(), request).await.unwrap();
        assert!(run.conversion.is_none());
        assert_eq!(run.anonymization.unwrap().failed, 2);
        assert!(gateway.convert_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn convert_only_run_passes_the_spec_through_verbatim() {
        let gateway = ScriptedGateway::new(None, Some(Ok(ConversionReport::default())));
        let request = PipelineRequest {
            anonymize: None,
            convert: Some(convert_spec()),
        };

        run_pipeline(gateway.clone(), request).await.unwrap();
        let calls = gateway.convert_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[convert_spec()]);
    }

    #[tokio::test]
    async fn both_stages_chain_conversion_into_the_anonymized_output() {
        let gateway = ScriptedGateway::new(
            Some(Ok(anonymize_report(10, 0))),
            Some(Ok(ConversionReport::default())),
        );
        let request = PipelineRequest {
            anonymize: Some(anonymize_spec()),
            convert: Some(convert_spec()),
        };

        let run = run_pipeline(gateway.clone(), request).await.unwrap();
        let anonymization = run.anonymization.unwrap();

        let calls = gateway.convert_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].input,
            anonymization.output_folder.join(ANONYMIZED_SUBDIR)
        );
        assert_eq!(calls[0].output, anonymization.output_folder);
        // The caller asked for flatten = false; chaining forces it on.
        assert!(calls[0].flatten);
        assert!(!calls[0].skip_excel);
    }

    #[tokio::test]
    async fn total_stage_one_failure_still_runs_stage_two() {
        let gateway = ScriptedGateway::new(
            Some(Ok(anonymize_report(5, 5))),
            Some(Ok(ConversionReport::default())),
        );
        let request = PipelineRequest {
            anonymize: Some(anonymize_spec()),
            convert: Some(convert_spec()),
        };

        let run = run_pipeline(gateway.clone(), request).await.unwrap();
        assert_eq!(run.anonymization.unwrap().failed, 5);
        assert!(run.conversion.is_some());
        assert_eq!(gateway.convert_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stage_one_rejection_aborts_before_stage_two() {
        let gateway = ScriptedGateway::new(
            Some(Err(GatewayError::Rejected {
                operation: "anonymize",
                message: "input folder does not exist".to_string(),
            })),
            Some(Ok(ConversionReport::default())),
        );
        let request = PipelineRequest {
            anonymize: Some(anonymize_spec()),
            convert: Some(convert_spec()),
        };

        let result = run_pipeline(gateway.clone(), request).await;
        assert!(matches!(
            result,
            Err(PipelineError::Stage {
                stage: StageKind::Anonymization,
                ..
            })
        ));
        assert!(gateway.convert_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn run_state_rejects_reentry_while_running() {
        let request = PipelineRequest {
            anonymize: Some(anonymize_spec()),
            convert: None,
        };

        let mut state = RunState::default();
        state.begin(&request).unwrap();
        assert_eq!(state, RunState::Anonymizing);
        assert_eq!(state.begin(&request), Err(PipelineError::AlreadyRunning));

        state.complete();
        assert_eq!(state, RunState::Complete);
        // A finished run may start again.
        state.begin(&request).unwrap();
    }

    #[test]
    fn run_state_advances_but_never_regresses() {
        let mut state = RunState::Anonymizing;
        state.observe_stage(StageKind::Anonymization);
        assert_eq!(state, RunState::Anonymizing);

        state.observe_stage(StageKind::Conversion);
        assert_eq!(state, RunState::Converting);

        // A late stage-one event is tolerated without corrupting the state.
        state.observe_stage(StageKind::Anonymization);
        assert_eq!(state, RunState::Converting);
    }

    #[test]
    fn run_state_fails_only_from_running() {
        let mut state = RunState::Idle;
        state.fail();
        assert_eq!(state, RunState::Idle);

        let mut state = RunState::Converting;
        state.fail();
        assert_eq!(state, RunState::Failed);
    }

    #[test]
    fn convert_only_request_begins_in_converting() {
        let request = PipelineRequest {
            anonymize: None,
            convert: Some(convert_spec()),
        };
        let mut state = RunState::default();
        state.begin(&request).unwrap();
        assert_eq!(state, RunState::Converting);
    }
}
