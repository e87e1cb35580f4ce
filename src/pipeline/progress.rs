use super::orchestrator::StageKind;
use crate::gateway::EngineEvent;
use crate::model::{LogEntry, ProgressEvent, ScanProgress};

/// Merges the engine's event streams into renderable state: the latest
/// snapshot per progress stream (overwrite), every log entry in arrival
/// order (append). Non-monotonic `current` values are taken as-is; the last
/// write wins.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    anonymization: Option<ProgressEvent>,
    conversion: Option<ProgressEvent>,
    tag_scan: Option<ScanProgress>,
    log: Vec<LogEntry>,
}

impl ProgressAggregator {
    /// Clears all streams; called at job start.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Folds one event in, reporting which pipeline stage (if any) the
    /// event belongs to so the caller can advance its run state.
    pub fn apply(&mut self, event: EngineEvent) -> Option<StageKind> {
        match event {
            EngineEvent::AnonymizationProgress(progress) => {
                self.anonymization = Some(progress);
                Some(StageKind::Anonymization)
            }
            EngineEvent::ConversionProgress(progress) => {
                self.conversion = Some(progress);
                Some(StageKind::Conversion)
            }
            EngineEvent::Log(entry) => {
                self.log.push(entry);
                None
            }
            EngineEvent::TagScanProgress(progress) => {
                self.tag_scan = Some(progress);
                None
            }
        }
    }

    pub fn stage_progress(&self, stage: StageKind) -> Option<&ProgressEvent> {
        match stage {
            StageKind::Anonymization => self.anonymization.as_ref(),
            StageKind::Conversion => self.conversion.as_ref(),
        }
    }

    pub fn tag_scan(&self) -> Option<ScanProgress> {
        self.tag_scan
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConversionType, ProgressStatus};

    fn progress(current: usize, total: usize) -> ProgressEvent {
        ProgressEvent {
            current,
            total,
            file_name: format!("scan-{current}.dcm"),
            status: ProgressStatus::Processing,
        }
    }

    fn log_entry(file: &str) -> LogEntry {
        LogEntry {
            file_name: file.to_string(),
            file_path: format!("/data/{file}"),
            success: true,
            status: "converted".to_string(),
            message: String::new(),
            conversion_type: ConversionType::Png,
        }
    }

    #[test]
    fn keeps_only_the_latest_event_per_stage() {
        let mut aggregator = ProgressAggregator::default();
        aggregator.apply(EngineEvent::AnonymizationProgress(progress(1, 10)));
        aggregator.apply(EngineEvent::AnonymizationProgress(progress(7, 10)));

        let latest = aggregator
            .stage_progress(StageKind::Anonymization)
            .unwrap();
        assert_eq!(latest.current, 7);
        assert!(aggregator.stage_progress(StageKind::Conversion).is_none());
    }

    #[test]
    fn non_monotonic_current_is_last_write_wins() {
        let mut aggregator = ProgressAggregator::default();
        aggregator.apply(EngineEvent::ConversionProgress(progress(9, 10)));
        aggregator.apply(EngineEvent::ConversionProgress(progress(4, 10)));

        let latest = aggregator.stage_progress(StageKind::Conversion).unwrap();
        assert_eq!(latest.current, 4);
    }

    #[test]
    fn streams_are_independent() {
        let mut aggregator = ProgressAggregator::default();
        assert_eq!(
            aggregator.apply(EngineEvent::AnonymizationProgress(progress(3, 5))),
            Some(StageKind::Anonymization)
        );
        assert_eq!(
            aggregator.apply(EngineEvent::ConversionProgress(progress(1, 5))),
            Some(StageKind::Conversion)
        );

        assert_eq!(
            aggregator
                .stage_progress(StageKind::Anonymization)
                .unwrap()
                .current,
            3
        );
        assert_eq!(
            aggregator
                .stage_progress(StageKind::Conversion)
                .unwrap()
                .current,
            1
        );
    }

    #[test]
    fn log_entries_append_in_arrival_order() {
        let mut aggregator = ProgressAggregator::default();
        assert_eq!(aggregator.apply(EngineEvent::Log(log_entry("a.dcm"))), None);
        aggregator.apply(EngineEvent::Log(log_entry("b.dcm")));
        aggregator.apply(EngineEvent::Log(log_entry("c.dcm")));

        let names: Vec<&str> = aggregator
            .log()
            .iter()
            .map(|entry| entry.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.dcm", "b.dcm", "c.dcm"]);
    }

    #[test]
    fn reset_clears_every_stream() {
        let mut aggregator = ProgressAggregator::default();
        aggregator.apply(EngineEvent::AnonymizationProgress(progress(1, 2)));
        aggregator.apply(EngineEvent::Log(log_entry("a.dcm")));
        aggregator.apply(EngineEvent::TagScanProgress(ScanProgress {
            current: 1,
            total: 2,
        }));

        aggregator.reset();
        assert!(aggregator.stage_progress(StageKind::Anonymization).is_none());
        assert!(aggregator.log().is_empty());
        assert!(aggregator.tag_scan().is_none());
    }
}
