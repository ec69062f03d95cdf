//! 배치 파이프라인 -- 파싱/저장/탐지/알림 기록의 한 번 실행 흐름을 관리합니다.
//!
//! # 흐름
//! ```text
//! EVTX -> BatchLogParser -> events.csv
//!              |
//!              v
//!         AlertEngine(RuleSet) -> alerts.csv (덮어쓰기)
//! ```
//!
//! 실행은 단일 스레드 동기 처리이며 중간에 재시작할 수 없습니다.
//! 알림 파일은 모든 알림이 준비된 뒤에만 교체됩니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use evtsentry_core::types::{AlertKind, EventRecord};
use serde::Serialize;

use crate::alert::AlertEngine;
use crate::error::LogPipelineError;
use crate::parser::{BatchLogParser, ParseStats};
use crate::sink;

/// 배치 실행 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// 파싱 통계 (이벤트 파일을 다시 읽은 경우 `None`)
    pub parse: Option<ParseStats>,
    /// 평가한 이벤트 수
    pub events: usize,
    /// 생성된 알림 수
    pub alerts: usize,
    /// 유형별 알림 수
    pub alerts_by_kind: BTreeMap<String, usize>,
}

/// 배치 파이프라인
///
/// # 사용 예시
/// ```ignore
/// let rules = RuleSet::load(config.rules_path()).await?;
/// let pipeline = BatchPipeline::new(
///     AlertEngine::new(rules),
///     config.events_path(),
///     config.alerts_path(),
/// );
/// let report = pipeline.run(Path::new("Security.evtx"))?;
/// ```
pub struct BatchPipeline {
    parser: BatchLogParser,
    engine: AlertEngine,
    events_path: PathBuf,
    alerts_path: PathBuf,
}

impl BatchPipeline {
    pub fn new(
        engine: AlertEngine,
        events_path: impl Into<PathBuf>,
        alerts_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            parser: BatchLogParser::new(),
            engine,
            events_path: events_path.into(),
            alerts_path: alerts_path.into(),
        }
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    pub fn alerts_path(&self) -> &Path {
        &self.alerts_path
    }

    /// EVTX를 파싱하고 이벤트 파일을 기록한 뒤 탐지를 수행합니다.
    ///
    /// 중간에 이벤트 파일을 다시 읽지 않습니다.
    pub fn run(&self, source: &Path) -> Result<BatchReport, LogPipelineError> {
        let outcome = self.parser.parse_to_csv(source, &self.events_path)?;
        let mut report = self.analyze(&outcome.records)?;
        report.parse = Some(outcome.stats);
        Ok(report)
    }

    /// 이벤트 배치를 평가하고 알림 파일을 덮어씁니다.
    pub fn analyze(&self, records: &[EventRecord]) -> Result<BatchReport, LogPipelineError> {
        let alerts = self.engine.evaluate(records);

        let mut alerts_by_kind = BTreeMap::new();
        for kind in [
            AlertKind::AfterHoursLogin,
            AlertKind::MassFileAccess,
            AlertKind::UsbDeviceAccess,
        ] {
            let count = alerts.iter().filter(|a| a.kind() == kind).count();
            if count > 0 {
                alerts_by_kind.insert(kind.to_string(), count);
            }
        }

        let report = BatchReport {
            parse: None,
            events: records.len(),
            alerts: alerts.len(),
            alerts_by_kind,
        };

        sink::write_alerts(&self.alerts_path, alerts)?;
        tracing::info!(
            path = %self.alerts_path.display(),
            alerts = report.alerts,
            "alerts saved"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSet;
    use chrono::{TimeZone, Utc};

    fn pipeline(dir: &Path) -> BatchPipeline {
        BatchPipeline::new(
            AlertEngine::new(RuleSet::default()),
            dir.join("events.csv"),
            dir.join("alerts.csv"),
        )
    }

    fn login_at(hour: u32) -> EventRecord {
        EventRecord::new(
            Some(Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()),
            Some(4624),
        )
        .with_user(Some("alice".to_owned()))
    }

    #[test]
    fn analyze_writes_alerts_and_tallies_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let report = pipeline
            .analyze(&[login_at(3), login_at(4), login_at(12)])
            .unwrap();
        assert_eq!(report.events, 3);
        assert_eq!(report.alerts, 2);
        assert_eq!(report.alerts_by_kind.get("After-Hours Login"), Some(&2));

        let content = std::fs::read_to_string(pipeline.alerts_path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn rerun_without_matches_clears_stale_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        pipeline.analyze(&[login_at(3)]).unwrap();
        let report = pipeline.analyze(&[login_at(12)]).unwrap();
        assert_eq!(report.alerts, 0);

        let content = std::fs::read_to_string(pipeline.alerts_path()).unwrap();
        assert_eq!(content, "type,user,time,risk,details\n");
    }

    #[test]
    fn run_with_missing_source_leaves_outputs_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());
        std::fs::write(pipeline.alerts_path(), "previous").unwrap();

        let err = pipeline.run(Path::new("/nonexistent/Security.evtx")).unwrap_err();
        assert!(matches!(err, LogPipelineError::SourceUnreadable { .. }));
        assert_eq!(
            std::fs::read_to_string(pipeline.alerts_path()).unwrap(),
            "previous"
        );
        assert!(!pipeline.events_path().exists());
    }
}
