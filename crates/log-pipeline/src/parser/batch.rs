//! 배치 로그 파서 -- EVTX 컨테이너를 순회하며 레코드를 정규화합니다.
//!
//! 컨테이너 수준 실패(파일 없음, 헤더 손상)는 [`LogPipelineError::SourceUnreadable`]로
//! 반환되어 "이벤트 0건"과 구분됩니다. 레코드 수준 실패는 건너뛰고 통계에만 반영합니다.

use std::fmt;
use std::path::Path;

use evtsentry_core::metrics as m;
use evtsentry_core::types::EventRecord;
use ::evtx::{EvtxParser, ParserSettings};
use serde::Serialize;

use crate::error::LogPipelineError;
use crate::sink;

use super::extractor::extract_from_xml;

/// 파싱 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// 컨테이너에서 읽은 레코드 수
    pub total: usize,
    /// 정규화에 성공한 레코드 수
    pub parsed: usize,
    /// 손상되어 건너뛴 레코드 수
    pub skipped: usize,
}

impl fmt::Display for ParseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} parsed={} skipped={}",
            self.total, self.parsed, self.skipped
        )
    }
}

/// 배치 파싱 결과
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// 컨테이너 순서대로 정규화된 레코드
    pub records: Vec<EventRecord>,
    /// 파싱 통계
    pub stats: ParseStats,
}

/// EVTX 배치 파서
///
/// 단일 스레드로 컨테이너 순서를 보존하며 레코드를 읽습니다.
#[derive(Debug, Clone, Default)]
pub struct BatchLogParser {
    _private: (),
}

impl BatchLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// EVTX 컨테이너를 파싱합니다.
    ///
    /// # Errors
    /// 컨테이너를 열 수 없거나 헤더가 손상된 경우 `SourceUnreadable`을 반환합니다.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome, LogPipelineError> {
        let settings = ParserSettings::new().num_threads(1);
        let mut parser = EvtxParser::from_path(path)
            .map_err(|e| LogPipelineError::SourceUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .with_configuration(settings);

        let outcome = self.parse_records(parser.records().map(|r| r.map(|rec| rec.data)));

        tracing::info!(
            path = %path.display(),
            total = outcome.stats.total,
            parsed = outcome.stats.parsed,
            skipped = outcome.stats.skipped,
            "evtx container parsed"
        );
        Ok(outcome)
    }

    /// 파싱 후 결과를 이벤트 CSV로 덮어씁니다.
    pub fn parse_to_csv(&self, path: &Path, out: &Path) -> Result<ParseOutcome, LogPipelineError> {
        let outcome = self.parse_file(path)?;
        sink::write_events(out, &outcome.records)?;
        tracing::info!(out = %out.display(), count = outcome.records.len(), "events saved");
        Ok(outcome)
    }

    /// 레코드 XML 시퀀스를 정규화합니다.
    ///
    /// 디코딩 실패와 추출 실패 모두 해당 레코드만 건너뜁니다.
    pub fn parse_records<I, E>(&self, records: I) -> ParseOutcome
    where
        I: IntoIterator<Item = Result<String, E>>,
        E: fmt::Display,
    {
        let mut outcome = ParseOutcome::default();

        for (index, record) in records.into_iter().enumerate() {
            outcome.stats.total += 1;

            let extracted = record
                .map_err(|e| LogPipelineError::Extraction(format!("record decode failed: {e}")))
                .and_then(|xml| extract_from_xml(&xml));

            match extracted {
                Ok(event) => {
                    outcome.stats.parsed += 1;
                    outcome.records.push(event);
                }
                Err(e) => {
                    outcome.stats.skipped += 1;
                    tracing::debug!(index, error = %e, "skipping malformed record");
                }
            }
        }

        metrics::counter!(m::RECORDS_PARSED_TOTAL).increment(outcome.stats.parsed as u64);
        metrics::counter!(m::RECORDS_SKIPPED_TOTAL).increment(outcome.stats.skipped as u64);

        outcome
    }
}
