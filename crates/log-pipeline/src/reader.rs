//! 이벤트 CSV 리더 -- 정규화된 이벤트 파일을 다시 읽어 분석에 넘깁니다.
//!
//! 파일이 없으면 경고 후 빈 결과를 반환합니다. 헤더에 필수 컬럼이 없으면 에러이고,
//! 개별 행 해석 실패는 해당 행만 건너뜁니다.

use std::path::Path;

use evtsentry_core::types::EventRecord;

use crate::error::LogPipelineError;
use crate::sink::EVENT_HEADERS;

/// 이벤트 CSV 파일을 읽습니다.
///
/// # Errors
/// - 파일을 열 수 없는 경우 (없는 경우 제외)
/// - 헤더에 필수 컬럼이 없는 경우
pub fn read_events(path: &Path) -> Result<Vec<EventRecord>, LogPipelineError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "events file not found");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    let headers = reader.headers().map_err(|e| unreadable(path, e))?.clone();
    if let Some(missing) = EVENT_HEADERS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(unreadable(path, format!("missing column '{missing}'")));
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (row, result) in reader.deserialize::<EventRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::debug!(path = %path.display(), row, error = %e, "skipping unreadable row");
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        loaded = records.len(),
        skipped,
        "events loaded"
    );
    Ok(records)
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> LogPipelineError {
    LogPipelineError::SourceUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::write_events;
    use chrono::{TimeZone, Utc};
    use evtsentry_core::types::NOT_AVAILABLE;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = read_events(&dir.path().join("absent.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn reads_back_written_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 3, 12, 45).unwrap();
        let written = vec![
            EventRecord::new(Some(ts), Some(4624)).with_user(Some("alice".to_owned())),
            EventRecord::new(None, None),
        ];
        write_events(&path, &written).unwrap();

        let read = read_events(&path).unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn blank_and_garbled_values_degrade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(
            &path,
            "timestamp,event_id,user,domain,ip,source_host,details\n\
             garbage,x,,CONTOSO,,WS1,Event ID unknown\n",
        )
        .unwrap();

        let read = read_events(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert!(read[0].timestamp().is_none());
        assert_eq!(read[0].event_id(), None);
        assert_eq!(read[0].user(), NOT_AVAILABLE);
        assert_eq!(read[0].domain(), "CONTOSO");
    }

    #[test]
    fn short_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(
            &path,
            "timestamp,event_id,user,domain,ip,source_host,details\n\
             2024-01-15 03:00:00,4624\n\
             2024-01-15 03:00:00,4624,alice,N/A,N/A,N/A,Event ID 4624\n",
        )
        .unwrap();

        let read = read_events(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].user(), "alice");
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(&path, "when,what\n1,2\n").unwrap();

        let err = read_events(&path).unwrap_err();
        assert!(matches!(err, LogPipelineError::SourceUnreadable { .. }));
        assert!(err.to_string().contains("timestamp"));
    }
}
