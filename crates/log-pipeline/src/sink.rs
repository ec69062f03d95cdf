//! CSV 싱크 -- 이벤트/알림 파일 기록
//!
//! - 배치 출력([`write_events`], [`write_alerts`])은 같은 디렉토리의 임시 파일에
//!   모두 기록한 뒤 rename으로 교체합니다. 도중에 실패하면 이전 파일이 그대로 남습니다.
//! - 라이브 출력([`append_events`])은 배치 하나를 메모리에서 직렬화한 뒤
//!   `O_APPEND` 파일에 한 번의 쓰기로 추가합니다. 빈 파일이면 헤더를 먼저 씁니다.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use evtsentry_core::types::{Alert, EventRecord};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::LogPipelineError;

/// 이벤트 CSV 헤더
pub const EVENT_HEADERS: [&str; 7] = [
    "timestamp",
    "event_id",
    "user",
    "domain",
    "ip",
    "source_host",
    "details",
];

/// 알림 CSV 헤더
pub const ALERT_HEADERS: [&str; 5] = ["type", "user", "time", "risk", "details"];

/// 정규화된 이벤트를 덮어쓰기로 기록합니다.
///
/// 상위 디렉토리가 없으면 생성합니다.
pub fn write_events(path: &Path, records: &[EventRecord]) -> Result<(), LogPipelineError> {
    let bytes = encode_rows(&EVENT_HEADERS, records, true).map_err(|e| sink_error(path, e))?;
    replace_file(path, &bytes)?;
    tracing::debug!(path = %path.display(), count = records.len(), "events written");
    Ok(())
}

/// 알림 전체를 덮어쓰기로 기록합니다.
///
/// 알림이 없으면 헤더만 있는 파일이 되며, 이전 실행의 알림은 남지 않습니다.
/// 싱크가 알림 목록의 소유권을 가져갑니다.
pub fn write_alerts(path: &Path, alerts: Vec<Alert>) -> Result<(), LogPipelineError> {
    let bytes = encode_rows(&ALERT_HEADERS, &alerts, true).map_err(|e| sink_error(path, e))?;
    replace_file(path, &bytes)?;
    tracing::debug!(path = %path.display(), count = alerts.len(), "alerts written");
    Ok(())
}

/// 이벤트를 라이브 파일 끝에 추가합니다.
///
/// 파일이 없거나 비어 있으면 헤더를 포함합니다. 레코드가 없으면 아무것도 하지 않습니다.
pub fn append_events(path: &Path, records: &[EventRecord]) -> Result<(), LogPipelineError> {
    if records.is_empty() {
        return Ok(());
    }

    ensure_parent(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| sink_error(path, e))?;

    let needs_header = file.metadata().map_err(|e| sink_error(path, e))?.len() == 0;
    let bytes =
        encode_rows(&EVENT_HEADERS, records, needs_header).map_err(|e| sink_error(path, e))?;

    // 한 번의 write로 배치 전체를 붙임
    file.write_all(&bytes).map_err(|e| sink_error(path, e))?;
    file.sync_data().map_err(|e| sink_error(path, e))?;

    tracing::debug!(
        path = %path.display(),
        count = records.len(),
        header = needs_header,
        "events appended"
    );
    Ok(())
}

fn encode_rows<T: Serialize>(
    headers: &[&str],
    rows: &[T],
    with_header: bool,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), LogPipelineError> {
    let dir = ensure_parent(path)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| sink_error(path, e))?;
    tmp.write_all(bytes).map_err(|e| sink_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| sink_error(path, e))?;
    tmp.persist(path).map_err(|e| sink_error(path, e.error))?;
    Ok(())
}

/// 상위 디렉토리를 만들고 그 경로를 반환합니다.
fn ensure_parent(path: &Path) -> Result<&Path, LogPipelineError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| sink_error(path, e))?;
    Ok(dir)
}

fn sink_error(path: &Path, err: impl std::fmt::Display) -> LogPipelineError {
    LogPipelineError::SinkWrite {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
