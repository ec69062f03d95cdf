//! 열거 커서 저장소
//!
//! 마지막으로 받은 `EnumerationContext`를 파일 하나에 보관합니다.
//! 쓰기는 임시 파일 + rename으로 교체하므로 부분적으로 기록된 커서는 보이지 않습니다.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::LogPipelineError;

/// 파일 기반 커서 저장소
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 저장된 커서를 읽습니다.
    ///
    /// 파일이 없거나 비어 있거나 읽을 수 없으면 `None`입니다.
    pub async fn load(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let cursor = content.trim();
                (!cursor.is_empty()).then(|| cursor.to_owned())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read cursor file");
                None
            }
        }
    }

    /// 커서를 원자적으로 저장합니다.
    pub async fn save(&self, cursor: &str) -> Result<(), LogPipelineError> {
        let path = self.path.clone();
        let cursor = cursor.to_owned();
        tokio::task::spawn_blocking(move || write_atomic(&path, &cursor))
            .await
            .map_err(|e| LogPipelineError::SinkWrite {
                path: self.path.display().to_string(),
                reason: format!("cursor write task failed: {e}"),
            })?
    }

    /// 저장된 커서를 삭제합니다. 파일이 이미 없으면 성공입니다.
    pub async fn clear(&self) -> Result<(), LogPipelineError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LogPipelineError::SinkWrite {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn write_atomic(path: &Path, cursor: &str) -> Result<(), LogPipelineError> {
    let sink_error = |e: std::io::Error| LogPipelineError::SinkWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(sink_error)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(sink_error)?;
    writeln!(tmp, "{cursor}").map_err(sink_error)?;
    tmp.as_file().sync_all().map_err(sink_error)?;
    tmp.persist(path).map_err(|e| sink_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_cursor_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("cursor"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("state/cursor"));

        store.save("uuid:0001").await.unwrap();
        assert_eq!(store.load().await.as_deref(), Some("uuid:0001"));

        store.save("uuid:0002").await.unwrap();
        assert_eq!(store.load().await.as_deref(), Some("uuid:0002"));
    }

    #[tokio::test]
    async fn clear_removes_saved_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("cursor"));

        store.save("uuid:0001").await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert!(store.load().await.is_none());

        // 이미 없는 파일을 지워도 성공
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn blank_cursor_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor");
        std::fs::write(&path, "  \n").unwrap();
        assert!(CursorStore::new(path).load().await.is_none());
    }
}
