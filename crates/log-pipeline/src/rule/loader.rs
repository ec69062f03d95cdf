//! 규칙 문서 로더 -- JSON 또는 YAML 규칙 문서를 디스크에서 로드합니다.
//!
//! 확장자가 `.yml`/`.yaml`이면 YAML, 그 외에는 JSON으로 해석합니다.
//! 문서가 없으면 배치 실행 전체가 실패해야 하므로 [`LogPipelineError::RuleMissing`]을 반환합니다.

use std::path::Path;

use crate::error::LogPipelineError;

use super::types::RuleSet;

/// 규칙 문서 최대 크기
const MAX_RULE_FILE_SIZE: u64 = 1024 * 1024; // 1MB

impl RuleSet {
    /// 파일에서 규칙을 로드하고 검증합니다.
    ///
    /// 검증 경고는 `warn` 레벨로 기록됩니다.
    ///
    /// # Errors
    /// - 파일이 없는 경우 (`RuleMissing`)
    /// - 파일이 너무 크거나 읽을 수 없거나 해석할 수 없는 경우 (`RuleLoad`)
    /// - 값이 범위를 벗어난 경우 (`Config`)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogPipelineError> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogPipelineError::RuleMissing(source.clone())
            } else {
                LogPipelineError::RuleLoad {
                    path: source.clone(),
                    reason: format!("failed to read file metadata: {e}"),
                }
            }
        })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(LogPipelineError::RuleLoad {
                path: source,
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LogPipelineError::RuleLoad {
                    path: source.clone(),
                    reason: format!("failed to read file: {e}"),
                })?;

        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml");

        let rules = if is_yaml {
            Self::parse_yaml(&content, &source)?
        } else {
            Self::parse_json(&content, &source)?
        };

        for warning in rules.warnings() {
            tracing::warn!(path = %source, "{warning}");
        }

        tracing::info!(
            path = %source,
            after_hours_start = rules.after_hours_window.0,
            after_hours_end = rules.after_hours_window.1,
            file_access_threshold = rules.file_access_threshold,
            "loaded rule set"
        );

        Ok(rules)
    }

    /// JSON 문자열을 파싱하고 검증합니다.
    pub fn parse_json(json_str: &str, source: &str) -> Result<Self, LogPipelineError> {
        let rules: Self =
            serde_json::from_str(json_str).map_err(|e| LogPipelineError::RuleLoad {
                path: source.to_owned(),
                reason: format!("JSON parse error: {e}"),
            })?;
        rules.validate()?;
        Ok(rules)
    }

    /// YAML 문자열을 파싱하고 검증합니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<Self, LogPipelineError> {
        let rules: Self =
            serde_yaml::from_str(yaml_str).map_err(|e| LogPipelineError::RuleLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;
        rules.validate()?;
        Ok(rules)
    }
}
