//! 에러 타입 -- 도메인별 에러 정의

/// evtsentry 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum EvtsentryError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음 (규칙 파일 누락 포함)
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 입력 소스를 읽을 수 없음
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    /// 출력 싱크 기록 실패
    #[error("sink write failed: {0}")]
    SinkWrite(String),

    /// 수집기 실패 (네트워크/프로토콜)
    #[error("collector failed: {0}")]
    Collector(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 레코드 추출 실패
    #[error("record extraction failed: {0}")]
    Extraction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_display() {
        let err = ConfigError::FileNotFound {
            path: "config/rules.json".to_owned(),
        };
        assert!(err.to_string().contains("config/rules.json"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let err: EvtsentryError = ConfigError::ParseFailed {
            reason: "bad".to_owned(),
        }
        .into();
        assert!(matches!(err, EvtsentryError::Config(_)));
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: EvtsentryError = io.into();
        assert!(matches!(err, EvtsentryError::Io(_)));
    }
}
