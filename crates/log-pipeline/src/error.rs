//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for EvtsentryError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! # 전파 정책
//! - 레코드 단위(`Extraction`)와 폴링 단위(`Network`, `Protocol`) 실패는 호출자가 복구합니다.
//! - 컨테이너(`SourceUnreadable`), 설정(`RuleLoad`, `Config`), 싱크(`SinkWrite`) 실패는 해당 실행을 중단합니다.
//! - 파일 I/O와 CSV 에러는 원인 경로와 함께 `SourceUnreadable` 또는 `SinkWrite`로 감싸서 반환합니다.

use evtsentry_core::error::{ConfigError, EvtsentryError, ParseError, PipelineError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 입력 EVTX 컨테이너를 열거나 해석할 수 없음
    #[error("source unreadable: {path}: {reason}")]
    SourceUnreadable {
        /// 입력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 단일 레코드 추출 실패 (XML 손상 등)
    #[error("record extraction failed: {0}")]
    Extraction(String),

    /// 네트워크 실패 (연결, 타임아웃)
    #[error("network error: {0}")]
    Network(String),

    /// 프로토콜 실패 (비정상 상태 코드, 응답 해석 실패)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// 출력 파일 기록 실패
    #[error("sink write failed: {path}: {reason}")]
    SinkWrite {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 규칙 문서 로딩 실패
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 규칙 문서가 존재하지 않음
    #[error("rule file not found: {0}")]
    RuleMissing(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<LogPipelineError> for EvtsentryError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::RuleMissing(path) => {
                EvtsentryError::Config(ConfigError::FileNotFound { path })
            }
            LogPipelineError::RuleLoad { path, reason } => {
                EvtsentryError::Config(ConfigError::ParseFailed {
                    reason: format!("{path}: {reason}"),
                })
            }
            LogPipelineError::Config { field, reason } => {
                EvtsentryError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Extraction(reason) => {
                EvtsentryError::Parse(ParseError::Extraction(reason))
            }
            LogPipelineError::SourceUnreadable { .. } => {
                EvtsentryError::Pipeline(PipelineError::SourceUnreadable(err.to_string()))
            }
            LogPipelineError::SinkWrite { .. } => {
                EvtsentryError::Pipeline(PipelineError::SinkWrite(err.to_string()))
            }
            LogPipelineError::Network(_) | LogPipelineError::Protocol(_) => {
                EvtsentryError::Pipeline(PipelineError::Collector(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unreadable_display() {
        let err = LogPipelineError::SourceUnreadable {
            path: "Security.evtx".to_owned(),
            reason: "invalid file header".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Security.evtx"));
        assert!(msg.contains("invalid file header"));
    }

    #[test]
    fn rule_missing_maps_to_config_not_found() {
        let err: EvtsentryError = LogPipelineError::RuleMissing("rules.json".to_owned()).into();
        assert!(matches!(
            err,
            EvtsentryError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn sink_write_maps_to_pipeline_error() {
        let err: EvtsentryError = LogPipelineError::SinkWrite {
            path: "/ro/alerts.csv".to_owned(),
            reason: "read-only file system".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            EvtsentryError::Pipeline(PipelineError::SinkWrite(_))
        ));
        assert!(err.to_string().contains("/ro/alerts.csv"));
    }

    #[test]
    fn every_variant_maps_to_a_named_category() {
        let path = || "x".to_owned();
        let reason = || "r".to_owned();
        let cases: Vec<(LogPipelineError, &str)> = vec![
            (
                LogPipelineError::SourceUnreadable {
                    path: path(),
                    reason: reason(),
                },
                "source",
            ),
            (LogPipelineError::Extraction(reason()), "parse"),
            (LogPipelineError::Network(reason()), "collector"),
            (LogPipelineError::Protocol(reason()), "collector"),
            (
                LogPipelineError::SinkWrite {
                    path: path(),
                    reason: reason(),
                },
                "sink",
            ),
            (
                LogPipelineError::RuleLoad {
                    path: path(),
                    reason: reason(),
                },
                "config",
            ),
            (LogPipelineError::RuleMissing(path()), "config"),
            (
                LogPipelineError::Config {
                    field: path(),
                    reason: reason(),
                },
                "config",
            ),
        ];

        for (err, expected) in cases {
            let category = match EvtsentryError::from(err) {
                EvtsentryError::Config(_) => "config",
                EvtsentryError::Parse(ParseError::Extraction(_)) => "parse",
                EvtsentryError::Pipeline(PipelineError::SourceUnreadable(_)) => "source",
                EvtsentryError::Pipeline(PipelineError::SinkWrite(_)) => "sink",
                EvtsentryError::Pipeline(PipelineError::Collector(_)) => "collector",
                EvtsentryError::Io(_) => "io",
            };
            assert_eq!(category, expected);
        }
    }

    #[test]
    fn network_and_protocol_map_to_collector_error() {
        for err in [
            LogPipelineError::Network("connection refused".to_owned()),
            LogPipelineError::Protocol("HTTP 500".to_owned()),
        ] {
            let converted: EvtsentryError = err.into();
            assert!(matches!(
                converted,
                EvtsentryError::Pipeline(PipelineError::Collector(_))
            ));
        }
    }
}
