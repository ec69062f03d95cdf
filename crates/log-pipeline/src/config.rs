//! 라이브 수집기 설정
//!
//! [`LiveCollectorConfig`]는 core의 [`EvtsentryConfig`]에서 파생되며,
//! 경로는 데이터 디렉토리 기준으로 해석된 상태로 보관됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use evtsentry_core::config::EvtsentryConfig;
//! use evtsentry_log_pipeline::config::LiveCollectorConfig;
//!
//! let core_config = EvtsentryConfig::default();
//! let config = LiveCollectorConfig::from_core(&core_config);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use evtsentry_core::config::EvtsentryConfig;

use crate::error::LogPipelineError;

/// 라이브 수집기 설정
#[derive(Debug, Clone)]
pub struct LiveCollectorConfig {
    /// 요청 대상 URL (엔드포인트 + 컬렉션 URI)
    pub target_url: String,
    /// 폴링 간격
    pub poll_interval: Duration,
    /// 요청 타임아웃
    pub request_timeout: Duration,
    /// 라이브 이벤트 CSV 경로
    pub output_path: PathBuf,
    /// 열거 커서 저장 경로. `None`이면 저장하지 않습니다.
    pub cursor_path: Option<PathBuf>,
    /// 저장된 커서가 없을 때의 열거 컨텍스트
    pub initial_context: String,
    /// 기본 인증 자격 증명 `(username, password)`
    pub credentials: Option<(String, String)>,
}

impl Default for LiveCollectorConfig {
    fn default() -> Self {
        Self::from_core(&EvtsentryConfig::default())
    }
}

impl LiveCollectorConfig {
    /// core 설정에서 수집기 설정을 생성합니다.
    pub fn from_core(core: &EvtsentryConfig) -> Self {
        let c = &core.collector;
        let credentials = (!c.username.is_empty()).then(|| (c.username.clone(), c.password.clone()));

        Self {
            target_url: c.target_url(),
            poll_interval: Duration::from_secs(c.poll_interval_secs),
            request_timeout: Duration::from_secs(c.request_timeout_secs),
            output_path: core.live_output_path(),
            cursor_path: (!c.cursor_file.trim().is_empty()).then(|| core.cursor_path()),
            initial_context: c.initial_context.clone(),
            credentials,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.poll_interval.is_zero() {
            return Err(LogPipelineError::Config {
                field: "poll_interval".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(LogPipelineError::Config {
                field: "request_timeout".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.initial_context.trim().is_empty() {
            return Err(LogPipelineError::Config {
                field: "initial_context".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_core_resolves_paths_and_url() {
        let mut core = EvtsentryConfig::default();
        core.general.data_dir = "/srv/evt".to_owned();

        let config = LiveCollectorConfig::from_core(&core);
        assert_eq!(
            config.target_url,
            "http://wef-server.contoso.com:5985/wsman/subscription/Microsoft-Windows-Security-Auditing"
        );
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.output_path, PathBuf::from("/srv/evt/wef_events_live.csv"));
        assert_eq!(config.cursor_path, Some(PathBuf::from("/srv/evt/wef_cursor")));
        assert!(config.credentials.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn credentials_require_username() {
        let mut core = EvtsentryConfig::default();
        core.collector.password = "secret".to_owned();
        assert!(LiveCollectorConfig::from_core(&core).credentials.is_none());

        core.collector.username = "svc-wef".to_owned();
        let config = LiveCollectorConfig::from_core(&core);
        assert_eq!(
            config.credentials,
            Some(("svc-wef".to_owned(), "secret".to_owned()))
        );
    }

    #[test]
    fn empty_cursor_file_disables_persistence() {
        let mut core = EvtsentryConfig::default();
        core.collector.cursor_file = String::new();
        assert!(LiveCollectorConfig::from_core(&core).cursor_path.is_none());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = LiveCollectorConfig {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }
}
