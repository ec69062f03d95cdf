//! 설정 관리 -- evtsentry.toml 파싱 및 런타임 설정
//!
//! [`EvtsentryConfig`]는 프로세스 시작 시 한 번 생성되어
//! 배치 파서, 알림 엔진, 라이브 수집기에 참조로 전달됩니다. 전역 상태는 없습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`EVTSENTRY_COLLECTOR_ENDPOINT=http://...` 형식)
//! 3. 설정 파일 (`evtsentry.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), evtsentry_core::error::EvtsentryError> {
//! use evtsentry_core::config::EvtsentryConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = EvtsentryConfig::load("evtsentry.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = EvtsentryConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, EvtsentryError};

/// 폴링 간격 상한 (초)
const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// 요청 타임아웃 상한 (초)
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// evtsentry 통합 설정
///
/// `evtsentry.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvtsentryConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 배치 경로 설정
    #[serde(default)]
    pub batch: BatchConfig,
    /// 라이브 수집기 설정
    #[serde(default)]
    pub collector: CollectorConfig,
}

impl EvtsentryConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EvtsentryError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값을 사용합니다. 그 외 동작은 [`load`](Self::load)와 같습니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, EvtsentryError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(EvtsentryError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, EvtsentryError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EvtsentryError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                EvtsentryError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, EvtsentryError> {
        toml::from_str(toml_str).map_err(|e| {
            EvtsentryError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `EVTSENTRY_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "EVTSENTRY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "EVTSENTRY_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "EVTSENTRY_GENERAL_DATA_DIR");

        // Batch
        override_string(&mut self.batch.events_file, "EVTSENTRY_BATCH_EVENTS_FILE");
        override_string(&mut self.batch.alerts_file, "EVTSENTRY_BATCH_ALERTS_FILE");
        override_string(&mut self.batch.rules_path, "EVTSENTRY_BATCH_RULES_PATH");

        // Collector
        override_string(&mut self.collector.endpoint, "EVTSENTRY_COLLECTOR_ENDPOINT");
        override_string(
            &mut self.collector.collection_uri,
            "EVTSENTRY_COLLECTOR_COLLECTION_URI",
        );
        override_u64(
            &mut self.collector.poll_interval_secs,
            "EVTSENTRY_COLLECTOR_POLL_INTERVAL_SECS",
        );
        override_u64(
            &mut self.collector.request_timeout_secs,
            "EVTSENTRY_COLLECTOR_REQUEST_TIMEOUT_SECS",
        );
        override_string(
            &mut self.collector.output_file,
            "EVTSENTRY_COLLECTOR_OUTPUT_FILE",
        );
        override_string(
            &mut self.collector.cursor_file,
            "EVTSENTRY_COLLECTOR_CURSOR_FILE",
        );
        override_string(
            &mut self.collector.initial_context,
            "EVTSENTRY_COLLECTOR_INITIAL_CONTEXT",
        );
        override_string(&mut self.collector.username, "EVTSENTRY_COLLECTOR_USERNAME");
        override_string(&mut self.collector.password, "EVTSENTRY_COLLECTOR_PASSWORD");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EvtsentryError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        for (field, value) in [
            ("batch.events_file", &self.batch.events_file),
            ("batch.alerts_file", &self.batch.alerts_file),
            ("batch.rules_path", &self.batch.rules_path),
            ("collector.output_file", &self.collector.output_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        if !(self.collector.endpoint.starts_with("http://")
            || self.collector.endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "collector.endpoint".to_owned(),
                reason: "must be an http:// or https:// URL".to_owned(),
            }
            .into());
        }

        if self.collector.poll_interval_secs == 0
            || self.collector.poll_interval_secs > MAX_POLL_INTERVAL_SECS
        {
            return Err(ConfigError::InvalidValue {
                field: "collector.poll_interval_secs".to_owned(),
                reason: format!("must be between 1 and {MAX_POLL_INTERVAL_SECS}"),
            }
            .into());
        }

        if self.collector.request_timeout_secs == 0
            || self.collector.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(ConfigError::InvalidValue {
                field: "collector.request_timeout_secs".to_owned(),
                reason: format!("must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"),
            }
            .into());
        }

        if self.collector.initial_context.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "collector.initial_context".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// 정규화된 이벤트 CSV 경로
    pub fn events_path(&self) -> PathBuf {
        self.in_data_dir(&self.batch.events_file)
    }

    /// 알림 CSV 경로
    pub fn alerts_path(&self) -> PathBuf {
        self.in_data_dir(&self.batch.alerts_file)
    }

    /// 규칙 문서 경로 (작업 디렉토리 기준)
    pub fn rules_path(&self) -> PathBuf {
        PathBuf::from(&self.batch.rules_path)
    }

    /// 라이브 수집 CSV 경로
    pub fn live_output_path(&self) -> PathBuf {
        self.in_data_dir(&self.collector.output_file)
    }

    /// 열거 커서 상태 파일 경로
    pub fn cursor_path(&self) -> PathBuf {
        self.in_data_dir(&self.collector.cursor_file)
    }

    fn in_data_dir(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.general.data_dir).join(path)
        }
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 출력 파일이 놓이는 데이터 디렉토리
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "data".to_owned(),
        }
    }
}

/// 배치 경로 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 정규화된 이벤트 CSV 파일명
    pub events_file: String,
    /// 알림 CSV 파일명
    pub alerts_file: String,
    /// 탐지 규칙 문서 경로 (JSON 또는 YAML)
    pub rules_path: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            events_file: "events.csv".to_owned(),
            alerts_file: "alerts.csv".to_owned(),
            rules_path: "config/rules.json".to_owned(),
        }
    }
}

/// WEF 라이브 수집기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// WS-Man 엔드포인트
    pub endpoint: String,
    /// 구독 컬렉션 URI (엔드포인트 뒤에 붙음)
    pub collection_uri: String,
    /// 폴링 간격 (초)
    pub poll_interval_secs: u64,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 라이브 이벤트 CSV 파일명
    pub output_file: String,
    /// 열거 커서 저장 파일명
    pub cursor_file: String,
    /// 저장된 커서가 없을 때 사용할 열거 컨텍스트
    pub initial_context: String,
    /// 기본 인증 사용자명 (비어 있으면 인증 없음)
    pub username: String,
    /// 기본 인증 비밀번호
    #[serde(skip_serializing)]
    pub password: String,
}

impl CollectorConfig {
    /// 요청 대상 전체 URL
    pub fn target_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint.trim_end_matches('/'),
            self.collection_uri
        )
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://wef-server.contoso.com:5985/wsman".to_owned(),
            collection_uri: "/subscription/Microsoft-Windows-Security-Auditing".to_owned(),
            poll_interval_secs: 30,
            request_timeout_secs: 10,
            output_file: "wef_events_live.csv".to_owned(),
            cursor_file: "wef_cursor".to_owned(),
            initial_context: "1".to_owned(),
            username: String::new(),
            password: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
