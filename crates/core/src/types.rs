//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 수집 경로(EVTX 배치 파싱, WEF 라이브 수집)는 [`EventRecord`]라는
//! 단일 스키마로 정규화되며, 탐지 엔진은 [`Alert`]를 생성합니다.
//!
//! CSV 컬럼 순서는 필드 선언 순서를 따릅니다.
//! - 이벤트: `timestamp,event_id,user,domain,ip,source_host,details`
//! - 알림: `type,user,time,risk,details`

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 값이 없는 문자열 필드에 사용하는 센티널
///
/// 그룹핑 키가 항상 비교 가능하도록 빈 문자열이나 null 대신 사용합니다.
pub const NOT_AVAILABLE: &str = "N/A";

/// 알림 `time` 컬럼 형식
pub const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 정규화된 보안 이벤트 레코드
///
/// 생성 후에는 변경할 수 없습니다. 필드는 비공개이며 접근자로만 읽습니다.
/// `user`, `domain`, `ip`, `source_host`는 절대 비어 있지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(with = "event_time")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_event_id")]
    event_id: Option<u32>,
    #[serde(deserialize_with = "sentinel_or_value")]
    user: String,
    #[serde(deserialize_with = "sentinel_or_value")]
    domain: String,
    #[serde(deserialize_with = "sentinel_or_value")]
    ip: String,
    #[serde(deserialize_with = "sentinel_or_value")]
    source_host: String,
    details: String,
}

impl EventRecord {
    /// 모든 설명 필드가 센티널인 레코드를 만듭니다.
    ///
    /// `details`는 `event_id`로부터만 결정됩니다.
    pub fn new(timestamp: Option<DateTime<Utc>>, event_id: Option<u32>) -> Self {
        Self {
            timestamp,
            event_id,
            user: NOT_AVAILABLE.to_owned(),
            domain: NOT_AVAILABLE.to_owned(),
            ip: NOT_AVAILABLE.to_owned(),
            source_host: NOT_AVAILABLE.to_owned(),
            details: details_for(event_id),
        }
    }

    /// 사용자명을 설정합니다. 빈 값은 센티널로 대체됩니다.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = or_sentinel(user);
        self
    }

    /// 도메인을 설정합니다.
    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = or_sentinel(domain);
        self
    }

    /// 원격 IP를 설정합니다.
    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = or_sentinel(ip);
        self
    }

    /// 원본 호스트(워크스테이션)를 설정합니다.
    pub fn with_source_host(mut self, host: Option<String>) -> Self {
        self.source_host = or_sentinel(host);
        self
    }

    /// 이벤트 시각. `None`은 "알 수 없는 시각"입니다.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn event_id(&self) -> Option<u32> {
        self.event_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn source_host(&self) -> &str {
        &self.source_host
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// 주어진 이벤트 ID와 일치하는지 확인합니다.
    pub fn is_event(&self, id: u32) -> bool {
        self.event_id == Some(id)
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self
            .timestamp
            .map(format_event_time)
            .unwrap_or_else(|| "unknown-time".to_owned());
        write!(f, "[{}] {} user={} host={}", ts, self.details, self.user, self.source_host)
    }
}

fn details_for(event_id: Option<u32>) -> String {
    match event_id {
        Some(id) => format!("Event ID {id}"),
        None => "Event ID unknown".to_owned(),
    }
}

fn or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// 알림 유형
///
/// 평가 순서와 동일한 순서로 선언되어 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// 업무 외 시간 로그인 (4624)
    #[serde(rename = "After-Hours Login")]
    AfterHoursLogin,
    /// 대량 파일 접근 (4663)
    #[serde(rename = "Mass File Access")]
    MassFileAccess,
    /// 이동식 저장장치 접근 (4664)
    #[serde(rename = "USB Device Access")]
    UsbDeviceAccess,
}

impl AlertKind {
    /// 유형별 고정 위험도
    pub fn risk(self) -> Risk {
        match self {
            Self::AfterHoursLogin | Self::MassFileAccess => Risk::High,
            Self::UsbDeviceAccess => Risk::Medium,
        }
    }

    /// 메트릭 레이블 등에 쓰는 짧은 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AfterHoursLogin => "after_hours_login",
            Self::MassFileAccess => "mass_file_access",
            Self::UsbDeviceAccess => "usb_device_access",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterHoursLogin => write!(f, "After-Hours Login"),
            Self::MassFileAccess => write!(f, "Mass File Access"),
            Self::UsbDeviceAccess => write!(f, "USB Device Access"),
        }
    }
}

/// 위험도 (`Medium < High`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Risk {
    Medium,
    High,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// 탐지 결과
///
/// 배치 실행마다 처음부터 다시 생성되며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    kind: AlertKind,
    user: String,
    #[serde(with = "alert_time")]
    time: Option<DateTime<Utc>>,
    risk: Risk,
    details: String,
}

impl Alert {
    /// 새 알림을 만듭니다. 위험도는 유형에서 결정됩니다.
    pub fn new(
        kind: AlertKind,
        user: impl Into<String>,
        time: Option<DateTime<Utc>>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            user: or_sentinel(Some(user.into())),
            time,
            risk: kind.risk(),
            details: details.into(),
        }
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    pub fn risk(&self) -> Risk {
        self.risk
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .time
            .map(format_alert_time)
            .unwrap_or_else(|| "unknown-time".to_owned());
        write!(
            f,
            "[{}] {} user={} at {}: {}",
            self.risk, self.kind, self.user, time, self.details
        )
    }
}

// --- 시각 헬퍼 ---

/// 타임스탬프 문자열을 파싱합니다.
///
/// RFC 3339(Windows `SystemTime`의 7자리 소수 초 포함)와
/// 타임존 없는 `YYYY-MM-DD[T ]HH:MM:SS[.f]` 형식(UTC로 간주)을 허용합니다.
/// 빈 문자열이나 해석할 수 없는 값은 `None`입니다.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// 이벤트 CSV의 `timestamp` 표현 (RFC 3339, 마이크로초, `Z`)
pub fn format_event_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 알림 CSV의 `time` 표현
pub fn format_alert_time(ts: DateTime<Utc>) -> String {
    ts.format(ALERT_TIME_FORMAT).to_string()
}

/// 정시로 내림한 시각을 반환합니다.
pub fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

// --- serde 헬퍼 ---

mod event_time {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format_event_time(*ts)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(parse_timestamp(&raw))
    }
}

mod alert_time {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format_alert_time(*ts)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(parse_timestamp(&raw))
    }
}

fn lenient_event_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse().ok())
}

fn sentinel_or_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(or_sentinel(Some(raw)))
}
