//! 탐지기 구현 -- 업무 외 로그인, 대량 파일 접근, 이동식 저장장치 접근
//!
//! 각 탐지기는 [`Detector`]를 구현하며 배치 전체를 독립적으로 평가합니다.
//! 시각이 알려지지 않은 레코드는 시간 조건이 있는 탐지기에서 제외됩니다.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use evtsentry_core::pipeline::Detector;
use evtsentry_core::types::{Alert, AlertKind, EventRecord, floor_to_hour};

use super::{EVENT_FILE_ACCESS, EVENT_LOGON, EVENT_REMOVABLE_STORAGE};

/// 업무 외 시간 로그인 탐지기 (4624)
///
/// 로그인 시각의 시(hour)가 `[start, end]`에 포함되면 레코드마다 알림 하나를 생성합니다.
/// `start > end`인 구간은 자정을 넘기지 않으므로 아무것도 일치하지 않습니다.
#[derive(Debug, Clone)]
pub struct AfterHoursLogin {
    start: u32,
    end: u32,
}

impl AfterHoursLogin {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl Detector for AfterHoursLogin {
    fn name(&self) -> &str {
        AlertKind::AfterHoursLogin.as_str()
    }

    fn evaluate(&self, records: &[EventRecord]) -> Vec<Alert> {
        records
            .iter()
            .filter(|r| r.is_event(EVENT_LOGON))
            .filter_map(|r| r.timestamp().map(|ts| (r, ts)))
            .filter(|(_, ts)| (self.start..=self.end).contains(&ts.hour()))
            .map(|(r, ts)| {
                Alert::new(
                    AlertKind::AfterHoursLogin,
                    r.user(),
                    Some(ts),
                    format!("Suspicious login at {}:00", ts.hour()),
                )
            })
            .collect()
    }
}

/// 대량 파일 접근 탐지기 (4663)
///
/// `(user, 정시로 내린 시각)` 버킷별로 접근 수를 세고, 임계값을 초과한 버킷마다
/// 알림 하나를 생성합니다. 버킷은 사용자, 시각 순으로 정렬되어 보고됩니다.
#[derive(Debug, Clone)]
pub struct MassFileAccess {
    threshold: u64,
}

impl MassFileAccess {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }
}

impl Detector for MassFileAccess {
    fn name(&self) -> &str {
        AlertKind::MassFileAccess.as_str()
    }

    fn evaluate(&self, records: &[EventRecord]) -> Vec<Alert> {
        let mut buckets: BTreeMap<(&str, DateTime<Utc>), u64> = BTreeMap::new();

        for record in records.iter().filter(|r| r.is_event(EVENT_FILE_ACCESS)) {
            let Some(ts) = record.timestamp() else {
                continue;
            };
            *buckets.entry((record.user(), floor_to_hour(ts))).or_default() += 1;
        }

        buckets
            .into_iter()
            .filter(|(_, count)| *count > self.threshold)
            .map(|((user, hour), count)| {
                Alert::new(
                    AlertKind::MassFileAccess,
                    user,
                    Some(hour),
                    format!("Accessed {count} files in one hour"),
                )
            })
            .collect()
    }
}

/// 이동식 저장장치 접근 탐지기 (4664)
///
/// 시간 조건이 없으므로 시각을 모르는 레코드도 알림을 생성합니다.
#[derive(Debug, Clone, Default)]
pub struct UsbDeviceAccess;

impl Detector for UsbDeviceAccess {
    fn name(&self) -> &str {
        AlertKind::UsbDeviceAccess.as_str()
    }

    fn evaluate(&self, records: &[EventRecord]) -> Vec<Alert> {
        records
            .iter()
            .filter(|r| r.is_event(EVENT_REMOVABLE_STORAGE))
            .map(|r| {
                Alert::new(
                    AlertKind::UsbDeviceAccess,
                    r.user(),
                    r.timestamp(),
                    "Removable storage accessed",
                )
            })
            .collect()
    }
}
