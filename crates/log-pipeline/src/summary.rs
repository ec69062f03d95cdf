//! 이벤트 요약 통계
//!
//! 대시보드가 읽어 가는 집계 값을 코어에서 계산합니다.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Timelike;
use evtsentry_core::types::{EventRecord, NOT_AVAILABLE};
use serde::Serialize;

use crate::rule::{EVENT_FILE_ACCESS, EVENT_LOGON, EVENT_REMOVABLE_STORAGE};

/// 중요 이벤트로 집계하는 ID
pub const CRITICAL_EVENT_IDS: [u32; 3] = [EVENT_LOGON, EVENT_FILE_ACCESS, EVENT_REMOVABLE_STORAGE];

/// 이벤트 배치 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// 전체 이벤트 수
    pub total_events: usize,
    /// 센티널을 제외한 고유 사용자 수
    pub unique_users: usize,
    /// 중요 이벤트 수 (4624, 4663, 4664)
    pub critical_events: usize,
    /// 시간대별 로그인 수. 0건인 시간대는 포함하지 않습니다.
    pub logins_by_hour: BTreeMap<u32, usize>,
}

impl EventSummary {
    pub fn from_records(records: &[EventRecord]) -> Self {
        let users: BTreeSet<&str> = records
            .iter()
            .map(EventRecord::user)
            .filter(|u| *u != NOT_AVAILABLE)
            .collect();

        let critical_events = records
            .iter()
            .filter(|r| r.event_id().is_some_and(|id| CRITICAL_EVENT_IDS.contains(&id)))
            .count();

        let mut logins_by_hour = BTreeMap::new();
        for ts in records
            .iter()
            .filter(|r| r.is_event(EVENT_LOGON))
            .filter_map(EventRecord::timestamp)
        {
            *logins_by_hour.entry(ts.hour()).or_insert(0) += 1;
        }

        Self {
            total_events: records.len(),
            unique_users: users.len(),
            critical_events,
            logins_by_hour,
        }
    }
}
