//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 카운터 호출은 아무 동작도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `evtsentry_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(evtsentry_core::metrics::RECORDS_PARSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 탐지 규칙 레이블 키 (after_hours_login, mass_file_access, usb_device_access)
pub const LABEL_RULE: &str = "rule";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 배치 파서 메트릭 ───────────────────────────────────────────────

/// 정규화에 성공한 레코드 수 (counter)
pub const RECORDS_PARSED_TOTAL: &str = "evtsentry_records_parsed_total";

/// 손상되어 건너뛴 레코드 수 (counter)
pub const RECORDS_SKIPPED_TOTAL: &str = "evtsentry_records_skipped_total";

// ─── 알림 엔진 메트릭 ───────────────────────────────────────────────

/// 생성된 알림 수 (counter, label: rule)
pub const ALERTS_GENERATED_TOTAL: &str = "evtsentry_alerts_generated_total";

// ─── 라이브 수집기 메트릭 ───────────────────────────────────────────

/// 폴링 시도 수 (counter, label: result)
pub const COLLECTOR_POLLS_TOTAL: &str = "evtsentry_collector_polls_total";

/// 수집된 이벤트 수 (counter)
pub const COLLECTOR_EVENTS_TOTAL: &str = "evtsentry_collector_events_total";
