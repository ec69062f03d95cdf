//! 탐지 규칙 -- 규칙 설정과 세 가지 탐지기
//!
//! 규칙 문서는 탐지 패턴을 추가하지 않고 기존 탐지기의 임계값과 시간 구간만 조정합니다.
//!
//! # 규칙 형식
//! ```yaml
//! after_hours_window: [2, 5]
//! file_access_threshold: 10
//! ```
//!
//! # 구성
//! - [`types`]: [`RuleSet`] 정의와 값 검증
//! - [`loader`]: JSON/YAML 문서 로딩
//! - [`detectors`]: [`AfterHoursLogin`], [`MassFileAccess`], [`UsbDeviceAccess`]

pub mod detectors;
pub mod loader;
pub mod types;

pub use detectors::{AfterHoursLogin, MassFileAccess, UsbDeviceAccess};
pub use types::RuleSet;

/// 로그인 성공
pub const EVENT_LOGON: u32 = 4624;

/// 객체 접근 시도
pub const EVENT_FILE_ACCESS: u32 = 4663;

/// 이동식 저장장치 접근
pub const EVENT_REMOVABLE_STORAGE: u32 = 4664;
