//! 파이프라인 trait -- 모듈 확장 포인트 정의

use crate::types::{Alert, EventRecord};

/// 탐지 로직을 구현하는 trait
///
/// 각 탐지기는 배치 전체를 입력으로 받아 독립적으로 평가됩니다.
/// 실행 간 상태를 유지하지 않으므로 같은 입력에는 항상 같은 알림을 같은 순서로 반환해야 합니다.
pub trait Detector: Send + Sync {
    /// 탐지기 이름
    fn name(&self) -> &str;

    /// 이벤트 레코드 배치를 평가하여 알림 목록을 반환
    fn evaluate(&self, records: &[EventRecord]) -> Vec<Alert>;
}
