//! 알림 엔진 -- 이벤트 배치에 탐지기를 고정된 순서로 적용합니다.
//!
//! [`AlertEngine`]은 [`RuleSet`]으로부터 탐지기 목록을 구성하고,
//! 각 탐지기의 결과를 평가 순서대로 이어 붙여 반환합니다.
//! 실행 간 상태가 없으므로 같은 입력에는 항상 같은 알림 시퀀스가 나옵니다.

use evtsentry_core::metrics as m;
use evtsentry_core::pipeline::Detector;
use evtsentry_core::types::{Alert, EventRecord};

use crate::rule::{AfterHoursLogin, MassFileAccess, RuleSet, UsbDeviceAccess};

/// 알림 엔진
///
/// 평가 순서: 업무 외 로그인, 대량 파일 접근, 이동식 저장장치 접근.
pub struct AlertEngine {
    rules: RuleSet,
    detectors: Vec<Box<dyn Detector>>,
}

impl AlertEngine {
    /// 규칙 설정으로 엔진을 만듭니다.
    pub fn new(rules: RuleSet) -> Self {
        let (start, end) = rules.after_hours_window;
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(AfterHoursLogin::new(start, end)),
            Box::new(MassFileAccess::new(rules.file_access_threshold)),
            Box::new(UsbDeviceAccess),
        ];
        Self { rules, detectors }
    }

    /// 엔진이 사용하는 규칙 설정
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 탐지기 이름 목록 (평가 순서)
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// 배치 전체를 평가하여 알림을 반환합니다.
    ///
    /// 반환된 알림의 소유권은 호출자에게 넘어갑니다.
    pub fn evaluate(&self, records: &[EventRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for detector in &self.detectors {
            let found = detector.evaluate(records);
            tracing::debug!(
                detector = detector.name(),
                count = found.len(),
                "detector evaluated"
            );
            metrics::counter!(m::ALERTS_GENERATED_TOTAL, m::LABEL_RULE => detector.name().to_owned())
                .increment(found.len() as u64);
            alerts.extend(found);
        }

        tracing::info!(
            events = records.len(),
            alerts = alerts.len(),
            "alert evaluation completed"
        );
        alerts
    }
}
