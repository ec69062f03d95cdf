//! 탐지 규칙 설정 타입
//!
//! JSON/YAML 규칙 문서에서 역직렬화되는 [`RuleSet`]을 정의합니다.

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 허용되는 최대 시(hour)
const MAX_HOUR: u32 = 23;

/// 탐지 규칙 설정 -- 배치 실행마다 한 번 로드되며 평가 중에는 변경되지 않습니다.
///
/// # 문서 스키마
/// ```json
/// {
///   "after_hours_window": [2, 5],
///   "file_access_threshold": 10
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// 업무 외 시간 구간 `(start_hour, end_hour)`, 양 끝 포함
    pub after_hours_window: (u32, u32),
    /// 시간당 파일 접근 임계값. 이 값을 초과해야 위반입니다.
    pub file_access_threshold: u64,
}

impl RuleSet {
    /// 규칙 값의 유효성을 검증합니다.
    ///
    /// 시각은 0..=23 범위여야 합니다. `start > end`는 에러가 아니며
    /// [`warnings`](Self::warnings)로 보고됩니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        let (start, end) = self.after_hours_window;
        for (field, hour) in [
            ("after_hours_window.start", start),
            ("after_hours_window.end", end),
        ] {
            if hour > MAX_HOUR {
                return Err(LogPipelineError::Config {
                    field: field.to_owned(),
                    reason: format!("hour must be between 0 and {MAX_HOUR}, got {hour}"),
                });
            }
        }
        Ok(())
    }

    /// 유효하지만 의도와 다를 수 있는 설정에 대한 경고
    ///
    /// 시작 시각이 종료 시각보다 크면 자정을 넘기는 구간으로 해석하지 않으므로
    /// 어떤 로그인도 일치하지 않습니다.
    pub fn warnings(&self) -> Vec<String> {
        let (start, end) = self.after_hours_window;
        let mut warnings = Vec::new();
        if start > end {
            warnings.push(format!(
                "after_hours_window [{start}, {end}] has start > end; \
                 the window does not wrap past midnight and will match no logins"
            ));
        }
        warnings
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            after_hours_window: (2, 5),
            file_access_threshold: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_is_valid() {
        let rules = RuleSet::default();
        rules.validate().unwrap();
        assert!(rules.warnings().is_empty());
    }

    #[test]
    fn hour_out_of_range_is_rejected() {
        let rules = RuleSet {
            after_hours_window: (2, 24),
            file_access_threshold: 10,
        };
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("after_hours_window.end"));
    }

    #[test]
    fn inverted_window_is_valid_with_warning() {
        let rules = RuleSet {
            after_hours_window: (22, 5),
            file_access_threshold: 10,
        };
        rules.validate().unwrap();
        let warnings = rules.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("[22, 5]"));
    }

    #[test]
    fn single_hour_window_has_no_warning() {
        let rules = RuleSet {
            after_hours_window: (3, 3),
            file_access_threshold: 0,
        };
        assert!(rules.warnings().is_empty());
    }
}
