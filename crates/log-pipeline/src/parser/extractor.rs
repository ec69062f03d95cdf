//! EVTX 레코드 추출기 -- 이벤트 XML 한 건을 [`EventRecord`]로 변환합니다.
//!
//! 각 필드 조회는 독립적이며 최선 노력 방식입니다. 한 필드를 찾지 못하거나
//! 해석하지 못해도 다른 필드 추출은 계속되고, 해당 필드만 센티널로 남습니다.
//! 부수 효과가 없는 순수 변환입니다.

use evtsentry_core::types::{EventRecord, parse_timestamp};

use crate::error::LogPipelineError;

use super::xml::{FieldLookup, XmlNode};

/// 레코드 루트 요소의 로컬 이름
const EVENT_ELEMENT: &str = "Event";

/// 필드 이름 (Security 감사 스키마)
const FIELD_EVENT_ID: &str = "EventID";
const FIELD_TIME_CREATED: &str = "TimeCreated";
const ATTR_SYSTEM_TIME: &str = "SystemTime";
const FIELD_USER: &str = "TargetUserName";
const FIELD_DOMAIN: &str = "TargetDomainName";
const FIELD_IP: &str = "IpAddress";
const FIELD_HOST: &str = "WorkstationName";

/// 파싱된 이벤트 트리에서 레코드를 추출합니다.
///
/// # Errors
/// 루트가 `Event` 요소가 아니면 레코드 전체가 실패합니다.
/// 개별 필드 실패는 에러가 아니라 센티널로 처리됩니다.
pub fn extract_event<L>(tree: &L) -> Result<EventRecord, LogPipelineError>
where
    L: FieldLookup + ?Sized,
{
    if tree.root_name() != EVENT_ELEMENT {
        return Err(LogPipelineError::Extraction(format!(
            "expected <{EVENT_ELEMENT}> root, found <{}>",
            tree.root_name()
        )));
    }

    let timestamp = tree
        .find_attribute(FIELD_TIME_CREATED, ATTR_SYSTEM_TIME)
        .and_then(|raw| parse_timestamp(&raw));

    let event_id = tree
        .find_text(FIELD_EVENT_ID)
        .and_then(|raw| raw.trim().parse::<u32>().ok());

    Ok(EventRecord::new(timestamp, event_id)
        .with_user(tree.find_field(FIELD_USER))
        .with_domain(tree.find_field(FIELD_DOMAIN))
        .with_ip(tree.find_field(FIELD_IP))
        .with_source_host(tree.find_field(FIELD_HOST)))
}

/// XML 문자열을 파싱한 뒤 레코드를 추출합니다.
pub fn extract_from_xml(xml: &str) -> Result<EventRecord, LogPipelineError> {
    let tree = XmlNode::parse(xml)?;
    extract_event(&tree)
}
