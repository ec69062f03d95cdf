//! WS-Management 열거 Pull 교환
//!
//! 요청은 `EnumerationContext` 하나를 담은 SOAP 1.2 `Pull` 본문입니다.
//! 응답의 각 `Item` 안에 있는 `Event` 요소를 추출기로 정규화합니다.
//! 응답이 새 `EnumerationContext`를 담고 있으면 다음 요청에 사용합니다.

use evtsentry_core::types::EventRecord;
use quick_xml::escape::escape;

use crate::error::LogPipelineError;
use crate::parser::extractor::extract_event;
use crate::parser::xml::XmlNode;

/// SOAP 1.2 엔벨로프 네임스페이스
pub const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// WS-Enumeration 네임스페이스
pub const ENUMERATION_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/enumeration";

/// 요청 Content-Type
pub const CONTENT_TYPE: &str = "application/soap+xml; charset=UTF-8";

/// Pull 응답 해석 결과
#[derive(Debug, Clone, Default)]
pub struct PullResponse {
    /// 응답에 포함된 다음 열거 컨텍스트
    pub context: Option<String>,
    /// 정규화된 이벤트 (응답 순서)
    pub records: Vec<EventRecord>,
    /// `Event`가 없거나 추출에 실패해 건너뛴 항목 수
    pub skipped: usize,
    /// 서버가 열거 종료를 알렸는지 여부
    pub end_of_sequence: bool,
}

/// Pull 요청 본문을 만듭니다.
pub fn build_pull_request(context: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="{SOAP_ENVELOPE_NS}" xmlns:n="{ENUMERATION_NS}">
  <s:Body>
    <n:Pull>
      <n:EnumerationContext>{}</n:EnumerationContext>
    </n:Pull>
  </s:Body>
</s:Envelope>"#,
        escape(context)
    )
}

/// Pull 응답 본문을 해석합니다.
///
/// # Errors
/// 본문이 XML로 해석되지 않으면 `Protocol` 에러를 반환합니다.
/// 개별 항목 실패는 에러가 아니며 `skipped`에 집계됩니다.
pub fn parse_pull_response(body: &str) -> Result<PullResponse, LogPipelineError> {
    let root = XmlNode::parse(body)
        .map_err(|e| LogPipelineError::Protocol(format!("unparseable pull response: {e}")))?;

    let context = root
        .find("EnumerationContext")
        .map(|n| n.text().trim().to_owned())
        .filter(|c| !c.is_empty());

    let mut response = PullResponse {
        context,
        end_of_sequence: root.find("EndOfSequence").is_some(),
        ..Default::default()
    };

    for (index, item) in root.find_all("Item").enumerate() {
        let Some(event) = item.find("Event") else {
            response.skipped += 1;
            tracing::debug!(index, "pull item without event, skipping");
            continue;
        };

        match extract_event(event) {
            Ok(record) => response.records.push(record),
            Err(e) => {
                response.skipped += 1;
                tracing::debug!(index, error = %e, "skipping malformed pull item");
            }
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtsentry_core::types::NOT_AVAILABLE;

    const RESPONSE: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"
            xmlns:n="http://schemas.xmlsoap.org/ws/2004/09/enumeration">
  <s:Body>
    <n:PullResponse>
      <n:EnumerationContext>uuid:7A6F0E12-0001</n:EnumerationContext>
      <n:Items>
        <n:Item>
          <Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event">
            <System>
              <EventID>4624</EventID>
              <TimeCreated SystemTime="2024-01-15T03:12:45.000Z"/>
            </System>
            <UserData>
              <LogonInfo><TargetUserName>alice</TargetUserName></LogonInfo>
            </UserData>
          </Event>
        </n:Item>
        <n:Item><Bookmark/></n:Item>
        <n:Item>
          <Event><System><EventID>4664</EventID></System></Event>
        </n:Item>
      </n:Items>
    </n:PullResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn request_carries_context() {
        let body = build_pull_request("uuid:abc");
        assert!(body.contains("<n:EnumerationContext>uuid:abc</n:EnumerationContext>"));
        assert!(body.contains(ENUMERATION_NS));

        let parsed = XmlNode::parse(&body).unwrap();
        assert_eq!(parsed.name(), "Envelope");
    }

    #[test]
    fn request_escapes_context() {
        let body = build_pull_request("a<b&c");
        assert!(body.contains("a&lt;b&amp;c"));
        assert!(XmlNode::parse(&body).is_ok());
    }

    #[test]
    fn parses_items_and_context() {
        let response = parse_pull_response(RESPONSE).unwrap();
        assert_eq!(response.context.as_deref(), Some("uuid:7A6F0E12-0001"));
        assert_eq!(response.records.len(), 2);
        assert_eq!(response.skipped, 1);
        assert!(!response.end_of_sequence);

        assert_eq!(response.records[0].event_id(), Some(4624));
        assert_eq!(response.records[0].user(), "alice");
        assert_eq!(response.records[1].event_id(), Some(4664));
        assert_eq!(response.records[1].user(), NOT_AVAILABLE);
        assert!(response.records[1].timestamp().is_none());
    }

    #[test]
    fn empty_response_has_no_records() {
        let body = r#"<Envelope><Body><PullResponse><EndOfSequence/></PullResponse></Body></Envelope>"#;
        let response = parse_pull_response(body).unwrap();
        assert!(response.records.is_empty());
        assert!(response.context.is_none());
        assert!(response.end_of_sequence);
    }

    #[test]
    fn garbage_body_is_protocol_error() {
        let err = parse_pull_response("<html><body>502 Bad Gateway").unwrap_err();
        assert!(matches!(err, LogPipelineError::Protocol(_)));
    }
}
