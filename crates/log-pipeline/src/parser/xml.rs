//! 이벤트 XML 트리와 네임스페이스 무관 필드 조회
//!
//! 이벤트 제공자마다 네임스페이스 선언이 달라서, 요소와 속성은
//! 접두어/URI를 버린 로컬 이름으로만 저장하고 비교합니다.
//! 추출기는 [`FieldLookup`] trait만 사용하므로 XML 라이브러리와 분리되어 있습니다.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::LogPipelineError;

/// 네임스페이스 무관 필드 조회 기능
///
/// 모든 조회는 문서 순서(전위 순회)로 첫 번째 일치 항목을 반환합니다.
pub trait FieldLookup {
    /// 루트 요소의 로컬 이름
    fn root_name(&self) -> &str;

    /// 로컬 이름이 일치하는 첫 요소의 텍스트
    ///
    /// 요소가 있으면 텍스트가 비어 있어도 `Some("")`을 반환합니다.
    fn find_text(&self, local_name: &str) -> Option<String>;

    /// 로컬 이름이 일치하는 첫 요소의 속성 값
    fn find_attribute(&self, local_name: &str, attribute: &str) -> Option<String>;

    /// 이름이 `name`인 요소 또는 `<Data Name="name">` 요소의 텍스트
    ///
    /// `UserData` 스타일과 `EventData` 스타일 페이로드를 모두 지원합니다.
    fn find_field(&self, name: &str) -> Option<String>;
}

/// 파싱된 XML 요소
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// XML 문서를 트리로 파싱합니다.
    ///
    /// # Errors
    /// 잘 구성되지 않은 문서, 루트 요소가 없거나 둘 이상인 문서는
    /// `LogPipelineError::Extraction`을 반환합니다.
    pub fn parse(xml: &str) -> Result<Self, LogPipelineError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(Self::open(&e)?),
                Ok(Event::Empty(e)) => {
                    let node = Self::open(&e)?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack.pop().ok_or_else(|| {
                        LogPipelineError::Extraction(format!(
                            "unexpected closing tag at position {position}"
                        ))
                    })?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(t)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t.unescape().map_err(|e| {
                            LogPipelineError::Extraction(format!(
                                "invalid text at position {position}: {e}"
                            ))
                        })?;
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(LogPipelineError::Extraction(format!(
                        "malformed xml at position {position}: {e}"
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(LogPipelineError::Extraction(format!(
                "unclosed element <{}>",
                stack.last().map(|n| n.name.as_str()).unwrap_or_default()
            )));
        }

        root.ok_or_else(|| LogPipelineError::Extraction("document has no root element".to_owned()))
    }

    fn open(start: &BytesStart<'_>) -> Result<Self, LogPipelineError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                LogPipelineError::Extraction(format!("invalid attribute on <{name}>: {e}"))
            })?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| {
                LogPipelineError::Extraction(format!("invalid attribute value on <{name}>: {e}"))
            })?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn attach(
        stack: &mut [XmlNode],
        root: &mut Option<XmlNode>,
        node: XmlNode,
    ) -> Result<(), LogPipelineError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => {
                return Err(LogPipelineError::Extraction(
                    "document has more than one root element".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// 요소의 로컬 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 요소 텍스트 (앞뒤 공백 제거됨)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 속성 값 (로컬 이름 기준)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// 직계 자식 요소
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// 자기 자신을 포함한 전위 순회
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// 로컬 이름이 일치하는 첫 요소
    pub fn find(&self, local_name: &str) -> Option<&XmlNode> {
        self.descendants().find(|n| n.name == local_name)
    }

    /// 로컬 이름이 일치하는 모든 요소 (문서 순서)
    pub fn find_all<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.descendants().filter(move |n| n.name == local_name)
    }
}

impl FieldLookup for XmlNode {
    fn root_name(&self) -> &str {
        &self.name
    }

    fn find_text(&self, local_name: &str) -> Option<String> {
        self.find(local_name).map(|n| n.text.clone())
    }

    fn find_attribute(&self, local_name: &str, attribute: &str) -> Option<String> {
        self.find(local_name)
            .and_then(|n| n.attribute(attribute))
            .map(str::to_owned)
    }

    fn find_field(&self, name: &str) -> Option<String> {
        self.descendants()
            .find(|n| n.name == name || (n.name == "Data" && n.attribute("Name") == Some(name)))
            .map(|n| n.text.clone())
    }
}

/// 전위 순회 반복자
pub struct Descendants<'a> {
    stack: Vec<&'a XmlNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
