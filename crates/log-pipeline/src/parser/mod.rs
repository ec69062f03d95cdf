//! 이벤트 파싱 모듈 -- EVTX 컨테이너와 이벤트 XML을 [`EventRecord`]로 정규화합니다.
//!
//! # 구성
//! - [`xml`]: XML 트리와 네임스페이스 무관 [`FieldLookup`]
//! - [`extractor`]: 이벤트 XML 한 건 -> [`EventRecord`]
//! - [`batch`]: 컨테이너 전체를 순회하는 [`BatchLogParser`]
//!
//! # 사용 예시
//! ```ignore
//! use evtsentry_log_pipeline::parser::BatchLogParser;
//!
//! let outcome = BatchLogParser::new().parse_file(Path::new("Security.evtx"))?;
//! println!("{}", outcome.stats);
//! ```
//!
//! [`EventRecord`]: evtsentry_core::types::EventRecord

pub mod batch;
pub mod extractor;
pub mod xml;

pub use batch::{BatchLogParser, ParseOutcome, ParseStats};
pub use extractor::{extract_event, extract_from_xml};
pub use xml::{FieldLookup, XmlNode};
