//! WEF 라이브 수집 모듈 -- WS-Management Pull로 전달된 이벤트를 수집합니다.
//!
//! # 구성
//! - [`wsman`]: Pull 요청 본문 생성과 응답 해석
//! - [`transport`]: HTTP 교환 추상화 ([`WsmanTransport`], [`ReqwestTransport`])
//! - [`cursor`]: 열거 컨텍스트 파일 저장소
//! - [`live`]: 취소 가능한 고정 간격 폴링 루프 ([`LiveCollector`])
//!
//! # 아키텍처
//! ```text
//! LiveCollector --pull--> WsmanTransport --HTTP--> WEF server
//!      |                        |
//!      |<-- PullResponse -------+
//!      v
//! append_events (live CSV)   CursorStore (EnumerationContext)
//! ```

pub mod cursor;
pub mod live;
pub mod transport;
pub mod wsman;

pub use cursor::CursorStore;
pub use live::{CollectorStats, LiveCollector};
pub use transport::{ReqwestTransport, WsmanTransport};
pub use wsman::{PullResponse, build_pull_request, parse_pull_response};
