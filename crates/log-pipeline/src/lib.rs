#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: 이벤트 XML 트리, 네임스페이스 무관 필드 조회, EVTX 추출기와 배치 파서
//! - [`collector`]: WS-Man Pull 기반 WEF 라이브 수집기
//! - [`rule`]: 규칙 설정 로딩과 세 가지 탐지기
//! - [`alert`]: 탐지기를 고정 순서로 실행하는 알림 엔진
//! - [`sink`]: 이벤트/알림 CSV 기록 (원자적 덮어쓰기, 추가 쓰기)
//! - [`reader`]: 이벤트 CSV 읽기
//! - [`summary`]: 이벤트 요약 통계
//! - [`pipeline`]: 배치 실행 흐름
//! - [`config`]: 라이브 수집기 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입

pub mod alert;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod sink;
pub mod summary;

pub mod collector;
pub mod parser;
pub mod rule;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{BatchPipeline, BatchReport};

// 설정
pub use config::LiveCollectorConfig;

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{BatchLogParser, FieldLookup, ParseOutcome, ParseStats, XmlNode};

// 규칙
pub use rule::{AfterHoursLogin, MassFileAccess, RuleSet, UsbDeviceAccess};

// 수집기
pub use collector::{CollectorStats, LiveCollector, ReqwestTransport, WsmanTransport};

// 알림
pub use alert::AlertEngine;

// 요약
pub use summary::EventSummary;
