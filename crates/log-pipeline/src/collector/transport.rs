//! WS-Man 전송 추상화
//!
//! [`WsmanTransport`]는 Pull 요청 한 번의 HTTP 교환을 추상화합니다.
//! 운영 환경은 [`ReqwestTransport`]를, 테스트는 `MockTransport`를 사용합니다.
//!
//! # 에러 매핑
//! - 연결 실패, 타임아웃: `LogPipelineError::Network`
//! - 2xx 이외의 상태 코드: `LogPipelineError::Protocol`

use std::future::Future;

use reqwest::header::CONTENT_TYPE;

use crate::config::LiveCollectorConfig;
use crate::error::LogPipelineError;

use super::wsman;

/// Pull 요청 전송 trait
pub trait WsmanTransport: Send + Sync + 'static {
    /// 요청 본문을 보내고 응답 본문을 반환합니다.
    fn pull(&self, body: String) -> impl Future<Output = Result<String, LogPipelineError>> + Send;
}

/// reqwest 기반 HTTP 전송
pub struct ReqwestTransport {
    client: reqwest::Client,
    url: String,
    credentials: Option<(String, String)>,
}

impl ReqwestTransport {
    /// 수집기 설정으로 HTTP 클라이언트를 만듭니다.
    pub fn new(config: &LiveCollectorConfig) -> Result<Self, LogPipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LogPipelineError::Config {
                field: "collector".to_owned(),
                reason: format!("failed to build http client: {e}"),
            })?;

        Ok(Self {
            client,
            url: config.target_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// 요청 대상 URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WsmanTransport for ReqwestTransport {
    async fn pull(&self, body: String) -> Result<String, LogPipelineError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, wsman::CONTENT_TYPE)
            .body(body);

        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LogPipelineError::Network(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogPipelineError::Protocol(format!(
                "{} returned HTTP {status}",
                self.url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| LogPipelineError::Network(format!("failed to read response body: {e}")))
    }
}

/// 테스트용 응답 스크립트
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 응답 본문
    Body(String),
    /// 네트워크 실패
    Network,
    /// 비정상 상태 코드
    Status(u16),
}

/// 테스트용 Mock 전송
///
/// 스크립트된 응답을 순서대로 반환하고, 스크립트가 끝나면 네트워크 실패를 반환합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    replies: std::sync::Mutex<std::collections::VecDeque<MockReply>>,
    requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// 지금까지 받은 요청 본문
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl WsmanTransport for MockTransport {
    async fn pull(&self, body: String) -> Result<String, LogPipelineError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(body);
        }
        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Status(code)) => {
                Err(LogPipelineError::Protocol(format!("mock returned HTTP {code}")))
            }
            Some(MockReply::Network) | None => {
                Err(LogPipelineError::Network("mock connection refused".to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_replays_script_then_fails() {
        let transport = MockTransport::new([
            MockReply::Body("<Envelope/>".to_owned()),
            MockReply::Status(500),
        ]);

        assert_eq!(transport.pull("a".to_owned()).await.unwrap(), "<Envelope/>");
        assert!(matches!(
            transport.pull("b".to_owned()).await,
            Err(LogPipelineError::Protocol(_))
        ));
        assert!(matches!(
            transport.pull("c".to_owned()).await,
            Err(LogPipelineError::Network(_))
        ));
        assert_eq!(transport.requests(), vec!["a", "b", "c"]);
    }

    #[test]
    fn reqwest_transport_uses_target_url() {
        let config = LiveCollectorConfig::default();
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.url(), config.target_url);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let config = LiveCollectorConfig {
            target_url: "http://127.0.0.1:9/wsman".to_owned(),
            request_timeout: std::time::Duration::from_secs(2),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        let err = transport.pull(String::new()).await.unwrap_err();
        assert!(matches!(err, LogPipelineError::Network(_)));
    }
}
