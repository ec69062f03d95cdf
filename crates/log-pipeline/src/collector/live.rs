//! WEF 라이브 수집기
//!
//! 고정 간격으로 Pull 교환을 수행하고 결과를 라이브 CSV에 추가합니다.
//! 반복 하나의 실패(네트워크, 프로토콜, 기록)는 로그만 남기고 다음 반복으로 넘어갑니다.
//! 취소 토큰은 대기 구간에서만 확인하므로 진행 중인 교환은 끝나거나 타임아웃될 때까지 유지됩니다.

use std::path::PathBuf;

use evtsentry_core::metrics as m;
use evtsentry_core::types::EventRecord;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::LiveCollectorConfig;
use crate::error::LogPipelineError;
use crate::sink;

use super::cursor::CursorStore;
use super::transport::WsmanTransport;
use super::wsman::{build_pull_request, parse_pull_response};

/// 수집기 누적 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectorStats {
    /// 수행한 폴링 수
    pub polls: u64,
    /// 실패한 폴링 수
    pub failures: u64,
    /// 기록한 이벤트 수
    pub events: u64,
}

/// WEF 라이브 수집기
pub struct LiveCollector<T> {
    config: LiveCollectorConfig,
    transport: T,
    cancel: CancellationToken,
    context: String,
    cursor: Option<CursorStore>,
    stats: CollectorStats,
}

impl<T: WsmanTransport> LiveCollector<T> {
    /// 새 수집기를 생성합니다. 열거 컨텍스트는 `initial_context`에서 시작합니다.
    pub fn new(config: LiveCollectorConfig, transport: T, cancel: CancellationToken) -> Self {
        let cursor = config.cursor_path.clone().map(CursorStore::new);
        Self {
            context: config.initial_context.clone(),
            config,
            transport,
            cancel,
            cursor,
            stats: CollectorStats::default(),
        }
    }

    /// 현재 열거 컨텍스트
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 저장된 커서가 있으면 현재 컨텍스트로 사용합니다.
    pub async fn restore_cursor(&mut self) {
        let Some(store) = &self.cursor else {
            return;
        };
        if let Some(saved) = store.load().await {
            tracing::info!(path = %store.path().display(), context = %saved, "resuming from saved cursor");
            self.context = saved;
        }
    }

    /// Pull 교환 한 번을 수행하고 받은 이벤트를 라이브 CSV에 추가합니다.
    ///
    /// 새 컨텍스트는 기록이 성공한 뒤에만 채택됩니다.
    /// `EndOfSequence`를 받으면 저장된 커서를 지우고 `initial_context`에서 다시 시작합니다.
    /// 반환값은 기록한 이벤트 수입니다.
    pub async fn poll_once(&mut self) -> Result<usize, LogPipelineError> {
        let body = build_pull_request(&self.context);
        let raw = self.transport.pull(body).await?;
        let response = parse_pull_response(&raw)?;

        if response.skipped > 0 {
            tracing::debug!(skipped = response.skipped, "pull items skipped");
        }

        let count = response.records.len();
        append(self.config.output_path.clone(), response.records).await?;

        if response.end_of_sequence {
            self.reset_context().await;
        } else if let Some(next) = response.context
            && next != self.context
        {
            self.adopt_context(next).await;
        }

        Ok(count)
    }

    /// 서버가 해제한 컨텍스트를 버리고 `initial_context`로 돌아갑니다.
    async fn reset_context(&mut self) {
        tracing::warn!(
            context = %self.context,
            initial = %self.config.initial_context,
            "server reported end of sequence, restarting from initial context"
        );
        self.context = self.config.initial_context.clone();
        if let Some(store) = &self.cursor
            && let Err(e) = store.clear().await
        {
            tracing::warn!(error = %e, "failed to remove enumeration cursor");
        }
    }

    async fn adopt_context(&mut self, next: String) {
        tracing::debug!(from = %self.context, to = %next, "enumeration context advanced");
        self.context = next;
        if let Some(store) = &self.cursor
            && let Err(e) = store.save(&self.context).await
        {
            tracing::warn!(error = %e, "failed to persist enumeration cursor");
        }
    }

    /// 취소될 때까지 폴링 루프를 실행합니다.
    ///
    /// 반복마다 결과와 관계없이 `poll_interval`만큼 대기합니다.
    pub async fn run(&mut self) -> CollectorStats {
        self.restore_cursor().await;
        tracing::info!(
            url = %self.config.target_url,
            interval_secs = self.config.poll_interval.as_secs(),
            output = %self.config.output_path.display(),
            "live collector started"
        );

        while !self.cancel.is_cancelled() {
            self.stats.polls += 1;
            match self.poll_once().await {
                Ok(count) => {
                    self.stats.events += count as u64;
                    metrics::counter!(m::COLLECTOR_POLLS_TOTAL, m::LABEL_RESULT => "success")
                        .increment(1);
                    metrics::counter!(m::COLLECTOR_EVENTS_TOTAL).increment(count as u64);
                    if count > 0 {
                        tracing::info!(count, "received events");
                    }
                }
                Err(e) => {
                    self.stats.failures += 1;
                    metrics::counter!(m::COLLECTOR_POLLS_TOTAL, m::LABEL_RESULT => "failure")
                        .increment(1);
                    tracing::warn!(error = %e, "poll failed, retrying after interval");
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        tracing::info!(
            polls = self.stats.polls,
            failures = self.stats.failures,
            events = self.stats.events,
            "live collector stopped"
        );
        self.stats
    }
}

async fn append(path: PathBuf, records: Vec<EventRecord>) -> Result<(), LogPipelineError> {
    if records.is_empty() {
        return Ok(());
    }
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || sink::append_events(&path, &records))
        .await
        .map_err(|e| LogPipelineError::SinkWrite {
            path: display,
            reason: format!("append task failed: {e}"),
        })?
}
