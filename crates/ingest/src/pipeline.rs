//! 파이프라인 오케스트레이션 -- 파일 읽기, 수집, 소비를 별도 단계로 실행합니다.
//!
//! [`GcLogPipeline`]은 리더 태스크와 변환 태스크를 띄우고 둘을 bounded
//! 채널로 잇습니다. 변환 태스크만 [`Ingestor`] 상태를 소유하므로 내부 잠금이
//! 없습니다. 소비자는 빌더가 돌려준 수신 채널에서 이벤트를 받거나
//! [`GcLogPipeline::drain_into`]로 [`EventSink`]에 흘려보냅니다.
//!
//! # 내부 아키텍처
//! ```text
//! FileSource -> mpsc<RawLine> -> Ingestor -> mpsc<GcEvent> -> consumer / EventSink
//!   (reader task)               (transform task)
//! ```

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gclog_core::error::{GcLogError, PipelineError};
use gclog_core::event::GcEvent;
use gclog_core::pipeline::EventSink;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::ingest::{IngestSummary, Ingestor};
use crate::source::FileSource;

/// 파이프라인 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 끝남 (입력 소진, 취소 또는 소비자 실패)
    Finished,
}

/// GC 로그 파일 하나를 처리하는 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use gclog_ingest::{GcLogPipelineBuilder, IngestConfig};
///
/// let (mut pipeline, mut events) = GcLogPipelineBuilder::new()
///     .path("gc.log")
///     .config(IngestConfig::default())
///     .build()?;
///
/// let mut sink: Vec<GcEvent> = Vec::new();
/// let summary = pipeline.drain_into(&mut events, &mut sink).await?;
/// ```
pub struct GcLogPipeline {
    config: IngestConfig,
    path: PathBuf,
    state: PipelineState,
    cancel: CancellationToken,
    /// 변환 태스크에 넘겨줄 이벤트 송신측 (시작 전까지 보관)
    event_tx: Option<mpsc::Sender<GcEvent>>,
    reader: Option<JoinHandle<Result<u64, IngestError>>>,
    transform: Option<JoinHandle<Result<IngestSummary, IngestError>>>,
}

impl GcLogPipeline {
    /// 현재 상태를 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Finished => "finished",
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// 파이프라인 취소 토큰 (복제본)
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 리더를 멈춥니다. 이미 읽은 라인은 변환 후 방출됩니다.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 리더/변환 태스크를 시작합니다. tokio 런타임 안에서 호출해야 합니다.
    pub fn start(&mut self) -> Result<(), GcLogError> {
        if self.state != PipelineState::Initialized {
            return Err(PipelineError::AlreadyRunning.into());
        }
        let event_tx = self
            .event_tx
            .take()
            .ok_or_else(|| PipelineError::InitFailed("event channel already taken".to_owned()))?;
        let mut ingestor = Ingestor::from_config(&self.config)?;

        info!(path = %self.path.display(), "starting gc log pipeline");

        let (line_tx, mut line_rx) = mpsc::channel(self.config.channel_capacity);
        let source = FileSource::new(self.path.clone(), self.config.max_line_length);
        let cancel = self.cancel.clone();
        self.reader = Some(tokio::spawn(source.run(line_tx, cancel)));

        self.transform = Some(tokio::spawn(async move {
            while let Some(line) = line_rx.recv().await {
                forward(ingestor.push_line(line), &event_tx).await?;
            }
            forward(ingestor.finish(), &event_tx).await?;
            Ok::<_, IngestError>(ingestor.into_summary())
        }));

        self.state = PipelineState::Running;
        Ok(())
    }

    /// 두 태스크가 끝나기를 기다리고 요약을 반환합니다.
    ///
    /// 리더 에러(파일 없음 등)가 변환 결과보다 우선합니다.
    pub async fn join(&mut self) -> Result<IngestSummary, GcLogError> {
        let (Some(reader), Some(transform)) = (self.reader.take(), self.transform.take()) else {
            return Err(PipelineError::InitFailed("pipeline was not started".to_owned()).into());
        };

        let read = reader
            .await
            .map_err(|e| PipelineError::ChannelRecv(format!("reader task failed: {e}")))?;
        let transformed = transform
            .await
            .map_err(|e| PipelineError::ChannelRecv(format!("transform task failed: {e}")))?;
        self.state = PipelineState::Finished;

        let lines = read?;
        let summary = transformed?;
        info!(
            lines,
            events = summary.events,
            unknown = summary.unknown_lines,
            "gc log pipeline finished"
        );
        Ok(summary)
    }

    /// 이벤트를 소비자에게 모두 넘기고 스트림 종료를 알립니다.
    ///
    /// 시작하지 않았다면 먼저 시작합니다. 소비자가 이벤트를 거부하면
    /// 파이프라인을 중단하고 그 에러를 반환합니다.
    pub async fn drain_into<S>(
        &mut self,
        events: &mut mpsc::Receiver<GcEvent>,
        sink: &mut S,
    ) -> Result<IngestSummary, GcLogError>
    where
        S: EventSink + ?Sized,
    {
        if self.state == PipelineState::Initialized {
            self.start()?;
        }

        while let Some(event) = events.recv().await {
            if let Err(e) = sink.accept(event) {
                warn!(sink = sink.name(), error = %e, "event sink failed, aborting pipeline");
                self.abort();
                return Err(e);
            }
        }

        let summary = self.join().await?;
        sink.finish(&summary.stream_end())?;
        Ok(summary)
    }

    fn abort(&mut self) {
        self.cancel.cancel();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(transform) = self.transform.take() {
            transform.abort();
        }
        self.state = PipelineState::Finished;
    }
}

async fn forward(events: Vec<GcEvent>, tx: &mpsc::Sender<GcEvent>) -> Result<(), IngestError> {
    for event in events {
        tx.send(event)
            .await
            .map_err(|_| IngestError::Channel("event receiver dropped".to_owned()))?;
    }
    Ok(())
}

/// 파이프라인 빌더
///
/// 파이프라인을 구성하고 이벤트 수신 채널을 생성합니다.
pub struct GcLogPipelineBuilder {
    path: Option<PathBuf>,
    config: IngestConfig,
    cancel: Option<CancellationToken>,
}

impl GcLogPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            path: None,
            config: IngestConfig::default(),
            cancel: None,
        }
    }

    /// 읽을 로그 파일 경로를 지정합니다.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// 외부 취소 토큰을 연결합니다. 지정하지 않으면 새로 만듭니다.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// # Returns
    /// - `GcLogPipeline`: 파이프라인 인스턴스
    /// - `mpsc::Receiver<GcEvent>`: 로그 순서대로 이벤트를 받는 채널
    pub fn build(self) -> Result<(GcLogPipeline, mpsc::Receiver<GcEvent>), IngestError> {
        self.config.validate()?;
        let path = self.path.ok_or_else(|| IngestError::Config {
            field: "path".to_owned(),
            reason: "log file path is required".to_owned(),
        })?;

        let (event_tx, event_rx) = mpsc::channel(self.config.channel_capacity);

        let pipeline = GcLogPipeline {
            config: self.config,
            path,
            state: PipelineState::Initialized,
            cancel: self.cancel.unwrap_or_default(),
            event_tx: Some(event_tx),
            reader: None,
            transform: None,
        };

        Ok((pipeline, event_rx))
    }
}

impl Default for GcLogPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
