//! 수집기 -- 재조립, 분류, 파싱을 잇는 순차 변환
//!
//! [`Ingestor`]는 물리 라인을 한 줄씩 받아 [`Preprocessor`]로 논리 라인을
//! 만들고, 각 논리 라인을 분류/파싱해 [`GcEvent`]를 돌려줍니다. 상태는
//! 모두 인스턴스에 있으므로 파일마다 하나씩 만들어 동시에 실행할 수 있습니다.
//!
//! # 사용 예시
//! ```ignore
//! use gclog_ingest::ingest::ingest_lines;
//!
//! let (events, summary) = ingest_lines(std::fs::read_to_string("gc.log")?.lines(), &jvm);
//! println!("{} events, {} unknown", summary.events, summary.unknown_lines);
//! ```

use std::collections::BTreeMap;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, info};

use gclog_core::event::{GcEvent, LogEventType};
use gclog_core::metrics as m;
use gclog_core::pipeline::StreamEnd;
use gclog_core::types::JvmContext;

use crate::classifier::{Classifier, ClassifyContext};
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::parser::parse_line;
use crate::preprocess::{LogicalLine, Preprocessor, RawLine};

/// 요약에 보관하는 unknown 라인 기본 개수
pub const DEFAULT_UNKNOWN_LIMIT: usize = 1000;

/// 한 번의 수집 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// 읽은 물리 라인 수
    pub lines_read: u64,
    /// 재조립된 논리 라인 수
    pub logical_lines: u64,
    /// 방출한 이벤트 수 (unknown 포함)
    pub events: u64,
    /// unknown으로 분류된 논리 라인 수
    pub unknown_lines: u64,
    /// 완성되지 못하고 방출된 레코드 수
    pub incomplete_records: u64,
    /// 문법은 맞았지만 필드 변환에 실패한 라인 수
    pub parse_failures: u64,
    /// 이벤트 타입별 발생 수
    pub per_type: BTreeMap<&'static str, u64>,
    /// unknown 라인 원문 (최대 `unknown_limit`개)
    pub unknown_samples: Vec<String>,
    /// 마지막으로 완성되지 못한 논리 라인
    pub last_unprocessed: Option<String>,
}

impl IngestSummary {
    /// 소비자에게 전달할 스트림 종료 정보
    pub fn stream_end(&self) -> StreamEnd {
        StreamEnd {
            last_unprocessed: self.last_unprocessed.clone(),
            unknown_lines: self.unknown_lines,
        }
    }

    /// 타입별 발생 수
    pub fn count(&self, event_type: LogEventType) -> u64 {
        self.per_type.get(event_type.as_str()).copied().unwrap_or(0)
    }
}

/// 순차 수집기
pub struct Ingestor {
    preprocessor: Preprocessor,
    jvm: JvmContext,
    context: ClassifyContext,
    summary: IngestSummary,
    unknown_limit: usize,
}

impl Ingestor {
    /// 기본 재조립 규칙으로 수집기를 생성합니다.
    pub fn new(jvm: JvmContext) -> Self {
        let context = ClassifyContext::from_jvm(&jvm);
        Self {
            preprocessor: Preprocessor::with_defaults(),
            jvm,
            context,
            summary: IngestSummary::default(),
            unknown_limit: DEFAULT_UNKNOWN_LIMIT,
        }
    }

    /// 설정에서 JVM 컨텍스트와 unknown 보관 개수를 가져옵니다.
    pub fn from_config(config: &IngestConfig) -> Result<Self, IngestError> {
        Ok(Self::new(config.jvm_context()?).with_unknown_limit(config.report_unknown_limit))
    }

    pub fn with_unknown_limit(mut self, limit: usize) -> Self {
        self.unknown_limit = limit;
        self
    }

    /// 재조립 규칙을 바꿉니다.
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn jvm(&self) -> &JvmContext {
        &self.jvm
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    pub fn into_summary(self) -> IngestSummary {
        self.summary
    }

    /// 물리 라인 하나를 넣고 완성된 이벤트를 받습니다.
    pub fn push_line(&mut self, line: RawLine) -> Vec<GcEvent> {
        self.summary.lines_read += 1;
        counter!(m::INGEST_LINES_READ_TOTAL).increment(1);

        let logical = self.preprocessor.push(line);
        self.process_all(logical)
    }

    /// 남은 라인을 처리하고 마지막 이벤트를 받습니다.
    pub fn finish(&mut self) -> Vec<GcEvent> {
        let logical = self.preprocessor.finish();
        let events = self.process_all(logical);
        info!(
            lines = self.summary.lines_read,
            events = self.summary.events,
            unknown = self.summary.unknown_lines,
            incomplete = self.summary.incomplete_records,
            "ingestion finished"
        );
        events
    }

    fn process_all(&mut self, logical: Vec<LogicalLine>) -> Vec<GcEvent> {
        logical.into_iter().map(|line| self.process(line)).collect()
    }

    fn process(&mut self, logical: LogicalLine) -> GcEvent {
        self.summary.logical_lines += 1;
        counter!(m::INGEST_LOGICAL_LINES_TOTAL).increment(1);

        if logical.incomplete {
            debug!(line = logical.first_line(), "record never completed");
            self.summary.incomplete_records += 1;
            self.summary.last_unprocessed = Some(logical.text.clone());
            counter!(m::INGEST_INCOMPLETE_RECORDS_TOTAL).increment(1);
        }

        let classifier = Classifier::new(self.context);
        let parsed = parse_line(&classifier, &logical.text, &self.jvm);
        let event_type = parsed.event.event_type();

        if parsed.failed {
            self.summary.parse_failures += 1;
            counter!(m::INGEST_PARSE_FAILURES_TOTAL).increment(1);
        }
        if event_type == LogEventType::Unknown {
            debug!(line = logical.first_line(), "unrecognized logical line");
            self.summary.unknown_lines += 1;
            counter!(m::INGEST_UNKNOWN_LINES_TOTAL).increment(1);
            if self.summary.unknown_samples.len() < self.unknown_limit {
                self.summary.unknown_samples.push(logical.text);
            }
        }

        self.summary.events += 1;
        *self.summary.per_type.entry(event_type.as_str()).or_default() += 1;
        counter!(m::INGEST_EVENTS_EMITTED_TOTAL, m::LABEL_EVENT_TYPE => event_type.as_str())
            .increment(1);

        parsed.event
    }
}

/// 라인 목록 전체를 수집합니다. 라인 번호는 1부터 매깁니다.
pub fn ingest_lines<I, S>(lines: I, jvm: &JvmContext) -> (Vec<GcEvent>, IngestSummary)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ingestor = Ingestor::new(jvm.clone());
    let mut events = Vec::new();
    for (index, text) in lines.into_iter().enumerate() {
        events.extend(ingestor.push_line(RawLine::new(text, index + 1)));
    }
    events.extend(ingestor.finish());
    (events, ingestor.into_summary())
}
