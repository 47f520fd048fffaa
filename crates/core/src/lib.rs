//! gclog-core -- GC 로그 이벤트 모델과 공통 기반
//!
//! 수집 파이프라인(`gclog-ingest`)과 하류 소비자가 공유하는
//! 이벤트 타입, 단위 변환, 에러, 설정, 로깅 초기화를 제공합니다.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;
pub mod units;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, GcLogError, ParseError, PipelineError};

// 설정
pub use config::{GcLogConfig, GeneralConfig, IngestSettings};

// 이벤트
pub use event::{Capabilities, EventData, GcEvent, GenerationalData, HeapData, LogEventType};

// 파이프라인 trait
pub use pipeline::{EventSink, StreamEnd};

// 도메인 타입
pub use types::{CollectorFamily, JvmContext, JvmVersion, Memory, Occupancy, ThreadTimes, Trigger};
