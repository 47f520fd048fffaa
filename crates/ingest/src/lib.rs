//! gclog-ingest -- GC 로그 라인을 타입 있는 이벤트로 바꾸는 수집 파이프라인
//!
//! 여러 JVM 버전과 수집기(serial, parallel, CMS, G1, Shenandoah, Z)가 두 시대
//! (클래식 텍스트, unified logging)에 걸쳐 남긴 GC 로그를 읽어,
//! 비교 가능한 [`GcEvent`](gclog_core::event::GcEvent) 스트림으로 만듭니다.
//!
//! # 모듈 구성
//!
//! - [`decorator`]: 라인 앞머리의 시각/태그 해석 (클래식 = 시작, unified = 종료)
//! - [`preprocess`]: 한 줄 lookahead 재조립 (물리 라인 -> 논리 라인)
//! - [`registry`]: 우선순위 순서의 정적 문법 카탈로그
//! - [`classifier`]: 논리 라인 -> 이벤트 타입
//! - [`parser`]: 타입별 필드 추출 (실패하면 `Unknown`)
//! - [`ingest`]: 재조립/분류/파싱을 잇는 순차 수집기와 요약
//! - [`source`]: 비동기 파일 라인 소스
//! - [`pipeline`]: 리더/변환 태스크 오케스트레이션
//! - [`config`]: 수집 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileSource -> Preprocessor -> Classifier -> Parser -> GcEvent -> EventSink
//!     |              |              |            |
//!  async read   8 rule families  Registry   start = end - duration (unified)
//! ```

pub mod classifier;
pub mod config;
pub mod decorator;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod pattern;
pub mod pipeline;
pub mod preprocess;
pub mod registry;
pub mod source;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{GcLogPipeline, GcLogPipelineBuilder};

// 설정
pub use config::{IngestConfig, IngestConfigBuilder};

// 에러
pub use error::IngestError;

// 수집기
pub use ingest::{IngestSummary, Ingestor, ingest_lines};

// 분류/파싱
pub use classifier::{ClassifyContext, Classifier, classify};
pub use parser::{Parsed, parse, parse_line};
pub use registry::{EventGrammar, Registry};

// 재조립
pub use preprocess::{LogicalLine, PreprocessAction, Preprocessor, RawLine};

// 데코레이터
pub use decorator::{Decorator, Era, Uptime};

// 소스
pub use source::FileSource;
