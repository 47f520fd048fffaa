//! 수집 파이프라인 에러 타입
//!
//! [`IngestError`]는 재조립, 분류, 파싱, 소스 읽기 중 발생하는 에러를 표현합니다.
//! 잘못된 로그 라인 자체는 에러가 아니라 `Unknown` 이벤트가 됩니다.
//! `From<IngestError> for GcLogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use gclog_core::error::{GcLogError, PipelineError};

/// 수집 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 매칭된 라인의 필드 변환 실패
    #[error("parse error: {format} at offset {offset}: {reason}")]
    Parse {
        /// 이벤트 타입 이름
        format: String,
        /// 실패 위치 (바이트 오프셋)
        offset: usize,
        /// 실패 사유
        reason: String,
    },

    /// 데코레이터 해석 실패
    #[error("decorator error: {0}")]
    Decorator(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 로그 소스 에러
    #[error("source error: {path}: {reason}")]
    Source {
        /// 로그 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<IngestError> for GcLogError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io(e) => GcLogError::Io(e),
            IngestError::Channel(reason) => GcLogError::Pipeline(PipelineError::ChannelSend(reason)),
            other => GcLogError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}

impl From<gclog_core::error::ParseError> for IngestError {
    fn from(err: gclog_core::error::ParseError) -> Self {
        IngestError::Parse {
            format: "field".to_owned(),
            offset: 0,
            reason: err.to_string(),
        }
    }
}
