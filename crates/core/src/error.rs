//! 에러 타입 -- 도메인별 에러 정의

/// gclog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum GcLogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 이미 실행된 파이프라인
    #[error("pipeline already started")]
    AlreadyRunning,

    /// 이벤트 소비자 처리 실패
    #[error("event sink rejected event: {0}")]
    SinkRejected(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 숫자 변환 실패
    #[error("invalid number '{value}': {reason}")]
    InvalidNumber { value: String, reason: String },

    /// 메모리 크기 단위 인식 실패
    #[error("invalid memory size '{0}'")]
    InvalidMemory(String),

    /// 필수 캡처 그룹 누락
    #[error("missing capture '{0}'")]
    MissingCapture(String),
}
