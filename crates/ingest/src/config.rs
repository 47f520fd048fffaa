//! 수집 파이프라인 설정
//!
//! [`IngestConfig`]는 core의 [`IngestSettings`](gclog_core::config::IngestSettings)를
//! 기반으로 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use gclog_core::config::GcLogConfig;
//! use gclog_ingest::config::IngestConfig;
//!
//! let core_config = GcLogConfig::default();
//! let config = IngestConfig::from_core(&core_config.ingest);
//! ```

use serde::{Deserialize, Serialize};

use gclog_core::config::IngestSettings;
use gclog_core::types::JvmContext;

use crate::error::IngestError;

const MAX_CHANNEL_CAPACITY: usize = 1_000_000;
const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024; // 16MB
const MAX_UNKNOWN_SAMPLES: usize = 100_000;

/// 수집 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// 전체 JVM 옵션 문자열
    pub jvm_options: String,
    /// JVM 버전
    pub jvm_version: String,
    /// JVM 기동 시각 (RFC 3339)
    pub jvm_start_epoch: String,
    /// 단계 간 채널 용량
    pub channel_capacity: usize,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
    /// 요약에 보관할 unknown 라인 수
    pub report_unknown_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from_core(&IngestSettings::default())
    }
}

impl IngestConfig {
    /// core의 `IngestSettings`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &IngestSettings) -> Self {
        Self {
            jvm_options: core.jvm_options.clone(),
            jvm_version: core.jvm_version.clone(),
            jvm_start_epoch: core.jvm_start_epoch.clone(),
            channel_capacity: core.channel_capacity,
            max_line_length: core.max_line_length,
            report_unknown_limit: core.report_unknown_limit,
        }
    }

    /// 설정값으로 [`JvmContext`]를 구성합니다.
    pub fn jvm_context(&self) -> Result<JvmContext, IngestError> {
        let settings = IngestSettings {
            jvm_options: self.jvm_options.clone(),
            jvm_version: self.jvm_version.clone(),
            jvm_start_epoch: self.jvm_start_epoch.clone(),
            ..IngestSettings::default()
        };
        settings.jvm_context().map_err(|e| match e {
            gclog_core::error::ConfigError::InvalidValue { field, reason } => {
                IngestError::Config { field, reason }
            }
            other => IngestError::Config {
                field: "ingest".to_owned(),
                reason: other.to_string(),
            },
        })
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(IngestError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            });
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH {
            return Err(IngestError::Config {
                field: "max_line_length".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_LENGTH),
            });
        }

        if self.report_unknown_limit > MAX_UNKNOWN_SAMPLES {
            return Err(IngestError::Config {
                field: "report_unknown_limit".to_owned(),
                reason: format!("must be at most {}", MAX_UNKNOWN_SAMPLES),
            });
        }

        self.jvm_context()?;
        Ok(())
    }
}

/// 수집 설정 빌더
#[derive(Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// JVM 옵션 문자열을 설정합니다.
    pub fn jvm_options(mut self, options: impl Into<String>) -> Self {
        self.config.jvm_options = options.into();
        self
    }

    /// JVM 버전을 설정합니다.
    pub fn jvm_version(mut self, version: impl Into<String>) -> Self {
        self.config.jvm_version = version.into();
        self
    }

    /// JVM 기동 시각(RFC 3339)을 설정합니다.
    pub fn jvm_start_epoch(mut self, epoch: impl Into<String>) -> Self {
        self.config.jvm_start_epoch = epoch.into();
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.config.max_line_length = length;
        self
    }

    /// 보관할 unknown 라인 수를 설정합니다.
    pub fn report_unknown_limit(mut self, limit: usize) -> Self {
        self.config.report_unknown_limit = limit;
        self
    }

    /// 설정을 검증하고 `IngestConfig`를 생성합니다.
    pub fn build(self) -> Result<IngestConfig, IngestError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
