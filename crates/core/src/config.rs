//! 설정 관리 -- gclog.toml 파싱 및 런타임 설정
//!
//! [`GcLogConfig`]는 로깅과 수집 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`GCLOG_INGEST_JVM_OPTIONS=-XX:+UseG1GC` 형식)
//! 2. 설정 파일 (`gclog.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), gclog_core::error::GcLogError> {
//! use gclog_core::config::GcLogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = GcLogConfig::load("gclog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = GcLogConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, GcLogError};
use crate::types::{JvmContext, JvmVersion};

/// gclog 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcLogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 수집 설정
    #[serde(default)]
    pub ingest: IngestSettings,
}

impl GcLogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GcLogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, GcLogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GcLogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                GcLogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, GcLogError> {
        toml::from_str(toml_str).map_err(|e| {
            GcLogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `GCLOG_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "GCLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "GCLOG_GENERAL_LOG_FORMAT");

        // Ingest
        override_string(
            &mut self.ingest.jvm_options,
            "GCLOG_INGEST_JVM_OPTIONS",
        );
        override_string(
            &mut self.ingest.jvm_version,
            "GCLOG_INGEST_JVM_VERSION",
        );
        override_string(
            &mut self.ingest.jvm_start_epoch,
            "GCLOG_INGEST_JVM_START_EPOCH",
        );
        override_usize(
            &mut self.ingest.channel_capacity,
            "GCLOG_INGEST_CHANNEL_CAPACITY",
        );
        override_usize(
            &mut self.ingest.max_line_length,
            "GCLOG_INGEST_MAX_LINE_LENGTH",
        );
        override_usize(
            &mut self.ingest.report_unknown_limit,
            "GCLOG_INGEST_REPORT_UNKNOWN_LIMIT",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), GcLogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.ingest.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.ingest.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        // 형식 검증은 jvm_context()가 담당
        self.ingest.jvm_context()?;

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 수집 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// 전체 JVM 옵션 문자열 (빈 문자열이면 미지정)
    pub jvm_options: String,
    /// JVM 버전 (예: `1.8.0_181`, `17.0.5+8`)
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

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            jvm_options: String::new(),
            jvm_version: String::new(),
            jvm_start_epoch: String::new(),
            channel_capacity: 1024,
            max_line_length: 64 * 1024, // 64KB
            report_unknown_limit: 1000,
        }
    }
}

impl IngestSettings {
    /// 설정값으로 [`JvmContext`]를 구성합니다.
    pub fn jvm_context(&self) -> Result<JvmContext, ConfigError> {
        let version = match self.jvm_version.trim() {
            "" => None,
            text => Some(JvmVersion::parse(text).ok_or_else(|| ConfigError::InvalidValue {
                field: "ingest.jvm_version".to_owned(),
                reason: format!("unrecognized version '{text}'"),
            })?),
        };

        let start_epoch = match self.jvm_start_epoch.trim() {
            "" => None,
            text => Some(DateTime::parse_from_rfc3339(text).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "ingest.jvm_start_epoch".to_owned(),
                    reason: e.to_string(),
                }
            })?),
        };

        let options = match self.jvm_options.trim() {
            "" => None,
            text => Some(text.to_owned()),
        };

        Ok(JvmContext {
            version,
            options,
            start_epoch,
        })
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectorFamily;

    #[test]
    fn default_config_has_sane_values() {
        let config = GcLogConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.ingest.channel_capacity, 1024);
        assert!(config.ingest.jvm_options.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        let config = GcLogConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = GcLogConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.ingest.max_line_length, 64 * 1024);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[ingest]
jvm_options = "-Xmx2g -XX:+UseShenandoahGC"
"#;
        let config = GcLogConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.ingest.channel_capacity, 1024);

        let ctx = config.ingest.jvm_context().unwrap();
        assert_eq!(ctx.collector(), Some(CollectorFamily::Shenandoah));
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = GcLogConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            GcLogError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_log_level() {
        let mut config = GcLogConfig::default();
        config.general.log_level = "loud".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_level"));
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = GcLogConfig::default();
        config.ingest.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_start_epoch() {
        let mut config = GcLogConfig::default();
        config.ingest.jvm_start_epoch = "yesterday".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ingest.jvm_start_epoch"));
    }

    #[test]
    fn jvm_context_from_settings() {
        let settings = IngestSettings {
            jvm_version: "1.8.0_181".to_owned(),
            jvm_start_epoch: "2020-03-10T08:03:29.000-04:00".to_owned(),
            ..IngestSettings::default()
        };
        let ctx = settings.jvm_context().unwrap();
        assert_eq!(ctx.version.map(|v| v.major), Some(8));
        assert!(ctx.start_epoch.is_some());
        assert!(ctx.options.is_none());
    }
}
