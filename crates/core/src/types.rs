//! 도메인 타입 -- 이벤트 필드와 JVM 컨텍스트
//!
//! 메모리 점유량, 스레드 시간, 수집 원인(trigger), 수집기 계열 등
//! 이벤트 모델과 파이프라인이 공유하는 값 타입을 정의합니다.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::units;

/// 메모리 크기 (바이트)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Memory(u64);

impl Memory {
    /// 0 바이트
    pub const ZERO: Memory = Memory(0);

    /// 바이트 수로 생성합니다.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// 킬로바이트 수로 생성합니다.
    pub const fn from_kilobytes(kilobytes: u64) -> Self {
        Self(kilobytes * 1024)
    }

    /// 로그 표기(`3007K`, `21.6M`)를 파싱합니다.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        units::size_to_bytes(text).map(Self)
    }

    /// 바이트 수
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// 킬로바이트 수 (내림)
    pub const fn kilobytes(self) -> u64 {
        self.0 / 1024
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1024 == 0 {
            write!(f, "{}K", self.0 / 1024)
        } else {
            write!(f, "{}B", self.0)
        }
    }
}

/// 수집 전후 점유량과 용량
///
/// 로그의 `before->after(capacity)` 표기에 대응합니다.
/// 스냅샷만 기록되는 단계(`4173470K(8218240K)`)는 before와 after가 같습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupancy {
    /// 수집 전 점유량
    pub before: Memory,
    /// 수집 후 점유량
    pub after: Memory,
    /// 영역 용량
    pub capacity: Memory,
}

impl Occupancy {
    pub const fn new(before: Memory, after: Memory, capacity: Memory) -> Self {
        Self {
            before,
            after,
            capacity,
        }
    }

    /// 단일 시점 스냅샷
    pub const fn snapshot(used: Memory, capacity: Memory) -> Self {
        Self::new(used, used, capacity)
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}({})", self.before, self.after, self.capacity)
    }
}

/// 스레드 시간 (user/sys/real), 1/100초 단위
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadTimes {
    pub user: u32,
    pub sys: u32,
    pub real: u32,
}

impl ThreadTimes {
    /// `user`, `sys`, `real` 초 단위 문자열에서 생성합니다.
    pub fn parse(user: &str, sys: &str, real: &str) -> Result<Self, ParseError> {
        Ok(Self {
            user: units::secs_to_centis(user)?,
            sys: units::secs_to_centis(sys)?,
            real: units::secs_to_centis(real)?,
        })
    }

    /// 병렬도 (%) = (user + sys) / real
    ///
    /// 모두 0이면 100, real만 0이면 `u32::MAX`를 반환합니다.
    pub fn parallelism(&self) -> u32 {
        let cpu = u64::from(self.user) + u64::from(self.sys);
        if self.real == 0 {
            return if cpu == 0 { 100 } else { u32::MAX };
        }
        let real = u64::from(self.real);
        // 반올림 (half-up)
        let percent = (cpu * 100 + real / 2) / real;
        u32::try_from(percent).unwrap_or(u32::MAX)
    }

    pub fn user_secs(&self) -> f64 {
        f64::from(self.user) / 100.0
    }

    pub fn sys_secs(&self) -> f64 {
        f64::from(self.sys) / 100.0
    }

    pub fn real_secs(&self) -> f64 {
        f64::from(self.real) / 100.0
    }
}

/// 수집 원인
///
/// 로그의 괄호 안 자유 텍스트(`(Allocation Failure)`)를 닫힌 열거형으로 매핑합니다.
/// 인식하지 못한 텍스트는 [`Trigger::Unknown`]이 됩니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    AllocationFailure,
    MetadataGcThreshold,
    MetadataGcClearSoftReferences,
    SystemGc,
    Ergonomics,
    GcLockerInitiatedGc,
    JvmtiEnvForceGc,
    HeapInspectionInitiatedGc,
    HeapDumpInitiatedGc,
    DiagnosticCommand,
    LastDitchCollection,
    CmsInitialMark,
    CmsFinalRemark,
    CmsConcurrentModeFailure,
    CmsConcurrentModeInterrupted,
    PromotionFailed,
    G1EvacuationPause,
    G1HumongousAllocation,
    G1PreventiveCollection,
    G1CompactionPause,
    ToSpaceExhausted,
    Warmup,
    AllocationRate,
    AllocationStall,
    Proactive,
    Timer,
    HighUsage,
    /// 인식하지 못한 원인
    #[default]
    Unknown,
}

impl Trigger {
    /// 로그 텍스트에서 원인을 식별합니다.
    ///
    /// JDK 7 이하의 `System`과 JDK 8 이상의 `System.gc()`는 같은 원인입니다.
    pub fn from_log(text: &str) -> Self {
        match text.trim() {
            "Allocation Failure" => Self::AllocationFailure,
            "Metadata GC Threshold" => Self::MetadataGcThreshold,
            "Metadata GC Clear Soft References" => Self::MetadataGcClearSoftReferences,
            "System.gc()" | "System" => Self::SystemGc,
            "Ergonomics" => Self::Ergonomics,
            "GCLocker Initiated GC" | "GC Locker Initiated GC" => Self::GcLockerInitiatedGc,
            "JvmtiEnv ForceGarbageCollection" => Self::JvmtiEnvForceGc,
            "Heap Inspection Initiated GC" => Self::HeapInspectionInitiatedGc,
            "Heap Dump Initiated GC" => Self::HeapDumpInitiatedGc,
            "Diagnostic Command" => Self::DiagnosticCommand,
            "Last ditch collection" => Self::LastDitchCollection,
            "CMS Initial Mark" => Self::CmsInitialMark,
            "CMS Final Remark" => Self::CmsFinalRemark,
            "concurrent mode failure" => Self::CmsConcurrentModeFailure,
            "concurrent mode interrupted" => Self::CmsConcurrentModeInterrupted,
            "promotion failed" => Self::PromotionFailed,
            "G1 Evacuation Pause" => Self::G1EvacuationPause,
            "G1 Humongous Allocation" => Self::G1HumongousAllocation,
            "G1 Preventive Collection" => Self::G1PreventiveCollection,
            "G1 Compaction Pause" => Self::G1CompactionPause,
            "to-space exhausted" | "to-space overflow" => Self::ToSpaceExhausted,
            "Warmup" => Self::Warmup,
            "Allocation Rate" => Self::AllocationRate,
            "Allocation Stall" => Self::AllocationStall,
            "Proactive" => Self::Proactive,
            "Timer" => Self::Timer,
            "High Usage" => Self::HighUsage,
            _ => Self::Unknown,
        }
    }

    /// 대표 로그 표기
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocationFailure => "Allocation Failure",
            Self::MetadataGcThreshold => "Metadata GC Threshold",
            Self::MetadataGcClearSoftReferences => "Metadata GC Clear Soft References",
            Self::SystemGc => "System.gc()",
            Self::Ergonomics => "Ergonomics",
            Self::GcLockerInitiatedGc => "GCLocker Initiated GC",
            Self::JvmtiEnvForceGc => "JvmtiEnv ForceGarbageCollection",
            Self::HeapInspectionInitiatedGc => "Heap Inspection Initiated GC",
            Self::HeapDumpInitiatedGc => "Heap Dump Initiated GC",
            Self::DiagnosticCommand => "Diagnostic Command",
            Self::LastDitchCollection => "Last ditch collection",
            Self::CmsInitialMark => "CMS Initial Mark",
            Self::CmsFinalRemark => "CMS Final Remark",
            Self::CmsConcurrentModeFailure => "concurrent mode failure",
            Self::CmsConcurrentModeInterrupted => "concurrent mode interrupted",
            Self::PromotionFailed => "promotion failed",
            Self::G1EvacuationPause => "G1 Evacuation Pause",
            Self::G1HumongousAllocation => "G1 Humongous Allocation",
            Self::G1PreventiveCollection => "G1 Preventive Collection",
            Self::G1CompactionPause => "G1 Compaction Pause",
            Self::ToSpaceExhausted => "to-space exhausted",
            Self::Warmup => "Warmup",
            Self::AllocationRate => "Allocation Rate",
            Self::AllocationStall => "Allocation Stall",
            Self::Proactive => "Proactive",
            Self::Timer => "Timer",
            Self::HighUsage => "High Usage",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 수집기 계열
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectorFamily {
    Serial,
    Parallel,
    Cms,
    G1,
    Shenandoah,
    Z,
}

impl CollectorFamily {
    /// JVM 옵션 문자열에서 수집기를 식별합니다. 여러 개면 마지막 옵션이 우선합니다.
    pub fn from_jvm_options(options: &str) -> Option<Self> {
        options
            .split_whitespace()
            .filter_map(|opt| match opt {
                "-XX:+UseSerialGC" => Some(Self::Serial),
                "-XX:+UseParallelGC" | "-XX:+UseParallelOldGC" => Some(Self::Parallel),
                "-XX:+UseConcMarkSweepGC" => Some(Self::Cms),
                "-XX:+UseG1GC" => Some(Self::G1),
                "-XX:+UseShenandoahGC" => Some(Self::Shenandoah),
                "-XX:+UseZGC" => Some(Self::Z),
                _ => None,
            })
            .last()
    }
}

impl fmt::Display for CollectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
            Self::Cms => "cms",
            Self::G1 => "g1",
            Self::Shenandoah => "shenandoah",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}

/// JVM 버전 (major/minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JvmVersion {
    pub major: u32,
    pub minor: u32,
}

impl JvmVersion {
    /// `1.8.0_181`, `11.0.2`, `17.0.5+8-LTS`, `21` 형식을 파싱합니다.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text
            .trim()
            .split(['.', '_', '+', '-'])
            .map(|p| p.parse::<u32>());
        let first = parts.next()?.ok()?;
        let second = parts.next().and_then(Result::ok).unwrap_or(0);
        if first == 1 {
            // 1.8.0_181 -> major 8, minor = update
            let update = text
                .split('_')
                .nth(1)
                .and_then(|u| u.split(['-', '+']).next())
                .and_then(|u| u.parse().ok())
                .unwrap_or(0);
            Some(Self {
                major: second,
                minor: update,
            })
        } else {
            Some(Self {
                major: first,
                minor: second,
            })
        }
    }
}

impl fmt::Display for JvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// 로그와 함께 주어지는 외부 컨텍스트
///
/// 분류기와 파서가 수집기 고유 문법을 구분하고, datestamp만 있는
/// 데코레이터를 JVM 기동 이후 경과 시간으로 환산할 때 사용합니다.
/// 재조립 문법에는 영향을 주지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmContext {
    /// JVM 버전
    pub version: Option<JvmVersion>,
    /// 전체 JVM 옵션 문자열
    pub options: Option<String>,
    /// JVM 기동 시각
    pub start_epoch: Option<DateTime<FixedOffset>>,
}

impl JvmContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 옵션에서 식별한 수집기 계열
    pub fn collector(&self) -> Option<CollectorFamily> {
        self.options
            .as_deref()
            .and_then(CollectorFamily::from_jvm_options)
    }

    /// epoch 밀리초를 JVM 기동 이후 밀리초로 환산합니다.
    ///
    /// 기동 시각이 없으면 epoch 밀리초를 그대로 반환합니다.
    pub fn millis_since_start(&self, epoch_millis: i64) -> u64 {
        let relative = match &self.start_epoch {
            Some(start) => epoch_millis - start.timestamp_millis(),
            None => epoch_millis,
        };
        u64::try_from(relative).unwrap_or(0)
    }
}
