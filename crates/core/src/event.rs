//! 이벤트 모델 -- 파이프라인의 출력 단위
//!
//! 하나의 논리 라인은 정확히 하나의 [`GcEvent`]가 됩니다.
//! [`LogEventType`]은 닫힌 열거형이며 각 타입의 성격(blocking, concurrent,
//! parallel 등)은 [`Capabilities`]로 조회합니다. 타입별 필드는
//! [`EventData`] 변형이 필요한 만큼만 소유합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Occupancy, ThreadTimes, Trigger};
use crate::units;

/// 이벤트 타입의 성격 태그
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// 애플리케이션 스레드를 멈추는 이벤트
    pub blocking: bool,
    /// 애플리케이션과 동시에 실행되는 단계
    pub concurrent: bool,
    /// 병렬 워커로 수행될 수 있는 이벤트
    pub parallel: bool,
    /// 집계 대상 이벤트
    pub reportable: bool,
    /// unified logging 형식의 이벤트
    pub unified: bool,
}

impl Capabilities {
    const NONE: Self = Self {
        blocking: false,
        concurrent: false,
        parallel: false,
        reportable: false,
        unified: false,
    };
    const BR: Self = Self {
        blocking: true,
        reportable: true,
        ..Self::NONE
    };
    const BPR: Self = Self {
        parallel: true,
        ..Self::BR
    };
    const CR: Self = Self {
        concurrent: true,
        reportable: true,
        ..Self::NONE
    };
    const R: Self = Self {
        reportable: true,
        ..Self::NONE
    };

    const fn unified(self) -> Self {
        Self {
            unified: true,
            ..self
        }
    }
}

macro_rules! event_types {
    ($($variant:ident => $name:literal, $caps:expr;)+) => {
        /// 로그 이벤트 타입
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum LogEventType {
            #[default]
            Unknown,
            $($variant,)+
        }

        impl LogEventType {
            /// 모든 이벤트 타입
            pub const ALL: &'static [LogEventType] = &[
                LogEventType::Unknown,
                $(LogEventType::$variant,)+
            ];

            /// 이벤트 타입 이름 (예: `SHENANDOAH_INIT_UPDATE`)
            pub const fn as_str(&self) -> &'static str {
                match self {
                    LogEventType::Unknown => "UNKNOWN",
                    $(LogEventType::$variant => $name,)+
                }
            }

            /// 타입의 성격 태그
            pub const fn capabilities(&self) -> Capabilities {
                match self {
                    LogEventType::Unknown => Capabilities::NONE,
                    $(LogEventType::$variant => $caps,)+
                }
            }
        }
    };
}

event_types! {
    // 구조 라인
    BlankLine => "BLANK_LINE", Capabilities::NONE;
    HeaderCommandLineFlags => "HEADER_COMMAND_LINE_FLAGS", Capabilities::NONE;
    HeaderMemory => "HEADER_MEMORY", Capabilities::NONE;
    HeaderVersion => "HEADER_VERSION", Capabilities::NONE;
    UnifiedHeader => "UNIFIED_HEADER", Capabilities::NONE.unified();
    UnifiedHeaderVersion => "UNIFIED_HEADER_VERSION", Capabilities::NONE.unified();
    UsingSerial => "USING_SERIAL", Capabilities::NONE.unified();
    UsingParallel => "USING_PARALLEL", Capabilities::NONE.unified();
    UsingCms => "USING_CMS", Capabilities::NONE.unified();
    UsingG1 => "USING_G1", Capabilities::NONE.unified();
    UsingShenandoah => "USING_SHENANDOAH", Capabilities::NONE.unified();
    UsingZ => "USING_Z", Capabilities::NONE.unified();
    GcInfo => "GC_INFO", Capabilities::NONE;
    TenuringDistribution => "TENURING_DISTRIBUTION", Capabilities::NONE;
    GcLocker => "GC_LOCKER", Capabilities::NONE;
    GcOverheadLimit => "GC_OVERHEAD_LIMIT", Capabilities::NONE;
    VmWarning => "VM_WARNING", Capabilities::NONE;

    // safepoint
    ApplicationStoppedTime => "APPLICATION_STOPPED_TIME", Capabilities::R;
    ApplicationConcurrentTime => "APPLICATION_CONCURRENT_TIME", Capabilities::NONE;

    // serial
    SerialNew => "SERIAL_NEW", Capabilities::BR;
    SerialOld => "SERIAL_OLD", Capabilities::BR;
    UnifiedSerialNew => "UNIFIED_SERIAL_NEW", Capabilities::BR.unified();
    UnifiedSerialOld => "UNIFIED_SERIAL_OLD", Capabilities::BR.unified();

    // parallel
    ParallelScavenge => "PARALLEL_SCAVENGE", Capabilities::BPR;
    ParallelSerialOld => "PARALLEL_SERIAL_OLD", Capabilities::BR;
    ParallelCompactingOld => "PARALLEL_COMPACTING_OLD", Capabilities::BPR;
    UnifiedParallelScavenge => "UNIFIED_PARALLEL_SCAVENGE", Capabilities::BPR.unified();
    UnifiedParallelCompactingOld => "UNIFIED_PARALLEL_COMPACTING_OLD", Capabilities::BPR.unified();

    // 수집기 미상 unified
    UnifiedYoung => "UNIFIED_YOUNG", Capabilities::BR.unified();
    UnifiedOld => "UNIFIED_OLD", Capabilities::BR.unified();
    UnifiedRemark => "UNIFIED_REMARK", Capabilities::BPR.unified();
    UnifiedConcurrent => "UNIFIED_CONCURRENT", Capabilities::CR.unified();

    // cms
    ParNew => "PAR_NEW", Capabilities::BPR;
    CmsSerialOld => "CMS_SERIAL_OLD", Capabilities::BR;
    CmsInitialMark => "CMS_INITIAL_MARK", Capabilities::BPR;
    CmsRemark => "CMS_REMARK", Capabilities::BPR;
    CmsConcurrent => "CMS_CONCURRENT", Capabilities::CR;
    UnifiedParNew => "UNIFIED_PAR_NEW", Capabilities::BPR.unified();
    UnifiedCmsInitialMark => "UNIFIED_CMS_INITIAL_MARK", Capabilities::BPR.unified();

    // g1
    G1YoungPause => "G1_YOUNG_PAUSE", Capabilities::BPR;
    G1YoungInitialMark => "G1_YOUNG_INITIAL_MARK", Capabilities::BPR;
    G1MixedPause => "G1_MIXED_PAUSE", Capabilities::BPR;
    G1FullGc => "G1_FULL_GC", Capabilities::BPR;
    G1Remark => "G1_REMARK", Capabilities::BPR;
    G1Cleanup => "G1_CLEANUP", Capabilities::BPR;
    G1Concurrent => "G1_CONCURRENT", Capabilities::CR;
    UnifiedG1YoungPause => "UNIFIED_G1_YOUNG_PAUSE", Capabilities::BPR.unified();
    UnifiedG1YoungPrepareMixed => "UNIFIED_G1_YOUNG_PREPARE_MIXED", Capabilities::BPR.unified();
    UnifiedG1MixedPause => "UNIFIED_G1_MIXED_PAUSE", Capabilities::BPR.unified();
    UnifiedG1FullGc => "UNIFIED_G1_FULL_GC", Capabilities::BPR.unified();
    UnifiedG1Cleanup => "UNIFIED_G1_CLEANUP", Capabilities::BPR.unified();

    // shenandoah
    ShenandoahInitMark => "SHENANDOAH_INIT_MARK", Capabilities::BPR;
    ShenandoahFinalMark => "SHENANDOAH_FINAL_MARK", Capabilities::BPR;
    ShenandoahInitUpdate => "SHENANDOAH_INIT_UPDATE", Capabilities::BPR;
    ShenandoahFinalUpdate => "SHENANDOAH_FINAL_UPDATE", Capabilities::BPR;
    ShenandoahFinalEvac => "SHENANDOAH_FINAL_EVAC", Capabilities::BPR;
    ShenandoahDegeneratedGc => "SHENANDOAH_DEGENERATED_GC", Capabilities::BPR;
    ShenandoahFullGc => "SHENANDOAH_FULL_GC", Capabilities::BPR;
    ShenandoahConcurrent => "SHENANDOAH_CONCURRENT", Capabilities::CR;
    ShenandoahTrigger => "SHENANDOAH_TRIGGER", Capabilities::NONE;

    // z
    ZMarkStart => "Z_MARK_START", Capabilities::BR.unified();
    ZMarkEnd => "Z_MARK_END", Capabilities::BR.unified();
    ZRelocateStart => "Z_RELOCATE_START", Capabilities::BR.unified();
}

impl LogEventType {
    pub const fn is_blocking(&self) -> bool {
        self.capabilities().blocking
    }

    pub const fn is_concurrent(&self) -> bool {
        self.capabilities().concurrent
    }

    pub const fn is_parallel(&self) -> bool {
        self.capabilities().parallel
    }

    pub const fn is_reportable(&self) -> bool {
        self.capabilities().reportable
    }

    pub const fn is_unified(&self) -> bool {
        self.capabilities().unified
    }
}

impl fmt::Display for LogEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 힙 전체 단위로 보고되는 이벤트의 필드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapData {
    pub trigger: Trigger,
    pub combined: Option<Occupancy>,
    pub permanent: Option<Occupancy>,
    pub times: Option<ThreadTimes>,
    /// 하위 단계 외 시간 (µs)
    pub other_micros: Option<u64>,
}

/// 세대별 점유량이 보고되는 이벤트의 필드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationalData {
    pub trigger: Trigger,
    pub young: Option<Occupancy>,
    pub old: Option<Occupancy>,
    pub combined: Option<Occupancy>,
    pub permanent: Option<Occupancy>,
    pub times: Option<ThreadTimes>,
}

/// 타입별 페이로드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventData {
    /// 필드가 없는 구조 라인 (헤더, 빈 줄, unknown 등)
    #[default]
    Marker,
    /// 시간만 갖는 정지 단계
    Phase,
    /// 동시 단계
    Concurrent { times: Option<ThreadTimes> },
    /// 힙 전체 점유량
    Heap(Box<HeapData>),
    /// 세대별 점유량
    Generational(Box<GenerationalData>),
    /// safepoint 정지 시간
    Safepoint { stopping_threads_micros: Option<u64> },
}

/// 파싱된 GC 이벤트
///
/// 생성 후 변경되지 않습니다. `timestamp`는 JVM 기동 이후 시작 시각(ms),
/// `duration`은 마이크로초입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcEvent {
    event_type: LogEventType,
    timestamp: u64,
    duration: u64,
    log_entry: String,
    unified_decorator: bool,
    data: EventData,
}

impl GcEvent {
    /// 필드 값으로 이벤트를 생성합니다.
    pub fn new(
        event_type: LogEventType,
        timestamp: u64,
        duration: u64,
        log_entry: impl Into<String>,
        data: EventData,
    ) -> Self {
        Self {
            event_type,
            timestamp,
            duration,
            log_entry: log_entry.into(),
            unified_decorator: false,
            data,
        }
    }

    /// 인식하지 못한 라인
    pub fn unknown(log_entry: impl Into<String>) -> Self {
        Self::new(LogEventType::Unknown, 0, 0, log_entry, EventData::Marker)
    }

    /// unified 데코레이터로 기록된 이벤트로 표시합니다.
    pub fn with_unified_decorator(mut self, unified: bool) -> Self {
        self.unified_decorator = unified;
        self
    }

    pub fn event_type(&self) -> LogEventType {
        self.event_type
    }

    /// 시작 시각 (JVM 기동 이후 ms)
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// 지속 시간 (µs)
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// 종료 시각 (ms)
    pub fn end_timestamp(&self) -> u64 {
        self.timestamp + units::micros_to_millis(self.duration)
    }

    /// 원본 로그 텍스트
    pub fn log_entry(&self) -> &str {
        &self.log_entry
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = self.event_type.capabilities();
        caps.unified |= self.unified_decorator;
        caps
    }

    pub fn is_blocking(&self) -> bool {
        self.event_type.is_blocking()
    }

    pub fn is_concurrent(&self) -> bool {
        self.event_type.is_concurrent()
    }

    pub fn is_reportable(&self) -> bool {
        self.event_type.is_reportable()
    }

    pub fn is_unified(&self) -> bool {
        self.capabilities().unified
    }

    /// 수집 원인. 원인을 갖지 않는 이벤트는 `None`입니다.
    pub fn trigger(&self) -> Option<Trigger> {
        match &self.data {
            EventData::Heap(heap) => Some(heap.trigger),
            EventData::Generational(generational) => Some(generational.trigger),
            _ => None,
        }
    }

    pub fn young(&self) -> Option<Occupancy> {
        match &self.data {
            EventData::Generational(generational) => generational.young,
            _ => None,
        }
    }

    pub fn old(&self) -> Option<Occupancy> {
        match &self.data {
            EventData::Generational(generational) => generational.old,
            _ => None,
        }
    }

    /// 힙 전체 점유량
    pub fn combined(&self) -> Option<Occupancy> {
        match &self.data {
            EventData::Heap(heap) => heap.combined,
            EventData::Generational(generational) => generational.combined,
            _ => None,
        }
    }

    /// permanent generation 또는 metaspace 점유량
    pub fn permanent(&self) -> Option<Occupancy> {
        match &self.data {
            EventData::Heap(heap) => heap.permanent,
            EventData::Generational(generational) => generational.permanent,
            _ => None,
        }
    }

    pub fn times(&self) -> Option<ThreadTimes> {
        match &self.data {
            EventData::Concurrent { times } => *times,
            EventData::Heap(heap) => heap.times,
            EventData::Generational(generational) => generational.times,
            _ => None,
        }
    }

    pub fn other_micros(&self) -> Option<u64> {
        match &self.data {
            EventData::Heap(heap) => heap.other_micros,
            _ => None,
        }
    }

    /// 병렬도 (%). 스레드 시간이 없으면 `None`입니다.
    pub fn parallelism(&self) -> Option<u32> {
        self.times().map(|t| t.parallelism())
    }
}

impl fmt::Display for GcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}ms ({}us)",
            self.event_type, self.timestamp, self.duration
        )
    }
}
