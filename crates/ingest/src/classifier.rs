//! 분류기 -- 논리 라인을 이벤트 타입 하나로 판정합니다.
//!
//! 레지스트리를 우선순위 순서로 훑어 첫 번째로 매칭되는 문법의 타입을
//! 반환합니다. 어떤 문법에도 맞지 않으면 [`LogEventType::Unknown`]입니다.

use gclog_core::event::LogEventType;
use gclog_core::types::{CollectorFamily, JvmContext};

use crate::registry::{EventGrammar, Matched, Registry};

/// 분류에 필요한 외부 컨텍스트
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyContext {
    /// JVM 옵션에서 식별한 수집기 계열
    pub collector: Option<CollectorFamily>,
}

impl ClassifyContext {
    pub fn new(collector: Option<CollectorFamily>) -> Self {
        Self { collector }
    }

    pub fn from_jvm(jvm: &JvmContext) -> Self {
        Self::new(jvm.collector())
    }

    /// 문법이 이 컨텍스트에서 고려 대상인지 확인합니다.
    fn admits(&self, grammar: &EventGrammar) -> bool {
        grammar
            .collector()
            .is_none_or(|required| self.collector == Some(required))
    }
}

/// 레지스트리 기반 분류기
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'r> {
    registry: &'r Registry,
    context: ClassifyContext,
}

impl Classifier<'static> {
    /// 전역 레지스트리를 쓰는 분류기
    pub fn new(context: ClassifyContext) -> Self {
        Self::with_registry(Registry::global(), context)
    }
}

impl<'r> Classifier<'r> {
    pub fn with_registry(registry: &'r Registry, context: ClassifyContext) -> Self {
        Self { registry, context }
    }

    pub fn context(&self) -> ClassifyContext {
        self.context
    }

    /// 라인의 이벤트 타입
    pub fn classify(&self, line: &str) -> LogEventType {
        self.find(line)
            .map_or(LogEventType::Unknown, |(grammar, _)| grammar.event_type())
    }

    /// 첫 번째로 매칭되는 문법과 캡처
    pub fn find<'t>(&self, line: &'t str) -> Option<(&'r EventGrammar, Matched<'t>)> {
        self.registry
            .grammars()
            .iter()
            .filter(|grammar| self.context.admits(grammar))
            .find_map(|grammar| grammar.capture(line).map(|matched| (grammar, matched)))
    }
}

/// 전역 레지스트리로 라인을 분류합니다.
pub fn classify(line: &str, context: &ClassifyContext) -> LogEventType {
    Classifier::new(*context).classify(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_plain(line: &str) -> LogEventType {
        classify(line, &ClassifyContext::default())
    }

    #[test]
    fn shenandoah_classic_and_unified() {
        assert_eq!(
            classify_plain("2020-03-10T08:03:46.284-0400: 17.346: [Pause Init Update Refs, 0.017 ms]"),
            LogEventType::ShenandoahInitUpdate
        );
        assert_eq!(
            classify_plain("[5.312s][info][gc] GC(110) Pause Init Update Refs 0.005ms"),
            LogEventType::ShenandoahInitUpdate
        );
    }

    #[test]
    fn z_pauses() {
        assert_eq!(
            classify_plain("[0.129s] GC(0) Pause Mark End 0.006ms"),
            LogEventType::ZMarkEnd
        );
        assert_eq!(
            classify_plain("[0.132s] GC(0) Pause Relocate Start 0.004ms"),
            LogEventType::ZRelocateStart
        );
        assert_eq!(
            classify_plain("[2022-08-22T16:07:11.203+0000][248.117s] GC(26) Pause Mark Start 0.010ms"),
            LogEventType::ZMarkStart
        );
    }

    #[test]
    fn prose_is_unknown() {
        assert_eq!(
            classify_plain("The quick brown fox jumps over the lazy dog"),
            LogEventType::Unknown
        );
    }

    #[test]
    fn blank_line() {
        assert_eq!(classify_plain(""), LogEventType::BlankLine);
        assert_eq!(classify_plain("   "), LogEventType::BlankLine);
    }

    #[test]
    fn header_wins_over_gc_info() {
        assert_eq!(
            classify_plain("[0.004s][info][gc,init] Heap Region Size: 1M"),
            LogEventType::UnifiedHeader
        );
        assert_eq!(
            classify_plain(
                "[2023-02-22T12:31:30.322+0000][2243][gc] Min heap equals to max heap, disabling ShenandoahUncommit"
            ),
            LogEventType::UnifiedHeader
        );
        assert_eq!(
            classify_plain("[0.004s][info][gc] Soft Max Heap Size: 1024M"),
            LogEventType::GcInfo
        );
    }

    /// JDK 9~17 수집기들이 시작 시 남기는 설정 라인 모음
    const HEADER_CORPUS: &[&str] = &[
        "[0.011s][info][gc,init] Address Space Size: 65536M x 3 = 196608M",
        "[0.011s][info][gc,init] Address Space Type: Contiguous/Unrestricted/Complete",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Alignments: Space 512K, Generation 512K, Heap 2M",
        "[0.011s][info][gc,init] Available space on backing filesystem: N/A",
        "[0.004s][info][gc,init] CardTable entry size: 512",
        "[0.013s][info][gc,metaspace] CDS archive(s) mapped at: [0x0000000800000000-0x0000000800be2000-0x0000000800be2000), size 12460032, SharedBaseAddress: 0x0000000800000000, ArchiveRelocationMode: 0.",
        "[0.013s][info][gc,metaspace] Compressed class space mapped at: 0x0000000800c00000-0x0000000840c00000, reserved size: 1073741824",
        "[0.004s][info][gc,init] Compressed Oops: Enabled (Zero based)",
        "[0.004s][info][gc,init] Concurrent Refinement Workers: 1",
        "[0.004s][info][gc,init] Concurrent Workers: 1",
        "[0.004s][info][gc,init] CPUs: 4 total, 4 available",
        "[2023-02-22T12:31:30.330+0000][2243][gc,init] GC threads: 2 parallel, 1 concurrent",
        "[0.014s][info][gc,init] GC Workers: 1 (dynamic)",
        "[0.011s][info][gc,init] Heap Backing File: /memfd:java_heap",
        "[0.011s][info][gc,init] Heap Backing Filesystem: tmpfs (0x1021994)",
        "[0.004s][info][gc,init] Heap Initial Capacity: 256M",
        "[0.004s][info][gc,init] Heap Max Capacity: 4G",
        "[0.004s][info][gc,init] Heap Min Capacity: 8M",
        "[0.004s][info][gc,init] Heap Region Count: 4096",
        "[0.004s][info][gc,init] Heap Region Size: 1M",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Heuristics: Adaptive",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Humongous object threshold: 2048K",
        "[0.014s][info][gc,init] Humongous Object Threshold: 256K",
        "[0.011s][info][gc,init] Initial Capacity: 256M",
        "[2023-02-22T12:31:32.306+0000][2243][gc,init] Initialize Shenandoah heap: 6144M initial, 6144M min, 6144M max",
        "[0.011s][info][gc,init] Initializing The Z Garbage Collector",
        "[0.004s][info][gc,init] Large Page Support: Disabled",
        "[0.011s][info][gc,init] Max Capacity: 4096M",
        "[0.011s][info][gc,init] Max Capacity:      4096M   ",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Max TLAB size: 2048K",
        "[0.011s][info][gc,init] Medium Page Size: 32M",
        "[0.004s][info][gc,init] Memory: 15836M",
        "[0.011s][info][gc,init] Min Capacity: 8M",
        "[2023-02-22T12:31:30.322+0000][2243][gc] Min heap equals to max heap, disabling ShenandoahUncommit",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Mode: Snapshot-At-The-Beginning (SATB)",
        "[0.013s][info][gc,metaspace] Narrow klass base: 0x0000000800000000, Narrow klass shift: 0, Narrow klass range: 0x100000000",
        "[0.004s][info][gc,init] NUMA Support: Disabled",
        "[0.004s][info][gc,init] Parallel Workers: 4",
        "[0.004s][info][gc,init] Periodic GC: Disabled",
        "[0.004s][info][gc,init] Pre-touch: Disabled",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Regions: 3072 x 2048K",
        "[0.011s][info][gc,init] Runtime Workers: 1",
        "[2023-02-22T12:31:32.306+0000][2243][gc,init] Safepointing mechanism: global-page poll",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Shenandoah GC mode: Snapshot-At-The-Beginning (SATB)",
        "[2023-02-22T12:31:30.329+0000][2243][gc,init] Shenandoah heuristics: Adaptive",
        "[2021-03-09T14:45:02.441-0300][12.082s] TLAB Size Max: 256K",
        "[0.014s][info][gc,init] TLAB Size Max: 256K",
        "[0.011s][info][gc,init] Uncommit: Enabled",
        "[0.011s][info][gc,init] Uncommit Delay: 300s",
    ];

    #[test]
    fn header_corpus_is_unified_header() {
        for line in HEADER_CORPUS {
            assert_eq!(classify_plain(line), LogEventType::UnifiedHeader, "{line}");
        }
    }

    #[test]
    fn collector_context_selects_short_unified_forms() {
        let line = "[0.101s][info][gc] GC(3) Pause Young (Allocation Failure) 24M->13M(31M) 1.234ms";
        assert_eq!(classify_plain(line), LogEventType::UnifiedYoung);
        assert_eq!(
            classify(line, &ClassifyContext::new(Some(CollectorFamily::Serial))),
            LogEventType::UnifiedSerialNew
        );
        assert_eq!(
            classify(line, &ClassifyContext::new(Some(CollectorFamily::Parallel))),
            LogEventType::UnifiedParallelScavenge
        );
        assert_eq!(
            classify(line, &ClassifyContext::new(Some(CollectorFamily::Cms))),
            LogEventType::UnifiedParNew
        );
    }

    #[test]
    fn trigger_vocabulary_selects_full_gc_family() {
        assert_eq!(
            classify_plain("[2.100s][info][gc] GC(9) Pause Full (Ergonomics) 70M->60M(100M) 50.1ms"),
            LogEventType::UnifiedParallelCompactingOld
        );
        assert_eq!(
            classify_plain(
                "[2.100s][info][gc] GC(9) Pause Full (G1 Compaction Pause) 70M->60M(100M) 50.1ms"
            ),
            LogEventType::UnifiedG1FullGc
        );
        assert_eq!(
            classify_plain("[2.100s][info][gc] GC(9) Pause Full (System.gc()) 70M->60M(100M) 50.1ms"),
            LogEventType::UnifiedOld
        );
    }

    #[test]
    fn malformed_decorator_falls_through_to_unknown() {
        assert_eq!(
            classify_plain("2020-13-10T08:03:46.284-0400: 17.346: [Pause Init Update Refs, 0.017 ms]"),
            LogEventType::Unknown
        );
        assert_eq!(
            classify_plain("2020-13-10T08:03:46.284-0400: [Pause Init Update Refs, 0.017 ms]"),
            LogEventType::Unknown
        );
    }
}
