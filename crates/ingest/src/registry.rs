//! 이벤트 문법 레지스트리 -- 타입별 정규식과 생성자의 정적 목록
//!
//! 목록의 순서가 곧 분류 우선순위입니다. 구체적인 문법이 일반적인 문법보다
//! 앞에 오며, 수집기 계열이 지정된 문법은 JVM 옵션에서 같은 계열이
//! 식별될 때만 고려됩니다. 트리거 어휘가 지정된 문법은 캡처한 원인이
//! 어휘에 속할 때만 매칭됩니다.
//!
//! 모든 문법은 데코레이터를 `dec` 그룹 하나로 캡처하고, 시작 시각은
//! [`start_timestamp`] 한 곳에서 계산합니다.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::error;

use gclog_core::error::ParseError;
use gclog_core::event::{EventData, GcEvent, GenerationalData, HeapData, LogEventType};
use gclog_core::types::{CollectorFamily, JvmContext, Memory, Occupancy, ThreadTimes, Trigger};
use gclog_core::units;

use crate::decorator::{self, Decorator};
use crate::pattern::{self, SECONDS, SIZE, TIMESTAMP};

/// 캡처로부터 이벤트를 만드는 생성자
pub type Build = fn(&Fields<'_>) -> Result<GcEvent, ParseError>;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// 컴파일된 이벤트 문법
pub struct EventGrammar {
    event_type: LogEventType,
    collector: Option<CollectorFamily>,
    triggers: &'static [Trigger],
    regex: Regex,
    build: Build,
}

/// 문법 매칭 결과
#[derive(Debug)]
pub struct Matched<'t> {
    caps: Captures<'t>,
    decorator: Option<Decorator>,
}

impl Matched<'_> {
    pub fn decorator(&self) -> Option<&Decorator> {
        self.decorator.as_ref()
    }
}

impl EventGrammar {
    pub fn event_type(&self) -> LogEventType {
        self.event_type
    }

    /// 이 문법이 요구하는 수집기 계열
    pub fn collector(&self) -> Option<CollectorFamily> {
        self.collector
    }

    /// 매칭을 허용하는 트리거 어휘. 비어 있으면 제한이 없습니다.
    pub fn triggers(&self) -> &'static [Trigger] {
        self.triggers
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// 라인이 문법에 맞으면 캡처를 반환합니다.
    ///
    /// 정규식이 맞더라도 캡처한 데코레이터가 해석되지 않거나, 트리거가
    /// 어휘 밖이면 매칭되지 않은 것으로 봅니다.
    pub fn capture<'t>(&self, line: &'t str) -> Option<Matched<'t>> {
        let caps = self.regex.captures(line)?;
        let decorator = match caps.name("dec") {
            Some(m) => Some(decorator::resolve(m.as_str())?),
            None => None,
        };
        if !self.triggers.is_empty() {
            let trigger = caps
                .name("trigger")
                .map(|m| Trigger::from_log(m.as_str()))
                .unwrap_or_default();
            if !self.triggers.contains(&trigger) {
                return None;
            }
        }
        Some(Matched { caps, decorator })
    }

    /// 매칭 결과로 이벤트를 생성합니다.
    pub fn build(
        &self,
        line: &str,
        matched: &Matched<'_>,
        jvm: &JvmContext,
    ) -> Result<GcEvent, ParseError> {
        let fields = Fields {
            line,
            event_type: self.event_type,
            caps: &matched.caps,
            decorator: matched.decorator.as_ref(),
            jvm,
        };
        (self.build)(&fields)
    }
}

impl std::fmt::Debug for EventGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventGrammar")
            .field("event_type", &self.event_type)
            .field("collector", &self.collector)
            .field("triggers", &self.triggers)
            .finish_non_exhaustive()
    }
}

/// 우선순위 순서의 문법 목록
#[derive(Debug)]
pub struct Registry {
    grammars: Vec<EventGrammar>,
}

impl Registry {
    /// 카탈로그를 컴파일합니다. 컴파일에 실패한 문법은 에러 로그를 남기고 제외합니다.
    pub fn new() -> Self {
        let grammars = catalog()
            .into_iter()
            .filter_map(|spec| match Regex::new(&spec.pattern) {
                Ok(regex) => Some(EventGrammar {
                    event_type: spec.event_type,
                    collector: spec.collector,
                    triggers: spec.triggers,
                    regex,
                    build: spec.build,
                }),
                Err(e) => {
                    error!(
                        event_type = spec.event_type.as_str(),
                        error = %e,
                        "failed to compile event grammar"
                    );
                    None
                }
            })
            .collect();
        Self { grammars }
    }

    /// 프로세스 전역 레지스트리
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn grammars(&self) -> &[EventGrammar] {
        &self.grammars
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// 특정 타입의 문법들 (우선순위 순서)
    pub fn for_type(&self, event_type: LogEventType) -> impl Iterator<Item = &EventGrammar> {
        self.grammars
            .iter()
            .filter(move |g| g.event_type == event_type)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// 시작 시각 (JVM 기동 이후 ms)
///
/// 클래식 데코레이터는 시작 시각을 그대로 쓰고, unified 데코레이터는
/// 종료 시각이므로 지속 시간(µs)을 ms로 반올림해 뺍니다.
/// 데코레이터가 없으면 0입니다.
pub fn start_timestamp(
    decorator: Option<&Decorator>,
    jvm: &JvmContext,
    duration_micros: u64,
) -> u64 {
    match decorator {
        None => 0,
        Some(dec) if dec.is_unified() => dec
            .millis_since_start(jvm)
            .saturating_sub(units::micros_to_millis(duration_micros)),
        Some(dec) => dec.millis_since_start(jvm),
    }
}

/// 생성자에 전달되는 캡처 뷰
pub struct Fields<'a> {
    pub line: &'a str,
    pub event_type: LogEventType,
    caps: &'a Captures<'a>,
    decorator: Option<&'a Decorator>,
    jvm: &'a JvmContext,
}

impl Fields<'_> {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.caps.name(name).map(|m| m.as_str())
    }

    fn require(&self, name: &str) -> Result<&str, ParseError> {
        self.text(name)
            .ok_or_else(|| ParseError::MissingCapture(name.to_owned()))
    }

    fn memory(&self, name: &str) -> Result<Option<Memory>, ParseError> {
        self.text(name).map(Memory::parse).transpose()
    }

    /// `{prefix}b`, `{prefix}a`, `{prefix}c` 그룹의 점유량. `b`가 없으면 스냅샷입니다.
    pub fn occupancy(&self, prefix: &str) -> Result<Option<Occupancy>, ParseError> {
        let Some(after) = self.memory(&format!("{prefix}a"))? else {
            return Ok(None);
        };
        let capacity = Memory::parse(self.require(&format!("{prefix}c"))?)?;
        let before = self.memory(&format!("{prefix}b"))?.unwrap_or(after);
        Ok(Some(Occupancy::new(before, after, capacity)))
    }

    /// 지속 시간 (µs). `dur_s`(초) 또는 `dur_ms`(밀리초) 그룹, 없으면 0.
    pub fn duration(&self) -> Result<u64, ParseError> {
        if let Some(text) = self.text("dur_s") {
            return units::secs_to_micros(text);
        }
        if let Some(text) = self.text("dur_ms") {
            return units::millis_to_micros(text);
        }
        Ok(0)
    }

    pub fn times(&self) -> Result<Option<ThreadTimes>, ParseError> {
        match (self.text("user"), self.text("sys"), self.text("real")) {
            (Some(user), Some(sys), Some(real)) => ThreadTimes::parse(user, sys, real).map(Some),
            _ => Ok(None),
        }
    }

    /// 수집 원인. concurrent mode 실패가 기록되어 있으면 그것을 우선합니다.
    pub fn trigger(&self) -> Trigger {
        self.text("cmf")
            .or_else(|| self.text("trigger"))
            .map(Trigger::from_log)
            .unwrap_or_default()
    }

    /// 이벤트를 생성합니다. 시작 시각은 [`start_timestamp`]로 계산합니다.
    pub fn event(&self, duration: u64, data: EventData) -> GcEvent {
        let timestamp = start_timestamp(self.decorator, self.jvm, duration);
        let unified = self.decorator.is_some_and(Decorator::is_unified);
        GcEvent::new(self.event_type, timestamp, duration, self.line, data)
            .with_unified_decorator(unified)
    }
}

// --- 생성자 ---

fn marker(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    Ok(f.event(0, EventData::Marker))
}

fn phase(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    Ok(f.event(f.duration()?, EventData::Phase))
}

fn concurrent(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    let times = f.times()?;
    Ok(f.event(f.duration()?, EventData::Concurrent { times }))
}

fn safepoint(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    let stopping_threads_micros = f.text("stop").map(units::secs_to_micros).transpose()?;
    Ok(f.event(
        f.duration()?,
        EventData::Safepoint {
            stopping_threads_micros,
        },
    ))
}

fn heap(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    let other_micros = f.text("other").map(units::millis_to_micros).transpose()?;
    let duration = f.duration()? + other_micros.unwrap_or(0);
    let data = HeapData {
        trigger: f.trigger(),
        combined: f.occupancy("c")?,
        permanent: f.occupancy("p")?,
        times: f.times()?,
        other_micros,
    };
    Ok(f.event(duration, EventData::Heap(Box::new(data))))
}

fn generational(f: &Fields<'_>) -> Result<GcEvent, ParseError> {
    let young = f.occupancy("y")?;
    let combined = f.occupancy("c")?;
    let old = match f.occupancy("o")? {
        Some(old) => Some(old),
        None => young.zip(combined).map(|(y, c)| remainder(c, y)),
    };
    let data = GenerationalData {
        trigger: f.trigger(),
        young,
        old,
        combined,
        permanent: f.occupancy("p")?,
        times: f.times()?,
    };
    Ok(f.event(f.duration()?, EventData::Generational(Box::new(data))))
}

/// 힙 전체에서 young을 뺀 old 점유량
fn remainder(combined: Occupancy, young: Occupancy) -> Occupancy {
    let sub = |a: Memory, b: Memory| Memory::from_bytes(a.bytes().saturating_sub(b.bytes()));
    Occupancy::new(
        sub(combined.before, young.before),
        sub(combined.after, young.after),
        sub(combined.capacity, young.capacity),
    )
}

// --- 카탈로그 ---

struct GrammarSpec {
    event_type: LogEventType,
    collector: Option<CollectorFamily>,
    triggers: &'static [Trigger],
    pattern: String,
    build: Build,
}

fn spec(event_type: LogEventType, pattern: String, build: Build) -> GrammarSpec {
    GrammarSpec {
        event_type,
        collector: None,
        triggers: &[],
        pattern,
        build,
    }
}

fn for_collector(
    collector: CollectorFamily,
    event_type: LogEventType,
    pattern: String,
    build: Build,
) -> GrammarSpec {
    GrammarSpec {
        collector: Some(collector),
        ..spec(event_type, pattern, build)
    }
}

fn with_triggers(
    triggers: &'static [Trigger],
    event_type: LogEventType,
    pattern: String,
    build: Build,
) -> GrammarSpec {
    GrammarSpec {
        triggers,
        ..spec(event_type, pattern, build)
    }
}

const G1_TRIGGERS: &[Trigger] = &[
    Trigger::G1EvacuationPause,
    Trigger::G1HumongousAllocation,
    Trigger::G1PreventiveCollection,
];

const G1_FULL_TRIGGERS: &[Trigger] = &[
    Trigger::G1CompactionPause,
    Trigger::G1EvacuationPause,
    Trigger::G1HumongousAllocation,
    Trigger::G1PreventiveCollection,
];

const PARALLEL_FULL_TRIGGERS: &[Trigger] = &[Trigger::Ergonomics];

/// 우선순위 순서의 문법 카탈로그
fn catalog() -> Vec<GrammarSpec> {
    use LogEventType as T;

    let cd = pattern::classic_dec();
    let ud = pattern::unified_dec();
    let ad = pattern::any_decorator();
    let inner = pattern::inner_decorator();
    let trg = pattern::trigger();
    let tms = pattern::times();
    let uts = pattern::unified_times();
    let occ_y = pattern::occupancy("y");
    let occ_o = pattern::occupancy("o");
    let occ_c = pattern::occupancy("c");
    let occ_p = pattern::occupancy("p");
    let gen_y = pattern::generation("y");
    let gen_o = pattern::generation("o");
    let gen_p = pattern::generation("p");
    let dur_s = pattern::secs("dur_s");
    let dur_ms = pattern::millis("dur_ms");
    let ysec = pattern::secs("ysec");
    let osec = pattern::secs("osec");
    let end = r"\s*$";

    // unified 힙 요약 꼬리: Other, Humongous, Metaspace, 점유량, 시간, cpu
    let g1_tail = format!(
        r"(?: Other: {other})?(?: Humongous regions: \d+->\d+)?(?: Metaspace: {gen_p})? {occ_c} {dur_ms}(?:{uts})?{end}",
        other = pattern::millis("other"),
    );
    // unified 세대 요약 꼬리 (세대 상세는 선택)
    let gen_tail = format!(
        r"(?: (?:DefNew|ParNew|PSYoungGen): {gen_y})?(?: (?:Tenured|CMS|ParOldGen|PSOldGen): {gen_o})?(?: Metaspace: {gen_p})? {occ_c} {dur_ms}(?:{uts})?{end}"
    );
    let short_tail = format!(r"(?: Metaspace: {gen_p})? {occ_c} {dur_ms}(?:{uts})?{end}");
    let shenandoah_flags = r"(?: \((?:update refs|process weakrefs|unload classes)\))*";
    let shenandoah_pause = |name: &str| {
        format!(r"^{ad} \[?Pause {name}{shenandoah_flags},? {dur_ms}\]?{end}")
    };
    let z_pause = |name: &str| format!(r"^{ud} Pause {name}(?: \((?:Major|Minor)\))? {dur_ms}{end}");
    let g1_detail = |kind: &str| {
        format!(
            r"^{cd} \[GC pause(?: {trg})? {kind}(?: \(to-space (?:exhausted|overflow)\))?, {dur_s}\]\[Eden: {SIZE}\({SIZE}\)->{SIZE}\({SIZE}\) Survivors: {SIZE}->{SIZE} Heap: (?P<cb>{SIZE})\({SIZE}\)->(?P<ca>{SIZE})\((?P<cc>{SIZE})\)\](?:{tms})?{end}"
        )
    };
    let g1_simple = |kind: &str| {
        format!(
            r"^{cd} \[GC pause(?: {trg})? {kind}(?: \(to-space (?:exhausted|overflow)\))? {occ_c}, {dur_s}\](?:{tms})?{end}"
        )
    };
    let parallel_full = |old: &str| {
        format!(
            r"^{cd} \[Full GC(?: {trg})? ?\[PSYoungGen: {occ_y}\] \[{old}: {occ_o}\] {occ_c},? \[(?:PSPermGen|Metaspace): {occ_p}\],? {dur_s}\](?:{tms})?{end}"
        )
    };

    vec![
        // 구조 라인
        spec(T::BlankLine, r"^\s*$".to_owned(), marker),
        spec(
            T::HeaderVersion,
            r"^(?:Java HotSpot\(TM\)|OpenJDK) (?:64-Bit )?(?:Server|Client) VM \(.+\) for .+$"
                .to_owned(),
            marker,
        ),
        spec(
            T::HeaderMemory,
            r"^Memory: \d+k page, physical \d+k\(\d+k free\)(?:, swap \d+k\(\d+k free\))?\s*$"
                .to_owned(),
            marker,
        ),
        spec(T::HeaderCommandLineFlags, r"^CommandLine flags: .+$".to_owned(), marker),
        spec(
            T::VmWarning,
            r"^(?:Java HotSpot\(TM\)|OpenJDK) (?:64-Bit )?(?:Server|Client) VM warning: .+$"
                .to_owned(),
            marker,
        ),
        spec(
            T::GcLocker,
            r"^GC locker: Trying a full collection because scavenge failed\s*$".to_owned(),
            marker,
        ),
        spec(
            T::GcOverheadLimit,
            r"^\s*GC time (?:would exceed|is exceeding) GCTimeLimit of \d{1,3}%\s*$".to_owned(),
            marker,
        ),
        spec(
            T::TenuringDistribution,
            r"^(?:Desired survivor size \d+ bytes, new threshold \d+ \(max (?:threshold )?\d+\)|- age +\d+: +\d+ bytes, +\d+ total)\s*$"
                .to_owned(),
            marker,
        ),
        // unified 헤더
        spec(
            T::UnifiedHeaderVersion,
            format!(r"^{ud} Version: \d{{1,2}}(?:\.\d{{1,3}}){{0,3}}\S* \((?:release|fastdebug|debug)\).*$"),
            marker,
        ),
        spec(T::UsingSerial, format!(r"^{ud} Using Serial{end}"), marker),
        spec(T::UsingParallel, format!(r"^{ud} Using Parallel{end}"), marker),
        spec(T::UsingCms, format!(r"^{ud} Using Concurrent Mark Sweep{end}"), marker),
        spec(T::UsingG1, format!(r"^{ud} Using G1{end}"), marker),
        spec(T::UsingShenandoah, format!(r"^{ud} Using Shenandoah{end}"), marker),
        spec(T::UsingZ, format!(r"^{ud} Using The Z Garbage Collector{end}"), marker),
        spec(
            T::UnifiedHeader,
            format!(
                r"^{ud} (?:Address Space Size|Address Space Type|Alignments|Available space on backing filesystem|CardTable entry size|CDS archive\(s\) mapped at|Compressed class space mapped at|Compressed Oops|CPUs|GC threads|GC Workers|Heap Address|Heap Backing File|Heap Backing Filesystem|Heap Initial Capacity|Heap Max Capacity|Heap Min Capacity|Heap Region Count|Heap Region Size|Heap Uncommit|Heuristics|Humongous [Oo]bject [Tt]hreshold|Initial Capacity|Initialize mark stack|Initialize Shenandoah heap|Initializing The Z Garbage Collector|Large Page Support|Max Capacity|Max TLAB size|Medium Page Size|Memory|Min Capacity|Min heap equals to max heap|Mode|Narrow klass base|NUMA Support|Parallel Workers|Concurrent Workers|Concurrent Refinement Workers|Periodic GC|Pre-touch|Probing address space|Regions|Runtime Workers|Safepointing mechanism|Shenandoah GC mode|Shenandoah heuristics|Soft Max Capacity|TLAB Size Max|Uncommit)\b.*$"
            ),
            marker,
        ),
        // safepoint
        spec(
            T::ApplicationStoppedTime,
            format!(
                r"^(?:{ad} )?Total time for which application threads were stopped: (?P<dur_s>\d{{1,4}}[.,]\d{{7}}) seconds(?:, Stopping threads took: (?P<stop>\d{{1,4}}[.,]\d{{7}}) seconds)?{end}"
            ),
            safepoint,
        ),
        spec(
            T::ApplicationConcurrentTime,
            format!(r"^(?:{ad} )?Application time: (?P<dur_s>\d{{1,4}}[.,]\d{{7}}) seconds{end}"),
            safepoint,
        ),
        // shenandoah (두 시대 공통)
        spec(T::ShenandoahInitMark, shenandoah_pause("Init Mark"), phase),
        spec(T::ShenandoahFinalMark, shenandoah_pause("Final Mark"), phase),
        spec(T::ShenandoahInitUpdate, shenandoah_pause("Init Update Refs"), phase),
        spec(T::ShenandoahFinalUpdate, shenandoah_pause("Final Update Refs"), phase),
        spec(T::ShenandoahFinalEvac, shenandoah_pause("Final Evac"), phase),
        spec(
            T::ShenandoahDegeneratedGc,
            format!(
                r"^{ad} \[?Pause Degenerated GC \((?:Outside of Cycle|Mark|Evacuation|Update Refs)\),? {occ_c},? {dur_ms}\]?{end}"
            ),
            heap,
        ),
        spec(
            T::ShenandoahFullGc,
            format!(r"^{ad} \[?Pause Full(?: {trg})? {occ_c}, {dur_ms}\]?{end}"),
            heap,
        ),
        spec(
            T::ShenandoahConcurrent,
            format!(
                r"^{ad} \[?Concurrent (?:reset|marking|precleaning|evacuation|update references|cleanup|uncommit|class unloading|weak references|weak roots|strong roots|thread roots|update thread roots|mark roots|roots){shenandoah_flags}(?:, start\]|(?: {occ_c})?,? {dur_ms}\]?)?{end}"
            ),
            concurrent,
        ),
        spec(T::ShenandoahTrigger, format!(r"^{ad} Trigger: .+$"), marker),
        // z
        spec(T::ZMarkStart, z_pause("Mark Start"), phase),
        spec(T::ZMarkEnd, z_pause("Mark End"), phase),
        spec(T::ZRelocateStart, z_pause("Relocate Start"), phase),
        // unified g1
        spec(
            T::UnifiedG1YoungPrepareMixed,
            format!(r"^{ud} Pause Young \(Prepare Mixed\) {trg}{g1_tail}"),
            heap,
        ),
        spec(
            T::UnifiedG1MixedPause,
            format!(r"^{ud} Pause Young \(Mixed\) {trg}{g1_tail}"),
            heap,
        ),
        spec(
            T::UnifiedG1YoungPause,
            format!(r"^{ud} Pause Young \((?:Normal|Concurrent Start)\) {trg}{g1_tail}"),
            heap,
        ),
        with_triggers(
            G1_TRIGGERS,
            T::UnifiedG1YoungPause,
            format!(r"^{ud} Pause Young {trg}{g1_tail}"),
            heap,
        ),
        spec(
            T::UnifiedG1Cleanup,
            format!(r"^{ud} Pause Cleanup {occ_c} {dur_ms}(?:{uts})?{end}"),
            heap,
        ),
        for_collector(
            CollectorFamily::G1,
            T::UnifiedG1FullGc,
            format!(r"^{ud} Pause Full {trg}{g1_tail}"),
            heap,
        ),
        with_triggers(
            G1_FULL_TRIGGERS,
            T::UnifiedG1FullGc,
            format!(r"^{ud} Pause Full {trg}{g1_tail}"),
            heap,
        ),
        // unified 세대 상세가 있는 요약
        spec(
            T::UnifiedSerialNew,
            format!(r"^{ud} Pause Young {trg} DefNew: {gen_y} Tenured: {gen_o}{short_tail}"),
            generational,
        ),
        spec(
            T::UnifiedSerialOld,
            format!(r"^{ud} Pause Full {trg} DefNew: {gen_y} Tenured: {gen_o}{short_tail}"),
            generational,
        ),
        spec(
            T::UnifiedParallelScavenge,
            format!(
                r"^{ud} Pause Young {trg} PSYoungGen: {gen_y} (?:ParOldGen|PSOldGen): {gen_o}{short_tail}"
            ),
            generational,
        ),
        spec(
            T::UnifiedParallelCompactingOld,
            format!(
                r"^{ud} Pause Full {trg} PSYoungGen: {gen_y} (?:ParOldGen|PSOldGen): {gen_o}{short_tail}"
            ),
            generational,
        ),
        spec(
            T::UnifiedParNew,
            format!(r"^{ud} Pause Young {trg} ParNew: {gen_y} CMS: {gen_o}{short_tail}"),
            generational,
        ),
        spec(
            T::UnifiedCmsInitialMark,
            format!(r"^{ud} Pause Initial Mark {occ_c} {dur_ms}(?:{uts})?{end}"),
            heap,
        ),
        // 수집기 계열로만 구분되는 unified 요약
        for_collector(
            CollectorFamily::Serial,
            T::UnifiedSerialNew,
            format!(r"^{ud} Pause Young {trg}{short_tail}"),
            generational,
        ),
        for_collector(
            CollectorFamily::Serial,
            T::UnifiedSerialOld,
            format!(r"^{ud} Pause Full {trg}{short_tail}"),
            generational,
        ),
        for_collector(
            CollectorFamily::Parallel,
            T::UnifiedParallelScavenge,
            format!(r"^{ud} Pause Young {trg}{short_tail}"),
            generational,
        ),
        for_collector(
            CollectorFamily::Parallel,
            T::UnifiedParallelCompactingOld,
            format!(r"^{ud} Pause Full {trg}{short_tail}"),
            generational,
        ),
        with_triggers(
            PARALLEL_FULL_TRIGGERS,
            T::UnifiedParallelCompactingOld,
            format!(r"^{ud} Pause Full {trg}{short_tail}"),
            generational,
        ),
        for_collector(
            CollectorFamily::Cms,
            T::UnifiedParNew,
            format!(r"^{ud} Pause Young {trg}{short_tail}"),
            generational,
        ),
        // 수집기 미상 unified
        spec(
            T::UnifiedYoung,
            format!(r"^{ud} Pause Young {trg}{gen_tail}"),
            generational,
        ),
        spec(
            T::UnifiedOld,
            format!(r"^{ud} Pause Full {trg}{gen_tail}"),
            generational,
        ),
        spec(
            T::UnifiedRemark,
            format!(r"^{ud} Pause Remark {occ_c} {dur_ms}(?:{uts})?{end}"),
            heap,
        ),
        spec(
            T::UnifiedConcurrent,
            format!(
                r"^{ud} Concurrent [A-Z][A-Za-z ]*?(?: \({TIMESTAMP}s(?:, {TIMESTAMP}s)?\))?(?: {dur_ms})?{end}"
            ),
            concurrent,
        ),
        // 클래식 cms
        spec(
            T::CmsSerialOld,
            format!(
                r"^{cd} \[(?:Full )?GC(?: {trg})? ?{inner}(?:\[ParNew(?: \(promotion failed\))?(?:: {occ_y}, {ysec}\])? ?{inner})?(?:\[CMS)?(?: ?\((?P<cmf>concurrent mode (?:failure|interrupted))\))?: {occ_o}, {osec}\] {occ_c}, \[(?:CMS Perm |Metaspace): {occ_p}\](?: icms_dc=\d{{1,3}} )?, {dur_s}\](?:{tms})?{end}"
            ),
            generational,
        ),
        spec(
            T::ParNew,
            format!(
                r"^{cd} \[GC(?: {trg})? ?{inner}\[ParNew(?: \(promotion failed\))?: {occ_y}, {ysec}\] {occ_c}(?: icms_dc=\d{{1,3}} )?, {dur_s}\](?:{tms})?{end}"
            ),
            generational,
        ),
        spec(
            T::CmsInitialMark,
            format!(
                r"^{cd} \[GC(?: {trg})? ?\[1 CMS-initial-mark: {snap_o}\] {snap_c}, {dur_s}\](?:{tms})?{end}",
                snap_o = pattern::snapshot("o"),
                snap_c = pattern::snapshot("c"),
            ),
            generational,
        ),
        spec(
            T::CmsRemark,
            format!(
                r"^{cd} \[GC(?: {trg})? ?\[YG occupancy: \d+ K \(\d+ K\)\].*?\[1 CMS-remark: {snap_o}\] {snap_c}, {dur_s}\](?:{tms})?{end}",
                snap_o = pattern::snapshot("o"),
                snap_c = pattern::snapshot("c"),
            ),
            generational,
        ),
        spec(
            T::CmsConcurrent,
            format!(
                r"^{cd} \[CMS-concurrent-[a-z-]+(?:: {SECONDS}/{SECONDS} secs)?\](?:{tms})?{end}"
            ),
            concurrent,
        ),
        // 클래식 serial
        spec(
            T::SerialOld,
            format!(
                r"^{cd} \[(?:Full )?GC(?: {trg})? ?{inner}(?:\[DefNew: {occ_y}, {ysec}\] ?{inner})?\[Tenured: {occ_o}, {osec}\] {occ_c}, \[(?:Perm|Metaspace) ?: {occ_p}\], {dur_s}\](?:{tms})?{end}"
            ),
            generational,
        ),
        spec(
            T::SerialNew,
            format!(
                r"^{cd} \[GC(?: {trg})? ?{inner}\[DefNew: {occ_y}, {ysec}\] {occ_c}, {dur_s}\](?:{tms})?{end}"
            ),
            generational,
        ),
        // 클래식 parallel
        spec(T::ParallelSerialOld, parallel_full("PSOldGen"), generational),
        spec(T::ParallelCompactingOld, parallel_full("ParOldGen"), generational),
        spec(
            T::ParallelScavenge,
            format!(
                r"^{cd} \[GC(?: {trg})?(?: --)? ?\[PSYoungGen: {occ_y}\] {occ_c}, {dur_s}\](?:{tms})?{end}"
            ),
            generational,
        ),
        // 클래식 g1
        spec(T::G1YoungInitialMark, g1_detail(r"\(young\) \(initial-mark\)"), heap),
        spec(T::G1YoungInitialMark, g1_simple(r"\(young\) \(initial-mark\)"), heap),
        spec(T::G1YoungPause, g1_detail(r"\(young\)"), heap),
        spec(T::G1YoungPause, g1_simple(r"\(young\)"), heap),
        spec(T::G1MixedPause, g1_detail(r"\(mixed\)"), heap),
        spec(T::G1MixedPause, g1_simple(r"\(mixed\)"), heap),
        spec(
            T::G1FullGc,
            format!(
                r"^{cd} \[Full GC(?: {trg})? +{occ_c}, {dur_s}\](?:\[Eden: [^\]]+\](?:, \[(?:Metaspace|Perm): {occ_p}\])?)?(?:{tms})?{end}"
            ),
            heap,
        ),
        spec(
            T::G1Remark,
            format!(
                r"^{cd} \[GC remark(?: ?{inner}\[[A-Za-z -]+, {SECONDS} secs\])*, {dur_s}\](?:{tms})?{end}"
            ),
            phase,
        ),
        spec(
            T::G1Cleanup,
            format!(r"^{cd} \[GC cleanup(?: {occ_c})?, {dur_s}\](?:{tms})?{end}"),
            heap,
        ),
        spec(
            T::G1Concurrent,
            format!(r"^{cd} \[GC concurrent-[a-z-]+(?:, {dur_s})?\]{end}"),
            concurrent,
        ),
        // 진단 라인 (가장 마지막)
        spec(
            T::GcInfo,
            format!(
                r"^(?:{ad} )?(?:Soft Max Heap Size: .+|Reference processing: .+|Using \d+ workers of \d+ for .+|Uncommitted \d+[BKMG]\. Heap: .+|Cancelling GC: .+){end}"
            ),
            marker,
        ),
    ]
}
