//! 파서 -- 분류된 라인에서 타입별 필드를 추출합니다.
//!
//! 파서는 전체 함수입니다. 매칭된 문법의 필드 변환이 실패하면 경고를
//! 남기고 같은 라인을 담은 `Unknown` 이벤트를 반환합니다.

use tracing::{debug, warn};

use gclog_core::event::{GcEvent, LogEventType};
use gclog_core::types::JvmContext;

use crate::classifier::Classifier;
use crate::registry::{EventGrammar, Matched, Registry};

/// 파싱 결과와 실패 여부
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub event: GcEvent,
    /// 문법은 맞았지만 필드 변환에 실패했는지 여부
    pub failed: bool,
}

/// 지정한 타입의 문법으로 라인을 파싱합니다.
///
/// 해당 타입의 문법이 하나도 맞지 않으면 `Unknown`을 반환합니다.
pub fn parse(event_type: LogEventType, line: &str, jvm: &JvmContext) -> GcEvent {
    parse_with(Registry::global(), event_type, line, jvm).event
}

/// 레지스트리를 지정해 파싱합니다.
pub fn parse_with(
    registry: &Registry,
    event_type: LogEventType,
    line: &str,
    jvm: &JvmContext,
) -> Parsed {
    if event_type == LogEventType::Unknown {
        return Parsed {
            event: GcEvent::unknown(line),
            failed: false,
        };
    }

    let found = registry
        .for_type(event_type)
        .find_map(|grammar| grammar.capture(line).map(|matched| (grammar, matched)));

    match found {
        Some((grammar, matched)) => build(grammar, line, &matched, jvm),
        None => {
            debug!(
                event_type = event_type.as_str(),
                "no grammar of the requested type matches line"
            );
            Parsed {
                event: GcEvent::unknown(line),
                failed: false,
            }
        }
    }
}

/// 분류와 파싱을 한 번의 매칭으로 수행합니다.
pub fn parse_line(classifier: &Classifier<'_>, line: &str, jvm: &JvmContext) -> Parsed {
    match classifier.find(line) {
        Some((grammar, matched)) => build(grammar, line, &matched, jvm),
        None => Parsed {
            event: GcEvent::unknown(line),
            failed: false,
        },
    }
}

fn build(grammar: &EventGrammar, line: &str, matched: &Matched<'_>, jvm: &JvmContext) -> Parsed {
    match grammar.build(line, matched, jvm) {
        Ok(event) => Parsed {
            event,
            failed: false,
        },
        Err(e) => {
            warn!(
                event_type = grammar.event_type().as_str(),
                error = %e,
                line,
                "failed to parse matched line, emitting unknown event"
            );
            Parsed {
                event: GcEvent::unknown(line),
                failed: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifyContext;
    use gclog_core::types::{Memory, Occupancy, Trigger};

    fn jvm() -> JvmContext {
        JvmContext::new()
    }

    #[test]
    fn shenandoah_init_update_classic() {
        let line = "2020-03-10T08:03:46.284-0400: 17.346: [Pause Init Update Refs, 0.017 ms]";
        let event = parse(LogEventType::ShenandoahInitUpdate, line, &jvm());
        assert_eq!(event.event_type(), LogEventType::ShenandoahInitUpdate);
        assert_eq!(event.timestamp(), 17_346);
        assert_eq!(event.duration(), 17);
        assert_eq!(event.log_entry(), line);
        assert!(!event.is_unified());
    }

    #[test]
    fn shenandoah_init_update_unified() {
        let line = "[5.312s][info][gc] GC(110) Pause Init Update Refs 0.005ms";
        let event = parse(LogEventType::ShenandoahInitUpdate, line, &jvm());
        assert_eq!(event.timestamp(), 5_312);
        assert_eq!(event.duration(), 5);
        assert!(event.is_unified());
    }

    #[test]
    fn z_mark_end() {
        let event = parse(
            LogEventType::ZMarkEnd,
            "[0.129s] GC(0) Pause Mark End 0.006ms",
            &jvm(),
        );
        assert_eq!(event.timestamp(), 129);
        assert_eq!(event.duration(), 6);
    }

    #[test]
    fn unified_g1_young_prepare_mixed() {
        let line = "[16.627s][info][gc,start      ] GC(1354) Pause Young (Prepare Mixed) (G1 Evacuation Pause) Other: 0.1ms Humongous regions: 13->13 Metaspace: 3801K->3801K(1056768K) 24M->13M(31M) 0.361ms User=0.00s Sys=0.00s Real=0.00s   ";
        let event = parse(LogEventType::UnifiedG1YoungPrepareMixed, line, &jvm());
        assert_eq!(event.event_type(), LogEventType::UnifiedG1YoungPrepareMixed);
        assert_eq!(event.timestamp(), 16_627);
        assert_eq!(event.trigger(), Some(Trigger::G1EvacuationPause));
        assert_eq!(
            event.permanent(),
            Some(Occupancy::new(
                Memory::from_kilobytes(3801),
                Memory::from_kilobytes(3801),
                Memory::from_kilobytes(1_056_768),
            ))
        );
        assert_eq!(
            event.combined(),
            Some(Occupancy::new(
                Memory::from_kilobytes(24 * 1024),
                Memory::from_kilobytes(13 * 1024),
                Memory::from_kilobytes(31 * 1024),
            ))
        );
        assert_eq!(event.other_micros(), Some(100));
        assert_eq!(event.duration(), 461);
        assert_eq!(event.parallelism(), Some(100));
    }

    #[test]
    fn unified_g1_prepare_mixed_with_comma_decimals() {
        let line = "[2022-08-05T05:08:51.394+0000][1908][gc,start    ] GC(1360) Pause Young (Prepare Mixed) (G1 Evacuation Pause) Metaspace: 147162K(149824K)->147162K(149824K) 24336M->9999M(32768M) 26,821ms User=0,18s Sys=0,00s Real=0,03s";
        let event = parse(LogEventType::UnifiedG1YoungPrepareMixed, line, &jvm());
        assert_eq!(event.event_type(), LogEventType::UnifiedG1YoungPrepareMixed);
        assert_eq!(event.duration(), 26_821);
        assert_eq!(event.other_micros(), None);
        assert_eq!(event.parallelism(), Some(600));
    }

    #[test]
    fn wrong_type_yields_unknown() {
        let line = "[0.129s] GC(0) Pause Mark End 0.006ms";
        let event = parse(LogEventType::ParNew, line, &jvm());
        assert_eq!(event.event_type(), LogEventType::Unknown);
        assert_eq!(event.log_entry(), line);
    }

    #[test]
    fn parse_line_classifies_and_parses() {
        let classifier = Classifier::new(ClassifyContext::default());
        let parsed = parse_line(&classifier, "[0.132s] GC(0) Pause Relocate Start 0.004ms", &jvm());
        assert!(!parsed.failed);
        assert_eq!(parsed.event.event_type(), LogEventType::ZRelocateStart);
        assert_eq!(parsed.event.duration(), 4);
    }

    #[test]
    fn overflowing_field_is_a_parse_failure() {
        let classifier = Classifier::new(ClassifyContext::default());
        let line = "[0.101s][info][gc] GC(3) Pause Young (Allocation Failure) 999999999999G->13M(31M) 1.234ms";
        let parsed = parse_line(&classifier, line, &jvm());
        assert!(parsed.failed);
        assert_eq!(parsed.event.event_type(), LogEventType::Unknown);
        assert_eq!(parsed.event.log_entry(), line);
    }
}
