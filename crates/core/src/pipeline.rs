//! 파이프라인 trait -- 이벤트 스트림 소비자 확장 포인트

use crate::error::GcLogError;
use crate::event::GcEvent;

/// 스트림 종료 시 소비자에게 전달되는 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEnd {
    /// 완성되지 못한 마지막 논리 라인
    pub last_unprocessed: Option<String>,
    /// unknown으로 분류된 라인 수
    pub unknown_lines: u64,
}

/// 이벤트 스트림을 소비하는 trait
///
/// 집계기, 보고서 생성기 등 하류 협력자가 구현합니다.
/// 이벤트는 로그 순서대로 한 번씩 전달됩니다.
pub trait EventSink: Send {
    /// 소비자 이름
    fn name(&self) -> &str;

    /// 이벤트 하나를 받습니다.
    fn accept(&mut self, event: GcEvent) -> Result<(), GcLogError>;

    /// 스트림 종료를 알립니다.
    fn finish(&mut self, _end: &StreamEnd) -> Result<(), GcLogError> {
        Ok(())
    }
}

impl EventSink for Vec<GcEvent> {
    fn name(&self) -> &str {
        "vec"
    }

    fn accept(&mut self, event: GcEvent) -> Result<(), GcLogError> {
        self.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::event::LogEventType;

    struct ReportableOnly {
        events: Vec<GcEvent>,
        end: Option<StreamEnd>,
    }

    impl EventSink for ReportableOnly {
        fn name(&self) -> &str {
            "reportable-only"
        }

        fn accept(&mut self, event: GcEvent) -> Result<(), GcLogError> {
            if event.event_type() == LogEventType::Unknown {
                return Err(PipelineError::SinkRejected(event.log_entry().to_owned()).into());
            }
            if event.is_reportable() {
                self.events.push(event);
            }
            Ok(())
        }

        fn finish(&mut self, end: &StreamEnd) -> Result<(), GcLogError> {
            self.end = Some(end.clone());
            Ok(())
        }
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<GcEvent> = Vec::new();
        sink.accept(GcEvent::unknown("a")).unwrap();
        sink.accept(GcEvent::unknown("b")).unwrap();
        sink.finish(&StreamEnd::default()).unwrap();
        assert_eq!(sink.name(), "vec");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].log_entry(), "b");
    }

    #[test]
    fn custom_sink_can_reject() {
        let mut sink = ReportableOnly {
            events: Vec::new(),
            end: None,
        };
        let err = sink.accept(GcEvent::unknown("garbage")).unwrap_err();
        assert!(matches!(
            err,
            GcLogError::Pipeline(PipelineError::SinkRejected(_))
        ));

        let end = StreamEnd {
            last_unprocessed: Some("[GC".to_owned()),
            unknown_lines: 1,
        };
        sink.finish(&end).unwrap();
        assert_eq!(sink.end, Some(end));
        assert!(sink.events.is_empty());
    }
}
