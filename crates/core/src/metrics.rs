//! 메트릭 상수 및 설명 등록
//!
//! 수집 파이프라인이 기록하는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 레코더(exporter) 설치는 이 크레이트를 사용하는 쪽의 책임입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `gclog_ingest_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(gclog_core::metrics::INGEST_LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 타입 레이블 키 (예: `PAR_NEW`)
pub const LABEL_EVENT_TYPE: &str = "event_type";

// ─── Ingest 메트릭 ─────────────────────────────────────────────────

/// 읽은 원시 라인 수 (counter)
pub const INGEST_LINES_READ_TOTAL: &str = "gclog_ingest_lines_read_total";

/// 재조립된 논리 라인 수 (counter)
pub const INGEST_LOGICAL_LINES_TOTAL: &str = "gclog_ingest_logical_lines_total";

/// 방출된 이벤트 수 (counter, label: event_type)
pub const INGEST_EVENTS_EMITTED_TOTAL: &str = "gclog_ingest_events_emitted_total";

/// unknown으로 분류된 라인 수 (counter)
pub const INGEST_UNKNOWN_LINES_TOTAL: &str = "gclog_ingest_unknown_lines_total";

/// 종료 시점에 미완성으로 방출된 레코드 수 (counter)
pub const INGEST_INCOMPLETE_RECORDS_TOTAL: &str = "gclog_ingest_incomplete_records_total";

/// 파싱 실패로 unknown 처리된 라인 수 (counter)
pub const INGEST_PARSE_FAILURES_TOTAL: &str = "gclog_ingest_parse_failures_total";

/// 최대 길이를 넘어 잘린 라인 수 (counter)
pub const INGEST_LINES_TRUNCATED_TOTAL: &str = "gclog_ingest_lines_truncated_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(INGEST_LINES_READ_TOTAL, "Total raw lines read from GC logs");
    describe_counter!(
        INGEST_LOGICAL_LINES_TOTAL,
        "Total logical lines produced by reassembly"
    );
    describe_counter!(
        INGEST_EVENTS_EMITTED_TOTAL,
        "Total GC events emitted, by event type"
    );
    describe_counter!(
        INGEST_UNKNOWN_LINES_TOTAL,
        "Total logical lines no grammar recognized"
    );
    describe_counter!(
        INGEST_INCOMPLETE_RECORDS_TOTAL,
        "Total records flushed at end of stream while awaiting continuation"
    );
    describe_counter!(
        INGEST_PARSE_FAILURES_TOTAL,
        "Total matched lines whose fields could not be converted"
    );
    describe_counter!(
        INGEST_LINES_TRUNCATED_TOTAL,
        "Total raw lines truncated to the maximum line length"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        INGEST_LINES_READ_TOTAL,
        INGEST_LOGICAL_LINES_TOTAL,
        INGEST_EVENTS_EMITTED_TOTAL,
        INGEST_UNKNOWN_LINES_TOTAL,
        INGEST_INCOMPLETE_RECORDS_TOTAL,
        INGEST_PARSE_FAILURES_TOTAL,
        INGEST_LINES_TRUNCATED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("gclog_ingest_"),
                "Metric '{}' does not start with 'gclog_ingest_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES {
            assert!(name.ends_with("_total"), "Counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_key_is_lowercase() {
        assert_eq!(LABEL_EVENT_TYPE.to_lowercase(), LABEL_EVENT_TYPE);
    }
}
