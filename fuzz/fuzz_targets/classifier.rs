#![no_main]

use gclog_core::types::JvmContext;
use gclog_ingest::{Classifier, ClassifyContext, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let classifier = Classifier::new(ClassifyContext::default());

    // 어떤 입력이든 패닉 없이 이벤트 하나가 나와야 하고 원문이 보존되어야 한다
    let parsed = parse_line(&classifier, &line, &JvmContext::new());
    assert_eq!(parsed.event.log_entry(), line.as_ref());
});
