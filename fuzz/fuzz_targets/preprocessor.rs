#![no_main]

use arbitrary::Arbitrary;
use gclog_ingest::Preprocessor;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    lines: Vec<String>,
}

fuzz_target!(|input: Input| {
    let count = input.lines.len();
    let logical = Preprocessor::with_defaults().process_all(input.lines);

    // 논리 라인은 입력 범위 안의 라인 번호만 가리킨다
    for line in &logical {
        assert!(line.lines.iter().all(|n| (1..=count).contains(n)));
    }
});
