//! 클래식 G1 상세 블록 병합
//!
//! `-XX:+PrintGCDetails`의 G1 출력은 첫 라인 뒤에 들여쓴 단계별 시간을
//! 길게 나열합니다. 첫 라인에 `[Eden: ...]` 요약과 `[Times: ...]`만
//! 붙이고 나머지 들여쓴 라인은 버립니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ContextToken, LineWindow, PreprocessAction, Reassembly, compile, is_match};
use crate::pattern::{self, SECONDS, SIZE};

static PAUSE_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[GC pause(?: \([^()]+(?:\(\))?\))? \((?:young|mixed)\)(?: \(initial-mark\))?(?: \(to-space (?:exhausted|overflow)\))?, {SECONDS} secs\]\s*$",
        dec = pattern::classic_decorator(),
    ))
});

static FULL_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[Full GC(?: \([^()]+(?:\(\))?\))? +{SIZE}->{SIZE}\({SIZE}\), {SECONDS} secs\]\s*$",
        dec = pattern::classic_decorator(),
    ))
});

fn indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// G1 상세 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct G1Action;

impl PreprocessAction for G1Action {
    fn name(&self) -> &'static str {
        "g1"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        let line = window.current;
        is_match(&PAUSE_HEAD, line)
            || is_match(&FULL_HEAD, line)
            || (state.in_context(ContextToken::G1Detail) && indented(line))
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        let line = window.current;

        if is_match(&PAUSE_HEAD, line) || is_match(&FULL_HEAD, line) {
            state.begin(line.trim_end(), number);
            state.enter(ContextToken::G1Detail);
        } else {
            let detail = line.trim();
            if detail.starts_with("[Eden:") {
                state.append(detail, number);
            } else if detail.starts_with("[Times:") {
                state.append(&format!(" {detail}"), number);
                state.finish();
                return;
            } else {
                state.absorb(number);
            }
        }

        if !window.next.is_some_and(indented) {
            state.finish();
        }
    }
}
