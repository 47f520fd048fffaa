//! 클래식 parallel 레코드 결합
//!
//! `[GC`/`[Full GC` 머리만 찍힌 라인 뒤에 `[PSYoungGen: ...]`이 다음 라인으로
//! 이어지는 경우를 합칩니다. GC 오버헤드 한계 경고가 레코드 중간에 끼면
//! 경고를 떼어 레코드가 완성된 뒤에 내보냅니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LineWindow, PreprocessAction, Reassembly, append_and_maybe_finish, compile, is_match};
use crate::pattern;

static BARE_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[(?:Full GC|GC)(?: {trigger})?(?: ?--)?\s*$",
        dec = pattern::classic_decorator(),
        trigger = r"\([^()]+(?:\(\))?\)",
    ))
});

static YOUNG_GEN: Lazy<Option<Regex>> = Lazy::new(|| compile(r"^\s*\[PSYoungGen: "));

static OVERHEAD_CLAUSE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(r"^(?P<head>.*?)\s*(?P<clause>GC time (?:would exceed|is exceeding) GCTimeLimit of \d{1,3}%)\s*$")
});

/// 오버헤드 경고를 `(앞부분, 경고)`로 나눕니다.
fn split_overhead(line: &str) -> Option<(&str, &str)> {
    let caps = OVERHEAD_CLAUSE.as_ref()?.captures(line)?;
    Some((caps.name("head")?.as_str(), caps.name("clause")?.as_str()))
}

fn in_parallel_record(state: &Reassembly) -> bool {
    state
        .fragment_text()
        .is_some_and(|text| text.contains("[PSYoungGen: ") || is_match(&BARE_HEAD, text))
}

/// parallel 결합 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelAction;

impl PreprocessAction for ParallelAction {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        let line = window.current;
        if is_match(&BARE_HEAD, line) {
            return window.next.is_some_and(|next| is_match(&YOUNG_GEN, next));
        }
        if let Some((head, _)) = split_overhead(line) {
            return head.contains("[PSYoungGen: ") || in_parallel_record(state);
        }
        in_parallel_record(state) && (is_match(&YOUNG_GEN, line) || line.starts_with(", "))
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        let line = window.current;

        if is_match(&BARE_HEAD, line) {
            state.begin(line.trim_end(), number);
            return;
        }

        let (text, clause) = match split_overhead(line) {
            Some((head, clause)) => (head, Some(clause)),
            None => (line, None),
        };

        if text.trim().is_empty() {
            // 경고만 있는 라인
        } else if state.has_fragment() && is_match(&YOUNG_GEN, text) {
            append_and_maybe_finish(window, &format!(" {}", text.trim()), number, state);
        } else if state.has_fragment() && text.starts_with(", ") {
            append_and_maybe_finish(window, text.trim_end(), number, state);
        } else {
            state.begin(text.trim_end(), number);
        }

        if let Some(clause) = clause {
            state.entangle(clause, number);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocess::Preprocessor;

    #[test]
    fn bare_head_joins_young_generation() {
        let lines = Preprocessor::with_defaults().process_all([
            "3.600: [GC (Allocation Failure)",
            " [PSYoungGen: 33280K->5104K(38400K)] 33280K->5120K(125952K), 0.0071411 secs] [Times: user=0.02 sys=0.00, real=0.01 secs]",
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].text,
            "3.600: [GC (Allocation Failure) [PSYoungGen: 33280K->5104K(38400K)] 33280K->5120K(125952K), 0.0071411 secs] [Times: user=0.02 sys=0.00, real=0.01 secs]"
        );
    }

    #[test]
    fn overhead_clause_is_split_out() {
        let lines = Preprocessor::with_defaults().process_all([
            "1029482.070: [Full GC (Ergonomics) [PSYoungGen: 64K->0K(132096K)] [ParOldGen: 1047961K->1047960K(1048064K)] 1048025K->1047960K(1180160K)      GC time would exceed GCTimeLimit of 98%",
            ", [Metaspace: 97152K->97152K(1136640K)], 1.7290111 secs] [Times: user=6.42 sys=0.01, real=1.73 secs]",
        ]);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "1029482.070: [Full GC (Ergonomics) [PSYoungGen: 64K->0K(132096K)] [ParOldGen: 1047961K->1047960K(1048064K)] 1048025K->1047960K(1180160K), [Metaspace: 97152K->97152K(1136640K)], 1.7290111 secs] [Times: user=6.42 sys=0.01, real=1.73 secs]",
                "GC time would exceed GCTimeLimit of 98%",
            ]
        );
        assert_eq!(lines[0].lines, vec![1, 2]);
    }

    #[test]
    fn bare_head_without_young_generation_is_left_alone() {
        let lines = Preprocessor::with_defaults().process_all(["3.600: [GC (Allocation Failure)"]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].incomplete);
    }
}
