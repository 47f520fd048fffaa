//! `-XX:+PrintHeapAtGC` 블록 제거
//!
//! `{Heap before GC invocations=N (full M):`, `Heap after GC invocations=N:`
//! 헤더와 그 아래의 영역 설명 라인, 닫는 `}`는 버립니다. 헤더가 GC 라인 끝에
//! 붙어 있으면 앞부분만 남겨 레코드를 이어 가고, 블록이 끝난 뒤 오는
//! 라인으로 레코드를 마저 채웁니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    ContextToken, LineWindow, PreprocessAction, Reassembly, append_and_maybe_finish, compile,
    ends_record, is_match,
};

const HEADER: &str =
    r"(?:\{Heap before|Heap after) (?:GC|gc) invocations=\d+(?: \(full \d+\))?:";

static BLOCK_START: Lazy<Option<Regex>> = Lazy::new(|| compile(&format!(r"^{HEADER}\s*$")));

static BLOCK_END: Lazy<Option<Regex>> = Lazy::new(|| compile(r"^\}\s*$"));

static TRAILING_HEADER: Lazy<Option<Regex>> =
    Lazy::new(|| compile(&format!(r"^(?P<head>.+?){HEADER}\s*$")));

static HEAP_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"^\s+(?:par new generation|def new generation|tenured generation|concurrent mark-sweep generation|concurrent-mark-sweep perm gen|compacting perm gen|PSYoungGen|ParOldGen|PSOldGen|PSPermGen|eden space|from space|to space|object space|the space|ro space|rw space|Metaspace|class space|garbage-first heap|region size|No shared spaces)",
    )
});

/// 힙 블록 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAtGcAction;

impl PreprocessAction for HeapAtGcAction {
    fn name(&self) -> &'static str {
        "heap_at_gc"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        let line = window.current;
        if state.in_context(ContextToken::HeapBlock)
            && (is_match(&HEAP_LINE, line) || is_match(&BLOCK_END, line))
        {
            return true;
        }
        is_match(&BLOCK_START, line)
            || is_match(&TRAILING_HEADER, line)
            || (state.in_context(ContextToken::HeapTail) && state.has_fragment())
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        let line = window.current;

        if is_match(&BLOCK_START, line) {
            state.absorb(number);
            state.enter(ContextToken::HeapBlock);
            return;
        }

        if state.in_context(ContextToken::HeapBlock) {
            if is_match(&BLOCK_END, line) {
                state.absorb(number);
                state.leave(ContextToken::HeapBlock);
                return;
            }
            if is_match(&HEAP_LINE, line) {
                state.absorb(number);
                return;
            }
        }

        let head = TRAILING_HEADER
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.name("head"))
            .map(|m| m.as_str());
        if let Some(head) = head {
            state.append(head, number);
            if ends_record(head) {
                state.finish();
            } else {
                state.enter(ContextToken::HeapTail);
            }
            state.enter(ContextToken::HeapBlock);
            return;
        }

        // 블록 뒤에 오는 레코드의 나머지
        state.leave(ContextToken::HeapTail);
        append_and_maybe_finish(window, line, number, state);
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocess::Preprocessor;

    #[test]
    fn blocks_around_a_gc_line_are_discarded() {
        let lines = Preprocessor::with_defaults().process_all([
            "{Heap before GC invocations=1 (full 0):",
            " PSYoungGen      total 75264K, used 64512K [0x000000076c400000, 0x0000000771700000, 0x00000007c0000000)",
            "  eden space 64512K, 100% used [0x000000076c400000,0x0000000770300000,0x0000000770300000)",
            "0.844: [GC (Allocation Failure) [PSYoungGen: 64512K->10748K(75264K)] 64512K->10756K(247808K), 0.0133148 secs] [Times: user=0.04 sys=0.01, real=0.01 secs]",
            "Heap after GC invocations=1 (full 0):",
            " PSYoungGen      total 75264K, used 10748K [0x000000076c400000, 0x0000000771700000, 0x00000007c0000000)",
            " Metaspace       used 2912K, capacity 4486K, committed 4864K, reserved 1056768K",
            "}",
        ]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.starts_with("0.844: [GC (Allocation Failure) [PSYoungGen"));
        assert_eq!(lines[0].lines, vec![4]);
    }

    #[test]
    fn block_inside_a_record_is_removed_and_record_joined() {
        let lines = Preprocessor::with_defaults().process_all([
            "28282.075: [Full GC {Heap before gc invocations=528 (full 3):",
            " par new generation   total 1382400K, used 1382400K [0x00000006c0000000, 0x0000000720000000, 0x0000000720000000)",
            "}",
            "28282.075: [CMS: 3863904K->2638604K(5570560K), 10.2525220 secs] 5246304K->2638604K(6952960K), [CMS Perm : 205014K->203927K(342200K)], 10.2528030 secs] [Times: user=10.18 sys=0.02, real=10.25 secs]",
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].text,
            "28282.075: [Full GC 28282.075: [CMS: 3863904K->2638604K(5570560K), 10.2525220 secs] 5246304K->2638604K(6952960K), [CMS Perm : 205014K->203927K(342200K)], 10.2528030 secs] [Times: user=10.18 sys=0.02, real=10.25 secs]"
        );
        assert!(!lines[0].incomplete);
        assert_eq!(lines[0].lines, vec![1, 2, 3, 4]);
    }
}
