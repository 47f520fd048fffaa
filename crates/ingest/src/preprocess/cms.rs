//! 클래식 CMS 레코드 결합
//!
//! CMS는 백그라운드 스레드의 `[CMS-concurrent-...]` 라인이 ParNew/CMS 레코드
//! 한가운데 같은 물리 라인에 섞여 찍힙니다. 이 규칙은
//!
//! 1. 잡음 문구(`CMS: abort preclean due to time`, `bailing out to foreground
//!    collection`, `CMS: Large block`, `Before GC:`)를 지우고
//! 2. 라인 끝에 붙은 concurrent 꼬리를 떼어 따로 내보내고
//! 3. 남은 머리를 다음 라인의 뒷부분(` (concurrent mode failure): ...` 등)과
//!    합칩니다.
//!
//! FLS 통계 블록(`Statistics for BinaryTreeDictionary:` ...)은 버립니다.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{
    LineWindow, PreprocessAction, Reassembly, append_and_maybe_finish, compile, continues_record,
    is_match,
};
use crate::pattern::{self, DATESTAMP, SECONDS, TIMES_BLOCK, TIMESTAMP};

static NOISE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r" ?CMS: abort preclean due to time ?|(?:Java HotSpot\(TM\) (?:64-Bit )?Server VM warning: )?bailing out to foreground collection|CMS: Large block 0x[0-9a-f]+|(?:Before|After) GC:\s*$",
    )
});

static FLS_STATISTICS: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"^(?:Statistics for BinaryTreeDictionary:|-{10,}|Total Free Space: -?\d+|Max\s+Chunk Size: -?\d+|Number of Blocks: \d+|Av\.\s+Block\s+Size: \d+|Tree\s+Height: \d+)\s*$",
    )
});

static CONCURRENT_TAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^(?P<head>.*?)(?P<tail>(?:{DATESTAMP}: )?{TIMESTAMP}: \[CMS-concurrent-[a-z-]+(?:: {SECONDS}/{SECONDS} secs)?\](?:{TIMES_BLOCK})?)\s*$"
    ))
});

static GC_START: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"(?:{DATESTAMP}: )?{TIMESTAMP}: \[GC\b"
    ))
});

/// 마지막 `[GC` 머리 앞에 남은 미완의 머리들 (`831626.089: [ParNew831628.158: [ParNew`)
static DANGLING_HEADS: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^(?:(?:{DATESTAMP}: )?{TIMESTAMP}: \[(?:GC(?: \([^()]+(?:\(\))?\))?|ParNew|CMS) ?)+$"
    ))
});

static RECORD_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[(?:GC|Full GC|ParNew|CMS)",
        dec = pattern::classic_decorator()
    ))
});

/// 세대 머리가 붙을 수 있는 레코드 앞부분 (`[GC`, `[GC (Allocation Failure) `)
static OPEN_GC: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"\[(?:Full )?GC(?: \([^()]+(?:\(\))?\))? ?$"));

static GENERATION_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[(?:ParNew|CMS)",
        dec = pattern::classic_decorator()
    ))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// 버림
    Absorb,
    /// 진행 중인 레코드에 이어 붙임
    Join,
    /// 새 레코드 시작
    Begin,
    /// 정리된 텍스트를 그대로 내보냄
    Emit,
}

#[derive(Debug)]
struct Plan<'a> {
    step: Step,
    text: Cow<'a, str>,
    tail: Option<String>,
}

fn strip_noise(line: &str) -> Cow<'_, str> {
    match NOISE.as_ref() {
        Some(re) => re.replace_all(line, ""),
        None => Cow::Borrowed(line),
    }
}

/// 라인 끝에 붙은 concurrent 꼬리를 `(머리, 꼬리)`로 나눕니다. 머리가 비면 나누지 않습니다.
fn split_concurrent_tail(text: &str) -> Option<(String, String)> {
    let caps = CONCURRENT_TAIL.as_ref()?.captures(text)?;
    let head = caps.name("head")?.as_str();
    if head.trim().is_empty() {
        return None;
    }
    Some((head.to_owned(), caps.name("tail")?.as_str().to_owned()))
}

/// 반복된 레코드 머리 중 마지막 `[GC` 머리부터 남깁니다.
///
/// 그 앞부분이 미완의 `[GC`/`[ParNew`/`[CMS` 머리로만 이루어진 경우에만 자릅니다.
fn last_gc_start(text: &str) -> &str {
    let Some(re) = GC_START.as_ref() else {
        return text;
    };
    let Some(last) = re.find_iter(text).map(|m| m.start()).last() else {
        return text;
    };
    if last > 0 && is_match(&DANGLING_HEADS, &text[..last]) {
        debug!(dropped = last, "dropping repeated record head");
        &text[last..]
    } else {
        text
    }
}

fn plan<'a>(window: &LineWindow<'a>, state: &Reassembly) -> Option<Plan<'a>> {
    let line = window.current;

    if is_match(&FLS_STATISTICS, line) {
        return Some(Plan {
            step: Step::Absorb,
            text: Cow::Borrowed(line),
            tail: None,
        });
    }

    let cleaned = strip_noise(line);
    let noisy = matches!(cleaned, Cow::Owned(_));
    if noisy && cleaned.trim().is_empty() {
        return Some(Plan {
            step: Step::Absorb,
            text: cleaned,
            tail: None,
        });
    }

    let (text, tail) = match split_concurrent_tail(&cleaned) {
        Some((head, tail)) => (Cow::Owned(head), Some(tail)),
        None => (cleaned, None),
    };
    let keep_from = text.len() - last_gc_start(&text).len();
    let text = if keep_from > 0 {
        Cow::Owned(text[keep_from..].to_owned())
    } else {
        text
    };

    let joinable = state.fragment_text().is_some_and(|fragment| {
        continues_record(&text)
            || (is_match(&OPEN_GC, fragment) && is_match(&GENERATION_HEAD, &text))
    });

    let step = if joinable {
        Step::Join
    } else if is_match(&RECORD_HEAD, &text) && !text.trim_end().ends_with(']') {
        Step::Begin
    } else if noisy || tail.is_some() || keep_from > 0 {
        Step::Emit
    } else {
        return None;
    };

    Some(Plan { step, text, tail })
}

/// CMS 결합 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct CmsAction;

impl PreprocessAction for CmsAction {
    fn name(&self) -> &'static str {
        "cms"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        plan(window, state).is_some()
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        let Some(Plan { step, text, tail }) = plan(window, state) else {
            return;
        };

        match step {
            Step::Absorb => state.absorb(number),
            Step::Join => append_and_maybe_finish(window, text.trim_end(), number, state),
            Step::Begin => state.begin(text.into_owned(), number),
            Step::Emit => state.emit(text.trim_end(), number),
        }

        if let Some(tail) = tail {
            state.entangle(tail, number);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocess::Preprocessor;

    fn texts(lines: &[crate::preprocess::LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn concurrent_mode_failure_is_joined_and_concurrent_tail_split() {
        let lines = Preprocessor::with_defaults().process_all([
            "46674.719: [GC (Allocation Failure)46674.719: [ParNew46674.749: [CMS-concurrent-abortable-preclean: 1.427/2.228 secs] [Times: user=2.49 sys=0.20, real=2.23 secs]",
            " (concurrent mode failure): 2542828K->2658278K(2658304K), 12.3447910 secs] 3076095K->2658278K(3037056K), [Metaspace: 72111K->72111K(1118208K)], 12.3480570 secs] [Times: user=12.24 sys=0.08, real=12.35 secs]",
        ]);
        assert_eq!(
            texts(&lines),
            [
                "46674.719: [GC (Allocation Failure)46674.719: [ParNew (concurrent mode failure): 2542828K->2658278K(2658304K), 12.3447910 secs] 3076095K->2658278K(3037056K), [Metaspace: 72111K->72111K(1118208K)], 12.3480570 secs] [Times: user=12.24 sys=0.08, real=12.35 secs]",
                "46674.749: [CMS-concurrent-abortable-preclean: 1.427/2.228 secs] [Times: user=2.49 sys=0.20, real=2.23 secs]",
            ]
        );
        assert!(lines.iter().all(|l| !l.incomplete));
        assert_eq!(lines[0].lines, vec![1, 2]);
        assert_eq!(lines[1].lines, vec![1]);
    }

    #[test]
    fn full_gc_head_keeps_cms_prefix() {
        let lines = Preprocessor::with_defaults().process_all([
            "23.859: [Full GC 23.859: [CMS23.861: [CMS-concurrent-mark: 0.051/0.052 secs] [Times: user=0.10 sys=0.00, real=0.05 secs]",
            " (concurrent mode failure): 1047999K->1047999K(1048000K), 3.3145190 secs] 1087103K->1087102K(1100160K), [CMS Perm : 21097K->21097K(35140K)], 3.3146650 secs] [Times: user=3.26 sys=0.01, real=3.31 secs]",
        ]);
        assert_eq!(lines.len(), 2);
        assert!(
            lines[0]
                .text
                .starts_with("23.859: [Full GC 23.859: [CMS (concurrent mode failure): 1047999K")
        );
        assert!(lines[1].text.starts_with("23.861: [CMS-concurrent-mark"));
    }

    #[test]
    fn bare_gc_head_joins_par_new() {
        let lines = Preprocessor::with_defaults().process_all([
            "1.118: [GC ",
            "1.118: [ParNew: 16128K->1984K(18176K), 0.0276620 secs] 16128K->3717K(260160K), 0.0277450 secs] [Times: user=0.04 sys=0.01, real=0.03 secs]",
        ]);
        assert_eq!(
            texts(&lines),
            ["1.118: [GC 1.118: [ParNew: 16128K->1984K(18176K), 0.0276620 secs] 16128K->3717K(260160K), 0.0277450 secs] [Times: user=0.04 sys=0.01, real=0.03 secs]"]
        );
    }

    #[test]
    fn dangling_par_new_heads_are_dropped() {
        let lines = Preprocessor::with_defaults().process_all([
            "831626.089: [ParNew831628.158: [ParNew833918.729: [GC (Allocation Failure) 833918.729: [ParNew: 1887488K->209664K(1887488K), 0.2354990 secs] 4068302K->2546063K(6081792K), 0.2357590 secs] [Times: user=1.71 sys=0.01, real=0.24 secs]",
        ]);
        assert_eq!(
            texts(&lines),
            ["833918.729: [GC (Allocation Failure) 833918.729: [ParNew: 1887488K->209664K(1887488K), 0.2354990 secs] 4068302K->2546063K(6081792K), 0.2357590 secs] [Times: user=1.71 sys=0.01, real=0.24 secs]"]
        );
        assert_eq!(
            crate::classifier::classify(&lines[0].text, &Default::default()),
            gclog_core::event::LogEventType::ParNew
        );
    }

    #[test]
    fn repeated_gc_heads_keep_the_last() {
        let lines = Preprocessor::with_defaults().process_all([
            "1.118: [GC 1.118: [GC (Allocation Failure) 1.118: [ParNew: 16128K->1984K(18176K), 0.0276620 secs] 16128K->3717K(260160K), 0.0277450 secs] [Times: user=0.04 sys=0.01, real=0.03 secs]",
        ]);
        assert_eq!(
            texts(&lines),
            ["1.118: [GC (Allocation Failure) 1.118: [ParNew: 16128K->1984K(18176K), 0.0276620 secs] 16128K->3717K(260160K), 0.0277450 secs] [Times: user=0.04 sys=0.01, real=0.03 secs]"]
        );
    }

    #[test]
    fn abort_preclean_noise_is_removed() {
        let lines = Preprocessor::with_defaults().process_all([
            " CMS: abort preclean due to time 2.022: [CMS-concurrent-abortable-preclean: 0.130/5.012 secs] [Times: user=0.14 sys=0.00, real=5.01 secs]",
        ]);
        assert_eq!(
            texts(&lines),
            ["2.022: [CMS-concurrent-abortable-preclean: 0.130/5.012 secs] [Times: user=0.14 sys=0.00, real=5.01 secs]"]
        );
    }

    #[test]
    fn fls_statistics_are_dropped() {
        let lines = Preprocessor::with_defaults().process_all([
            "Statistics for BinaryTreeDictionary:",
            "------------------------------------",
            "Total Free Space: 0",
            "Max   Chunk Size: 0",
            "Number of Blocks: 0",
            "Tree      Height: 0",
            "1.0: [CMS-concurrent-mark-start]",
        ]);
        assert_eq!(texts(&lines), ["1.0: [CMS-concurrent-mark-start]"]);
    }

    #[test]
    fn unrelated_lines_are_not_claimed() {
        let lines = Preprocessor::with_defaults().process_all([
            "2.300: [GC concurrent-root-region-scan-start]",
            "The quick brown fox",
        ]);
        assert_eq!(
            texts(&lines),
            ["2.300: [GC concurrent-root-region-scan-start]", "The quick brown fox"]
        );
    }
}
