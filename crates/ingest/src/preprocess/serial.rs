//! 클래식 serial 레코드 결합
//!
//! `[GC ... [DefNew` 에서 끊긴 머리와 `: ...` 로 시작하는 뒷부분을 합칩니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LineWindow, PreprocessAction, Reassembly, append_and_maybe_finish, compile, is_match};
use crate::pattern;

static DEF_NEW_HEAD: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^{dec} \[GC(?: \([^()]+(?:\(\))?\))? ?{inner}\[DefNew\s*$",
        dec = pattern::classic_decorator(),
        inner = pattern::inner_decorator(),
    ))
});

/// serial 결합 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialAction;

impl PreprocessAction for SerialAction {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        is_match(&DEF_NEW_HEAD, window.current)
            || (window.current.starts_with(": ")
                && state.fragment_text().is_some_and(|t| t.ends_with("[DefNew")))
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        if is_match(&DEF_NEW_HEAD, window.current) {
            state.begin(window.current.trim_end(), number);
        } else {
            append_and_maybe_finish(window, window.current.trim_end(), number, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocess::Preprocessor;

    #[test]
    fn def_new_split_by_tenuring_is_joined() {
        let lines = Preprocessor::with_defaults().process_all([
            "10.204: [GC 10.204: [DefNew",
            "Desired survivor size 2228224 bytes, new threshold 1 (max 15)",
            "- age   1:    3363904 bytes,    3363904 total",
            ": 36825K->4352K(39424K), 0.0224830 secs] 44983K->14441K(126848K), 0.0225800 secs]",
        ]);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0].text,
            "10.204: [GC 10.204: [DefNew: 36825K->4352K(39424K), 0.0224830 secs] 44983K->14441K(126848K), 0.0225800 secs]"
        );
        assert_eq!(lines[0].lines, vec![1, 4]);
        assert!(lines[1].text.starts_with("Desired survivor size"));
    }
}
