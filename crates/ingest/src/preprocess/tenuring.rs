//! `-XX:+PrintTenuringDistribution` 분리
//!
//! 세대별 수집 레코드 한가운데 찍히는 생존 나이 분포를 레코드에서 떼어
//! 레코드가 완성된 뒤에 내보냅니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LineWindow, PreprocessAction, Reassembly, compile, is_match};

static DISTRIBUTION: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"^(?:Desired survivor size \d+ bytes, new threshold \d+ \(max(?: threshold)? \d+\)|- age +\d+: +\d+ bytes, +\d+ total)\s*$",
    )
});

/// tenuring 분포 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct TenuringAction;

impl PreprocessAction for TenuringAction {
    fn name(&self) -> &'static str {
        "tenuring"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        state.has_fragment() && is_match(&DISTRIBUTION, window.current)
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        state.entangle(window.current.trim_end(), number);
    }
}
