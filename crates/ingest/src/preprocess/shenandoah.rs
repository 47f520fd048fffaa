//! Shenandoah 진단 라인 제거
//!
//! 수집 세트 선택, 페이서, 여유 공간 보고처럼 이벤트가 아닌 진단 라인을
//! 버립니다. 데코레이터가 붙어 있어도 메시지 모양으로 판정합니다.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LineWindow, PreprocessAction, Reassembly, compile, is_match};
use crate::pattern;

static DIAGNOSTIC: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^(?:(?:{classic}|{unified}) )?(?:Adaptive CSet Selection|Collectable Garbage: |Immediate Garbage: |Using \d+ of \d+ workers for |Pacer |Free: |Good progress for |Failed to allocate |Evacuation Reserve: |Free headroom: |Concurrent marking triggered|Adjusting free threshold|Degenerated GC upgrading)",
        classic = pattern::classic_decorator(),
        unified = pattern::unified_decorator(),
    ))
});

/// Shenandoah 진단 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct ShenandoahAction;

impl PreprocessAction for ShenandoahAction {
    fn name(&self) -> &'static str {
        "shenandoah"
    }

    fn matches(&self, window: &LineWindow<'_>, _state: &Reassembly) -> bool {
        is_match(&DIAGNOSTIC, window.current)
    }

    fn apply(&self, _window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        state.absorb(number);
    }
}
