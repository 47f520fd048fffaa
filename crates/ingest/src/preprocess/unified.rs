//! unified 일시 정지 병합
//!
//! `gc,start` 태그의 `Pause ...` 라인에서 레코드를 시작해 같은 GC id의
//! 세대 요약, `Other:`, 요약 라인, `gc,cpu` 라인까지 한 줄로 모읍니다.
//! 병합된 라인은 요약 라인의 데코레이터(종료 시각)를 가집니다.
//!
//! ```text
//! [0.112s][info][gc,start     ] GC(3) Pause Young (Allocation Failure)
//! [0.112s][info][gc,heap      ] GC(3) DefNew: 1016K->128K(1152K)
//! [0.112s][info][gc           ] GC(3) Pause Young (Allocation Failure) 1M->1M(2M) 0.700ms
//! [0.112s][info][gc,cpu       ] GC(3) User=0.00s Sys=0.00s Real=0.00s
//! ```
//! 위 네 라인은 아래 한 줄이 됩니다.
//! ```text
//! [0.112s][info][gc           ] GC(3) Pause Young (Allocation Failure) DefNew: 1016K->128K(1152K) 1M->1M(2M) 0.700ms User=0.00s Sys=0.00s Real=0.00s
//! ```

use tracing::trace;

use super::{ContextToken, LineWindow, PreprocessAction, Reassembly};
use crate::decorator::{self, Decorator};

/// 요약에 남기는 세대 라인 접두사
const GENERATIONS: &[&str] = &[
    "DefNew:",
    "Tenured:",
    "PSYoungGen:",
    "ParOldGen:",
    "PSOldGen:",
    "ParNew:",
    "CMS:",
    "Metaspace:",
    "Humongous regions:",
];

/// JDK 17 세대 라인의 세부 분해 (버림)
const GENERATION_DETAIL: &[&str] = &[" Eden:", " NonClass:"];

/// unified 병합 규칙
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedAction;

fn unified_split(line: &str) -> Option<(Decorator, &str)> {
    decorator::split(line).filter(|(dec, _)| dec.is_unified() && dec.gc_id.is_some())
}

fn starts_pause(dec: &Decorator, message: &str) -> bool {
    dec.has_tag("start") && message.starts_with("Pause ")
}

impl PreprocessAction for UnifiedAction {
    fn name(&self) -> &'static str {
        "unified"
    }

    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool {
        let Some((dec, message)) = unified_split(window.current) else {
            return false;
        };
        starts_pause(&dec, message)
            || state
                .unified_gc_id()
                .is_some_and(|id| dec.gc_id == Some(id))
    }

    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly) {
        let Some((dec, message)) = unified_split(window.current) else {
            return;
        };
        let Some(gc_id) = dec.gc_id else {
            return;
        };

        if starts_pause(&dec, message) {
            state.begin(window.current.trim_end(), number);
            state.enter(ContextToken::Unified(gc_id));
            state.set_anchor(message.trim_end());
            return;
        }

        if dec.has_tag("cpu") {
            state.append(&format!(" {}", message.trim()), number);
            state.finish();
            return;
        }

        // 요약 라인: 시작 메시지 뒤의 점유량/시간을 붙이고 데코레이터를 바꿈
        let summary_tail = state
            .anchor()
            .filter(|start| !start.is_empty())
            .and_then(|start| message.strip_prefix(start))
            .map(|tail| tail.trim_end().to_owned());
        if let Some(tail) = summary_tail {
            state.append(&tail, number);
            let summary_decorator = &window.current[..dec.len];
            state.rewrite(|text| match decorator::resolve(text) {
                Some(start) => format!("{summary_decorator}{}", &text[start.len..]),
                None => text.to_owned(),
            });
            let cpu_follows = window
                .next
                .and_then(unified_split)
                .is_some_and(|(next, _)| next.gc_id == Some(gc_id) && next.has_tag("cpu"));
            if !cpu_follows {
                state.finish();
            }
            return;
        }

        let detail = message.trim();
        let indent = message.len() - message.trim_start().len();
        if detail.starts_with("Other:") && indent <= 2 {
            state.append(&format!(" {detail}"), number);
            return;
        }
        if indent == 0 && GENERATIONS.iter().any(|g| detail.starts_with(g)) {
            let cut = GENERATION_DETAIL
                .iter()
                .filter_map(|marker| detail.find(marker))
                .min()
                .unwrap_or(detail.len());
            state.append(&format!(" {}", &detail[..cut]), number);
            return;
        }

        trace!(line = number, gc_id, "absorbing unified detail line");
        state.absorb(number);
    }
}
