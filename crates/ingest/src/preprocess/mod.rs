//! 재조립 전처리 -- 물리 라인을 논리 라인으로 바꿉니다.
//!
//! JVM은 동시에 실행되는 스레드의 출력이 한 이벤트의 중간에 끼어들거나,
//! 한 이벤트를 여러 라인에 나눠 기록합니다. [`Preprocessor`]는 직전/현재/다음
//! 라인 창([`LineWindow`])과 재조립 상태([`Reassembly`])를 보고 각 라인을
//! 이어 붙이거나, 따로 떼어 내보내거나, 버립니다.
//!
//! # 규칙 계열
//! 등록 순서대로 시도하며 첫 번째로 라인을 가져간 규칙이 처리합니다.
//! 어떤 규칙도 가져가지 않은 라인은 그대로 하나의 논리 라인이 됩니다.
//!
//! - [`HeapAtGcAction`]: `{Heap before GC ...}` 블록 제거
//! - [`ShenandoahAction`]: Shenandoah 진단 라인 제거
//! - [`UnifiedAction`]: `gc,start`부터 `gc,cpu`까지 한 줄로 병합
//! - [`G1Action`]: 클래식 G1 상세 블록을 한 줄로 병합
//! - [`TenuringAction`]: 진행 중인 레코드 사이의 tenuring 분포 분리
//! - [`ParallelAction`], [`SerialAction`], [`CmsAction`]: 클래식 세대별 레코드 결합
//!
//! # 순서 보장
//! 논리 라인은 첫 물리 라인의 순서로 나옵니다. 단, 진행 중인 레코드에 끼어든
//! 라인은 그 레코드가 완성된 직후에 나옵니다.

mod cms;
mod g1;
mod heap_at_gc;
mod parallel;
mod serial;
mod shenandoah;
mod tenuring;
mod unified;

pub use cms::CmsAction;
pub use g1::G1Action;
pub use heap_at_gc::HeapAtGcAction;
pub use parallel::ParallelAction;
pub use serial::SerialAction;
pub use shenandoah::ShenandoahAction;
pub use tenuring::TenuringAction;
pub use unified::UnifiedAction;

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::pattern;

/// 끼어든 라인을 최대 몇 개까지 보류할지
pub const MAX_ENTANGLED: usize = 512;

/// 원본 물리 라인
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    /// 1부터 시작하는 라인 번호
    pub number: usize,
}

impl RawLine {
    pub fn new(text: impl Into<String>, number: usize) -> Self {
        Self {
            text: text.into(),
            number,
        }
    }
}

/// 재조립된 논리 라인
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalLine {
    pub text: String,
    /// 기여한 물리 라인 번호
    pub lines: Vec<usize>,
    /// 다음 레코드가 시작되거나 스트림이 끝나 완성되지 못한 레코드
    pub incomplete: bool,
}

impl LogicalLine {
    fn single(text: impl Into<String>, number: usize) -> Self {
        Self {
            text: text.into(),
            lines: vec![number],
            incomplete: false,
        }
    }

    /// 첫 물리 라인 번호
    pub fn first_line(&self) -> usize {
        self.lines.first().copied().unwrap_or(0)
    }
}

/// 직전/현재/다음 라인 창
#[derive(Debug, Clone, Copy)]
pub struct LineWindow<'a> {
    pub prior: Option<&'a str>,
    pub current: &'a str,
    pub next: Option<&'a str>,
}

/// 규칙이 재조립 상태에 남기는 문맥 표식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextToken {
    /// `{Heap before GC` 블록 내부
    HeapBlock,
    /// 힙 블록이 중간에 끼어든 레코드의 뒷부분을 기다리는 중
    HeapTail,
    /// 클래식 G1 상세 블록 내부
    G1Detail,
    /// unified `gc,start` 이후 같은 GC id의 라인을 모으는 중
    Unified(u64),
}

#[derive(Debug)]
struct Fragment {
    text: String,
    lines: Vec<usize>,
}

/// 재조립 상태
///
/// 완성 중인 레코드(fragment) 하나, 그 사이에 끼어든 라인, 내보낼 준비가 된
/// 논리 라인, 규칙 문맥 표식으로 구성됩니다.
#[derive(Debug, Default)]
pub struct Reassembly {
    fragment: Option<Fragment>,
    entangled: Vec<LogicalLine>,
    ready: VecDeque<LogicalLine>,
    context: Vec<ContextToken>,
    /// 레코드를 연 라인의 메시지 (문맥과 함께 지워짐)
    anchor: Option<String>,
}

impl Reassembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fragment(&self) -> bool {
        self.fragment.is_some()
    }

    pub fn fragment_text(&self) -> Option<&str> {
        self.fragment.as_ref().map(|f| f.text.as_str())
    }

    /// 새 레코드를 시작합니다. 진행 중인 레코드는 미완성으로 내보냅니다.
    pub fn begin(&mut self, text: impl Into<String>, number: usize) {
        if self.fragment.is_some() {
            debug!(line = number, "record interrupted by a new record");
            self.flush_incomplete();
        }
        self.fragment = Some(Fragment {
            text: text.into(),
            lines: vec![number],
        });
    }

    /// 진행 중인 레코드에 텍스트를 이어 붙입니다. 없으면 새로 시작합니다.
    pub fn append(&mut self, text: &str, number: usize) {
        match &mut self.fragment {
            Some(fragment) => {
                fragment.text.push_str(text);
                fragment.lines.push(number);
            }
            None => self.begin(text, number),
        }
    }

    /// 진행 중인 레코드의 텍스트를 바꿉니다.
    pub fn rewrite(&mut self, f: impl FnOnce(&str) -> String) {
        if let Some(fragment) = &mut self.fragment {
            fragment.text = f(&fragment.text);
        }
    }

    /// 진행 중인 레코드를 완성하고, 보류한 라인을 뒤이어 내보냅니다.
    pub fn finish(&mut self) {
        if let Some(fragment) = self.fragment.take() {
            self.ready.push_back(LogicalLine {
                text: fragment.text,
                lines: fragment.lines,
                incomplete: false,
            });
        }
        self.release_entangled();
    }

    /// 라인 하나를 내보냅니다. 레코드가 진행 중이면 보류합니다.
    pub fn emit(&mut self, text: impl Into<String>, number: usize) {
        self.push(LogicalLine::single(text, number));
    }

    /// 레코드 중간에 끼어든 라인을 따로 내보냅니다.
    pub fn entangle(&mut self, text: impl Into<String>, number: usize) {
        self.emit(text, number);
    }

    /// 라인을 버립니다.
    pub fn absorb(&mut self, number: usize) {
        if let Some(fragment) = &mut self.fragment {
            fragment.lines.push(number);
        }
    }

    pub fn enter(&mut self, token: ContextToken) {
        if !self.context.contains(&token) {
            self.context.push(token);
        }
    }

    pub fn leave(&mut self, token: ContextToken) {
        self.context.retain(|t| *t != token);
    }

    pub fn in_context(&self, token: ContextToken) -> bool {
        self.context.contains(&token)
    }

    /// 레코드를 연 라인의 메시지를 기억합니다.
    pub fn set_anchor(&mut self, message: impl Into<String>) {
        self.anchor = Some(message.into());
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// unified 병합 중인 GC id
    pub fn unified_gc_id(&self) -> Option<u64> {
        self.context.iter().find_map(|t| match t {
            ContextToken::Unified(id) => Some(*id),
            _ => None,
        })
    }

    /// 내보낼 준비가 된 논리 라인을 가져갑니다.
    pub fn drain_ready(&mut self) -> impl Iterator<Item = LogicalLine> + '_ {
        self.ready.drain(..)
    }

    /// 스트림 끝: 진행 중인 레코드를 미완성으로 내보냅니다.
    pub fn close(&mut self) {
        if self.fragment.is_some() {
            self.flush_incomplete();
        } else {
            self.release_entangled();
        }
        self.context.clear();
        self.anchor = None;
    }

    fn push(&mut self, line: LogicalLine) {
        if self.fragment.is_none() {
            self.ready.push_back(line);
            return;
        }
        self.entangled.push(line);
        if self.entangled.len() >= MAX_ENTANGLED {
            warn!(
                held = self.entangled.len(),
                "too many lines held behind an open record, flushing it as incomplete"
            );
            self.flush_incomplete();
        }
    }

    fn flush_incomplete(&mut self) {
        if let Some(fragment) = self.fragment.take() {
            self.ready.push_back(LogicalLine {
                text: fragment.text,
                lines: fragment.lines,
                incomplete: true,
            });
        }
        self.release_entangled();
    }

    fn release_entangled(&mut self) {
        self.ready.extend(self.entangled.drain(..));
        self.context.retain(|t| *t == ContextToken::HeapBlock);
        self.anchor = None;
    }
}

/// 재조립 규칙
///
/// `matches`가 참을 반환한 첫 번째 규칙의 `apply`가 호출됩니다.
pub trait PreprocessAction: Send + Sync {
    /// 규칙 이름 (로그/진단용)
    fn name(&self) -> &'static str;

    /// 이 규칙이 현재 라인을 처리할지 판정합니다.
    fn matches(&self, window: &LineWindow<'_>, state: &Reassembly) -> bool;

    /// 현재 라인을 처리합니다.
    fn apply(&self, window: &LineWindow<'_>, number: usize, state: &mut Reassembly);
}

/// 논리 라인 재조립기
///
/// 한 라인을 미리 읽어 두고(lookahead) 다음 라인이 도착했을 때 현재 라인을
/// 처리합니다. [`finish`](Self::finish)로 남은 라인을 처리하고 상태를 닫습니다.
pub struct Preprocessor {
    actions: Vec<Box<dyn PreprocessAction>>,
    state: Reassembly,
    prior: Option<String>,
    pending: Option<RawLine>,
}

impl Preprocessor {
    /// 규칙이 없는 재조립기 (모든 라인이 그대로 통과)
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            state: Reassembly::new(),
            prior: None,
            pending: None,
        }
    }

    /// 기본 규칙 세트로 재조립기를 생성합니다.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Box::new(HeapAtGcAction))
            .register(Box::new(ShenandoahAction))
            .register(Box::new(UnifiedAction))
            .register(Box::new(G1Action))
            .register(Box::new(TenuringAction))
            .register(Box::new(ParallelAction))
            .register(Box::new(SerialAction))
            .register(Box::new(CmsAction))
    }

    /// 규칙을 등록합니다. 등록 순서대로 시도됩니다.
    pub fn register(mut self, action: Box<dyn PreprocessAction>) -> Self {
        self.actions.push(action);
        self
    }

    /// 등록된 규칙 이름 목록
    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// 물리 라인 하나를 넣고 완성된 논리 라인을 받습니다.
    pub fn push(&mut self, line: RawLine) -> Vec<LogicalLine> {
        if let Some(current) = self.pending.take() {
            self.step(current, Some(&line.text));
        }
        self.pending = Some(line);
        self.state.drain_ready().collect()
    }

    /// 남은 라인을 처리하고 상태를 닫습니다.
    pub fn finish(&mut self) -> Vec<LogicalLine> {
        if let Some(current) = self.pending.take() {
            self.step(current, None);
        }
        self.state.close();
        self.prior = None;
        self.state.drain_ready().collect()
    }

    /// 전체 라인 목록을 한 번에 재조립합니다. 라인 번호는 1부터 매깁니다.
    pub fn process_all<I, S>(mut self, lines: I) -> Vec<LogicalLine>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for (index, text) in lines.into_iter().enumerate() {
            out.extend(self.push(RawLine::new(text, index + 1)));
        }
        out.extend(self.finish());
        out
    }

    fn step(&mut self, current: RawLine, next: Option<&str>) {
        let window = LineWindow {
            prior: self.prior.as_deref(),
            current: &current.text,
            next,
        };
        match self
            .actions
            .iter()
            .find(|action| action.matches(&window, &self.state))
        {
            Some(action) => action.apply(&window, current.number, &mut self.state),
            None => self.state.emit(current.text.as_str(), current.number),
        }
        self.prior = Some(current.text);
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// --- 규칙 공통 도우미 ---

static RECORD_END: Lazy<Option<Regex>> =
    Lazy::new(|| compile(&format!(r"secs\](?:{})?\s*$", pattern::TIMES_BLOCK)));

static CONTINUATION: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(&format!(
        r"^(?:: |, |\s+\[Times|{tms}| \((?:concurrent mode (?:failure|interrupted)|promotion failed)\)| icms_dc=)",
        tms = pattern::TIMES_BLOCK
    ))
});

pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            error!(error = %e, pattern, "failed to compile preprocess pattern");
            None
        }
    }
}

pub(crate) fn is_match(re: &Lazy<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// 클래식 레코드가 끝나는 모양인지 (`... secs]` 또는 `... secs] [Times: ...]`)
pub(crate) fn ends_record(text: &str) -> bool {
    is_match(&RECORD_END, text)
}

/// 앞 레코드의 뒷부분으로 이어지는 라인인지
pub(crate) fn continues_record(text: &str) -> bool {
    is_match(&CONTINUATION, text)
}

/// 이어 붙인 뒤 레코드를 완성할지: 레코드 끝 모양이고 다음 라인이 이어지지 않으면 완성합니다.
pub(crate) fn append_and_maybe_finish(
    window: &LineWindow<'_>,
    text: &str,
    number: usize,
    state: &mut Reassembly,
) {
    state.append(text, number);
    if ends_record(text) && !window.next.is_some_and(continues_record) {
        state.finish();
    }
}
