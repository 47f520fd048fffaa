//! 데코레이터 해석 -- 라인 앞머리의 시각/태그 정보
//!
//! 클래식 데코레이터(`DATESTAMP: UPTIME:`)는 이벤트 **시작** 시각을,
//! unified 데코레이터(`[uptime][level][tags] GC(n)`)는 이벤트 **종료** 시각을
//! 나타냅니다. 어느 쪽이든 uptime이 있으면 uptime을 우선하고, datestamp만
//! 있으면 [`JvmContext`]의 기동 시각을 기준으로 환산합니다.
//!
//! 형식이 틀린 데코레이터(13월, 잘못된 오프셋 등)는 `None`으로 해석되며
//! 에러가 아닙니다.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use gclog_core::types::JvmContext;
use gclog_core::units;

use crate::pattern::{DATESTAMP, LEVEL, TIMESTAMP};

static UNIFIED: Lazy<Option<Regex>> = Lazy::new(|| {
    let pattern = format!(
        r"^\[(?:(?P<ds>{DATESTAMP})|(?P<up>{TIMESTAMP})s|(?P<upms>\d{{1,13}})ms)\](?:\[(?:(?P<up2>{TIMESTAMP})s|(?P<upms2>\d{{1,13}})ms|(?P<pid>\d{{1,10}}))\])?(?:\[(?P<pid2>\d{{1,10}})\])?(?:\[(?P<level>{LEVEL}) *\])?(?:\[(?P<tags>[a-z0-9,]+) *\])?(?: GC\((?P<gcid>\d{{1,10}})\))?"
    );
    compile(&pattern)
});

static CLASSIC: Lazy<Option<Regex>> = Lazy::new(|| {
    let pattern = format!(
        r"^(?:(?P<ds>{DATESTAMP}): (?P<up>{TIMESTAMP}):|(?P<up_only>{TIMESTAMP}):|(?P<ds_only>{DATESTAMP}):)"
    );
    compile(&pattern)
});

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(error = %e, "failed to compile decorator pattern");
            None
        }
    }
}

/// 데코레이터 시대
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    /// JDK 8 이하의 `-XX:+PrintGC*` 형식
    Classic,
    /// JDK 9 이상의 `-Xlog` 형식
    Unified,
}

/// uptime 표기 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Uptime {
    /// `12.345s` (값은 밀리초)
    Seconds(u64),
    /// `12345ms`
    Millis(u64),
}

impl Uptime {
    pub fn millis(self) -> u64 {
        match self {
            Self::Seconds(ms) | Self::Millis(ms) => ms,
        }
    }
}

/// 해석된 데코레이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decorator {
    pub era: Era,
    pub datestamp: Option<DateTime<FixedOffset>>,
    pub uptime: Option<Uptime>,
    pub pid: Option<u32>,
    pub level: Option<String>,
    pub tags: Option<String>,
    pub gc_id: Option<u64>,
    /// 원본 텍스트에서 데코레이터가 차지한 길이 (바이트)
    pub len: usize,
}

impl Decorator {
    /// JVM 기동 이후 밀리초
    ///
    /// uptime이 있으면 uptime을, 없으면 datestamp를 기동 시각 기준으로 환산합니다.
    pub fn millis_since_start(&self, jvm: &JvmContext) -> u64 {
        match (self.uptime, self.datestamp) {
            (Some(uptime), _) => uptime.millis(),
            (None, Some(datestamp)) => jvm.millis_since_start(datestamp.timestamp_millis()),
            (None, None) => 0,
        }
    }

    pub fn is_unified(&self) -> bool {
        self.era == Era::Unified
    }

    /// 태그 목록에 `tag`가 있는지 확인합니다.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.split(',').any(|t| t == tag))
    }
}

/// 텍스트 앞머리의 데코레이터를 해석합니다.
///
/// 데코레이터가 없거나 형식이 틀리면 `None`을 반환합니다.
pub fn resolve(text: &str) -> Option<Decorator> {
    if text.starts_with('[') {
        resolve_unified(text)
    } else {
        resolve_classic(text)
    }
}

/// 데코레이터를 해석하고 나머지 메시지를 함께 반환합니다.
///
/// 메시지 앞의 구분 공백 하나는 제거됩니다.
pub fn split(text: &str) -> Option<(Decorator, &str)> {
    let decorator = resolve(text)?;
    let rest = &text[decorator.len..];
    let message = rest.strip_prefix(' ').unwrap_or(rest);
    Some((decorator, message))
}

fn resolve_unified(text: &str) -> Option<Decorator> {
    let caps = UNIFIED.as_ref()?.captures(text)?;

    let datestamp = match caps.name("ds") {
        Some(m) => Some(parse_datestamp(m.as_str())?),
        None => None,
    };
    let uptime = uptime_from(&caps, "up", "upms")?.or(uptime_from(&caps, "up2", "upms2")?);
    let pid = caps
        .name("pid")
        .or_else(|| caps.name("pid2"))
        .map(|m| m.as_str().parse::<u32>())
        .transpose()
        .ok()?;
    let gc_id = caps
        .name("gcid")
        .map(|m| m.as_str().parse::<u64>())
        .transpose()
        .ok()?;

    Some(Decorator {
        era: Era::Unified,
        datestamp,
        uptime,
        pid,
        level: caps.name("level").map(|m| m.as_str().to_owned()),
        tags: caps.name("tags").map(|m| m.as_str().to_owned()),
        gc_id,
        len: caps.get(0)?.end(),
    })
}

fn resolve_classic(text: &str) -> Option<Decorator> {
    let caps = CLASSIC.as_ref()?.captures(text)?;

    let datestamp = match caps.name("ds").or_else(|| caps.name("ds_only")) {
        Some(m) => Some(parse_datestamp(m.as_str())?),
        None => None,
    };
    let uptime = match caps.name("up").or_else(|| caps.name("up_only")) {
        Some(m) => Some(Uptime::Seconds(units::secs_to_millis(m.as_str()).ok()?)),
        None => None,
    };

    Some(Decorator {
        era: Era::Classic,
        datestamp,
        uptime,
        pid: None,
        level: None,
        tags: None,
        gc_id: None,
        len: caps.get(0)?.end(),
    })
}

/// uptime 그룹을 해석합니다. 값이 틀리면 바깥 `None`, 그룹이 없으면 `Some(None)`.
fn uptime_from(caps: &Captures<'_>, secs: &str, millis: &str) -> Option<Option<Uptime>> {
    if let Some(m) = caps.name(secs) {
        return Some(Some(Uptime::Seconds(
            units::secs_to_millis(m.as_str()).ok()?,
        )));
    }
    if let Some(m) = caps.name(millis) {
        return Some(Some(Uptime::Millis(m.as_str().parse().ok()?)));
    }
    Some(None)
}

/// `2020-03-10T08:03:46.284-0400` 형식을 파싱합니다. 소수 구분자 `,`도 허용합니다.
pub fn parse_datestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = text.replace(',', ".");
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.3f%z").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_uptime_only() {
        let dec = resolve("17.346: [Pause Init Update Refs, 0.017 ms]").unwrap();
        assert_eq!(dec.era, Era::Classic);
        assert_eq!(dec.uptime, Some(Uptime::Seconds(17_346)));
        assert!(dec.datestamp.is_none());
        assert_eq!(dec.len, "17.346:".len());
    }

    #[test]
    fn classic_datestamp_and_uptime_prefers_uptime() {
        let dec = resolve("2020-03-10T08:03:46.284-0400: 17.346: [Pause Init Update Refs, 0.017 ms]")
            .unwrap();
        assert!(dec.datestamp.is_some());
        assert_eq!(dec.millis_since_start(&JvmContext::new()), 17_346);
    }

    #[test]
    fn classic_datestamp_only_uses_jvm_start() {
        let dec = resolve("2020-03-10T08:03:46.284-0400: [GC pause (young)").unwrap();
        assert!(dec.uptime.is_none());

        let start = parse_datestamp("2020-03-10T08:03:29,000-0400").unwrap();
        let jvm = JvmContext {
            start_epoch: Some(start),
            ..JvmContext::default()
        };
        assert_eq!(dec.millis_since_start(&jvm), 17_284);
    }

    #[test]
    fn unified_uptime_level_tags() {
        let (dec, message) = split("[5.312s][info][gc] GC(110) Pause Init Update Refs 0.005ms").unwrap();
        assert_eq!(dec.era, Era::Unified);
        assert_eq!(dec.uptime, Some(Uptime::Seconds(5_312)));
        assert_eq!(dec.level.as_deref(), Some("info"));
        assert!(dec.has_tag("gc"));
        assert_eq!(dec.gc_id, Some(110));
        assert_eq!(message, "Pause Init Update Refs 0.005ms");
    }

    #[test]
    fn unified_datestamp_with_pid_and_padded_tags() {
        let (dec, message) =
            split("[2022-08-05T05:08:51.394+0000][1908][gc,start    ] GC(1360) Pause Young").unwrap();
        assert!(dec.datestamp.is_some());
        assert!(dec.uptime.is_none());
        assert_eq!(dec.pid, Some(1908));
        assert!(dec.has_tag("start"));
        assert_eq!(dec.gc_id, Some(1360));
        assert_eq!(message, "Pause Young");
    }

    #[test]
    fn unified_datestamp_with_uptime() {
        let dec = resolve("[2022-08-22T16:07:11.203+0000][248.117s] GC(26) Pause Mark End 0.1ms").unwrap();
        assert_eq!(dec.uptime, Some(Uptime::Seconds(248_117)));
        assert_eq!(dec.millis_since_start(&JvmContext::new()), 248_117);
    }

    #[test]
    fn unified_uptime_millis() {
        let dec = resolve("[12345ms][info][safepoint] Total time").unwrap();
        assert_eq!(dec.uptime, Some(Uptime::Millis(12_345)));
    }

    #[test]
    fn malformed_datestamp_does_not_resolve() {
        assert!(resolve("2020-13-10T08:03:46.284-0400: [GC pause (young)").is_none());
        assert!(resolve("[2020-03-10T25:03:46.284-0400][info][gc] Using G1").is_none());
    }

    #[test]
    fn prose_does_not_resolve() {
        assert!(resolve("The quick brown fox").is_none());
        assert!(resolve("[gc] no time").is_none());
        assert!(resolve("").is_none());
    }
}
