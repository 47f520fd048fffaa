//! 정규식 조각 -- 문법 카탈로그와 재조립 규칙이 공유하는 패턴
//!
//! 상수 조각은 캡처 그룹을 만들지 않습니다. 이름 있는 그룹이 필요한
//! 조각은 함수로 제공하며, 호출자가 그룹 접두사를 정해 한 문법 안에서
//! 이름이 겹치지 않게 합니다.

/// `2020-03-10T08:03:46.284-0400`
pub const DATESTAMP: &str = r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[.,]\d{3}[-+]\d{4}";

/// 초 단위 uptime 숫자 (`17.346`)
pub const TIMESTAMP: &str = r"\d{1,10}[.,]\d{3}";

/// 메모리 크기 (`3007K`, `21.6M`, `0.0B`)
pub const SIZE: &str = r"\d{1,12}(?:[.,]\d{1,3})?[BKMG]";

/// 초 단위 지속 시간 숫자 (`0.0160130`)
pub const SECONDS: &str = r"\d{1,7}[.,]\d{3,7}";

/// 밀리초 단위 지속 시간 숫자 (`0.017`, `26,821`)
pub const MILLIS: &str = r"\d{1,7}(?:[.,]\d{1,6})?";

/// unified 데코레이터 레벨
pub const LEVEL: &str = r"(?:trace|debug|info|warning|error)";

/// 클래식 데코레이터: `DATESTAMP: UPTIME:`, `UPTIME:`, `DATESTAMP:`
pub fn classic_decorator() -> String {
    format!(r"(?:{DATESTAMP}: {TIMESTAMP}:|{TIMESTAMP}:|{DATESTAMP}:)")
}

/// 레코드 중간에 끼어드는 데코레이터 (없을 수도 있음, 뒤 공백 포함)
pub fn inner_decorator() -> String {
    format!(r"(?:{DATESTAMP}: )?(?:{TIMESTAMP}: )?")
}

/// unified 데코레이터
///
/// `[time]`, 선택적인 두 번째 시각 또는 pid, `[pid]`, `[level]`, `[tags]`,
/// ` GC(n)` 순서입니다.
pub fn unified_decorator() -> String {
    let first = format!(r"(?:{DATESTAMP}|{TIMESTAMP}s|\d{{1,13}}ms)");
    let second = format!(r"(?:{TIMESTAMP}s|\d{{1,13}}ms|\d{{1,10}})");
    format!(
        r"\[{first}\](?:\[{second}\])?(?:\[\d{{1,10}}\])?(?:\[{LEVEL} *\])?(?:\[[a-z0-9,]+ *\])?(?: GC\(\d{{1,10}}\))?"
    )
}

/// 두 시대 중 하나의 데코레이터를 `dec` 그룹으로 캡처합니다.
pub fn any_decorator() -> String {
    format!(r"(?P<dec>{}|{})", classic_decorator(), unified_decorator())
}

/// 클래식 데코레이터를 `dec` 그룹으로 캡처합니다.
pub fn classic_dec() -> String {
    format!(r"(?P<dec>{})", classic_decorator())
}

/// unified 데코레이터를 `dec` 그룹으로 캡처합니다.
pub fn unified_dec() -> String {
    format!(r"(?P<dec>{})", unified_decorator())
}

/// `(Allocation Failure)`, `(System.gc())` 형식의 원인을 `trigger` 그룹으로 캡처합니다.
pub fn trigger() -> String {
    r"\((?P<trigger>System\.gc\(\)|[^()]{1,64})\)".to_owned()
}

/// `before->after(capacity)`
pub fn occupancy(prefix: &str) -> String {
    format!(r"(?P<{prefix}b>{SIZE})->(?P<{prefix}a>{SIZE})\((?P<{prefix}c>{SIZE})\)")
}

/// `before(cap)->after(capacity)` 또는 `before->after(capacity)`
pub fn generation(prefix: &str) -> String {
    format!(
        r"(?P<{prefix}b>{SIZE})(?:\({SIZE}\))?->(?P<{prefix}a>{SIZE})\((?P<{prefix}c>{SIZE})\)"
    )
}

/// `used(capacity)` 스냅샷
pub fn snapshot(prefix: &str) -> String {
    format!(r"(?P<{prefix}a>{SIZE})\((?P<{prefix}c>{SIZE})\)")
}

/// `0.0160130 secs`를 `name` 그룹으로 캡처합니다.
pub fn secs(name: &str) -> String {
    format!(r"(?P<{name}>{SECONDS}) secs")
}

/// `0.017 ms` 또는 `0.005ms`를 `name` 그룹으로 캡처합니다.
pub fn millis(name: &str) -> String {
    format!(r"(?P<{name}>{MILLIS}) ?ms")
}

/// 클래식 ` [Times: user=0.02 sys=0.00, real=0.02 secs]`
pub fn times() -> String {
    r" ?\[Times: user=(?P<user>\d{1,5}[.,]\d{2}) sys=(?P<sys>\d{1,5}[.,]\d{2}), real=(?P<real>\d{1,5}[.,]\d{2}) secs\]"
        .to_owned()
}

/// unified ` User=0.00s Sys=0.00s Real=0.00s`
pub fn unified_times() -> String {
    r" User=(?P<user>\d{1,5}[.,]\d{2})s Sys=(?P<sys>\d{1,5}[.,]\d{2})s Real=(?P<real>\d{1,5}[.,]\d{2})s"
        .to_owned()
}

/// 캡처 없는 클래식 스레드 시간 블록
pub const TIMES_BLOCK: &str = r" ?\[Times: [^\]]*\]";
