//! 단위 변환 -- 초/밀리초/마이크로초, 메모리 크기
//!
//! GC 로그의 숫자는 로케일에 따라 `.` 또는 `,`를 소수 구분자로 사용합니다.
//! 모든 변환은 부동소수점을 거치지 않고 정수 연산으로 수행하며,
//! 버려지는 자릿수는 half-even 규칙으로 반올림합니다.

use crate::error::ParseError;

/// 소수 문자열을 `10^scale` 배한 정수로 변환합니다.
///
/// `scale_decimal("0.017", 3) == 17`, `scale_decimal("26,821", 3) == 26821`
pub fn scale_decimal(text: &str, scale: u32) -> Result<u64, ParseError> {
    let text = text.trim();
    let invalid = |reason: &str| ParseError::InvalidNumber {
        value: text.to_owned(),
        reason: reason.to_owned(),
    };

    let (int_part, frac_part) = match text.find(['.', ',']) {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("empty number"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("non-digit character"));
    }

    let scale = scale as usize;
    let kept = frac_part.len().min(scale);
    let mut value: u128 = 0;
    for b in int_part.bytes().chain(frac_part.bytes().take(kept)) {
        value = value * 10 + u128::from(b - b'0');
        if value > u128::from(u64::MAX) {
            return Err(invalid("overflow"));
        }
    }
    for _ in kept..scale {
        value *= 10;
    }

    // half-even: 버려지는 자릿수가 정확히 절반이면 짝수 쪽으로
    let dropped = &frac_part.as_bytes()[kept..];
    if let Some((&first, rest)) = dropped.split_first() {
        let round_up = match first.cmp(&b'5') {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => rest.iter().any(|&b| b != b'0') || value % 2 == 1,
        };
        if round_up {
            value += 1;
        }
    }

    u64::try_from(value).map_err(|_| invalid("overflow"))
}

/// 초 단위 문자열을 밀리초로 변환합니다.
pub fn secs_to_millis(text: &str) -> Result<u64, ParseError> {
    scale_decimal(text, 3)
}

/// 초 단위 문자열을 마이크로초로 변환합니다.
pub fn secs_to_micros(text: &str) -> Result<u64, ParseError> {
    scale_decimal(text, 6)
}

/// 밀리초 단위 문자열을 마이크로초로 변환합니다.
pub fn millis_to_micros(text: &str) -> Result<u64, ParseError> {
    scale_decimal(text, 3)
}

/// 초 단위 문자열을 1/100초(centisecond)로 변환합니다.
pub fn secs_to_centis(text: &str) -> Result<u32, ParseError> {
    let centis = scale_decimal(text, 2)?;
    u32::try_from(centis).map_err(|_| ParseError::InvalidNumber {
        value: text.to_owned(),
        reason: "overflow".to_owned(),
    })
}

/// 마이크로초를 밀리초로 변환합니다 (half-even).
pub fn micros_to_millis(micros: u64) -> u64 {
    let (quotient, remainder) = (micros / 1000, micros % 1000);
    if remainder > 500 || (remainder == 500 && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// 메모리 크기 문자열(`3007K`, `21.6M`, `0.0B`)을 바이트로 변환합니다.
pub fn size_to_bytes(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    let Some(unit) = text.chars().last() else {
        return Err(ParseError::InvalidMemory(text.to_owned()));
    };
    let multiplier: u128 = match unit.to_ascii_uppercase() {
        'B' => 1,
        'K' => 1 << 10,
        'M' => 1 << 20,
        'G' => 1 << 30,
        _ => return Err(ParseError::InvalidMemory(text.to_owned())),
    };
    let number = &text[..text.len() - unit.len_utf8()];
    let thousandths = u128::from(scale_decimal(number, 3)?);

    let scaled = thousandths * multiplier;
    let (quotient, remainder) = (scaled / 1000, scaled % 1000);
    let bytes = if remainder > 500 || (remainder == 500 && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };
    u64::try_from(bytes).map_err(|_| ParseError::InvalidMemory(text.to_owned()))
}
