//! Go-style duration strings (`7h`, `1h30m`, `30m12s`, `1.5h`, `500ms`)

use crate::error::{ConfigError, Result};
use chrono::Duration;

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3600 * NANOS_PER_SECOND),
        _ => None,
    }
}

/// Parse a signed sequence of decimal numbers, each with a unit suffix
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, after_unit) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| invalid(&format!("unknown unit {unit:?}")))?;

        let whole: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("number out of range"))?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(|| invalid("overflow"))?;
        if !frac_part.is_empty() {
            // Anything beyond nanosecond precision is truncated.
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: i128 = digits.parse().map_err(|_| invalid("number out of range"))?;
            value += numerator * scale / 10_i128.pow(digits.len() as u32);
        }
        total = total.checked_add(value).ok_or_else(|| invalid("overflow"))?;
        rest = after_unit;
    }

    let nanos = i64::try_from(total).map_err(|_| invalid("overflow"))?;
    let duration = Duration::nanoseconds(nanos);
    Ok(if negative { -duration } else { duration })
}

/// Parse the resource TTL, which must be strictly positive
pub fn parse_ttl(input: &str) -> Result<Duration> {
    let ttl = parse_duration(input)?;
    if ttl <= Duration::zero() {
        return Err(ConfigError::NonPositiveTtl(input.to_string()));
    }
    Ok(ttl)
}

/// Render a duration the way Go prints one (`7h0m0s`, `1m30s`, `500ms`)
pub fn format_duration(duration: Duration) -> String {
    let sign = if duration < Duration::zero() { "-" } else { "" };
    let duration = duration.abs();
    let nanos = duration.num_nanoseconds().unwrap_or(i64::MAX);

    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SECOND as i64 {
        let (value, unit) = if nanos < NANOS_PER_MICRO as i64 {
            (nanos as f64, "ns")
        } else if nanos < NANOS_PER_MILLI as i64 {
            (nanos as f64 / NANOS_PER_MICRO as f64, "µs")
        } else {
            (nanos as f64 / NANOS_PER_MILLI as f64, "ms")
        };
        return format!("{sign}{value}{unit}");
    }

    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let seconds = (nanos % (60 * NANOS_PER_SECOND as i64)) as f64 / NANOS_PER_SECOND as f64;
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
