use chrono::{DateTime, Local};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

/// Format an amount as whole US dollars, e.g. `1250` → `"$1,250"`.
///
/// Rounds half away from zero and never emits fraction digits.
/// Negative amounts keep their sign (`"-$5"`).
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // i128 covers the full Decimal integer range (96-bit mantissa)
    let whole = rounded.abs().to_i128().unwrap_or(0);
    let grouped = group_thousands(whole);

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format an optional amount for display next to a listing.
/// Missing, zero and negative amounts all render as `"$0"`.
pub fn format_price(amount: Option<Decimal>) -> String {
    match amount {
        Some(a) if a > Decimal::ZERO => format_currency(a),
        _ => format_currency(Decimal::ZERO),
    }
}

/// Format remaining milliseconds as a countdown.
///
/// | Remaining        | Output         |
/// |------------------|----------------|
/// | <= 0             | `Ended`        |
/// | >= 1 day         | `{d}d {h}h {m}m` |
/// | >= 1 hour        | `{h}h {m}m {s}s` |
/// | >= 1 minute      | `{m}m {s}s`    |
/// | otherwise        | `{s}s`         |
pub fn format_time_remaining(remaining_ms: i64) -> String {
    if remaining_ms <= 0 {
        return "Ended".to_string();
    }

    let d = remaining_ms / MS_PER_DAY;
    let h = (remaining_ms % MS_PER_DAY) / MS_PER_HOUR;
    let m = (remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let s = (remaining_ms % MS_PER_MINUTE) / MS_PER_SECOND;

    if d > 0 {
        format!("{}d {}h {}m", d, h, m)
    } else if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Wall-clock text for the page's server-time element,
/// e.g. `"10/16/2026, 3:04:05 PM"`.
pub fn format_clock(now: DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

fn group_thousands(value: i128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_basic() {
        assert_eq!(format_currency(dec!(1250)), "$1,250");
        assert_eq!(format_currency(dec!(0)), "$0");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(dec!(1000000)), "$1,000,000");
    }

    #[test]
    fn test_currency_rounds_to_whole_dollars() {
        assert_eq!(format_currency(dec!(1249.5)), "$1,250");
        assert_eq!(format_currency(dec!(1249.49)), "$1,249");
        assert_eq!(format_currency(dec!(0.4)), "$0");
    }

    #[test]
    fn test_currency_negative_does_not_panic() {
        assert_eq!(format_currency(dec!(-5)), "-$5");
        assert_eq!(format_currency(dec!(-0.2)), "$0");
    }

    #[test]
    fn test_price_zero_equivalents() {
        assert_eq!(format_price(None), "$0");
        assert_eq!(format_price(Some(dec!(0))), "$0");
        assert_eq!(format_price(Some(dec!(-40))), "$0");
        assert_eq!(format_price(Some(dec!(450))), "$450");
    }

    #[test]
    fn test_time_remaining_ended() {
        assert_eq!(format_time_remaining(0), "Ended");
        assert_eq!(format_time_remaining(-5_000), "Ended");
    }

    #[test]
    fn test_time_remaining_units() {
        // 1m 30s
        assert_eq!(format_time_remaining(90_000), "1m 30s");
        // 1h 1m 1s
        assert_eq!(format_time_remaining(3_661_000), "1h 1m 1s");
        // 1d 1h, seconds dropped
        assert_eq!(format_time_remaining(90_000_000), "1d 1h 0m");
    }

    #[test]
    fn test_time_remaining_seconds_only() {
        assert_eq!(format_time_remaining(45_000), "45s");
        // Sub-second remainder floors to 0s but is not "Ended"
        assert_eq!(format_time_remaining(999), "0s");
    }

    #[test]
    fn test_time_remaining_hour_with_zero_minutes() {
        assert_eq!(format_time_remaining(3_600_000), "1h 0m 0s");
        assert_eq!(format_time_remaining(7_205_000), "2h 0m 5s");
    }

    #[test]
    fn test_time_remaining_is_pure() {
        let a = format_time_remaining(123_456_789);
        let b = format_time_remaining(123_456_789);
        assert_eq!(a, b);
        assert_eq!(a, "1d 10h 17m");
    }

    #[test]
    fn test_format_clock() {
        let t = Local.with_ymd_and_hms(2026, 10, 16, 15, 4, 5).unwrap();
        assert_eq!(format_clock(t), "10/16/2026, 3:04:05 PM");
    }
}
