// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Random value primitives used by the masking strategies.
//! All of them take the caller's RNG so a seeded run is reproducible.

use crate::profile::{DateBounds, IntRange, TimestampBounds};
use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;

const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DIGITS: &[u8] = b"0123456789";

const DATE_FORMAT: &str = "%Y-%m-%d";
// Microseconds are always rendered as zeros.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S:000000";

fn from_charset<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Uppercase letters and digits, exactly `len` characters.
pub fn alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    from_charset(rng, UPPER_ALNUM, len)
}

/// Decimal digits, exactly `len` characters. Leading zeros are allowed.
pub fn digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    from_charset(rng, DIGITS, len)
}

pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &'a [String]) -> Option<&'a str> {
    words.choose(rng).map(String::as_str)
}

/// `<int>.<frac>` with the integer part in `[0, 10^(precision-scale))` and
/// the fractional part in `[10^(scale-1), 10^scale - 1]`. Callers validate
/// that both exponents stay within 18 digits.
pub fn decimal<R: Rng + ?Sized>(rng: &mut R, precision: u32, scale: u32) -> String {
    let int_bound = 10u64.pow(precision.saturating_sub(scale));
    let int_part = rng.random_range(0..int_bound);
    if scale == 0 {
        return int_part.to_string();
    }
    let frac_low = 10u64.pow(scale - 1);
    let frac_high = 10u64.pow(scale) - 1;
    let frac_part = rng.random_range(frac_low..=frac_high);
    format!("{int_part}.{frac_part}")
}

pub fn date_between<R: Rng + ?Sized>(rng: &mut R, bounds: &DateBounds) -> String {
    let span = (bounds.end - bounds.start).num_days();
    let offset = rng.random_range(0..=span);
    bounds
        .start
        .checked_add_signed(Duration::days(offset))
        .unwrap_or(bounds.end)
        .format(DATE_FORMAT)
        .to_string()
}

pub fn timestamp_between<R: Rng + ?Sized>(rng: &mut R, bounds: &TimestampBounds) -> String {
    let span = (bounds.end - bounds.start).num_seconds();
    let offset = rng.random_range(0..=span);
    bounds
        .start
        .checked_add_signed(Duration::seconds(offset))
        .unwrap_or(bounds.end)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// A number with exactly `len` digits: uniform in `[10^(len-1), 10^len - 1]`.
pub fn integer_of_length<R: Rng + ?Sized>(rng: &mut R, len: u32) -> String {
    let low = 10u64.pow(len.saturating_sub(1));
    let high = 10u64.pow(len) - 1;
    rng.random_range(low..=high).to_string()
}

pub fn integer_in_range<R: Rng + ?Sized>(rng: &mut R, range: &IntRange) -> String {
    rng.random_range(range.min..=range.max).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn alphanumeric_is_upper_and_exact_length() {
        let mut rng = rng();
        for len in [0, 1, 10, 64] {
            let value = alphanumeric(&mut rng, len);
            assert_eq!(value.len(), len);
            assert!(
                value
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn digits_are_digits() {
        let mut rng = rng();
        let value = digits(&mut rng, 9);
        assert_eq!(value.len(), 9);
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn decimal_respects_shape() {
        let mut rng = rng();
        for _ in 0..200 {
            let value = decimal(&mut rng, 6, 2);
            let (int_part, frac) = value.split_once('.').expect("decimal point");
            assert!(int_part.parse::<u64>().unwrap() < 10_000);
            let frac: u64 = frac.parse().unwrap();
            assert!((10..=99).contains(&frac), "{value}");
        }
        let whole = decimal(&mut rng, 3, 0);
        assert!(!whole.contains('.'));
        assert!(whole.parse::<u64>().unwrap() < 1000);
        let fraction_only = decimal(&mut rng, 2, 2);
        assert!(fraction_only.starts_with("0."), "{fraction_only}");
    }

    #[test]
    fn dates_stay_in_bounds() {
        let mut rng = rng();
        let bounds = DateBounds {
            start: NaiveDate::from_ymd_opt(2020, 2, 27).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
        };
        for _ in 0..100 {
            let value = date_between(&mut rng, &bounds);
            let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d").unwrap();
            assert!(parsed >= bounds.start && parsed <= bounds.end);
        }
        let single = DateBounds {
            start: bounds.start,
            end: bounds.start,
        };
        assert_eq!(date_between(&mut rng, &single), "2020-02-27");
    }

    #[test]
    fn timestamps_use_zero_microseconds() {
        let mut rng = rng();
        let start = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let bounds = TimestampBounds {
            start,
            end: start + Duration::minutes(59),
        };
        let value = timestamp_between(&mut rng, &bounds);
        assert!(value.starts_with("2024-01-01 00:"), "{value}");
        assert!(value.ends_with(":000000"), "{value}");
        assert_eq!(value.len(), "YYYY-MM-DD HH:MM:SS:000000".len());
    }

    #[test]
    fn integers_follow_length_or_range() {
        let mut rng = rng();
        for _ in 0..100 {
            let value = integer_of_length(&mut rng, 4);
            assert_eq!(value.len(), 4);
            assert!(!value.starts_with('0'));
        }
        let one_digit: u64 = integer_of_length(&mut rng, 1).parse().unwrap();
        assert!((1..=9).contains(&one_digit));
        let range = IntRange { min: -3, max: 3 };
        for _ in 0..50 {
            let value: i64 = integer_in_range(&mut rng, &range).parse().unwrap();
            assert!((-3..=3).contains(&value));
        }
    }

    #[test]
    fn pick_handles_empty_lists() {
        let mut rng = rng();
        assert_eq!(pick(&mut rng, &[]), None);
        let words = vec!["only".to_string()];
        assert_eq!(pick(&mut rng, &words), Some("only"));
    }
}
