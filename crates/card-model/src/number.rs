use crate::card::Card;
use std::cmp::Ordering;

/// Marks a missing component so unknown numbers sort last.
const UNBOUNDED: u64 = u64::MAX;

/// A printed card number split into its main and total components:
/// "4/102" is card 4 of 102. Ordering is derived, so (main, total)
/// compares lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumberParts {
    pub main: u64,
    pub total: u64,
}

impl NumberParts {
    pub const UNKNOWN: NumberParts = NumberParts {
        main: UNBOUNDED,
        total: UNBOUNDED,
    };

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// Parse a printed card number.
///
/// "4/102" -> (4, 102); "TG12/TG30" -> (12, 30); "005" -> (5, unbounded);
/// anything without digits -> the unknown sentinel, which sorts last.
pub fn parse_number_parts(raw: &str) -> NumberParts {
    let s = raw.trim();
    if s.is_empty() {
        return NumberParts::UNKNOWN;
    }

    if let Some(slash) = s.find('/') {
        let main = last_digit_run(&s[..slash]);
        let total = first_digit_run(&s[slash + 1..]);
        if let (Some(main), Some(total)) = (main, total) {
            return NumberParts { main, total };
        }
    }

    match last_digit_run(s) {
        Some(main) => NumberParts {
            main,
            total: UNBOUNDED,
        },
        None => NumberParts::UNKNOWN,
    }
}

/// Default ordering for cards without a manual placement: printed number
/// (main, then total), then case-insensitive name.
pub fn default_card_cmp(a: &Card, b: &Card) -> Ordering {
    parse_number_parts(&a.number)
        .cmp(&parse_number_parts(&b.number))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

fn last_digit_run(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    if end == 0 {
        return None;
    }
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    Some(parse_digits(&bytes[start..end]))
}

fn first_digit_run(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() && !bytes[start].is_ascii_digit() {
        start += 1;
    }
    if start == bytes.len() {
        return None;
    }
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    Some(parse_digits(&bytes[start..end]))
}

/// Saturating decimal parse, capped below the unknown sentinel.
fn parse_digits(digits: &[u8]) -> u64 {
    let value = digits.iter().fold(0u64, |acc, &b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });
    value.min(UNBOUNDED - 1)
}
