use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use super::answers::CapitalNeed;
use crate::types::Money;

/// Closed numeric interval in currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: Money,
    pub max: Money,
}

impl SizeRange {
    /// Range assumed when a size string carries no dollar amounts.
    pub const UNKNOWN: SizeRange = SizeRange {
        min: Decimal::ZERO,
        max: dec!(1_000_000_000),
    };

    pub fn new(min: Money, max: Money) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> Money {
        self.max - self.min
    }
}

impl CapitalNeed {
    /// Numeric bracket implied by the answer.
    pub fn bracket(&self) -> SizeRange {
        match self {
            CapitalNeed::Under100k => SizeRange::new(dec!(0), dec!(100_000)),
            CapitalNeed::From100kTo1m => SizeRange::new(dec!(100_000), dec!(1_000_000)),
            CapitalNeed::From1mTo10m => SizeRange::new(dec!(1_000_000), dec!(10_000_000)),
            CapitalNeed::From10mTo100m => SizeRange::new(dec!(10_000_000), dec!(100_000_000)),
            CapitalNeed::Over100m => SizeRange::new(dec!(100_000_000), dec!(100_000_000_000)),
        }
    }
}

struct Patterns {
    parenthetical: Regex,
    credits: Regex,
    per_project: Regex,
    amount: Regex,
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns, &'static regex::Error> {
    PATTERNS
        .get_or_init(|| {
            Ok(Patterns {
                parenthetical: Regex::new(r"\(.*?\)")?,
                credits: Regex::new(r"(?i)Credits:\s*")?,
                per_project: Regex::new(r"(?i)per project")?,
                amount: Regex::new(r"\$[\d,.]+[KMB]?\+?")?,
            })
        })
        .as_ref()
}

/// Parse a descriptive size such as `"$50K - $10M"` or `"$5M - $100M+"`.
///
/// Two or more amounts give `[first, second]`, with the second scaled by 10
/// when it carries a trailing `+`. A single amount `v` gives `[v, 10v]` with a
/// `+` and `[v, 2v]` without. No amounts give [`SizeRange::UNKNOWN`].
pub fn parse_size_range(typical_size: &str) -> SizeRange {
    let p = match patterns() {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "size patterns failed to compile");
            return SizeRange::UNKNOWN;
        }
    };

    let cleaned = p.parenthetical.replace_all(typical_size, "");
    let cleaned = p.credits.replace(&cleaned, "");
    let cleaned = p.per_project.replace(&cleaned, "");
    let tokens: Vec<&str> = p.amount.find_iter(&cleaned).map(|m| m.as_str()).collect();

    match tokens.as_slice() {
        [first, second, ..] => {
            let mut max = parse_amount(second);
            if second.contains('+') {
                max *= dec!(10);
            }
            SizeRange::new(parse_amount(first), max)
        }
        [only] => {
            let value = parse_amount(only);
            let factor = if only.contains('+') { dec!(10) } else { dec!(2) };
            SizeRange::new(value, value * factor)
        }
        [] => SizeRange::UNKNOWN,
    }
}

/// `"$1,500K+"` → 1_500_000. Unparseable digits count as zero.
fn parse_amount(token: &str) -> Money {
    let digits: String = token.chars().filter(|c| *c != '$' && *c != ',').collect();
    let numeric = leading_number(&digits);
    let value = Decimal::from_str(numeric).unwrap_or(Decimal::ZERO);

    if token.contains('B') {
        value * dec!(1_000_000_000)
    } else if token.contains('M') {
        value * dec!(1_000_000)
    } else if token.contains('K') {
        value * dec!(1_000)
    } else {
        value
    }
}

/// Longest prefix that reads as a decimal number (one point at most).
fn leading_number(s: &str) -> &str {
    let mut seen_point = false;
    let end = s
        .char_indices()
        .find(|(_, c)| match c {
            '0'..='9' => false,
            '.' if !seen_point => {
                seen_point = true;
                false
            }
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

/// Points (0-15) for how well an instrument's size range covers the need bracket.
pub fn size_match(need: SizeRange, instrument: SizeRange) -> u32 {
    let overlap_min = need.min.max(instrument.min);
    let overlap_max = need.max.min(instrument.max);

    if overlap_min <= overlap_max {
        let width = if need.width().is_zero() {
            Decimal::ONE
        } else {
            need.width()
        };
        let coverage = (overlap_max - overlap_min) / width;
        if coverage > dec!(0.5) {
            15
        } else if coverage > Decimal::ZERO {
            10
        } else {
            // Ranges touch at a single point
            5
        }
    } else {
        // Near-miss credit. The half-bracket threshold is a heuristic, not a calibrated rule.
        let gap = (need.min - instrument.max)
            .abs()
            .min((instrument.min - need.max).abs());
        if gap < need.max * dec!(0.5) {
            3
        } else {
            0
        }
    }
}
