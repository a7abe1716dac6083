use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalStackError;
use crate::types::*;
use crate::CapitalStackResult;

wire_enum! {
    /// Typical time from first conversation to money in hand
    Speed {
        Weeks => "weeks",
        OneToThreeMonths => "1-3-months",
        ThreeToSixMonths => "3-6-months",
        SixToTwelveMonths => "6-12-months",
    }
}

impl Speed {
    pub fn ordinal(&self) -> i32 {
        match self {
            Speed::Weeks => 0,
            Speed::OneToThreeMonths => 1,
            Speed::ThreeToSixMonths => 2,
            Speed::SixToTwelveMonths => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Speed::Weeks => "weeks",
            Speed::OneToThreeMonths => "1–3 months",
            Speed::ThreeToSixMonths => "3–6 months",
            Speed::SixToTwelveMonths => "6–12 months",
        }
    }
}

wire_enum! {
    Complexity {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl Complexity {
    pub fn ordinal(&self) -> i32 {
        match self {
            Complexity::Low => 0,
            Complexity::Medium => 1,
            Complexity::High => 2,
        }
    }
}

wire_enum! {
    /// Governance classification of an instrument's terms
    Terms {
        Catalytic => "catalytic",
        Government => "government",
        Conventional => "conventional",
    }
}

/// Expected return to the capital provider, in percent (-100 = total loss)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRange {
    pub min: Percent,
    pub expected: Percent,
    pub max: Percent,
}

/// A financing instrument as seen by the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub slug: String,
    pub name: String,
    pub category: Category,
    pub terms: Terms,
    /// Descriptive cost string, e.g. "0-3%"
    pub cost_range: String,
    /// Descriptive size string, e.g. "$50K - $5M"
    pub typical_size: String,
    pub speed: Speed,
    pub complexity: Complexity,
    #[serde(default)]
    pub features: Vec<String>,
    pub financial_return: ReturnRange,
    /// Number of documented real-world deals
    #[serde(default)]
    pub deal_count: u32,
}

impl Instrument {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Find a finder instrument by slug.
pub fn find_by_slug<'a>(catalog: &'a [Instrument], slug: &str) -> CapitalStackResult<&'a Instrument> {
    catalog
        .iter()
        .find(|i| i.slug == slug)
        .ok_or_else(|| CapitalStackError::UnknownInstrument(slug.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn entry(
    slug: &str,
    name: &str,
    category: Category,
    terms: Terms,
    cost_range: &str,
    typical_size: &str,
    speed: Speed,
    complexity: Complexity,
    features: &[&str],
    financial_return: (Decimal, Decimal, Decimal),
    deal_count: u32,
) -> Instrument {
    Instrument {
        slug: slug.into(),
        name: name.into(),
        category,
        terms,
        cost_range: cost_range.into(),
        typical_size: typical_size.into(),
        speed,
        complexity,
        features: features.iter().map(|f| f.to_string()).collect(),
        financial_return: ReturnRange {
            min: financial_return.0,
            expected: financial_return.1,
            max: financial_return.2,
        },
        deal_count,
    }
}

/// The built-in catalog of 35 catalytic, government and conventional instruments.
pub fn builtin_catalog() -> Vec<Instrument> {
    use Category::{Debt, Equity, Grant, Guarantee, Hybrid};
    use Complexity::{High, Low, Medium};
    use Speed::{OneToThreeMonths, SixToTwelveMonths, ThreeToSixMonths, Weeks};
    use Terms::{Catalytic, Conventional, Government};

    vec![
        entry(
            "pure-grant", "Pure Grant", Grant, Catalytic, "0%", "$10K - $100M",
            ThreeToSixMonths, Medium, &["non-repayable", "risk-tolerant", "patient"],
            (dec!(-100), dec!(-100), dec!(-100)), 3,
        ),
        entry(
            "recoverable-grant", "Recoverable Grant", Grant, Catalytic, "0-2%", "$50K - $5M",
            ThreeToSixMonths, Medium, &["flexible", "risk-tolerant", "concessionary"],
            (dec!(-100), dec!(-20), dec!(0)), 3,
        ),
        entry(
            "forgivable-loan", "Forgivable Loan", Debt, Catalytic, "0-3%", "$25K - $2M",
            OneToThreeMonths, Low, &["flexible", "concessionary"],
            (dec!(-100), dec!(-30), dec!(3)), 3,
        ),
        entry(
            "concessionary-debt", "Concessionary Debt", Debt, Catalytic, "1-5%", "$250K - $50M",
            ThreeToSixMonths, Medium, &["concessionary", "patient"],
            (dec!(-5), dec!(2), dec!(5)), 3,
        ),
        entry(
            "first-loss-debt", "First-Loss Debt", Debt, Catalytic, "0-4%", "$1M - $50M",
            SixToTwelveMonths, High, &["risk-tolerant", "catalytic"],
            (dec!(-100), dec!(1), dec!(4)), 3,
        ),
        entry(
            "program-related-investment", "Program-Related Investment", Debt, Catalytic, "0-3%",
            "$100K - $10M", ThreeToSixMonths, Medium, &["concessionary", "patient", "flexible"],
            (dec!(-20), dec!(1), dec!(3)), 3,
        ),
        entry(
            "revenue-based-financing", "Revenue-Based Financing", Hybrid, Catalytic, "6-20%",
            "$50K - $5M", Weeks, Low, &["flexible", "non-dilutive"],
            (dec!(6), dec!(12), dec!(25)), 3,
        ),
        entry(
            "convertible-note", "Convertible Note", Hybrid, Catalytic, "2-8%", "$25K - $2M",
            OneToThreeMonths, Medium, &["flexible"],
            (dec!(-100), dec!(15), dec!(300)), 3,
        ),
        entry(
            "loan-guarantee", "Loan Guarantee", Guarantee, Catalytic, "0.5-2%", "$500K - $100M",
            ThreeToSixMonths, Medium, &["risk-sharing", "leverage"],
            (dec!(-10), dec!(1), dec!(2)), 3,
        ),
        entry(
            "first-loss-guarantee", "First-Loss Guarantee", Guarantee, Catalytic, "1-3%",
            "$1M - $50M", SixToTwelveMonths, High, &["risk-tolerant", "catalytic", "leverage"],
            (dec!(-100), dec!(0), dec!(3)), 3,
        ),
        entry(
            "performance-guarantee", "Performance Guarantee", Guarantee, Catalytic, "1-3%",
            "$100K - $25M", OneToThreeMonths, Medium, &["risk-sharing"],
            (dec!(-20), dec!(1), dec!(3)), 3,
        ),
        entry(
            "political-risk-insurance", "Political Risk Insurance", Guarantee, Catalytic,
            "0.5-2.5%", "$5M - $1B", SixToTwelveMonths, High, &["risk-sharing"],
            (dec!(-100), dec!(1), dec!(2.5)), 3,
        ),
        entry(
            "concessionary-equity", "Concessionary Equity", Equity, Catalytic, "3-8%",
            "$500K - $20M", ThreeToSixMonths, High, &["patient", "concessionary"],
            (dec!(-100), dec!(5), dec!(15)), 3,
        ),
        entry(
            "first-loss-equity", "First-Loss Equity", Equity, Catalytic, "0-5%", "$1M - $50M",
            SixToTwelveMonths, High, &["risk-tolerant", "catalytic"],
            (dec!(-100), dec!(3), dec!(10)), 3,
        ),
        entry(
            "patient-equity", "Patient Equity", Equity, Catalytic, "5-12%", "$1M - $50M",
            SixToTwelveMonths, High, &["patient", "flexible"],
            (dec!(-100), dec!(8), dec!(20)), 3,
        ),
        entry(
            "anchor-commitment", "Anchor Commitment", Equity, Catalytic, "5-15%",
            "$5M - $100M+", SixToTwelveMonths, High, &["catalytic", "signaling"],
            (dec!(-50), dec!(8), dec!(15)), 3,
        ),
        entry(
            "tiered-fund", "Tiered / Blended Fund", Hybrid, Catalytic, "2-10%", "$10M - $500M",
            SixToTwelveMonths, High, &["blended", "catalytic", "risk-tolerant"],
            (dec!(-20), dec!(6), dec!(12)), 3,
        ),
        entry(
            "technical-assistance", "Technical Assistance", Grant, Catalytic, "0%",
            "$10K - $500K", OneToThreeMonths, Low, &["non-repayable", "capacity-building"],
            (dec!(-100), dec!(-100), dec!(-100)), 3,
        ),
        entry(
            "pay-for-success", "Pay for Success", Hybrid, Catalytic, "3-12%", "$1M - $30M",
            SixToTwelveMonths, High, &["outcomes-based"],
            (dec!(-100), dec!(4), dec!(12)), 3,
        ),
        entry(
            "offtake-backed-financing", "Offtake-Backed Financing", Hybrid, Catalytic, "5-10%",
            "$10M - $500M", SixToTwelveMonths, High, &["contracted-revenue"],
            (dec!(-20), dec!(7), dec!(12)), 3,
        ),
        entry(
            "doe-lpo", "DOE Loan Programs Office", Debt, Government, "3-5%", "$100M - $5B",
            SixToTwelveMonths, High, &["patient", "large-scale"],
            (dec!(-10), dec!(3), dec!(5)), 3,
        ),
        entry(
            "ira-tax-credits", "IRA Tax Credits", Grant, Government, "0% (transfer discount)",
            "Credits: $100K - $500M per project", ThreeToSixMonths, Medium,
            &["non-dilutive", "transferable"],
            (dec!(0), dec!(0), dec!(0)), 3,
        ),
        entry(
            "oced-grants", "OCED Demonstration Grants", Grant, Government, "0% (cost share required)",
            "$1M - $500M (with cost share)", SixToTwelveMonths, High,
            &["non-repayable", "large-scale"],
            (dec!(-100), dec!(-100), dec!(-100)), 3,
        ),
        entry(
            "term-loan", "Term Loan", Debt, Conventional, "7-12%", "$100K - $10M",
            OneToThreeMonths, Medium, &["predictable"],
            (dec!(7), dec!(9), dec!(12)), 2,
        ),
        entry(
            "sba-loan", "SBA Loan", Debt, Conventional, "6-11%", "$50K - $5M",
            OneToThreeMonths, Medium, &["government-backed", "long-term"],
            (dec!(6), dec!(8), dec!(11)), 2,
        ),
        entry(
            "equipment-financing", "Equipment Financing", Debt, Conventional, "5-15%",
            "$25K - $5M", Weeks, Low, &["asset-backed"],
            (dec!(5), dec!(8), dec!(15)), 2,
        ),
        entry(
            "line-of-credit", "Line of Credit", Debt, Conventional, "7-18%", "$10K - $5M",
            Weeks, Low, &["flexible", "revolving"],
            (dec!(7), dec!(10), dec!(18)), 1,
        ),
        entry(
            "commercial-mortgage", "Commercial Mortgage", Debt, Conventional, "5-9%",
            "$500K - $50M", OneToThreeMonths, Medium, &["asset-backed", "long-term"],
            (dec!(5), dec!(7), dec!(9)), 2,
        ),
        entry(
            "venture-debt", "Venture Debt", Debt, Conventional, "10-15%", "$1M - $50M",
            OneToThreeMonths, Medium, &["non-dilutive", "warrants"],
            (dec!(10), dec!(13), dec!(18)), 2,
        ),
        entry(
            "mezzanine-debt", "Mezzanine Debt", Hybrid, Conventional, "12-20%", "$5M - $100M",
            ThreeToSixMonths, High, &["subordinated"],
            (dec!(12), dec!(16), dec!(20)), 2,
        ),
        entry(
            "vc-equity", "Venture Capital", Equity, Conventional, "25-35% target IRR",
            "$1M - $100M+", ThreeToSixMonths, High, &["dilutive", "growth"],
            (dec!(-100), dec!(25), dec!(1000)), 2,
        ),
        entry(
            "angel-seed", "Angel / Seed Investment", Equity, Conventional, "20-40% target IRR",
            "$25K - $2M", OneToThreeMonths, Medium, &["dilutive", "early-stage"],
            (dec!(-100), dec!(20), dec!(1000)), 2,
        ),
        entry(
            "crowdfunding", "Crowdfunding", Equity, Conventional, "5-10% platform fees",
            "$10K - $5M", OneToThreeMonths, Low, &["community", "dilutive"],
            (dec!(-100), dec!(10), dec!(100)), 2,
        ),
        entry(
            "invoice-factoring", "Invoice Factoring", Debt, Conventional, "1-5% per month",
            "$10K - $10M", Weeks, Low, &["fast", "receivables-backed"],
            (dec!(12), dec!(24), dec!(60)), 2,
        ),
        entry(
            "project-finance", "Project Finance", Debt, Conventional, "6-10%", "$50M - $5B",
            SixToTwelveMonths, High, &["non-recourse", "large-scale"],
            (dec!(6), dec!(8), dec!(10)), 3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_has_unique_slugs() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 35);
        let slugs: HashSet<&str> = catalog.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs.len(), 35);
    }

    #[test]
    fn test_terms_partition() {
        let catalog = builtin_catalog();
        let count = |t: Terms| catalog.iter().filter(|i| i.terms == t).count();
        assert_eq!(count(Terms::Catalytic), 20);
        assert_eq!(count(Terms::Government), 3);
        assert_eq!(count(Terms::Conventional), 12);
    }

    #[test]
    fn test_find_by_slug() {
        let catalog = builtin_catalog();
        assert_eq!(find_by_slug(&catalog, "sba-loan").unwrap().name, "SBA Loan");
        assert!(matches!(
            find_by_slug(&catalog, "bitcoin"),
            Err(CapitalStackError::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_instrument_wire_format() {
        let catalog = builtin_catalog();
        let json = serde_json::to_value(&catalog[6]).unwrap();
        assert_eq!(json["slug"], "revenue-based-financing");
        assert_eq!(json["speed"], "weeks");
        assert_eq!(json["category"], "hybrid");
        assert_eq!(json["terms"], "catalytic");
    }
}
