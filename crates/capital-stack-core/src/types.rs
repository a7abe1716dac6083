use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages as entered by a user (6.5 = 6.5%). Divide by 100 before use as a rate.
pub type Percent = Decimal;

/// Multiples (e.g., a 1.5x repayment cap)
pub type Multiple = Decimal;

/// Sum that clamps at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = Money>) -> Money {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Broad family an instrument belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Grant,
    Debt,
    Guarantee,
    Equity,
    Hybrid,
    Government,
    Conventional,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Grant => "Grant-Based",
            Category::Debt => "Debt",
            Category::Guarantee => "Guarantees",
            Category::Equity => "Equity",
            Category::Hybrid => "Hybrid",
            Category::Government => "Government",
            Category::Conventional => "Conventional",
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation.
///
/// Carries no timing information: two runs over the same input serialize to
/// the same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
