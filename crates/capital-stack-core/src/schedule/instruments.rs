use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalStackError;
use crate::types::*;
use crate::CapitalStackResult;

/// Revenue share applied when neither the layer nor its type specifies one.
pub const FALLBACK_REVENUE_SHARE: Percent = dec!(5);
/// Repayment cap applied when neither the layer nor its type specifies one.
pub const FALLBACK_CAP_MULTIPLE: Multiple = dec!(1.5);

/// How a class of instrument pays its capital back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentType {
    /// Level payment retiring principal over the term
    Amortizing,
    /// Interest each month, principal at maturity
    InterestOnly,
    /// Interest each month, principal at maturity (balloon)
    Bullet,
    /// Share of monthly revenue until a repayment cap is reached
    RevenueBased,
    /// No repayment obligation
    None,
}

impl RepaymentType {
    /// Amortizing, interest-only and bullet debt share a fixed-term schedule.
    pub fn is_fixed_term(&self) -> bool {
        matches!(
            self,
            RepaymentType::Amortizing | RepaymentType::InterestOnly | RepaymentType::Bullet
        )
    }

    /// Principal is repaid in one lump on the final period.
    pub fn has_balloon(&self) -> bool {
        matches!(self, RepaymentType::InterestOnly | RepaymentType::Bullet)
    }
}

/// Catalog entry describing a class of capital stack instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackInstrumentDef {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub category: Category,
    pub repayment_type: RepaymentType,
    pub default_rate: Percent,
    pub default_term_months: u32,
    pub rate_range: (Percent, Percent),
    pub term_range: (u32, u32),
    pub description: String,
    /// No debt service
    #[serde(default)]
    pub is_equity: bool,
    /// No repayment at all
    #[serde(default)]
    pub is_grant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_revenue_share: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cap_multiple: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_share_range: Option<(Percent, Percent)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_multiple_range: Option<(Multiple, Multiple)>,
}

impl StackInstrumentDef {
    /// Everything that is neither equity nor a grant carries debt service.
    pub fn is_debt(&self) -> bool {
        !self.is_equity && !self.is_grant
    }

    pub fn revenue_share_or_default(&self, layer_value: Option<Percent>) -> Percent {
        layer_value
            .or(self.default_revenue_share)
            .unwrap_or(FALLBACK_REVENUE_SHARE)
    }

    pub fn cap_multiple_or_default(&self, layer_value: Option<Multiple>) -> Multiple {
        layer_value
            .or(self.default_cap_multiple)
            .unwrap_or(FALLBACK_CAP_MULTIPLE)
    }
}

/// Find an instrument definition by id.
pub fn find_instrument<'a>(
    catalog: &'a [StackInstrumentDef],
    id: &str,
) -> CapitalStackResult<&'a StackInstrumentDef> {
    catalog
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| CapitalStackError::UnknownInstrument(id.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn debt(
    id: &str,
    name: &str,
    short_name: &str,
    category: Category,
    repayment_type: RepaymentType,
    default_rate: Decimal,
    default_term_months: u32,
    rate_range: (Decimal, Decimal),
    term_range: (u32, u32),
    description: &str,
) -> StackInstrumentDef {
    StackInstrumentDef {
        id: id.into(),
        name: name.into(),
        short_name: short_name.into(),
        category,
        repayment_type,
        default_rate,
        default_term_months,
        rate_range,
        term_range,
        description: description.into(),
        is_equity: false,
        is_grant: false,
        default_revenue_share: None,
        default_cap_multiple: None,
        revenue_share_range: None,
        cap_multiple_range: None,
    }
}

fn no_repayment(
    id: &str,
    name: &str,
    short_name: &str,
    category: Category,
    description: &str,
) -> StackInstrumentDef {
    let mut def = debt(
        id,
        name,
        short_name,
        category,
        RepaymentType::None,
        Decimal::ZERO,
        0,
        (Decimal::ZERO, Decimal::ZERO),
        (0, 0),
        description,
    );
    def.is_equity = category == Category::Equity;
    def.is_grant = category == Category::Grant;
    def
}

/// The instrument types offered by the capital stack builder.
pub fn builtin_stack_instruments() -> Vec<StackInstrumentDef> {
    use Category::*;
    use RepaymentType::{Amortizing, Bullet, InterestOnly, RevenueBased};

    let mut rbf = debt(
        "revenue-based-financing",
        "Revenue-Based Financing",
        "RBF",
        Hybrid,
        RevenueBased,
        Decimal::ZERO,
        0,
        (Decimal::ZERO, Decimal::ZERO),
        (0, 0),
        "Repaid as a fixed share of monthly revenue until a multiple of principal has been returned.",
    );
    rbf.default_revenue_share = Some(dec!(5));
    rbf.default_cap_multiple = Some(dec!(1.5));
    rbf.revenue_share_range = Some((dec!(2), dec!(15)));
    rbf.cap_multiple_range = Some((dec!(1.1), dec!(3.0)));

    vec![
        debt(
            "sba-loan",
            "SBA 7(a) Loan",
            "SBA Loan",
            Conventional,
            Amortizing,
            dec!(6.5),
            120,
            (dec!(5.5), dec!(11)),
            (60, 300),
            "Government-guaranteed bank loan with long amortization and capped rates.",
        ),
        debt(
            "term-loan",
            "Bank Term Loan",
            "Term Loan",
            Conventional,
            Amortizing,
            dec!(8),
            60,
            (dec!(5), dec!(14)),
            (12, 120),
            "Fixed-term commercial loan repaid in level monthly installments.",
        ),
        debt(
            "equipment-financing",
            "Equipment Financing",
            "Equipment",
            Conventional,
            Amortizing,
            dec!(7),
            60,
            (dec!(4), dec!(15)),
            (24, 84),
            "Loan secured by the equipment it purchases, amortized over its useful life.",
        ),
        debt(
            "line-of-credit",
            "Revolving Line of Credit",
            "LOC",
            Conventional,
            InterestOnly,
            dec!(9),
            12,
            (dec!(6), dec!(18)),
            (6, 36),
            "Working-capital facility; interest on the drawn balance, principal due at renewal.",
        ),
        debt(
            "commercial-mortgage",
            "Commercial Mortgage",
            "Mortgage",
            Conventional,
            Amortizing,
            dec!(6.75),
            300,
            (dec!(5), dec!(10)),
            (120, 360),
            "Real-estate secured loan with a long amortization schedule.",
        ),
        debt(
            "venture-debt",
            "Venture Debt",
            "Venture Debt",
            Conventional,
            Amortizing,
            dec!(11),
            36,
            (dec!(8), dec!(15)),
            (18, 48),
            "Growth loan for venture-backed companies, usually paired with warrants.",
        ),
        debt(
            "mezzanine-debt",
            "Mezzanine Debt",
            "Mezzanine",
            Conventional,
            InterestOnly,
            dec!(13),
            60,
            (dec!(10), dec!(20)),
            (36, 96),
            "Subordinated debt paying current interest with principal at maturity.",
        ),
        debt(
            "concessionary-debt",
            "Concessionary Debt",
            "Concessionary",
            Debt,
            Amortizing,
            dec!(3),
            84,
            (dec!(0), dec!(6)),
            (36, 180),
            "Below-market loan from a mission-driven lender.",
        ),
        debt(
            "program-related-investment",
            "Program-Related Investment",
            "PRI",
            Debt,
            Bullet,
            dec!(2),
            84,
            (dec!(0), dec!(5)),
            (36, 120),
            "Foundation loan at a nominal rate with principal returned at the end of the term.",
        ),
        debt(
            "forgivable-loan",
            "Forgivable Loan",
            "Forgivable",
            Debt,
            InterestOnly,
            dec!(1),
            60,
            (dec!(0), dec!(5)),
            (12, 120),
            "Loan modeled at face value; forgiveness milestones are not projected.",
        ),
        debt(
            "convertible-note",
            "Convertible Note",
            "Conv. Note",
            Hybrid,
            Bullet,
            dec!(6),
            24,
            (dec!(2), dec!(10)),
            (12, 48),
            "Short-term debt that accrues interest and repays or converts at maturity.",
        ),
        rbf,
        no_repayment(
            "standard-equity",
            "Equity Investment",
            "Equity",
            Equity,
            "Ownership capital with no scheduled debt service.",
        ),
        no_repayment(
            "stack-grant",
            "Grant",
            "Grant",
            Grant,
            "Non-repayable funding.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let catalog = builtin_stack_instruments();
        let ids: HashSet<&str> = catalog.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_defaults_inside_ranges() {
        for def in builtin_stack_instruments().iter().filter(|d| d.repayment_type.is_fixed_term()) {
            assert!(def.default_rate >= def.rate_range.0 && def.default_rate <= def.rate_range.1, "{}", def.id);
            assert!(
                def.default_term_months >= def.term_range.0 && def.default_term_months <= def.term_range.1,
                "{}",
                def.id
            );
        }
    }

    #[test]
    fn test_equity_and_grant_flags() {
        let catalog = builtin_stack_instruments();
        let equity = find_instrument(&catalog, "standard-equity").unwrap();
        let grant = find_instrument(&catalog, "stack-grant").unwrap();
        assert!(equity.is_equity && !equity.is_debt());
        assert!(grant.is_grant && !grant.is_debt());
        assert!(find_instrument(&catalog, "sba-loan").unwrap().is_debt());
    }

    #[test]
    fn test_unknown_instrument() {
        let catalog = builtin_stack_instruments();
        assert!(matches!(
            find_instrument(&catalog, "nope"),
            Err(CapitalStackError::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_revenue_share_fallbacks() {
        let catalog = builtin_stack_instruments();
        let rbf = find_instrument(&catalog, "revenue-based-financing").unwrap();
        assert_eq!(rbf.revenue_share_or_default(None), dec!(5));
        assert_eq!(rbf.revenue_share_or_default(Some(dec!(8))), dec!(8));
        let term = find_instrument(&catalog, "term-loan").unwrap();
        assert_eq!(term.cap_multiple_or_default(None), FALLBACK_CAP_MULTIPLE);
    }
}
