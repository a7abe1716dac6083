use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::answers::{
    ComplexityTolerance, FinderAnswers, NetworkLevel, OrgType, Priority, RevenueLevel, SpeedNeed,
};
use super::catalog::{Complexity, Instrument, Speed, Terms};
use super::size_range::{parse_size_range, size_match};
use super::tables::{self, NetworkClass};
use crate::types::Category;

/// Raw score an instrument needs to appear in results at all.
pub const ADMISSION_THRESHOLD: i32 = 30;
/// Ceiling on the displayed score.
pub const MAX_DISPLAY_SCORE: i32 = 100;
pub const MAX_REASONS: usize = 3;
/// Deducted from debt and hybrid instruments when revenue is inconsistent.
pub const REVENUE_PENALTY: u32 = 3;

const NEUTRAL_STAGE: u32 = 10;
const NEUTRAL_SIZE: u32 = 8;
const NEUTRAL_SPEED: u32 = 8;
const NEUTRAL_COMPLEXITY: u32 = 5;
const NEUTRAL_NETWORK: u32 = 5;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Strong,
    Good,
    Explore,
}

impl Tier {
    pub fn from_score(score: i32) -> Self {
        if score >= 70 {
            Tier::Strong
        } else if score >= 50 {
            Tier::Good
        } else {
            Tier::Explore
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Strong => "Strong match",
            Tier::Good => "Good match",
            Tier::Explore => "Worth exploring",
        }
    }
}

/// Points contributed by each factor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub stage: u32,
    pub size: u32,
    pub speed: u32,
    pub complexity: u32,
    pub network: u32,
    pub priorities: u32,
    pub revenue_penalty: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        let gained = self.stage + self.size + self.speed + self.complexity + self.network
            + self.priorities;
        gained as i32 - self.revenue_penalty as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredInstrument {
    pub slug: String,
    pub name: String,
    pub category: Category,
    /// Display score, capped at 100
    pub score: u32,
    /// Uncapped score used for admission and tiering
    pub raw_score: i32,
    pub reasons: Vec<String>,
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
}

/// Why an instrument was removed before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "gate", content = "org_type")]
pub enum Gate {
    OrgType(OrgType),
    RequiresRevenue,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Hard eligibility check. `Some` removes the instrument from consideration.
pub fn gate(answers: &FinderAnswers, inst: &Instrument) -> Option<Gate> {
    if let Some(org) = answers.org_type {
        if !tables::is_eligible(org, &inst.slug) {
            return Some(Gate::OrgType(org));
        }
    }
    if answers.revenue == Some(RevenueLevel::None)
        && tables::REQUIRES_REVENUE.contains(&inst.slug.as_str())
    {
        return Some(Gate::RequiresRevenue);
    }
    None
}

/// Score one instrument, ignoring eligibility gates.
pub fn score_instrument(answers: &FinderAnswers, inst: &Instrument) -> ScoredInstrument {
    let mut reasons = Vec::new();
    let mut breakdown = ScoreBreakdown::default();

    breakdown.stage = match answers.stage {
        Some(stage) => {
            let points = tables::stage_affinity(stage, &inst.slug);
            if points >= 15 {
                reasons.push(format!("Well-suited for {} organizations", stage.label()));
            }
            points
        }
        None => NEUTRAL_STAGE,
    };

    breakdown.size = match answers.capital_need {
        Some(need) => {
            let points = size_match(need.bracket(), parse_size_range(&inst.typical_size));
            if points >= 10 {
                reasons.push(format!(
                    "Typical size range includes your {} need",
                    need.label()
                ));
            }
            points
        }
        None => NEUTRAL_SIZE,
    };

    breakdown.speed = match answers.speed_need {
        Some(SpeedNeed::NoRush) => 15,
        Some(need) => {
            let points = speed_points(inst.speed, need);
            if points >= 12 {
                reasons.push(format!(
                    "Available in {}, matching your timeline",
                    inst.speed.label()
                ));
            }
            points
        }
        None => NEUTRAL_SPEED,
    };

    breakdown.complexity = match answers.complexity_tolerance {
        Some(tolerance) => {
            if inst.complexity == Complexity::Low && tolerance == ComplexityTolerance::Simple {
                reasons.push("Low complexity — straightforward to access".to_string());
            }
            complexity_points(inst.complexity, tolerance)
        }
        None => NEUTRAL_COMPLEXITY,
    };

    breakdown.network = match answers.network {
        Some(level) => {
            let class = tables::network_class(&inst.slug);
            match (class, level) {
                (NetworkClass::High, NetworkLevel::Deep) => {
                    reasons.push("Leverages your impact ecosystem connections".to_string())
                }
                (NetworkClass::Low, NetworkLevel::None) => {
                    reasons.push("Accessible without philanthropic connections".to_string())
                }
                _ => {}
            }
            network_points(class, level)
        }
        None => NEUTRAL_NETWORK,
    };

    if !answers.priorities.is_empty() {
        breakdown.priorities = priority_boost(inst, &answers.priorities);

        if answers.has_priority(Priority::Ownership) && is_non_dilutive(inst) {
            reasons.push("Non-dilutive — you keep full ownership and control".to_string());
        }
        if answers.has_priority(Priority::LowestCost) && inst.cost_range.starts_with('0') {
            reasons.push(format!("Zero or minimal cost ({})", inst.cost_range));
        }
        if answers.has_priority(Priority::Flexibility) && has_flexible_terms(inst) {
            reasons.push("Flexible terms with room for adjustment".to_string());
        }
    }

    if answers.revenue == Some(RevenueLevel::Some)
        && matches!(inst.category, Category::Debt | Category::Hybrid)
        && inst.slug != "forgivable-loan"
    {
        breakdown.revenue_penalty = REVENUE_PENALTY;
    }

    let raw_score = breakdown.total();
    reasons.truncate(MAX_REASONS);

    ScoredInstrument {
        slug: inst.slug.clone(),
        name: inst.name.clone(),
        category: inst.category,
        score: raw_score.clamp(0, MAX_DISPLAY_SCORE) as u32,
        raw_score,
        reasons,
        tier: Tier::from_score(raw_score),
        breakdown,
    }
}

/// Rank every eligible instrument whose raw score reaches the admission
/// threshold, highest display score first. Ties keep catalog order.
pub fn score_instruments(answers: &FinderAnswers, catalog: &[Instrument]) -> Vec<ScoredInstrument> {
    let mut results: Vec<ScoredInstrument> = catalog
        .iter()
        .filter(|inst| gate(answers, inst).is_none())
        .map(|inst| score_instrument(answers, inst))
        .filter(|scored| scored.raw_score >= ADMISSION_THRESHOLD)
        .collect();

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Additive bonus for each selected priority.
pub fn priority_boost(inst: &Instrument, priorities: &[Priority]) -> u32 {
    priorities
        .iter()
        .map(|p| match p {
            Priority::Ownership => ownership_boost(inst),
            Priority::LowestCost => {
                if inst.cost_range.starts_with('0') {
                    8
                } else if inst.financial_return.expected <= Decimal::ZERO {
                    6
                } else {
                    2
                }
            }
            Priority::LargestAmount => {
                let max = parse_size_range(&inst.typical_size).max;
                if max >= dec!(1_000_000_000) {
                    8
                } else if max >= dec!(100_000_000) {
                    6
                } else if max >= dec!(10_000_000) {
                    3
                } else {
                    0
                }
            }
            Priority::Speed => match inst.speed {
                Speed::Weeks => 8,
                Speed::OneToThreeMonths => 5,
                _ => 0,
            },
            Priority::Flexibility => {
                if has_flexible_terms(inst) {
                    8
                } else if inst.category == Category::Grant {
                    6
                } else {
                    0
                }
            }
            Priority::Proven => {
                if matches!(inst.terms, Terms::Government | Terms::Conventional)
                    || inst.category == Category::Guarantee
                {
                    8
                } else if inst.deal_count >= 3 {
                    6
                } else {
                    3
                }
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Factor helpers
// ---------------------------------------------------------------------------

fn speed_points(speed: Speed, need: SpeedNeed) -> u32 {
    match (speed.ordinal() - need.ordinal()).abs() {
        0 => 15,
        1 => 9,
        2 => 3,
        _ => 0,
    }
}

fn complexity_points(complexity: Complexity, tolerance: ComplexityTolerance) -> u32 {
    if tolerance == ComplexityTolerance::Complex {
        return 10;
    }
    match complexity.ordinal() - tolerance.ordinal() {
        d if d <= 0 => 10,
        1 => 5,
        _ => 0,
    }
}

fn network_points(class: NetworkClass, level: NetworkLevel) -> u32 {
    match (class, level) {
        (NetworkClass::High, NetworkLevel::Deep) => 10,
        (NetworkClass::High, NetworkLevel::Some) => 5,
        (NetworkClass::High, NetworkLevel::None) => 0,
        (NetworkClass::Low, _) => 10,
        (NetworkClass::Unclassified, NetworkLevel::Deep) => 8,
        (NetworkClass::Unclassified, NetworkLevel::Some) => 6,
        (NetworkClass::Unclassified, NetworkLevel::None) => 4,
    }
}

fn is_dilutive_conventional(inst: &Instrument) -> bool {
    tables::DILUTIVE_CONVENTIONAL.contains(&inst.slug.as_str())
}

fn ownership_boost(inst: &Instrument) -> u32 {
    if inst.category == Category::Equity || is_dilutive_conventional(inst) {
        0
    } else if inst.terms == Terms::Conventional {
        8
    } else if matches!(
        inst.category,
        Category::Grant | Category::Debt | Category::Guarantee
    ) && inst.slug != "convertible-note"
    {
        8
    } else if inst.category == Category::Hybrid || inst.slug == "convertible-note" {
        4
    } else {
        0
    }
}

fn is_non_dilutive(inst: &Instrument) -> bool {
    if is_dilutive_conventional(inst) {
        false
    } else if inst.terms == Terms::Conventional {
        true
    } else {
        matches!(
            inst.category,
            Category::Grant | Category::Debt | Category::Guarantee
        ) && inst.slug != "convertible-note"
    }
}

fn has_flexible_terms(inst: &Instrument) -> bool {
    inst.has_feature("flexible") || inst.has_feature("risk-tolerant")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::answers::{CapitalNeed, OrgStage};
    use crate::finder::catalog::{builtin_catalog, find_by_slug};

    fn inst(slug: &str) -> Instrument {
        find_by_slug(&builtin_catalog(), slug).unwrap().clone()
    }

    fn growth_llc() -> FinderAnswers {
        FinderAnswers {
            org_type: Some(OrgType::Llc),
            stage: Some(OrgStage::Growth),
            revenue: Some(RevenueLevel::Consistent),
            capital_need: Some(CapitalNeed::From1mTo10m),
            speed_need: Some(SpeedNeed::Asap),
            complexity_tolerance: Some(ComplexityTolerance::Simple),
            network: Some(NetworkLevel::None),
            priorities: vec![Priority::Ownership],
        }
    }

    #[test]
    fn test_term_loan_full_breakdown() {
        let scored = score_instrument(&growth_llc(), &inst("term-loan"));
        assert_eq!(
            scored.breakdown,
            ScoreBreakdown {
                stage: 18,
                size: 15,
                speed: 9,
                complexity: 5,
                network: 10,
                priorities: 8,
                revenue_penalty: 0,
            }
        );
        assert_eq!(scored.score, 65);
        assert_eq!(scored.tier, Tier::Good);
        assert_eq!(
            scored.reasons,
            vec![
                "Well-suited for growth-stage organizations",
                "Typical size range includes your $1M–$10M need",
                "Accessible without philanthropic connections",
            ]
        );
    }

    #[test]
    fn test_unanswered_uses_neutral_defaults() {
        let scored = score_instrument(&FinderAnswers::new(), &inst("pure-grant"));
        assert_eq!(scored.raw_score, 36);
        assert!(scored.reasons.is_empty());
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_score(70), Tier::Strong);
        assert_eq!(Tier::from_score(69), Tier::Good);
        assert_eq!(Tier::from_score(50), Tier::Good);
        assert_eq!(Tier::from_score(49), Tier::Explore);
    }

    #[test]
    fn test_no_rush_always_full_speed_without_reason() {
        let answers = FinderAnswers {
            speed_need: Some(SpeedNeed::NoRush),
            ..Default::default()
        };
        let scored = score_instrument(&answers, &inst("doe-lpo"));
        assert_eq!(scored.breakdown.speed, 15);
        assert!(scored.reasons.is_empty());
    }

    #[test]
    fn test_complex_tolerance_absorbs_anything() {
        assert_eq!(complexity_points(Complexity::High, ComplexityTolerance::Complex), 10);
        assert_eq!(complexity_points(Complexity::High, ComplexityTolerance::Some), 5);
        assert_eq!(complexity_points(Complexity::High, ComplexityTolerance::Simple), 0);
        assert_eq!(complexity_points(Complexity::Low, ComplexityTolerance::Some), 10);
    }

    #[test]
    fn test_ownership_boost_by_dilution() {
        assert_eq!(ownership_boost(&inst("vc-equity")), 0);
        assert_eq!(ownership_boost(&inst("patient-equity")), 0);
        assert_eq!(ownership_boost(&inst("mezzanine-debt")), 8);
        assert_eq!(ownership_boost(&inst("pure-grant")), 8);
        assert_eq!(ownership_boost(&inst("convertible-note")), 4);
        assert_eq!(ownership_boost(&inst("tiered-fund")), 4);
    }

    #[test]
    fn test_priority_boost_accumulates() {
        let all = Priority::ALL;
        // 0% cost, $100M ceiling, 3-6 months, risk-tolerant, 3 deals
        assert_eq!(priority_boost(&inst("pure-grant"), all), 8 + 8 + 6 + 0 + 8 + 6);
        // conventional, not free, $5M ceiling, weeks, flexible, conventional
        assert_eq!(priority_boost(&inst("line-of-credit"), all), 8 + 2 + 0 + 8 + 8 + 8);
    }

    #[test]
    fn test_revenue_penalty_spares_forgivable_loans() {
        let answers = FinderAnswers {
            revenue: Some(RevenueLevel::Some),
            ..Default::default()
        };
        assert_eq!(score_instrument(&answers, &inst("term-loan")).breakdown.revenue_penalty, 3);
        assert_eq!(
            score_instrument(&answers, &inst("revenue-based-financing")).breakdown.revenue_penalty,
            3
        );
        assert_eq!(
            score_instrument(&answers, &inst("forgivable-loan")).breakdown.revenue_penalty,
            0
        );
        assert_eq!(score_instrument(&answers, &inst("pure-grant")).breakdown.revenue_penalty, 0);
    }

    #[test]
    fn test_reasons_capped_at_three() {
        let answers = FinderAnswers {
            stage: Some(OrgStage::Growth),
            capital_need: Some(CapitalNeed::From1mTo10m),
            speed_need: Some(SpeedNeed::Asap),
            complexity_tolerance: Some(ComplexityTolerance::Simple),
            network: Some(NetworkLevel::None),
            priorities: vec![Priority::Ownership, Priority::Flexibility],
            ..Default::default()
        };
        let scored = score_instrument(&answers, &inst("revenue-based-financing"));
        assert_eq!(scored.reasons.len(), MAX_REASONS);
        assert_eq!(scored.reasons[0], "Well-suited for growth-stage organizations");
    }

    #[test]
    fn test_gates() {
        let answers = FinderAnswers {
            org_type: Some(OrgType::Government),
            revenue: Some(RevenueLevel::None),
            ..Default::default()
        };
        assert_eq!(
            gate(&answers, &inst("sba-loan")),
            Some(Gate::OrgType(OrgType::Government))
        );
        assert_eq!(gate(&answers, &inst("invoice-factoring")), Some(Gate::RequiresRevenue));
        assert_eq!(gate(&answers, &inst("doe-lpo")), None);
    }

    #[test]
    fn test_display_score_capped() {
        let answers = FinderAnswers {
            stage: Some(OrgStage::Growth),
            capital_need: Some(CapitalNeed::From100kTo1m),
            speed_need: Some(SpeedNeed::Asap),
            complexity_tolerance: Some(ComplexityTolerance::Complex),
            network: Some(NetworkLevel::Deep),
            priorities: Priority::ALL.to_vec(),
            ..Default::default()
        };
        let mut jumbo = inst("line-of-credit");
        jumbo.typical_size = "$10K - $5B".into();
        let scored = score_instrument(&answers, &jumbo);
        assert_eq!(scored.raw_score, 108);
        assert_eq!(scored.score, 100);
        assert_eq!(scored.tier, Tier::Strong);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let results = score_instruments(&FinderAnswers::new(), &builtin_catalog());
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        // Everything ties at the neutral 36, so catalog order survives
        assert_eq!(results.len(), 35);
        assert_eq!(results[0].slug, "pure-grant");
        assert_eq!(results[34].slug, "project-finance");
    }
}
