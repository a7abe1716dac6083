//! Static lookup tables consulted by the scorer.
//!
//! All instrument references are by slug. Slugs absent from a table take the
//! table's documented default, so a custom catalog never breaks scoring.

use super::answers::{OrgStage, OrgType};

/// Instruments an organization type may not use. Every other pairing is eligible.
pub fn ineligible_for(org: OrgType) -> &'static [&'static str] {
    match org {
        OrgType::Nonprofit => &[
            "revenue-based-financing",
            "convertible-note",
            "political-risk-insurance",
            "concessionary-equity",
            "first-loss-equity",
            "patient-equity",
            "anchor-commitment",
            "offtake-backed-financing",
            "doe-lpo",
            "ira-tax-credits",
            "term-loan",
            "sba-loan",
            "venture-debt",
            "mezzanine-debt",
            "vc-equity",
            "angel-seed",
            "project-finance",
        ],
        OrgType::CCorp | OrgType::Llc => &[],
        OrgType::Cooperative => &[
            "convertible-note",
            "political-risk-insurance",
            "concessionary-equity",
            "first-loss-equity",
            "patient-equity",
            "anchor-commitment",
            "doe-lpo",
            "ira-tax-credits",
            "venture-debt",
            "mezzanine-debt",
            "vc-equity",
            "angel-seed",
            "project-finance",
        ],
        OrgType::Government => &[
            "recoverable-grant",
            "first-loss-debt",
            "program-related-investment",
            "revenue-based-financing",
            "convertible-note",
            "concessionary-equity",
            "first-loss-equity",
            "patient-equity",
            "anchor-commitment",
            "tiered-fund",
            "term-loan",
            "sba-loan",
            "line-of-credit",
            "venture-debt",
            "mezzanine-debt",
            "vc-equity",
            "angel-seed",
            "crowdfunding",
        ],
        // Only pure-grant, technical-assistance, angel-seed and crowdfunding remain
        OrgType::NotFormed => &[
            "recoverable-grant",
            "forgivable-loan",
            "concessionary-debt",
            "first-loss-debt",
            "program-related-investment",
            "revenue-based-financing",
            "convertible-note",
            "loan-guarantee",
            "first-loss-guarantee",
            "performance-guarantee",
            "political-risk-insurance",
            "concessionary-equity",
            "first-loss-equity",
            "patient-equity",
            "anchor-commitment",
            "tiered-fund",
            "pay-for-success",
            "offtake-backed-financing",
            "doe-lpo",
            "ira-tax-credits",
            "oced-grants",
            "term-loan",
            "sba-loan",
            "equipment-financing",
            "line-of-credit",
            "commercial-mortgage",
            "venture-debt",
            "mezzanine-debt",
            "vc-equity",
            "invoice-factoring",
            "project-finance",
        ],
    }
}

pub fn is_eligible(org: OrgType, slug: &str) -> bool {
    !ineligible_for(org).contains(&slug)
}

/// Instruments that need demonstrable revenue.
pub const REQUIRES_REVENUE: &[&str] = &[
    "revenue-based-financing",
    "term-loan",
    "sba-loan",
    "line-of-credit",
    "venture-debt",
    "mezzanine-debt",
    "invoice-factoring",
];

/// Conventional instruments that give up ownership.
pub const DILUTIVE_CONVENTIONAL: &[&str] = &["vc-equity", "angel-seed", "crowdfunding"];

/// Stage affinity score for a slug absent from the stage's table.
pub const DEFAULT_STAGE_AFFINITY: u32 = 5;

/// Stage affinity (0-20) per slug.
pub fn stage_table(stage: OrgStage) -> &'static [(&'static str, u32)] {
    match stage {
        OrgStage::Idea => &[
            ("pure-grant", 20),
            ("technical-assistance", 20),
            ("recoverable-grant", 12),
            ("oced-grants", 10),
            ("forgivable-loan", 5),
            ("angel-seed", 15),
            ("crowdfunding", 12),
        ],
        OrgStage::Rnd => &[
            ("pure-grant", 20),
            ("recoverable-grant", 18),
            ("technical-assistance", 18),
            ("oced-grants", 15),
            ("forgivable-loan", 12),
            ("convertible-note", 8),
            ("program-related-investment", 8),
            ("angel-seed", 12),
            ("crowdfunding", 8),
        ],
        OrgStage::Pilot => &[
            ("recoverable-grant", 20),
            ("forgivable-loan", 18),
            ("pure-grant", 15),
            ("convertible-note", 15),
            ("technical-assistance", 15),
            ("concessionary-debt", 12),
            ("program-related-investment", 12),
            ("revenue-based-financing", 10),
            ("loan-guarantee", 8),
            ("angel-seed", 14),
            ("crowdfunding", 12),
            ("equipment-financing", 8),
            ("invoice-factoring", 6),
            ("line-of-credit", 6),
        ],
        OrgStage::Growth => &[
            ("concessionary-debt", 20),
            ("revenue-based-financing", 20),
            ("loan-guarantee", 18),
            ("first-loss-debt", 15),
            ("program-related-investment", 15),
            ("forgivable-loan", 15),
            ("ira-tax-credits", 15),
            ("concessionary-equity", 14),
            ("convertible-note", 12),
            ("patient-equity", 12),
            ("performance-guarantee", 12),
            ("tiered-fund", 10),
            ("pay-for-success", 10),
            ("offtake-backed-financing", 10),
            ("term-loan", 18),
            ("sba-loan", 18),
            ("line-of-credit", 16),
            ("venture-debt", 16),
            ("equipment-financing", 15),
            ("invoice-factoring", 15),
            ("vc-equity", 12),
            ("commercial-mortgage", 10),
            ("mezzanine-debt", 10),
            ("crowdfunding", 8),
            ("angel-seed", 8),
        ],
        OrgStage::Scale => &[
            ("tiered-fund", 20),
            ("doe-lpo", 20),
            ("offtake-backed-financing", 20),
            ("anchor-commitment", 18),
            ("patient-equity", 18),
            ("ira-tax-credits", 18),
            ("first-loss-equity", 15),
            ("first-loss-guarantee", 15),
            ("political-risk-insurance", 15),
            ("concessionary-equity", 14),
            ("loan-guarantee", 12),
            ("concessionary-debt", 12),
            ("oced-grants", 12),
            ("performance-guarantee", 12),
            ("first-loss-debt", 10),
            ("pay-for-success", 10),
            ("revenue-based-financing", 8),
            ("project-finance", 20),
            ("commercial-mortgage", 18),
            ("mezzanine-debt", 18),
            ("vc-equity", 15),
            ("venture-debt", 14),
            ("term-loan", 12),
            ("line-of-credit", 12),
            ("equipment-financing", 10),
            ("invoice-factoring", 10),
            ("sba-loan", 8),
        ],
    }
}

pub fn stage_affinity(stage: OrgStage, slug: &str) -> u32 {
    stage_table(stage)
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, points)| *points)
        .unwrap_or(DEFAULT_STAGE_AFFINITY)
}

/// Instruments that rely on philanthropic or impact ecosystem access.
pub const HIGH_NETWORK: &[&str] = &[
    "recoverable-grant",
    "program-related-investment",
    "concessionary-equity",
    "first-loss-equity",
    "first-loss-debt",
    "anchor-commitment",
    "first-loss-guarantee",
    "patient-equity",
    "pay-for-success",
    "tiered-fund",
];

/// Instruments reachable through ordinary commercial or public channels.
pub const LOW_NETWORK: &[&str] = &[
    "revenue-based-financing",
    "convertible-note",
    "doe-lpo",
    "ira-tax-credits",
    "oced-grants",
    "performance-guarantee",
    "political-risk-insurance",
    "loan-guarantee",
    "offtake-backed-financing",
    "term-loan",
    "sba-loan",
    "equipment-financing",
    "line-of-credit",
    "commercial-mortgage",
    "venture-debt",
    "mezzanine-debt",
    "vc-equity",
    "angel-seed",
    "crowdfunding",
    "invoice-factoring",
    "project-finance",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
    High,
    Low,
    Unclassified,
}

pub fn network_class(slug: &str) -> NetworkClass {
    if HIGH_NETWORK.contains(&slug) {
        NetworkClass::High
    } else if LOW_NETWORK.contains(&slug) {
        NetworkClass::Low
    } else {
        NetworkClass::Unclassified
    }
}
