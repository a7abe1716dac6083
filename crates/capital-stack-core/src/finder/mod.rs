//! Questionnaire-driven instrument recommendations.

/// Declares a closed set of kebab-style wire values with parsing and display.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::CapitalStackError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::error::CapitalStackError::InvalidInput {
                        field: stringify!($name).into(),
                        reason: format!(
                            "'{other}' is not one of: {}",
                            [$($wire),+].join(", ")
                        ),
                    }),
                }
            }
        }
    };
}

pub mod answers;
pub mod catalog;
pub mod scoring;
pub mod session;
pub mod size_range;
pub mod store;
pub mod tables;

pub use answers::FinderAnswers;
pub use catalog::{builtin_catalog, Instrument};
pub use scoring::{score_instruments, ScoredInstrument, Tier};
pub use session::{group_by_tier, FinderSession, TierGroups, QUESTIONS, STATE_KEY};
pub use store::{FileStore, MemoryStore, StateStore};

use serde::{Deserialize, Serialize};

use crate::types::{with_metadata, ComputationOutput};
use crate::CapitalStackResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationInput {
    #[serde(default)]
    pub answers: FinderAnswers,
    /// Instrument catalog; the built-in one when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<Instrument>>,
}

/// An instrument removed by a hard gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedInstrument {
    pub slug: String,
    pub gate: scoring::Gate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutput {
    /// Admitted instruments, highest score first
    pub results: Vec<ScoredInstrument>,
    pub tiers: TierGroups,
    pub excluded: Vec<ExcludedInstrument>,
    /// Eligible instruments scoring under the admission threshold
    pub below_threshold: usize,
    pub considered: usize,
}

/// Score a catalog against a questionnaire, wrapped in the standard envelope.
pub fn recommend(
    input: &RecommendationInput,
) -> CapitalStackResult<ComputationOutput<RecommendationOutput>> {
    let builtin;
    let catalog: &[Instrument] = match &input.catalog {
        Some(c) => c,
        None => {
            builtin = builtin_catalog();
            &builtin
        }
    };

    let excluded: Vec<ExcludedInstrument> = catalog
        .iter()
        .filter_map(|inst| {
            scoring::gate(&input.answers, inst).map(|gate| ExcludedInstrument {
                slug: inst.slug.clone(),
                gate,
            })
        })
        .collect();

    let results = score_instruments(&input.answers, catalog);
    let below_threshold = catalog.len() - excluded.len() - results.len();
    let tiers = group_by_tier(&results);

    let mut warnings = Vec::new();
    if input.answers.is_empty() {
        warnings.push("No questions answered; every factor uses its neutral default".to_string());
    }
    if results.is_empty() {
        warnings.push("No instrument reached the minimum relevance score".to_string());
    }

    tracing::debug!(
        considered = catalog.len(),
        excluded = excluded.len(),
        admitted = results.len(),
        "scored finder catalog"
    );

    let output = RecommendationOutput {
        results,
        tiers,
        excluded,
        below_threshold,
        considered: catalog.len(),
    };

    Ok(with_metadata(
        "Weighted questionnaire scoring (stage, size, speed, complexity, network, priorities)",
        &input.answers,
        warnings,
        output,
    ))
}
