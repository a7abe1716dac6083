use serde::{Deserialize, Serialize};

use super::answers::*;
use super::catalog::Instrument;
use super::scoring::{score_instruments, ScoredInstrument, Tier};
use super::store::StateStore;
use crate::error::CapitalStackError;
use crate::CapitalStackResult;

/// Store key under which the session is persisted.
pub const STATE_KEY: &str = "cct-finder-state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionId {
    OrgType,
    Stage,
    Revenue,
    CapitalNeed,
    SpeedNeed,
    ComplexityTolerance,
    Network,
    Priorities,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuestionOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub options: &'static [QuestionOption],
    pub multi_select: bool,
}

const fn opt(value: &'static str, label: &'static str, description: &'static str) -> QuestionOption {
    QuestionOption {
        value,
        label,
        description,
    }
}

pub const QUESTIONS: [Question; 8] = [
    Question {
        id: QuestionId::OrgType,
        title: "What kind of organization are you?",
        subtitle: "This helps us filter out options you're not eligible for.",
        options: &[
            opt("llc", "LLC / Other for-profit", "LLC, S-Corp, B-Corp, sole prop, or partnership"),
            opt("c-corp", "C-Corp", "Standard corporation structure"),
            opt("nonprofit", "Nonprofit", "501(c)(3) or equivalent"),
            opt("cooperative", "Cooperative", "Co-op, community land trust, or member-owned"),
            opt("government", "Government / Public entity", "Municipal, state, tribal, or quasi-governmental"),
            opt("not-formed", "Not yet formed", "Pre-incorporation or exploring structures"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::Stage,
        title: "What stage are you at?",
        subtitle: "Different funding works at different points in your journey.",
        options: &[
            opt("idea", "Idea / concept", "Exploring feasibility"),
            opt("rnd", "R&D / prototype", "Building and testing, not yet deployed"),
            opt("pilot", "Pilot / early traction", "First customers or beneficiaries, proving the model"),
            opt("growth", "Growth", "Model works, need funding to expand"),
            opt("scale", "Scaling", "Operating at scale, need major capital to grow further"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::Revenue,
        title: "Do you have revenue?",
        subtitle: "Some options require proof that money is coming in.",
        options: &[
            opt("none", "No revenue yet", "Pre-revenue or fully grant-funded"),
            opt("some", "Some, but not consistent", "Lumpy or early-stage revenue"),
            opt("consistent", "Consistent recurring revenue", "Predictable monthly or annual income"),
            opt("large", "Large, predictable revenue", "Established revenue at significant scale"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::CapitalNeed,
        title: "How much money do you need?",
        subtitle: "Different options work at different scales.",
        options: &[
            opt("under-100k", "Under $100K", "Small grant, seed, or micro-loan range"),
            opt("100k-1m", "$100K – $1M", "Pilot funding or early-stage capital"),
            opt("1m-10m", "$1M – $10M", "Growth capital or mid-size deployment"),
            opt("10m-100m", "$10M – $100M", "Large-scale project or fund-level capital"),
            opt("100m-plus", "$100M+", "Infrastructure-scale or institutional deployment"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::SpeedNeed,
        title: "How quickly do you need the money?",
        subtitle: "Some options close in weeks; others take months to set up.",
        options: &[
            opt("asap", "As fast as possible", "Weeks, not months"),
            opt("few-months", "Within a few months", "1–3 months is a reasonable timeline"),
            opt("6-plus-months", "6+ months is fine", "Planning ahead and able to wait"),
            opt("no-rush", "No rush", "Timeline isn't a deciding factor"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::ComplexityTolerance,
        title: "How much process complexity can you handle?",
        subtitle: "Some options need just an application; others need lawyers and months of structuring.",
        options: &[
            opt("simple", "Keep it simple", "No lawyers on retainer, something straightforward"),
            opt("some", "Some paperwork is fine", "Moderate diligence and documentation is manageable"),
            opt("complex", "My team handles complex deals", "Legal counsel available, experienced with structuring"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::Network,
        title: "Do you have connections in the impact space?",
        subtitle: "Some funding sources require relationships with foundations or impact investors.",
        options: &[
            opt("deep", "Deep connections", "Active relationships with foundations, DFIs, DAF sponsors, or impact investors"),
            opt("some", "Some connections", "Know a few people, have had some conversations"),
            opt("none", "Starting from scratch", "No existing relationships in the impact or philanthropic world"),
        ],
        multi_select: false,
    },
    Question {
        id: QuestionId::Priorities,
        title: "What matters most to you?",
        subtitle: "Select all that apply. This helps rank your results.",
        options: &[
            opt("ownership", "Keep ownership & control", "No equity dilution or board seats given up"),
            opt("lowest-cost", "Cheapest option", "Minimize interest, fees, and total cost"),
            opt("largest-amount", "Largest possible amount", "Maximize how much can be raised"),
            opt("speed", "Speed above all", "Get the money as fast as possible"),
            opt("flexibility", "Flexibility if things go wrong", "Forgiving terms, room to pivot"),
            opt("proven", "Established track record", "Well-known instrument with broad market adoption"),
        ],
        multi_select: true,
    },
];

/// Step index meaning "all questions done, show results".
pub const RESULTS_STEP: usize = QUESTIONS.len();

impl FinderAnswers {
    /// Record a single-choice answer, or toggle a priority.
    pub fn set(&mut self, question: QuestionId, value: &str) -> CapitalStackResult<()> {
        match question {
            QuestionId::OrgType => self.org_type = Some(value.parse()?),
            QuestionId::Stage => self.stage = Some(value.parse()?),
            QuestionId::Revenue => self.revenue = Some(value.parse()?),
            QuestionId::CapitalNeed => self.capital_need = Some(value.parse()?),
            QuestionId::SpeedNeed => self.speed_need = Some(value.parse()?),
            QuestionId::ComplexityTolerance => self.complexity_tolerance = Some(value.parse()?),
            QuestionId::Network => self.network = Some(value.parse()?),
            QuestionId::Priorities => self.toggle_priority(value.parse()?),
        }
        Ok(())
    }

    pub fn is_answered(&self, question: QuestionId) -> bool {
        match question {
            QuestionId::OrgType => self.org_type.is_some(),
            QuestionId::Stage => self.stage.is_some(),
            QuestionId::Revenue => self.revenue.is_some(),
            QuestionId::CapitalNeed => self.capital_need.is_some(),
            QuestionId::SpeedNeed => self.speed_need.is_some(),
            QuestionId::ComplexityTolerance => self.complexity_tolerance.is_some(),
            QuestionId::Network => self.network.is_some(),
            QuestionId::Priorities => !self.priorities.is_empty(),
        }
    }
}

/// Results split by tier, each list keeping rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierGroups {
    pub strong: Vec<ScoredInstrument>,
    pub good: Vec<ScoredInstrument>,
    pub explore: Vec<ScoredInstrument>,
}

pub fn group_by_tier(results: &[ScoredInstrument]) -> TierGroups {
    let mut groups = TierGroups::default();
    for r in results {
        match r.tier {
            Tier::Strong => groups.strong.push(r.clone()),
            Tier::Good => groups.good.push(r.clone()),
            Tier::Explore => groups.explore.push(r.clone()),
        }
    }
    groups
}

/// A questionnaire in progress. Serializes as `{answers, step}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderSession {
    pub answers: FinderAnswers,
    pub step: usize,
}

impl FinderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the saved session. Missing or unreadable state starts fresh.
    pub fn restore(store: &dyn StateStore) -> Self {
        let raw = match store.load(STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "finder state unreadable, starting fresh");
                return Self::new();
            }
        };

        match serde_json::from_str::<FinderSession>(&raw) {
            Ok(mut session) => {
                session.step = session.step.min(RESULTS_STEP);
                tracing::debug!(step = session.step, "restored finder session");
                session
            }
            Err(e) => {
                tracing::warn!(error = %e, "finder state corrupt, starting fresh");
                Self::new()
            }
        }
    }

    /// Save to the store. Failures are logged, never returned.
    pub fn persist(&self, store: &dyn StateStore) {
        let saved = serde_json::to_string(self)
            .map_err(CapitalStackError::from)
            .and_then(|json| store.save(STATE_KEY, &json));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to persist finder state");
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        QUESTIONS.get(self.step)
    }

    pub fn is_complete(&self) -> bool {
        self.step >= RESULTS_STEP
    }

    /// Answer the current question. Single-choice answers advance to the
    /// next step; priorities toggle in place.
    pub fn answer(&mut self, value: &str) -> CapitalStackResult<()> {
        let question = self
            .current_question()
            .ok_or_else(|| CapitalStackError::InvalidInput {
                field: "step".into(),
                reason: "questionnaire is already complete".into(),
            })?;

        self.answers.set(question.id, value)?;
        if !question.multi_select {
            self.next();
        }
        Ok(())
    }

    pub fn toggle_priority(&mut self, priority: Priority) {
        self.answers.toggle_priority(priority);
    }

    pub fn next(&mut self) {
        self.step = (self.step + 1).min(RESULTS_STEP);
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn skip_to_results(&mut self) {
        self.step = RESULTS_STEP;
    }

    /// Clear every answer, return to the first question and drop saved state.
    pub fn start_over(&mut self, store: &dyn StateStore) {
        *self = Self::new();
        if let Err(e) = store.remove(STATE_KEY) {
            tracing::warn!(error = %e, "failed to clear finder state");
        }
    }

    /// Ranked recommendations, empty until the questionnaire is complete.
    pub fn results(&self, catalog: &[Instrument]) -> Vec<ScoredInstrument> {
        if !self.is_complete() {
            return Vec::new();
        }
        score_instruments(&self.answers, catalog)
    }
}
