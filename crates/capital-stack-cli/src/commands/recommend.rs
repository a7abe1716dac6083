use clap::Args;
use serde::Serialize;
use serde_json::Value;

use capital_stack_core::finder::answers::Priority;
use capital_stack_core::finder::session::QuestionId;
use capital_stack_core::finder::{
    recommend, FileStore, FinderAnswers, FinderSession, Instrument, RecommendationInput,
    RecommendationOutput, ScoredInstrument,
};
use capital_stack_core::ComputationOutput;

use super::Context;
use crate::input;

/// Arguments for ranked instrument recommendations
#[derive(Args)]
pub struct RecommendArgs {
    /// Organization type (nonprofit, c-corp, llc, cooperative, government, not-formed)
    #[arg(long)]
    pub org_type: Option<String>,

    /// Stage (idea, pilot, early, growth, mature)
    #[arg(long)]
    pub stage: Option<String>,

    /// Revenue (none, some, consistent, large)
    #[arg(long)]
    pub revenue: Option<String>,

    /// Capital needed (under-100k, 100k-1m, 1m-10m, 10m-100m, 100m-plus)
    #[arg(long)]
    pub capital_need: Option<String>,

    /// Timeline (asap, few-months, 6-plus-months, no-rush)
    #[arg(long)]
    pub speed: Option<String>,

    /// Complexity tolerance (simple, some, complex)
    #[arg(long)]
    pub complexity: Option<String>,

    /// Funder network (deep, some, none)
    #[arg(long)]
    pub network: Option<String>,

    /// Priority, repeatable (ownership, lowest-cost, largest-amount, speed, flexibility, proven)
    #[arg(long = "priority")]
    pub priorities: Vec<String>,

    /// Path to a JSON or YAML answers document
    #[arg(long)]
    pub input: Option<String>,

    /// Start from the saved questionnaire answers
    #[arg(long)]
    pub resume: bool,

    /// Save the final answers as a completed questionnaire
    #[arg(long)]
    pub save: bool,

    /// Discard the saved questionnaire before scoring
    #[arg(long, conflicts_with = "resume")]
    pub reset: bool,

    /// Only show the first N results
    #[arg(long)]
    pub top: Option<usize>,

    /// Emit the full scored output, including tiers and exclusions
    #[arg(long)]
    pub full: bool,

    /// Custom finder catalog (JSON or YAML)
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Serialize)]
struct RecommendRow {
    rank: usize,
    slug: String,
    name: String,
    score: u32,
    tier: &'static str,
    reasons: String,
}

#[derive(Serialize)]
struct RecommendSummary {
    top_match: Option<String>,
    strong: usize,
    good: usize,
    explore: usize,
    excluded: usize,
    below_threshold: usize,
    rows: Vec<RecommendRow>,
}

impl RecommendSummary {
    fn new(out: &RecommendationOutput, top: Option<usize>) -> Self {
        let shown = top.unwrap_or(out.results.len());
        Self {
            top_match: out.results.first().map(|r| r.name.clone()),
            strong: out.tiers.strong.len(),
            good: out.tiers.good.len(),
            explore: out.tiers.explore.len(),
            excluded: out.excluded.len(),
            below_threshold: out.below_threshold,
            rows: out
                .results
                .iter()
                .take(shown)
                .enumerate()
                .map(|(i, r)| RecommendRow::from_scored(i + 1, r))
                .collect(),
        }
    }
}

impl RecommendRow {
    fn from_scored(rank: usize, r: &ScoredInstrument) -> Self {
        Self {
            rank,
            slug: r.slug.clone(),
            name: r.name.clone(),
            score: r.score,
            tier: r.tier.label(),
            reasons: r.reasons.join("; "),
        }
    }
}

/// Overlay flag values on top of `answers`. Priorities are only ever added.
fn apply_flags(answers: &mut FinderAnswers, args: &RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let single = [
        (QuestionId::OrgType, &args.org_type),
        (QuestionId::Stage, &args.stage),
        (QuestionId::Revenue, &args.revenue),
        (QuestionId::CapitalNeed, &args.capital_need),
        (QuestionId::SpeedNeed, &args.speed),
        (QuestionId::ComplexityTolerance, &args.complexity),
        (QuestionId::Network, &args.network),
    ];
    for (question, value) in single {
        if let Some(v) = value {
            answers.set(question, v)?;
        }
    }
    for raw in &args.priorities {
        let priority: Priority = raw.parse()?;
        if !answers.has_priority(priority) {
            answers.toggle_priority(priority);
        }
    }
    Ok(())
}

pub fn run_recommend(args: RecommendArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::read_input::<FinderAnswers>(args.input.as_deref())?;
    recommend_with(args, document, ctx)
}

fn recommend_with(
    args: RecommendArgs,
    document: Option<FinderAnswers>,
    ctx: &Context,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store = FileStore::new(ctx.config.state_dir.clone());
    if args.reset {
        FinderSession::new().start_over(&store);
    }

    let mut answers = match document {
        Some(doc) => doc,
        None if args.resume => FinderSession::restore(&store).answers,
        None => FinderAnswers::new(),
    };
    apply_flags(&mut answers, &args)?;

    let catalog: Option<Vec<Instrument>> = match args.catalog {
        Some(ref path) => Some(input::file::read_document(path)?),
        None => None,
    };

    let output = recommend(&RecommendationInput {
        answers: answers.clone(),
        catalog,
    })?;

    if args.save {
        let mut session = FinderSession {
            answers,
            ..FinderSession::new()
        };
        session.skip_to_results();
        session.persist(&store);
    }

    if args.full {
        return Ok(serde_json::to_value(output)?);
    }

    let summary = ComputationOutput {
        result: RecommendSummary::new(&output.result, args.top),
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    Ok(serde_json::to_value(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use capital_stack_core::calendar::YearMonth;
    use capital_stack_core::finder::answers::OrgType;
    use capital_stack_core::finder::StateStore;

    fn args() -> RecommendArgs {
        RecommendArgs {
            org_type: None,
            stage: None,
            revenue: None,
            capital_need: None,
            speed: None,
            complexity: None,
            network: None,
            priorities: Vec::new(),
            input: None,
            resume: false,
            save: false,
            reset: false,
            top: None,
            full: false,
            catalog: None,
        }
    }

    fn context(dir: &std::path::Path) -> Context {
        Context {
            config: CliConfig {
                state_dir: dir.to_path_buf(),
                log_filter: "warn".into(),
            },
            reference: YearMonth::new(2026, 10).unwrap(),
        }
    }

    #[test]
    fn flags_fill_answers() {
        let mut a = args();
        a.org_type = Some("c-corp".into());
        a.priorities = vec!["speed".into(), "speed".into(), "proven".into()];
        let mut answers = FinderAnswers::new();
        apply_flags(&mut answers, &a).unwrap();
        assert_eq!(answers.org_type, Some(OrgType::CCorp));
        assert_eq!(answers.priorities, vec![Priority::Speed, Priority::Proven]);
    }

    #[test]
    fn bad_flag_value_is_rejected() {
        let mut a = args();
        a.revenue = Some("heaps".into());
        let mut answers = FinderAnswers::new();
        let err = apply_flags(&mut answers, &a).unwrap_err();
        assert!(err.to_string().contains("heaps"));
    }

    #[test]
    fn summary_respects_top() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.org_type = Some("llc".into());
        a.stage = Some("growth".into());
        a.top = Some(3);
        let value = recommend_with(a, None, &context(dir.path())).unwrap();
        let rows = value["result"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["rank"], 1);
        assert!(value["result"]["top_match"].is_string());
    }

    #[test]
    fn save_writes_completed_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut a = args();
        a.org_type = Some("nonprofit".into());
        a.save = true;
        recommend_with(a, None, &ctx).unwrap();

        let store = FileStore::new(dir.path());
        assert!(store.load(capital_stack_core::finder::STATE_KEY).unwrap().is_some());
        let session = FinderSession::restore(&store);
        assert!(session.is_complete());
        assert_eq!(session.answers.org_type, Some(OrgType::Nonprofit));
    }

    #[test]
    fn reset_drops_saved_answers_before_scoring() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut a = args();
        a.org_type = Some("government".into());
        a.save = true;
        recommend_with(a, None, &ctx).unwrap();

        let mut a = args();
        a.reset = true;
        let value = recommend_with(a, None, &ctx).unwrap();
        assert!(value["assumptions"]["org_type"].is_null());
        let store = FileStore::new(dir.path());
        assert!(store.load(capital_stack_core::finder::STATE_KEY).unwrap().is_none());
    }
}
