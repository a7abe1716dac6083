use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use capital_stack_core::finder::answers::Priority;
use capital_stack_core::finder::session::{Question, RESULTS_STEP};
use capital_stack_core::finder::{
    builtin_catalog, group_by_tier, FileStore, FinderAnswers, FinderSession, StateStore,
    TierGroups, QUESTIONS,
};

use super::Context;

/// Step through the questionnaire one answer at a time. Progress is saved
/// between invocations in the state directory.
#[derive(Args)]
pub struct FinderArgs {
    #[command(subcommand)]
    pub action: FinderAction,
}

#[derive(Subcommand)]
pub enum FinderAction {
    /// Show the current question, or the results once complete
    Status,
    /// Answer the current question (priorities toggle and stay on the step)
    Answer {
        value: String,
    },
    /// Move to the next question
    Next,
    /// Return to the previous question
    Back,
    /// Jump straight to the results
    Skip,
    /// Clear all answers and start over
    Reset,
    /// List every question with its options
    Questions,
}

#[derive(Serialize)]
struct FinderStatus {
    step: usize,
    total_steps: usize,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'static Question>,
    /// Priorities chosen so far while the priorities step is open
    #[serde(skip_serializing_if = "Vec::is_empty")]
    selected: Vec<Priority>,
    answers: FinderAnswers,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<TierGroups>,
}

impl FinderStatus {
    fn of(session: &FinderSession) -> Self {
        let question = session.current_question();
        let selected = match question {
            Some(q) if q.multi_select => session.answers.priorities.clone(),
            _ => Vec::new(),
        };
        let results = session
            .is_complete()
            .then(|| group_by_tier(&session.results(&builtin_catalog())));

        Self {
            step: session.step,
            total_steps: RESULTS_STEP,
            complete: session.is_complete(),
            question,
            selected,
            answers: session.answers.clone(),
            results,
        }
    }
}

pub fn run_finder(args: FinderArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let store = FileStore::new(ctx.config.state_dir.clone());
    let status = step_session(args.action, &store)?;
    Ok(status)
}

fn step_session(
    action: FinderAction,
    store: &dyn StateStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let FinderAction::Questions = action {
        return Ok(serde_json::to_value(QUESTIONS)?);
    }

    let mut session = FinderSession::restore(store);
    match action {
        FinderAction::Status | FinderAction::Questions => {}
        FinderAction::Answer { value } => session.answer(&value)?,
        FinderAction::Next => session.next(),
        FinderAction::Back => session.back(),
        FinderAction::Skip => session.skip_to_results(),
        FinderAction::Reset => session.start_over(store),
    }
    session.persist(store);

    Ok(serde_json::to_value(FinderStatus::of(&session))?)
}
