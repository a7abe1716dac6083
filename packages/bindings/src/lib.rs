use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use capital_stack_core::finder::{self, FinderAnswers, Instrument, RecommendationInput};
use capital_stack_core::schedule::amortization::PaymentScheduleEntry;
use capital_stack_core::schedule::instruments::{
    builtin_stack_instruments, find_instrument, StackInstrumentDef,
};
use capital_stack_core::schedule::layer::CapitalStackLayer;
use capital_stack_core::schedule::summary::{summarize_layer, LayerSummary};
use capital_stack_core::schedule::timeline::LayerSchedule;
use capital_stack_core::schedule::{self, StackProjectionInput};
use capital_stack_core::with_metadata;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LayerScheduleInput {
    layer: CapitalStackLayer,
    #[serde(default)]
    instruments: Option<Vec<StackInstrumentDef>>,
}

#[derive(Serialize)]
struct LayerScheduleOutput {
    summary: LayerSummary,
    schedule: Vec<PaymentScheduleEntry>,
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: LayerScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog = input.instruments.unwrap_or_else(builtin_stack_instruments);
    let def = find_instrument(&catalog, &input.layer.instrument_id).map_err(to_napi_error)?;
    let resolved = LayerSchedule::build(&input.layer, def);

    let output = with_metadata(
        "Monthly payment schedule",
        &input.layer,
        Vec::new(),
        LayerScheduleOutput {
            summary: summarize_layer(&resolved),
            schedule: resolved.schedule,
        },
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_stack(input_json: String) -> NapiResult<String> {
    let input: StackProjectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::project_stack(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn stack_instruments() -> NapiResult<String> {
    serde_json::to_string(&builtin_stack_instruments()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[napi]
pub fn recommend(input_json: String) -> NapiResult<String> {
    let input: RecommendationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finder::recommend(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Ranked results only, without the envelope.
#[napi]
pub fn score_instruments(answers_json: String) -> NapiResult<String> {
    let answers: FinderAnswers = serde_json::from_str(&answers_json).map_err(to_napi_error)?;
    let catalog: Vec<Instrument> = finder::builtin_catalog();
    serde_json::to_string(&finder::score_instruments(&answers, &catalog)).map_err(to_napi_error)
}

#[napi]
pub fn finder_catalog() -> NapiResult<String> {
    serde_json::to_string(&finder::builtin_catalog()).map_err(to_napi_error)
}

#[napi]
pub fn finder_questions() -> NapiResult<String> {
    serde_json::to_string(&finder::QUESTIONS).map_err(to_napi_error)
}
