use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use capital_stack_core::calendar::YearMonth;
use capital_stack_core::schedule::amortization::{hit_safety_cap, PaymentScheduleEntry};
use capital_stack_core::schedule::instruments::{
    builtin_stack_instruments, find_instrument, RepaymentType, StackInstrumentDef,
};
use capital_stack_core::schedule::layer::{CapitalStack, CapitalStackLayer, LayerUpdate};
use capital_stack_core::schedule::summary::{summarize_layer, LayerSummary};
use capital_stack_core::schedule::timeline::LayerSchedule;
use capital_stack_core::with_metadata;

use super::Context;
use crate::input;

/// Arguments for a single-layer payment schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML layer (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Stack instrument id, e.g. sba-loan or revenue-based-financing
    #[arg(long)]
    pub instrument: Option<String>,

    /// Principal amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// First payment month (YYYY-MM); defaults to the reference month
    #[arg(long)]
    pub start: Option<String>,

    /// Monthly revenue (revenue-based layers)
    #[arg(long)]
    pub monthly_revenue: Option<Decimal>,

    /// Share of revenue repaid each month, in percent
    #[arg(long)]
    pub revenue_share: Option<Decimal>,

    /// Repayment cap as a multiple of the amount, e.g. 1.5
    #[arg(long)]
    pub cap: Option<Decimal>,

    /// Custom stack instrument catalog (JSON or YAML)
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Serialize)]
struct ScheduleReport {
    #[serde(flatten)]
    summary: LayerSummary,
    repayment_type: RepaymentType,
    starts: String,
    truncated: bool,
    rows: Vec<PaymentScheduleEntry>,
}

pub fn run_schedule(args: ScheduleArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog: Vec<StackInstrumentDef> = match args.catalog {
        Some(ref path) => input::file::read_document(path)?,
        None => builtin_stack_instruments(),
    };

    let from_document = if args.instrument.is_some() && args.input.is_none() {
        None
    } else {
        input::read_input::<CapitalStackLayer>(args.input.as_deref())?
    };
    let layer = match from_document {
        Some(layer) => layer,
        None => layer_from_flags(&args, &catalog, ctx.reference)?,
    };

    let def = find_instrument(&catalog, &layer.instrument_id)?;
    let resolved = LayerSchedule::build(&layer, def);

    let mut warnings = Vec::new();
    let truncated = hit_safety_cap(&resolved.schedule);
    if truncated {
        warnings.push("Repayment cap not reached within 600 months; schedule truncated".to_string());
    }
    if resolved.schedule.is_empty() && def.is_debt() {
        warnings.push(format!(
            "{} produces no payments with these parameters",
            def.short_name
        ));
    }

    let report = ScheduleReport {
        summary: summarize_layer(&resolved),
        repayment_type: def.repayment_type,
        starts: layer.start().label(),
        truncated,
        rows: resolved.schedule,
    };

    let output = with_metadata(
        "Monthly payment schedule (level annuity, balloon, or revenue share to cap)",
        &layer,
        warnings,
        report,
    );
    Ok(serde_json::to_value(output)?)
}

/// Start from the instrument's defaults and overlay whatever flags were given.
fn layer_from_flags(
    args: &ScheduleArgs,
    catalog: &[StackInstrumentDef],
    reference: YearMonth,
) -> Result<CapitalStackLayer, Box<dyn std::error::Error>> {
    let id = args
        .instrument
        .as_deref()
        .ok_or("--instrument is required (or provide --input)")?;
    let def = find_instrument(catalog, id)?;

    let start = match args.start {
        Some(ref s) => s.parse::<YearMonth>()?,
        None => reference,
    };

    let mut stack = CapitalStack::new();
    let idx = stack.add(def, start);
    stack.update(
        idx,
        &LayerUpdate {
            amount: args.amount,
            rate: args.rate,
            term_months: args.term,
            monthly_revenue: args.monthly_revenue,
            revenue_share_pct: args.revenue_share,
            repayment_cap_x: args.cap,
            ..Default::default()
        },
    )?;
    Ok(stack.remove(idx)?)
}
