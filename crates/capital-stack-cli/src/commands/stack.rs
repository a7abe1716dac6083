use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use capital_stack_core::calendar::YearMonth;
use capital_stack_core::schedule::instruments::StackInstrumentDef;
use capital_stack_core::schedule::layer::{CapitalStack, CapitalStackLayer};
use capital_stack_core::schedule::timeline::StackComposition;
use capital_stack_core::schedule::{project_stack, StackProjection, StackProjectionInput};
use capital_stack_core::{ComputationOutput, Money, Percent};

use super::Context;
use crate::input;

/// Arguments for a whole-stack projection
#[derive(Args)]
pub struct StackArgs {
    /// Path to a JSON or YAML stack: a list of layers or {layers, reference, instruments}
    #[arg(long)]
    pub input: Option<String>,

    /// Project the built-in four-layer example stack
    #[arg(long, conflicts_with = "input")]
    pub sample: bool,

    /// Emit every schedule and chart sample instead of the per-layer overview
    #[arg(long)]
    pub full: bool,

    /// Custom stack instrument catalog (JSON or YAML)
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StackDocument {
    Layers(Vec<CapitalStackLayer>),
    Stack {
        layers: Vec<CapitalStackLayer>,
        #[serde(default)]
        reference: Option<YearMonth>,
        #[serde(default)]
        instruments: Option<Vec<StackInstrumentDef>>,
    },
}

#[derive(Serialize)]
struct StackRow {
    instrument: String,
    amount: Money,
    monthly_payment: Money,
    total_interest: Money,
    total_payments: Money,
    periods: usize,
    payoff: String,
}

#[derive(Serialize)]
struct StackOverview {
    total_allocated: Money,
    debt_amount: Money,
    blended_rate: Percent,
    total_monthly_debt_service: Money,
    total_interest: Money,
    total_payments: Money,
    composition: StackComposition,
    window: String,
    rows: Vec<StackRow>,
}

impl From<&StackProjection> for StackOverview {
    fn from(p: &StackProjection) -> Self {
        let rows = p
            .summary
            .layers
            .iter()
            .zip(&p.schedules)
            .map(|(s, ls)| StackRow {
                instrument: s.name.clone(),
                amount: ls.layer.amount,
                monthly_payment: s.monthly_payment.round_dp(2),
                total_interest: s.total_interest.round_dp(2),
                total_payments: s.total_payments.round_dp(2),
                periods: s.periods,
                payoff: s.payoff.map(|ym| ym.label()).unwrap_or_else(|| "-".into()),
            })
            .collect();

        let start = YearMonth::from_index(p.timeline.window.start);
        let end = YearMonth::from_index(p.timeline.window.end);

        Self {
            total_allocated: p.total_allocated,
            debt_amount: p.summary.debt_amount,
            blended_rate: p.summary.blended_rate.round_dp(4),
            total_monthly_debt_service: p.summary.total_monthly_debt_service.round_dp(2),
            total_interest: p.summary.total_interest.round_dp(2),
            total_payments: p.summary.total_payments.round_dp(2),
            composition: p.composition.clone(),
            window: format!("{} – {}", start.label(), end.label()),
            rows,
        }
    }
}

pub fn run_stack(args: StackArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let custom_catalog: Option<Vec<StackInstrumentDef>> = match args.catalog {
        Some(ref path) => Some(input::file::read_document(path)?),
        None => None,
    };

    let mut projection_input = if args.sample {
        StackProjectionInput {
            layers: CapitalStack::sample(ctx.reference).layers,
            reference: ctx.reference,
            instruments: None,
        }
    } else {
        match input::read_input::<StackDocument>(args.input.as_deref())? {
            Some(StackDocument::Layers(layers)) => StackProjectionInput {
                layers,
                reference: ctx.reference,
                instruments: None,
            },
            Some(StackDocument::Stack {
                layers,
                reference,
                instruments,
            }) => StackProjectionInput {
                layers,
                reference: reference.unwrap_or(ctx.reference),
                instruments,
            },
            None => return Err("--input file, piped JSON, or --sample is required".into()),
        }
    };
    if custom_catalog.is_some() {
        projection_input.instruments = custom_catalog;
    }

    let output = project_stack(&projection_input)?;
    if args.full {
        return Ok(serde_json::to_value(output)?);
    }

    let overview = ComputationOutput {
        result: StackOverview::from(&output.result),
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    Ok(serde_json::to_value(overview)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_bare_layer_list() {
        let doc: StackDocument = serde_json::from_str(
            r#"[{"instrument_id":"term-loan","amount":"100000","rate":"8","term_months":36,"start_year":2025,"start_month":1}]"#,
        )
        .unwrap();
        assert!(matches!(doc, StackDocument::Layers(ref l) if l.len() == 1));
    }

    #[test]
    fn accepts_saved_stack_with_selection() {
        let doc: StackDocument = serde_json::from_str(
            r#"{"layers":[],"selected":null,"reference":{"year":2026,"month":3}}"#,
        )
        .unwrap();
        match doc {
            StackDocument::Stack { reference, .. } => {
                assert_eq!(reference, Some(YearMonth::new(2026, 3).unwrap()))
            }
            StackDocument::Layers(_) => panic!("expected a stack document"),
        }
    }

    #[test]
    fn overview_of_sample_stack() {
        let reference = YearMonth::new(2026, 10).unwrap();
        let input = StackProjectionInput {
            layers: CapitalStack::sample(reference).layers,
            reference,
            instruments: None,
        };
        let out = project_stack(&input).unwrap();
        let overview = StackOverview::from(&out.result);
        assert_eq!(overview.rows.len(), 4);
        assert_eq!(overview.total_allocated, dec!(6_350_000));
        assert_eq!(overview.window, "Jul 2022 – Jun 2032");
        assert_eq!(overview.rows[2].payoff, "-");
        assert_eq!(overview.rows[0].amount, dec!(2_000_000));
    }
}
