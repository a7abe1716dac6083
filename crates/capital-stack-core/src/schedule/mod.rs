pub mod amortization;
pub mod instruments;
pub mod layer;
pub mod summary;
pub mod timeline;

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::types::*;
use crate::CapitalStackResult;

use amortization::hit_safety_cap;
use instruments::{builtin_stack_instruments, StackInstrumentDef};
use layer::CapitalStackLayer;
use summary::StackSummary;
use timeline::{LayerSchedule, PaymentTimeline, StackComposition};

/// Input for a whole-stack projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackProjectionInput {
    pub layers: Vec<CapitalStackLayer>,
    /// Month used to anchor an empty timeline
    pub reference: YearMonth,
    /// Instrument catalog; the built-in stack catalog when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<StackInstrumentDef>>,
}

/// Schedules, chart series and statistics for a capital stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackProjection {
    pub schedules: Vec<LayerSchedule>,
    pub timeline: PaymentTimeline,
    pub summary: StackSummary,
    pub composition: StackComposition,
    pub total_allocated: Money,
}

/// Project every layer of a capital stack onto a shared timeline.
pub fn project_stack(
    input: &StackProjectionInput,
) -> CapitalStackResult<ComputationOutput<StackProjection>> {
    let builtin;
    let catalog: &[StackInstrumentDef] = match &input.instruments {
        Some(defs) => defs,
        None => {
            builtin = builtin_stack_instruments();
            &builtin
        }
    };

    let schedules = timeline::resolve_schedules(&input.layers, catalog)?;

    let mut warnings: Vec<String> = Vec::new();
    for (idx, ls) in schedules.iter().enumerate() {
        if hit_safety_cap(&ls.schedule) {
            warnings.push(format!(
                "Layer {idx} ({}): repayment cap not reached within {} months; schedule truncated",
                ls.layer.instrument_id,
                amortization::MAX_REVENUE_BASED_PERIODS
            ));
        }
        if ls.def.is_debt() && ls.schedule.is_empty() {
            warnings.push(format!(
                "Layer {idx} ({}): no payments scheduled; check amount, term and revenue inputs",
                ls.layer.instrument_id
            ));
        }
    }

    let timeline = timeline::build_timeline(&schedules, input.reference);
    let summary = summary::summarize(&schedules);
    let composition = StackComposition::of_stack(&schedules);
    let total_allocated = saturating_sum(input.layers.iter().map(|l| l.amount));

    tracing::debug!(
        layers = schedules.len(),
        samples = timeline.points.len(),
        blended_rate = %summary.blended_rate,
        "projected capital stack"
    );

    let output = StackProjection {
        schedules,
        timeline,
        summary,
        composition,
        total_allocated,
    };

    Ok(with_metadata(
        "Capital Stack Projection (monthly schedules on a shared month axis)",
        &serde_json::json!({
            "layers": input.layers.len(),
            "reference": input.reference.to_string(),
            "catalog": if input.instruments.is_some() { "custom" } else { "builtin" },
        }),
        warnings,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapitalStackError;
    use layer::CapitalStack;
    use rust_decimal_macros::dec;

    fn reference() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    #[test]
    fn test_project_sample_stack() {
        let input = StackProjectionInput {
            layers: CapitalStack::sample(reference()).layers,
            reference: reference(),
            instruments: None,
        };
        let output = project_stack(&input).unwrap();
        assert!(output.warnings.is_empty());
        assert_eq!(output.result.schedules.len(), 4);
        assert_eq!(output.result.total_allocated, dec!(6_350_000));
        assert_eq!(output.result.composition.equity, dec!(2_500_000));
    }

    #[test]
    fn test_unknown_instrument_is_error() {
        let mut layers = CapitalStack::sample(reference()).layers;
        layers[0].instrument_id = "magic-money".into();
        let input = StackProjectionInput {
            layers,
            reference: reference(),
            instruments: None,
        };
        assert!(matches!(
            project_stack(&input),
            Err(CapitalStackError::UnknownInstrument(id)) if id == "magic-money"
        ));
    }

    #[test]
    fn test_truncation_warning() {
        let catalog = builtin_stack_instruments();
        let def = instruments::find_instrument(&catalog, "revenue-based-financing").unwrap();
        let mut layer = CapitalStackLayer::with_defaults(def, reference());
        layer.amount = dec!(1_000_000);
        layer.monthly_revenue = Some(dec!(10));
        layer.revenue_share_pct = Some(dec!(0.001));
        let input = StackProjectionInput {
            layers: vec![layer],
            reference: reference(),
            instruments: None,
        };
        let output = project_stack(&input).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("truncated"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let input = StackProjectionInput {
            layers: CapitalStack::sample(reference()).layers,
            reference: reference(),
            instruments: None,
        };
        let a = serde_json::to_string(&project_stack(&input).unwrap()).unwrap();
        let b = serde_json::to_string(&project_stack(&input).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
