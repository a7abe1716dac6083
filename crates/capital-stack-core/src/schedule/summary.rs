use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::schedule::timeline::LayerSchedule;
use crate::types::*;

/// Headline numbers for one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub instrument_id: String,
    pub name: String,
    /// First month's total payment
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payments: Money,
    pub periods: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff: Option<YearMonth>,
    pub is_debt: bool,
}

/// Aggregates across the whole stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSummary {
    pub layers: Vec<LayerSummary>,
    pub total_interest: Money,
    pub total_payments: Money,
    /// Sum of first-month payments over debt layers
    pub total_monthly_debt_service: Money,
    /// Principal-weighted average rate over debt layers, in percent
    pub blended_rate: Percent,
    pub debt_amount: Money,
}

pub fn summarize_layer(ls: &LayerSchedule) -> LayerSummary {
    let total_interest = saturating_sum(ls.schedule.iter().map(|e| e.interest));
    let total_payments = saturating_sum(ls.schedule.iter().map(|e| e.total));
    let monthly_payment = ls.schedule.first().map_or(Decimal::ZERO, |e| e.total);

    LayerSummary {
        instrument_id: ls.layer.instrument_id.clone(),
        name: ls.def.short_name.clone(),
        monthly_payment,
        total_interest,
        total_payments,
        periods: ls.schedule.len(),
        payoff: ls.end_index().map(YearMonth::from_index),
        is_debt: ls.def.is_debt(),
    }
}

/// Blended cost of capital: `Σ(rate × amount) / Σ(amount)` over debt layers.
pub fn blended_rate(schedules: &[LayerSchedule]) -> Percent {
    let debt: Vec<&LayerSchedule> = schedules.iter().filter(|ls| ls.def.is_debt()).collect();
    let debt_amount = saturating_sum(debt.iter().map(|ls| ls.layer.amount));
    if debt_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let weighted = saturating_sum(
        debt.iter()
            .map(|ls| ls.layer.rate.saturating_mul(ls.layer.amount)),
    );
    weighted / debt_amount
}

pub fn summarize(schedules: &[LayerSchedule]) -> StackSummary {
    let layers: Vec<LayerSummary> = schedules.iter().map(summarize_layer).collect();

    let total_interest = saturating_sum(layers.iter().map(|l| l.total_interest));
    let total_payments = saturating_sum(layers.iter().map(|l| l.total_payments));
    let total_monthly_debt_service = saturating_sum(
        layers
            .iter()
            .filter(|l| l.is_debt)
            .map(|l| l.monthly_payment),
    );
    let debt_amount = saturating_sum(
        schedules
            .iter()
            .filter(|ls| ls.def.is_debt())
            .map(|ls| ls.layer.amount),
    );

    StackSummary {
        layers,
        total_interest,
        total_payments,
        total_monthly_debt_service,
        blended_rate: blended_rate(schedules),
        debt_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::instruments::builtin_stack_instruments;
    use crate::schedule::layer::CapitalStack;
    use crate::schedule::timeline::resolve_schedules;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<LayerSchedule> {
        let stack = CapitalStack::sample(YearMonth::new(2026, 10).unwrap());
        resolve_schedules(&stack.layers, &builtin_stack_instruments()).unwrap()
    }

    #[test]
    fn test_blended_rate_excludes_equity_and_grants() {
        // (6.5 * 2M + 7.0 * 1.5M) / 3.5M
        let expected = (dec!(6.5) * dec!(2_000_000) + dec!(7.0) * dec!(1_500_000)) / dec!(3_500_000);
        assert_eq!(blended_rate(&sample()), expected);
    }

    #[test]
    fn test_blended_rate_no_debt() {
        let schedules: Vec<LayerSchedule> = sample().into_iter().filter(|ls| !ls.def.is_debt()).collect();
        assert_eq!(blended_rate(&schedules), Decimal::ZERO);
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(&sample());
        assert_eq!(summary.layers.len(), 4);
        assert_eq!(summary.debt_amount, dec!(3_500_000));

        let sba = &summary.layers[0];
        let equipment = &summary.layers[1];
        assert_eq!(sba.periods, 120);
        assert_eq!(sba.payoff, Some(YearMonth::new(2032, 6).unwrap()));
        assert_eq!(
            summary.total_monthly_debt_service,
            sba.monthly_payment + equipment.monthly_payment
        );
        assert_eq!(summary.total_interest, sba.total_interest + equipment.total_interest);

        let equity = &summary.layers[2];
        assert!(!equity.is_debt);
        assert_eq!(equity.monthly_payment, Decimal::ZERO);
        assert_eq!(equity.payoff, None);
    }

    #[test]
    fn test_total_payments_include_principal() {
        let summary = summarize(&sample());
        let sba = &summary.layers[0];
        assert!((sba.total_payments - sba.total_interest - dec!(2_000_000)).abs() < dec!(0.0001));
    }
}
