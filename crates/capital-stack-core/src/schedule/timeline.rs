use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{MonthIndex, YearMonth};
use crate::schedule::amortization::{generate_schedule, PaymentScheduleEntry};
use crate::schedule::instruments::{find_instrument, StackInstrumentDef};
use crate::schedule::layer::CapitalStackLayer;
use crate::types::*;
use crate::CapitalStackResult;

/// Upper bound on the number of chart samples across the window.
pub const TARGET_SAMPLES: i64 = 80;

/// Span of the x-axis (in months) at which a midpoint label is added.
const MIDPOINT_LABEL_SPAN: i64 = 24;

/// A layer resolved against its instrument type, with its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSchedule {
    pub layer: CapitalStackLayer,
    pub def: StackInstrumentDef,
    pub schedule: Vec<PaymentScheduleEntry>,
}

impl LayerSchedule {
    pub fn build(layer: &CapitalStackLayer, def: &StackInstrumentDef) -> Self {
        Self {
            layer: layer.clone(),
            def: def.clone(),
            schedule: generate_schedule(layer, def),
        }
    }

    /// Absolute month of the final payment, if the layer has any payments.
    pub fn end_index(&self) -> Option<MonthIndex> {
        if self.schedule.is_empty() {
            None
        } else {
            Some(self.layer.start_index() + self.schedule.len() as i64 - 1)
        }
    }

    fn entry_at(&self, month: MonthIndex) -> Option<&PaymentScheduleEntry> {
        let relative = month - self.layer.start_index() + 1;
        if relative < 1 || relative > self.schedule.len() as i64 {
            return None;
        }
        self.schedule.get((relative - 1) as usize)
    }

    /// Full payment due in an absolute month; zero before start or after payoff.
    pub fn payment_at(&self, month: MonthIndex) -> Money {
        self.entry_at(month).map_or(Decimal::ZERO, |e| e.total)
    }

    /// Payment as drawn on the chart: a balloon principal repayment is left
    /// out so it cannot dominate the vertical scale.
    pub fn chart_payment_at(&self, month: MonthIndex) -> Money {
        match self.entry_at(month) {
            Some(entry)
                if self.def.repayment_type.has_balloon()
                    && i64::from(entry.month) == i64::from(self.layer.term_months) =>
            {
                entry.interest
            }
            Some(entry) => entry.total,
            None => Decimal::ZERO,
        }
    }
}

/// Resolve every layer against the catalog and generate its schedule.
pub fn resolve_schedules(
    layers: &[CapitalStackLayer],
    catalog: &[StackInstrumentDef],
) -> CapitalStackResult<Vec<LayerSchedule>> {
    layers
        .iter()
        .map(|layer| {
            let def = find_instrument(catalog, &layer.instrument_id)?;
            Ok(LayerSchedule::build(layer, def))
        })
        .collect()
}

/// Inclusive month range spanning every layer that has payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineWindow {
    pub start: MonthIndex,
    pub end: MonthIndex,
}

impl TimelineWindow {
    pub fn total_months(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Earliest start to latest payoff across layers with non-empty schedules.
/// Collapses to `reference` when nothing is being repaid.
pub fn timeline_window(schedules: &[LayerSchedule], reference: YearMonth) -> TimelineWindow {
    let bounds = schedules
        .iter()
        .filter_map(|ls| ls.end_index().map(|end| (ls.layer.start_index(), end)))
        .fold(None, |acc: Option<(MonthIndex, MonthIndex)>, (s, e)| match acc {
            Some((lo, hi)) => Some((lo.min(s), hi.max(e))),
            None => Some((s, e)),
        });

    match bounds {
        Some((start, end)) => TimelineWindow { start, end },
        None => {
            let idx = reference.to_index();
            TimelineWindow { start: idx, end: idx }
        }
    }
}

/// Months between chart samples.
pub fn sample_step(total_months: i64) -> i64 {
    (total_months / TARGET_SAMPLES).max(1)
}

/// One chart sample on the shared month axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month_index: MonthIndex,
    pub year_month: YearMonth,
    /// One value per layer, in stack order
    pub payments: Vec<Money>,
    pub total: Money,
    /// Principal of every layer started on or before this month
    pub amount_raised: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub month_index: MonthIndex,
    pub label: String,
}

/// Sampled payment series across all layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTimeline {
    pub window: TimelineWindow,
    pub step: i64,
    pub points: Vec<TimelinePoint>,
    pub axis_labels: Vec<AxisLabel>,
    /// Chart scale for payments (at least 1)
    pub max_payment: Money,
    /// Chart scale for capital raised (at least 1)
    pub max_raised: Money,
}

/// Sample every layer's payments onto one month axis.
///
/// Windows of a single month produce no points.
pub fn build_timeline(schedules: &[LayerSchedule], reference: YearMonth) -> PaymentTimeline {
    let window = timeline_window(schedules, reference);
    let total_months = window.total_months();
    let step = sample_step(total_months);

    let mut points = Vec::new();
    if total_months > 1 {
        let mut month = window.start;
        while month <= window.end {
            points.push(sample_point(schedules, month));
            month += step;
        }
    }

    let max_payment = points
        .iter()
        .map(|p| p.total)
        .fold(Decimal::ONE, Decimal::max);
    let max_raised = points
        .iter()
        .map(|p| p.amount_raised)
        .fold(Decimal::ONE, Decimal::max);

    PaymentTimeline {
        window,
        step,
        axis_labels: axis_labels(&points),
        points,
        max_payment,
        max_raised,
    }
}

fn sample_point(schedules: &[LayerSchedule], month: MonthIndex) -> TimelinePoint {
    let mut payments = Vec::with_capacity(schedules.len());
    let mut total = Decimal::ZERO;
    let mut amount_raised = Decimal::ZERO;

    for ls in schedules {
        if month >= ls.layer.start_index() {
            amount_raised = amount_raised.saturating_add(ls.layer.amount);
        }
        let value = ls.chart_payment_at(month);
        total = total.saturating_add(value);
        payments.push(value);
    }

    TimelinePoint {
        month_index: month,
        year_month: YearMonth::from_index(month),
        payments,
        total,
        amount_raised,
    }
}

fn axis_labels(points: &[TimelinePoint]) -> Vec<AxisLabel> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let label = |month_index: MonthIndex| AxisLabel {
        month_index,
        label: YearMonth::from_index(month_index).label(),
    };

    let mut labels = vec![label(first.month_index)];
    if last.month_index - first.month_index >= MIDPOINT_LABEL_SPAN {
        // Round half up, matching the chart's midpoint
        let mid = (first.month_index + last.month_index + 1).div_euclid(2);
        labels.push(label(mid));
    }
    labels.push(label(last.month_index));
    labels
}

/// Capital raised by classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackComposition {
    pub debt: Money,
    pub equity: Money,
    pub grants: Money,
    pub total: Money,
}

impl StackComposition {
    fn add(&mut self, ls: &LayerSchedule) {
        let amount = ls.layer.amount;
        if ls.def.is_equity {
            self.equity = self.equity.saturating_add(amount);
        } else if ls.def.is_grant {
            self.grants = self.grants.saturating_add(amount);
        } else {
            self.debt = self.debt.saturating_add(amount);
        }
        self.total = self.total.saturating_add(amount);
    }

    /// The whole stack regardless of start dates.
    pub fn of_stack(schedules: &[LayerSchedule]) -> Self {
        let mut c = Self::default();
        schedules.iter().for_each(|ls| c.add(ls));
        c
    }
}

/// Capital raised by layers that have started on or before `month`.
pub fn composition_at(schedules: &[LayerSchedule], month: MonthIndex) -> StackComposition {
    let mut c = StackComposition::default();
    schedules
        .iter()
        .filter(|ls| ls.layer.start_index() <= month)
        .for_each(|ls| c.add(ls));
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::instruments::builtin_stack_instruments;
    use crate::schedule::layer::CapitalStack;
    use rust_decimal_macros::dec;

    fn reference() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    fn sample_schedules() -> Vec<LayerSchedule> {
        let stack = CapitalStack::sample(reference());
        resolve_schedules(&stack.layers, &builtin_stack_instruments()).unwrap()
    }

    #[test]
    fn test_window_spans_debt_layers_only() {
        let schedules = sample_schedules();
        let window = timeline_window(&schedules, reference());
        // SBA Jul 2022 for 120 months; equipment Nov 2025 for 60 months
        assert_eq!(window.start, YearMonth::new(2022, 7).unwrap().to_index());
        assert_eq!(window.end, YearMonth::new(2032, 6).unwrap().to_index());
        assert_eq!(window.total_months(), 120);
    }

    #[test]
    fn test_empty_window_falls_back_to_reference() {
        let window = timeline_window(&[], reference());
        assert_eq!(window.start, reference().to_index());
        assert_eq!(window.total_months(), 1);
        let timeline = build_timeline(&[], reference());
        assert!(timeline.points.is_empty());
        assert!(timeline.axis_labels.is_empty());
        assert_eq!(timeline.max_payment, Decimal::ONE);
    }

    #[test]
    fn test_sample_step() {
        assert_eq!(sample_step(1), 1);
        assert_eq!(sample_step(79), 1);
        assert_eq!(sample_step(160), 2);
        assert_eq!(sample_step(600), 7);
    }

    #[test]
    fn test_amount_raised_is_step_function() {
        let schedules = sample_schedules();
        let timeline = build_timeline(&schedules, reference());
        let first = &timeline.points[0];
        // Only the SBA loan has started in Jul 2022
        assert_eq!(first.amount_raised, dec!(2_000_000));
        let last = timeline.points.last().unwrap();
        assert_eq!(last.amount_raised, dec!(6_350_000));
        assert!(timeline
            .points
            .windows(2)
            .all(|w| w[1].amount_raised >= w[0].amount_raised));
    }

    #[test]
    fn test_payments_zero_outside_layer_life() {
        let schedules = sample_schedules();
        let timeline = build_timeline(&schedules, reference());
        let first = &timeline.points[0];
        assert_eq!(first.payments.len(), 4);
        // Equipment financing has not started yet; equity and grant never pay
        assert_eq!(first.payments[1], Decimal::ZERO);
        assert_eq!(first.payments[2], Decimal::ZERO);
        assert_eq!(first.payments[3], Decimal::ZERO);
        assert!(first.payments[0] > Decimal::ZERO);
        assert_eq!(first.total, first.payments[0]);
    }

    #[test]
    fn test_balloon_excluded_from_chart_but_not_payment() {
        let catalog = builtin_stack_instruments();
        let layer = CapitalStackLayer {
            instrument_id: "mezzanine-debt".into(),
            amount: dec!(1_200_000),
            rate: dec!(12),
            term_months: 24,
            start_year: 2026,
            start_month: 1,
            monthly_revenue: None,
            revenue_share_pct: None,
            repayment_cap_x: None,
        };
        let ls = LayerSchedule::build(&layer, find_instrument(&catalog, "mezzanine-debt").unwrap());
        let final_month = ls.end_index().unwrap();
        assert_eq!(ls.chart_payment_at(final_month), dec!(12_000));
        assert_eq!(ls.payment_at(final_month), dec!(1_212_000));
        assert_eq!(ls.payment_at(final_month + 1), Decimal::ZERO);
        assert_eq!(ls.payment_at(layer.start_index() - 1), Decimal::ZERO);
    }

    #[test]
    fn test_axis_labels_include_midpoint() {
        let timeline = build_timeline(&sample_schedules(), reference());
        assert_eq!(timeline.axis_labels.len(), 3);
        assert_eq!(timeline.axis_labels[0].label, "Jul 2022");
    }

    #[test]
    fn test_composition_at() {
        let schedules = sample_schedules();
        let early = composition_at(&schedules, YearMonth::new(2023, 1).unwrap().to_index());
        assert_eq!(early.debt, dec!(2_000_000));
        assert_eq!(early.equity, dec!(2_500_000));
        assert_eq!(early.grants, Decimal::ZERO);

        let whole = StackComposition::of_stack(&schedules);
        assert_eq!(whole.debt, dec!(3_500_000));
        assert_eq!(whole.grants, dec!(350_000));
        assert_eq!(whole.total, dec!(6_350_000));
    }
}
