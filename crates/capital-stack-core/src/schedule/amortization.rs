use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::schedule::instruments::{RepaymentType, StackInstrumentDef};
use crate::schedule::layer::CapitalStackLayer;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::*;

/// Revenue-based schedules stop once less than a cent is outstanding.
pub const REVENUE_BASED_EPSILON: Money = dec!(0.01);

/// Hard ceiling on revenue-based periods (50 years). Guarantees termination
/// when the revenue share is too small to ever reach the cap.
pub const MAX_REVENUE_BASED_PERIODS: u32 = 600;

/// A single month in a layer's payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// Relative month, 1-based
    pub month: u32,
    pub principal: Money,
    /// Interest for debt, premium for revenue-based layers
    pub interest: Money,
    pub total: Money,
    pub balance: Money,
}

/// Build the month-by-month payment schedule for one layer.
///
/// Total over its inputs: equity, grants, zero amounts, zero terms and
/// missing revenue parameters all produce an empty schedule.
pub fn generate_schedule(
    layer: &CapitalStackLayer,
    def: &StackInstrumentDef,
) -> Vec<PaymentScheduleEntry> {
    if def.is_equity || def.is_grant || layer.amount <= Decimal::ZERO {
        return Vec::new();
    }

    match def.repayment_type {
        RepaymentType::RevenueBased => revenue_based_schedule(layer, def),
        RepaymentType::Amortizing => amortizing_schedule(layer),
        RepaymentType::InterestOnly | RepaymentType::Bullet => balloon_schedule(layer),
        RepaymentType::None => Vec::new(),
    }
}

/// True when a revenue-based schedule stopped at the safety ceiling with money still owed.
pub fn hit_safety_cap(schedule: &[PaymentScheduleEntry]) -> bool {
    schedule.len() >= MAX_REVENUE_BASED_PERIODS as usize
        && schedule
            .last()
            .is_some_and(|e| e.balance > REVENUE_BASED_EPSILON)
}

fn amortizing_schedule(layer: &CapitalStackLayer) -> Vec<PaymentScheduleEntry> {
    let months = layer.term_months;
    if months == 0 {
        return Vec::new();
    }

    let r = monthly_rate(layer.rate);
    let payment = level_payment(layer.amount, layer.rate, months);
    let mut balance = layer.amount;
    let mut periods = Vec::with_capacity(months as usize);

    // Saturating arithmetic keeps out-of-range inputs total.
    for month in 1..=months {
        let interest = balance.saturating_mul(r);
        let principal = payment.saturating_sub(interest);
        balance = balance.saturating_sub(principal);

        // Final period absorbs rounding residue
        let closing = if month == months {
            Decimal::ZERO
        } else {
            balance.max(Decimal::ZERO)
        };

        periods.push(PaymentScheduleEntry {
            month,
            principal,
            interest,
            total: payment,
            balance: closing,
        });
    }

    periods
}

fn balloon_schedule(layer: &CapitalStackLayer) -> Vec<PaymentScheduleEntry> {
    let months = layer.term_months;
    if months == 0 {
        return Vec::new();
    }

    let r = monthly_rate(layer.rate);
    let balance = layer.amount;
    let interest = balance.saturating_mul(r);

    (1..=months)
        .map(|month| {
            let is_final = month == months;
            let principal = if is_final { layer.amount } else { Decimal::ZERO };
            PaymentScheduleEntry {
                month,
                principal,
                interest,
                total: interest.saturating_add(principal),
                balance: if is_final { Decimal::ZERO } else { balance },
            }
        })
        .collect()
}

fn revenue_based_schedule(
    layer: &CapitalStackLayer,
    def: &StackInstrumentDef,
) -> Vec<PaymentScheduleEntry> {
    let monthly_revenue = layer.monthly_revenue.unwrap_or(Decimal::ZERO);
    let share_pct = def.revenue_share_or_default(layer.revenue_share_pct);
    let cap_multiple = def.cap_multiple_or_default(layer.repayment_cap_x);

    if monthly_revenue <= Decimal::ZERO || share_pct <= Decimal::ZERO {
        return Vec::new();
    }

    let total_cap = layer.amount.saturating_mul(cap_multiple);
    if total_cap <= REVENUE_BASED_EPSILON {
        return Vec::new();
    }

    let monthly_payment = monthly_revenue.saturating_mul(share_pct / Decimal::ONE_HUNDRED);
    // Fixed for the life of the schedule: every dollar paid recovers this
    // fraction as principal and the remainder as premium.
    let principal_ratio = layer.amount / total_cap;

    let mut remaining = total_cap;
    let mut periods = Vec::new();
    let mut month = 0u32;

    while remaining > REVENUE_BASED_EPSILON && month < MAX_REVENUE_BASED_PERIODS {
        month += 1;
        let total = monthly_payment.min(remaining);
        let principal = total * principal_ratio;
        remaining -= total;

        periods.push(PaymentScheduleEntry {
            month,
            principal,
            interest: total - principal,
            total,
            balance: remaining.max(Decimal::ZERO),
        });
    }

    if month == MAX_REVENUE_BASED_PERIODS && remaining > REVENUE_BASED_EPSILON {
        tracing::warn!(
            instrument = %layer.instrument_id,
            outstanding = %remaining,
            "revenue-based schedule truncated at {MAX_REVENUE_BASED_PERIODS} periods"
        );
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::instruments::{builtin_stack_instruments, find_instrument};

    fn layer(id: &str, amount: Decimal, rate: Decimal, term: u32) -> CapitalStackLayer {
        CapitalStackLayer {
            instrument_id: id.into(),
            amount,
            rate,
            term_months: term,
            start_year: 2026,
            start_month: 1,
            monthly_revenue: None,
            revenue_share_pct: None,
            repayment_cap_x: None,
        }
    }

    fn def(id: &str) -> StackInstrumentDef {
        find_instrument(&builtin_stack_instruments(), id).unwrap().clone()
    }

    #[test]
    fn test_amortizing_zero_rate_is_straight_line() {
        let sched = generate_schedule(&layer("term-loan", dec!(1200), dec!(0), 12), &def("term-loan"));
        assert_eq!(sched.len(), 12);
        for e in &sched {
            assert_eq!(e.total, dec!(100));
            assert_eq!(e.interest, Decimal::ZERO);
        }
        assert_eq!(sched[0].balance, dec!(1100));
        assert_eq!(sched[11].balance, Decimal::ZERO);
    }

    #[test]
    fn test_amortizing_interest_declines() {
        let sched = generate_schedule(&layer("term-loan", dec!(100_000), dec!(8), 60), &def("term-loan"));
        assert!(sched.windows(2).all(|w| w[1].interest < w[0].interest));
        assert!(sched.windows(2).all(|w| w[1].principal > w[0].principal));
        // First month's interest = 100,000 * 0.08 / 12
        assert!((sched[0].interest - dec!(666.67)).abs() < dec!(0.01));
    }

    #[test]
    fn test_bullet_constant_interest() {
        let sched = generate_schedule(
            &layer("program-related-investment", dec!(1000), dec!(12), 3),
            &def("program-related-investment"),
        );
        assert_eq!(sched.len(), 3);
        assert_eq!(sched[0].interest, dec!(10));
        assert_eq!(sched[0].total, dec!(10));
        assert_eq!(sched[0].balance, dec!(1000));
        assert_eq!(sched[2].principal, dec!(1000));
        assert_eq!(sched[2].total, dec!(1010));
        assert_eq!(sched[2].balance, Decimal::ZERO);
    }

    #[test]
    fn test_revenue_based_even_split() {
        // Cap 1.5x of 100k = 150k, paying 10k/month => 15 months
        let mut l = layer("revenue-based-financing", dec!(100_000), dec!(0), 0);
        l.monthly_revenue = Some(dec!(200_000));
        l.revenue_share_pct = Some(dec!(5));
        l.repayment_cap_x = Some(dec!(1.5));
        let sched = generate_schedule(&l, &def("revenue-based-financing"));
        assert_eq!(sched.len(), 15);
        let principal: Decimal = sched.iter().map(|e| e.principal).sum();
        let premium: Decimal = sched.iter().map(|e| e.interest).sum();
        assert!((principal - dec!(100_000)).abs() < dec!(0.000001));
        assert!((premium - dec!(50_000)).abs() < dec!(0.000001));
        assert_eq!(sched.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_revenue_based_partial_final_payment() {
        // 10k cap 1.2x = 12k at 5k/month => 5k, 5k, 2k
        let mut l = layer("revenue-based-financing", dec!(10_000), dec!(0), 0);
        l.monthly_revenue = Some(dec!(50_000));
        l.revenue_share_pct = Some(dec!(10));
        l.repayment_cap_x = Some(dec!(1.2));
        let sched = generate_schedule(&l, &def("revenue-based-financing"));
        let totals: Vec<Decimal> = sched.iter().map(|e| e.total).collect();
        assert_eq!(totals, vec![dec!(5000), dec!(5000), dec!(2000)]);
    }

    #[test]
    fn test_revenue_based_uses_type_defaults() {
        let mut l = layer("revenue-based-financing", dec!(100_000), dec!(0), 0);
        l.monthly_revenue = Some(dec!(100_000));
        let sched = generate_schedule(&l, &def("revenue-based-financing"));
        // 5% of 100k = 5k against a 150k cap
        assert_eq!(sched.len(), 30);
        assert_eq!(sched[0].total, dec!(5000));
    }

    #[test]
    fn test_hit_safety_cap() {
        let mut l = layer("revenue-based-financing", dec!(1_000_000), dec!(0), 0);
        l.monthly_revenue = Some(dec!(10));
        l.revenue_share_pct = Some(dec!(0.001));
        l.repayment_cap_x = Some(dec!(1.5));
        let sched = generate_schedule(&l, &def("revenue-based-financing"));
        assert!(hit_safety_cap(&sched));

        let short = generate_schedule(&layer("term-loan", dec!(1000), dec!(5), 12), &def("term-loan"));
        assert!(!hit_safety_cap(&short));
    }

    #[test]
    fn test_balloon_extreme_rate_saturates() {
        let sched = generate_schedule(
            &layer("mezzanine-debt", Decimal::MAX, dec!(1_000_000), 2),
            &def("mezzanine-debt"),
        );
        assert_eq!(sched.len(), 2);
        assert_eq!(sched[0].interest, Decimal::MAX);
        assert_eq!(sched[1].total, Decimal::MAX);
        assert_eq!(sched[1].balance, Decimal::ZERO);
    }

    #[test]
    fn test_none_repayment_on_debt_type_is_empty() {
        let mut d = def("term-loan");
        d.repayment_type = RepaymentType::None;
        assert!(generate_schedule(&layer("term-loan", dec!(1000), dec!(5), 12), &d).is_empty());
    }
}
