use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CapitalStackError;
use crate::types::{Money, Percent};
use crate::CapitalStackResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly periodic rate from an annual percentage (6.5 -> 0.0054166...).
pub fn monthly_rate(annual_pct: Percent) -> Decimal {
    annual_pct / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

/// Payment (PMT)
pub fn pmt(rate: Decimal, nper: u32, present_value: Money, future_value: Money) -> CapitalStackResult<Money> {
    if nper == 0 {
        return Err(CapitalStackError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE + rate;
    // Past Decimal's range the annuity has converged to the perpetuity payment.
    let perpetuity = || Ok(-present_value.saturating_mul(rate));
    let factor = match one_plus_r.checked_powi(i64::from(nper)) {
        Some(f) => f,
        None => return perpetuity(),
    };
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(CapitalStackError::InvalidInput {
            field: "rate".into(),
            reason: "PMT annuity factor is zero".into(),
        });
    }

    let payment = present_value
        .checked_mul(factor)
        .and_then(|grown| grown.checked_add(future_value))
        .and_then(|total| total.checked_div(annuity_factor));
    match payment {
        Some(p) => Ok(-p),
        None => perpetuity(),
    }
}

/// Level monthly payment that retires `principal` over `months` at `annual_pct`.
///
/// Zero months yields zero; a zero rate divides the principal evenly.
pub fn level_payment(principal: Money, annual_pct: Percent, months: u32) -> Money {
    if months == 0 {
        return Decimal::ZERO;
    }
    pmt(monthly_rate(annual_pct), months, -principal, Decimal::ZERO)
        .unwrap_or_else(|_| principal / Decimal::from(months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pmt_basic() {
        // 1000 over 12 periods at 1%: ~88.85
        let result = pmt(dec!(0.01), 12, dec!(-1000), dec!(0)).unwrap();
        assert!((result - dec!(88.85)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let result = pmt(dec!(0), 10, dec!(-1000), dec!(0)).unwrap();
        assert_eq!(result, dec!(100));
    }

    #[test]
    fn test_pmt_zero_periods_error() {
        assert!(pmt(dec!(0.01), 0, dec!(-1000), dec!(0)).is_err());
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_level_payment_sba_example() {
        // $2M at 6.5% over 10 years: ~$22,710/month
        let result = level_payment(dec!(2_000_000), dec!(6.5), 120);
        assert!((result - dec!(22_710)).abs() < dec!(5), "got {result}");
    }

    #[test]
    fn test_pmt_overflowing_factor_uses_perpetuity() {
        // 1.0833^600 fits in a Decimal but 1e9 times it does not
        let rate = monthly_rate(dec!(100));
        let result = pmt(rate, 600, dec!(-1_000_000_000), dec!(0)).unwrap();
        assert_eq!(result, dec!(1_000_000_000) * rate);
    }

    #[test]
    fn test_level_payment_extreme_inputs_do_not_panic() {
        let payment = level_payment(dec!(1_000_000_000), dec!(100), 600);
        assert!((payment - dec!(83_333_333.33)).abs() < dec!(0.01), "got {payment}");
        assert!(level_payment(Decimal::MAX, dec!(1000), 1200) > Decimal::ZERO);
    }

    #[test]
    fn test_level_payment_zero_months() {
        assert_eq!(level_payment(dec!(1000), dec!(5), 0), Decimal::ZERO);
    }
}
