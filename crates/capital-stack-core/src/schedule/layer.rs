use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::{MonthIndex, YearMonth};
use crate::error::CapitalStackError;
use crate::schedule::instruments::{RepaymentType, StackInstrumentDef};
use crate::types::*;
use crate::CapitalStackResult;

const DEFAULT_LAYER_AMOUNT: Money = dec!(500_000);
const DEFAULT_MONTHLY_REVENUE: Money = dec!(200_000);

/// One funding instance chosen by the user.
///
/// Repayment behavior comes from the referenced instrument type, never from
/// the layer itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalStackLayer {
    pub instrument_id: String,
    pub amount: Money,
    /// Annual interest rate in percent; only meaningful for fixed-term debt
    #[serde(default)]
    pub rate: Percent,
    /// Only meaningful for fixed-term debt
    #[serde(default)]
    pub term_months: u32,
    pub start_year: i32,
    /// 1-12
    pub start_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_share_pct: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repayment_cap_x: Option<Multiple>,
}

impl CapitalStackLayer {
    /// A new layer for `def` starting in the caller's reference month.
    pub fn with_defaults(def: &StackInstrumentDef, reference: YearMonth) -> Self {
        let mut layer = Self {
            instrument_id: def.id.clone(),
            amount: DEFAULT_LAYER_AMOUNT,
            rate: def.default_rate,
            term_months: def.default_term_months,
            start_year: reference.year,
            start_month: reference.month,
            monthly_revenue: None,
            revenue_share_pct: None,
            repayment_cap_x: None,
        };
        if def.repayment_type == RepaymentType::RevenueBased {
            layer.monthly_revenue = Some(DEFAULT_MONTHLY_REVENUE);
            layer.revenue_share_pct = Some(def.revenue_share_or_default(None));
            layer.repayment_cap_x = Some(def.cap_multiple_or_default(None));
        }
        layer
    }

    /// Start month on the month axis. A start month outside 1..=12 rolls
    /// into the neighbouring year (0 is December of the year before).
    pub fn start(&self) -> YearMonth {
        YearMonth::from_index(self.start_index())
    }

    pub fn start_index(&self) -> MonthIndex {
        i64::from(self.start_year) * 12 + i64::from(self.start_month) - 1
    }
}

/// Partial update applied from a single control change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_share_pct: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repayment_cap_x: Option<Multiple>,
}

impl LayerUpdate {
    fn apply(&self, layer: &mut CapitalStackLayer) {
        if let Some(v) = self.amount {
            layer.amount = v;
        }
        if let Some(v) = self.rate {
            layer.rate = v;
        }
        if let Some(v) = self.term_months {
            layer.term_months = v;
        }
        if let Some(v) = self.start_year {
            layer.start_year = v;
        }
        if let Some(v) = self.start_month {
            layer.start_month = v;
        }
        if self.monthly_revenue.is_some() {
            layer.monthly_revenue = self.monthly_revenue;
        }
        if self.revenue_share_pct.is_some() {
            layer.revenue_share_pct = self.revenue_share_pct;
        }
        if self.repayment_cap_x.is_some() {
            layer.repayment_cap_x = self.repayment_cap_x;
        }
    }
}

/// Ordered list of layers plus the index of the layer currently expanded in the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalStack {
    pub layers: Vec<CapitalStackLayer>,
    #[serde(default)]
    pub selected: Option<usize>,
}

impl CapitalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-layer example stack shown on first load, dated relative to `reference`.
    pub fn sample(reference: YearMonth) -> Self {
        let year = reference.year;
        let layer = |id: &str, amount: Decimal, rate: Decimal, term: u32, start_year: i32, start_month: u32| {
            CapitalStackLayer {
                instrument_id: id.into(),
                amount,
                rate,
                term_months: term,
                start_year,
                start_month,
                monthly_revenue: None,
                revenue_share_pct: None,
                repayment_cap_x: None,
            }
        };
        Self {
            layers: vec![
                layer("sba-loan", dec!(2_000_000), dec!(6.5), 120, year - 4, 7),
                layer("equipment-financing", dec!(1_500_000), dec!(7.0), 60, year - 1, 11),
                layer("standard-equity", dec!(2_500_000), Decimal::ZERO, 0, year - 3, 1),
                layer("stack-grant", dec!(350_000), Decimal::ZERO, 0, year - 2, 6),
            ],
            selected: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Append a default layer for `def` and select it. Returns its index.
    pub fn add(&mut self, def: &StackInstrumentDef, reference: YearMonth) -> usize {
        self.layers.push(CapitalStackLayer::with_defaults(def, reference));
        let idx = self.layers.len() - 1;
        self.selected = Some(idx);
        idx
    }

    /// Remove a layer, keeping the selection pointed at the same layer it was on.
    pub fn remove(&mut self, idx: usize) -> CapitalStackResult<CapitalStackLayer> {
        self.check_index(idx)?;
        let removed = self.layers.remove(idx);
        self.selected = match self.selected {
            Some(sel) if sel == idx => None,
            Some(sel) if sel > idx => Some(sel - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn update(&mut self, idx: usize, update: &LayerUpdate) -> CapitalStackResult<()> {
        self.check_index(idx)?;
        update.apply(&mut self.layers[idx]);
        Ok(())
    }

    pub fn select(&mut self, idx: Option<usize>) -> CapitalStackResult<()> {
        if let Some(i) = idx {
            self.check_index(i)?;
        }
        self.selected = idx;
        Ok(())
    }

    pub fn total_allocated(&self) -> Money {
        saturating_sum(self.layers.iter().map(|l| l.amount))
    }

    fn check_index(&self, idx: usize) -> CapitalStackResult<()> {
        if idx >= self.layers.len() {
            return Err(CapitalStackError::InvalidInput {
                field: "layer_index".into(),
                reason: format!("Layer {idx} out of range (stack has {})", self.layers.len()),
            });
        }
        Ok(())
    }
}
