use clap::Args;
use serde::Serialize;
use serde_json::Value;

use capital_stack_core::finder::catalog::builtin_catalog;
use capital_stack_core::schedule::instruments::{builtin_stack_instruments, RepaymentType};
use capital_stack_core::{Category, Percent};

/// Arguments for listing the instrument catalogs
#[derive(Args)]
pub struct InstrumentsArgs {
    /// List the recommendation catalog instead of the stack builder instruments
    #[arg(long)]
    pub finder: bool,

    /// Only list instruments in this category (grant, debt, guarantee, equity, hybrid, government, conventional)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Serialize)]
struct StackInstrumentRow {
    id: String,
    name: String,
    category: Category,
    repayment: RepaymentType,
    default_rate: Percent,
    default_term_months: u32,
}

#[derive(Serialize)]
struct FinderInstrumentRow {
    slug: String,
    name: String,
    category: Category,
    cost: String,
    size: String,
    speed: &'static str,
    complexity: String,
    deals: u32,
}

fn category_matches(filter: &Option<String>, category: Category) -> bool {
    match filter {
        Some(f) => category.label().eq_ignore_ascii_case(f)
            || serde_json::to_value(category).is_ok_and(|v| v == f.as_str()),
        None => true,
    }
}

pub fn run_instruments(args: InstrumentsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.finder {
        let rows: Vec<FinderInstrumentRow> = builtin_catalog()
            .into_iter()
            .filter(|i| category_matches(&args.category, i.category))
            .map(|i| FinderInstrumentRow {
                slug: i.slug,
                name: i.name,
                category: i.category,
                cost: i.cost_range,
                size: i.typical_size,
                speed: i.speed.label(),
                complexity: i.complexity.to_string(),
                deals: i.deal_count,
            })
            .collect();
        return Ok(serde_json::to_value(rows)?);
    }

    let rows: Vec<StackInstrumentRow> = builtin_stack_instruments()
        .into_iter()
        .filter(|d| category_matches(&args.category, d.category))
        .map(|d| StackInstrumentRow {
            id: d.id,
            name: d.name,
            category: d.category,
            repayment: d.repayment_type,
            default_rate: d.default_rate,
            default_term_months: d.default_term_months,
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_finder_catalog() {
        let value = run_instruments(InstrumentsArgs {
            finder: true,
            category: None,
        })
        .unwrap();
        assert_eq!(value.as_array().unwrap().len(), 35);
        assert_eq!(value[0]["slug"], "pure-grant");
    }

    #[test]
    fn filters_by_category() {
        let value = run_instruments(InstrumentsArgs {
            finder: false,
            category: Some("equity".into()),
        })
        .unwrap();
        let rows = value.as_array().unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r["category"] == "equity"));
    }
}
