pub mod finder;
pub mod instruments;
pub mod recommend;
pub mod schedule;
pub mod stack;

use capital_stack_core::calendar::YearMonth;

use crate::config::CliConfig;

/// Shared inputs every command may need.
pub struct Context {
    pub config: CliConfig,
    pub reference: YearMonth,
}
