pub mod calendar;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "finder")]
pub mod finder;

pub use error::CapitalStackError;
pub use types::*;

/// Standard result type for all capital-stack operations
pub type CapitalStackResult<T> = Result<T, CapitalStackError>;
