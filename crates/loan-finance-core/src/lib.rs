pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

pub use error::LoanFinanceError;
pub use types::*;

/// Standard result type for all loan-finance operations
pub type LoanFinanceResult<T> = Result<T, LoanFinanceError>;
