pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "amortization")]
pub use amortization::projection::{analyze_loan, project_loan, LoanConfig, LoanProjection};

pub use error::PayoffError;
pub use types::*;

/// Standard result type for all loan-payoff operations
pub type PayoffResult<T> = Result<T, PayoffError>;
