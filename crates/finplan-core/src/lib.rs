pub mod error;
pub mod guard;
pub mod precision;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "wealth")]
pub mod wealth;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::FinPlanError;
pub use types::*;

/// Standard result type for fallible finplan operations
pub type FinPlanResult<T> = Result<T, FinPlanError>;
