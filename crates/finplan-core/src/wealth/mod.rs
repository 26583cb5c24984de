pub mod cashflow;
pub mod retirement;
pub mod step_up;
pub mod withdrawal;
