pub mod loans;
pub mod portfolio;
pub mod wealth;
