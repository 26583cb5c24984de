pub mod allocation;
pub mod fifo;
pub mod returns;
