pub mod stock;
pub mod dividend;
