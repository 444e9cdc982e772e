pub mod base;
pub mod bse;
pub mod sse;
pub mod szse;
