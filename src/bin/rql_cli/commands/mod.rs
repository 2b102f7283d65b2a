pub mod compile;
pub mod check;
