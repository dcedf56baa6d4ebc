pub mod check;
pub mod mask;
