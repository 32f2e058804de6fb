pub mod eval;
pub mod session;
pub mod sink;
