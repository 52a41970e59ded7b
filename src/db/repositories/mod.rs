pub mod check_point;
pub mod entry_attempt;
pub mod user;
