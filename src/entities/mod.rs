pub mod prelude;

pub mod check_points;
pub mod entry_attempts;
pub mod users;
