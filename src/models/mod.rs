pub mod check_point;
pub mod entry_attempt;
pub mod user;

pub use check_point::CheckPoint;
pub use entry_attempt::EntryAttempt;
pub use user::{NewUser, Role, User, UserSummary};
