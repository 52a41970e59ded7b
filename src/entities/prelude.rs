pub use super::check_points::Entity as CheckPoints;
pub use super::entry_attempts::Entity as EntryAttempts;
pub use super::users::Entity as Users;
