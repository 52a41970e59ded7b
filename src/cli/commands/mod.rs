mod attempts;
mod create_admin;
mod init;

pub use attempts::cmd_attempts;
pub use create_admin::cmd_create_admin;
pub use init::cmd_init;
