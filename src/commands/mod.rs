pub mod audit_log_command;
pub mod documents_command;
pub mod permissions_command;
pub mod users_command;
