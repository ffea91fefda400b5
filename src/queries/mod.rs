pub mod audit_log_query;
pub mod document_query;
pub mod permission_query;
pub mod user_query;
