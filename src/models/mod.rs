pub mod chart;
pub mod message;
pub mod passage;
pub mod report_index;
pub mod user_session;
