pub mod search;
pub mod triage;
