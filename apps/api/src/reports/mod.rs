// Interview reports: final scores saved per user and listed newest first.

pub mod handlers;
pub mod store;
