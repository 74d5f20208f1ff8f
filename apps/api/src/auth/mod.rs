// User accounts: signup, login and bearer tokens for the report routes.

pub mod crypto;
pub mod extractor;
pub mod handlers;
pub mod store;
