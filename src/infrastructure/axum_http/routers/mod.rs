pub mod auth;
pub mod dashboard;
pub mod plans;
pub mod subscriptions;
pub mod users;
