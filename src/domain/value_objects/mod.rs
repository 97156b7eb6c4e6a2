pub mod dashboard;
pub mod enums;
pub mod iam;
pub mod plans;
pub mod subscriptions;
pub mod users;
