pub mod notifications;
pub mod security;
