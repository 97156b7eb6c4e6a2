#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub payment_gateway: PaymentGateway,
    pub notifications: Notifications,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentGateway {
    /// When false, purchases and upgrades get a locally generated order id.
    pub enabled: bool,
    pub key_id: Option<String>,
    pub secret: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    /// Receives password reset codes as JSON. Unset means codes are only logged.
    pub otp_webhook_url: Option<String>,
}
