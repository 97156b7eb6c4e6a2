use anyhow::{Context, Result, bail};

use super::config_model::{
    Auth, Database, DotEnvyConfig, Notifications, PaymentGateway, Server,
};

const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: env_required("SERVER_PORT")?.parse()?,
        body_limit: env_required("SERVER_BODY_LIMIT")?.parse()?,
        timeout: env_required("SERVER_TIMEOUT")?.parse()?,
    };

    let database = Database {
        url: env_required("DATABASE_URL")?,
    };

    let auth = get_auth()?;
    let payment_gateway = get_payment_gateway()?;
    let notifications = Notifications {
        otp_webhook_url: env_optional("OTP_WEBHOOK_URL"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
        payment_gateway,
        notifications,
    })
}

pub fn get_auth() -> Result<Auth> {
    dotenvy::dotenv().ok();

    let token_ttl_hours = match env_optional("JWT_TTL_HOURS") {
        Some(raw) => raw.parse().context("JWT_TTL_HOURS is invalid")?,
        None => DEFAULT_TOKEN_TTL_HOURS,
    };
    if token_ttl_hours <= 0 {
        bail!("JWT_TTL_HOURS must be positive");
    }

    Ok(Auth {
        jwt_secret: env_required("JWT_SECRET")?,
        token_ttl_hours,
    })
}

pub fn get_payment_gateway() -> Result<PaymentGateway> {
    dotenvy::dotenv().ok();

    let enabled = match std::env::var("PAYMENT_GATEWAY_ENABLED") {
        Ok(raw) => match parse_bool(&raw) {
            Some(value) => value,
            None => bail!("PAYMENT_GATEWAY_ENABLED is invalid"),
        },
        Err(_) => false,
    };

    let key_id = env_optional("RAZORPAY_KEY_ID");
    if enabled && key_id.is_none() {
        bail!("RAZORPAY_KEY_ID is required when PAYMENT_GATEWAY_ENABLED is set");
    }

    let currency =
        env_optional("PAYMENT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(PaymentGateway {
        enabled,
        key_id,
        secret: env_required("RAZORPAY_SECRET")?,
        currency,
    })
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
