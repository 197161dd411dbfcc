use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct PaypalSettings {
    pub api_url: String,
    pub client_id: String,
    pub app_secret: String,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub api_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub latest_products_limit: i64,
    pub page_size: i64,
    pub payment_methods: Vec<String>,
    pub default_payment_method: String,
    pub session_max_age_days: i64,
    pub paypal: Option<PaypalSettings>,
    pub stripe: Option<StripeSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let payment_methods: Vec<String> = get("PAYMENT_METHODS")
            .unwrap_or_else(|| "PayPal,Stripe,CashOnDelivery".to_string())
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        let default_payment_method =
            get("DEFAULT_PAYMENT_METHOD").unwrap_or_else(|| "PayPal".to_string());
        if !payment_methods.contains(&default_payment_method) {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PAYMENT_METHOD",
                value: default_payment_method,
                reason: "not one of PAYMENT_METHODS".to_string(),
            });
        }

        let paypal = match (get("PAYPAL_CLIENT_ID"), get("PAYPAL_APP_SECRET")) {
            (Some(client_id), Some(app_secret)) => Some(PaypalSettings {
                api_url: get("PAYPAL_API_URL")
                    .unwrap_or_else(|| "https://api-m.sandbox.paypal.com".to_string()),
                client_id,
                app_secret,
            }),
            _ => None,
        };

        let stripe = match (get("STRIPE_SECRET_KEY"), get("STRIPE_WEBHOOK_SECRET")) {
            (Some(secret_key), Some(webhook_secret)) => Some(StripeSettings {
                api_url: get("STRIPE_API_URL")
                    .unwrap_or_else(|| "https://api.stripe.com".to_string()),
                secret_key,
                webhook_secret,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 8080)?,
            latest_products_limit: parse_or("LATEST_PRODUCTS_LIMIT", get("LATEST_PRODUCTS_LIMIT"), 4)?,
            page_size: parse_or("PAGE_SIZE", get("PAGE_SIZE"), 12)?,
            payment_methods,
            default_payment_method,
            session_max_age_days: parse_or("SESSION_MAX_AGE_DAYS", get("SESSION_MAX_AGE_DAYS"), 30)?,
            paypal,
            stripe,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }),
    }
}
