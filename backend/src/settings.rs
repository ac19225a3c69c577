//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CRM_*` environment variables and an optional
//! configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{BillingCalendar, BillingCalendarError, DEFAULT_UTC_OFFSET_MINUTES};
use crate::outbound::persistence::{DEFAULT_CHECKOUT_TIMEOUT, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    /// The UTC offset cannot form a calendar.
    #[error(transparent)]
    Calendar(#[from] BillingCalendarError),
}

/// Settings for the CRM backend process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM")]
pub struct CrmSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Minutes east of UTC for the billing calendar.
    pub utc_offset_minutes: Option<i32>,
    /// Run the monthly payment sweeps in this process; on when unset.
    pub scheduler_enabled: Option<bool>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
}

impl CrmSettings {
    /// Parsed listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Whether this process runs the monthly sweeps.
    pub fn scheduler_enabled(&self) -> bool {
        self.scheduler_enabled.unwrap_or(true)
    }

    /// Billing calendar for the configured offset.
    pub fn calendar(&self) -> Result<BillingCalendar, SettingsError> {
        let minutes = self
            .utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        Ok(BillingCalendar::from_offset_minutes(minutes)?)
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            let mut config = PoolConfig::new(url.as_str()).with_checkout_timeout(
                self.pool_timeout_secs
                    .map_or(DEFAULT_CHECKOUT_TIMEOUT, Duration::from_secs),
            );
            if let Some(max_size) = self.pool_max_size {
                config = config.with_max_size(max_size);
            }
            config
        })
    }
}
