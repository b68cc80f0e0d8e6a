//! Startup configuration.
//!
//! Connection settings and credentials come from the process environment via
//! [`mockable::Env`] and are validated once by [`AppSettings::from_env`].
//! Numeric tunables are loaded separately through `ortho_config` as
//! [`TuningSettings`] so they can also be set from the command line or a
//! configuration file.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::media::{
    DEFAULT_READ_TTL_MINUTES, DEFAULT_UPLOAD_PERMISSIONS, DEFAULT_UPLOAD_TTL_MINUTES,
};
use crate::domain::moderation::DEFAULT_SEVERITY_THRESHOLD;
use crate::domain::trail::DEFAULT_IMAGE_PATH_MAX_CHARS;
use crate::domain::{ModerationPolicy, SasPermissions, SasPolicy, TrailLimits};
use crate::outbound::blob::{BlobStorageConfig, DEFAULT_CONTAINER};

pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BLOB_ACCOUNT_NAME_ENV: &str = "BLOB_ACCOUNT_NAME";
pub const BLOB_ACCOUNT_KEY_ENV: &str = "BLOB_ACCOUNT_KEY";
pub const BLOB_CONTAINER_NAME_ENV: &str = "BLOB_CONTAINER_NAME";
pub const BLOB_ENDPOINT_ENV: &str = "BLOB_ENDPOINT";
pub const VISION_ENDPOINT_ENV: &str = "VISION_ENDPOINT";
pub const VISION_KEY_ENV: &str = "VISION_KEY";
pub const CONTENT_SAFETY_ENDPOINT_ENV: &str = "CONTENT_SAFETY_ENDPOINT";
pub const CONTENT_SAFETY_KEY_ENV: &str = "CONTENT_SAFETY_KEY";

/// Address bound when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Outbound HTTP timeout used when none is configured.
pub const DEFAULT_OUTBOUND_TIMEOUT_SECONDS: u64 = 15;

/// Errors raised while validating startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Only one half of a credential pair is set.
    #[error("{present} is set but {missing} is not; set both or neither")]
    IncompletePair {
        present: &'static str,
        missing: &'static str,
    },
    /// A variable or tunable holds a value that cannot be used.
    #[error("invalid value for {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl SettingsError {
    fn invalid(name: &'static str, value: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidValue {
            name,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Endpoint and subscription key for an external AI service.
#[derive(Clone)]
pub struct ServiceCredentials {
    pub endpoint: Url,
    pub key: Zeroizing<String>,
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Tunables loaded with `ortho_config` under the `TRAILSHARE` prefix.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRAILSHARE")]
pub struct TuningSettings {
    /// Severity at or above which an image is blocked.
    pub moderation_threshold: Option<u8>,
    /// Lifetime of upload URLs in minutes.
    pub upload_sas_minutes: Option<i64>,
    /// Lifetime of image read URLs in minutes.
    pub read_sas_minutes: Option<i64>,
    /// Permissions granted to upload URLs, drawn from `r`, `c` and `w`.
    pub upload_permissions: Option<String>,
    /// Maximum characters accepted in a trail's `imagePath`.
    pub image_path_max_len: Option<usize>,
    /// Timeout applied to every outbound AI request.
    pub outbound_timeout_seconds: Option<u64>,
}

fn positive_minutes(
    name: &'static str,
    value: Option<i64>,
    default: i64,
) -> Result<TimeDelta, SettingsError> {
    let minutes = value.unwrap_or(default);
    if minutes <= 0 {
        return Err(SettingsError::invalid(name, minutes.to_string(), "must be positive"));
    }
    TimeDelta::try_minutes(minutes)
        .ok_or_else(|| SettingsError::invalid(name, minutes.to_string(), "out of range"))
}

impl TuningSettings {
    /// Moderation policy using the configured threshold.
    ///
    /// # Errors
    ///
    /// Rejects a zero `moderation_threshold`.
    pub fn moderation_policy(&self) -> Result<ModerationPolicy, SettingsError> {
        let threshold = self
            .moderation_threshold
            .unwrap_or(DEFAULT_SEVERITY_THRESHOLD);
        if threshold == 0 {
            return Err(SettingsError::invalid(
                "moderation_threshold",
                "0",
                "must be positive",
            ));
        }
        Ok(ModerationPolicy::new(threshold))
    }

    /// Trail validation limits.
    ///
    /// # Errors
    ///
    /// Rejects a zero `image_path_max_len`.
    pub fn trail_limits(&self) -> Result<TrailLimits, SettingsError> {
        let max = self
            .image_path_max_len
            .unwrap_or(DEFAULT_IMAGE_PATH_MAX_CHARS);
        if max == 0 {
            return Err(SettingsError::invalid(
                "image_path_max_len",
                "0",
                "must be positive",
            ));
        }
        Ok(TrailLimits::new(max))
    }

    /// Signing windows and upload permissions.
    ///
    /// # Errors
    ///
    /// Rejects non-positive windows and unknown permission flags.
    pub fn sas_policy(&self) -> Result<SasPolicy, SettingsError> {
        let upload_permissions = match self.upload_permissions.as_deref() {
            Some(raw) => raw
                .parse::<SasPermissions>()
                .map_err(|err| SettingsError::invalid("upload_permissions", raw, err))?,
            None => DEFAULT_UPLOAD_PERMISSIONS,
        };
        if !upload_permissions.allows_upload() {
            return Err(SettingsError::invalid(
                "upload_permissions",
                upload_permissions.to_string(),
                "upload URLs need 'c' or 'w'",
            ));
        }
        Ok(SasPolicy::new(
            upload_permissions,
            positive_minutes(
                "upload_sas_minutes",
                self.upload_sas_minutes,
                DEFAULT_UPLOAD_TTL_MINUTES,
            )?,
            positive_minutes(
                "read_sas_minutes",
                self.read_sas_minutes,
                DEFAULT_READ_TTL_MINUTES,
            )?,
        ))
    }

    /// Timeout for outbound AI calls.
    ///
    /// # Errors
    ///
    /// Rejects a zero timeout.
    pub fn outbound_timeout(&self) -> Result<Duration, SettingsError> {
        match self
            .outbound_timeout_seconds
            .unwrap_or(DEFAULT_OUTBOUND_TIMEOUT_SECONDS)
        {
            0 => Err(SettingsError::invalid(
                "outbound_timeout_seconds",
                "0",
                "must be positive",
            )),
            seconds => Ok(Duration::from_secs(seconds)),
        }
    }
}

/// Validated startup configuration.
#[derive(Clone)]
pub struct AppSettings {
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<Zeroizing<String>>,
    pub blob: Option<BlobStorageConfig>,
    pub vision: Option<ServiceCredentials>,
    pub content_safety: Option<ServiceCredentials>,
    pub tuning: TuningSettings,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "<redacted>"),
            )
            .field("blob", &self.blob)
            .field("vision", &self.vision)
            .field("content_safety", &self.content_safety)
            .field("tuning", &self.tuning)
            .finish()
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn pair<E: Env>(
    env: &E,
    first: &'static str,
    second: &'static str,
) -> Result<Option<(String, String)>, SettingsError> {
    match (non_blank(env, first), non_blank(env, second)) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(SettingsError::IncompletePair {
            present: first,
            missing: second,
        }),
        (None, Some(_)) => Err(SettingsError::IncompletePair {
            present: second,
            missing: first,
        }),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw).map_err(|err| SettingsError::invalid(name, raw, err))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::invalid(name, raw, "expected an http(s) URL"));
    }
    Ok(url)
}

fn service_credentials<E: Env>(
    env: &E,
    endpoint_name: &'static str,
    key_name: &'static str,
) -> Result<Option<ServiceCredentials>, SettingsError> {
    pair(env, endpoint_name, key_name)?
        .map(|(endpoint, key)| {
            Ok(ServiceCredentials {
                endpoint: parse_url(endpoint_name, &endpoint)?,
                key: Zeroizing::new(key),
            })
        })
        .transpose()
}

fn blob_settings<E: Env>(env: &E) -> Result<Option<BlobStorageConfig>, SettingsError> {
    let Some((account_name, account_key)) =
        pair(env, BLOB_ACCOUNT_NAME_ENV, BLOB_ACCOUNT_KEY_ENV)?
    else {
        return Ok(None);
    };
    let endpoint = non_blank(env, BLOB_ENDPOINT_ENV)
        .map(|raw| parse_url(BLOB_ENDPOINT_ENV, &raw))
        .transpose()?;
    Ok(Some(BlobStorageConfig {
        account_name,
        account_key: Zeroizing::new(account_key),
        container: non_blank(env, BLOB_CONTAINER_NAME_ENV)
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_owned()),
        endpoint,
    }))
}

impl AppSettings {
    /// Read and validate settings from `env` with default tunables.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for half-configured credential pairs and
    /// unparsable addresses or URLs.
    ///
    /// # Examples
    /// ```
    /// use mockable::MockEnv;
    /// use trailshare::settings::AppSettings;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "VISION_ENDPOINT" => Some("https://vision.example".to_owned()),
    ///     "VISION_KEY" => Some("secret".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let settings = AppSettings::from_env(&env).expect("valid settings");
    /// assert!(settings.vision.is_some());
    /// assert!(settings.content_safety.is_none());
    /// ```
    pub fn from_env<E: Env>(env: &E) -> Result<Self, SettingsError> {
        let bind_raw =
            non_blank(env, BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| SettingsError::invalid(BIND_ADDR_ENV, bind_raw.clone(), err))?;

        Ok(Self {
            bind_addr,
            database_url: non_blank(env, DATABASE_URL_ENV).map(Zeroizing::new),
            blob: blob_settings(env)?,
            vision: service_credentials(env, VISION_ENDPOINT_ENV, VISION_KEY_ENV)?,
            content_safety: service_credentials(
                env,
                CONTENT_SAFETY_ENDPOINT_ENV,
                CONTENT_SAFETY_KEY_ENV,
            )?,
            tuning: TuningSettings::default(),
        })
    }

    /// Replace the tunables, validating them eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] for unusable tunables.
    pub fn with_tuning(mut self, tuning: TuningSettings) -> Result<Self, SettingsError> {
        tuning.moderation_policy()?;
        tuning.trail_limits()?;
        tuning.sas_policy()?;
        tuning.outbound_timeout()?;
        self.tuning = tuning;
        Ok(self)
    }
}

#[cfg(test)]
mod tests;
