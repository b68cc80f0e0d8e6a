//! Media object naming and signed URL requests.
//!
//! Images are uploaded straight to blob storage with a short-lived signed
//! URL. The backend only ever stores the object key (the blob name).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use url::Url;

/// Maximum characters kept from a client file name.
pub const FILE_NAME_MAX_CHARS: usize = 200;

/// Content type signed into upload URLs when the client gives none.
pub const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Default lifetime of upload URLs in minutes.
pub const DEFAULT_UPLOAD_TTL_MINUTES: i64 = 10;

/// Default lifetime of read URLs in minutes.
pub const DEFAULT_READ_TTL_MINUTES: i64 = 15;

/// Seconds a signed URL is back-dated to tolerate clock skew.
pub const START_SKEW_SECONDS: i64 = 60;

/// Permissions granted to upload URLs unless configured otherwise.
pub const DEFAULT_UPLOAD_PERMISSIONS: SasPermissions = SasPermissions {
    read: false,
    create: true,
    write: true,
};

/// Permissions granted to read URLs.
pub const READ_PERMISSIONS: SasPermissions = SasPermissions {
    read: true,
    create: false,
    write: false,
};

/// Errors raised while deriving media values from client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    /// The file name was missing or blank.
    MissingFileName,
    /// A permission string contained an unsupported flag.
    InvalidPermissions { value: String },
    /// A permission string granted nothing.
    EmptyPermissions,
}

impl fmt::Display for MediaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFileName => f.write_str("fileName must not be empty"),
            Self::InvalidPermissions { value } => write!(
                f,
                "permissions may only contain 'r', 'c' and 'w' (got {value:?})"
            ),
            Self::EmptyPermissions => f.write_str("permissions must grant at least one right"),
        }
    }
}

impl std::error::Error for MediaValidationError {}

/// Object key inside the media container.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use trailshare::domain::BlobName;
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("valid instant");
/// let name = BlobName::from_file_name("my photo (1).JPG", at).expect("valid name");
/// assert_eq!(name.as_str(), "1700000000000_my_photo__1_.JPG");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobName(String);

impl BlobName {
    /// Derive a unique object key `<epoch-ms>_<sanitised name>`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_` and the name is cut to
    /// [`FILE_NAME_MAX_CHARS`] characters.
    pub fn from_file_name(
        file_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, MediaValidationError> {
        let trimmed = file_name.trim();
        if trimmed.is_empty() {
            return Err(MediaValidationError::MissingFileName);
        }
        let safe: String = trimmed
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                    ch
                } else {
                    '_'
                }
            })
            .take(FILE_NAME_MAX_CHARS)
            .collect();
        Ok(Self(format!("{}_{safe}", now.timestamp_millis())))
    }

    /// Wrap an existing key, such as a stored `imagePath`.
    pub fn existing(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subset of blob SAS permissions used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasPermissions {
    read: bool,
    create: bool,
    write: bool,
}

impl SasPermissions {
    /// Whether read access is granted.
    #[must_use]
    pub const fn allows_read(&self) -> bool {
        self.read
    }

    /// Whether create or write access is granted.
    #[must_use]
    pub const fn allows_upload(&self) -> bool {
        self.create || self.write
    }
}

impl FromStr for SasPermissions {
    type Err = MediaValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut permissions = Self {
            read: false,
            create: false,
            write: false,
        };
        for flag in raw.trim().chars() {
            match flag {
                'r' => permissions.read = true,
                'c' => permissions.create = true,
                'w' => permissions.write = true,
                _ => {
                    return Err(MediaValidationError::InvalidPermissions {
                        value: raw.to_owned(),
                    });
                }
            }
        }
        if !permissions.read && !permissions.allows_upload() {
            return Err(MediaValidationError::EmptyPermissions);
        }
        Ok(permissions)
    }
}

/// Renders the canonical `sp` value, flags ordered `r`, `c`, `w`.
impl fmt::Display for SasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, granted) in [('r', self.read), ('c', self.create), ('w', self.write)] {
            if granted {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

/// Everything needed to sign one blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest {
    pub blob_name: BlobName,
    pub permissions: SasPermissions,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub content_type: Option<String>,
}

/// A signed URL and the unsigned object URL it grants access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: Url,
    pub blob_url: Url,
    pub expires_at: DateTime<Utc>,
}

/// Validity windows and permissions used when minting signed URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasPolicy {
    upload_permissions: SasPermissions,
    upload_ttl: TimeDelta,
    read_ttl: TimeDelta,
}

impl SasPolicy {
    /// Build a policy from explicit windows.
    #[must_use]
    pub fn new(
        upload_permissions: SasPermissions,
        upload_ttl: TimeDelta,
        read_ttl: TimeDelta,
    ) -> Self {
        Self {
            upload_permissions,
            upload_ttl,
            read_ttl,
        }
    }

    /// Permissions granted to upload URLs.
    #[must_use]
    pub fn upload_permissions(&self) -> SasPermissions {
        self.upload_permissions
    }

    /// Signing request for a new upload to `blob_name`.
    #[must_use]
    pub fn upload_request(
        &self,
        blob_name: BlobName,
        content_type: Option<String>,
        now: DateTime<Utc>,
    ) -> SignedUrlRequest {
        SignedUrlRequest {
            blob_name,
            permissions: self.upload_permissions,
            starts_at: now - TimeDelta::seconds(START_SKEW_SECONDS),
            expires_at: now + self.upload_ttl,
            content_type,
        }
    }

    /// Signing request for reading `blob_name`.
    #[must_use]
    pub fn read_request(&self, blob_name: BlobName, now: DateTime<Utc>) -> SignedUrlRequest {
        SignedUrlRequest {
            blob_name,
            permissions: READ_PERMISSIONS,
            starts_at: now - TimeDelta::seconds(START_SKEW_SECONDS),
            expires_at: now + self.read_ttl,
            content_type: None,
        }
    }
}

impl Default for SasPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_UPLOAD_PERMISSIONS,
            TimeDelta::minutes(DEFAULT_UPLOAD_TTL_MINUTES),
            TimeDelta::minutes(DEFAULT_READ_TTL_MINUTES),
        )
    }
}
