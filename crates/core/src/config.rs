use std::{env, fmt, time::Duration};

use crate::storage::{Result, StoreError};

/// Region and credentials for one store endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    region: String,
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    endpoint_url: Option<String>,
}

impl ConnectionDescriptor {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            endpoint_url: None,
        }
    }

    /// Load the descriptor from environment variables.
    ///
    /// Environment variables:
    /// - `AWS_ACCESS_KEY_ID` - Access key id (required)
    /// - `AWS_SECRET_ACCESS_KEY` - Secret access key (required)
    /// - `AWS_REGION` - Region (default: "us-east-1")
    /// - `AWS_SESSION_TOKEN` - Session token for temporary credentials
    /// - `AWS_ENDPOINT_URL` - Custom endpoint, e.g. a local DynamoDB
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            env::var(name)
                .map_err(|_| StoreError::Configuration(format!("{name} is not set")))
        };

        let mut descriptor = Self::new(
            required("AWS_ACCESS_KEY_ID")?,
            required("AWS_SECRET_ACCESS_KEY")?,
            env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        );
        descriptor.session_token = env::var("AWS_SESSION_TOKEN").ok();
        descriptor.endpoint_url = env::var("AWS_ENDPOINT_URL").ok();
        Ok(descriptor)
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Optimistic-concurrency policy for single-record writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionCheck {
    /// Overwrite unconditionally; the last writer wins.
    #[default]
    Skip,
    /// Require the stored version to match the record's `VERSION_ATTRIBUTE`
    /// and write the next version.
    Enforce,
}

/// How long and how often to poll a new table until it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWaitPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: u32,
    pub timeout: Duration,
}

impl Default for TableWaitPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(8),
            multiplier: 2,
            timeout: Duration::from_secs(300),
        }
    }
}

impl TableWaitPolicy {
    /// The interval after `current`, capped at `max_interval`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.multiplier)
            .min(self.max_interval)
    }
}

/// Facade-wide settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Read the latest committed value on gets and scans.
    pub consistent_read: bool,
    pub version_check: VersionCheck,
    pub table_wait: TableWaitPolicy,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            consistent_read: true,
            version_check: VersionCheck::Skip,
            table_wait: TableWaitPolicy::default(),
        }
    }
}

impl FacadeConfig {
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn with_version_check(mut self, version_check: VersionCheck) -> Self {
        self.version_check = version_check;
        self
    }

    pub fn with_table_wait(mut self, table_wait: TableWaitPolicy) -> Self {
        self.table_wait = table_wait;
        self
    }
}
