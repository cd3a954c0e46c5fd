//! Configuration types for packet generation.
//!
//! All pipeline behaviour is controlled through [`PacketConfig`], built via
//! its [`PacketConfigBuilder`]. The rendering endpoint is resolved once, when
//! the config is built, and is immutable for the life of the
//! [`crate::service::PacketService`] that owns it.

use crate::error::PacketError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Fallback rendering service base URL when nothing is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001";

/// Environment variable consulted by [`PacketConfig::from_env`].
pub const ENDPOINT_ENV_VAR: &str = "PACKET_SERVICE_URL";

/// Configuration for a [`crate::service::PacketService`].
///
/// # Example
/// ```rust
/// use submittal_packet::PacketConfig;
///
/// let config = PacketConfig::builder()
///     .endpoint("https://pdf.example.com/")
///     .render_timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint, "https://pdf.example.com");
/// ```
#[derive(Clone)]
pub struct PacketConfig {
    /// Rendering service base URL, without trailing slash.
    /// Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Per-document fetch timeout in seconds. Default: 60.
    pub fetch_timeout_secs: u64,

    /// Rendering POST timeout in seconds. Default: 120.
    ///
    /// Composition of a large packet is the slowest step in the pipeline;
    /// keep this well above the fetch timeout.
    pub render_timeout_secs: u64,

    /// Category directory lookup timeout in seconds. Default: 15.
    pub directory_timeout_secs: u64,

    /// Content type each source document is expected to carry.
    /// A mismatch is logged, never fatal. `None` disables the check.
    /// Default: `Some("application/pdf")`.
    pub expected_content_type: Option<String>,

    /// `User-Agent` sent on every outbound request.
    pub user_agent: String,

    /// Optional event sink for per-document progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fetch_timeout_secs: 60,
            render_timeout_secs: 120,
            directory_timeout_secs: 15,
            expected_content_type: Some("application/pdf".to_string()),
            user_agent: concat!("submittal-packet/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PacketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketConfig")
            .field("endpoint", &self.endpoint)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("directory_timeout_secs", &self.directory_timeout_secs)
            .field("expected_content_type", &self.expected_content_type)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PacketProgressCallback>"),
            )
            .finish()
    }
}

impl PacketConfig {
    /// Create a new builder for `PacketConfig`.
    pub fn builder() -> PacketConfigBuilder {
        PacketConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default config with the endpoint taken from `PACKET_SERVICE_URL`,
    /// falling back to [`DEFAULT_ENDPOINT`] when unset or blank.
    pub fn from_env() -> Result<Self, PacketError> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(ENDPOINT_ENV_VAR) {
            if !url.trim().is_empty() {
                builder = builder.endpoint(url);
            }
        }
        builder.build()
    }

    /// Full URL of the packet-generation route.
    pub fn generate_url(&self) -> String {
        format!("{}/generate-packet", self.endpoint)
    }
}

/// Builder for [`PacketConfig`].
pub struct PacketConfigBuilder {
    config: PacketConfig,
}

impl fmt::Debug for PacketConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PacketConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn directory_timeout_secs(mut self, secs: u64) -> Self {
        self.config.directory_timeout_secs = secs;
        self
    }

    pub fn expected_content_type(mut self, content_type: Option<String>) -> Self {
        self.config.expected_content_type = content_type;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PacketConfig, PacketError> {
        let c = &self.config;
        match reqwest::Url::parse(&c.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(PacketError::InvalidConfig(format!(
                    "endpoint must use http or https, got '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(PacketError::InvalidConfig(format!(
                    "endpoint '{}' is not a valid URL: {}",
                    c.endpoint, e
                )));
            }
        }
        for (name, secs) in [
            ("fetch timeout", c.fetch_timeout_secs),
            ("render timeout", c.render_timeout_secs),
            ("directory timeout", c.directory_timeout_secs),
        ] {
            if secs == 0 {
                return Err(PacketError::InvalidConfig(format!("{name} must be ≥ 1s")));
            }
        }
        Ok(self.config)
    }
}
