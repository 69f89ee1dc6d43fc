// Copyright 2025 Cowboy AI, LLC.

//! Connection configuration: `ClientConfig` and its `ConnectionBuilder`.

use std::time::Duration;

use url::Url;

use crate::error::WbemResult;
use crate::namespace::Namespace;

/// HTTP Basic/Digest credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Validated configuration for a [`crate::engine::WbemConnection`].
/// Construct via [`ConnectionBuilder`]; there is no mutable global or
/// environment-derived state here, only what the caller passes in.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) url: Url,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) default_namespace: Option<Namespace>,
    pub(crate) timeout: Duration,
    pub(crate) stats_enabled: bool,
    pub(crate) tls_verify: bool,
    pub(crate) accept_compressed: bool,
    pub(crate) cimom_path: String,
}

impl ClientConfig {
    /// The configured server URL (scheme + host + port, no path).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The connection's default namespace, used when neither the operation
    /// nor the object path specifies one.
    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.default_namespace.as_ref()
    }

    /// Whether statistics collection is enabled.
    pub fn stats_enabled(&self) -> bool {
        self.stats_enabled
    }
}

/// Builds a [`ClientConfig`], mirroring the object model's builder-style
/// constructors: every field starts from an explicit, documented default,
/// and each setter is a plain consuming builder method.
pub struct ConnectionBuilder {
    config: ClientConfig,
}

impl ConnectionBuilder {
    /// Start building a configuration for `url` (e.g.
    /// `https://cimserver.example.com:5989`). Defaults: no credentials, no
    /// default namespace, 30s timeout, statistics disabled, TLS
    /// verification on, no compression, `/cimom` path.
    pub fn new(url: impl AsRef<str>) -> WbemResult<Self> {
        let url = Url::parse(url.as_ref())?;
        Ok(Self {
            config: ClientConfig {
                url,
                credentials: None,
                default_namespace: None,
                timeout: Duration::from_secs(30),
                stats_enabled: false,
                tls_verify: true,
                accept_compressed: false,
                cimom_path: "/cimom".to_string(),
            },
        })
    }

    /// Set HTTP Basic/Digest credentials.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Set the default namespace used when an operation doesn't supply one.
    pub fn default_namespace(mut self, namespace: &str) -> WbemResult<Self> {
        self.config.default_namespace = Some(Namespace::normalize(namespace)?);
        Ok(self)
    }

    /// Set the combined connect+send+receive timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable or disable per-method statistics collection.
    pub fn stats_enabled(mut self, enabled: bool) -> Self {
        self.config.stats_enabled = enabled;
        self
    }

    /// Enable or disable TLS certificate verification. Disabling this is a
    /// deliberate caller choice (e.g. a self-signed lab CIMOM) and is never
    /// the default.
    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.config.tls_verify = verify;
        self
    }

    /// Advertise Accept-Encoding for compressed responses. Off by default.
    pub fn accept_compressed(mut self, accept: bool) -> Self {
        self.config.accept_compressed = accept;
        self
    }

    /// Override the CIMOM path (`/cimom` by default).
    pub fn cimom_path(mut self, path: impl Into<String>) -> Self {
        self.config.cimom_path = path.into();
        self
    }

    /// Finish building.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config = ConnectionBuilder::new("https://cimserver.example.com:5989")
            .unwrap()
            .build();
        assert!(config.tls_verify);
        assert!(!config.stats_enabled);
        assert!(!config.accept_compressed);
        assert_eq!(config.cimom_path, "/cimom");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_normalizes_default_namespace() {
        let config = ConnectionBuilder::new("https://cimserver.example.com:5989")
            .unwrap()
            .default_namespace("//root/cimv2//")
            .unwrap()
            .build();
        assert_eq!(config.default_namespace().unwrap().as_str(), "root/cimv2");
    }
}
