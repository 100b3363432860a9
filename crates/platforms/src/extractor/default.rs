use super::error::ExtractorError;
use super::factory::ExtractorFactory;
use reqwest::Client;
use rustls::crypto::ring;
use rustls_platform_verifier::BuilderVerifierExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_UA.to_string(),
            proxy: None,
        }
    }
}

pub fn default_client() -> Result<Client, ExtractorError> {
    create_client(&ClientConfig::default())
}

pub fn create_client(config: &ClientConfig) -> Result<Client, ExtractorError> {
    let provider = Arc::new(ring::default_provider());
    let tls_config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ExtractorError::ClientBuild(e.to_string()))?
        .with_platform_verifier()
        .map_err(|e| ExtractorError::ClientBuild(e.to_string()))?
        .with_no_client_auth();

    let mut builder = Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout);

    if let Some(proxy_config) = &config.proxy {
        match reqwest::Proxy::all(&proxy_config.url) {
            Ok(mut proxy) => {
                if let (Some(username), Some(password)) =
                    (&proxy_config.username, &proxy_config.password)
                {
                    proxy = proxy.basic_auth(username, password);
                }
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                warn!("Failed to configure proxy '{}': {}", proxy_config.url, e);
            }
        }
    }

    builder
        .build()
        .map_err(|e| ExtractorError::ClientBuild(e.to_string()))
}

/// Returns a new `ExtractorFactory` populated with all the supported platforms.
pub fn default_factory() -> Result<ExtractorFactory, ExtractorError> {
    Ok(ExtractorFactory::new(default_client()?))
}

/// Returns a new `ExtractorFactory` whose client follows `config`.
pub fn factory_with_config(config: &ClientConfig) -> Result<ExtractorFactory, ExtractorError> {
    Ok(ExtractorFactory::new(create_client(config)?))
}
