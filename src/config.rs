//! Orchestrator-facing configuration and its validated issuer form.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

const DEFAULT_AUTH_SERVER: &str = "http://localhost:27228";
const DEFAULT_TOKEN_ID: &str = "terraform";
const DEFAULT_USERNAME: &str = "SpotifyAuthProxy";
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1/";

/// Provider configuration supplied once by the orchestrator.
///
/// URLs stay as raw strings until [`ProviderConfig::issuer_config`] or
/// [`ProviderConfig::api_base_url`] validates them, so a bad value surfaces as a
/// [`ConfigError`] naming the offending field rather than as a deserialization failure.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
	/// Base URL of the token-issuing proxy.
	#[serde(default = "default_auth_server")]
	pub auth_server: String,
	/// Token identifier appended to the issuance path.
	#[serde(default = "default_token_id")]
	pub token_id: String,
	/// Basic-auth principal presented to the proxy.
	#[serde(default = "default_username")]
	pub username: String,
	/// Basic-auth secret presented to the proxy.
	pub api_key: Secret,
	/// Base URL of the music API.
	#[serde(default = "default_api_base")]
	pub api_base: String,
}
impl ProviderConfig {
	/// Creates a configuration with default endpoints and the provided API key.
	pub fn new(api_key: impl Into<Secret>) -> Self {
		Self {
			auth_server: default_auth_server(),
			token_id: default_token_id(),
			username: default_username(),
			api_key: api_key.into(),
			api_base: default_api_base(),
		}
	}

	/// Overrides the proxy base URL.
	pub fn with_auth_server(mut self, auth_server: impl Into<String>) -> Self {
		self.auth_server = auth_server.into();

		self
	}

	/// Overrides the token identifier.
	pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
		self.token_id = token_id.into();

		self
	}

	/// Overrides the Basic-auth principal.
	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = username.into();

		self
	}

	/// Overrides the music API base URL.
	pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
		self.api_base = api_base.into();

		self
	}

	/// Validates the proxy settings and derives the issuance endpoint
	/// `{auth_server}/api/v1/token/{token_id}`.
	pub fn issuer_config(&self) -> Result<IssuerConfig, ConfigError> {
		if self.api_key.is_empty() {
			return Err(ConfigError::MissingApiKey);
		}

		let mut endpoint = parse_url("auth_server", &self.auth_server)?;

		endpoint
			.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedUrl {
				field: "auth_server",
				url: self.auth_server.clone(),
			})?
			.pop_if_empty()
			.extend(["api", "v1", "token", self.token_id.as_str()]);

		Ok(IssuerConfig {
			endpoint,
			principal: self.username.clone(),
			secret: self.api_key.clone(),
		})
	}

	/// Validates the music API base, normalized to end with `/` so relative joins keep its path.
	pub fn api_base_url(&self) -> Result<Url, ConfigError> {
		let mut url = parse_url("api_base", &self.api_base)?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedUrl { field: "api_base", url: self.api_base.clone() });
		}
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());

			url.set_path(&path);
		}

		Ok(url)
	}
}

/// Immutable settings for the credential issuance exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerConfig {
	/// Fully resolved issuance endpoint.
	pub endpoint: Url,
	/// Basic-auth principal.
	pub principal: String,
	/// Basic-auth secret.
	pub secret: Secret,
}
impl IssuerConfig {
	/// Creates an issuer configuration from already validated parts.
	pub fn new(endpoint: Url, principal: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self { endpoint, principal: principal.into(), secret: secret.into() }
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedUrl { field, url: raw.to_owned() }),
	}
}

fn default_auth_server() -> String {
	DEFAULT_AUTH_SERVER.into()
}

fn default_token_id() -> String {
	DEFAULT_TOKEN_ID.into()
}

fn default_username() -> String {
	DEFAULT_USERNAME.into()
}

fn default_api_base() -> String {
	DEFAULT_API_BASE.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_fill_missing_fields() {
		let config: ProviderConfig = serde_json::from_str(r#"{"api_key":"k"}"#)
			.expect("Minimal configuration should deserialize.");

		assert_eq!(config, ProviderConfig::new("k"));
		assert_eq!(config.username, "SpotifyAuthProxy");
		assert!(serde_json::from_str::<ProviderConfig>("{}").is_err(), "api_key is required.");
	}

	#[test]
	fn issuer_endpoint_appends_token_path() {
		let issuer = ProviderConfig::new("k")
			.issuer_config()
			.expect("Default configuration should validate.");

		assert_eq!(issuer.endpoint.as_str(), "http://localhost:27228/api/v1/token/terraform");
		assert_eq!(issuer.principal, "SpotifyAuthProxy");
		assert_eq!(issuer.secret.expose(), "k");

		let issuer = ProviderConfig::new("k")
			.with_auth_server("https://proxy.example.com/base/")
			.with_token_id("my token")
			.issuer_config()
			.expect("Prefixed configuration should validate.");

		assert_eq!(issuer.endpoint.as_str(), "https://proxy.example.com/base/api/v1/token/my%20token");
	}

	#[test]
	fn invalid_settings_are_rejected_before_any_request() {
		assert!(matches!(ProviderConfig::new("").issuer_config(), Err(ConfigError::MissingApiKey)));
		assert!(matches!(
			ProviderConfig::new("k").with_auth_server("not a url").issuer_config(),
			Err(ConfigError::InvalidUrl { field: "auth_server", .. })
		));
		assert!(matches!(
			ProviderConfig::new("k").with_auth_server("mailto:ops@example.com").issuer_config(),
			Err(ConfigError::UnsupportedUrl { field: "auth_server", .. })
		));
		assert!(matches!(
			ProviderConfig::new("k").with_api_base("ftp://example.com").api_base_url(),
			Err(ConfigError::UnsupportedUrl { field: "api_base", .. })
		));
	}

	#[test]
	fn api_base_gains_trailing_slash() {
		let base = ProviderConfig::new("k")
			.with_api_base("http://127.0.0.1:9000/v1")
			.api_base_url()
			.expect("API base should validate.");

		assert_eq!(base.as_str(), "http://127.0.0.1:9000/v1/");
	}
}
