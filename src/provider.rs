//! Configured entry point that wires the issuer, the authenticating transport, and the
//! playlist controllers together.

// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	context::CallContext,
	http::HttpTransport,
	playlist::{MusicApi, PlaylistController},
	transport::AuthenticatingTransport,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport.
pub type ReqwestProvider = Provider<ReqwestHttpClient>;

/// Account-wide provider state shared by every resource operation.
///
/// All controllers handed out by one provider share a single [`AuthenticatingTransport`] and
/// therefore a single credential.
pub struct Provider<T>
where
	T: ?Sized + HttpTransport,
{
	config: ProviderConfig,
	transport: Arc<AuthenticatingTransport<T>>,
	api_base: Url,
}
impl<T> Provider<T>
where
	T: ?Sized + HttpTransport,
{
	/// Validates `config` and builds the provider on top of a caller-supplied base transport.
	///
	/// No network activity happens here; use [`Provider::prime`] or [`Provider::connect`] to
	/// fetch the first credential eagerly.
	pub fn with_http_client(config: ProviderConfig, http_client: impl Into<Arc<T>>) -> Result<Self> {
		let issuer = config.issuer_config()?;
		let api_base = config.api_base_url()?;
		let transport = Arc::new(AuthenticatingTransport::new(issuer, http_client.into()));

		Ok(Self { config, transport, api_base })
	}

	/// Builds the provider and fetches the first credential, surfacing issuance problems at
	/// configuration time.
	pub async fn connect(
		config: ProviderConfig,
		http_client: impl Into<Arc<T>>,
		ctx: &CallContext,
	) -> Result<Self> {
		let provider = Self::with_http_client(config, http_client)?;

		provider.prime(ctx).await?;

		Ok(provider)
	}

	/// Ensures the shared transport holds a valid credential.
	pub async fn prime(&self, ctx: &CallContext) -> Result<()> {
		self.transport.prime(ctx).await
	}

	/// Configuration the provider was built from.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Shared authenticating transport.
	pub fn transport(&self) -> &Arc<AuthenticatingTransport<T>> {
		&self.transport
	}

	/// Remote API client bound to the shared transport.
	pub fn api(&self) -> MusicApi<T> {
		MusicApi::new(self.transport.clone(), self.api_base.clone())
	}

	/// Lifecycle controller for playlist resources.
	pub fn playlists(&self) -> PlaylistController<T> {
		PlaylistController::new(self.api())
	}
}
#[cfg(feature = "reqwest")]
impl Provider<ReqwestHttpClient> {
	/// Builds a reqwest-backed provider and fetches the first credential.
	pub async fn configure(config: ProviderConfig, ctx: &CallContext) -> Result<Self> {
		let client = ReqwestHttpClient::try_default()?;

		Self::connect(config, client, ctx).await
	}
}
impl<T> Clone for Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			api_base: self.api_base.clone(),
		}
	}
}
impl<T> Debug for Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Provider")
			.field("config", &self.config)
			.field("api_base", &self.api_base.as_str())
			.field("transport", &self.transport)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[cfg(feature = "reqwest")]
	#[test]
	fn invalid_configuration_fails_before_any_request() {
		let err = ReqwestProvider::with_http_client(
			ProviderConfig::new("").with_auth_server("http://127.0.0.1:1"),
			ReqwestHttpClient::default(),
		)
		.expect_err("Missing api_key should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingApiKey)));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn controllers_share_one_transport() {
		let provider = ReqwestProvider::with_http_client(
			ProviderConfig::new("key").with_api_base("http://127.0.0.1:1/v1"),
			ReqwestHttpClient::default(),
		)
		.expect("Valid configuration should build.");
		let first = provider.playlists();
		let second = provider.clone().playlists();

		assert_eq!(first.api().base().as_str(), "http://127.0.0.1:1/v1/");
		assert!(Arc::ptr_eq(provider.transport(), provider.clone().transport()));
		assert_eq!(first.api().base(), second.api().base());
	}
}
