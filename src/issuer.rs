//! Credential issuance against the token proxy.
//!
//! [`CredentialIssuer`] is the privileged path of the crate: it talks to the base
//! [`HttpTransport`] directly with basic authentication and never requires a bearer credential
//! itself. Callers decide where the resulting [`Credential`] is stored.

mod metrics;

pub use metrics::*;

// crates.io
use ::http::{
	HeaderValue, Method, StatusCode,
	header::{ACCEPT, AUTHORIZATION},
};
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{self, Credential, IssuedCredential},
	config::IssuerConfig,
	context::CallContext,
	error::CredentialError,
	http::{HttpRequest, HttpTransport},
	obs::{self, OperationKind},
};

/// Fetches fresh credentials from the configured issuance endpoint.
pub struct CredentialIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	config: IssuerConfig,
	base: Arc<T>,
	metrics: Arc<IssuanceMetrics>,
}
impl<T> CredentialIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an issuer that sends exchanges through `base`.
	pub fn new(config: IssuerConfig, base: Arc<T>) -> Self {
		Self { config, base, metrics: Default::default() }
	}

	/// Issuer settings.
	pub fn config(&self) -> &IssuerConfig {
		&self.config
	}

	/// Counters shared by every exchange this issuer performs.
	pub fn metrics(&self) -> Arc<IssuanceMetrics> {
		self.metrics.clone()
	}

	/// Performs one issuance exchange and returns a credential that is valid on receipt.
	///
	/// A non-200 answer fails with [`CredentialError::Issuance`] carrying the body verbatim.
	/// An unparsable 200 body fails with [`CredentialError::Malformed`], and a parsed credential
	/// that is empty, already expired, or not encodable as a header fails with
	/// [`CredentialError::Invalid`].
	pub async fn fetch(&self, ctx: &CallContext) -> Result<Credential, CredentialError> {
		obs::observe(OperationKind::IssueCredential, "fetch", async {
			self.metrics.record_attempt();

			let result = self.exchange(ctx).await;

			match &result {
				Ok(_) => self.metrics.record_issued(),
				Err(e) => self.metrics.record_failure(e),
			}

			result
		})
		.await
	}

	async fn exchange(&self, ctx: &CallContext) -> Result<Credential, CredentialError> {
		let request = self.request()?;
		let response = ctx.run(self.base.execute(request)).await??;
		let received_at = OffsetDateTime::now_utc();

		if response.status() != StatusCode::OK {
			return Err(CredentialError::Issuance {
				status: response.status().as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let issued: IssuedCredential = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| CredentialError::Malformed { source })?;
		let credential = issued.into_credential(received_at)?;

		if !auth::is_valid(Some(&credential), received_at) {
			return Err(CredentialError::Invalid { reason: "credential is empty or already expired" });
		}

		credential.authorization()?;

		Ok(credential)
	}

	fn request(&self) -> Result<HttpRequest, CredentialError> {
		let basic = STANDARD
			.encode(format!("{}:{}", self.config.principal, self.config.secret.expose()));
		let mut authorization =
			HeaderValue::try_from(format!("Basic {basic}")).map_err(::http::Error::from)?;

		authorization.set_sensitive(true);

		let request = ::http::Request::builder()
			.method(Method::POST)
			.uri(self.config.endpoint.as_str())
			.header(AUTHORIZATION, authorization)
			.header(ACCEPT, "application/json")
			.body(Vec::new())?;

		Ok(request)
	}
}
impl<T> Debug for CredentialIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialIssuer")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("principal", &self.config.principal)
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct NeverCalled;
	impl HttpTransport for NeverCalled {
		fn execute(&self, _: HttpRequest) -> crate::http::TransportFuture<'_> {
			Box::pin(async {
				Err(crate::error::TransportError::Io(std::io::Error::other(
					"Transport must not be called.",
				)))
			})
		}
	}

	fn issuer() -> CredentialIssuer<NeverCalled> {
		let endpoint = Url::parse("http://127.0.0.1:27228/api/v1/token/terraform")
			.expect("Endpoint fixture should parse.");

		CredentialIssuer::new(
			IssuerConfig::new(endpoint, "SpotifyAuthProxy", "key"),
			Arc::new(NeverCalled),
		)
	}

	#[test]
	fn request_uses_basic_auth_and_post() {
		let request = issuer().request().expect("Issuance request should build.");
		let header = request.headers().get(AUTHORIZATION).expect("Authorization should be set.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "http://127.0.0.1:27228/api/v1/token/terraform");
		assert!(request.body().is_empty());
		assert!(header.is_sensitive());
		assert_eq!(
			header.to_str().expect("Header should be visible ASCII."),
			format!("Basic {}", STANDARD.encode("SpotifyAuthProxy:key"))
		);
	}

	#[tokio::test]
	async fn cancelled_context_skips_the_exchange() {
		let issuer = issuer();
		let ctx = CallContext::background();

		ctx.cancel();

		let err = issuer.fetch(&ctx).await.expect_err("Cancelled issuance should fail.");

		assert!(matches!(err, CredentialError::Interrupted(crate::error::Interrupted::Cancelled)));
		assert_eq!(issuer.metrics().attempts(), 1);
		assert_eq!(issuer.metrics().failures(), 1);
		assert_eq!(issuer.metrics().interrupted(), 1);
	}
}
