//! Self-refreshing authenticated transport.
//!
//! [`AuthenticatingTransport`] sits in front of any [`HttpTransport`] and makes sure every
//! outbound request carries a valid bearer credential. When the held credential fails the
//! validity check it asks the [`CredentialIssuer`] for a new one, swaps it into the
//! [`CredentialStore`], and only then sends the request. Response statuses are never inspected:
//! a `401` from the API is returned like any other response.
//!
//! Concurrent requests are not deduplicated. Two requests that both observe an invalid
//! credential each perform an issuance exchange; the last replacement wins.

// crates.io
use ::http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	config::IssuerConfig,
	context::CallContext,
	http::{HttpRequest, HttpResponse, HttpTransport},
	issuer::{CredentialIssuer, IssuanceMetrics},
	store::CredentialStore,
};

/// HTTP pipeline that attaches a fresh bearer credential to every request.
pub struct AuthenticatingTransport<T>
where
	T: ?Sized + HttpTransport,
{
	issuer: CredentialIssuer<T>,
	base: Arc<T>,
	store: CredentialStore,
}
impl<T> AuthenticatingTransport<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a transport with an empty credential store; the first request triggers issuance.
	pub fn new(config: IssuerConfig, base: Arc<T>) -> Self {
		Self { issuer: CredentialIssuer::new(config, base.clone()), base, store: Default::default() }
	}

	/// Seeds the store with an already issued credential.
	pub fn with_credential(self, credential: Credential) -> Self {
		self.store.replace(credential);

		self
	}

	/// Issuer used when the held credential is invalid.
	pub fn issuer(&self) -> &CredentialIssuer<T> {
		&self.issuer
	}

	/// Credential store shared by every request through this transport.
	pub fn store(&self) -> &CredentialStore {
		&self.store
	}

	/// Snapshot of the held credential, for diagnostics.
	pub fn credential(&self) -> Option<Arc<Credential>> {
		self.store.current()
	}

	/// Issuance counters.
	pub fn issuance_metrics(&self) -> Arc<IssuanceMetrics> {
		self.issuer.metrics()
	}

	/// Ensures a valid credential is held without sending an API request.
	pub async fn prime(&self, ctx: &CallContext) -> Result<()> {
		self.ensure_credential(ctx).await.map(|_| ())
	}

	/// Returns the held credential if valid, otherwise fetches and stores a new one.
	///
	/// Issuance failures are returned unchanged and leave the store untouched.
	pub async fn ensure_credential(&self, ctx: &CallContext) -> Result<Arc<Credential>> {
		if let Some(credential) = self.store.valid_at(OffsetDateTime::now_utc()) {
			return Ok(credential);
		}

		let credential = self.issuer.fetch(ctx).await?;

		Ok(self.store.replace(credential))
	}

	/// Sends `request` with a valid `Authorization` header and returns the base response as is.
	///
	/// Any `Authorization` header already on the request is overwritten. When no valid
	/// credential can be obtained the request is never sent.
	pub async fn execute(
		&self,
		mut request: HttpRequest,
		ctx: &CallContext,
	) -> Result<HttpResponse> {
		let credential = self.ensure_credential(ctx).await?;
		let authorization = credential.authorization()?;

		request.headers_mut().insert(AUTHORIZATION, authorization);

		Ok(ctx.run(self.base.execute(request)).await??)
	}
}
impl<T> Debug for AuthenticatingTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatingTransport")
			.field("issuer", &self.issuer)
			.field("store", &self.store)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use ::http::StatusCode;
	// self
	use super::*;
	use crate::{error::TransportError, http::TransportFuture};

	#[derive(Default)]
	struct Recorder {
		calls: AtomicUsize,
		last_authorization: RwLock<Option<String>>,
	}
	impl HttpTransport for Recorder {
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);
				*self.last_authorization.write() = request
					.headers()
					.get(AUTHORIZATION)
					.and_then(|value| value.to_str().ok())
					.map(str::to_owned);

				let mut response = HttpResponse::new(b"{}".to_vec());

				*response.status_mut() = StatusCode::UNAUTHORIZED;

				Ok::<_, TransportError>(response)
			})
		}
	}

	fn transport(base: Arc<Recorder>) -> AuthenticatingTransport<Recorder> {
		let endpoint = Url::parse("http://127.0.0.1:1/api/v1/token/terraform")
			.expect("Endpoint fixture should parse.");

		AuthenticatingTransport::new(IssuerConfig::new(endpoint, "user", "key"), base)
	}

	#[tokio::test]
	async fn valid_credential_is_attached_and_statuses_pass_through() {
		let base = Arc::new(Recorder::default());
		let transport = transport(base.clone()).with_credential(Credential::new(
			"seeded",
			"bearer",
			OffsetDateTime::now_utc() + Duration::hours(1),
		));
		let request = ::http::Request::builder()
			.uri("http://127.0.0.1:1/v1/me")
			.header(AUTHORIZATION, "Bearer stale")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let response = transport
			.execute(request, &CallContext::background())
			.await
			.expect("Seeded credential should authorize the call.");

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(base.calls.load(Ordering::SeqCst), 1);
		assert_eq!(base.last_authorization.read().as_deref(), Some("Bearer seeded"));
		assert_eq!(transport.issuance_metrics().attempts(), 0);
	}

	#[tokio::test]
	async fn interrupted_issuance_sends_nothing() {
		let base = Arc::new(Recorder::default());
		let transport = transport(base.clone());
		let ctx = CallContext::background();

		ctx.cancel();

		let request = ::http::Request::builder()
			.uri("http://127.0.0.1:1/v1/me")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let err = transport.execute(request, &ctx).await.expect_err("Cancelled call should fail.");

		assert!(err.is_interrupted());
		assert_eq!(base.calls.load(Ordering::SeqCst), 0);
		assert!(transport.credential().is_none());
	}
}
