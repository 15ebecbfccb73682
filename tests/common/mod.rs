#![allow(dead_code)]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
// self
use playlist_provider::{
	config::ProviderConfig,
	http::{HttpRequest, HttpTransport, ReqwestHttpClient, TransportFuture},
	reqwest::Client as ReqwestClient,
};

pub const API_KEY: &str = "test-api-key";
pub const USERNAME: &str = "SpotifyAuthProxy";
pub const TOKEN_PATH: &str = "/api/v1/token/terraform";

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock`, whose server URLs are `https://` with the `https` feature.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Configuration pointing both the issuer and the music API at the mock server.
pub fn config(server: &MockServer) -> ProviderConfig {
	ProviderConfig::new(API_KEY).with_auth_server(server.base_url()).with_api_base(server.url("/v1"))
}

/// Issuer body in the proxy's wire format with an absolute expiry far in the future.
pub fn token_body(access_token: &str) -> String {
	format!(
		"{{\"access_token\":\"{access_token}\",\"token_type\":\"bearer\",\"refresh_token\":\"ignored\",\"expiry\":\"2999-01-01T00:00:00Z\"}}"
	)
}

/// Mocks a successful issuance that hands out `access_token`.
pub async fn mock_issuer<'a>(server: &'a MockServer, access_token: &str) -> httpmock::Mock<'a> {
	let body = token_body(access_token);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

/// Reqwest transport that counts every exchange it is asked to perform.
pub struct CountingTransport {
	inner: ReqwestHttpClient,
	calls: AtomicUsize,
}
impl CountingTransport {
	pub fn new() -> Self {
		Self { inner: test_reqwest_http_client(), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl Default for CountingTransport {
	fn default() -> Self {
		Self::new()
	}
}
impl HttpTransport for CountingTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.execute(request)
	}
}
