mod common;

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
use time::macros;
// self
use playlist_provider::{
	context::CallContext,
	error::CredentialError,
	http::ReqwestHttpClient,
	issuer::CredentialIssuer,
};

fn build_issuer(server: &MockServer) -> CredentialIssuer<ReqwestHttpClient> {
	let config = common::config(server)
		.issuer_config()
		.expect("Mock issuer configuration should validate.");

	CredentialIssuer::new(config, Arc::new(common::test_reqwest_http_client()))
}

async fn mock_issuer_response<'a>(
	server: &'a MockServer,
	status: u16,
	body: &'a str,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(common::TOKEN_PATH);
			then.status(status).body(body);
		})
		.await
}

#[tokio::test]
async fn fetch_sends_basic_auth_and_parses_the_credential() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let expected_auth =
		format!("Basic {}", STANDARD.encode(format!("{}:{}", common::USERNAME, common::API_KEY)));
	let body = common::token_body("issued-token");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(common::TOKEN_PATH).header("authorization", expected_auth);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;
	let credential = issuer
		.fetch(&CallContext::background())
		.await
		.expect("Issuance with valid basic auth should succeed.");

	mock.assert_async().await;

	assert_eq!(credential.access_token.expose(), "issued-token");
	assert_eq!(credential.scheme(), "Bearer");
	assert_eq!(credential.expires_at, macros::datetime!(2999-01-01 00:00 UTC));
	assert_eq!(issuer.metrics().attempts(), 1);
	assert_eq!(issuer.metrics().successes(), 1);
}

#[tokio::test]
async fn fetch_accepts_relative_expiry() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let _mock = mock_issuer_response(&server, 200, r#"{"access_token":"rel","expires_in":3600}"#).await;
	let credential = issuer
		.fetch(&CallContext::background())
		.await
		.expect("Relative expiry should resolve against receipt time.");

	assert!(credential.is_valid());
	assert_eq!(credential.token_type, "Bearer");
}

#[tokio::test]
async fn non_200_keeps_the_issuer_body_verbatim() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let mock = mock_issuer_response(&server, 401, "bad creds").await;
	let err = issuer
		.fetch(&CallContext::background())
		.await
		.expect_err("Rejected basic auth should fail issuance.");

	mock.assert_async().await;

	match err {
		CredentialError::Issuance { status, body } => {
			assert_eq!(status, 401);
			assert_eq!(body, "bad creds");
		},
		other => panic!("Unexpected issuance error: {other:?}."),
	}

	assert_eq!(issuer.metrics().failures(), 1);
	assert_eq!(issuer.metrics().rejected(), 1);
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let _mock = mock_issuer_response(&server, 200, r#"{"access_token":42}"#).await;
	let err = issuer
		.fetch(&CallContext::background())
		.await
		.expect_err("Numeric access token should not parse.");

	match err {
		CredentialError::Malformed { source } => assert_eq!(source.path().to_string(), "access_token"),
		other => panic!("Unexpected issuance error: {other:?}."),
	}

	assert_eq!(issuer.metrics().malformed(), 1);
}

#[tokio::test]
async fn unparsable_expiry_is_malformed() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let _mock =
		mock_issuer_response(&server, 200, r#"{"access_token":"t","expiry":"next tuesday"}"#).await;
	let err = issuer.fetch(&CallContext::background()).await.expect_err("Bad expiry should fail.");

	assert!(matches!(err, CredentialError::Malformed { .. }));
}

#[tokio::test]
async fn expired_or_empty_credentials_are_invalid() {
	let server = MockServer::start_async().await;
	let issuer = build_issuer(&server);
	let mut expired = mock_issuer_response(
		&server,
		200,
		r#"{"access_token":"old","expiry":"2020-01-01T00:00:00Z"}"#,
	)
	.await;
	let err =
		issuer.fetch(&CallContext::background()).await.expect_err("Expired credential should fail.");

	assert!(matches!(err, CredentialError::Invalid { .. }));

	expired.delete_async().await;

	let _empty = mock_issuer_response(
		&server,
		200,
		r#"{"access_token":"","expiry":"2999-01-01T00:00:00Z"}"#,
	)
	.await;
	let err =
		issuer.fetch(&CallContext::background()).await.expect_err("Empty credential should fail.");

	assert!(matches!(err, CredentialError::Invalid { .. }));
	assert_eq!(issuer.metrics().failures(), 2);
	assert_eq!(issuer.metrics().invalid(), 2);
}
