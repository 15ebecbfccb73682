//! Immutable bearer credential, its validity check, and the issuer wire format.

// crates.io
use ::http::HeaderValue;
use serde::{Deserializer, de::Error as DeError};
use time::format_description::well_known::Rfc3339;
// self
use crate::{_prelude::*, auth::Secret, error::CredentialError};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Returns `true` iff a credential is present, carries a non-empty token, and `now` is strictly
/// before its expiry. Expiry is a hard boundary; no grace period applies.
pub fn is_valid(credential: Option<&Credential>, now: OffsetDateTime) -> bool {
	credential.is_some_and(|credential| credential.is_valid_at(now))
}

/// Account-wide bearer credential issued by the proxy.
///
/// Values are never mutated after construction; a refresh replaces the whole record.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Token type reported by the issuer (`Bearer` when omitted).
	pub token_type: String,
	/// Instant at which the credential stops being valid.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential from its parts.
	pub fn new(
		access_token: impl Into<Secret>,
		token_type: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self { access_token: access_token.into(), token_type: token_type.into(), expires_at }
	}

	/// Creates a bearer credential expiring at the provided instant.
	pub fn bearer(access_token: impl Into<Secret>, expires_at: OffsetDateTime) -> Self {
		Self::new(access_token, DEFAULT_TOKEN_TYPE, expires_at)
	}

	/// Validity at the provided instant.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		!self.access_token.is_empty() && now < self.expires_at
	}

	/// Validity against the current UTC clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` once `now` reaches the expiry instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}

	/// Authorization scheme implied by the token type.
	pub fn scheme(&self) -> &str {
		let token_type = self.token_type.as_str();

		if token_type.is_empty() || token_type.eq_ignore_ascii_case("bearer") {
			DEFAULT_TOKEN_TYPE
		} else if token_type.eq_ignore_ascii_case("mac") {
			"MAC"
		} else if token_type.eq_ignore_ascii_case("basic") {
			"Basic"
		} else {
			token_type
		}
	}

	/// Builds the sensitive `Authorization` header value for this credential.
	pub fn authorization(&self) -> Result<HeaderValue, CredentialError> {
		let mut value =
			HeaderValue::try_from(format!("{} {}", self.scheme(), self.access_token.expose()))
				.map_err(|_| CredentialError::Invalid {
					reason: "token cannot be encoded as a header value",
				})?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Credential record as returned by the issuing proxy.
///
/// `expiry` (RFC 3339) takes precedence over the relative `expires_in`; any `refresh_token`
/// is ignored because refreshes always go back to the proxy.
#[derive(Clone, Deserialize)]
pub struct IssuedCredential {
	/// Access token value.
	pub access_token: String,
	/// Token type, defaulting to `Bearer` when absent.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Absolute expiry instant.
	#[serde(default, deserialize_with = "deserialize_rfc3339")]
	pub expiry: Option<OffsetDateTime>,
	/// Lifetime in seconds relative to receipt.
	#[serde(default)]
	pub expires_in: Option<i64>,
}
impl IssuedCredential {
	/// Resolves the wire record into a [`Credential`], using `received_at` for relative expiry.
	pub fn into_credential(
		self,
		received_at: OffsetDateTime,
	) -> Result<Credential, CredentialError> {
		let expires_at = match (self.expiry, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(secs)) => received_at
				.checked_add(Duration::seconds(secs))
				.ok_or(CredentialError::Invalid { reason: "expires_in is out of range" })?,
			(None, None) =>
				return Err(CredentialError::Invalid { reason: "credential carries no expiry" }),
		};
		let token_type = self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into());

		Ok(Credential::new(self.access_token, token_type, expires_at))
	}
}

fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let Some(raw) = <Option<String>>::deserialize(deserializer)? else {
		return Ok(None);
	};

	OffsetDateTime::parse(&raw, &Rfc3339).map(Some).map_err(DeError::custom)
}
