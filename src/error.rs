//! Provider-level error types shared by the issuer, transport, and lifecycle controller.

// self
use crate::{_prelude::*, playlist::RemoteOperation};

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, raised before any network activity.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential issuance failed; no API request was sent.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Desired-state validation failed; nothing was sent over the network.
	#[error(transparent)]
	InvalidArgument(#[from] InvalidArgumentError),
	/// A remote API operation failed.
	#[error(transparent)]
	Remote(#[from] RemoteError),
	/// The base transport failed while executing an authenticated request.
	#[error("Authenticated request failed in transport: {0}")]
	Transport(#[from] TransportError),
	/// The authenticated request was abandoned before completion.
	#[error("Authenticated request was interrupted: {0}")]
	Interrupted(#[from] Interrupted),
}
impl Error {
	/// Returns `true` if the remote API reported that the resource does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Remote(remote) if remote.is_not_found())
	}

	/// Returns `true` if the failure came from cancellation or an elapsed deadline at any stage.
	pub fn is_interrupted(&self) -> bool {
		match self {
			Self::Interrupted(_) => true,
			Self::Credential(CredentialError::Interrupted(_)) => true,
			Self::Remote(RemoteError {
				kind:
					RemoteErrorKind::Interrupted(_)
					| RemoteErrorKind::Credential(CredentialError::Interrupted(_)),
				..
			}) => true,
			_ => false,
		}
	}
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error("HTTP request could not be constructed.")]
	HttpRequest(#[from] ::http::Error),
	/// A configured URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Configuration field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL cannot carry path segments (e.g. `mailto:`).
	#[error("The {field} URL cannot be used as a base: {url}.")]
	UnsupportedUrl {
		/// Configuration field holding the URL.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// The proxy API key was empty.
	#[error("The api_key setting is required.")]
	MissingApiKey,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while obtaining a credential from the issuing proxy.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// The issuer answered with a non-200 status; `body` is the issuer's text verbatim.
	#[error("Credential issuance failed with HTTP {status}: {body}")]
	Issuance {
		/// HTTP status code returned by the issuer.
		status: u16,
		/// Response body text, verbatim.
		body: String,
	},
	/// The issuer's 200 response could not be parsed as a credential record.
	#[error("Credential issuer returned a malformed credential.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The parsed credential is empty, already expired, or unusable in a header.
	#[error("Credential issuer returned an invalid credential: {reason}.")]
	Invalid {
		/// What failed validation.
		reason: &'static str,
	},
	/// The issuance request could not be constructed.
	#[error("Credential issuance request could not be constructed: {0}")]
	Request(#[from] ::http::Error),
	/// Network failure while calling the issuer.
	#[error("Credential issuance failed in transport: {0}")]
	Transport(#[from] TransportError),
	/// Issuance was abandoned before completion.
	#[error("Credential issuance was interrupted: {0}")]
	Interrupted(#[from] Interrupted),
}

/// Rejections of the orchestrator-supplied desired state.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum InvalidArgumentError {
	/// The playlist name was empty.
	#[error("Playlist name cannot be empty.")]
	EmptyName,
	/// The time range is not one of `short_term`, `medium_term`, or `long_term`.
	#[error("Invalid time range: {value}.")]
	UnknownTimeRange {
		/// Rejected value.
		value: String,
	},
	/// Track count must be a positive integer.
	#[error("Track count must be positive, got {value}.")]
	NonPositiveTrackCount {
		/// Rejected value.
		value: i64,
	},
	/// Track count does not fit the request parameter.
	#[error("Track count {value} is out of range.")]
	TrackCountOutOfRange {
		/// Rejected value.
		value: i64,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
}

/// Failure of one remote API operation, tagged with the operation that failed.
#[derive(Debug, ThisError)]
#[error("Remote operation `{operation}` failed: {kind}")]
pub struct RemoteError {
	/// Operation that produced the failure.
	pub operation: RemoteOperation,
	/// What went wrong.
	#[source]
	pub kind: RemoteErrorKind,
}
impl RemoteError {
	/// Creates an error for the provided operation.
	pub fn new(operation: RemoteOperation, kind: impl Into<RemoteErrorKind>) -> Self {
		Self { operation, kind: kind.into() }
	}

	/// HTTP status reported by the remote API, if the failure was a status error.
	pub fn status(&self) -> Option<u16> {
		match &self.kind {
			RemoteErrorKind::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` for a 404 response.
	pub fn is_not_found(&self) -> bool {
		self.status() == Some(404)
	}
}

/// Failure categories for [`RemoteError`].
#[derive(Debug, ThisError)]
pub enum RemoteErrorKind {
	/// The API answered with a non-success status.
	#[error("HTTP {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// API-supplied message, or the raw body when none could be extracted.
		message: String,
		/// Retry-After hint, when supplied.
		retry_after: Option<Duration>,
	},
	/// The request body could not be encoded.
	#[error("request body could not be encoded: {source}")]
	Encode {
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// The success body could not be decoded.
	#[error("response body could not be decoded: {source}")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request could not be constructed.
	#[error("{0}")]
	Config(#[from] ConfigError),
	/// An argument of the call was rejected locally, e.g. a zero `top_tracks` limit.
	#[error("{0}")]
	InvalidArgument(#[from] InvalidArgumentError),
	/// A credential could not be obtained for the call.
	#[error("{0}")]
	Credential(#[from] CredentialError),
	/// Network failure.
	#[error("{0}")]
	Transport(#[from] TransportError),
	/// The call was abandoned before completion.
	#[error("{0}")]
	Interrupted(#[from] Interrupted),
}
impl From<Error> for RemoteErrorKind {
	fn from(e: Error) -> Self {
		match e {
			Error::Credential(inner) => Self::Credential(inner),
			Error::Transport(inner) => Self::Transport(inner),
			Error::Interrupted(inner) => Self::Interrupted(inner),
			Error::Remote(inner) => inner.kind,
			Error::Config(inner) => Self::Config(inner),
			Error::InvalidArgument(inner) => Self::InvalidArgument(inner),
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Reasons a call was abandoned by its [`CallContext`](crate::context::CallContext).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum Interrupted {
	/// The caller cancelled the operation.
	#[error("the operation was cancelled.")]
	Cancelled,
	/// The operation's deadline elapsed.
	#[error("the operation deadline elapsed.")]
	DeadlineExceeded,
}
