//! Optional observability helpers for issuance and lifecycle operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `playlist_provider.operation` with the
//!   `operation` and `stage` (call site) fields, plus warnings for orphan cleanup.
//! - Enable `metrics` to increment the `playlist_provider_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Credential issuance against the proxy.
	IssueCredential,
	/// Playlist creation.
	Create,
	/// Playlist refresh from the remote API.
	Read,
	/// Playlist removal.
	Delete,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::IssueCredential => "issue_credential",
			OperationKind::Create => "create",
			OperationKind::Read => "read",
			OperationKind::Delete => "delete",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span, recording attempt and final outcome.
pub(crate) async fn observe<T, E, Fut>(
	kind: OperationKind,
	stage: &'static str,
	fut: Fut,
) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
{
	record_outcome(kind, Outcome::Attempt);

	let result = OperationSpan::new(kind, stage).instrument(fut).await;

	record_outcome(kind, if result.is_ok() { Outcome::Success } else { Outcome::Failure });

	result
}
