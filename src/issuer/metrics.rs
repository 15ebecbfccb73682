// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::error::CredentialError;

/// Issuance outcome counters, with failures split by what went wrong.
#[derive(Debug, Default)]
pub struct IssuanceMetrics {
	attempts: AtomicU64,
	issued: AtomicU64,
	rejected: AtomicU64,
	malformed: AtomicU64,
	invalid: AtomicU64,
	unreachable: AtomicU64,
	interrupted: AtomicU64,
}
impl IssuanceMetrics {
	/// Exchanges started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Exchanges that produced a valid credential.
	pub fn successes(&self) -> u64 {
		self.issued.load(Ordering::Relaxed)
	}

	/// Exchanges the issuer answered with a non-200 status.
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// 200 answers whose body was not a credential record.
	pub fn malformed(&self) -> u64 {
		self.malformed.load(Ordering::Relaxed)
	}

	/// Parsed credentials that were empty, expired, or unusable in a header.
	pub fn invalid(&self) -> u64 {
		self.invalid.load(Ordering::Relaxed)
	}

	/// Exchanges that never got an answer because the request could not be built or sent.
	pub fn unreachable(&self) -> u64 {
		self.unreachable.load(Ordering::Relaxed)
	}

	/// Exchanges abandoned through cancellation or an elapsed deadline.
	pub fn interrupted(&self) -> u64 {
		self.interrupted.load(Ordering::Relaxed)
	}

	/// Sum of every failure category.
	pub fn failures(&self) -> u64 {
		self.rejected() + self.malformed() + self.invalid() + self.unreachable() + self.interrupted()
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_issued(&self) {
		self.issued.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self, error: &CredentialError) {
		let counter = match error {
			CredentialError::Issuance { .. } => &self.rejected,
			CredentialError::Malformed { .. } => &self.malformed,
			CredentialError::Invalid { .. } => &self.invalid,
			CredentialError::Request(_) | CredentialError::Transport(_) => &self.unreachable,
			CredentialError::Interrupted(_) => &self.interrupted,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{Interrupted, TransportError};

	#[test]
	fn failures_are_counted_by_cause() {
		let metrics = IssuanceMetrics::default();

		metrics.record_failure(&CredentialError::Issuance { status: 401, body: "nope".into() });
		metrics.record_failure(&CredentialError::Issuance { status: 500, body: String::new() });
		metrics.record_failure(&CredentialError::Invalid { reason: "expired" });
		metrics.record_failure(&CredentialError::Transport(TransportError::Io(
			std::io::Error::other("reset"),
		)));
		metrics.record_failure(&CredentialError::Interrupted(Interrupted::DeadlineExceeded));
		metrics.record_issued();

		assert_eq!(metrics.rejected(), 2);
		assert_eq!(metrics.malformed(), 0);
		assert_eq!(metrics.invalid(), 1);
		assert_eq!(metrics.unreachable(), 1);
		assert_eq!(metrics.interrupted(), 1);
		assert_eq!(metrics.failures(), 5);
		assert_eq!(metrics.successes(), 1);
	}
}
