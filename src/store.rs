//! Account-wide credential cell shared by every request that goes through one transport.
//!
//! The cell holds an `Option<Arc<Credential>>` behind a [`RwLock`]. Readers clone the `Arc`
//! and release the lock immediately; writers swap the whole value. A reader therefore sees
//! either the previous credential or the replacement, never a mix of the two, and no lock
//! is ever held across an `.await` point.

// self
use crate::{
	_prelude::*,
	auth::{self, Credential},
};

/// Thread-safe holder for the current [`Credential`].
#[derive(Debug, Default)]
pub struct CredentialStore(RwLock<Option<Arc<Credential>>>);
impl CredentialStore {
	/// Creates a store seeded with a credential.
	pub fn with_credential(credential: Credential) -> Self {
		Self(RwLock::new(Some(Arc::new(credential))))
	}

	/// Snapshot of the held credential, valid or not.
	pub fn current(&self) -> Option<Arc<Credential>> {
		self.0.read().clone()
	}

	/// Returns the held credential only when it passes the validity check at `now`.
	pub fn valid_at(&self, now: OffsetDateTime) -> Option<Arc<Credential>> {
		self.current().filter(|credential| auth::is_valid(Some(credential), now))
	}

	/// Returns `true` when the held credential is valid at `now`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		self.valid_at(now).is_some()
	}

	/// Replaces the held credential wholesale and returns the stored handle.
	pub fn replace(&self, credential: Credential) -> Arc<Credential> {
		let credential = Arc::new(credential);

		*self.0.write() = Some(credential.clone());

		credential
	}

	/// Drops the held credential so the next request fetches a new one.
	pub fn clear(&self) -> Option<Arc<Credential>> {
		self.0.write().take()
	}
}
