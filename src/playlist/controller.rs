//! Create/read/delete state machine for one playlist resource.
//!
//! A resource moves `absent → present → absent`. There is no update: a desired-state change is
//! realised by the orchestrator deleting and re-creating the playlist.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::PlaylistId,
	context::CallContext,
	http::HttpTransport,
	obs::{self, OperationKind},
	playlist::{MusicApi, PlaylistArgs, PlaylistResource, PlaylistSpec, PlaylistState},
};

const ORPHAN_CLEANUP_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Lifecycle controller that maps desired state onto remote API calls.
pub struct PlaylistController<T>
where
	T: ?Sized + HttpTransport,
{
	api: MusicApi<T>,
}
impl<T> PlaylistController<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a controller over the provided API client.
	pub fn new(api: MusicApi<T>) -> Self {
		Self { api }
	}

	/// Remote API client used by every transition.
	pub fn api(&self) -> &MusicApi<T> {
		&self.api
	}

	/// Validates raw orchestrator input and creates the playlist.
	///
	/// Validation runs before any network activity, so an unknown `time_range` fails with
	/// [`Error::InvalidArgument`] without issuing a credential or calling the API.
	pub async fn create(&self, args: &PlaylistArgs, ctx: &CallContext) -> Result<PlaylistResource> {
		obs::observe(OperationKind::Create, "create", async {
			let spec = args.validate()?;

			self.provision(&spec, ctx).await
		})
		.await
	}

	/// Creates the playlist for an already validated desired state.
	pub async fn create_spec(
		&self,
		spec: &PlaylistSpec,
		ctx: &CallContext,
	) -> Result<PlaylistResource> {
		obs::observe(OperationKind::Create, "create_spec", self.provision(spec, ctx)).await
	}

	/// Refreshes the observed state of `resource`.
	///
	/// A `404` means the playlist is gone: identity and observed state are cleared and no error
	/// is returned. Any other failure leaves the resource untouched. Reading an absent resource
	/// is a no-op.
	pub async fn read(&self, resource: &mut PlaylistResource, ctx: &CallContext) -> Result<()> {
		let Some(id) = resource.id.clone() else {
			return Ok(());
		};

		obs::observe(OperationKind::Read, "read", async {
			match self.fetch(&id, ctx).await? {
				Some(state) => resource.observe(state),
				None => resource.clear(),
			}

			Ok::<_, Error>(())
		})
		.await
	}

	/// Removes the playlist and clears the identity. On failure the identity is kept so the
	/// orchestrator can retry. Deleting an absent resource is a no-op.
	pub async fn delete(&self, resource: &mut PlaylistResource, ctx: &CallContext) -> Result<()> {
		let Some(id) = resource.id.clone() else {
			return Ok(());
		};

		obs::observe(OperationKind::Delete, "delete", async {
			self.api.unfollow_playlist(&id, ctx).await?;
			resource.clear();

			Ok::<_, Error>(())
		})
		.await
	}

	/// Fetches a playlist by id, mapping `404` to `None`.
	pub async fn fetch(&self, id: &PlaylistId, ctx: &CallContext) -> Result<Option<PlaylistState>> {
		match self.api.get_playlist(id, ctx).await {
			Ok(state) => Ok(Some(state)),
			Err(e) if e.is_not_found() => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn provision(&self, spec: &PlaylistSpec, ctx: &CallContext) -> Result<PlaylistResource> {
		let tracks = self.api.top_tracks(spec.time_range, spec.track_count, ctx).await?;
		let user = self.api.current_user(ctx).await?;
		let created = self
			.api
			.create_playlist(&user, &spec.name, &spec.description, spec.public, ctx)
			.await?;

		// The API rejects an empty `uris` list.
		let added = if tracks.is_empty() {
			Ok(())
		} else {
			self.api.add_tracks(&created.id, &tracks, ctx).await
		};

		if let Err(e) = added {
			self.discard_orphan(&created.id).await;

			return Err(e.into());
		}

		let mut resource = PlaylistResource::absent();

		resource.observe(created);

		Ok(resource)
	}

	// Runs under its own bounded context: the caller's may already be cancelled.
	async fn discard_orphan(&self, id: &PlaylistId) {
		let ctx = CallContext::background().with_timeout(ORPHAN_CLEANUP_TIMEOUT);
		let result = self.api.unfollow_playlist(id, &ctx).await.map_err(Error::from);

		obs::record_orphan_cleanup(id, &result);
	}
}
impl<T> Clone for PlaylistController<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { api: self.api.clone() }
	}
}
impl<T> Debug for PlaylistController<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PlaylistController").field("api", &self.api).finish()
	}
}
