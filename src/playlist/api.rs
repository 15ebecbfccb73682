//! Typed client for the six Spotify Web API calls the lifecycle needs.
//!
//! Every call goes through the shared [`AuthenticatingTransport`], so credentials are attached
//! and refreshed transparently. Any 2xx response is a success; other statuses become
//! [`RemoteErrorKind::Status`] carrying the API's `error.message` (or the raw body) and any
//! `Retry-After` hint.

// crates.io
use ::http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{PlaylistId, TrackId, UserId},
	context::CallContext,
	error::{ConfigError, InvalidArgumentError, RemoteError, RemoteErrorKind},
	http::{self, HttpResponse, HttpTransport},
	playlist::{PlaylistState, RemoteOperation, TimeRange},
	transport::AuthenticatingTransport,
};

const PLAYLIST_FIELDS: &str = "id,name,description,public";

/// Remote music API bound to one authenticated transport.
pub struct MusicApi<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<AuthenticatingTransport<T>>,
	base: Url,
}
impl<T> MusicApi<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client rooted at `base`, which should end with `/`.
	pub fn new(transport: Arc<AuthenticatingTransport<T>>, base: Url) -> Self {
		Self { transport, base }
	}

	/// API root every path is resolved against.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// `GET me/top/tracks`: track ids in ranking order. Entries without an id are skipped.
	///
	/// A zero `limit` fails with [`RemoteErrorKind::InvalidArgument`] before anything is sent.
	pub async fn top_tracks(
		&self,
		time_range: TimeRange,
		limit: u32,
		ctx: &CallContext,
	) -> Result<Vec<TrackId>, RemoteError> {
		#[derive(Deserialize)]
		struct Page {
			items: Vec<Item>,
		}
		#[derive(Deserialize)]
		struct Item {
			#[serde(default)]
			id: Option<TrackId>,
		}

		const OP: RemoteOperation = RemoteOperation::TopTracks;

		if limit == 0 {
			return Err(RemoteError::new(OP, InvalidArgumentError::NonPositiveTrackCount {
				value: 0,
			}));
		}

		let limit = limit.to_string();
		let query = [("time_range", time_range.as_str()), ("limit", limit.as_str())];
		let page: Page = self.get(OP, &["me", "top", "tracks"], &query, ctx).await?;

		Ok(page.items.into_iter().filter_map(|item| item.id).collect())
	}

	/// `GET me`: identity of the principal the credential belongs to.
	pub async fn current_user(&self, ctx: &CallContext) -> Result<UserId, RemoteError> {
		#[derive(Deserialize)]
		struct User {
			id: UserId,
		}

		let user: User = self.get(RemoteOperation::CurrentUser, &["me"], &[], ctx).await?;

		Ok(user.id)
	}

	/// `POST users/{user}/playlists`: creates a non-collaborative playlist.
	pub async fn create_playlist(
		&self,
		user: &UserId,
		name: &str,
		description: &str,
		public: bool,
		ctx: &CallContext,
	) -> Result<PlaylistState, RemoteError> {
		#[derive(Serialize)]
		struct NewPlaylist<'a> {
			name: &'a str,
			description: &'a str,
			public: bool,
			collaborative: bool,
		}

		const OP: RemoteOperation = RemoteOperation::CreatePlaylist;

		let body = NewPlaylist { name, description, public, collaborative: false };
		let response = self
			.send(OP, Method::POST, &["users", user.as_ref(), "playlists"], &[], Some(&body), ctx)
			.await?;

		decode(OP, &response)
	}

	/// `POST playlists/{id}/tracks`: appends tracks in the given order.
	pub async fn add_tracks(
		&self,
		playlist: &PlaylistId,
		tracks: &[TrackId],
		ctx: &CallContext,
	) -> Result<(), RemoteError> {
		#[derive(Serialize)]
		struct Additions {
			uris: Vec<String>,
		}

		let body = Additions { uris: tracks.iter().map(TrackId::uri).collect() };

		self.send(
			RemoteOperation::AddTracks,
			Method::POST,
			&["playlists", playlist.as_ref(), "tracks"],
			&[],
			Some(&body),
			ctx,
		)
		.await?;

		Ok(())
	}

	/// `GET playlists/{id}`: current name, description, and visibility.
	pub async fn get_playlist(
		&self,
		playlist: &PlaylistId,
		ctx: &CallContext,
	) -> Result<PlaylistState, RemoteError> {
		self.get(
			RemoteOperation::GetPlaylist,
			&["playlists", playlist.as_ref()],
			&[("fields", PLAYLIST_FIELDS)],
			ctx,
		)
		.await
	}

	/// `DELETE playlists/{id}/followers`: removes the playlist from the principal's library.
	pub async fn unfollow_playlist(
		&self,
		playlist: &PlaylistId,
		ctx: &CallContext,
	) -> Result<(), RemoteError> {
		self.send::<()>(
			RemoteOperation::UnfollowPlaylist,
			Method::DELETE,
			&["playlists", playlist.as_ref(), "followers"],
			&[],
			None,
			ctx,
		)
		.await?;

		Ok(())
	}

	async fn get<R>(
		&self,
		operation: RemoteOperation,
		segments: &[&str],
		query: &[(&str, &str)],
		ctx: &CallContext,
	) -> Result<R, RemoteError>
	where
		R: DeserializeOwned,
	{
		let response = self.send::<()>(operation, Method::GET, segments, query, None, ctx).await?;

		decode(operation, &response)
	}

	async fn send<B>(
		&self,
		operation: RemoteOperation,
		method: Method,
		segments: &[&str],
		query: &[(&str, &str)],
		body: Option<&B>,
		ctx: &CallContext,
	) -> Result<HttpResponse, RemoteError>
	where
		B: Serialize,
	{
		self.exchange(method, segments, query, body, ctx)
			.await
			.map_err(|kind| RemoteError::new(operation, kind))
	}

	async fn exchange<B>(
		&self,
		method: Method,
		segments: &[&str],
		query: &[(&str, &str)],
		body: Option<&B>,
		ctx: &CallContext,
	) -> Result<HttpResponse, RemoteErrorKind>
	where
		B: Serialize,
	{
		let url = self.url(segments, query)?;
		let mut builder = ::http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(ACCEPT, "application/json");
		let payload = match body {
			Some(body) => {
				builder = builder.header(CONTENT_TYPE, "application/json");

				serde_json::to_vec(body).map_err(|source| RemoteErrorKind::Encode { source })?
			},
			None => Vec::new(),
		};
		let request = builder.body(payload).map_err(ConfigError::from)?;
		let response = self.transport.execute(request, ctx).await?;
		let status = response.status();

		if !status.is_success() {
			return Err(RemoteErrorKind::Status {
				status: status.as_u16(),
				message: error_message(response.body()),
				retry_after: http::retry_after(response.headers()),
			});
		}

		Ok(response)
	}

	fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ConfigError> {
		let mut url = self.base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedUrl {
				field: "api_base",
				url: self.base.to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}
impl<T> Clone for MusicApi<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone(), base: self.base.clone() }
	}
}
impl<T> Debug for MusicApi<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MusicApi").field("base", &self.base.as_str()).finish()
	}
}

fn decode<R>(operation: RemoteOperation, response: &HttpResponse) -> Result<R, RemoteError>
where
	R: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RemoteError::new(operation, RemoteErrorKind::Decode { source }))
}

// Spotify reports `{"error":{"status":..,"message":..}}` for API errors and the OAuth-style
// `{"error":"..","error_description":".."}` for some token failures.
fn error_message(body: &[u8]) -> String {
	let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
	let message = parsed.as_ref().and_then(|value| {
		value
			.pointer("/error/message")
			.or_else(|| value.get("error_description"))
			.and_then(serde_json::Value::as_str)
	});

	match message {
		Some(message) if !message.is_empty() => message.to_owned(),
		_ => String::from_utf8_lossy(body).into_owned(),
	}
}
