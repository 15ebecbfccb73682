//! Desired-state, observed-state, and identity records for one playlist resource.

// self
use crate::{_prelude::*, auth::PlaylistId, error::InvalidArgumentError};

const DEFAULT_TRACK_COUNT: i64 = 20;

/// Listening-history window the top-tracks query is filtered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
	/// Roughly the last four weeks.
	#[default]
	ShortTerm,
	/// Roughly the last six months.
	MediumTerm,
	/// Several years of history.
	LongTerm,
}
impl TimeRange {
	/// Returns the query-string value understood by the remote API.
	pub const fn as_str(self) -> &'static str {
		match self {
			TimeRange::ShortTerm => "short_term",
			TimeRange::MediumTerm => "medium_term",
			TimeRange::LongTerm => "long_term",
		}
	}
}
impl Display for TimeRange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for TimeRange {
	type Err = InvalidArgumentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"short_term" => Ok(TimeRange::ShortTerm),
			"medium_term" => Ok(TimeRange::MediumTerm),
			"long_term" => Ok(TimeRange::LongTerm),
			_ => Err(InvalidArgumentError::UnknownTimeRange { value: s.to_owned() }),
		}
	}
}

/// Raw desired state as the orchestrator supplies it, before validation.
///
/// Omitted fields take the schema defaults: empty description, public, `short_term`, 20 tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistArgs {
	/// Playlist name; required.
	pub name: String,
	/// Playlist description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Whether the playlist is public.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub public: Option<bool>,
	/// One of `short_term`, `medium_term`, or `long_term`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_range: Option<String>,
	/// Number of top tracks to include.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub track_count: Option<i64>,
}
impl PlaylistArgs {
	/// Starts a desired state with the provided name and schema defaults.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), ..Default::default() }
	}

	/// Sets the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Sets visibility.
	pub fn with_public(mut self, public: bool) -> Self {
		self.public = Some(public);

		self
	}

	/// Sets the raw time range.
	pub fn with_time_range(mut self, time_range: impl Into<String>) -> Self {
		self.time_range = Some(time_range.into());

		self
	}

	/// Sets the raw track count.
	pub fn with_track_count(mut self, track_count: i64) -> Self {
		self.track_count = Some(track_count);

		self
	}

	/// Validates the raw input into a [`PlaylistSpec`].
	pub fn validate(&self) -> Result<PlaylistSpec, InvalidArgumentError> {
		self.clone().try_into()
	}
}

/// Validated, immutable desired state of a playlist.
///
/// A change to any field is realised by deleting and re-creating the playlist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PlaylistSpec {
	/// Non-empty playlist name.
	pub name: String,
	/// Playlist description.
	pub description: String,
	/// Whether the playlist is public.
	pub public: bool,
	/// Window for the top-tracks query.
	pub time_range: TimeRange,
	/// Upper bound on the number of tracks; always positive.
	pub track_count: u32,
}
impl TryFrom<PlaylistArgs> for PlaylistSpec {
	type Error = InvalidArgumentError;

	fn try_from(args: PlaylistArgs) -> Result<Self, Self::Error> {
		let time_range = match args.time_range.as_deref() {
			Some(raw) => raw.parse()?,
			None => TimeRange::default(),
		};

		if args.name.is_empty() {
			return Err(InvalidArgumentError::EmptyName);
		}

		let track_count = match args.track_count.unwrap_or(DEFAULT_TRACK_COUNT) {
			value if value <= 0 => return Err(InvalidArgumentError::NonPositiveTrackCount { value }),
			value => u32::try_from(value)
				.map_err(|_| InvalidArgumentError::TrackCountOutOfRange { value })?,
		};

		Ok(Self {
			name: args.name,
			description: args.description.unwrap_or_default(),
			public: args.public.unwrap_or(true),
			time_range,
			track_count,
		})
	}
}

/// Playlist fields as reported by the remote API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistState {
	/// Remote identity.
	pub id: PlaylistId,
	/// Current name.
	pub name: String,
	/// Current description; the API reports `null` for an empty one.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub description: String,
	/// Current visibility; the API may report `null` when unknown.
	#[serde(default, deserialize_with = "null_as_false")]
	pub public: bool,
}

/// Durable identity of one playlist resource plus the last observed state.
///
/// `id` is the only key the orchestrator needs to persist. It is unset while the resource
/// is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistResource {
	/// Remote identity, if the resource exists.
	pub id: Option<PlaylistId>,
	/// Last state read from the remote API.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub observed: Option<PlaylistState>,
}
impl PlaylistResource {
	/// A resource with no remote counterpart.
	pub fn absent() -> Self {
		Self::default()
	}

	/// A resource imported by identity; the next read fills in its observed state.
	pub fn existing(id: PlaylistId) -> Self {
		Self { id: Some(id), observed: None }
	}

	/// Returns `true` while the resource has a remote identity.
	pub fn is_present(&self) -> bool {
		self.id.is_some()
	}

	pub(crate) fn observe(&mut self, state: PlaylistState) {
		self.id = Some(state.id.clone());
		self.observed = Some(state);
	}

	pub(crate) fn clear(&mut self) {
		self.id = None;
		self.observed = None;
	}
}

/// Remote API operations, used to tag failures with the stage that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
	/// Fetching the principal's top tracks.
	TopTracks,
	/// Fetching the principal's identity.
	CurrentUser,
	/// Creating the playlist.
	CreatePlaylist,
	/// Adding tracks to the playlist.
	AddTracks,
	/// Fetching the playlist by id.
	GetPlaylist,
	/// Unfollowing (removing) the playlist.
	UnfollowPlaylist,
}
impl RemoteOperation {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RemoteOperation::TopTracks => "top_tracks",
			RemoteOperation::CurrentUser => "current_user",
			RemoteOperation::CreatePlaylist => "create_playlist",
			RemoteOperation::AddTracks => "add_tracks",
			RemoteOperation::GetPlaylist => "get_playlist",
			RemoteOperation::UnfollowPlaylist => "unfollow_playlist",
		}
	}
}
impl Display for RemoteOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(<Option<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(<Option<bool>>::deserialize(deserializer)?.unwrap_or_default())
}
