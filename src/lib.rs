//! Declarative top-tracks playlists for a Spotify-compatible music API, driven through a
//! self-refreshing transport that authenticates every call with a proxy-issued bearer token.
//!
//! The crate is layered leaf-first:
//!
//! - [`store`] keeps the account-wide [`auth::Credential`] and swaps it atomically.
//! - [`issuer`] exchanges basic-auth proxy credentials for a fresh [`auth::Credential`].
//! - [`transport`] wraps any [`http::HttpTransport`] and guarantees a valid credential on every
//!   outbound request.
//! - [`playlist`] maps a desired-state record onto the remote API and back.
//! - [`provider`] wires configuration, transport, and controllers together.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod issuer;
pub mod obs;
pub mod playlist;
pub mod provider;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
