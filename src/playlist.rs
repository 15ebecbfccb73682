//! Playlist resource: desired/observed state, the remote API client, and the lifecycle
//! controller that ties them together.

pub mod api;
pub mod controller;
pub mod model;

pub use api::*;
pub use controller::*;
pub use model::*;
