// self
use crate::{_prelude::*, auth::PlaylistId, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapper used by issuance and lifecycle operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("playlist_provider.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs the outcome of removing a playlist left behind by a failed create.
pub(crate) fn record_orphan_cleanup(id: &PlaylistId, result: &Result<()>) {
	#[cfg(feature = "tracing")]
	{
		match result {
			Ok(()) => tracing::info!(playlist_id = %id, "Removed orphaned playlist after failed create."),
			Err(e) => tracing::warn!(
				playlist_id = %id,
				error = %e,
				"Failed to remove orphaned playlist after failed create."
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (id, result);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn orphan_cleanup_logging_accepts_both_outcomes() {
		let id = PlaylistId::new("p1").expect("Playlist fixture should be valid.");

		record_orphan_cleanup(&id, &Ok(()));
		record_orphan_cleanup(&id, &Err(crate::error::Interrupted::Cancelled.into()));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(OperationKind::Read, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
