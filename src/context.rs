//! Cancellation and deadline propagation for network-bound steps.
//!
//! Every issuer and API call takes a [`CallContext`]. The context races the in-flight future
//! against its [`CancellationToken`] and optional deadline; whichever fires first wins, and
//! dropping the losing HTTP future aborts the request.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::Interrupted};

/// Cancellation signal plus optional deadline supplied by the orchestrator.
#[derive(Clone, Debug)]
pub struct CallContext {
	cancellation: CancellationToken,
	deadline: Option<Instant>,
}
impl CallContext {
	/// Context that is never cancelled and has no deadline.
	pub fn background() -> Self {
		Self { cancellation: CancellationToken::new(), deadline: None }
	}

	/// Uses the provided token as the cancellation signal.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;

		self
	}

	/// Sets an absolute deadline, keeping the earlier one if a deadline already exists.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(match self.deadline {
			Some(current) if current <= deadline => current,
			_ => deadline,
		});

		self
	}

	/// Sets a deadline relative to now.
	///
	/// A timeout too large to represent as an instant leaves the context unchanged.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		match Instant::now().checked_add(timeout) {
			Some(deadline) => self.with_deadline(deadline),
			None => self,
		}
	}

	/// Derives a context whose cancellation follows this one but can also be cancelled alone.
	pub fn child(&self) -> Self {
		Self { cancellation: self.cancellation.child_token(), deadline: self.deadline }
	}

	/// Cancels this context and every child derived from it.
	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	/// The cancellation token driving this context.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// The deadline, if one was set.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Returns the interruption that would stop a call started now, if any.
	pub fn check(&self) -> Result<(), Interrupted> {
		if self.cancellation.is_cancelled() {
			return Err(Interrupted::Cancelled);
		}
		if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
			return Err(Interrupted::DeadlineExceeded);
		}

		Ok(())
	}

	/// Drives `fut` to completion unless the context is cancelled or its deadline elapses.
	pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
	where
		F: Future,
	{
		self.check()?;

		match self.deadline {
			Some(deadline) => tokio::select! {
				biased;
				_ = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
				_ = tokio::time::sleep_until(deadline) => Err(Interrupted::DeadlineExceeded),
				output = fut => Ok(output),
			},
			None => tokio::select! {
				biased;
				_ = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
				output = fut => Ok(output),
			},
		}
	}
}
impl Default for CallContext {
	fn default() -> Self {
		Self::background()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn background_context_runs_to_completion() {
		let ctx = CallContext::background();

		assert_eq!(ctx.run(async { 7 }).await, Ok(7));
	}

	#[tokio::test]
	async fn cancelled_context_never_polls_the_future() {
		let ctx = CallContext::background();

		ctx.cancel();

		let mut polled = false;
		let result = ctx.run(async { polled = true }).await;

		assert_eq!(result, Err(Interrupted::Cancelled));
		assert!(!polled, "Future must not be polled after cancellation.");
	}

	#[tokio::test]
	async fn deadline_interrupts_a_pending_future() {
		let ctx = CallContext::background().with_timeout(StdDuration::from_millis(20));
		let result = ctx.run(std::future::pending::<()>()).await;

		assert_eq!(result, Err(Interrupted::DeadlineExceeded));
	}

	#[tokio::test]
	async fn cancellation_interrupts_an_in_flight_future() {
		let ctx = CallContext::background();
		let canceller = ctx.clone();
		let handle = tokio::spawn(async move { ctx.run(std::future::pending::<()>()).await });

		tokio::time::sleep(StdDuration::from_millis(10)).await;
		canceller.cancel();

		let result = handle.await.expect("Task should not panic.");

		assert_eq!(result, Err(Interrupted::Cancelled));
	}

	#[test]
	fn deadlines_only_tighten() {
		let now = Instant::now();
		let ctx = CallContext::background()
			.with_deadline(now + StdDuration::from_secs(5))
			.with_deadline(now + StdDuration::from_secs(60));

		assert_eq!(ctx.deadline(), Some(now + StdDuration::from_secs(5)));
	}

	#[tokio::test]
	async fn unrepresentable_timeout_leaves_the_context_unchanged() {
		let ctx = CallContext::background().with_timeout(StdDuration::MAX);

		assert_eq!(ctx.deadline(), None);
		assert_eq!(ctx.run(async { 7 }).await, Ok(7));

		let now = Instant::now();
		let ctx = CallContext::background()
			.with_deadline(now + StdDuration::from_secs(5))
			.with_timeout(StdDuration::MAX);

		assert_eq!(ctx.deadline(), Some(now + StdDuration::from_secs(5)));
	}

	#[test]
	fn child_follows_parent_cancellation() {
		let parent = CallContext::background();
		let child = parent.child();

		parent.cancel();

		assert_eq!(child.check(), Err(Interrupted::Cancelled));

		let parent = CallContext::background();
		let child = parent.child();

		child.cancel();

		assert_eq!(parent.check(), Ok(()));
	}
}
