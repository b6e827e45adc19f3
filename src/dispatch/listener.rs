//! Callback traits invoked by the dispatch table
//!
//! Listener identity is `Arc` pointer identity, not pattern equality:
//! registering the same `Arc` under two overlapping subscriptions is how
//! the dedupe policy decides "already invoked for this message".

use std::error::Error;

use tracing::warn;

use crate::topic::Subscription;

/// Boxed error returned by listener callbacks.
///
/// Anything convertible into a `Box<dyn Error>` works, including plain
/// string literals: `Err("bad payload".into())`.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A callback interested in messages matching one or more subscriptions.
///
/// `M` is the opaque message type handed over by the transport
/// collaborator; the engine never inspects it.
pub trait DispatchListener<M>: Send + Sync {
	/// Handles one matched message.
	///
	/// Returning `Err` counts as a fault: the dispatch table unregisters
	/// this listener from the matching subscription and notifies
	/// [`on_fault`](DispatchListener::on_fault). The error never
	/// propagates to other listeners or out of `dispatch`.
	fn on_message(&self, topic: &str, message: &M)
	-> Result<(), BoxError>;

	/// Best-effort fault notification after an `on_message` error.
	///
	/// Called once per fault, after this listener has been unregistered
	/// from the faulting subscription. The default implementation logs
	/// the fault and carries on.
	fn on_fault(
		&self,
		subscription: &Subscription,
		_message: &M,
		error: &BoxError,
	) {
		warn!(
			pattern = %subscription,
			error = %error,
			"unhandled listener fault"
		);
	}
}

/// The mandatory fallback invoked when no subscription matches a topic.
pub trait DefaultListener<M>: Send + Sync {
	/// Handles a message that matched no registered subscription.
	fn on_default(&self, message: &M) -> Result<(), BoxError>;

	/// Reports a fault in [`on_default`](DefaultListener::on_default).
	///
	/// Invoked once per fault, never retried. The default implementation
	/// logs the fault.
	fn on_default_fault(&self, error: &BoxError) {
		warn!(error = %error, "default listener fault");
	}
}

/// Plain closures act as listeners, which subsumes carrying user data:
/// captured state travels with the closure.
impl<M, F> DispatchListener<M> for F
where
	F: Fn(&str, &M) -> Result<(), BoxError> + Send + Sync,
{
	fn on_message(
		&self,
		topic: &str,
		message: &M,
	) -> Result<(), BoxError> {
		self(topic, message)
	}
}

/// Single-argument closures act as default listeners.
impl<M, F> DefaultListener<M> for F
where
	F: Fn(&M) -> Result<(), BoxError> + Send + Sync,
{
	fn on_default(&self, message: &M) -> Result<(), BoxError> {
		self(message)
	}
}
