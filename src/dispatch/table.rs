//! Subscription-to-callback dispatch table
//!
//! Owns the mapping from [`Subscription`] to registered listeners and
//! fans each inbound `(topic, message)` pair out to every interested
//! callback, applying the configured [`DispatchMode`], isolating
//! per-listener faults and falling back to the default listener when
//! nothing matches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::listener::{DefaultListener, DispatchListener};
use crate::topic::Subscription;

/// How overlapping subscription matches map to callback invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
	/// A listener registered under several subscriptions matching the
	/// same topic is invoked at most once per dispatched message.
	#[default]
	Dedupe,
	/// A listener is invoked once per matching subscription that
	/// references it, even if that means several calls for one message.
	CallEach,
}

/// Counters describing one [`dispatch`](DispatchTable::dispatch) pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
	/// Registered subscriptions that matched the topic
	pub matched_subscriptions: usize,
	/// Listener invocations attempted (faulting invocations included)
	pub invoked: usize,
	/// Listener invocations that returned an error
	pub faulted: usize,
	/// Whether the default listener was invoked (no subscription matched)
	pub defaulted: bool,
}

/// Most subscriptions carry very few listeners, so the per-subscription
/// set stays inline.
type ListenerSet<M> = SmallVec<[Arc<dyn DispatchListener<M>>; 4]>;

/// Thin data-pointer identity of a listener, ignoring vtable metadata.
fn listener_identity<M>(listener: &Arc<dyn DispatchListener<M>>) -> *const ()
{
	Arc::as_ptr(listener) as *const ()
}

/// Concurrent dispatch table mapping subscriptions to listener sets.
///
/// One coarse mutex guards the whole table; `register`, `unregister` and
/// `dispatch` each hold it for their full duration, listener invocation
/// included. That makes the mapping impossible to observe in a
/// partially-updated state, at the price of a usage contract: **listeners
/// must not synchronously call back into the same table**, or they
/// deadlock. Listeners doing slow work should hand off asynchronously
/// themselves.
///
/// Invariant: every registered subscription maps to a non-empty listener
/// set. Entries emptied by `unregister` are removed immediately; entries
/// emptied by fault auto-unregistration are swept at the end of the same
/// dispatch pass.
pub struct DispatchTable<M> {
	callbacks: Mutex<HashMap<Subscription, ListenerSet<M>>>,
	mode: DispatchMode,
	default_listener: Arc<dyn DefaultListener<M>>,
}

impl<M> DispatchTable<M> {
	/// Creates an empty table with the given selection policy and the
	/// mandatory fallback listener.
	pub fn new(
		mode: DispatchMode,
		default_listener: Arc<dyn DefaultListener<M>>,
	) -> Self {
		Self {
			callbacks: Mutex::new(HashMap::new()),
			mode,
			default_listener,
		}
	}

	/// The active selection policy.
	pub fn mode(&self) -> DispatchMode {
		self.mode
	}

	/// Number of subscriptions with at least one registered listener.
	pub fn subscription_count(&self) -> usize {
		self.callbacks.lock().len()
	}

	/// Whether no subscription is currently registered.
	pub fn is_empty(&self) -> bool {
		self.callbacks.lock().is_empty()
	}

	/// Snapshot of the currently registered subscriptions.
	pub fn active_subscriptions(&self) -> Vec<Subscription> {
		self.callbacks.lock().keys().cloned().collect()
	}

	/// Registers `listener` for messages matching `subscription`.
	///
	/// Idempotent per `(subscription, listener)` identity pair: returns
	/// `true` when the listener was newly added, `false` when that exact
	/// `Arc` was already registered under the subscription.
	pub fn register(
		&self,
		subscription: Subscription,
		listener: Arc<dyn DispatchListener<M>>,
	) -> bool {
		let mut callbacks = self.callbacks.lock();
		let listeners = callbacks.entry(subscription.clone()).or_default();
		if listeners
			.iter()
			.any(|existing| Arc::ptr_eq(existing, &listener))
		{
			return false;
		}
		listeners.push(listener);
		debug!(
			pattern = %subscription,
			listeners = listeners.len(),
			"listener registered"
		);
		true
	}

	/// Removes `listener` from `subscription`'s set, returning whether it
	/// was present. A subscription whose last listener is removed is
	/// dropped from the table entirely.
	///
	/// Accepts the concrete `Arc` handed to
	/// [`register`](DispatchTable::register) or an already-unsized
	/// `Arc<dyn DispatchListener<M>>`; only pointer identity matters.
	pub fn unregister<L>(
		&self,
		subscription: &Subscription,
		listener: &Arc<L>,
	) -> bool
	where
		L: DispatchListener<M> + ?Sized,
	{
		let target = Arc::as_ptr(listener) as *const ();
		let mut callbacks = self.callbacks.lock();
		let Some(listeners) = callbacks.get_mut(subscription) else {
			return false;
		};
		let before = listeners.len();
		listeners.retain(|existing| listener_identity(existing) != target);
		let removed = listeners.len() != before;
		if removed {
			debug!(pattern = %subscription, "listener unregistered");
			if listeners.is_empty() {
				callbacks.remove(subscription);
				debug!(pattern = %subscription, "subscription removed");
			}
		}
		removed
	}

	/// Routes one message to every listener whose subscription matches
	/// `topic`, under the active [`DispatchMode`].
	///
	/// A listener returning `Err` is unregistered from the matching
	/// subscription and notified via
	/// [`on_fault`](DispatchListener::on_fault); the error never aborts
	/// the remaining dispatch. When no subscription matches, the default
	/// listener's `on_default` runs instead, with its own fault routed to
	/// `on_default_fault` exactly once. This method itself never fails.
	pub fn dispatch(&self, topic: &str, message: &M) -> DispatchOutcome {
		let mut callbacks = self.callbacks.lock();
		let mut outcome = DispatchOutcome::default();
		// listeners already invoked during this pass (Dedupe only)
		let mut already_called: HashSet<*const ()> = HashSet::new();

		for (subscription, listeners) in callbacks.iter_mut() {
			if !subscription.matches(topic) {
				continue;
			}
			outcome.matched_subscriptions += 1;
			listeners.retain(|listener| {
				if self.mode == DispatchMode::Dedupe
					&& !already_called.insert(listener_identity(listener))
				{
					// already invoked for this message; keep registered
					return true;
				}
				outcome.invoked += 1;
				match listener.on_message(topic, message) {
					| Ok(()) => true,
					| Err(error) => {
						outcome.faulted += 1;
						warn!(
							pattern = %subscription,
							topic,
							error = %error,
							"listener faulted, unregistering"
						);
						listener.on_fault(subscription, message, &error);
						false
					}
				}
			});
		}
		if outcome.faulted > 0 {
			// sweep subscriptions emptied by fault auto-unregistration
			callbacks.retain(|_, listeners| !listeners.is_empty());
		}

		if outcome.matched_subscriptions == 0 {
			outcome.defaulted = true;
			if let Err(error) = self.default_listener.on_default(message) {
				warn!(topic, error = %error, "default listener faulted");
				self.default_listener.on_default_fault(&error);
			}
		}
		outcome
	}
}
