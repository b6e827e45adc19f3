//! Tests for the dispatch table: policies, fault isolation, fallback

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::listener::{BoxError, DefaultListener, DispatchListener};
use super::table::{DispatchMode, DispatchTable};
use crate::topic::Subscription;

/// Listener recording every delivery; optionally fails each one.
#[derive(Default)]
struct Recorder {
	deliveries: Mutex<Vec<(String, String)>>,
	faults: AtomicUsize,
	fail: bool,
}

impl Recorder {
	fn failing() -> Self {
		Self {
			fail: true,
			..Self::default()
		}
	}

	fn delivery_count(&self) -> usize {
		self.deliveries.lock().len()
	}

	fn fault_count(&self) -> usize {
		self.faults.load(Ordering::SeqCst)
	}
}

impl DispatchListener<String> for Recorder {
	fn on_message(
		&self,
		topic: &str,
		message: &String,
	) -> Result<(), BoxError> {
		self.deliveries
			.lock()
			.push((topic.to_string(), message.clone()));
		if self.fail {
			return Err("listener failure".into());
		}
		Ok(())
	}

	fn on_fault(
		&self,
		_subscription: &Subscription,
		_message: &String,
		_error: &BoxError,
	) {
		self.faults.fetch_add(1, Ordering::SeqCst);
	}
}

/// Default listener recording invocations; optionally fails each one.
#[derive(Default)]
struct DefaultRecorder {
	calls: AtomicUsize,
	faults: AtomicUsize,
	fail: bool,
}

impl DefaultRecorder {
	fn failing() -> Self {
		Self {
			fail: true,
			..Self::default()
		}
	}

	fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn fault_count(&self) -> usize {
		self.faults.load(Ordering::SeqCst)
	}
}

impl DefaultListener<String> for DefaultRecorder {
	fn on_default(&self, _message: &String) -> Result<(), BoxError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.fail {
			return Err("default failure".into());
		}
		Ok(())
	}

	fn on_default_fault(&self, _error: &BoxError) {
		self.faults.fetch_add(1, Ordering::SeqCst);
	}
}

fn sub(pattern: &str) -> Subscription {
	Subscription::new(pattern).expect("pattern should be valid")
}

fn table_with_default(
	mode: DispatchMode,
) -> (DispatchTable<String>, Arc<DefaultRecorder>) {
	let default = Arc::new(DefaultRecorder::default());
	(DispatchTable::new(mode, default.clone()), default)
}

fn msg(text: &str) -> String {
	text.to_string()
}

#[test]
fn routes_matching_topic_to_listener() {
	let (table, default) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::default());
	table.register(sub("a/b/c"), listener.clone());

	let outcome = table.dispatch("a/b/c", &msg("payload"));

	assert_eq!(listener.delivery_count(), 1);
	assert_eq!(
		listener.deliveries.lock()[0],
		("a/b/c".to_string(), "payload".to_string())
	);
	assert_eq!(outcome.matched_subscriptions, 1);
	assert_eq!(outcome.invoked, 1);
	assert_eq!(outcome.faulted, 0);
	assert!(!outcome.defaulted);
	assert_eq!(default.call_count(), 0);
}

#[test]
fn unmatched_topic_falls_back_to_default() {
	let (table, default) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::default());
	table.register(sub("a/b/c"), listener.clone());

	let outcome = table.dispatch("x/y/z", &msg("payload"));

	assert_eq!(listener.delivery_count(), 0);
	assert_eq!(default.call_count(), 1);
	assert!(outcome.defaulted);
	assert_eq!(outcome.matched_subscriptions, 0);
}

#[test]
fn dedupe_invokes_overlapping_listener_once() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::default());
	table.register(sub("a/*/c"), listener.clone());
	table.register(sub("*/b/c"), listener.clone());

	let outcome = table.dispatch("a/b/c", &msg("payload"));

	assert_eq!(listener.delivery_count(), 1);
	assert_eq!(outcome.matched_subscriptions, 2);
	assert_eq!(outcome.invoked, 1);
}

#[test]
fn call_each_invokes_once_per_matching_subscription() {
	let (table, _) = table_with_default(DispatchMode::CallEach);
	let listener = Arc::new(Recorder::default());
	table.register(sub("a/*/c"), listener.clone());
	table.register(sub("*/b/c"), listener.clone());

	let outcome = table.dispatch("a/b/c", &msg("payload"));

	assert_eq!(listener.delivery_count(), 2);
	assert_eq!(outcome.matched_subscriptions, 2);
	assert_eq!(outcome.invoked, 2);
}

#[test]
fn distinct_listeners_each_receive_the_message() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let first = Arc::new(Recorder::default());
	let second = Arc::new(Recorder::default());
	table.register(sub("a/>"), first.clone());
	table.register(sub("a/>"), second.clone());

	table.dispatch("a/b", &msg("payload"));

	assert_eq!(first.delivery_count(), 1);
	assert_eq!(second.delivery_count(), 1);
}

#[test]
fn register_is_idempotent_per_identity() {
	let (table, _) = table_with_default(DispatchMode::CallEach);
	let listener = Arc::new(Recorder::default());
	assert!(table.register(sub("a/b"), listener.clone()));
	assert!(!table.register(sub("a/b"), listener.clone()));

	table.dispatch("a/b", &msg("payload"));

	// registered once, invoked once, even in CallEach mode
	assert_eq!(listener.delivery_count(), 1);
}

#[test]
fn unregister_removes_by_identity() {
	let (table, default) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::default());
	let pattern = sub("a/b");
	table.register(pattern.clone(), listener.clone());

	assert!(table.unregister(&pattern, &listener));
	assert!(!table.unregister(&pattern, &listener));
	assert!(table.is_empty());

	table.dispatch("a/b", &msg("payload"));
	assert_eq!(listener.delivery_count(), 0);
	assert_eq!(default.call_count(), 1);
}

#[test]
fn unregister_keeps_remaining_listeners() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let keep = Arc::new(Recorder::default());
	let remove = Arc::new(Recorder::default());
	let pattern = sub("a/b");
	table.register(pattern.clone(), keep.clone());
	table.register(pattern.clone(), remove.clone());

	assert!(table.unregister(&pattern, &remove));
	assert_eq!(table.subscription_count(), 1);

	table.dispatch("a/b", &msg("payload"));
	assert_eq!(keep.delivery_count(), 1);
	assert_eq!(remove.delivery_count(), 0);
}

#[test]
fn faulting_listener_is_auto_unregistered() {
	let (table, default) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::failing());
	table.register(sub("a/>"), listener.clone());

	let outcome = table.dispatch("a/b", &msg("first"));
	assert_eq!(outcome.faulted, 1);
	assert_eq!(listener.delivery_count(), 1);
	assert_eq!(listener.fault_count(), 1);
	// the emptied subscription was swept in the same pass
	assert!(table.is_empty());

	// a second matching message no longer reaches the listener
	table.dispatch("a/c", &msg("second"));
	assert_eq!(listener.delivery_count(), 1);
	assert_eq!(default.call_count(), 1);
}

#[test]
fn fault_does_not_disturb_other_listeners() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let faulty = Arc::new(Recorder::failing());
	let healthy = Arc::new(Recorder::default());
	let pattern = sub("a/b");
	table.register(pattern.clone(), faulty.clone());
	table.register(pattern.clone(), healthy.clone());

	let outcome = table.dispatch("a/b", &msg("payload"));

	assert_eq!(outcome.faulted, 1);
	assert_eq!(healthy.delivery_count(), 1);
	// the healthy listener keeps the subscription alive
	assert_eq!(table.subscription_count(), 1);

	table.dispatch("a/b", &msg("again"));
	assert_eq!(healthy.delivery_count(), 2);
	assert_eq!(faulty.delivery_count(), 1);
}

#[test]
fn call_each_fault_unregisters_from_every_matching_subscription() {
	let (table, _) = table_with_default(DispatchMode::CallEach);
	let listener = Arc::new(Recorder::failing());
	table.register(sub("a/*/c"), listener.clone());
	table.register(sub("*/b/c"), listener.clone());

	let outcome = table.dispatch("a/b/c", &msg("payload"));

	// invoked and faulted once per matching subscription
	assert_eq!(outcome.invoked, 2);
	assert_eq!(outcome.faulted, 2);
	assert_eq!(listener.fault_count(), 2);
	assert!(table.is_empty());
}

#[test]
fn dedupe_fault_unregisters_only_where_invoked() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let listener = Arc::new(Recorder::failing());
	table.register(sub("a/*/c"), listener.clone());
	table.register(sub("*/b/c"), listener.clone());

	// dedupe invokes once, so the fault removes the listener from the
	// subscription that invoked it; the other registration survives
	let first = table.dispatch("a/b/c", &msg("first"));
	assert_eq!(first.invoked, 1);
	assert_eq!(first.faulted, 1);
	assert_eq!(table.subscription_count(), 1);

	// the surviving registration faults on the next matching message
	let second = table.dispatch("a/b/c", &msg("second"));
	assert_eq!(second.faulted, 1);
	assert!(table.is_empty());
	assert_eq!(listener.delivery_count(), 2);
}

#[test]
fn default_listener_fault_is_reported_once() {
	let default = Arc::new(DefaultRecorder::failing());
	let table: DispatchTable<String> =
		DispatchTable::new(DispatchMode::Dedupe, default.clone());

	let outcome = table.dispatch("no/match", &msg("payload"));

	assert!(outcome.defaulted);
	assert_eq!(default.call_count(), 1);
	assert_eq!(default.fault_count(), 1);

	// faults in the default listener do not unregister anything; the
	// next unmatched message reaches it again
	table.dispatch("still/no/match", &msg("payload"));
	assert_eq!(default.call_count(), 2);
	assert_eq!(default.fault_count(), 2);
}

#[test]
fn closures_can_listen() {
	let (table, _) = table_with_default(DispatchMode::Dedupe);
	let seen = Arc::new(AtomicUsize::new(0));
	let counter = seen.clone();
	table.register(
		sub("a/#"),
		Arc::new(
			move |_topic: &str, _message: &String| -> Result<(), BoxError> {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(())
			},
		),
	);

	table.dispatch("a", &msg("payload"));
	table.dispatch("a/b/c", &msg("payload"));
	assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn reports_mode_and_registrations() {
	let (table, _) = table_with_default(DispatchMode::CallEach);
	assert_eq!(table.mode(), DispatchMode::CallEach);
	assert!(table.is_empty());

	let listener = Arc::new(Recorder::default());
	table.register(sub("a/b"), listener.clone());
	table.register(sub("a/#"), listener.clone());

	assert_eq!(table.subscription_count(), 2);
	let mut active = table.active_subscriptions();
	active.sort();
	assert_eq!(active, [sub("a/#"), sub("a/b")]);
}
