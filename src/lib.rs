//! # Topic Dispatch
//!
//! A Rust library for wildcard topic subscription matching and callback
//! dispatch over hierarchical, slash-delimited pub/sub topics.
//!
//! ## Features
//!
//! - **Validated Subscription Patterns**: malformed wildcard placement is
//!   rejected at construction, never at match time
//! - **Linear Matching**: a single allocation-free scan decides
//!   topic-versus-pattern matches
//! - **Regex Reference Path**: every pattern also compiles to an
//!   equivalent regular expression, kept as an independently testable
//!   implementation
//! - **Concurrent Dispatch Table**: thread-safe registration and dispatch
//!   with overlapping-match policies, per-listener fault isolation and a
//!   default fallback listener
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use topic_dispatch::{
//! 	BoxError, DispatchMode, DispatchTable, Subscription,
//! };
//!
//! let table: DispatchTable<String> = DispatchTable::new(
//! 	DispatchMode::Dedupe,
//! 	Arc::new(|message: &String| -> Result<(), BoxError> {
//! 		println!("unmatched: {message}");
//! 		Ok(())
//! 	}),
//! );
//!
//! let subscription = Subscription::new("sensors/*/temperature")?;
//! table.register(
//! 	subscription,
//! 	Arc::new(
//! 		|topic: &str, message: &String| -> Result<(), BoxError> {
//! 			println!("{topic}: {message}");
//! 			Ok(())
//! 		},
//! 	),
//! );
//!
//! let outcome =
//! 	table.dispatch("sensors/kitchen/temperature", &"21.5".to_string());
//! assert_eq!(outcome.matched_subscriptions, 1);
//! # Ok::<(), topic_dispatch::PatternError>(())
//! ```
//!
//! ## Pattern Matching
//!
//! Subscription patterns support SMF-style wildcards, plus an optional
//! MQTT-style extension:
//!
//! - `*` matches a single topic level (e.g. `sensors/*/temperature`),
//!   or the remainder of one (`sensors/temp*`)
//! - `>` matches one or more remaining levels (e.g. `sensors/>`)
//! - a trailing `#` matches **zero** or more remaining levels: `a/#`
//!   matches the bare `a` as well, which `a/>` does not
//!
//! The `#` forms can be disabled per subscription with
//! [`WildcardMode::Smf`], leaving a strict SMF wildcard set.
//!
//! ## Usage Contract
//!
//! One mutex guards the whole dispatch table and is held across listener
//! invocation. Listeners must not synchronously call back into the same
//! table (register, unregister or dispatch) or they deadlock; slow
//! listeners should hand work off themselves. Faults, by contrast, are
//! safe: a listener returning `Err` is unregistered and the remaining
//! dispatch continues.

#![warn(missing_docs)]

// Core modules
pub mod dispatch;
pub mod topic;

// === Core Public API ===
// Dispatch table and callback traits
pub use dispatch::{
	BoxError, DefaultListener, DispatchListener, DispatchMode,
	DispatchOutcome, DispatchTable,
};
// Subscription pattern types
pub use topic::{PatternError, Subscription, WildcardMode};

/// Result type alias for operations that may fail with [`PatternError`]
pub type Result<T> = std::result::Result<T, PatternError>;

/// Prelude module for convenient imports
///
/// Essential types for typical dispatch-table usage:
///
/// ```rust
/// use topic_dispatch::prelude::*;
/// ```
pub mod prelude {

	pub use crate::{
		BoxError, DefaultListener, DispatchListener, DispatchMode,
		DispatchOutcome, DispatchTable, PatternError, Result, Subscription,
		WildcardMode,
	};
}

/// Advanced types and utilities for diagnostics and verification
///
/// Free functions independent of any table instance: validation,
/// matching and regex compilation for ad hoc pattern handling.
///
/// ```rust
/// use topic_dispatch::advanced::*;
/// ```
pub mod advanced {

	pub use crate::topic::sub_regex::{
		build_sub_regex, compile, validate_regex,
	};
	pub use crate::topic::{
		BROKER_HASH_WILDCARD, PatternResult, topic_matches,
		topic_matches_regex, validate,
	};
}

/// Error types used throughout the library
///
/// Re-exports all error types in one convenient location for error
/// handling.
pub mod errors {

	pub use crate::dispatch::BoxError;
	pub use crate::topic::{PatternError, PatternResult};
}
