//! Error types for subscription pattern handling
//!
//! Pattern validation happens once, at [`Subscription`] construction time;
//! the matching algorithms assume well-formed patterns and never re-validate.
//!
//! [`Subscription`]: super::subscription::Subscription

use thiserror::Error;

/// Errors raised when a subscription pattern fails validation
///
/// Each variant carries the offending pattern so that callers registering
/// many subscriptions can report exactly which one was malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
	/// Subscription pattern was empty
	#[error("Subscription pattern cannot be empty")]
	EmptyPattern,

	/// Pattern starts or ends with `/`, or contains `//`
	#[error("Invalid subscription pattern '{pattern}': empty topic level")]
	EmptyLevel {
		/// The malformed pattern
		pattern: String,
	},

	/// A `*` wildcard that is neither the final character nor followed by `/`
	#[error(
		"Invalid subscription pattern '{pattern}': '*' at position \
		 {position} must end the pattern or be followed by '/'"
	)]
	SingleLevelWildcardPosition {
		/// The malformed pattern
		pattern: String,
		/// Byte offset of the offending `*`
		position: usize,
	},

	/// A `>` wildcard that is not the final, `/`-anchored character
	#[error(
		"Invalid subscription pattern '{pattern}': '>' at position \
		 {position} must be the final level of the pattern"
	)]
	MultiLevelWildcardPosition {
		/// The malformed pattern
		pattern: String,
		/// Byte offset of the offending `>`
		position: usize,
	},

	/// Pattern contains an embedded NUL character
	#[error("Invalid subscription pattern '{pattern:?}': embedded NUL")]
	EmbeddedNul {
		/// The malformed pattern
		pattern: String,
	},

	/// The `#` zero-or-more wildcard was used while SMF-only mode is active
	#[error(
		"Subscription pattern '{pattern}' uses the '#' wildcard, which is \
		 rejected in SMF-only mode"
	)]
	HashWildcardDisabled {
		/// The rejected pattern
		pattern: String,
	},
}

impl PatternError {
	/// Creates a new EmptyLevel error
	pub fn empty_level(pattern: impl Into<String>) -> Self {
		Self::EmptyLevel {
			pattern: pattern.into(),
		}
	}

	/// Creates a new SingleLevelWildcardPosition error
	pub fn single_level_position(
		pattern: impl Into<String>,
		position: usize,
	) -> Self {
		Self::SingleLevelWildcardPosition {
			pattern: pattern.into(),
			position,
		}
	}

	/// Creates a new MultiLevelWildcardPosition error
	pub fn multi_level_position(
		pattern: impl Into<String>,
		position: usize,
	) -> Self {
		Self::MultiLevelWildcardPosition {
			pattern: pattern.into(),
			position,
		}
	}

	/// Creates a new EmbeddedNul error
	pub fn embedded_nul(pattern: impl Into<String>) -> Self {
		Self::EmbeddedNul {
			pattern: pattern.into(),
		}
	}

	/// Creates a new HashWildcardDisabled error
	pub fn hash_wildcard_disabled(pattern: impl Into<String>) -> Self {
		Self::HashWildcardDisabled {
			pattern: pattern.into(),
		}
	}
}

/// Convenient Result type for pattern operations
pub type PatternResult<T> = Result<T, PatternError>;
