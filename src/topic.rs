//! Topic subscription patterns and matching
//!
//! This module provides the subscription pattern type, its validation
//! rules, the linear production matcher and the regex reference path
//! used to cross-validate it.

// Submodules
pub mod error;
pub mod sub_regex;
pub mod subscription;
pub mod topic_matcher;


// Re-export commonly used types for convenience
pub use error::{PatternError, PatternResult};
pub use subscription::{
	BROKER_HASH_WILDCARD, Subscription, WildcardMode, validate,
};
pub use topic_matcher::{topic_matches, topic_matches_regex};
