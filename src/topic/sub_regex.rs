//! Regex reference path for subscription matching
//!
//! Compiles a subscription pattern into an anchored regular expression
//! with semantics identical to the linear scan in
//! [`topic_matcher`](super::topic_matcher). The two implementations are
//! kept independent precisely so they can be cross-validated; the regex
//! path is the slower, reference/verification one.

use std::sync::LazyLock;

use regex::Regex;

use super::error::PatternResult;
use super::subscription::{
	BROKER_HASH_WILDCARD, WildcardMode, validate, validate_pattern,
};

/// A `*` wildcard followed by anything other than `/`
static STAR_NOT_LEVEL_ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\*[^/]").expect("literal validator regex is well-formed")
});

/// A `>` wildcard used anywhere but as the final, `/`-anchored level
static GT_FINAL_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^>]*/>$").expect("literal validator regex is well-formed")
});

/// Builds the equivalent regular expression for a subscription pattern.
///
/// Validates the pattern first and fails the same way
/// [`Subscription::new`](super::subscription::Subscription::new) would.
/// The produced expression is anchored at both ends; literal characters
/// are escaped so that `.`, `(` and friends in a topic level are treated
/// literally.
pub fn build_sub_regex(pattern: &str) -> PatternResult<String> {
	validate_pattern(pattern, WildcardMode::Extended)?;
	Ok(build_sub_regex_validated(pattern))
}

/// Regex construction for an already-validated pattern.
///
/// Substitutions: `>` alone becomes `.+`; `#` alone (or its broker
/// encoding, the control byte `0x03`) becomes `.*`; each `*` becomes
/// `[^/]*`; a trailing `/>` becomes `/.*`; a trailing `/#` becomes the
/// optional `(?:/.*)?` so that zero remaining levels also match.
pub(crate) fn build_sub_regex_validated(pattern: &str) -> String {
	debug_assert!(
		validate(pattern) || pattern == BROKER_HASH_WILDCARD,
		"pattern must have been validated: {pattern:?}"
	);
	// the singleton wildcard patterns first
	if pattern == ">" {
		return String::from("^.+$");
	}
	if pattern == "#" || pattern == BROKER_HASH_WILDCARD {
		return String::from("^.*$");
	}

	let (body, suffix) = if let Some(prefix) = pattern.strip_suffix('>') {
		// validation anchored the '>' right after '/', so the prefix
		// keeps its trailing separator
		(prefix, ".*$")
	} else if let Some(prefix) = pattern.strip_suffix("/#") {
		(prefix, "(?:/.*)?$")
	} else {
		(pattern, "$")
	};

	let mut regex_text = String::with_capacity(body.len() + 16);
	regex_text.push('^');
	let mut chunks = body.split('*');
	if let Some(first) = chunks.next() {
		regex_text.push_str(&regex::escape(first));
	}
	for chunk in chunks {
		regex_text.push_str("[^/]*");
		regex_text.push_str(&regex::escape(chunk));
	}
	regex_text.push_str(suffix);
	regex_text
}

/// Compiles a subscription pattern into a ready-to-match [`Regex`].
pub fn compile(pattern: &str) -> PatternResult<Regex> {
	let regex_text = build_sub_regex(pattern)?;
	Ok(Regex::new(&regex_text)
		.expect("escaped subscription regex is always valid"))
}

/// Compilation path for [`Subscription`] construction, which has already
/// validated the pattern.
///
/// [`Subscription`]: super::subscription::Subscription
pub(crate) fn compile_validated(pattern: &str) -> Regex {
	Regex::new(&build_sub_regex_validated(pattern))
		.expect("escaped subscription regex is always valid")
}

/// Regex-based pattern validator.
///
/// Slower than [`validate`](super::subscription::validate) but must agree
/// with it on every input (validator-equivalence law); kept as an
/// independently testable implementation.
pub fn validate_regex(pattern: &str) -> bool {
	// easy checks first
	if pattern.is_empty() {
		return false;
	}
	if pattern.starts_with('/') || pattern.ends_with('/') {
		return false;
	}
	if pattern == "*" || pattern == ">" {
		return true;
	}
	if pattern.starts_with('>') {
		return false;
	}
	// slower checks now
	if pattern.contains('\0') {
		return false;
	}
	if pattern.contains("//") {
		return false;
	}
	if STAR_NOT_LEVEL_ANCHORED.is_match(pattern) {
		return false;
	}
	if pattern.contains('>') && !GT_FINAL_LEVEL.is_match(pattern) {
		return false;
	}
	true
}
