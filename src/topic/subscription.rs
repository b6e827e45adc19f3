//! Topic subscription patterns
//!
//! A [`Subscription`] is an immutable, validated wildcard pattern such as
//! `a/b/c`, `a/*/c` or `a/b/>`. Validation happens exactly once at
//! construction; the matching algorithms in
//! [`topic_matcher`](super::topic_matcher) and
//! [`sub_regex`](super::sub_regex) rely on it and never re-validate.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use arcstr::ArcStr;
use regex::Regex;

use super::error::{PatternError, PatternResult};
use super::sub_regex;
use super::topic_matcher;

/// Broker-side encoding of the `#` zero-or-more wildcard: the single
/// control byte `0x03`.
pub const BROKER_HASH_WILDCARD: &str = "\u{3}";

/// Which wildcard family a subscription pattern may use.
///
/// There is a single matching algorithm either way; `Smf` merely rejects
/// the `#` wildcard forms at validation time so the matcher never sees
/// them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WildcardMode {
	/// `*`, `>` plus the MQTT-style trailing `#` zero-or-more wildcard
	#[default]
	Extended,
	/// SMF wildcards only (`*` and `>`); the wildcard forms `#` and a
	/// trailing `/#` are rejected. `#` elsewhere is still a literal.
	Smf,
}

/// Validates a subscription pattern, returning `true` when well-formed.
///
/// Uses the default [`WildcardMode::Extended`] rules. Patterns using `*`
/// or `>` as literals (e.g. `a*b`) are rejected even though a broker may
/// accept them: such subscriptions would not behave as the matching
/// algorithms assume.
pub fn validate(pattern: &str) -> bool {
	validate_pattern(pattern, WildcardMode::Extended).is_ok()
}

/// Walks the pattern once and checks every wildcard placement rule.
pub(crate) fn validate_pattern(
	pattern: &str,
	mode: WildcardMode,
) -> PatternResult<()> {
	// easy checks first
	if pattern.is_empty() {
		return Err(PatternError::EmptyPattern);
	}
	if pattern.starts_with('/') || pattern.ends_with('/') {
		return Err(PatternError::empty_level(pattern));
	}
	if mode == WildcardMode::Smf
		&& (pattern == "#" || pattern.ends_with("/#"))
	{
		return Err(PatternError::hash_wildcard_disabled(pattern));
	}
	if pattern == "*" || pattern == ">" {
		return Ok(());
	}
	if pattern.starts_with('>') {
		return Err(PatternError::multi_level_position(pattern, 0));
	}
	// now walk the pattern and check each byte; all special characters
	// are ASCII, so byte positions are safe in UTF-8 text
	let bytes = pattern.as_bytes();
	for (position, &byte) in bytes.iter().enumerate() {
		match byte {
			| b'*' => {
				// look ahead: last char, or a '/' follows
				if position != bytes.len() - 1
					&& bytes[position + 1] != b'/'
				{
					return Err(PatternError::single_level_position(
						pattern, position,
					));
				}
			}
			| b'>' => {
				// look behind: must be the last char, right after '/';
				// position 0 was already rejected above
				if position != bytes.len() - 1
					|| bytes[position - 1] != b'/'
				{
					return Err(PatternError::multi_level_position(
						pattern, position,
					));
				}
			}
			| b'/' => {
				// leading '/' was already rejected, so look-behind is safe
				if bytes[position - 1] == b'/' {
					return Err(PatternError::empty_level(pattern));
				}
			}
			| 0 => return Err(PatternError::embedded_nul(pattern)),
			| _ => {}
		}
	}
	Ok(())
}

/// A validated topic subscription pattern.
///
/// Wraps the raw pattern text together with an eagerly compiled regular
/// expression with identical matching semantics (see
/// [`sub_regex`](super::sub_regex)). The regex is the reference/verification
/// path; production matching goes through the allocation-free linear scan
/// in [`matches`](Subscription::matches).
///
/// Two subscriptions are equal iff their pattern text is equal, so a
/// `Subscription` can key a map. Comparison against raw strings also
/// accepts the broker-encoded rendition of the pattern.
#[derive(Debug, Clone)]
pub struct Subscription {
	pattern: ArcStr,
	regex: Regex,
}

impl Subscription {
	/// Builds a subscription from a pattern, accepting all wildcards.
	///
	/// Fails with [`PatternError`] when the pattern is malformed; a
	/// constructed `Subscription` is guaranteed well-formed for its
	/// lifetime.
	pub fn new(pattern: impl Into<ArcStr>) -> PatternResult<Self> {
		Self::with_mode(pattern, WildcardMode::default())
	}

	/// Builds a subscription under an explicit [`WildcardMode`].
	pub fn with_mode(
		pattern: impl Into<ArcStr>,
		mode: WildcardMode,
	) -> PatternResult<Self> {
		let pattern = pattern.into();
		validate_pattern(&pattern, mode)?;
		let regex = sub_regex::compile_validated(&pattern);
		Ok(Self { pattern, regex })
	}

	/// The raw pattern text.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// The equivalent regular expression, precompiled at construction.
	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Source text of the equivalent regular expression.
	pub fn regex_text(&self) -> &str {
		self.regex.as_str()
	}

	/// Tests whether `topic` matches this subscription.
	///
	/// Linear scan over both strings, no allocation. This is the
	/// production matching path.
	pub fn matches(&self, topic: &str) -> bool {
		topic_matcher::topic_matches(topic, &self.pattern)
	}

	/// Tests `topic` via the precompiled regular expression.
	///
	/// Slower than [`matches`](Subscription::matches) but guaranteed to
	/// agree with it; kept as an independently testable execution path.
	pub fn matches_regex(&self, topic: &str) -> bool {
		self.regex.is_match(topic)
	}

	/// Rewrites the convenience `#` forms to the hidden broker wildcard
	/// encoding.
	///
	/// Pattern `#` becomes the single control byte `0x03`; a trailing
	/// `/#` becomes `/` followed by `0x03`. All other patterns are
	/// returned unchanged. Purely syntactic, no effect on matching.
	pub fn to_broker_encoding(&self) -> Cow<'_, str> {
		if self.pattern.as_str() == "#" {
			Cow::Borrowed(BROKER_HASH_WILDCARD)
		} else if let Some(prefix) = self.pattern.strip_suffix("/#") {
			Cow::Owned(format!("{prefix}/{BROKER_HASH_WILDCARD}"))
		} else {
			Cow::Borrowed(self.pattern.as_str())
		}
	}
}

impl PartialEq for Subscription {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for Subscription {}

impl Hash for Subscription {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.pattern.hash(state);
	}
}

impl PartialOrd for Subscription {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Subscription {
	fn cmp(&self, other: &Self) -> Ordering {
		self.pattern.as_str().cmp(other.pattern.as_str())
	}
}

/// Raw-string comparison; also accepts the broker-encoded rendition.
impl PartialEq<str> for Subscription {
	fn eq(&self, other: &str) -> bool {
		self.pattern.as_str() == other || self.to_broker_encoding() == other
	}
}

impl PartialEq<&str> for Subscription {
	fn eq(&self, other: &&str) -> bool {
		self == *other
	}
}

impl AsRef<str> for Subscription {
	fn as_ref(&self) -> &str {
		&self.pattern
	}
}

impl Display for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

impl FromStr for Subscription {
	type Err = PatternError;

	fn from_str(pattern: &str) -> Result<Self, Self::Err> {
		Self::new(pattern)
	}
}

impl TryFrom<&str> for Subscription {
	type Error = PatternError;

	fn try_from(pattern: &str) -> Result<Self, Self::Error> {
		Self::new(pattern)
	}
}
