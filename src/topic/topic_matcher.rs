//! Linear topic-to-subscription matching
//!
//! The production matching algorithm: one pass over the topic and the
//! pattern with two cursors, `O(|topic| + |pattern|)`, no allocation and
//! no transient objects. The regex path in [`sub_regex`](super::sub_regex)
//! reimplements the same semantics independently so the two can be
//! cross-checked.

use regex::Regex;

/// Tests whether a literal topic matches a subscription pattern.
///
/// Assumes the pattern is well-formed (see
/// [`validate`](super::subscription::validate)); wildcards in invalid
/// positions yield unspecified results. Topics are expected to be one or
/// more non-empty `/`-separated levels; matching a malformed topic may
/// simply fail. Matching is case-sensitive and byte-exact on literal
/// segments, with no normalization of any kind.
///
/// Wildcard semantics:
/// - `*` matches exactly one topic level (or a trailing fragment of one,
///   e.g. `a/b*` matches `a/bcd`);
/// - `>` matches one or more remaining levels;
/// - a final `#` preceded by `/` (or standing alone) matches zero or more
///   remaining levels; unlike `>`, `a/#` also matches the bare `a`.
pub fn topic_matches(topic: &str, pattern: &str) -> bool {
	let topic = topic.as_bytes();
	let pattern = pattern.as_bytes();
	let mut pi = 0; // pattern cursor

	for &topic_byte in topic {
		if pi >= pattern.len() {
			// pattern exhausted but topic characters remain
			return false;
		}
		match pattern[pi] {
			| b'*' => {
				if topic_byte == b'/' {
					// end of the wildcarded topic level; the pattern
					// must continue with '/' (guaranteed by validation)
					pi += 1;
					if pi == pattern.len() || pattern[pi] != b'/' {
						return false;
					}
					pi += 1;
				}
				// any other byte is absorbed by '*'
			}
			| b'>' => {
				// matches all remaining topic levels
				return true;
			}
			| b'#' if pi == pattern.len() - 1
				&& (pattern.len() == 1 || pattern[pi - 1] == b'/') =>
			{
				// zero-or-more trailing levels, satisfied already
				return true;
			}
			| literal => {
				if topic_byte != literal {
					return false;
				}
				pi += 1;
			}
		}
	}

	// Topic exhausted: the pattern matches iff its unmatched suffix needs
	// zero further topic characters. A rest of `*` or `>` covers a final
	// level fully consumed by the wildcard; the `#` suffixes are the
	// zero-or-more forms, valid only in wildcard position.
	match &pattern[pi ..] {
		| [] | [b'*'] | [b'>'] | [b'/', b'#'] | [b'*', b'/', b'#'] => true,
		| [b'#'] => {
			pattern.len() == 1 || pattern[pattern.len() - 2] == b'/'
		}
		| _ => false,
	}
}

/// Convenience wrapper testing a topic against a precompiled subscription
/// regex (see [`sub_regex::compile`](super::sub_regex::compile)).
pub fn topic_matches_regex(topic: &str, pattern: &Regex) -> bool {
	pattern.is_match(topic)
}
