use std::sync::LazyLock;

use regex::Regex;

static HASHTAG: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^#[\p{L}][\p{L}\p{N}_.\-]*[\p{L}\p{N}_]$").ok());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', ')', ']', '"', '\''];
const LEADING_PUNCTUATION: &[char] = &['(', '[', '"', '\''];

/// Extracts the hashtags of a message in first-occurrence order, without duplicates.
pub fn extract_hashtags(message: &str) -> Vec<String> {
	let mut tags: Vec<String> = Vec::new();

	for word in message.split_whitespace() {
		let candidate =
			word.trim_start_matches(LEADING_PUNCTUATION).trim_end_matches(TRAILING_PUNCTUATION);

		if !is_hashtag(candidate) {
			continue;
		}
		if tags.iter().any(|existing| existing == candidate) {
			continue;
		}

		tags.push(candidate.to_string());
	}

	tags
}

/// Joins extracted hashtags into the stored, space-separated form.
pub fn hashtag_field(message: &str) -> String {
	extract_hashtags(message).join(" ")
}

pub fn is_hashtag(candidate: &str) -> bool {
	HASHTAG.as_ref().map(|re| re.is_match(candidate)).unwrap_or(false)
}

/// Case-insensitive equality between a search tag and one entry of a stored hashtag field.
pub fn field_contains(field: &str, tag: &str) -> bool {
	let wanted = tag.to_lowercase();

	field.split(' ').any(|stored| !stored.is_empty() && stored.to_lowercase() == wanted)
}
