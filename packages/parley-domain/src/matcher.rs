use unicode_segmentation::UnicodeSegmentation;

use crate::{hashtag, post::Post, query::WILDCARD};

/// A free-text term compiled to lowercase words.
///
/// The message must contain the words contiguously. When the raw term ended with `*`, the last
/// word only needs to be a prefix of the corresponding message word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextTerm {
	words: Vec<String>,
	prefix: bool,
}
impl TextTerm {
	/// Returns `None` for terms without any word characters.
	pub fn compile(raw: &str) -> Option<Self> {
		let prefix = raw.ends_with(WILDCARD);
		let words = split_words(raw.trim_end_matches(WILDCARD));

		if words.is_empty() {
			return None;
		}

		Some(Self { words, prefix })
	}

	pub fn matches(&self, message_words: &[String]) -> bool {
		let width = self.words.len();

		if message_words.len() < width {
			return false;
		}

		message_words.windows(width).any(|window| {
			window.iter().zip(&self.words).enumerate().all(|(idx, (candidate, wanted))| {
				if self.prefix && idx + 1 == width {
					candidate.starts_with(wanted.as_str())
				} else {
					candidate == wanted
				}
			})
		})
	}
}

/// The compiled text and hashtag portion of a search, applied to candidate posts.
#[derive(Clone, Debug, Default)]
pub struct PostMatcher {
	terms: Vec<TextTerm>,
	hashtags: Vec<String>,
}
impl PostMatcher {
	pub fn new<'a>(
		terms: impl IntoIterator<Item = &'a str>,
		hashtags: impl IntoIterator<Item = &'a str>,
	) -> Self {
		Self {
			terms: terms.into_iter().filter_map(TextTerm::compile).collect(),
			hashtags: hashtags.into_iter().map(str::to_string).collect(),
		}
	}

	/// True when neither text nor hashtags constrain the match.
	pub fn is_unconstrained(&self) -> bool {
		self.terms.is_empty() && self.hashtags.is_empty()
	}

	/// All terms and all hashtags must match.
	pub fn matches(&self, post: &Post) -> bool {
		if !self.hashtags.iter().all(|tag| hashtag::field_contains(&post.hashtags, tag)) {
			return false;
		}
		if self.terms.is_empty() {
			return true;
		}

		let message_words = split_words(&post.message);

		self.terms.iter().all(|term| term.matches(&message_words))
	}
}

pub fn split_words(text: &str) -> Vec<String> {
	text.unicode_words().map(str::to_lowercase).collect()
}
