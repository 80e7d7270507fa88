//! Search query tokenization.
//!
//! Parsing runs in two passes. The first splits on whitespace and classifies each token as free
//! text or a `key:value` modifier. The second folds the classified tokens into a [`SearchQuery`].
//! Nothing here resolves names; that is left to the executor, which knows the requester's team.

use serde::{Deserialize, Serialize};

pub const WILDCARD: char = '*';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
	#[error("Search query must not contain NUL bytes.")]
	NulByte,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryToken {
	FreeText(String),
	ChannelFilter(String),
	UserFilter(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
	/// Free-text terms, bare wildcards included.
	pub terms: Vec<String>,
	/// Terms that start with `#`, kept with their marker.
	pub hashtags: Vec<String>,
	/// Channel names from `channel:` and `in:`.
	pub channels: Vec<String>,
	/// Usernames from `from:`.
	pub users: Vec<String>,
}
impl SearchQuery {
	/// Free-text terms with bare wildcards removed.
	pub fn text_terms(&self) -> Vec<&str> {
		self.terms.iter().map(String::as_str).filter(|term| !is_bare_wildcard(term)).collect()
	}

	/// True when the free text holds only wildcards and nothing else narrows the text match.
	pub fn is_wildcard_only(&self) -> bool {
		!self.terms.is_empty()
			&& self.hashtags.is_empty()
			&& self.terms.iter().all(|term| is_bare_wildcard(term))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModifierKind {
	Channel,
	User,
}

pub fn parse(raw: &str) -> Result<SearchQuery, QueryError> {
	let mut query = SearchQuery::default();

	for token in tokenize(raw)? {
		match token {
			QueryToken::FreeText(term) =>
				if term.len() > 1 && term.starts_with('#') {
					query.hashtags.push(term);
				} else {
					query.terms.push(term);
				},
			QueryToken::ChannelFilter(name) => query.channels.push(name),
			QueryToken::UserFilter(name) => query.users.push(name),
		}
	}

	Ok(query)
}

pub fn tokenize(raw: &str) -> Result<Vec<QueryToken>, QueryError> {
	if raw.contains('\0') {
		return Err(QueryError::NulByte);
	}

	let words = raw.split_whitespace().collect::<Vec<_>>();
	let mut tokens = Vec::with_capacity(words.len());
	let mut idx = 0;

	while idx < words.len() {
		let word = words[idx];

		idx += 1;

		let Some((kind, value)) = split_modifier(word) else {
			tokens.push(QueryToken::FreeText(word.to_string()));

			continue;
		};
		let value = if value.is_empty() {
			// `in: town-square` carries its value in the next token.
			match words.get(idx) {
				Some(next) if split_modifier(next).is_none() => {
					idx += 1;

					next.trim()
				},
				_ => continue,
			}
		} else {
			value
		};
		let value = match kind {
			ModifierKind::Channel => value.trim_start_matches('~'),
			ModifierKind::User => value.trim_start_matches('@'),
		};

		if value.is_empty() {
			continue;
		}

		tokens.push(match kind {
			ModifierKind::Channel => QueryToken::ChannelFilter(value.to_string()),
			ModifierKind::User => QueryToken::UserFilter(value.to_string()),
		});
	}

	Ok(tokens)
}

pub fn is_bare_wildcard(term: &str) -> bool {
	!term.is_empty() && term.chars().all(|ch| ch == WILDCARD)
}

fn split_modifier(word: &str) -> Option<(ModifierKind, &str)> {
	let (key, value) = word.split_once(':')?;
	let kind = match key.to_ascii_lowercase().as_str() {
		"channel" | "in" => ModifierKind::Channel,
		"from" => ModifierKind::User,
		_ => return None,
	};

	Some((kind, value.trim()))
}
