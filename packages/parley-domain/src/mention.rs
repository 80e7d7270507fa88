use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{ids::UserId, post::Post};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryUser {
	pub id: UserId,
	pub username: String,
}

/// Username lookup for the users of one team. Keys are lowercase.
#[derive(Clone, Debug, Default)]
pub struct TeamDirectory {
	by_username: HashMap<String, DirectoryUser>,
}
impl TeamDirectory {
	pub fn new(users: impl IntoIterator<Item = DirectoryUser>) -> Self {
		let by_username =
			users.into_iter().map(|user| (user.username.to_lowercase(), user)).collect();

		Self { by_username }
	}

	pub fn lookup(&self, username: &str) -> Option<&DirectoryUser> {
		self.by_username.get(&username.to_lowercase())
	}

	pub fn len(&self) -> usize {
		self.by_username.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_username.is_empty()
	}
}
impl FromIterator<DirectoryUser> for TeamDirectory {
	fn from_iter<T: IntoIterator<Item = DirectoryUser>>(iter: T) -> Self {
		Self::new(iter)
	}
}

/// Distinct `@username` mentions in first-occurrence order, lowercased.
///
/// An `@` only opens a mention at the start of the text or after a character that cannot be
/// part of a username, so `alice@example.com` mentions nobody.
pub fn extract_mentions(message: &str) -> Vec<String> {
	let mut mentions: Vec<String> = Vec::new();
	let mut prev: Option<char> = None;
	let mut chars = message.char_indices().peekable();

	while let Some((idx, ch)) = chars.next() {
		let opens = ch == '@' && !prev.is_some_and(is_username_char);

		prev = Some(ch);

		if !opens {
			continue;
		}

		let start = idx + ch.len_utf8();
		let mut end = start;

		while let Some(&(next_idx, next)) = chars.peek() {
			if !is_username_char(next) {
				break;
			}

			end = next_idx + next.len_utf8();
			prev = Some(next);

			chars.next();
		}

		let username = message[start..end].trim_end_matches('.').to_ascii_lowercase();

		if !username.is_empty() && !mentions.contains(&username) {
			mentions.push(username);
		}
	}

	mentions
}

/// Team users mentioned in `post` who are not among `channel_members`.
///
/// Mentions that name nobody in the directory are ignored. The result holds each user once; its
/// order carries no meaning.
pub fn out_of_channel_mentions(
	post: &Post,
	directory: &TeamDirectory,
	channel_members: &HashSet<UserId>,
) -> Vec<DirectoryUser> {
	let mut seen = HashSet::new();
	let mut outsiders = Vec::new();

	for username in extract_mentions(&post.message) {
		let Some(user) = directory.lookup(&username) else {
			continue;
		};

		if channel_members.contains(&user.id) || !seen.insert(user.id) {
			continue;
		}

		outsiders.push(user.clone());
	}

	outsiders
}

fn is_username_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}
