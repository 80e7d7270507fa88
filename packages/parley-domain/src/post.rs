use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
	hashtag,
	ids::{ChannelId, PostId, UserId},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PostStatus {
	#[default]
	Active,
	Deleted {
		at: i64,
	},
}
impl PostStatus {
	pub fn delete_at(&self) -> i64 {
		match self {
			Self::Active => 0,
			Self::Deleted { at } => *at,
		}
	}

	pub fn from_delete_at(delete_at: i64) -> Self {
		if delete_at > 0 { Self::Deleted { at: delete_at } } else { Self::Active }
	}
}

/// A persisted chat message.
///
/// Identity and placement (`id`, `channel_id`, `root_id`, `parent_id`) never change after creation.
/// Content changes advance `update_at`; deletion is soft and recorded in `status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
	pub id: PostId,
	pub channel_id: ChannelId,
	pub user_id: UserId,
	pub root_id: Option<PostId>,
	pub parent_id: Option<PostId>,
	pub message: String,
	pub hashtags: String,
	pub filenames: Vec<String>,
	pub create_at: i64,
	pub update_at: i64,
	pub status: PostStatus,
}
impl Post {
	/// Materializes a draft, deriving hashtags and dropping attachments outside the channel.
	pub fn new(draft: NewPost, id: PostId, now: i64) -> Self {
		let hashtags = hashtag::hashtag_field(&draft.message);
		let filenames = sanitize_filenames(draft.channel_id, draft.filenames);

		Self {
			id,
			channel_id: draft.channel_id,
			user_id: draft.user_id,
			root_id: draft.root_id,
			parent_id: draft.parent_id.or(draft.root_id),
			message: draft.message,
			hashtags,
			filenames,
			create_at: now,
			update_at: now,
			status: PostStatus::Active,
		}
	}

	pub fn is_deleted(&self) -> bool {
		matches!(self.status, PostStatus::Deleted { .. })
	}

	pub fn is_root(&self) -> bool {
		self.root_id.is_none()
	}

	/// Identifier of the thread this post belongs to.
	pub fn thread_id(&self) -> PostId {
		self.root_id.unwrap_or(self.id)
	}

	pub fn delete_at(&self) -> i64 {
		self.status.delete_at()
	}

	pub fn last_touched(&self) -> i64 {
		self.create_at.max(self.update_at).max(self.delete_at())
	}

	pub fn edit(&mut self, message: impl Into<String>, now: i64) {
		self.message = message.into();
		self.hashtags = hashtag::hashtag_field(&self.message);
		self.update_at = self.update_at.max(now);
	}

	pub fn mark_deleted(&mut self, now: i64) {
		if self.is_deleted() {
			return;
		}

		self.status = PostStatus::Deleted { at: now };
		self.update_at = self.update_at.max(now);
	}
}

#[derive(Clone, Debug)]
pub struct NewPost {
	pub channel_id: ChannelId,
	pub user_id: UserId,
	pub root_id: Option<PostId>,
	pub parent_id: Option<PostId>,
	pub message: String,
	pub filenames: Vec<String>,
}
impl NewPost {
	pub fn new(channel_id: ChannelId, user_id: UserId, message: impl Into<String>) -> Self {
		Self {
			channel_id,
			user_id,
			root_id: None,
			parent_id: None,
			message: message.into(),
			filenames: Vec::new(),
		}
	}

	pub fn reply_to(mut self, root_id: PostId) -> Self {
		self.root_id = Some(root_id);
		self.parent_id = Some(root_id);

		self
	}

	pub fn with_filenames(mut self, filenames: Vec<String>) -> Self {
		self.filenames = filenames;

		self
	}
}

/// Newest first by creation time, identifier descending on ties.
pub fn cmp_newest_first(a: &Post, b: &Post) -> Ordering {
	b.create_at.cmp(&a.create_at).then_with(|| b.id.cmp(&a.id))
}

/// Keeps only attachment paths shaped `/<channel_id>/<uploader_id>/<file>` for this channel.
pub fn sanitize_filenames(channel_id: ChannelId, filenames: Vec<String>) -> Vec<String> {
	filenames.into_iter().filter(|path| is_channel_attachment(channel_id, path)).collect()
}

fn is_channel_attachment(channel_id: ChannelId, path: &str) -> bool {
	let Some(rest) = path.strip_prefix('/') else {
		return false;
	};
	let mut segments = rest.splitn(3, '/');
	let (Some(channel), Some(uploader), Some(file)) =
		(segments.next(), segments.next(), segments.next())
	else {
		return false;
	};

	if file.is_empty() || file.contains('/') {
		return false;
	}

	channel.parse::<ChannelId>().map(|parsed| parsed == channel_id).unwrap_or(false)
		&& uploader.parse::<UserId>().is_ok()
}
