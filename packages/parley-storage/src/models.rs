use uuid::Uuid;

use parley_domain::{ChannelId, Post, PostId, PostStatus, TeamId, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
	pub id: Uuid,
	pub channel_id: Uuid,
	pub user_id: Uuid,
	pub root_id: Option<Uuid>,
	pub parent_id: Option<Uuid>,
	pub message: String,
	pub hashtags: String,
	pub filenames: Vec<String>,
	pub create_at: i64,
	pub update_at: i64,
	pub delete_at: i64,
}
impl From<PostRow> for Post {
	fn from(row: PostRow) -> Self {
		Self {
			id: PostId(row.id),
			channel_id: ChannelId(row.channel_id),
			user_id: UserId(row.user_id),
			root_id: row.root_id.map(PostId),
			parent_id: row.parent_id.map(PostId),
			message: row.message,
			hashtags: row.hashtags,
			filenames: row.filenames,
			create_at: row.create_at,
			update_at: row.update_at,
			status: PostStatus::from_delete_at(row.delete_at),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
	pub id: ChannelId,
	pub team_id: TeamId,
	/// URL-safe handle that `channel:` and `in:` search modifiers match against.
	pub name: String,
	pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
	pub id: UserId,
	pub username: String,
}
