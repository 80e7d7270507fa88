//! Write helpers and directory lookups for the Postgres schema.
//!
//! Retrieval never writes; these exist for seeding, operator tooling, and tests.

use sqlx::PgExecutor;
use uuid::Uuid;

use parley_domain::{
	ChannelId, Post, TeamId, UserId,
	mention::{DirectoryUser, TeamDirectory},
};

use crate::{
	Result,
	models::{Channel, User},
};

pub async fn insert_team<'e, E>(executor: E, team_id: TeamId, name: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO teams (id, name) VALUES ($1, $2)")
		.bind(team_id.as_uuid())
		.bind(name)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn insert_user<'e, E>(executor: E, user: &User) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
		.bind(user.id.as_uuid())
		.bind(user.username.as_str())
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn add_team_member<'e, E>(executor: E, team_id: TeamId, user_id: UserId) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO team_members (team_id, user_id)
VALUES ($1, $2)
ON CONFLICT DO NOTHING",
	)
	.bind(team_id.as_uuid())
	.bind(user_id.as_uuid())
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_channel<'e, E>(executor: E, channel: &Channel) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO channels (id, team_id, name, display_name) VALUES ($1, $2, $3, $4)")
		.bind(channel.id.as_uuid())
		.bind(channel.team_id.as_uuid())
		.bind(channel.name.as_str())
		.bind(channel.display_name.as_str())
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn add_channel_member<'e, E>(
	executor: E,
	channel_id: ChannelId,
	user_id: UserId,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO channel_members (channel_id, user_id)
VALUES ($1, $2)
ON CONFLICT DO NOTHING",
	)
	.bind(channel_id.as_uuid())
	.bind(user_id.as_uuid())
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_post<'e, E>(executor: E, post: &Post) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO posts (
	id,
	channel_id,
	user_id,
	root_id,
	parent_id,
	message,
	hashtags,
	filenames,
	create_at,
	update_at,
	delete_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(post.id.as_uuid())
	.bind(post.channel_id.as_uuid())
	.bind(post.user_id.as_uuid())
	.bind(post.root_id.map(|id| id.as_uuid()))
	.bind(post.parent_id.map(|id| id.as_uuid()))
	.bind(post.message.as_str())
	.bind(post.hashtags.as_str())
	.bind(&post.filenames)
	.bind(post.create_at)
	.bind(post.update_at)
	.bind(post.delete_at())
	.execute(executor)
	.await?;

	Ok(())
}

/// Persists the mutable part of a post: content, derived hashtags, and lifecycle timestamps.
pub async fn update_post<'e, E>(executor: E, post: &Post) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE posts
SET
	message = $1,
	hashtags = $2,
	update_at = $3,
	delete_at = $4
WHERE id = $5",
	)
	.bind(post.message.as_str())
	.bind(post.hashtags.as_str())
	.bind(post.update_at)
	.bind(post.delete_at())
	.bind(post.id.as_uuid())
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(crate::Error::NotFound(format!("post {}", post.id)));
	}

	Ok(())
}

pub async fn fetch_team_directory<'e, E>(executor: E, team_id: TeamId) -> Result<TeamDirectory>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(Uuid, String)> = sqlx::query_as(
		"\
SELECT u.id, u.username
FROM users u
JOIN team_members tm ON tm.user_id = u.id
WHERE tm.team_id = $1",
	)
	.bind(team_id.as_uuid())
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(|(id, username)| DirectoryUser { id: UserId(id), username }).collect())
}

pub async fn fetch_channel_members<'e, E>(executor: E, channel_id: ChannelId) -> Result<Vec<UserId>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM channel_members WHERE channel_id = $1")
		.bind(channel_id.as_uuid())
		.fetch_all(executor)
		.await?;

	Ok(rows.into_iter().map(|(id,)| UserId(id)).collect())
}

/// Channels of a team that the user has joined.
pub async fn fetch_member_channels<'e, E>(
	executor: E,
	team_id: TeamId,
	user_id: UserId,
) -> Result<Vec<ChannelId>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(Uuid,)> = sqlx::query_as(
		"\
SELECT c.id
FROM channels c
JOIN channel_members cm ON cm.channel_id = c.id
WHERE c.team_id = $1 AND cm.user_id = $2",
	)
	.bind(team_id.as_uuid())
	.bind(user_id.as_uuid())
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(|(id,)| ChannelId(id)).collect())
}
