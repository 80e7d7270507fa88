use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use parley_domain::{ChannelId, Post, PostId, TeamId, UserId, matcher::split_words, post};

use crate::{
	BoxFuture, ChannelWatermark, Error, PostStore, Result, SearchFilters, SearchScope, db::Db,
	models::PostRow,
};

const POST_COLUMNS: &str = "\
id, channel_id, user_id, root_id, parent_id, message, hashtags, filenames, create_at, update_at, \
delete_at";

/// `PostStore` over the Postgres schema in `sql/`.
pub struct PgPostStore {
	pool: PgPool,
	prefilter_batch: u32,
}
impl PgPostStore {
	/// `prefilter_batch` bounds how many candidate rows one search round trip reads.
	pub fn new(db: &Db, prefilter_batch: u32) -> Self {
		Self { pool: db.pool.clone(), prefilter_batch }
	}

	async fn anchor_create_at(&self, channel_id: ChannelId, anchor_id: PostId) -> Result<i64> {
		let row: Option<(i64,)> =
			sqlx::query_as("SELECT create_at FROM posts WHERE id = $1 AND channel_id = $2")
				.bind(anchor_id.as_uuid())
				.bind(channel_id.as_uuid())
				.fetch_optional(&self.pool)
				.await?;

		row.map(|(create_at,)| create_at)
			.ok_or_else(|| Error::NotFound(format!("anchor post {anchor_id} in channel {channel_id}")))
	}

	async fn paged(&self, channel_id: ChannelId, offset: u64, limit: u64) -> Result<Vec<Post>> {
		let (offset, limit) = sql_window(offset, limit)?;
		let sql = format!(
			"\
SELECT {POST_COLUMNS}
FROM posts
WHERE channel_id = $1 AND delete_at = 0
ORDER BY create_at DESC, id DESC
LIMIT $2 OFFSET $3"
		);
		let rows: Vec<PostRow> = sqlx::query_as(&sql)
			.bind(channel_id.as_uuid())
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		Ok(rows.into_iter().map(Post::from).collect())
	}

	async fn before(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> Result<Vec<Post>> {
		let (offset, limit) = sql_window(offset, limit)?;
		let anchor_at = self.anchor_create_at(channel_id, anchor_id).await?;
		let sql = format!(
			"\
SELECT {POST_COLUMNS}
FROM posts
WHERE channel_id = $1 AND delete_at = 0 AND create_at < $2
ORDER BY create_at DESC, id DESC
LIMIT $3 OFFSET $4"
		);
		let rows: Vec<PostRow> = sqlx::query_as(&sql)
			.bind(channel_id.as_uuid())
			.bind(anchor_at)
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		Ok(rows.into_iter().map(Post::from).collect())
	}

	async fn after(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> Result<Vec<Post>> {
		let (offset, limit) = sql_window(offset, limit)?;
		let anchor_at = self.anchor_create_at(channel_id, anchor_id).await?;
		let sql = format!(
			"\
SELECT {POST_COLUMNS}
FROM posts
WHERE channel_id = $1 AND delete_at = 0 AND create_at > $2
ORDER BY create_at ASC, id ASC
LIMIT $3 OFFSET $4"
		);
		let rows: Vec<PostRow> = sqlx::query_as(&sql)
			.bind(channel_id.as_uuid())
			.bind(anchor_at)
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		Ok(rows.into_iter().rev().map(Post::from).collect())
	}

	async fn since(&self, channel_id: ChannelId, since: i64) -> Result<Vec<Post>> {
		let sql = format!(
			"\
SELECT {POST_COLUMNS}
FROM posts
WHERE channel_id = $1 AND (create_at > $2 OR update_at > $2 OR delete_at > $2)
ORDER BY create_at DESC, id DESC"
		);
		let rows: Vec<PostRow> = sqlx::query_as(&sql)
			.bind(channel_id.as_uuid())
			.bind(since)
			.fetch_all(&self.pool)
			.await?;

		Ok(rows.into_iter().map(Post::from).collect())
	}

	async fn by_id(&self, post_id: PostId) -> Result<Option<Post>> {
		let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
		let row: Option<PostRow> =
			sqlx::query_as(&sql).bind(post_id.as_uuid()).fetch_optional(&self.pool).await?;

		Ok(row.map(Post::from))
	}

	async fn thread(&self, root_id: PostId) -> Result<Vec<Post>> {
		let sql = format!(
			"\
SELECT {POST_COLUMNS}
FROM posts
WHERE id = $1 OR (root_id = $1 AND delete_at = 0)
ORDER BY create_at ASC, id ASC"
		);
		let rows: Vec<PostRow> =
			sqlx::query_as(&sql).bind(root_id.as_uuid()).fetch_all(&self.pool).await?;

		Ok(rows.into_iter().map(Post::from).collect())
	}

	async fn watermark(&self, channel_id: ChannelId) -> Result<ChannelWatermark> {
		let (last_touched, post_count, touched_sum): (i64, i64, i64) = sqlx::query_as(
			"\
SELECT
	COALESCE(MAX(GREATEST(create_at, update_at, delete_at)), 0)::bigint,
	COUNT(*)::bigint,
	(COALESCE(SUM(GREATEST(create_at, update_at, delete_at)), 0) % 9223372036854775807)::bigint
FROM posts
WHERE channel_id = $1",
		)
		.bind(channel_id.as_uuid())
		.fetch_one(&self.pool)
		.await?;

		Ok(ChannelWatermark { last_touched, post_count, touched_sum })
	}

	async fn search(&self, scope: &SearchScope, filters: &SearchFilters) -> Result<Vec<Post>> {
		let matcher = filters.matcher();
		let batch = i64::from(self.prefilter_batch.max(1));
		let limit = filters.limit as usize;
		let mut cursor = None;
		let mut scanned = 0_usize;
		let mut posts = Vec::new();

		// Candidates arrive newest first, so the first `limit` admitted posts are the answer.
		loop {
			let mut builder = prefilter_query(scope, filters, cursor, batch);
			let rows: Vec<PostRow> = builder.build_query_as().fetch_all(&self.pool).await?;
			let exhausted = (rows.len() as i64) < batch;

			scanned += rows.len();
			cursor = rows.last().map(|row| (row.create_at, row.id));

			posts.extend(
				rows.into_iter().map(Post::from).filter(|post| filters.admits(scope, &matcher, post)),
			);

			if exhausted || posts.len() >= limit {
				break;
			}
		}

		tracing::debug!(
			team_id = %scope.team_id,
			scanned,
			matched = posts.len(),
			"Search prefilter finished."
		);

		posts.sort_by(post::cmp_newest_first);
		posts.truncate(limit);

		Ok(posts)
	}

	async fn channel_by_name(&self, team_id: TeamId, name: &str) -> Result<Option<ChannelId>> {
		let row: Option<(Uuid,)> =
			sqlx::query_as("SELECT id FROM channels WHERE team_id = $1 AND lower(name) = lower($2)")
				.bind(team_id.as_uuid())
				.bind(name)
				.fetch_optional(&self.pool)
				.await?;

		Ok(row.map(|(id,)| ChannelId(id)))
	}

	async fn user_by_name(&self, team_id: TeamId, username: &str) -> Result<Option<UserId>> {
		let row: Option<(Uuid,)> = sqlx::query_as(
			"\
SELECT u.id
FROM users u
JOIN team_members tm ON tm.user_id = u.id
WHERE tm.team_id = $1 AND lower(u.username) = lower($2)",
		)
		.bind(team_id.as_uuid())
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|(id,)| UserId(id)))
	}
}
impl PostStore for PgPostStore {
	fn fetch_by_channel_paged<'a>(
		&'a self,
		channel_id: ChannelId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.paged(channel_id, offset, limit))
	}

	fn fetch_by_channel_before<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.before(channel_id, anchor_id, offset, limit))
	}

	fn fetch_by_channel_after<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.after(channel_id, anchor_id, offset, limit))
	}

	fn fetch_by_channel_since<'a>(
		&'a self,
		channel_id: ChannelId,
		since: i64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.since(channel_id, since))
	}

	fn fetch_by_id<'a>(&'a self, post_id: PostId) -> BoxFuture<'a, Result<Option<Post>>> {
		Box::pin(self.by_id(post_id))
	}

	fn fetch_thread<'a>(&'a self, root_id: PostId) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.thread(root_id))
	}

	fn fetch_channel_watermark<'a>(
		&'a self,
		channel_id: ChannelId,
	) -> BoxFuture<'a, Result<ChannelWatermark>> {
		Box::pin(self.watermark(channel_id))
	}

	fn search_by_filters<'a>(
		&'a self,
		scope: &'a SearchScope,
		filters: &'a SearchFilters,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		Box::pin(self.search(scope, filters))
	}

	fn resolve_channel_name_to_id<'a>(
		&'a self,
		team_id: TeamId,
		name: &'a str,
	) -> BoxFuture<'a, Result<Option<ChannelId>>> {
		Box::pin(self.channel_by_name(team_id, name))
	}

	fn resolve_username_to_id<'a>(
		&'a self,
		team_id: TeamId,
		username: &'a str,
	) -> BoxFuture<'a, Result<Option<UserId>>> {
		Box::pin(self.user_by_name(team_id, username))
	}
}

/// Coarse candidate query: scope, modifiers, and one `ILIKE` per word. Exact word and hashtag
/// matching happens afterwards in `SearchFilters::admits`. `cursor` is the `(create_at, id)` of
/// the last row of the previous batch.
fn prefilter_query<'a>(
	scope: &'a SearchScope,
	filters: &'a SearchFilters,
	cursor: Option<(i64, Uuid)>,
	batch: i64,
) -> QueryBuilder<'a, Postgres> {
	let mut builder = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE delete_at = 0"));
	let scope_ids = scope.channel_ids.iter().map(ChannelId::as_uuid).collect::<Vec<_>>();

	builder.push(" AND channel_id = ANY(").push_bind(scope_ids).push(")");

	if let Some(channel_ids) = &filters.channel_ids {
		let ids = channel_ids.iter().map(ChannelId::as_uuid).collect::<Vec<_>>();

		builder.push(" AND channel_id = ANY(").push_bind(ids).push(")");
	}
	if let Some(user_ids) = &filters.user_ids {
		let ids = user_ids.iter().map(UserId::as_uuid).collect::<Vec<_>>();

		builder.push(" AND user_id = ANY(").push_bind(ids).push(")");
	}

	for term in &filters.text_terms {
		for word in split_words(term.trim_end_matches('*')) {
			builder.push(" AND message ILIKE ").push_bind(format!("%{}%", escape_like(&word)));
		}
	}
	for tag in &filters.hashtag_terms {
		builder.push(" AND hashtags ILIKE ").push_bind(format!("%{}%", escape_like(tag)));
	}

	if let Some((create_at, id)) = cursor {
		builder.push(" AND (create_at, id) < (").push_bind(create_at).push(", ").push_bind(id).push(")");
	}

	builder.push(" ORDER BY create_at DESC, id DESC LIMIT ").push_bind(batch);

	builder
}

fn escape_like(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	escaped
}

fn sql_window(offset: u64, limit: u64) -> Result<(i64, i64)> {
	let offset = i64::try_from(offset)
		.map_err(|_| Error::InvalidArgument(format!("offset {offset} is out of range")))?;
	let limit = i64::try_from(limit)
		.map_err(|_| Error::InvalidArgument(format!("limit {limit} is out of range")))?;

	Ok((offset, limit))
}
