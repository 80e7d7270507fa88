use serde::{Deserialize, Serialize};

use parley_domain::{ChannelId, PostId, PostList, post};

use crate::{Error, ParleyService, Result, threads};

/// A page request after normalization against the configured cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
	pub page: u64,
	pub per_page: u64,
}
impl PageWindow {
	/// Negative pages start from zero. Non-positive or oversized page sizes fall back to
	/// `max_per_page`.
	pub fn normalize(page: i64, per_page: i64, max_per_page: u32) -> Self {
		let max = u64::from(max_per_page);
		let per_page = match u64::try_from(per_page) {
			Ok(0) | Err(_) => max,
			Ok(requested) => requested.min(max),
		};

		Self { page: u64::try_from(page).unwrap_or(0), per_page }
	}

	pub fn offset(&self) -> u64 {
		self.page.saturating_mul(self.per_page)
	}

	pub fn limit(&self) -> u64 {
		self.per_page
	}
}

impl ParleyService {
	pub fn page_window(&self, page: i64, per_page: i64) -> PageWindow {
		PageWindow::normalize(page, per_page, self.cfg.pagination.max_per_page)
	}

	/// The newest live posts of a channel, `per_page` at a time.
	pub async fn get_posts_page(
		&self,
		channel_id: ChannelId,
		page: i64,
		per_page: i64,
	) -> Result<PostList> {
		let window = self.page_window(page, per_page);
		let anchors =
			self.store.fetch_by_channel_paged(channel_id, window.offset(), window.limit()).await?;

		threads::complete_threads(self.store.as_ref(), anchors).await
	}

	/// Live posts strictly older than `anchor_id`. An unknown anchor yields an empty list.
	pub async fn get_posts_before(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		page: i64,
		per_page: i64,
	) -> Result<PostList> {
		let window = self.page_window(page, per_page);
		let fetched = self
			.store
			.fetch_by_channel_before(channel_id, anchor_id, window.offset(), window.limit())
			.await
			.map_err(Error::from);

		self.complete_cursor_window(channel_id, anchor_id, fetched).await
	}

	/// Live posts strictly newer than `anchor_id`, paged outwards from the anchor and listed newest
	/// first. An unknown anchor yields an empty list.
	pub async fn get_posts_after(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		page: i64,
		per_page: i64,
	) -> Result<PostList> {
		let window = self.page_window(page, per_page);
		let fetched = self
			.store
			.fetch_by_channel_after(channel_id, anchor_id, window.offset(), window.limit())
			.await
			.map_err(Error::from);

		self.complete_cursor_window(channel_id, anchor_id, fetched).await
	}

	/// Everything created, edited, or deleted after `since`, deleted posts included and uncapped.
	pub async fn get_posts_since(&self, channel_id: ChannelId, since: i64) -> Result<PostList> {
		let mut anchors = self.store.fetch_by_channel_since(channel_id, since).await?;

		anchors.sort_by(post::cmp_newest_first);

		threads::complete_threads(self.store.as_ref(), anchors).await
	}

	async fn complete_cursor_window(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		fetched: Result<Vec<parley_domain::Post>>,
	) -> Result<PostList> {
		match fetched {
			Ok(anchors) => threads::complete_threads(self.store.as_ref(), anchors).await,
			Err(Error::NotFound { .. }) => {
				tracing::debug!(
					%channel_id,
					%anchor_id,
					"Cursor anchor not found; returning an empty list."
				);

				Ok(PostList::new())
			},
			Err(err) => Err(err),
		}
	}
}
