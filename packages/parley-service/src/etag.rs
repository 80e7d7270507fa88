//! Conditional fetches keyed by opaque entity tags.
//!
//! A tag digests what was asked for together with a summary of the writes to what it covers.
//! Callers may only compare tags for equality.

use serde::Serialize;

use parley_domain::{ChannelId, Post, PostId, PostList};
use parley_storage::ChannelWatermark;

use crate::{ParleyService, Result, threads};

const ETAG_SCHEMA_VERSION: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Conditional<T> {
	Modified { etag: String, payload: T },
	NotModified { etag: String },
}
impl<T> Conditional<T> {
	pub fn etag(&self) -> &str {
		match self {
			Self::Modified { etag, .. } | Self::NotModified { etag } => etag,
		}
	}

	pub fn is_modified(&self) -> bool {
		matches!(self, Self::Modified { .. })
	}

	pub fn payload(&self) -> Option<&T> {
		match self {
			Self::Modified { payload, .. } => Some(payload),
			Self::NotModified { .. } => None,
		}
	}

	pub fn into_payload(self) -> Option<T> {
		match self {
			Self::Modified { payload, .. } => Some(payload),
			Self::NotModified { .. } => None,
		}
	}
}

impl ParleyService {
	/// Paged channel listing that short-circuits when `etag` still matches.
	pub async fn get_posts(
		&self,
		channel_id: ChannelId,
		page: i64,
		per_page: i64,
		etag: Option<&str>,
	) -> Result<Conditional<PostList>> {
		let window = self.page_window(page, per_page);
		let watermark = self.store.fetch_channel_watermark(channel_id).await?;
		let current = channel_page_etag(channel_id, window.page, window.per_page, watermark);

		if etag == Some(current.as_str()) {
			tracing::debug!(%channel_id, page = window.page, "Channel page unchanged.");

			return Ok(Conditional::NotModified { etag: current });
		}

		let anchors =
			self.store.fetch_by_channel_paged(channel_id, window.offset(), window.limit()).await?;
		let payload = threads::complete_threads(self.store.as_ref(), anchors).await?;

		Ok(Conditional::Modified { etag: current, payload })
	}

	/// Single live post of a channel, short-circuiting when `etag` still matches.
	pub async fn get_post(
		&self,
		channel_id: ChannelId,
		post_id: PostId,
		etag: Option<&str>,
	) -> Result<Conditional<Post>> {
		let post = self.fetch_visible_post(channel_id, post_id).await?;
		let current = post_etag(post_id, post.last_touched());

		if etag == Some(current.as_str()) {
			tracing::debug!(%channel_id, %post_id, "Post unchanged.");

			return Ok(Conditional::NotModified { etag: current });
		}

		Ok(Conditional::Modified { etag: current, payload: post })
	}
}

fn channel_page_etag(
	channel_id: ChannelId,
	page: u64,
	per_page: u64,
	watermark: ChannelWatermark,
) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(&ETAG_SCHEMA_VERSION.to_le_bytes());
	hasher.update(b"channel_page");
	hasher.update(channel_id.as_uuid().as_bytes());
	hasher.update(&page.to_le_bytes());
	hasher.update(&per_page.to_le_bytes());
	hasher.update(&watermark.last_touched.to_le_bytes());
	hasher.update(&watermark.post_count.to_le_bytes());
	hasher.update(&watermark.touched_sum.to_le_bytes());

	hasher.finalize().to_hex().to_string()
}

fn post_etag(post_id: PostId, last_touched: i64) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(&ETAG_SCHEMA_VERSION.to_le_bytes());
	hasher.update(b"post");
	hasher.update(post_id.as_uuid().as_bytes());
	hasher.update(&last_touched.to_le_bytes());

	hasher.finalize().to_hex().to_string()
}
