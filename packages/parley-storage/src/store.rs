use std::{future::Future, pin::Pin};

use parley_domain::{ChannelId, Post, PostId, TeamId, UserId, matcher::PostMatcher};

use crate::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where a requester is allowed to look.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchScope {
	pub team_id: TeamId,
	pub user_id: UserId,
	/// Channels the requester can read. Nothing outside this set is ever returned.
	pub channel_ids: Vec<ChannelId>,
}

/// Summary of the writes a channel has seen. Any create, edit, or delete changes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelWatermark {
	/// Latest create, update, or delete time; zero when the channel has no posts.
	pub last_touched: i64,
	/// Posts in the channel, deleted ones included.
	pub post_count: i64,
	/// Sum of every post's latest write time, reduced modulo `i64::MAX`.
	pub touched_sum: i64,
}

/// Compiled search predicate handed to a store.
///
/// `channel_ids` and `user_ids` each OR their members; the two lists, the text terms, and the
/// hashtag terms AND together. `None` leaves that dimension unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
	pub channel_ids: Option<Vec<ChannelId>>,
	pub user_ids: Option<Vec<UserId>>,
	pub text_terms: Vec<String>,
	pub hashtag_terms: Vec<String>,
	pub limit: u32,
}
impl SearchFilters {
	pub fn matcher(&self) -> PostMatcher {
		PostMatcher::new(
			self.text_terms.iter().map(String::as_str),
			self.hashtag_terms.iter().map(String::as_str),
		)
	}

	/// Exact admission check shared by every backend, applied after any coarse prefilter.
	pub fn admits(&self, scope: &SearchScope, matcher: &PostMatcher, post: &Post) -> bool {
		if post.is_deleted() || !scope.channel_ids.contains(&post.channel_id) {
			return false;
		}
		if let Some(channel_ids) = &self.channel_ids
			&& !channel_ids.contains(&post.channel_id)
		{
			return false;
		}
		if let Some(user_ids) = &self.user_ids
			&& !user_ids.contains(&post.user_id)
		{
			return false;
		}

		matcher.matches(post)
	}
}

/// Read contract every post backend implements.
///
/// Listings are newest first by `create_at` with the identifier breaking ties, and skip
/// soft-deleted posts unless stated otherwise.
pub trait PostStore
where
	Self: Send + Sync,
{
	fn fetch_by_channel_paged<'a>(
		&'a self,
		channel_id: ChannelId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>>;

	/// Posts strictly older than the anchor. Fails with `NotFound` when the anchor is not a post of
	/// the channel.
	fn fetch_by_channel_before<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>>;

	/// Posts strictly newer than the anchor. The window is taken from the anchor outwards, so page
	/// zero holds the posts right after it.
	fn fetch_by_channel_after<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>>;

	/// Every post created, edited, or deleted after `since`, deleted ones included.
	fn fetch_by_channel_since<'a>(
		&'a self,
		channel_id: ChannelId,
		since: i64,
	) -> BoxFuture<'a, Result<Vec<Post>>>;

	fn fetch_by_id<'a>(&'a self, post_id: PostId) -> BoxFuture<'a, Result<Option<Post>>>;

	/// The root, whatever its status, followed by its live replies, oldest first.
	fn fetch_thread<'a>(&'a self, root_id: PostId) -> BoxFuture<'a, Result<Vec<Post>>>;

	fn fetch_channel_watermark<'a>(
		&'a self,
		channel_id: ChannelId,
	) -> BoxFuture<'a, Result<ChannelWatermark>>;

	fn search_by_filters<'a>(
		&'a self,
		scope: &'a SearchScope,
		filters: &'a SearchFilters,
	) -> BoxFuture<'a, Result<Vec<Post>>>;

	fn resolve_channel_name_to_id<'a>(
		&'a self,
		team_id: TeamId,
		name: &'a str,
	) -> BoxFuture<'a, Result<Option<ChannelId>>>;

	fn resolve_username_to_id<'a>(
		&'a self,
		team_id: TeamId,
		username: &'a str,
	) -> BoxFuture<'a, Result<Option<UserId>>>;
}
