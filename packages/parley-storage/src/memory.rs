use std::{
	collections::{HashMap, HashSet},
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use parley_domain::{
	ChannelId, NewPost, Post, PostId, TeamId, UserId,
	mention::{DirectoryUser, TeamDirectory},
	post,
};

use crate::{
	BoxFuture, ChannelWatermark, Error, PostStore, Result, SearchFilters, SearchScope,
	models::{Channel, User},
};

#[derive(Default)]
struct State {
	posts: HashMap<PostId, Post>,
	channels: HashMap<ChannelId, Channel>,
	users: HashMap<UserId, User>,
	team_members: HashMap<TeamId, HashSet<UserId>>,
	channel_members: HashMap<ChannelId, HashSet<UserId>>,
}
impl State {
	fn channel_posts(&self, channel_id: ChannelId) -> impl Iterator<Item = &Post> {
		self.posts.values().filter(move |post| post.channel_id == channel_id)
	}

	fn live_newest_first(&self, channel_id: ChannelId, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
		let mut posts = self
			.channel_posts(channel_id)
			.filter(|post| !post.is_deleted() && keep(*post))
			.cloned()
			.collect::<Vec<_>>();

		posts.sort_by(post::cmp_newest_first);

		posts
	}

	fn anchor_create_at(&self, channel_id: ChannelId, anchor_id: PostId) -> Result<i64> {
		self.posts
			.get(&anchor_id)
			.filter(|post| post.channel_id == channel_id)
			.map(|post| post.create_at)
			.ok_or_else(|| Error::NotFound(format!("anchor post {anchor_id} in channel {channel_id}")))
	}
}

/// Process-local `PostStore` with the same semantics as the Postgres adapter.
///
/// Readers and writers share one `RwLock`; a poisoned lock is recovered rather than propagated.
#[derive(Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_team_member(&self, team_id: TeamId, user: User) {
		let mut state = self.write();

		state.team_members.entry(team_id).or_default().insert(user.id);
		state.users.insert(user.id, user);
	}

	pub fn insert_channel(&self, channel: Channel) {
		self.write().channels.insert(channel.id, channel);
	}

	pub fn join_channel(&self, channel_id: ChannelId, user_id: UserId) {
		self.write().channel_members.entry(channel_id).or_default().insert(user_id);
	}

	/// Stores a new post built from `draft`, returning the persisted form.
	pub fn create_post(&self, draft: NewPost, now: i64) -> Result<Post> {
		self.insert_post(Post::new(draft, PostId::generate(), now))
	}

	/// Stores an already materialized post. Identifiers must be unique.
	pub fn insert_post(&self, post: Post) -> Result<Post> {
		let mut state = self.write();

		if state.posts.contains_key(&post.id) {
			return Err(Error::Conflict(format!("post {} already exists", post.id)));
		}

		state.posts.insert(post.id, post.clone());

		Ok(post)
	}

	pub fn edit_post(&self, post_id: PostId, message: &str, now: i64) -> Result<Post> {
		self.mutate(post_id, |post| post.edit(message, now))
	}

	pub fn delete_post(&self, post_id: PostId, now: i64) -> Result<Post> {
		self.mutate(post_id, |post| post.mark_deleted(now))
	}

	/// Removes a post outright, as if a store lost it between two reads.
	pub fn purge_post(&self, post_id: PostId) -> Option<Post> {
		self.write().posts.remove(&post_id)
	}

	pub fn team_directory(&self, team_id: TeamId) -> TeamDirectory {
		let state = self.read();

		state
			.team_members
			.get(&team_id)
			.into_iter()
			.flatten()
			.filter_map(|user_id| state.users.get(user_id))
			.map(|user| DirectoryUser { id: user.id, username: user.username.clone() })
			.collect()
	}

	pub fn channel_members(&self, channel_id: ChannelId) -> HashSet<UserId> {
		self.read().channel_members.get(&channel_id).cloned().unwrap_or_default()
	}

	fn mutate(&self, post_id: PostId, f: impl FnOnce(&mut Post)) -> Result<Post> {
		let mut state = self.write();
		let post = state
			.posts
			.get_mut(&post_id)
			.ok_or_else(|| Error::NotFound(format!("post {post_id}")))?;

		f(post);

		Ok(post.clone())
	}

	fn read(&self) -> RwLockReadGuard<'_, State> {
		self.state.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, State> {
		self.state.write().unwrap_or_else(|err| err.into_inner())
	}

	fn paged(&self, channel_id: ChannelId, offset: u64, limit: u64) -> Vec<Post> {
		window(self.read().live_newest_first(channel_id, |_| true), offset, limit)
	}

	fn before(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> Result<Vec<Post>> {
		let state = self.read();
		let anchor_at = state.anchor_create_at(channel_id, anchor_id)?;
		let older = state.live_newest_first(channel_id, |post| post.create_at < anchor_at);

		Ok(window(older, offset, limit))
	}

	fn after(
		&self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> Result<Vec<Post>> {
		let state = self.read();
		let anchor_at = state.anchor_create_at(channel_id, anchor_id)?;
		let mut newer = state.live_newest_first(channel_id, |post| post.create_at > anchor_at);

		newer.reverse();

		let mut page = window(newer, offset, limit);

		page.reverse();

		Ok(page)
	}

	fn since(&self, channel_id: ChannelId, since: i64) -> Vec<Post> {
		let state = self.read();
		let mut posts = state
			.channel_posts(channel_id)
			.filter(|post| post.last_touched() > since)
			.cloned()
			.collect::<Vec<_>>();

		posts.sort_by(post::cmp_newest_first);

		posts
	}

	fn thread(&self, root_id: PostId) -> Vec<Post> {
		let state = self.read();
		let mut posts = state
			.posts
			.values()
			.filter(|post| post.id == root_id || (post.root_id == Some(root_id) && !post.is_deleted()))
			.cloned()
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| post::cmp_newest_first(b, a));

		posts
	}

	fn watermark(&self, channel_id: ChannelId) -> ChannelWatermark {
		let state = self.read();
		let mut watermark = ChannelWatermark::default();
		let mut touched_sum = 0_i128;

		for post in state.channel_posts(channel_id) {
			let touched = post.last_touched();

			watermark.last_touched = watermark.last_touched.max(touched);
			watermark.post_count += 1;
			touched_sum += i128::from(touched);
		}

		watermark.touched_sum = (touched_sum % i128::from(i64::MAX)) as i64;

		watermark
	}

	fn search(&self, scope: &SearchScope, filters: &SearchFilters) -> Vec<Post> {
		let matcher = filters.matcher();
		let state = self.read();
		let mut posts = state
			.posts
			.values()
			.filter(|post| filters.admits(scope, &matcher, post))
			.cloned()
			.collect::<Vec<_>>();

		posts.sort_by(post::cmp_newest_first);
		posts.truncate(filters.limit as usize);

		posts
	}

	fn channel_by_name(&self, team_id: TeamId, name: &str) -> Option<ChannelId> {
		self.read()
			.channels
			.values()
			.find(|channel| channel.team_id == team_id && same_name(&channel.name, name))
			.map(|channel| channel.id)
	}

	fn user_by_name(&self, team_id: TeamId, username: &str) -> Option<UserId> {
		let state = self.read();
		let members = state.team_members.get(&team_id)?;

		state
			.users
			.values()
			.find(|user| members.contains(&user.id) && same_name(&user.username, username))
			.map(|user| user.id)
	}
}
impl PostStore for MemoryStore {
	fn fetch_by_channel_paged<'a>(
		&'a self,
		channel_id: ChannelId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		let posts = self.paged(channel_id, offset, limit);

		Box::pin(async move { Ok(posts) })
	}

	fn fetch_by_channel_before<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		let result = self.before(channel_id, anchor_id, offset, limit);

		Box::pin(async move { result })
	}

	fn fetch_by_channel_after<'a>(
		&'a self,
		channel_id: ChannelId,
		anchor_id: PostId,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		let result = self.after(channel_id, anchor_id, offset, limit);

		Box::pin(async move { result })
	}

	fn fetch_by_channel_since<'a>(
		&'a self,
		channel_id: ChannelId,
		since: i64,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		let posts = self.since(channel_id, since);

		Box::pin(async move { Ok(posts) })
	}

	fn fetch_by_id<'a>(&'a self, post_id: PostId) -> BoxFuture<'a, Result<Option<Post>>> {
		let post = self.read().posts.get(&post_id).cloned();

		Box::pin(async move { Ok(post) })
	}

	fn fetch_thread<'a>(&'a self, root_id: PostId) -> BoxFuture<'a, Result<Vec<Post>>> {
		let posts = self.thread(root_id);

		Box::pin(async move { Ok(posts) })
	}

	fn fetch_channel_watermark<'a>(
		&'a self,
		channel_id: ChannelId,
	) -> BoxFuture<'a, Result<ChannelWatermark>> {
		let watermark = self.watermark(channel_id);

		Box::pin(async move { Ok(watermark) })
	}

	fn search_by_filters<'a>(
		&'a self,
		scope: &'a SearchScope,
		filters: &'a SearchFilters,
	) -> BoxFuture<'a, Result<Vec<Post>>> {
		let posts = self.search(scope, filters);

		Box::pin(async move { Ok(posts) })
	}

	fn resolve_channel_name_to_id<'a>(
		&'a self,
		team_id: TeamId,
		name: &'a str,
	) -> BoxFuture<'a, Result<Option<ChannelId>>> {
		let channel_id = self.channel_by_name(team_id, name);

		Box::pin(async move { Ok(channel_id) })
	}

	fn resolve_username_to_id<'a>(
		&'a self,
		team_id: TeamId,
		username: &'a str,
	) -> BoxFuture<'a, Result<Option<UserId>>> {
		let user_id = self.user_by_name(team_id, username);

		Box::pin(async move { Ok(user_id) })
	}
}

fn same_name(stored: &str, wanted: &str) -> bool {
	stored.to_lowercase() == wanted.to_lowercase()
}

fn window(posts: Vec<Post>, offset: u64, limit: u64) -> Vec<Post> {
	let offset = usize::try_from(offset).unwrap_or(usize::MAX);
	let limit = usize::try_from(limit).unwrap_or(usize::MAX);

	posts.into_iter().skip(offset).take(limit).collect()
}
