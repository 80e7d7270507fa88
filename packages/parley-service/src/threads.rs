use std::collections::HashSet;

use parley_domain::{ChannelId, IntegrityWarning, Post, PostId, PostList, post::cmp_newest_first};
use parley_storage::PostStore;

use crate::{Error, ParleyService, Result};

/// Packages `anchors` into a [`PostList`] and pulls in every thread root they reference.
///
/// Each missing root is fetched at most once. A root the store cannot produce leaves its replies
/// in place and is reported through `PostList::warnings`.
pub async fn complete_threads(store: &dyn PostStore, anchors: Vec<Post>) -> Result<PostList> {
	let mut list = PostList::new();

	for post in anchors {
		list.push_anchor(post);
	}

	let mut requested = HashSet::new();
	let missing = list
		.anchors()
		.filter_map(|post| post.root_id)
		.filter(|root_id| !list.contains(root_id) && requested.insert(*root_id))
		.collect::<Vec<PostId>>();

	for root_id in missing {
		match store.fetch_by_id(root_id).await? {
			Some(root) => list.insert_context(root),
			None => {
				for post_id in orphans_of(&list, root_id) {
					tracing::warn!(
						%post_id,
						missing_root_id = %root_id,
						"Thread root is missing; returning the reply without it."
					);

					list.warnings.push(IntegrityWarning { post_id, missing_root_id: root_id });
				}
			},
		}
	}

	Ok(list)
}

impl ParleyService {
	/// The whole thread around `post_id`: its root and every live reply, newest first.
	pub async fn get_post_thread(&self, channel_id: ChannelId, post_id: PostId) -> Result<PostList> {
		let post = self.fetch_visible_post(channel_id, post_id).await?;
		let root_id = post.thread_id();
		let mut thread = self.store.fetch_thread(root_id).await?;

		thread.retain(|member| member.channel_id == channel_id);
		thread.sort_by(cmp_newest_first);

		let mut list = PostList::new();

		for member in thread {
			if member.is_deleted() {
				list.insert_context(member);
			} else {
				list.push_anchor(member);
			}
		}

		if !list.contains(&root_id) {
			tracing::warn!(%post_id, missing_root_id = %root_id, "Thread root is missing.");

			list.warnings.push(IntegrityWarning { post_id, missing_root_id: root_id });
		}

		Ok(list)
	}

	pub(crate) async fn fetch_visible_post(
		&self,
		channel_id: ChannelId,
		post_id: PostId,
	) -> Result<Post> {
		match self.store.fetch_by_id(post_id).await? {
			Some(post) if post.channel_id == channel_id && !post.is_deleted() => Ok(post),
			_ => Err(Error::NotFound { message: format!("post {post_id} in channel {channel_id}") }),
		}
	}
}

fn orphans_of(list: &PostList, root_id: PostId) -> Vec<PostId> {
	list.anchors().filter(|post| post.root_id == Some(root_id)).map(|post| post.id).collect()
}
