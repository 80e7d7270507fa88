use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ids::PostId, post::Post};

/// A thread root referenced by a post in the result that the store could not produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityWarning {
	pub post_id: PostId,
	pub missing_root_id: PostId,
}

/// Anchor identifiers in presentation order plus every post needed to render them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostList {
	pub order: Vec<PostId>,
	pub posts: HashMap<PostId, Post>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub warnings: Vec<IntegrityWarning>,
}
impl PostList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn contains(&self, id: &PostId) -> bool {
		self.posts.contains_key(id)
	}

	pub fn get(&self, id: &PostId) -> Option<&Post> {
		self.posts.get(id)
	}

	/// Appends an anchor. Returns `false` when the identifier is already ordered.
	pub fn push_anchor(&mut self, post: Post) -> bool {
		if self.order.contains(&post.id) {
			return false;
		}

		self.order.push(post.id);
		self.posts.insert(post.id, post);

		true
	}

	/// Adds a post needed for rendering without placing it in `order`.
	pub fn insert_context(&mut self, post: Post) {
		self.posts.entry(post.id).or_insert(post);
	}

	/// Anchors in `order`, resolved against the mapping.
	pub fn anchors(&self) -> impl Iterator<Item = &Post> {
		self.order.iter().filter_map(|id| self.posts.get(id))
	}

	/// Root identifiers referenced in the mapping but absent from it.
	pub fn dangling_roots(&self) -> Vec<PostId> {
		let mut missing = Vec::new();

		for post in self.posts.values() {
			if let Some(root_id) = post.root_id
				&& !self.posts.contains_key(&root_id)
				&& !missing.contains(&root_id)
			{
				missing.push(root_id);
			}
		}

		missing
	}
}
