use std::collections::HashSet;

use parley_domain::{
	Post, UserId,
	mention::{self, DirectoryUser, TeamDirectory},
};

use crate::ParleyService;

impl ParleyService {
	/// Team members mentioned in `post` who cannot see it because they are not in the channel.
	///
	/// The directory and membership snapshot come from the caller; nothing is read from the store.
	pub fn get_out_of_channel_mentions(
		&self,
		post: &Post,
		directory: &TeamDirectory,
		channel_members: &HashSet<UserId>,
	) -> Vec<DirectoryUser> {
		let outsiders = mention::out_of_channel_mentions(post, directory, channel_members);

		if !outsiders.is_empty() {
			tracing::debug!(
				post_id = %post.id,
				channel_id = %post.channel_id,
				count = outsiders.len(),
				"Post mentions users outside the channel."
			);
		}

		outsiders
	}
}
