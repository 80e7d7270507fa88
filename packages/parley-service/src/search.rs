use parley_domain::{ChannelId, PostList, UserId, matcher::PostMatcher, query};
use parley_storage::{SearchFilters, SearchScope};

use crate::{ParleyService, Result, threads};

impl ParleyService {
	/// Runs a raw search query inside the requester's scope.
	///
	/// Modifier values that name no channel or user in the requester's team are dropped. Queries
	/// that end up with nothing to match on return an empty list instead of the whole scope.
	pub async fn search_posts(&self, raw_query: &str, scope: &SearchScope) -> Result<PostList> {
		let parsed = query::parse(raw_query)?;

		if parsed.is_wildcard_only() {
			tracing::debug!("Wildcard-only search; returning an empty list.");

			return Ok(PostList::new());
		}

		let channel_ids = self.resolve_channels(scope, &parsed.channels).await?;
		let user_ids = self.resolve_users(scope, &parsed.users).await?;
		let text_terms = parsed.text_terms();
		let matcher = PostMatcher::new(
			text_terms.iter().copied(),
			parsed.hashtags.iter().map(String::as_str),
		);

		if matcher.is_unconstrained() && channel_ids.is_none() && user_ids.is_none() {
			return Ok(PostList::new());
		}

		let filters = SearchFilters {
			channel_ids,
			user_ids,
			text_terms: text_terms.into_iter().map(str::to_string).collect(),
			hashtag_terms: parsed.hashtags.clone(),
			limit: self.cfg.search.max_results,
		};
		let anchors = self.store.search_by_filters(scope, &filters).await?;

		tracing::debug!(team_id = %scope.team_id, hits = anchors.len(), "Search completed.");

		threads::complete_threads(self.store.as_ref(), anchors).await
	}

	async fn resolve_channels(
		&self,
		scope: &SearchScope,
		names: &[String],
	) -> Result<Option<Vec<ChannelId>>> {
		let mut resolved = Vec::new();

		for name in names {
			match self.store.resolve_channel_name_to_id(scope.team_id, name).await? {
				Some(id) if !resolved.contains(&id) => resolved.push(id),
				Some(_) => {},
				None => tracing::debug!(channel = %name, "Dropping unresolved channel modifier."),
			}
		}

		Ok((!resolved.is_empty()).then_some(resolved))
	}

	async fn resolve_users(
		&self,
		scope: &SearchScope,
		names: &[String],
	) -> Result<Option<Vec<UserId>>> {
		let mut resolved = Vec::new();

		for name in names {
			match self.store.resolve_username_to_id(scope.team_id, name).await? {
				Some(id) if !resolved.contains(&id) => resolved.push(id),
				Some(_) => {},
				None => tracing::debug!(username = %name, "Dropping unresolved user modifier."),
			}
		}

		Ok((!resolved.is_empty()).then_some(resolved))
	}
}
