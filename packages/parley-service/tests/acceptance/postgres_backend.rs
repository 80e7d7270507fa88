use std::sync::Arc;

use parley_domain::{ChannelId, NewPost, Post, PostId, TeamId, UserId};
use parley_service::{ParleyService, SearchScope};
use parley_storage::{
	db::Db,
	models::{Channel, User},
	postgres::PgPostStore,
	queries,
};
use parley_testkit::TestDatabase;

use super::{assert_well_formed, test_config};

async fn create(db: &Db, draft: NewPost, now: i64) -> Post {
	let post = Post::new(draft, PostId::generate(), now);

	queries::insert_post(&db.pool, &post).await.expect("Post must insert.");

	post
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PARLEY_PG_DSN to run."]
async fn service_reads_match_on_postgres() {
	let Some(dsn) = parley_testkit::env_dsn() else {
		eprintln!("Skipping service_reads_match_on_postgres; set PARLEY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let cfg = test_config(test_db.dsn().to_string());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let team_id = TeamId::generate();
	let author = User { id: UserId::generate(), username: "author".to_string() };
	let channel = Channel {
		id: ChannelId::generate(),
		team_id,
		name: "town-square".to_string(),
		display_name: "Town Square".to_string(),
	};

	queries::insert_team(&db.pool, team_id, "core").await.expect("Team must insert.");
	queries::insert_user(&db.pool, &author).await.expect("User must insert.");
	queries::add_team_member(&db.pool, team_id, author.id).await.expect("Member must insert.");
	queries::insert_channel(&db.pool, &channel).await.expect("Channel must insert.");
	queries::add_channel_member(&db.pool, channel.id, author.id)
		.await
		.expect("Channel member must insert.");

	let post1 = create(&db, NewPost::new(channel.id, author.id, "#release search one"), 1_000).await;
	let post1a1 =
		create(&db, NewPost::new(channel.id, author.id, "search reply").reply_to(post1.id), 2_000)
			.await;
	let post2 = create(&db, NewPost::new(channel.id, author.id, "two"), 3_000).await;
	let store = PgPostStore::new(&db, cfg.search.prefilter.max_candidates);
	let service = ParleyService::new(cfg, Arc::new(store));
	let page = service.get_posts_page(channel.id, 1, 1).await.expect("Page must load.");

	assert_eq!(page.order, vec![post1a1.id]);
	assert!(page.contains(&post1.id));
	assert_well_formed(&page);

	let after = service
		.get_posts_after(channel.id, post1.id, 0, 10)
		.await
		.expect("Cursor must load.");

	assert_eq!(after.order, vec![post2.id, post1a1.id]);

	let channel_ids = queries::fetch_member_channels(&db.pool, team_id, author.id)
		.await
		.expect("Member channels must load.");
	let scope = SearchScope { team_id, user_id: author.id, channel_ids };
	let found = service.search_posts("search in:Town-Square", &scope).await.expect("Search must run.");

	assert_eq!(found.order, vec![post1a1.id, post1.id]);

	let tagged = service.search_posts("#RELEASE", &scope).await.expect("Search must run.");

	assert_eq!(tagged.order, vec![post1.id]);

	let first = service.get_posts(channel.id, 0, 2, None).await.expect("Fetch must succeed.");
	let cached = service
		.get_posts(channel.id, 0, 2, Some(first.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(!cached.is_modified());

	let mut edited = post2.clone();

	edited.edit("two, revised", 4_000);

	queries::update_post(&db.pool, &edited).await.expect("Update must succeed.");

	let changed = service
		.get_posts(channel.id, 0, 2, Some(first.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(changed.is_modified());

	let delta = service.get_posts_since(channel.id, 3_500).await.expect("Delta must load.");

	assert_eq!(delta.order, vec![post2.id]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
