use parley_domain::NewPost;
use parley_service::Conditional;

use super::World;

#[tokio::test]
async fn page_tags_are_stable_until_the_channel_changes() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let post1 = world.post(channel_id, author, "one");

	world.post(channel_id, author, "two");
	world.post(channel_id, author, "three");

	let first = world.service.get_posts(channel_id, 0, 2, None).await.expect("Fetch must succeed.");

	assert!(first.is_modified());
	assert_eq!(first.payload().map(|list| list.order.len()), Some(2));

	let etag = first.etag().to_string();
	let cached =
		world.service.get_posts(channel_id, 0, 2, Some(&etag)).await.expect("Fetch must succeed.");

	assert_eq!(cached, Conditional::NotModified { etag: etag.clone() });

	let stale = world
		.service
		.get_posts(channel_id, 0, 2, Some("not-a-real-tag"))
		.await
		.expect("Fetch must succeed.");

	assert!(stale.is_modified());
	assert_eq!(stale.etag(), etag);

	world.edit(&post1, "one, revised");

	let after_edit =
		world.service.get_posts(channel_id, 0, 2, Some(&etag)).await.expect("Fetch must succeed.");

	assert!(after_edit.is_modified());
	assert_ne!(after_edit.etag(), etag);

	let etag = after_edit.etag().to_string();

	world.delete(&post1);

	let after_delete =
		world.service.get_posts(channel_id, 0, 2, Some(&etag)).await.expect("Fetch must succeed.");

	assert!(after_delete.is_modified());
	assert_ne!(after_delete.etag(), etag);

	let etag = after_delete.etag().to_string();

	world.post(channel_id, author, "four");

	let after_create =
		world.service.get_posts(channel_id, 0, 2, Some(&etag)).await.expect("Fetch must succeed.");

	assert!(after_create.is_modified());
	assert_ne!(after_create.etag(), etag);
}

#[tokio::test]
async fn writes_in_the_same_millisecond_change_page_tags() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let older = world
		.store
		.create_post(NewPost::new(channel_id, author, "older"), 500)
		.expect("Post must insert.");

	world
		.store
		.create_post(NewPost::new(channel_id, author, "first"), 1_000)
		.expect("Post must insert.");

	let before = world.service.get_posts(channel_id, 0, 10, None).await.expect("Fetch must succeed.");

	world
		.store
		.create_post(NewPost::new(channel_id, author, "second"), 1_000)
		.expect("Post must insert.");

	let after_create = world
		.service
		.get_posts(channel_id, 0, 10, Some(before.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(after_create.is_modified());
	assert_eq!(after_create.payload().map(|list| list.order.len()), Some(3));

	world.store.edit_post(older.id, "older, revised", 1_000).expect("Edit must succeed.");

	let after_edit = world
		.service
		.get_posts(channel_id, 0, 10, Some(after_create.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(after_edit.is_modified());
	assert_eq!(
		after_edit.payload().map(|list| list.posts[&older.id].message.clone()),
		Some("older, revised".to_string())
	);
}

#[tokio::test]
async fn page_tags_differ_per_window() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);

	world.post(channel_id, author, "one");

	let first = world.service.get_posts(channel_id, 0, 2, None).await.expect("Fetch must succeed.");
	let second = world.service.get_posts(channel_id, 1, 2, None).await.expect("Fetch must succeed.");
	let wider = world.service.get_posts(channel_id, 0, 5, None).await.expect("Fetch must succeed.");

	assert_ne!(first.etag(), second.etag());
	assert_ne!(first.etag(), wider.etag());

	let replay = world
		.service
		.get_posts(channel_id, 1, 2, Some(first.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(replay.is_modified());
}

#[tokio::test]
async fn other_channels_do_not_invalidate_a_page() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let elsewhere = world.channel("off-topic", &[author]);

	world.post(channel_id, author, "one");

	let first = world.service.get_posts(channel_id, 0, 10, None).await.expect("Fetch must succeed.");

	world.post(elsewhere, author, "noise");

	let cached = world
		.service
		.get_posts(channel_id, 0, 10, Some(first.etag()))
		.await
		.expect("Fetch must succeed.");

	assert!(!cached.is_modified());
}

#[tokio::test]
async fn single_post_tags_follow_edits() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let post = world.post(channel_id, author, "hello");
	let first =
		world.service.get_post(channel_id, post.id, None).await.expect("Fetch must succeed.");

	assert_eq!(first.payload().map(|fetched| fetched.id), Some(post.id));

	let etag = first.etag().to_string();
	let cached =
		world.service.get_post(channel_id, post.id, Some(&etag)).await.expect("Fetch must succeed.");

	assert!(!cached.is_modified());
	assert!(cached.into_payload().is_none());

	world.edit(&post, "hello again");

	let edited =
		world.service.get_post(channel_id, post.id, Some(&etag)).await.expect("Fetch must succeed.");

	assert_ne!(edited.etag(), etag);
	assert_eq!(edited.into_payload().map(|fetched| fetched.message), Some("hello again".to_string()));
}
