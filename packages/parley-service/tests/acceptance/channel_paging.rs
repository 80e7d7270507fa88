use parley_domain::{Post, PostId};

use super::{World, assert_well_formed};

struct Timeline {
	world: World,
	post0: Post,
	post1: Post,
	post1a1: Post,
	post2: Post,
	post3: Post,
	post3a1: Post,
}

/// Two threads and two standalone posts in one channel, oldest first.
fn timeline() -> Timeline {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let post0 = world.post(channel_id, author, "zero");
	let post1 = world.post(channel_id, author, "one");
	let post1a1 = world.reply(&post1, author, "one answered");
	let post2 = world.post(channel_id, author, "two");
	let post3 = world.post(channel_id, author, "three");
	let post3a1 = world.reply(&post3, author, "three answered");

	Timeline { world, post0, post1, post1a1, post2, post3, post3a1 }
}

#[tokio::test]
async fn pages_pull_in_the_roots_of_their_replies() {
	let tl = timeline();
	let channel_id = tl.post0.channel_id;
	let first = tl.world.service.get_posts_page(channel_id, 0, 2).await.expect("Page must load.");

	assert_eq!(first.order, vec![tl.post3a1.id, tl.post3.id]);
	assert_eq!(first.posts.len(), 2);
	assert_well_formed(&first);

	let third = tl.world.service.get_posts_page(channel_id, 2, 2).await.expect("Page must load.");

	assert_eq!(third.order, vec![tl.post1a1.id, tl.post1.id]);
	assert_eq!(third.posts.len(), 2);

	let second = tl.world.service.get_posts_page(channel_id, 1, 2).await.expect("Page must load.");

	assert_eq!(second.order, vec![tl.post2.id, tl.post1a1.id]);
	assert_eq!(second.posts.len(), 3);
	assert!(second.contains(&tl.post1.id));
	assert!(!second.order.contains(&tl.post1.id));
	assert_well_formed(&second);
}

#[tokio::test]
async fn pages_past_the_end_are_empty() {
	let tl = timeline();
	let list = tl
		.world
		.service
		.get_posts_page(tl.post0.channel_id, 10, 5)
		.await
		.expect("Page must load.");

	assert!(list.is_empty());
	assert!(list.posts.is_empty());
}

#[tokio::test]
async fn before_cursor_lists_older_posts() {
	let tl = timeline();
	let list = tl
		.world
		.service
		.get_posts_before(tl.post0.channel_id, tl.post1a1.id, 0, 10)
		.await
		.expect("Cursor must load.");

	assert_eq!(list.order, vec![tl.post1.id, tl.post0.id]);
	assert_eq!(list.posts.len(), 2);
	assert_well_formed(&list);
}

#[tokio::test]
async fn after_cursor_starts_next_to_the_anchor() {
	let tl = timeline();
	let channel_id = tl.post0.channel_id;
	let newest = tl
		.world
		.service
		.get_posts_after(channel_id, tl.post3a1.id, 0, 3)
		.await
		.expect("Cursor must load.");

	assert!(newest.is_empty());
	assert!(newest.posts.is_empty());

	tl.world.edit(&tl.post2, "new message");

	let list = tl
		.world
		.service
		.get_posts_after(channel_id, tl.post1a1.id, 0, 2)
		.await
		.expect("Cursor must load.");

	assert_eq!(list.order, vec![tl.post3.id, tl.post2.id]);
	assert_eq!(list.posts[&tl.post2.id].message, "new message");
	assert_well_formed(&list);
}

#[tokio::test]
async fn before_the_fifth_post_returns_the_four_older_ones() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let posts = (1..=5)
		.map(|idx| world.post(channel_id, author, &format!("post {idx}")))
		.collect::<Vec<_>>();
	let list = world
		.service
		.get_posts_before(channel_id, posts[4].id, 0, 10)
		.await
		.expect("Cursor must load.");
	let expected = posts[..4].iter().rev().map(|post| post.id).collect::<Vec<PostId>>();

	assert_eq!(list.order, expected);
}

#[tokio::test]
async fn unknown_or_foreign_anchors_yield_empty_lists() {
	let tl = timeline();
	let other_channel = tl.world.channel("off-topic", &[]);
	let unknown = tl
		.world
		.service
		.get_posts_before(tl.post0.channel_id, PostId::generate(), 0, 10)
		.await
		.expect("Unknown anchors must not fail.");

	assert!(unknown.is_empty());

	let foreign = tl
		.world
		.service
		.get_posts_after(other_channel, tl.post1.id, 0, 10)
		.await
		.expect("Foreign anchors must not fail.");

	assert!(foreign.is_empty());
}

#[tokio::test]
async fn deleted_posts_leave_pages_but_still_anchor_cursors() {
	let tl = timeline();
	let channel_id = tl.post0.channel_id;

	tl.world.delete(&tl.post2);

	let page = tl.world.service.get_posts_page(channel_id, 0, 10).await.expect("Page must load.");

	assert_eq!(page.order.len(), 5);
	assert!(!page.contains(&tl.post2.id));

	let older = tl
		.world
		.service
		.get_posts_before(channel_id, tl.post2.id, 0, 10)
		.await
		.expect("Cursor must load.");

	assert_eq!(older.order, vec![tl.post1a1.id, tl.post1.id, tl.post0.id]);
}

#[tokio::test]
async fn oversized_pages_are_capped() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);

	for idx in 0..205 {
		world.post(channel_id, author, &format!("post {idx}"));
	}

	let capped = world.service.get_posts_page(channel_id, 0, 1_000).await.expect("Page must load.");
	let defaulted = world.service.get_posts_page(channel_id, 0, 0).await.expect("Page must load.");

	assert_eq!(capped.order.len(), 200);
	assert_eq!(defaulted.order.len(), 200);
}
