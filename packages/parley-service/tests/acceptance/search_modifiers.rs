use parley_domain::PostList;

use super::{World, assert_well_formed};

fn hits(list: &PostList) -> usize {
	list.order.len()
}

#[tokio::test]
async fn free_text_hashtags_and_wildcards() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);

	world.post(channel_id, author, "search for post1");

	let post2 = world.post(channel_id, author, "search for post2");
	let post3 = world.post(channel_id, author, "#hashtag search for post3");

	world.post(channel_id, author, "hashtag for post4");

	let by_word = world.search(author, "search").await;

	assert_eq!(hits(&by_word), 3);
	assert_well_formed(&by_word);
	assert_eq!(world.search(author, "post2").await.order, vec![post2.id]);
	assert_eq!(world.search(author, "#hashtag").await.order, vec![post3.id]);
	assert_eq!(hits(&world.search(author, "*").await), 0);
	assert_eq!(hits(&world.search(author, "post*").await), 4);
}

#[tokio::test]
async fn hashtags_match_exact_tags_across_whitespace() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);

	world.post(channel_id, author, "#sgtitlereview with space");
	world.post(channel_id, author, "#sgtitlereview\n with return");
	world.post(channel_id, author, "#sgtitlereviewer is a different tag");
	world.post(channel_id, author, "plain sgtitlereview without the marker");
	world.post(channel_id, author, "no hashtag");

	assert_eq!(hits(&world.search(author, "#sgtitlereview").await), 2);
	assert_eq!(hits(&world.search(author, "#SGTitleReview").await), 2);
}

#[tokio::test]
async fn text_terms_and_together() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);

	world.post(channel_id, author, "apples only");
	world.post(channel_id, author, "pears only");

	let both = world.post(channel_id, author, "apples and pears");

	assert_eq!(world.search(author, "apples pears").await.order, vec![both.id]);
	assert_eq!(hits(&world.search(author, "apples").await), 2);
}

#[tokio::test]
async fn same_modifiers_or_and_different_ones_and() {
	let world = World::new();
	let author = world.user("author");
	let x = world.channel("x", &[author]);
	let y = world.channel("y", &[author]);
	let p1 = world.post(x, author, "review the draft");
	let p2 = world.post(x, author, "second review pass");
	let p3 = world.post(y, author, "review in y");
	let p4 = world.post(y, author, "final review");
	let in_x = world.search(author, "review channel:X").await;
	let both = world.search(author, "channel:x channel:y").await;

	assert_eq!(in_x.order, vec![p2.id, p1.id]);
	assert_eq!(both.order, vec![p4.id, p3.id, p2.id, p1.id]);
	assert_eq!(hits(&world.search(author, "review from:author in:y").await), 2);
	assert_eq!(hits(&world.search(author, "review from:nobody").await), 4);
}

#[tokio::test]
async fn channel_modifiers() {
	let world = World::new();
	let author = world.user("author");
	let channel1 = world.channel("alpha", &[author]);
	let channel2 = world.channel("beta", &[author]);
	let channel3 = world.channel("gamma", &[author]);

	world.post(channel1, author, "sgtitlereview with space");
	world.post(channel2, author, "sgtitlereview\n with return");
	world.post(channel2, author, "other message with no return");
	world.post(channel3, author, "other message with no return");

	assert_eq!(hits(&world.search(author, "channel:").await), 0);
	assert_eq!(hits(&world.search(author, "in:").await), 0);
	assert_eq!(hits(&world.search(author, "channel:alpha").await), 1);
	assert_eq!(hits(&world.search(author, "in: beta").await), 2);
	assert_eq!(hits(&world.search(author, "channel: beta").await), 2);
	assert_eq!(hits(&world.search(author, "ChAnNeL: beta").await), 2);
	assert_eq!(hits(&world.search(author, "in:~Beta").await), 2);
	assert_eq!(hits(&world.search(author, "sgtitlereview").await), 2);
	assert_eq!(hits(&world.search(author, "sgtitlereview channel:alpha").await), 1);
	assert_eq!(hits(&world.search(author, "sgtitlereview in: beta").await), 1);
	assert_eq!(hits(&world.search(author, "sgtitlereview channel: beta").await), 1);
	assert_eq!(hits(&world.search(author, "channel: beta channel: gamma").await), 3);
	assert_eq!(hits(&world.search(author, "in:nowhere").await), 0);
}

#[tokio::test]
async fn user_modifiers() {
	let world = World::new();
	let user1 = world.user("user1");
	let user2 = world.user("user2");
	let user3 = world.user("user3");
	let channel1 = world.channel("alpha", &[user1, user2, user3]);
	let channel2 = world.channel("beta", &[user1, user2, user3]);

	world.post(channel1, user1, "sgtitlereview with space");
	world.post(channel2, user2, "sgtitlereview\n with return");

	assert_eq!(hits(&world.search(user1, "from: user1").await), 1);
	assert_eq!(hits(&world.search(user1, "from: user2").await), 1);
	assert_eq!(hits(&world.search(user1, "from: user2 sgtitlereview").await), 1);

	world.post(channel1, user2, "hullo");

	assert_eq!(hits(&world.search(user1, "from: user2 in:alpha").await), 1);
	assert_eq!(hits(&world.search(user3, "from: User2").await), 2);

	world.post(channel1, user3, "checking in");

	assert_eq!(hits(&world.search(user3, "from: user2 from: user3").await), 3);
	assert_eq!(hits(&world.search(user3, "from: @user2 from: user3 in:beta").await), 1);

	world.post(channel2, user2, "coconut");

	assert_eq!(hits(&world.search(user3, "from: user2 from: user3 in:beta coconut").await), 1);
	assert_eq!(hits(&world.search(user3, "from:").await), 0);
}

#[tokio::test]
async fn results_stay_inside_the_requester_scope() {
	let world = World::new();
	let insider = world.user("insider");
	let outsider = world.user("outsider");
	let open = world.channel("open", &[insider, outsider]);
	let private = world.channel("private", &[insider]);

	world.post(open, insider, "launch plans");
	world.post(private, insider, "launch secrets");
	world.delete(&world.post(open, insider, "launch retracted"));

	assert_eq!(hits(&world.search(insider, "launch").await), 2);
	assert_eq!(hits(&world.search(outsider, "launch").await), 1);
	assert_eq!(hits(&world.search(outsider, "in:private").await), 0);
}

#[tokio::test]
async fn matching_replies_bring_their_roots() {
	let world = World::new();
	let author = world.user("author");
	let channel_id = world.channel("town-square", &[author]);
	let root = world.post(channel_id, author, "quarterly review");
	let reply = world.reply(&root, author, "attached the numbers");
	let list = world.search(author, "numbers").await;

	assert_eq!(list.order, vec![reply.id]);
	assert!(list.contains(&root.id));
	assert_well_formed(&list);
}

#[tokio::test]
async fn malformed_queries_are_rejected() {
	let world = World::new();
	let author = world.user("author");
	let scope = world.scope(author);
	let err = world
		.service
		.search_posts("in:\0", &scope)
		.await
		.expect_err("NUL bytes must be rejected.");

	assert!(matches!(err, parley_service::Error::InvalidQuery { .. }), "Unexpected error: {err}");
}
