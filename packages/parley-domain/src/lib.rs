pub mod hashtag;
pub mod ids;
pub mod matcher;
pub mod mention;
pub mod post;
pub mod post_list;
pub mod query;

pub use ids::{ChannelId, PostId, TeamId, UserId};
pub use post::{NewPost, Post, PostStatus};
pub use post_list::{IntegrityWarning, PostList};
