use std::{collections::HashSet, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::EnvFilter;

use parley_domain::{ChannelId, PostId, TeamId, UserId};
use parley_service::{ParleyService, SearchScope};
use parley_storage::{db::Db, postgres::PgPostStore, queries};

#[derive(Debug, Parser)]
#[command(
	version = parley_cli::VERSION,
	rename_all = "kebab",
	styles = parley_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

/// Every read the service offers, printed as JSON.
#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Newest posts of a channel, optionally conditional on a previous tag.
	Posts {
		#[arg(long)]
		channel: ChannelId,
		#[command(flatten)]
		window: Window,
		#[arg(long)]
		etag: Option<String>,
	},
	/// Posts older than an anchor.
	Before {
		#[arg(long)]
		channel: ChannelId,
		#[arg(long)]
		anchor: PostId,
		#[command(flatten)]
		window: Window,
	},
	/// Posts newer than an anchor.
	After {
		#[arg(long)]
		channel: ChannelId,
		#[arg(long)]
		anchor: PostId,
		#[command(flatten)]
		window: Window,
	},
	/// Posts created, edited, or deleted after a cutoff.
	Since {
		#[arg(long)]
		channel: ChannelId,
		/// Cutoff in milliseconds since the Unix epoch.
		#[arg(long, required_unless_present = "last_seconds", conflicts_with = "last_seconds")]
		since: Option<i64>,
		/// Cutoff relative to now.
		#[arg(long)]
		last_seconds: Option<i64>,
	},
	/// One post, optionally conditional on a previous tag.
	Post {
		#[arg(long)]
		channel: ChannelId,
		#[arg(long)]
		post: PostId,
		#[arg(long)]
		etag: Option<String>,
	},
	/// The whole thread around a post.
	Thread {
		#[arg(long)]
		channel: ChannelId,
		#[arg(long)]
		post: PostId,
	},
	/// Searches the channels `user` belongs to.
	Search {
		#[arg(long)]
		team: TeamId,
		#[arg(long)]
		user: UserId,
		query: String,
	},
	/// Team members mentioned in a post who are not in its channel.
	Mentions {
		#[arg(long)]
		team: TeamId,
		#[arg(long)]
		channel: ChannelId,
		#[arg(long)]
		post: PostId,
	},
}

#[derive(Debug, clap::Args)]
pub struct Window {
	#[arg(long, default_value_t = 0, allow_negative_numbers = true)]
	pub page: i64,
	/// Defaults to `pagination.default_per_page`.
	#[arg(long, allow_negative_numbers = true)]
	pub per_page: Option<i64>,
}
impl Window {
	fn per_page(&self, cfg: &parley_config::Config) -> i64 {
		self.per_page.unwrap_or_else(|| i64::from(cfg.pagination.default_per_page))
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = parley_config::load(&args.config)?;

	init_tracing(&config)?;

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	tracing::info!(config = %args.config.display(), "Connected to Postgres.");

	let store = PgPostStore::new(&db, config.search.prefilter.max_candidates);
	let service = ParleyService::new(config, Arc::new(store));
	let output = execute(&service, &db, args.command).await?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

async fn execute(service: &ParleyService, db: &Db, command: Command) -> color_eyre::Result<Value> {
	let value = match command {
		Command::Posts { channel, window, etag } => {
			let per_page = window.per_page(&service.cfg);

			serde_json::to_value(
				service.get_posts(channel, window.page, per_page, etag.as_deref()).await?,
			)?
		},
		Command::Before { channel, anchor, window } => {
			let per_page = window.per_page(&service.cfg);

			serde_json::to_value(
				service.get_posts_before(channel, anchor, window.page, per_page).await?,
			)?
		},
		Command::After { channel, anchor, window } => {
			let per_page = window.per_page(&service.cfg);

			serde_json::to_value(
				service.get_posts_after(channel, anchor, window.page, per_page).await?,
			)?
		},
		Command::Since { channel, since, last_seconds } => {
			let cutoff = resolve_cutoff(since, last_seconds, OffsetDateTime::now_utc())?;

			serde_json::to_value(service.get_posts_since(channel, cutoff).await?)?
		},
		Command::Post { channel, post, etag } =>
			serde_json::to_value(service.get_post(channel, post, etag.as_deref()).await?)?,
		Command::Thread { channel, post } =>
			serde_json::to_value(service.get_post_thread(channel, post).await?)?,
		Command::Search { team, user, query } => {
			let channel_ids = queries::fetch_member_channels(&db.pool, team, user).await?;
			let scope = SearchScope { team_id: team, user_id: user, channel_ids };

			serde_json::to_value(service.search_posts(&query, &scope).await?)?
		},
		Command::Mentions { team, channel, post } => {
			let post = match service.get_post(channel, post, None).await?.into_payload() {
				Some(post) => post,
				None => return Err(eyre::eyre!("Post {post} returned no payload.")),
			};
			let directory = queries::fetch_team_directory(&db.pool, team).await?;
			let members = queries::fetch_channel_members(&db.pool, channel)
				.await?
				.into_iter()
				.collect::<HashSet<UserId>>();

			serde_json::to_value(service.get_out_of_channel_mentions(&post, &directory, &members))?
		},
	};

	Ok(value)
}

/// Milliseconds since the Unix epoch, either given directly or `last_seconds` before `now`.
fn resolve_cutoff(
	since: Option<i64>,
	last_seconds: Option<i64>,
	now: OffsetDateTime,
) -> color_eyre::Result<i64> {
	match (since, last_seconds) {
		(Some(since), _) => Ok(since),
		(None, Some(seconds)) if seconds >= 0 => {
			let cutoff = now
				.checked_sub(Duration::seconds(seconds))
				.ok_or_else(|| eyre::eyre!("--last-seconds {seconds} reaches before the supported range."))?;

			Ok(i64::try_from(cutoff.unix_timestamp_nanos() / 1_000_000)?)
		},
		(None, Some(_)) => Err(eyre::eyre!("--last-seconds must not be negative.")),
		(None, None) => Err(eyre::eyre!("Either --since or --last-seconds is required.")),
	}
}

fn init_tracing(config: &parley_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
