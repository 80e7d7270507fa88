pub mod etag;
pub mod mentions;
pub mod pagination;
pub mod search;
pub mod threads;

mod error;

pub use error::{Error, Result};
pub use etag::Conditional;
pub use pagination::PageWindow;
pub use parley_storage::{BoxFuture, PostStore, SearchScope};

use std::sync::Arc;

use parley_config::Config;

/// Read-side entry point for post retrieval.
///
/// Holds no per-request state; every method can run concurrently with any other and with writes
/// landing in the store.
pub struct ParleyService {
	pub cfg: Config,
	pub store: Arc<dyn PostStore>,
}
impl ParleyService {
	pub fn new(cfg: Config, store: Arc<dyn PostStore>) -> Self {
		Self { cfg, store }
	}
}
