//! Client-side state for a signed-in board user: an explicit store of jobs
//! and applications, kept current by a periodic full refresh against a
//! [`BoardBackend`].

pub mod backend;
pub mod session;
pub mod store;
pub mod verification;

pub use backend::{BoardBackend, HttpBoardClient, LocalBoardBackend};
pub use session::{Notice, SyncSession};
pub use store::{BoardStore, FeedFilter};
pub use verification::{simulate_face_scan, ScanOutcome};
