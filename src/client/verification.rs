use std::time::Duration;

use super::session::{Notice, SIGN_IN_REQUIRED};

/// Scan length when a camera stream could be opened.
pub const CAMERA_SCAN: Duration = Duration::from_millis(3000);
/// Scan length when no camera is available.
pub const NO_CAMERA_SCAN: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Proceed,
    SignInRequired(Notice),
}

/// Pre-application "face scan". Nothing is analysed; the user waits a fixed
/// time and must be signed in to continue.
pub async fn simulate_face_scan(signed_in: bool, camera_available: bool) -> ScanOutcome {
    let wait = if camera_available {
        CAMERA_SCAN
    } else {
        NO_CAMERA_SCAN
    };
    tracing::debug!(camera_available, wait_ms = wait.as_millis() as u64, "face scan started");
    tokio::time::sleep(wait).await;
    if signed_in {
        ScanOutcome::Proceed
    } else {
        ScanOutcome::SignInRequired(Notice::new(SIGN_IN_REQUIRED))
    }
}
