//! Waits for a file to stop being written.
//!
//! A file counts as stable once it can be opened and locked exclusively. On Unix this is a non-blocking `flock(2)`; on Windows the file
//! is opened with a zero share mode, which fails while anyone else holds it.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Interval between exclusive-open attempts.
pub const STABILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls a file until it can be opened exclusively.
#[derive(Debug, Clone)]
pub struct StabilityGate {
    interval: Duration,
}

impl Default for StabilityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl StabilityGate {
    /// Creates a gate polling every [`STABILITY_POLL_INTERVAL`].
    pub fn new() -> Self {
        Self {
            interval: STABILITY_POLL_INTERVAL,
        }
    }

    /// Creates a gate with a custom polling interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until `path` can be opened exclusively, then releases it.
    ///
    /// There is no upper bound on the wait: a file that another process keeps
    /// open forever blocks the caller forever. A missing or unreadable file
    /// fails with `NotFound` or `PermissionDenied` instead of spinning.
    pub async fn wait_until_stable(&self, path: &Path) -> io::Result<()> {
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            match try_exclusive_open(path)? {
                Some(handle) => {
                    drop(handle);
                    if attempts > 1 {
                        tracing::debug!(path = %path.display(), attempts, "file became stable");
                    }
                    return Ok(());
                }
                None => {
                    if attempts == 1 {
                        tracing::debug!(path = %path.display(), "file busy, waiting");
                    }
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

/// Exclusive handle on a file. Releases the lock when dropped.
#[derive(Debug)]
struct ExclusiveHandle {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
}

#[cfg(unix)]
impl Drop for ExclusiveHandle {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        // SAFETY: flock with LOCK_UN is safe on a valid file descriptor
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

/// Attempts one exclusive open.
///
/// `Ok(None)` means the file is busy. `Err` is returned only for conditions
/// that retrying cannot fix.
#[cfg(unix)]
fn try_exclusive_open(path: &Path) -> io::Result<Option<ExclusiveHandle>> {
    use std::os::unix::io::AsRawFd;

    // flock needs no write access; a read-only file is still lockable.
    let file = match std::fs::OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(e) if is_permanent(&e) => return Err(e),
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "open failed");
            return Ok(None);
        }
    };

    loop {
        // SAFETY: flock is safe on a valid file descriptor
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(Some(ExclusiveHandle { file }));
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(code) if code == libc::EWOULDBLOCK || code == libc::EAGAIN => return Ok(None),
            _ => return Err(err),
        }
    }
}

/// Open failures that no amount of waiting will clear.
#[cfg(not(windows))]
fn is_permanent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::NotADirectory
    )
}

#[cfg(windows)]
fn try_exclusive_open(path: &Path) -> io::Result<Option<ExclusiveHandle>> {
    use std::os::windows::fs::OpenOptionsExt;

    match std::fs::OpenOptions::new()
        .read(true)
        .share_mode(0)
        .open(path)
    {
        Ok(file) => Ok(Some(ExclusiveHandle { file })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "open failed");
            Ok(None)
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn try_exclusive_open(path: &Path) -> io::Result<Option<ExclusiveHandle>> {
    match std::fs::OpenOptions::new().read(true).open(path) {
        Ok(file) => Ok(Some(ExclusiveHandle { file })),
        Err(e) if is_permanent(&e) => Err(e),
        Err(_) => Ok(None),
    }
}
