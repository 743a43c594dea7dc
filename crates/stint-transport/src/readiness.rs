//! Bounded readiness wait on a single descriptor
//!
//! A plain `poll(2)` on one fd. Blocks the calling thread; no reactor, no
//! callbacks. Does not touch any budget: callers charge after it returns.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::time::{Duration, Instant};

use stint_core::{Interest, ReadinessOutcome};

/// Block until `fd` is ready for `interest` or `timeout` elapses.
///
/// A zero timeout returns `TimedOut` without blocking. A descriptor that was
/// closed underneath the wait surfaces as `EBADF` instead of hanging.
/// Error and hang-up conditions count as ready so the next I/O call can
/// report them.
pub fn wait_for(
    fd: BorrowedFd<'_>,
    interest: Interest,
    timeout: Duration,
) -> io::Result<ReadinessOutcome> {
    if timeout.is_zero() {
        return Ok(ReadinessOutcome::TimedOut);
    }

    let events = match interest {
        Interest::Read => libc::POLLIN,
        Interest::Write => libc::POLLOUT,
    };
    let deadline = Instant::now().checked_add(timeout);

    loop {
        let wait = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Ok(ReadinessOutcome::TimedOut);
                }
                poll_millis(left)
            }
            None => -1,
        };

        let mut pollfd = libc::pollfd {
            fd: fd.as_raw_fd(),
            events,
            revents: 0,
        };

        // SAFETY: `pollfd` is a single, initialized entry that outlives the call.
        let rc = unsafe { libc::poll(&mut pollfd, 1, wait) };

        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if rc == 0 {
            // poll rounds up to whole milliseconds; re-check the real deadline
            continue;
        }
        if pollfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }

        tracing::trace!(?interest, revents = pollfd.revents, "descriptor ready");
        return Ok(ReadinessOutcome::Ready);
    }
}

// Round up so a sub-millisecond remainder does not become a busy loop.
fn poll_millis(left: Duration) -> libc::c_int {
    let millis = left.as_nanos().div_ceil(1_000_000);
    millis.min(libc::c_int::MAX as u128) as libc::c_int
}
