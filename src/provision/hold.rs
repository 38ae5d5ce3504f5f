//! Optional wait before teardown so the operator can inspect what was created.

use crate::output::Narrator;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    Proceed,
    /// Wait for the operator to press Enter.
    Pause,
    Delay(Duration),
}

impl Hold {
    /// `pause` wins over `delay_secs`; a zero delay means no wait.
    pub fn from_flags(pause: bool, delay_secs: u64) -> Hold {
        if pause {
            Hold::Pause
        } else if delay_secs > 0 {
            Hold::Delay(Duration::from_secs(delay_secs))
        } else {
            Hold::Proceed
        }
    }
}

/// Block according to `hold`. Cancellation ends the wait early.
///
/// `acknowledged` resolves once the operator pressed Enter; it is only polled for
/// [`Hold::Pause`].
pub async fn hold_for_inspection<A>(
    hold: Hold,
    narrator: &Narrator,
    acknowledged: A,
    cancel: &CancellationToken,
) where
    A: Future<Output = io::Result<String>>,
{
    match hold {
        Hold::Proceed => {}
        Hold::Pause => {
            narrator.prompt("Press Enter to continue...");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => log::warn!("pause interrupted"),
                read = acknowledged => {
                    if let Err(e) = read {
                        log::warn!("could not read acknowledgement: {e}");
                    }
                }
            }
        }
        Hold::Delay(wait) => {
            narrator.status(&format!("Delaying {} seconds...", wait.as_secs()));
            tokio::select! {
                biased;
                _ = cancel.cancelled() => narrator.status("INTERRUPTED\n"),
                _ = tokio::time::sleep(wait) => narrator.status("DONE\n"),
            }
        }
    }
}

/// One line from stdin.
pub async fn read_stdin_line() -> io::Result<String> {
    read_line_detached(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
}

/// Run the blocking `read` on its own thread.
///
/// The thread is never joined, so an abandoned read cannot keep the runtime from
/// shutting down.
pub async fn read_line_detached<F>(read: F) -> io::Result<String>
where
    F: FnOnce() -> io::Result<String> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = tx.send(read());
    });
    rx.await
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader thread ended")))
}
