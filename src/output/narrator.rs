//! Operator-facing progress narration.
//!
//! Status markers (`Creating ...SUCCESS`) go to the status stream, which `--quiet`
//! discards. Failure details always go to the detail stream (stderr).

use colored::Colorize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

type Sink = Mutex<Box<dyn Write + Send>>;

pub struct Narrator {
    status: Sink,
    detail: Sink,
    prompt: Sink,
}

impl Narrator {
    pub fn new(
        status: impl Write + Send + 'static,
        detail: impl Write + Send + 'static,
        prompt: impl Write + Send + 'static,
    ) -> Self {
        Narrator {
            status: Mutex::new(Box::new(status)),
            detail: Mutex::new(Box::new(detail)),
            prompt: Mutex::new(Box::new(prompt)),
        }
    }

    /// Narrate to stdout/stderr. With `quiet` the status stream is discarded.
    pub fn stdio(quiet: bool) -> Self {
        Narrator::with_quiet(quiet, io::stdout(), io::stderr(), io::stdout())
    }

    /// Like [`Narrator::new`], but `quiet` swaps the status stream for a sink.
    pub fn with_quiet(
        quiet: bool,
        status: impl Write + Send + 'static,
        detail: impl Write + Send + 'static,
        prompt: impl Write + Send + 'static,
    ) -> Self {
        let status: Box<dyn Write + Send> = if quiet {
            Box::new(io::sink())
        } else {
            Box::new(status)
        };
        Narrator::new(status, detail, prompt)
    }

    /// `"<label>..."`, left open for the outcome marker.
    pub fn start(&self, label: &str) {
        write_to(&self.status, format_args!("{label}..."));
    }

    pub fn success(&self) {
        write_to(&self.status, format_args!("{}\n", "SUCCESS".green()));
    }

    /// Close the open status line with `FAILED` and write `detail` to the detail stream.
    pub fn failure(&self, detail: &str) {
        write_to(&self.status, format_args!("{}\n", "FAILED".red()));
        write_to(&self.detail, format_args!("{detail}"));
    }

    /// Free text on the status stream.
    pub fn status(&self, text: &str) {
        write_to(&self.status, format_args!("{text}"));
    }

    /// Free text on the detail stream.
    pub fn detail(&self, text: &str) {
        write_to(&self.detail, format_args!("{text}"));
    }

    /// Text shown even under `--quiet`, e.g. when waiting for the operator.
    pub fn prompt(&self, text: &str) {
        write_to(&self.prompt, format_args!("{text}"));
    }
}

fn write_to(sink: &Sink, args: std::fmt::Arguments<'_>) {
    // A poisoned or closed stream must not abort provisioning.
    if let Ok(mut out) = sink.lock() {
        let _ = out.write_fmt(args);
        let _ = out.flush();
    }
}

/// In-memory stream whose contents can be read back, for capturing narration.
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut inner) => inner.write(buf),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "sink poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> (Narrator, MemorySink, MemorySink, MemorySink) {
        let (status, detail, prompt) = (MemorySink::new(), MemorySink::new(), MemorySink::new());
        let n = Narrator::new(status.clone(), detail.clone(), prompt.clone());
        (n, status, detail, prompt)
    }

    #[test]
    fn test_success_line() {
        let (n, status, detail, _) = captured();
        n.start("Creating Virtual Network 'sampleVirtualNetwork'");
        n.success();
        let out = status.contents();
        assert!(out.starts_with("Creating Virtual Network 'sampleVirtualNetwork'..."));
        assert!(out.contains("SUCCESS"));
        assert!(out.ends_with('\n'));
        assert_eq!(detail.contents(), "");
    }

    #[test]
    fn test_failure_splits_streams() {
        let (n, status, detail, prompt) = captured();
        n.start("Creating Subnet 'frontendSubnet'");
        n.failure("\tError: boom\n");
        assert!(status.contents().contains("FAILED"));
        assert!(!status.contents().contains("boom"));
        assert_eq!(detail.contents(), "\tError: boom\n");
        assert_eq!(prompt.contents(), "");
    }

    #[test]
    fn test_quiet_drops_status_only() {
        let (status, detail, prompt) = (MemorySink::new(), MemorySink::new(), MemorySink::new());
        let n = Narrator::with_quiet(true, status.clone(), detail.clone(), prompt.clone());
        n.start("Creating Subnet 'backendSubnet'");
        n.failure("\tError: boom\n");
        n.status("Delaying 5 seconds...");
        n.prompt("Press Enter to continue...");
        assert_eq!(status.contents(), "");
        assert_eq!(detail.contents(), "\tError: boom\n");
        assert_eq!(prompt.contents(), "Press Enter to continue...");
    }

    #[test]
    fn test_not_quiet_keeps_status() {
        let status = MemorySink::new();
        let n = Narrator::with_quiet(false, status.clone(), MemorySink::new(), MemorySink::new());
        n.status("Delaying 5 seconds...");
        assert_eq!(status.contents(), "Delaying 5 seconds...");
    }

    #[test]
    fn test_prompt_goes_to_prompt_stream() {
        let (n, status, _, prompt) = captured();
        n.prompt("Press Enter to continue...");
        assert_eq!(prompt.contents(), "Press Enter to continue...");
        assert_eq!(status.contents(), "");
    }
}
