//! Captures formatted `tracing` output for assertions.

use std::{
    io,
    sync::{Arc, Mutex},
};

use tracing::subscriber::DefaultGuard;

/// Buffer that a scoped `fmt` subscriber writes into.
///
/// ```no_run
/// use filedrop_testing::LogCapture;
///
/// let logs = LogCapture::new();
/// let _guard = logs.set_default();
/// tracing::info!("Received file: gs://b/n");
/// assert!(logs.contents().contains("gs://b/n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Creates an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a thread-local subscriber writing into this buffer.
    ///
    /// Output stops being captured when the guard drops. Only events on the
    /// current thread are seen, so use it from `#[tokio::test]`'s
    /// current-thread runtime.
    #[must_use = "capture stops when the guard is dropped"]
    pub fn set_default(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::set_default(subscriber)
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Captured lines containing `needle`.
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents().lines().filter(|line| line.contains(needle)).map(str::to_owned).collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
