use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::{Duration, Instant};

use ferry_protocol::HashProgress;

/// Default progress notification interval.
const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Longest file name shown in a progress description before it is cut.
const MAX_DESCRIPTION_NAME: usize = 20;

/// Receives byte counts while a file is consumed.
///
/// A sink only ever sees counts, never the bytes themselves.
pub trait ProgressSink {
    /// Called once with the number of bytes that will be consumed.
    fn start(&mut self, total_bytes: u64) {
        let _ = total_bytes;
    }

    /// Called after every block with the bytes it contained.
    fn advance(&mut self, bytes: u64);

    /// Called once after the last block.
    fn finish(&mut self) {}
}

/// Reader that forwards every byte it returns to an optional [`ProgressSink`].
///
/// The sink is advanced by exactly the count handed to the caller, so a
/// digest fed from this reader and the sink always agree.
pub struct ProgressReader<'a, R> {
    inner: R,
    sink: Option<&'a mut dyn ProgressSink>,
}

impl<'a, R> ProgressReader<'a, R> {
    pub fn new(inner: R, sink: Option<&'a mut dyn ProgressSink>) -> Self {
        Self { inner, sink }
    }

    /// Announces the total byte count to the sink.
    pub fn start(&mut self, total_bytes: u64) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.start(total_bytes);
        }
    }

    /// Signals the sink that consumption is done.
    pub fn finish(&mut self) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.finish();
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            if let Some(sink) = self.sink.as_deref_mut() {
                sink.advance(n as u64);
            }
        }
        Ok(n)
    }
}

// Seeking moves the cursor only; skipped bytes are not reported.
impl<R: Seek> Seek for ProgressReader<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Sink that just records the counts it receives.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByteCounter {
    pub total: u64,
    pub processed: u64,
    pub finished: bool,
}

impl ProgressSink for ByteCounter {
    fn start(&mut self, total_bytes: u64) {
        self.total = total_bytes;
    }

    fn advance(&mut self, bytes: u64) {
        self.processed += bytes;
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// Callback invoked with hash progress.
pub type ProgressCallback = Box<dyn Fn(HashProgress) + Send + Sync>;

/// Sink that reports [`HashProgress`] snapshots to a callback at most once
/// per interval. The final snapshot is always delivered.
pub struct CallbackProgress {
    description: String,
    callback: ProgressCallback,
    interval: Duration,
    total: u64,
    processed: u64,
    last_emit: Option<Instant>,
}

impl CallbackProgress {
    /// Creates a sink with the given notification interval.
    ///
    /// If `interval` is `None`, defaults to 500 ms.
    pub fn new(
        description: impl Into<String>,
        callback: ProgressCallback,
        interval: Option<Duration>,
    ) -> Self {
        Self {
            description: description.into(),
            callback,
            interval: interval.unwrap_or(DEFAULT_INTERVAL),
            total: 0,
            processed: 0,
            last_emit: None,
        }
    }

    /// Creates a sink described as `Hashing <file name>`.
    pub fn for_path(path: &Path, callback: ProgressCallback) -> Self {
        Self::new(hash_description(path), callback, None)
    }

    fn emit(&mut self) {
        self.last_emit = Some(Instant::now());
        (self.callback)(HashProgress {
            description: self.description.clone(),
            total_bytes: self.total,
            processed_bytes: self.processed,
        });
    }
}

impl ProgressSink for CallbackProgress {
    fn start(&mut self, total_bytes: u64) {
        self.total = total_bytes;
        self.processed = 0;
        self.emit();
    }

    fn advance(&mut self, bytes: u64) {
        self.processed += bytes;
        let due = self
            .last_emit
            .is_none_or(|last| last.elapsed() >= self.interval);
        if due {
            self.emit();
        }
    }

    fn finish(&mut self) {
        self.emit();
    }
}

/// Builds the `Hashing <name>` label shown next to a progress bar.
pub fn hash_description(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if name.chars().count() > MAX_DESCRIPTION_NAME {
        let short: String = name.chars().take(MAX_DESCRIPTION_NAME).collect();
        format!("Hashing {short}...")
    } else {
        format!("Hashing {name}")
    }
}

/// Formats a byte count with binary multiples, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
