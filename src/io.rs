//! Line source: loads a whole log file into memory as lines.
//!
//! Large files are memory-mapped, smaller ones read in one go. Either way the
//! bytes are split on `\n`, a trailing `\r` is dropped, and invalid UTF-8 is
//! replaced rather than rejected.
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Files at or above this size are memory-mapped.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Anything that can produce the full set of log lines for one run.
pub trait LineSource {
    fn load(&self) -> Result<Vec<String>>;
}

/// A log file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
    pub mmap_threshold_bytes: u64,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            mmap_threshold_bytes: DEFAULT_MMAP_THRESHOLD_BYTES,
        }
    }

    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold_bytes = bytes;
        self
    }
}

impl LineSource for FileSource {
    fn load(&self) -> Result<Vec<String>> {
        read_lines(&self.path, self.mmap_threshold_bytes)
    }
}

/// In-memory log text.
impl LineSource for str {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.lines().map(str::to_owned).collect())
    }
}

pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes > 0 && file_size_bytes >= threshold_bytes
}

pub fn read_lines<P: AsRef<Path>>(path: P, mmap_threshold_bytes: u64) -> Result<Vec<String>> {
    let path = path.as_ref();
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), mmap_threshold_bytes) {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        // SAFETY: the map is read once and dropped before returning; a
        // concurrent truncation by another process is not guarded against.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.display()))?;
        log::debug!("mapped {} ({} bytes)", path.display(), meta.len());
        Ok(split_lines(&mmap))
    } else {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(split_lines(&bytes))
    }
}

/// Split on `\n`. A final line without terminator is kept; an empty tail is not.
pub fn split_lines(data: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', data) {
        lines.push(line_from_bytes(&data[start..end]));
        start = end + 1;
    }
    if start < data.len() {
        lines.push(line_from_bytes(&data[start..]));
    }
    lines
}

fn line_from_bytes(bytes: &[u8]) -> String {
    let slice = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(slice).into_owned()
}
