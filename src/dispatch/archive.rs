//! Walks zip archives entry by entry, keeping only entries that carry a GBX signature.

use std::future::Future;
use std::io::{Cursor, ErrorKind, Read};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::core::data::RawBlob;
use crate::dispatch::sniff::{has_magic, MIN_CONTAINER_LEN};
use crate::infra::runtime::cancel::{CancelSignal, Cancelled};

pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Upper bound on the buffer reserved up front; the declared entry size is not trusted.
const MAX_PREALLOC_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Entries whose uncompressed size exceeds this are skipped.
    pub max_entry_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }
}

/// A fully read entry with a valid signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn into_blob(self) -> RawBlob {
        RawBlob::new(Some(self.name), self.data)
    }
}

pub struct ArchiveWalker<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    next: usize,
    limits: ArchiveLimits,
}

impl<'a> ArchiveWalker<'a> {
    /// `None` when the bytes are not a readable archive.
    pub fn open(bytes: &'a [u8], limits: ArchiveLimits) -> Option<Self> {
        match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => Some(Self {
                archive,
                next: 0,
                limits,
            }),
            Err(e) => {
                warn!(error = %e, "input is neither a GBX container nor a readable archive");
                None
            }
        }
    }

    /// Number of entries in the central directory, valid or not.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Next valid entry in archive order.
    pub fn next_entry(&mut self) -> Option<ArchiveEntry> {
        while self.next < self.archive.len() {
            let index = self.next;
            self.next += 1;
            if let Some(entry) = self.read_entry(index) {
                return Some(entry);
            }
        }
        None
    }

    fn read_entry(&mut self, index: usize) -> Option<ArchiveEntry> {
        let max = self.limits.max_entry_bytes;
        let mut file = match self.archive.by_index(index) {
            Ok(file) => file,
            Err(e) => {
                warn!(index, error = %e, "unreadable archive entry, skipped");
                return None;
            }
        };
        let name = file.name().to_owned();
        if file.is_dir() || file_name(&name).is_empty() {
            debug!(entry = %name, "archive entry has no file name, skipped");
            return None;
        }
        if file.size() > max {
            warn!(entry = %name, size = file.size(), max, "archive entry too large, skipped");
            return None;
        }

        let mut magic = [0u8; MIN_CONTAINER_LEN];
        let got = match read_up_to(&mut file, &mut magic) {
            Ok(n) => n,
            Err(e) => {
                warn!(entry = %name, error = %e, "failed to read archive entry, skipped");
                return None;
            }
        };
        if got < MIN_CONTAINER_LEN || !has_magic(&magic) {
            warn!(entry = %name, "invalid GBX data, entry skipped");
            return None;
        }

        let mut data = Vec::with_capacity(initial_capacity(file.size(), max));
        data.extend_from_slice(&magic);
        // The declared size may lie; never read past the limit.
        let budget = max.saturating_sub(MIN_CONTAINER_LEN as u64) + 1;
        if let Err(e) = (&mut file).take(budget).read_to_end(&mut data) {
            warn!(entry = %name, error = %e, "failed to read archive entry, skipped");
            return None;
        }
        if data.len() as u64 > max {
            warn!(entry = %name, max, "archive entry too large, skipped");
            return None;
        }
        Some(ArchiveEntry { name, data })
    }
}

fn initial_capacity(declared: u64, max: u64) -> usize {
    declared.min(max).min(MAX_PREALLOC_BYTES) as usize
}

/// Last path segment of an entry name.
pub fn file_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Feeds every valid entry to `per_entry` in archive order and collects the
/// `Some` results. Cancellation is checked before each entry; the first error
/// stops the walk and drops what was collected.
pub async fn walk_archive<T, E, F, Fut>(
    bytes: &[u8],
    limits: ArchiveLimits,
    cancel: &CancelSignal,
    mut per_entry: F,
) -> Result<Vec<T>, E>
where
    E: From<Cancelled>,
    F: FnMut(ArchiveEntry) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let Some(mut walker) = ArchiveWalker::open(bytes, limits) else {
        return Ok(Vec::new());
    };
    debug!(entries = walker.len(), "walking archive");

    let mut out = Vec::new();
    loop {
        cancel.check()?;
        let Some(entry) = walker.next_entry() else {
            break;
        };
        if let Some(value) = per_entry(entry).await? {
            out.push(value);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::runtime::cancel::cancel_pair;
    use crate::test_support::zip_bytes;

    fn names(bytes: &[u8], limits: ArchiveLimits) -> Vec<String> {
        let mut walker = ArchiveWalker::open(bytes, limits).unwrap();
        std::iter::from_fn(|| walker.next_entry())
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn keeps_only_signed_entries_in_order() {
        let zip = zip_bytes(&[
            ("b.Map.Gbx", b"GBX\x06rest"),
            ("readme.txt", b"hello world"),
            ("maps/", b""),
            ("maps/a.Map.Gbx", b"GBX\x06more"),
            ("tiny", b"GB"),
        ]);
        assert_eq!(
            names(&zip, ArchiveLimits::default()),
            vec!["b.Map.Gbx".to_string(), "maps/a.Map.Gbx".to_string()]
        );
    }

    #[test]
    fn entry_data_is_complete() {
        let zip = zip_bytes(&[("a.Gbx", b"GBX\x06payload")]);
        let mut walker = ArchiveWalker::open(&zip, ArchiveLimits::default()).unwrap();
        let entry = walker.next_entry().unwrap();
        assert_eq!(entry.data, b"GBX\x06payload");
        assert!(walker.next_entry().is_none());
    }

    #[test]
    fn oversized_entries_are_skipped() {
        let zip = zip_bytes(&[("big.Gbx", b"GBX\x06 0123456789"), ("ok.Gbx", b"GBX\x06")]);
        let limits = ArchiveLimits { max_entry_bytes: 8 };
        assert_eq!(names(&zip, limits), vec!["ok.Gbx".to_string()]);
    }

    #[test]
    fn non_archives_do_not_open() {
        assert!(ArchiveWalker::open(b"not a zip at all", ArchiveLimits::default()).is_none());
    }

    #[test]
    fn declared_size_does_not_drive_preallocation() {
        assert_eq!(initial_capacity(u64::MAX, u64::MAX), MAX_PREALLOC_BYTES as usize);
        assert_eq!(initial_capacity(4 << 30, DEFAULT_MAX_ENTRY_BYTES), MAX_PREALLOC_BYTES as usize);
        assert_eq!(initial_capacity(100, DEFAULT_MAX_ENTRY_BYTES), 100);
        assert_eq!(initial_capacity(100, 10), 10);
    }

    #[test]
    fn file_name_takes_last_segment() {
        assert_eq!(file_name("a/b/c.Gbx"), "c.Gbx");
        assert_eq!(file_name("dir/"), "");
        assert_eq!(file_name("x.Gbx"), "x.Gbx");
    }

    #[tokio::test]
    async fn walk_collects_some_results() {
        let zip = zip_bytes(&[("a.Gbx", b"GBX\x06a"), ("b.Gbx", b"GBX\x06b")]);
        let out: Result<Vec<String>, Cancelled> =
            walk_archive(&zip, ArchiveLimits::default(), &CancelSignal::never(), |entry| async move {
                Ok((entry.name != "a.Gbx").then_some(entry.name))
            })
            .await;
        assert_eq!(out.unwrap(), vec!["b.Gbx".to_string()]);
    }

    #[tokio::test]
    async fn walk_stops_when_cancelled() {
        let zip = zip_bytes(&[("a.Gbx", b"GBX\x06a"), ("b.Gbx", b"GBX\x06b")]);
        let (handle, signal) = cancel_pair();
        let mut seen = 0;
        let out: Result<Vec<()>, Cancelled> =
            walk_archive(&zip, ArchiveLimits::default(), &signal, |_| {
                seen += 1;
                handle.cancel();
                async { Ok(Some(())) }
            })
            .await;
        assert_eq!(out, Err(Cancelled));
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn walk_of_non_archive_is_empty() {
        let out: Result<Vec<()>, Cancelled> = walk_archive(
            b"plain bytes",
            ArchiveLimits::default(),
            &CancelSignal::never(),
            |_| async { Ok(Some(())) },
        )
        .await;
        assert!(out.unwrap().is_empty());
    }
}
