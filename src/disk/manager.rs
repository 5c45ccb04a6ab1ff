use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};

use log::{debug, trace, warn};

use crate::common::{PageId, Result, INVALID_PAGE_ID};

/// Reads and writes fixed-size pages to a single page-aligned data file, and
/// hands out monotonically increasing page ids.
///
/// Page 0 is reserved for the header page (see [`crate::page::HeaderPage`])
/// and is allocated the same way as any other page; the buffer pool manager
/// is responsible for creating it on first use.
#[derive(Debug)]
pub struct DiskManager {
    file: File,
    page_size: usize,
    next_page_id: AtomicI32,
}

impl DiskManager {
    /// Opens (creating if absent) the data file at `path` for page-granular
    /// I/O. `next_page_id` is derived from the current file length, so
    /// reopening an existing file continues allocating past its current
    /// pages.
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> Result<DiskManager> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path.as_ref())?;
        let len = file.metadata()?.len();
        let next_page_id = (len / page_size as u64) as i32;
        debug!(
            "opened disk manager at {:?}, page_size={page_size}, next_page_id={next_page_id}",
            path.as_ref()
        );
        Ok(DiskManager {
            file,
            page_size,
            next_page_id: AtomicI32::new(next_page_id),
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the next monotonically increasing page id, without writing
    /// anything to disk. The page only becomes durable once a caller writes
    /// to it via [`Self::write_page`].
    pub fn allocate_page(&self) -> PageId {
        self.next_page_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Whether `page_id` has already been handed out by [`Self::allocate_page`],
    /// as opposed to merely being readable-as-zeros because it lies past the
    /// current end of file. Used to tell a brand-new database apart from one
    /// being reopened.
    pub fn is_page_allocated(&self, page_id: PageId) -> bool {
        page_id >= 0 && page_id < self.next_page_id.load(Ordering::SeqCst)
    }

    /// Black-box placeholder: a production allocator would track freed page
    /// ids for reuse. That policy is explicitly out of scope here; we only
    /// log the free so callers can observe it happened.
    pub fn deallocate_page(&self, page_id: PageId) {
        trace!("deallocate_page({page_id}) [no-op: reuse policy out of scope]");
    }

    /// Reads exactly `page_size` bytes for `page_id` into `dst`. A page
    /// beyond the current end of file (allocated but never written) is
    /// treated as all-zero rather than an error.
    pub fn read_page(&mut self, page_id: PageId, dst: &mut [u8]) -> Result<()> {
        assert_eq!(dst.len(), self.page_size, "page buffer has wrong length");
        if page_id < 0 {
            return Err(crate::errinput!("cannot read negative page id {page_id}"));
        }
        let offset = page_id as u64 * self.page_size as u64;
        let file_len = self.file.metadata()?.len();
        if offset >= file_len {
            dst.fill(0);
            return Ok(());
        }
        self.file.seek(SeekFrom::Start(offset))?;
        match self.file.read_exact(dst) {
            Ok(()) => Ok(()),
            // The page was allocated at the tail of the file but the final
            // write never landed (e.g. crash): treat the short read as zeros
            // for whatever bytes are missing.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                dst.fill(0);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes exactly `page_size` bytes for `page_id`, flushing before
    /// returning so the write is durable from the caller's perspective.
    pub fn write_page(&mut self, page_id: PageId, src: &[u8]) -> Result<()> {
        assert_eq!(src.len(), self.page_size, "page buffer has wrong length");
        if page_id < 0 {
            return Err(crate::errinput!("cannot write negative page id {page_id}"));
        }
        let offset = page_id as u64 * self.page_size as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(src)?;
        self.file.flush()?;
        trace!("wrote page {page_id} ({} bytes)", src.len());
        if offset + src.len() as u64 > self.file.metadata()?.len() {
            warn!("wrote past previously observed file length for page {page_id}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_manager(page_size: usize) -> (DiskManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        (DiskManager::open(path, page_size).unwrap(), dir)
    }

    #[test]
    fn allocate_page_is_monotonic() {
        let (dm, _dir) = temp_manager(64);
        assert_eq!(dm.allocate_page(), 0);
        assert_eq!(dm.allocate_page(), 1);
        assert_eq!(dm.allocate_page(), 2);
    }

    #[test]
    fn read_unwritten_page_is_zeroed() {
        let (mut dm, _dir) = temp_manager(64);
        let page_id = dm.allocate_page();
        let mut buf = vec![0xAAu8; 64];
        dm.read_page(page_id, &mut buf).unwrap();
        assert_eq!(buf, vec![0u8; 64]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let (mut dm, _dir) = temp_manager(64);
        let page_id = dm.allocate_page();
        let mut src = vec![0u8; 64];
        src[0] = 7;
        src[63] = 9;
        dm.write_page(page_id, &src).unwrap();

        let mut dst = vec![0xFFu8; 64];
        dm.read_page(page_id, &mut dst).unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn reopening_continues_allocation_past_existing_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let mut dm = DiskManager::open(&path, 64).unwrap();
            let pid = dm.allocate_page();
            dm.write_page(pid, &[1u8; 64]).unwrap();
        }
        let dm = DiskManager::open(&path, 64).unwrap();
        assert_eq!(dm.allocate_page(), 1);
    }

    #[test]
    fn tracks_which_pages_were_actually_allocated() {
        let (dm, _dir) = temp_manager(64);
        assert!(!dm.is_page_allocated(0));
        dm.allocate_page();
        assert!(dm.is_page_allocated(0));
        assert!(!dm.is_page_allocated(1));
    }

    #[test]
    fn rejects_invalid_page_id() {
        let (mut dm, _dir) = temp_manager(64);
        let mut buf = vec![0u8; 64];
        assert!(dm.read_page(INVALID_PAGE_ID, &mut buf).is_err());
        assert!(dm.write_page(INVALID_PAGE_ID, &buf).is_err());
    }
}
