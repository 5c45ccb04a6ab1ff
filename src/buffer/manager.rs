use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};

use crate::buffer::frame::{new_frame_content, FrameContent};
use crate::buffer::page_table::PageTable;
use crate::buffer::replacer::LruKReplacer;
use crate::common::{FrameId, PageId, Result, INVALID_PAGE_ID};
use crate::disk::DiskManager;

/// Orchestrates the page table, LRU-K replacer and free list to hand out
/// pinned, resident pages, pulling cold pages in from (and flushing dirty
/// ones out to) the disk manager (component E).
///
/// All public methods here are meant to be called with the manager
/// serialized behind a single mutex for the duration of each call — see
/// [`BufferPoolManager::new_shared`]. No method suspends; the only blocking
/// work is the disk I/O a miss or eviction performs inline.
pub struct BufferPoolManager {
    pool_size: usize,
    page_size: usize,
    frames: Vec<FrameContent>,
    page_ids: Vec<PageId>,
    pin_counts: Vec<usize>,
    dirty: Vec<bool>,
    page_table: PageTable,
    replacer: LruKReplacer,
    free_list: VecDeque<FrameId>,
    disk_manager: DiskManager,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, replacer_k: usize, page_size: usize, disk_manager: DiskManager) -> Self {
        BufferPoolManager {
            pool_size,
            page_size,
            frames: (0..pool_size).map(|_| new_frame_content(page_size)).collect(),
            page_ids: vec![INVALID_PAGE_ID; pool_size],
            pin_counts: vec![0; pool_size],
            dirty: vec![false; pool_size],
            page_table: PageTable::new(),
            replacer: LruKReplacer::new(pool_size, replacer_k),
            free_list: (0..pool_size).collect(),
            disk_manager,
        }
    }

    /// Convenience constructor for the common case of one buffer pool
    /// manager shared across threads behind a single mutex, matching the
    /// concurrency model in the design docs.
    pub fn new_shared(
        pool_size: usize,
        replacer_k: usize,
        page_size: usize,
        disk_manager: DiskManager,
    ) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new(pool_size, replacer_k, page_size, disk_manager)))
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether `page_id` has been handed out by a prior `new_page` call
    /// (in this process or an earlier one against the same data file), as
    /// opposed to merely reading as zeros because nothing has claimed it
    /// yet. Lets callers like the B+Tree catalog tell a fresh database
    /// apart from one being reopened.
    pub fn is_page_allocated(&self, page_id: PageId) -> bool {
        self.disk_manager.is_page_allocated(page_id)
    }

    /// Allocates a new page and pins it. Returns `Ok(None)` if every frame
    /// is in use and none are evictable ("out of frames" is not an error,
    /// just a hard failure the caller must handle).
    pub fn new_page(&mut self) -> Result<Option<(PageId, FrameContent)>> {
        let Some(frame_id) = self.acquire_frame()? else {
            warn!("new_page: out of frames, pool_size={}", self.pool_size);
            return Ok(None);
        };

        let page_id = self.disk_manager.allocate_page();
        self.frames[frame_id].write().unwrap().fill(0);
        self.install(frame_id, page_id);
        debug!("new_page: allocated page {page_id} in frame {frame_id}");
        Ok(Some((page_id, self.frames[frame_id].clone())))
    }

    /// Returns the requested page, pinning it. Reads it in from disk on a
    /// miss. `Ok(None)` means the page needed to be loaded but no frame was
    /// available.
    pub fn fetch_page(&mut self, page_id: PageId) -> Result<Option<FrameContent>> {
        if let Some(frame_id) = self.page_table.get(page_id) {
            self.pin_counts[frame_id] += 1;
            self.replacer.record_access(frame_id);
            self.replacer.set_evictable(frame_id, false);
            trace!("fetch_page: hit for page {page_id} in frame {frame_id}");
            return Ok(Some(self.frames[frame_id].clone()));
        }

        let Some(frame_id) = self.acquire_frame()? else {
            warn!("fetch_page: out of frames fetching page {page_id}");
            return Ok(None);
        };

        {
            let mut content = self.frames[frame_id].write().unwrap();
            self.disk_manager.read_page(page_id, &mut content)?;
        }
        self.install(frame_id, page_id);
        trace!("fetch_page: miss for page {page_id}, loaded into frame {frame_id}");
        Ok(Some(self.frames[frame_id].clone()))
    }

    /// Decrements the pin count, making the frame evictable once it reaches
    /// zero. `is_dirty` is OR-ed into the frame's dirty bit, never clears
    /// it. Returns `false` if the page is not resident or was already
    /// unpinned.
    pub fn unpin_page(&mut self, page_id: PageId, is_dirty: bool) -> bool {
        let Some(frame_id) = self.page_table.get(page_id) else {
            return false;
        };
        if self.pin_counts[frame_id] == 0 {
            return false;
        }
        self.pin_counts[frame_id] -= 1;
        self.dirty[frame_id] |= is_dirty;
        if self.pin_counts[frame_id] == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
        true
    }

    /// Writes the page's contents to disk and clears its dirty bit.
    /// Returns `false` if the page is not resident. Does not change
    /// pinning.
    pub fn flush_page(&mut self, page_id: PageId) -> Result<bool> {
        let Some(frame_id) = self.page_table.get(page_id) else {
            return Ok(false);
        };
        self.write_frame_to_disk(frame_id, page_id)?;
        Ok(true)
    }

    /// Flushes every resident page.
    pub fn flush_all_pages(&mut self) -> Result<()> {
        for page_id in self.page_table.resident_page_ids() {
            self.flush_page(page_id)?;
        }
        Ok(())
    }

    /// If resident and pinned, fails and returns `false`. Otherwise frees
    /// the frame (returning it to the free list) and deallocates the page
    /// id. Returns `true` if the page was not resident in the first place
    /// (nothing to do).
    pub fn delete_page(&mut self, page_id: PageId) -> bool {
        let Some(frame_id) = self.page_table.get(page_id) else {
            return true;
        };
        if self.pin_counts[frame_id] > 0 {
            return false;
        }
        self.replacer.remove(frame_id);
        self.page_table.remove(page_id);
        self.page_ids[frame_id] = INVALID_PAGE_ID;
        self.dirty[frame_id] = false;
        self.frames[frame_id].write().unwrap().fill(0);
        self.free_list.push_back(frame_id);
        self.disk_manager.deallocate_page(page_id);
        debug!("delete_page: freed page {page_id} from frame {frame_id}");
        true
    }

    /// Picks a frame from the free list, or else asks the replacer for an
    /// evictable one (flushing it first if dirty). Shared by `new_page` and
    /// `fetch_page`, which otherwise differ only in what they do with the
    /// freshly acquired frame.
    fn acquire_frame(&mut self) -> Result<Option<FrameId>> {
        if let Some(frame_id) = self.free_list.pop_front() {
            return Ok(Some(frame_id));
        }
        let Some(frame_id) = self.replacer.evict() else {
            return Ok(None);
        };
        let victim_page_id = self.page_ids[frame_id];
        if self.dirty[frame_id] {
            self.write_frame_to_disk(frame_id, victim_page_id)?;
        }
        self.page_table.remove(victim_page_id);
        Ok(Some(frame_id))
    }

    fn write_frame_to_disk(&mut self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        self.disk_manager.write_page(page_id, &self.frames[frame_id].read().unwrap())?;
        self.dirty[frame_id] = false;
        Ok(())
    }

    /// Binds `frame_id` to `page_id` with `pin_count = 1`, non-evictable,
    /// and records the access. Common tail of `new_page` and the miss path
    /// of `fetch_page`.
    fn install(&mut self, frame_id: FrameId, page_id: PageId) {
        self.page_ids[frame_id] = page_id;
        self.pin_counts[frame_id] = 1;
        self.dirty[frame_id] = false;
        self.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);
    }

    #[cfg(test)]
    pub(crate) fn pin_count_of(&self, page_id: PageId) -> Option<usize> {
        self.page_table.get(page_id).map(|f| self.pin_counts[f])
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        self.page_table.get(page_id).map(|f| self.dirty[f])
    }

    #[cfg(test)]
    pub(crate) fn free_frame_count(&self) -> usize {
        self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager(pool_size: usize, replacer_k: usize) -> (BufferPoolManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskManager::open(dir.path().join("test.db"), 64).unwrap();
        (BufferPoolManager::new(pool_size, replacer_k, 64, disk), dir)
    }

    #[test]
    fn new_page_pins_and_fills_page_table() {
        let (mut bpm, _dir) = test_manager(2, 2);
        let (page_id, _content) = bpm.new_page().unwrap().unwrap();
        assert_eq!(bpm.pin_count_of(page_id), Some(1));
    }

    #[test]
    fn out_of_frames_returns_none() {
        let (mut bpm, _dir) = test_manager(1, 2);
        let (page_id, _content) = bpm.new_page().unwrap().unwrap();
        // Still pinned: no frame is evictable, and the free list is empty.
        assert!(bpm.new_page().unwrap().is_none());
        assert!(bpm.unpin_page(page_id, false));
    }

    #[test]
    fn unpin_dirty_bit_is_sticky() {
        let (mut bpm, _dir) = test_manager(1, 2);
        let (page_id, _content) = bpm.new_page().unwrap().unwrap();
        // Pin again via fetch so there are two pins to unpin in sequence.
        bpm.fetch_page(page_id).unwrap().unwrap();
        assert_eq!(bpm.pin_count_of(page_id), Some(2));
        assert!(bpm.unpin_page(page_id, true));
        assert!(bpm.unpin_page(page_id, false));
        assert_eq!(bpm.is_dirty(page_id), Some(true));
    }

    #[test]
    fn unpin_unknown_page_returns_false() {
        let (mut bpm, _dir) = test_manager(1, 2);
        assert!(!bpm.unpin_page(999, false));
    }

    #[test]
    fn delete_pinned_page_fails() {
        let (mut bpm, _dir) = test_manager(1, 2);
        let (page_id, _content) = bpm.new_page().unwrap().unwrap();
        assert!(!bpm.delete_page(page_id));
        bpm.unpin_page(page_id, false);
        assert!(bpm.delete_page(page_id));
        assert_eq!(bpm.free_frame_count(), 1);
    }

    #[test]
    fn delete_non_resident_page_is_a_noop_success() {
        let (mut bpm, _dir) = test_manager(1, 2);
        assert!(bpm.delete_page(42));
    }

    #[test]
    fn eviction_flushes_dirty_victim_before_reuse() {
        let (mut bpm, _dir) = test_manager(1, 2);
        let (page_id, content) = bpm.new_page().unwrap().unwrap();
        content.write().unwrap()[0] = 0xAB;
        assert!(bpm.unpin_page(page_id, true));

        // Forces eviction of page_id's frame, which must flush it first.
        let (page_id2, _content2) = bpm.new_page().unwrap().unwrap();
        assert_ne!(page_id, page_id2);

        let refetched = bpm.fetch_page(page_id).unwrap().unwrap();
        assert_eq!(refetched.read().unwrap()[0], 0xAB);
    }
}
