use std::sync::{Arc, RwLock};

/// The page-contents half of a frame (component B). `pin_count`,
/// `is_dirty` and `page_id` are tracked by the buffer pool manager under
/// its pool-wide mutex (see [`crate::buffer::BufferPoolManager`]); only the
/// raw bytes need a latch of their own, since B+Tree crabbing must be able
/// to hold a page's content latch across several pool-mutex-guarded calls.
pub type FrameContent = Arc<RwLock<Vec<u8>>>;

pub(crate) fn new_frame_content(page_size: usize) -> FrameContent {
    Arc::new(RwLock::new(vec![0u8; page_size]))
}
