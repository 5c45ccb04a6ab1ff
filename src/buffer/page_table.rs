use std::collections::HashMap;

use crate::common::{FrameId, PageId};

/// Mapping from page id to frame index for resident pages (component C).
/// Key uniqueness is an invariant; absence means the page is not resident.
#[derive(Debug, Default)]
pub(crate) struct PageTable {
    map: HashMap<PageId, FrameId>,
}

impl PageTable {
    pub(crate) fn new() -> PageTable {
        PageTable { map: HashMap::new() }
    }

    pub(crate) fn get(&self, page_id: PageId) -> Option<FrameId> {
        self.map.get(&page_id).copied()
    }

    pub(crate) fn insert(&mut self, page_id: PageId, frame_id: FrameId) {
        self.map.insert(page_id, frame_id);
    }

    pub(crate) fn remove(&mut self, page_id: PageId) {
        self.map.remove(&page_id);
    }

    pub(crate) fn resident_page_ids(&self) -> Vec<PageId> {
        self.map.keys().copied().collect()
    }
}
