use serde::{Deserialize, Serialize};

use crate::common::{PageId, SlotId, INVALID_PAGE_ID};

/// Identifies a tuple's location: the page holding it and its slot within
/// that page. Eight bytes on the wire (`page_id: i32`, `slot_id: u32`),
/// matching the leaf-page value width fixed in the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    page_id: PageId,
    slot_id: SlotId,
}

/// A record id that never identifies a real tuple, used as a sentinel
/// default value (e.g. for internal page slot 0's unused value column).
pub const INVALID_RID: RecordId = RecordId {
    page_id: INVALID_PAGE_ID,
    slot_id: 0,
};

impl RecordId {
    pub fn new(page_id: PageId, slot_id: SlotId) -> RecordId {
        RecordId { page_id, slot_id }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }
}

impl Default for RecordId {
    fn default() -> Self {
        INVALID_RID
    }
}
