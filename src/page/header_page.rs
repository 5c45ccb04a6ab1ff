use serde::{Deserialize, Serialize};

use crate::common::{PageId, Result, INVALID_PAGE_ID};
use crate::page::b_plus_tree_page::{decode_page, encode_page};

/// The directory stored in page 0: maps an index's name to the page id of
/// its current root. Every [`crate::index::BPlusTree`] looks itself up (or
/// registers itself) here on open, so a root-page split or merge is
/// reflected durably without the caller having to track root ids itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderPage {
    records: Vec<(String, PageId)>,
}

impl HeaderPage {
    pub fn new() -> HeaderPage {
        HeaderPage::default()
    }

    pub fn root_page_id(&self, index_name: &str) -> Option<PageId> {
        self.records
            .iter()
            .find(|(name, _)| name == index_name)
            .map(|(_, page_id)| *page_id)
            .filter(|&id| id != INVALID_PAGE_ID)
    }

    /// Inserts a new record, or updates the existing one if `index_name` is
    /// already registered.
    pub fn upsert_root_page_id(&mut self, index_name: &str, root_page_id: PageId) {
        match self.records.iter_mut().find(|(name, _)| name == index_name) {
            Some((_, id)) => *id = root_page_id,
            None => self.records.push((index_name.to_string(), root_page_id)),
        }
    }

    pub fn to_bytes(&self, page_size: usize) -> Vec<u8> {
        encode_page(self, page_size)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_page(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_index_has_no_root() {
        let header = HeaderPage::new();
        assert_eq!(header.root_page_id("orders"), None);
    }

    #[test]
    fn upsert_then_lookup_round_trips() {
        let mut header = HeaderPage::new();
        header.upsert_root_page_id("orders", 7);
        assert_eq!(header.root_page_id("orders"), Some(7));
        header.upsert_root_page_id("orders", 9);
        assert_eq!(header.root_page_id("orders"), Some(9));
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut header = HeaderPage::new();
        header.upsert_root_page_id("orders", 7);
        header.upsert_root_page_id("customers", 3);
        let bytes = header.to_bytes(4096);
        let restored = HeaderPage::from_bytes(&bytes).unwrap();
        assert_eq!(restored.root_page_id("orders"), Some(7));
        assert_eq!(restored.root_page_id("customers"), Some(3));
    }
}
