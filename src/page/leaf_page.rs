use serde::{Deserialize, Serialize};

use crate::common::{PageId, Result, INVALID_PAGE_ID};
use crate::page::b_plus_tree_page::{
    decode_tree_page, encode_tree_page, leaf_max_size, leaf_min_size, BPlusTreePageHeader, PageType,
};
use crate::page::key::IndexKey;
use crate::page::record_id::RecordId;

/// A leaf B+Tree page: `size` sorted `(key, RecordId)` pairs plus a
/// `next_page_id` link to the leaf immediately to its right, forming the
/// ordered chain [`crate::index::IndexIterator`] walks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafPage<K: IndexKey> {
    header: BPlusTreePageHeader,
    next_page_id: PageId,
    keys: Vec<K>,
    values: Vec<RecordId>,
}

impl<K: IndexKey> LeafPage<K> {
    pub fn init(page_id: PageId, parent_page_id: PageId, page_size: usize) -> Self {
        let max_size = leaf_max_size::<K>(page_size);
        LeafPage {
            header: BPlusTreePageHeader::new(PageType::Leaf, page_id, parent_page_id, max_size),
            next_page_id: INVALID_PAGE_ID,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.header.page_id
    }

    pub fn parent_page_id(&self) -> PageId {
        self.header.parent_page_id
    }

    pub fn set_parent_page_id(&mut self, page_id: PageId) {
        self.header.parent_page_id = page_id;
    }

    pub fn next_page_id(&self) -> PageId {
        self.next_page_id
    }

    pub fn set_next_page_id(&mut self, page_id: PageId) {
        self.next_page_id = page_id;
    }

    pub fn size(&self) -> usize {
        self.header.size()
    }

    pub fn max_size(&self) -> usize {
        self.header.max_size()
    }

    pub fn min_size(&self) -> usize {
        leaf_min_size(self.max_size())
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size()
    }

    pub fn is_underflowing(&self) -> bool {
        self.size() < self.min_size()
    }

    pub fn key_at(&self, index: usize) -> K {
        self.keys[index]
    }

    pub fn value_at(&self, index: usize) -> RecordId {
        self.values[index]
    }

    /// Index of `key`, if present.
    pub fn find_key_index(&self, key: &K) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    /// Index of the first slot whose key is `>= key` (`size()` if every key
    /// is smaller), used to position a range scan's starting cursor.
    pub fn lower_bound_index(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Inserts `(key, value)` in sorted order. Returns `false` without
    /// modifying the page if `key` is already present (duplicate keys are
    /// rejected, per the index's uniqueness invariant).
    pub fn insert(&mut self, key: K, value: RecordId) -> bool {
        match self.keys.binary_search(&key) {
            Ok(_) => false,
            Err(pos) => {
                self.keys.insert(pos, key);
                self.values.insert(pos, value);
                self.header.size += 1;
                true
            }
        }
    }

    pub fn delete_at(&mut self, index: usize) {
        self.keys.remove(index);
        self.values.remove(index);
        self.header.size -= 1;
    }

    /// Moves the upper `ceil(size / 2)` entries into a new leaf with id
    /// `new_page_id`, linking it in as this leaf's new `next_page_id`.
    pub fn split_to(&mut self, new_page_id: PageId) -> LeafPage<K> {
        let split_at = self.size().div_ceil(2);
        let moved_keys = self.keys.split_off(split_at);
        let moved_values = self.values.split_off(split_at);
        let moved_count = moved_values.len();
        self.header.size -= moved_count as u32;

        let mut sibling = LeafPage {
            header: BPlusTreePageHeader::new(PageType::Leaf, new_page_id, self.parent_page_id(), self.max_size()),
            next_page_id: self.next_page_id,
            keys: moved_keys,
            values: moved_values,
        };
        sibling.header.size = moved_count as u32;
        self.next_page_id = new_page_id;
        sibling
    }

    /// Absorbs `donor`'s entries (`donor` must be this leaf's right
    /// sibling) and takes over its `next_page_id` link.
    pub fn merge_with(&mut self, donor: LeafPage<K>) {
        self.keys.extend(donor.keys);
        self.values.extend(donor.values);
        self.header.size += donor.header.size;
        self.next_page_id = donor.next_page_id;
    }

    /// Moves this leaf's last entry to the front of `receiver` (its right
    /// sibling) during redistribution. Returns the key now separating the
    /// two leaves in the parent (`receiver`'s new first key).
    pub fn move_last_to_front_of(&mut self, receiver: &mut LeafPage<K>) -> K {
        let key = self.keys.pop().unwrap();
        let value = self.values.pop().unwrap();
        self.header.size -= 1;
        receiver.keys.insert(0, key);
        receiver.values.insert(0, value);
        receiver.header.size += 1;
        key
    }

    /// Moves this leaf's first entry to the end of `receiver` (its left
    /// sibling) during redistribution. Returns the new separator (this
    /// leaf's new first key).
    pub fn move_front_to_last_of(&mut self, receiver: &mut LeafPage<K>) -> K {
        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        self.header.size -= 1;
        receiver.keys.push(key);
        receiver.values.push(value);
        receiver.header.size += 1;
        self.keys[0]
    }

    pub fn to_bytes(&self, page_size: usize) -> Vec<u8> {
        encode_tree_page(&self.header, self, page_size)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_tree_page(bytes)
    }
}
