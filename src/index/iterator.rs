use std::sync::{Arc, Mutex};

use crate::buffer::BufferPoolManager;
use crate::common::{PageId, Result, INVALID_PAGE_ID};
use crate::page::{IndexKey, LeafPage, RecordId};

/// A forward cursor over a B+Tree's entries, walking the leaf chain left to
/// right. Holds at most one leaf pinned at a time, releasing it as soon as
/// it advances past the last entry on that page.
pub struct IndexIterator<K: IndexKey> {
    bpm: Arc<Mutex<BufferPoolManager>>,
    current_page_id: PageId,
    index: usize,
    _marker: std::marker::PhantomData<K>,
}

impl<K: IndexKey> IndexIterator<K> {
    pub(crate) fn new(bpm: Arc<Mutex<BufferPoolManager>>, leaf_page_id: PageId, index: usize) -> Result<Self> {
        Ok(IndexIterator {
            bpm,
            current_page_id: leaf_page_id,
            index,
            _marker: std::marker::PhantomData,
        })
    }

    pub(crate) fn empty(bpm: Arc<Mutex<BufferPoolManager>>) -> Self {
        IndexIterator {
            bpm,
            current_page_id: INVALID_PAGE_ID,
            index: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<K: IndexKey> Iterator for IndexIterator<K> {
    type Item = Result<(K, RecordId)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_page_id == INVALID_PAGE_ID {
                return None;
            }

            let content = match self.bpm.lock().unwrap().fetch_page(self.current_page_id) {
                Ok(Some(content)) => content,
                Ok(None) => {
                    return Some(Err(crate::common::Error::Internal(
                        "out of buffer frames advancing index iterator".to_string(),
                    )))
                }
                Err(e) => return Some(Err(e)),
            };

            let leaf = match LeafPage::<K>::from_bytes(&content.read().unwrap()) {
                Ok(leaf) => leaf,
                Err(e) => {
                    self.bpm.lock().unwrap().unpin_page(self.current_page_id, false);
                    return Some(Err(e));
                }
            };

            if self.index < leaf.size() {
                let item = (leaf.key_at(self.index), leaf.value_at(self.index));
                self.index += 1;
                self.bpm.lock().unwrap().unpin_page(self.current_page_id, false);
                return Some(Ok(item));
            }

            let next_page_id = leaf.next_page_id();
            self.bpm.lock().unwrap().unpin_page(self.current_page_id, false);
            self.current_page_id = next_page_id;
            self.index = 0;
        }
    }
}
