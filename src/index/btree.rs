use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::buffer::{BufferPoolManager, FrameContent};
use crate::common::{Error, PageId, Result, HEADER_PAGE_ID, INVALID_PAGE_ID};
use crate::index::iterator::IndexIterator;
use crate::page::{
    internal_max_size, internal_min_size, leaf_max_size, leaf_min_size, peek_tree_page, HeaderPage, IndexKey,
    InternalPage, LeafPage, PageType, RecordId,
};

/// A disk-resident B+Tree index keyed by `K`, storing `(key, RecordId)`
/// pairs with unique keys in ascending order. Every page touch goes
/// through the shared buffer pool manager; the tree itself holds no
/// pages pinned between calls.
pub struct BPlusTree<K: IndexKey> {
    index_name: String,
    bpm: Arc<Mutex<BufferPoolManager>>,
    page_size: usize,
    _marker: PhantomData<K>,
}

/// Bookkeeping for one page held pinned during a crabbing step: releasing
/// (explicitly via [`CrabbingGuard::release`], or implicitly on drop)
/// unpins it, carrying forward whether it was modified. Crabbing itself —
/// deciding *when* it is safe to release early — lives in the traversal
/// code that creates these guards.
struct CrabbingGuard {
    bpm: Arc<Mutex<BufferPoolManager>>,
    page_id: PageId,
    dirty: bool,
    released: bool,
}

impl CrabbingGuard {
    fn fetch(bpm: Arc<Mutex<BufferPoolManager>>, page_id: PageId) -> Result<(CrabbingGuard, FrameContent)> {
        let content = bpm
            .lock()
            .unwrap()
            .fetch_page(page_id)?
            .ok_or_else(|| Error::Internal(format!("out of buffer frames fetching page {page_id}")))?;
        Ok((
            CrabbingGuard {
                bpm,
                page_id,
                dirty: false,
                released: false,
            },
            content,
        ))
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Releases this page now rather than when the guard drops, which is
    /// how an ancestor proven safe is let go mid-traversal.
    fn release(mut self) {
        self.released = true;
        self.bpm.lock().unwrap().unpin_page(self.page_id, self.dirty);
    }
}

impl Drop for CrabbingGuard {
    fn drop(&mut self) {
        if !self.released {
            self.bpm.lock().unwrap().unpin_page(self.page_id, self.dirty);
        }
    }
}

enum InsertEffect<K: IndexKey> {
    Duplicate,
    Done,
    Split { left: PageId, separator: K, right: PageId },
}

enum DeleteOutcome {
    KeyNotFound,
    Done,
    Underflowed,
}

impl<K: IndexKey> BPlusTree<K> {
    /// Opens (and, on a brand-new data file, bootstraps) the named index
    /// against a shared buffer pool. Several indexes of different key
    /// types can share one pool and header page, distinguished by name.
    pub fn open(index_name: impl Into<String>, bpm: Arc<Mutex<BufferPoolManager>>) -> Result<BPlusTree<K>> {
        let page_size = bpm.lock().unwrap().page_size();
        let tree = BPlusTree {
            index_name: index_name.into(),
            bpm,
            page_size,
            _marker: PhantomData,
        };
        tree.ensure_header_page()?;
        Ok(tree)
    }

    pub fn leaf_max_size(&self) -> usize {
        leaf_max_size::<K>(self.page_size)
    }

    pub fn internal_max_size(&self) -> usize {
        internal_max_size::<K>(self.page_size)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.root_page_id()?.is_none())
    }

    /// Point lookup. `Ok(None)` means the key is absent, not an error.
    pub fn get_value(&self, key: &K) -> Result<Option<RecordId>> {
        let Some(root_id) = self.root_page_id()? else {
            return Ok(None);
        };
        let mut current_id = root_id;
        let mut current_content = self.fetch(current_id)?;
        loop {
            let page_type = { peek_tree_page(&current_content.read().unwrap()).page_type };
            if page_type == PageType::Leaf {
                let leaf = LeafPage::<K>::from_bytes(&current_content.read().unwrap())?;
                let found = leaf.find_key_index(key).map(|i| leaf.value_at(i));
                self.unpin(current_id, false);
                return Ok(found);
            }
            let internal = InternalPage::<K>::from_bytes(&current_content.read().unwrap())?;
            let next_id = internal.find_lower_bound(key);
            let next_content = self.fetch(next_id)?;
            self.unpin(current_id, false);
            current_id = next_id;
            current_content = next_content;
        }
    }

    /// Inserts `(key, value)`. Returns `false` without modifying the tree
    /// if `key` is already present.
    pub fn insert(&self, key: K, value: RecordId) -> Result<bool> {
        let Some(root_id) = self.root_page_id()? else {
            let (page_id, content) = self.new_page()?;
            let mut leaf = LeafPage::<K>::init(page_id, INVALID_PAGE_ID, self.page_size);
            leaf.insert(key, value);
            *content.write().unwrap() = leaf.to_bytes(self.page_size);
            self.unpin(page_id, true);
            self.set_root_page_id(Some(page_id))?;
            return Ok(true);
        };

        match self.insert_recursive(root_id, key, value)? {
            InsertEffect::Duplicate => Ok(false),
            InsertEffect::Done => Ok(true),
            InsertEffect::Split { left, separator, right } => {
                let (new_root_id, new_root_content) = self.new_page()?;
                let mut new_root = InternalPage::<K>::init(new_root_id, INVALID_PAGE_ID, self.page_size);
                new_root.init_as_root(left, separator, right);
                *new_root_content.write().unwrap() = new_root.to_bytes(self.page_size);
                self.unpin(new_root_id, true);
                self.reparent_children(&[left, right], new_root_id)?;
                self.set_root_page_id(Some(new_root_id))?;
                Ok(true)
            }
        }
    }

    /// Removes `key`. Returns `false` without modifying the tree if the
    /// key was never present.
    pub fn remove(&self, key: &K) -> Result<bool> {
        let Some(root_id) = self.root_page_id()? else {
            return Ok(false);
        };
        match self.delete_recursive(root_id, key)? {
            DeleteOutcome::KeyNotFound => Ok(false),
            DeleteOutcome::Done | DeleteOutcome::Underflowed => {
                self.adjust_root_if_needed(root_id)?;
                Ok(true)
            }
        }
    }

    /// A forward cursor over every entry in ascending key order.
    pub fn iter(&self) -> Result<IndexIterator<K>> {
        let Some(root_id) = self.root_page_id()? else {
            return Ok(IndexIterator::empty(self.bpm.clone()));
        };
        let leaf_id = self.edge_leaf(root_id, true)?;
        IndexIterator::new(self.bpm.clone(), leaf_id, 0)
    }

    /// A forward cursor starting at the first entry whose key is `>= key`.
    pub fn range_from(&self, key: &K) -> Result<IndexIterator<K>> {
        let Some(root_id) = self.root_page_id()? else {
            return Ok(IndexIterator::empty(self.bpm.clone()));
        };
        let mut current_id = root_id;
        loop {
            let content = self.fetch(current_id)?;
            let page_type = { peek_tree_page(&content.read().unwrap()).page_type };
            if page_type == PageType::Leaf {
                let leaf = LeafPage::<K>::from_bytes(&content.read().unwrap())?;
                let index = leaf.lower_bound_index(key);
                self.unpin(current_id, false);
                return IndexIterator::new(self.bpm.clone(), current_id, index);
            }
            let internal = InternalPage::<K>::from_bytes(&content.read().unwrap())?;
            let next_id = internal.find_lower_bound(key);
            self.unpin(current_id, false);
            current_id = next_id;
        }
    }

    fn edge_leaf(&self, mut current_id: PageId, leftmost: bool) -> Result<PageId> {
        loop {
            let content = self.fetch(current_id)?;
            let page_type = { peek_tree_page(&content.read().unwrap()).page_type };
            if page_type == PageType::Leaf {
                self.unpin(current_id, false);
                return Ok(current_id);
            }
            let internal = InternalPage::<K>::from_bytes(&content.read().unwrap())?;
            let next_id = if leftmost {
                internal.value_at(0)
            } else {
                internal.value_at(internal.size() - 1)
            };
            self.unpin(current_id, false);
            current_id = next_id;
        }
    }

    fn insert_recursive(&self, page_id: PageId, key: K, value: RecordId) -> Result<InsertEffect<K>> {
        let (mut guard, content) = CrabbingGuard::fetch(self.bpm.clone(), page_id)?;
        let page_type = { peek_tree_page(&content.read().unwrap()).page_type };

        if page_type == PageType::Leaf {
            let mut bytes = content.write().unwrap();
            let mut leaf = LeafPage::<K>::from_bytes(&bytes)?;
            if !leaf.insert(key, value) {
                return Ok(InsertEffect::Duplicate);
            }
            guard.mark_dirty();
            let effect = if leaf.is_full() {
                let (new_id, new_content) = self.new_page()?;
                let sibling = leaf.split_to(new_id);
                let separator = sibling.key_at(0);
                *new_content.write().unwrap() = sibling.to_bytes(self.page_size);
                self.unpin(new_id, true);
                InsertEffect::Split { left: page_id, separator, right: new_id }
            } else {
                InsertEffect::Done
            };
            *bytes = leaf.to_bytes(self.page_size);
            return Ok(effect);
        }

        let internal = InternalPage::<K>::from_bytes(&content.read().unwrap())?;
        let child_id = internal.find_lower_bound(&key);
        drop(internal);

        let child_guaranteed_safe = {
            let child_content = self.fetch(child_id)?;
            let peek = peek_tree_page(&child_content.read().unwrap());
            self.unpin(child_id, false);
            peek.size + 1 < peek.max_size
        };
        if child_guaranteed_safe {
            guard.release();
        }

        match self.insert_recursive(child_id, key, value)? {
            effect @ (InsertEffect::Done | InsertEffect::Duplicate) => Ok(effect),
            InsertEffect::Split { left, separator, right } => {
                let mut bytes = content.write().unwrap();
                let mut internal = InternalPage::<K>::from_bytes(&bytes)?;
                internal.insert_after(left, separator, right);
                guard.mark_dirty();
                let effect = if internal.is_full() {
                    let (new_id, new_content) = self.new_page()?;
                    let sibling = internal.split_to(new_id);
                    let migrated: Vec<PageId> = sibling.children().to_vec();
                    let up_separator = sibling.key_at(0);
                    *new_content.write().unwrap() = sibling.to_bytes(self.page_size);
                    self.unpin(new_id, true);
                    self.reparent_children(&migrated, new_id)?;
                    InsertEffect::Split { left: page_id, separator: up_separator, right: new_id }
                } else {
                    InsertEffect::Done
                };
                *bytes = internal.to_bytes(self.page_size);
                Ok(effect)
            }
        }
    }

    fn delete_recursive(&self, page_id: PageId, key: &K) -> Result<DeleteOutcome> {
        let (mut guard, content) = CrabbingGuard::fetch(self.bpm.clone(), page_id)?;
        let page_type = { peek_tree_page(&content.read().unwrap()).page_type };

        if page_type == PageType::Leaf {
            let mut bytes = content.write().unwrap();
            let mut leaf = LeafPage::<K>::from_bytes(&bytes)?;
            let Some(index) = leaf.find_key_index(key) else {
                return Ok(DeleteOutcome::KeyNotFound);
            };
            leaf.delete_at(index);
            guard.mark_dirty();
            let is_root = leaf.parent_page_id() == INVALID_PAGE_ID;
            let outcome = if !is_root && leaf.is_underflowing() {
                DeleteOutcome::Underflowed
            } else {
                DeleteOutcome::Done
            };
            *bytes = leaf.to_bytes(self.page_size);
            return Ok(outcome);
        }

        let internal = InternalPage::<K>::from_bytes(&content.read().unwrap())?;
        let child_id = internal.find_lower_bound(key);
        drop(internal);

        let child_guaranteed_safe = {
            let child_content = self.fetch(child_id)?;
            let peek = peek_tree_page(&child_content.read().unwrap());
            self.unpin(child_id, false);
            let min_size = match peek.page_type {
                PageType::Leaf => leaf_min_size(peek.max_size),
                PageType::Internal => internal_min_size(peek.max_size),
            };
            peek.size > min_size
        };
        if child_guaranteed_safe {
            guard.release();
        }

        match self.delete_recursive(child_id, key)? {
            DeleteOutcome::KeyNotFound => Ok(DeleteOutcome::KeyNotFound),
            DeleteOutcome::Done => Ok(DeleteOutcome::Done),
            DeleteOutcome::Underflowed => {
                let mut bytes = content.write().unwrap();
                let mut internal = InternalPage::<K>::from_bytes(&bytes)?;
                self.fix_underflowed_child(&mut internal, child_id)?;
                guard.mark_dirty();
                let is_root = internal.parent_page_id() == INVALID_PAGE_ID;
                let outcome = if !is_root && internal.is_underflowing() {
                    DeleteOutcome::Underflowed
                } else {
                    DeleteOutcome::Done
                };
                *bytes = internal.to_bytes(self.page_size);
                Ok(outcome)
            }
        }
    }

    /// Repairs `child_id`'s underflow by merging it with a sibling (when
    /// the combined size fits one page) or else redistributing one entry
    /// from whichever sibling it has. `parent` is `child_id`'s already
    /// write-latched parent, decoded and re-encoded by the caller.
    fn fix_underflowed_child(&self, parent: &mut InternalPage<K>, child_id: PageId) -> Result<()> {
        let child_index = parent
            .find_value_index(child_id)
            .expect("underflowed page must be a child of the parent repairing it");
        let left_id = (child_index > 0).then(|| parent.value_at(child_index - 1));
        let right_id = (child_index + 1 < parent.size()).then(|| parent.value_at(child_index + 1));

        let child_content = self.fetch(child_id)?;
        let page_type = { peek_tree_page(&child_content.read().unwrap()).page_type };

        match page_type {
            PageType::Leaf => {
                if let Some(left_id) = left_id {
                    let left_content = self.fetch(left_id)?;
                    let mut left = LeafPage::<K>::from_bytes(&left_content.read().unwrap())?;
                    let mut child = LeafPage::<K>::from_bytes(&child_content.read().unwrap())?;
                    if left.size() + child.size() <= left.max_size() {
                        left.merge_with(child);
                        *left_content.write().unwrap() = left.to_bytes(self.page_size);
                        self.unpin(left_id, true);
                        self.unpin(child_id, false);
                        parent.delete_at(child_index);
                        self.delete_page(child_id);
                    } else {
                        let new_separator = left.move_last_to_front_of(&mut child);
                        *left_content.write().unwrap() = left.to_bytes(self.page_size);
                        *child_content.write().unwrap() = child.to_bytes(self.page_size);
                        self.unpin(left_id, true);
                        self.unpin(child_id, true);
                        parent.set_key_at(child_index, new_separator);
                    }
                    return Ok(());
                }
                let right_id = right_id.expect("an underflowed non-root page has at least one sibling");
                let right_content = self.fetch(right_id)?;
                let mut right = LeafPage::<K>::from_bytes(&right_content.read().unwrap())?;
                let mut child = LeafPage::<K>::from_bytes(&child_content.read().unwrap())?;
                if child.size() + right.size() <= child.max_size() {
                    child.merge_with(right);
                    *child_content.write().unwrap() = child.to_bytes(self.page_size);
                    self.unpin(child_id, true);
                    self.unpin(right_id, false);
                    parent.delete_at(child_index + 1);
                    self.delete_page(right_id);
                } else {
                    let new_separator = right.move_front_to_last_of(&mut child);
                    *child_content.write().unwrap() = child.to_bytes(self.page_size);
                    *right_content.write().unwrap() = right.to_bytes(self.page_size);
                    self.unpin(child_id, true);
                    self.unpin(right_id, true);
                    parent.set_key_at(child_index + 1, new_separator);
                }
                Ok(())
            }
            PageType::Internal => {
                if let Some(left_id) = left_id {
                    let left_content = self.fetch(left_id)?;
                    let mut left = InternalPage::<K>::from_bytes(&left_content.read().unwrap())?;
                    let mut child = InternalPage::<K>::from_bytes(&child_content.read().unwrap())?;
                    let separator = parent.key_at(child_index);
                    if left.size() + child.size() <= left.max_size() {
                        let migrated = left.merge_with(child, separator);
                        *left_content.write().unwrap() = left.to_bytes(self.page_size);
                        self.unpin(left_id, true);
                        self.unpin(child_id, false);
                        self.reparent_children(&migrated, left_id)?;
                        parent.delete_at(child_index);
                        self.delete_page(child_id);
                    } else {
                        let (new_separator, migrated_child) = left.move_last_to_front_of(&mut child, separator);
                        *left_content.write().unwrap() = left.to_bytes(self.page_size);
                        *child_content.write().unwrap() = child.to_bytes(self.page_size);
                        self.unpin(left_id, true);
                        self.unpin(child_id, true);
                        self.reparent_children(&[migrated_child], child_id)?;
                        parent.set_key_at(child_index, new_separator);
                    }
                    return Ok(());
                }
                let right_id = right_id.expect("an underflowed non-root page has at least one sibling");
                let right_content = self.fetch(right_id)?;
                let mut right = InternalPage::<K>::from_bytes(&right_content.read().unwrap())?;
                let mut child = InternalPage::<K>::from_bytes(&child_content.read().unwrap())?;
                let separator = parent.key_at(child_index + 1);
                if child.size() + right.size() <= child.max_size() {
                    let migrated = child.merge_with(right, separator);
                    *child_content.write().unwrap() = child.to_bytes(self.page_size);
                    self.unpin(child_id, true);
                    self.unpin(right_id, false);
                    self.reparent_children(&migrated, child_id)?;
                    parent.delete_at(child_index + 1);
                    self.delete_page(right_id);
                } else {
                    let (new_separator, migrated_child) = right.move_front_to_last_of(&mut child, separator);
                    *child_content.write().unwrap() = child.to_bytes(self.page_size);
                    *right_content.write().unwrap() = right.to_bytes(self.page_size);
                    self.unpin(child_id, true);
                    self.unpin(right_id, true);
                    self.reparent_children(&[migrated_child], child_id)?;
                    parent.set_key_at(child_index + 1, new_separator);
                }
                Ok(())
            }
        }
    }

    /// After a deletion, collapses a root that has degenerated: an empty
    /// leaf root means the tree is now empty, and an internal root with
    /// exactly one child promotes that child to root.
    fn adjust_root_if_needed(&self, root_id: PageId) -> Result<()> {
        let content = self.fetch(root_id)?;
        let peek = peek_tree_page(&content.read().unwrap());
        match peek.page_type {
            PageType::Leaf => {
                self.unpin(root_id, false);
                if peek.size == 0 {
                    self.delete_page(root_id);
                    self.set_root_page_id(None)?;
                }
            }
            PageType::Internal => {
                if peek.size != 1 {
                    self.unpin(root_id, false);
                    return Ok(());
                }
                let internal = InternalPage::<K>::from_bytes(&content.read().unwrap())?;
                let only_child = internal.value_at(0);
                self.unpin(root_id, false);
                self.delete_page(root_id);
                self.reparent_children(&[only_child], INVALID_PAGE_ID)?;
                self.set_root_page_id(Some(only_child))?;
            }
        }
        Ok(())
    }

    fn reparent_children(&self, child_ids: &[PageId], new_parent_id: PageId) -> Result<()> {
        for &child_id in child_ids {
            let content = self.fetch(child_id)?;
            {
                let mut bytes = content.write().unwrap();
                let page_type = peek_tree_page(&bytes).page_type;
                match page_type {
                    PageType::Internal => {
                        let mut child = InternalPage::<K>::from_bytes(&bytes)?;
                        child.set_parent_page_id(new_parent_id);
                        *bytes = child.to_bytes(self.page_size);
                    }
                    PageType::Leaf => {
                        let mut child = LeafPage::<K>::from_bytes(&bytes)?;
                        child.set_parent_page_id(new_parent_id);
                        *bytes = child.to_bytes(self.page_size);
                    }
                }
            }
            self.unpin(child_id, true);
        }
        Ok(())
    }

    fn ensure_header_page(&self) -> Result<()> {
        if self.bpm.lock().unwrap().is_page_allocated(HEADER_PAGE_ID) {
            return Ok(());
        }
        let (page_id, content) = self.new_page()?;
        assert_eq!(
            page_id, HEADER_PAGE_ID,
            "the header page must be the first page ever allocated in a fresh database"
        );
        *content.write().unwrap() = HeaderPage::new().to_bytes(self.page_size);
        self.unpin(page_id, true);
        Ok(())
    }

    fn root_page_id(&self) -> Result<Option<PageId>> {
        let content = self.fetch(HEADER_PAGE_ID)?;
        let header = HeaderPage::from_bytes(&content.read().unwrap())?;
        self.unpin(HEADER_PAGE_ID, false);
        Ok(header.root_page_id(&self.index_name))
    }

    fn set_root_page_id(&self, root_page_id: Option<PageId>) -> Result<()> {
        let content = self.fetch(HEADER_PAGE_ID)?;
        let mut header = HeaderPage::from_bytes(&content.read().unwrap())?;
        header.upsert_root_page_id(&self.index_name, root_page_id.unwrap_or(INVALID_PAGE_ID));
        *content.write().unwrap() = header.to_bytes(self.page_size);
        self.unpin(HEADER_PAGE_ID, true);
        Ok(())
    }

    fn fetch(&self, page_id: PageId) -> Result<FrameContent> {
        self.bpm
            .lock()
            .unwrap()
            .fetch_page(page_id)?
            .ok_or_else(|| Error::Internal(format!("out of buffer frames fetching page {page_id}")))
    }

    fn new_page(&self) -> Result<(PageId, FrameContent)> {
        self.bpm
            .lock()
            .unwrap()
            .new_page()?
            .ok_or_else(|| Error::Internal("out of buffer frames allocating a page".to_string()))
    }

    fn unpin(&self, page_id: PageId, dirty: bool) {
        self.bpm.lock().unwrap().unpin_page(page_id, dirty);
    }

    fn delete_page(&self, page_id: PageId) {
        self.bpm.lock().unwrap().delete_page(page_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DiskManager;

    fn test_tree(pool_size: usize) -> (BPlusTree<i64>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskManager::open(dir.path().join("test.db"), 256).unwrap();
        let bpm = BufferPoolManager::new_shared(pool_size, 2, 256, disk);
        (BPlusTree::open("t", bpm).unwrap(), dir)
    }

    fn rid(n: i64) -> RecordId {
        RecordId::new(n as PageId, 0)
    }

    #[test]
    fn empty_tree_has_no_values() {
        let (tree, _dir) = test_tree(16);
        assert!(tree.is_empty().unwrap());
        assert_eq!(tree.get_value(&1).unwrap(), None);
        assert!(!tree.remove(&1).unwrap());
    }

    #[test]
    fn singleton_insert_and_lookup() {
        let (tree, _dir) = test_tree(16);
        assert!(tree.insert(1, rid(1)).unwrap());
        assert!(!tree.is_empty().unwrap());
        assert_eq!(tree.get_value(&1).unwrap(), Some(rid(1)));
        assert_eq!(tree.get_value(&2).unwrap(), None);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let (tree, _dir) = test_tree(16);
        assert!(tree.insert(5, rid(5)).unwrap());
        assert!(!tree.insert(5, rid(99)).unwrap());
        assert_eq!(tree.get_value(&5).unwrap(), Some(rid(5)));
    }

    #[test]
    fn linear_ascending_insert_splits_and_iterates_in_order() {
        let (tree, _dir) = test_tree(32);
        for k in 1..=5 {
            assert!(tree.insert(k, rid(k)).unwrap());
        }
        let collected: Vec<i64> = tree
            .range_from(&1)
            .unwrap()
            .map(|item| item.unwrap().0)
            .collect();
        assert_eq!(collected, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn random_permutation_round_trips() {
        use rand::seq::SliceRandom;
        use rand_chacha::rand_core::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let (tree, _dir) = test_tree(64);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut keys: Vec<i64> = (1..30).collect();
        keys.shuffle(&mut rng);

        for &k in &keys {
            assert!(tree.insert(k, rid(k)).unwrap());
        }
        for &k in &keys {
            assert_eq!(tree.get_value(&k).unwrap(), Some(rid(k)));
        }

        let mut to_remove = keys.clone();
        to_remove.shuffle(&mut rng);
        for &k in &to_remove {
            assert!(tree.remove(&k).unwrap(), "removing {k} should succeed");
            assert_eq!(tree.get_value(&k).unwrap(), None);
        }
        assert!(tree.is_empty().unwrap());
    }

    #[test]
    fn remove_triggers_merge_and_redistribute() {
        let (tree, _dir) = test_tree(64);
        for k in 1..=20 {
            tree.insert(k, rid(k)).unwrap();
        }
        for k in 1..=15 {
            assert!(tree.remove(&k).unwrap());
        }
        let remaining: Vec<i64> = tree.iter().unwrap().map(|item| item.unwrap().0).collect();
        assert_eq!(remaining, (16..=20).collect::<Vec<_>>());
    }
}
