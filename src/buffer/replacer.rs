use std::collections::{HashMap, VecDeque};

use crate::common::{FrameId, NO_CORRESPONDING_FRAME_ID_MSG};

/// Per-frame bookkeeping: the K most recent access timestamps (oldest
/// first) and whether the buffer pool manager currently allows this frame
/// to be evicted.
#[derive(Debug)]
struct LruKNode {
    history: VecDeque<usize>,
    k: usize,
    is_evictable: bool,
}

impl LruKNode {
    fn new(k: usize) -> Self {
        LruKNode {
            history: VecDeque::with_capacity(k),
            k,
            is_evictable: false,
        }
    }

    /// Distance from `now` to the k-th most recent access, or `usize::MAX`
    /// if fewer than `k` accesses have been recorded yet.
    fn backward_k_distance(&self, now: usize) -> usize {
        if self.history.len() < self.k {
            usize::MAX
        } else {
            now - self.history.front().copied().unwrap()
        }
    }

    fn most_recent_access(&self) -> usize {
        *self.history.back().expect("node with no recorded accesses")
    }

    fn record_access(&mut self, now: usize) {
        if self.history.len() == self.k {
            self.history.pop_front();
        }
        self.history.push_back(now);
    }
}

/// Chooses an evictable frame using the LRU-K policy: among evictable
/// frames, the one with the greatest backward K-distance (infinite if it
/// has fewer than K recorded accesses); ties broken by least recent single
/// access.
///
/// Timestamps are a monotonic counter internal to the replacer, not
/// wall-clock time.
#[derive(Debug)]
pub struct LruKReplacer {
    node_store: HashMap<FrameId, LruKNode>,
    current_timestamp: usize,
    evictable_count: usize,
    max_size: usize,
    k: usize,
}

impl LruKReplacer {
    pub fn new(num_frames: usize, k: usize) -> LruKReplacer {
        assert!(k > 0, "k must be positive");
        LruKReplacer {
            node_store: HashMap::new(),
            current_timestamp: 0,
            evictable_count: 0,
            max_size: num_frames,
            k,
        }
    }

    /// Records an access to `frame_id` at the current logical timestamp and
    /// advances the clock. Creates bookkeeping for frames seen for the
    /// first time.
    pub fn record_access(&mut self, frame_id: FrameId) {
        assert!(frame_id < self.max_size, "invalid frame id {frame_id}");
        self.node_store
            .entry(frame_id)
            .or_insert_with(|| LruKNode::new(self.k))
            .record_access(self.current_timestamp);
        self.current_timestamp += 1;
    }

    /// Marks `frame_id` evictable or not. The replacer's evictable count is
    /// exactly the number of frames currently marked evictable, not the
    /// number of tracked frames.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        let node = self
            .node_store
            .get_mut(&frame_id)
            .unwrap_or_else(|| panic!("{NO_CORRESPONDING_FRAME_ID_MSG}: {frame_id}"));
        if node.is_evictable != evictable {
            node.is_evictable = evictable;
            if evictable {
                self.evictable_count += 1;
            } else {
                self.evictable_count -= 1;
            }
        }
    }

    /// Drops bookkeeping for `frame_id`. The frame must currently be
    /// evictable; a no-op if the frame is not tracked at all.
    pub fn remove(&mut self, frame_id: FrameId) {
        if let Some(node) = self.node_store.get(&frame_id) {
            assert!(node.is_evictable, "cannot remove a non-evictable frame");
            self.node_store.remove(&frame_id);
            self.evictable_count -= 1;
        }
    }

    /// Picks the victim with the greatest backward K-distance among
    /// evictable frames (ties broken by least recent access) and removes
    /// its bookkeeping.
    pub fn evict(&mut self) -> Option<FrameId> {
        let now = self.current_timestamp;
        let victim = self
            .node_store
            .iter()
            .filter(|(_, node)| node.is_evictable)
            .max_by_key(|(_, node)| {
                // `usize::MAX - most_recent_access` makes "infinite distance,
                // least recent access" naturally the maximum of the tuple
                // ordering used by `max_by_key` for the tie-break.
                (node.backward_k_distance(now), usize::MAX - node.most_recent_access())
            })
            .map(|(frame_id, _)| *frame_id);

        if let Some(frame_id) = victim {
            self.node_store.remove(&frame_id);
            self.evictable_count -= 1;
        }
        victim
    }

    /// Number of frames currently evictable.
    pub fn size(&self) -> usize {
        self.evictable_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_greatest_backward_k_distance() {
        // Mirrors the spec's worked LRU-K example: K=2, pool size N=6.
        let n = 6;
        let mut replacer = LruKReplacer::new(n, 2);
        for frame in 0..n {
            replacer.record_access(frame);
        }
        for frame in 0..n - 1 {
            replacer.record_access(frame);
        }
        for frame in 0..n {
            replacer.set_evictable(frame, true);
        }
        assert_eq!(replacer.evict(), Some(n - 1));
    }

    #[test]
    fn non_evictable_frames_are_never_chosen() {
        let mut replacer = LruKReplacer::new(2, 1);
        replacer.record_access(0);
        replacer.record_access(1);
        replacer.set_evictable(0, false);
        replacer.set_evictable(1, true);
        assert_eq!(replacer.evict(), Some(1));
    }

    #[test]
    fn evict_returns_none_when_nothing_evictable() {
        let mut replacer = LruKReplacer::new(2, 1);
        replacer.record_access(0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    #[should_panic]
    fn remove_non_evictable_frame_panics() {
        let mut replacer = LruKReplacer::new(2, 1);
        replacer.record_access(0);
        replacer.remove(0);
    }

    #[test]
    fn size_tracks_evictable_count_not_node_count() {
        let mut replacer = LruKReplacer::new(3, 1);
        replacer.record_access(0);
        replacer.record_access(1);
        assert_eq!(replacer.size(), 0);
        replacer.set_evictable(0, true);
        assert_eq!(replacer.size(), 1);
        replacer.set_evictable(0, false);
        assert_eq!(replacer.size(), 0);
    }
}
