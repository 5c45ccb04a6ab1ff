//! The B+Tree index (component B): a disk-resident, crabbing-latched
//! ordered index over a buffer-pool-backed set of pages.

mod btree;
mod iterator;

pub use btree::BPlusTree;
pub use iterator::IndexIterator;
