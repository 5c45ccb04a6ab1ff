//! On-disk page layouts (component A): the header directory, B+Tree
//! internal and leaf pages, and the record id and key types they traffic
//! in. Every type here is pure data plus layout logic — none of them touch
//! the buffer pool directly, so `to_bytes`/`from_bytes` are the only seam
//! between a page and the frame content the buffer pool hands back.

mod b_plus_tree_page;
mod header_page;
mod internal_page;
mod key;
mod leaf_page;
mod record_id;

pub(crate) use b_plus_tree_page::{internal_min_size, leaf_min_size, peek_tree_page, PagePeek};
pub use b_plus_tree_page::{internal_max_size, leaf_max_size, PageType};
pub use header_page::HeaderPage;
pub use internal_page::InternalPage;
pub use key::IndexKey;
pub use leaf_page::LeafPage;
pub use record_id::{RecordId, INVALID_RID};
