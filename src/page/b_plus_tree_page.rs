use serde::{Deserialize, Serialize};

use crate::common::PageId;
use crate::page::key::IndexKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    Internal,
    Leaf,
}

/// Fields common to both internal and leaf B+Tree pages. `lsn` is carried
/// purely as an opaque field for layout fidelity with the design docs; this
/// crate has no WAL to assign it meaningfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BPlusTreePageHeader {
    pub page_type: PageType,
    pub lsn: u32,
    pub size: u32,
    pub max_size: u32,
    pub parent_page_id: PageId,
    pub page_id: PageId,
}

impl BPlusTreePageHeader {
    pub(crate) fn new(page_type: PageType, page_id: PageId, parent_page_id: PageId, max_size: usize) -> Self {
        BPlusTreePageHeader {
            page_type,
            lsn: 0,
            size: 0,
            max_size: max_size as u32,
            parent_page_id,
            page_id,
        }
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn max_size(&self) -> usize {
        self.max_size as usize
    }
}

/// Generous fixed overhead budgeted for each page's header plus the
/// length-prefix and vector-length fields `bincode` writes alongside the
/// slot arrays. Pages are sized conservatively from this rather than a
/// byte-exact packed layout (see `SPEC_FULL.md` section 6).
pub(crate) const PAGE_ENCODING_OVERHEAD: usize = 96;

/// Entry width of one `(key, child_page_id)` slot.
pub(crate) fn internal_entry_width<K: IndexKey>() -> usize {
    K::ENCODED_SIZE + std::mem::size_of::<PageId>()
}

/// Entry width of one `(key, record_id)` slot (`RecordId` is 8 bytes: a
/// 4-byte page id plus a 4-byte slot id).
pub(crate) fn leaf_entry_width<K: IndexKey>() -> usize {
    K::ENCODED_SIZE + 8
}

/// Internal-page `max_size` implied by a page of `page_size` bytes.
pub fn internal_max_size<K: IndexKey>(page_size: usize) -> usize {
    (page_size.saturating_sub(PAGE_ENCODING_OVERHEAD) / internal_entry_width::<K>()).max(3)
}

/// Leaf-page `max_size` implied by a page of `page_size` bytes.
pub fn leaf_max_size<K: IndexKey>(page_size: usize) -> usize {
    (page_size.saturating_sub(PAGE_ENCODING_OVERHEAD) / leaf_entry_width::<K>()).max(2)
}

/// `min_size` for a leaf page per the spec: `ceil(max_size / 2)`.
pub(crate) fn leaf_min_size(max_size: usize) -> usize {
    max_size.div_ceil(2)
}

/// `min_size` for an internal page per the spec: `ceil((max_size + 1) / 2)`.
pub(crate) fn internal_min_size(max_size: usize) -> usize {
    (max_size + 1).div_ceil(2)
}

/// Encodes `value` into a page-sized buffer as a 4-byte little-endian
/// length prefix followed by its `bincode` encoding. Keeping an explicit
/// length means decoding never depends on `bincode` ignoring (or not)
/// trailing zero padding.
pub(crate) fn encode_page<T: Serialize>(value: &T, page_size: usize) -> Vec<u8> {
    let encoded = bincode::serialize(value).expect("page content is always serializable");
    assert!(
        encoded.len() + 4 <= page_size,
        "page content ({} bytes) does not fit in a {page_size}-byte page",
        encoded.len()
    );
    let mut buf = vec![0u8; page_size];
    buf[0..4].copy_from_slice(&(encoded.len() as u32).to_le_bytes());
    buf[4..4 + encoded.len()].copy_from_slice(&encoded);
    buf
}

/// Inverse of [`encode_page`].
pub(crate) fn decode_page<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> crate::common::Result<T> {
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    Ok(bincode::deserialize(&bytes[4..4 + len])?)
}

/// Bytes reserved ahead of the `bincode` blob for a small, fixed-format
/// peek header (page type tag, current size, max size). The B+Tree uses
/// this to decide routing and crabbing safety without decoding a page's
/// full key/child vectors.
const PEEK_HEADER_LEN: usize = 1 + 4 + 4;

/// Like [`encode_page`], but for internal/leaf pages: also writes the
/// fixed-format peek header immediately after the length prefix.
pub(crate) fn encode_tree_page<T: Serialize>(header: &BPlusTreePageHeader, value: &T, page_size: usize) -> Vec<u8> {
    let encoded = bincode::serialize(value).expect("page content is always serializable");
    let body_offset = 4 + PEEK_HEADER_LEN;
    assert!(
        encoded.len() + body_offset <= page_size,
        "page content ({} bytes) does not fit in a {page_size}-byte page",
        encoded.len()
    );
    let mut buf = vec![0u8; page_size];
    buf[0..4].copy_from_slice(&(encoded.len() as u32).to_le_bytes());
    buf[4] = match header.page_type {
        PageType::Internal => 0,
        PageType::Leaf => 1,
    };
    buf[5..9].copy_from_slice(&header.size.to_le_bytes());
    buf[9..13].copy_from_slice(&header.max_size.to_le_bytes());
    buf[body_offset..body_offset + encoded.len()].copy_from_slice(&encoded);
    buf
}

/// Inverse of [`encode_tree_page`].
pub(crate) fn decode_tree_page<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> crate::common::Result<T> {
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let body_offset = 4 + PEEK_HEADER_LEN;
    Ok(bincode::deserialize(&bytes[body_offset..body_offset + len])?)
}

/// What [`peek_tree_page`] reports about a page without decoding it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PagePeek {
    pub page_type: PageType,
    pub size: usize,
    pub max_size: usize,
}

/// Reads a page's type and size counters straight out of the fixed-format
/// peek header, used during B+Tree crabbing to decide whether descending
/// into a child can ever require modifying the current page.
pub(crate) fn peek_tree_page(bytes: &[u8]) -> PagePeek {
    let page_type = if bytes[4] == 0 { PageType::Internal } else { PageType::Leaf };
    let size = u32::from_le_bytes(bytes[5..9].try_into().unwrap()) as usize;
    let max_size = u32::from_le_bytes(bytes[9..13].try_into().unwrap()) as usize;
    PagePeek { page_type, size, max_size }
}
