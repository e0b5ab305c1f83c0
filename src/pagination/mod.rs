//! Offset pagination over fully materialized listings.
//!
//! Pages are computed from the whole listing on every call, so the listing
//! must come back in a stable order for cursors to stay meaningful.

pub mod cursor;

use std::num::NonZeroUsize;

use serde::Serialize;

pub use cursor::InvalidCursor;

/// Items per page when none is configured.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
  Some(size) => size,
  None => panic!("page size must be non-zero"),
};

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
  pub data: Vec<T>,
  /// Present iff items remain past this page.
  #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
  pub next_cursor: Option<String>,
}

impl<T> Page<T> {
  fn terminal(data: Vec<T>) -> Self {
    Self {
      data,
      next_cursor: None,
    }
  }
}

/// Slice `items` starting at the position encoded in `cursor`.
pub fn paginate<T: Clone>(
  items: &[T],
  cursor: Option<&str>,
  page_size: NonZeroUsize,
) -> Result<Page<T>, InvalidCursor> {
  let offset = cursor::decode(cursor)?;
  Ok(paginate_from(items, offset, page_size))
}

/// Slice `items` starting at an already decoded offset.
fn paginate_from<T: Clone>(items: &[T], offset: usize, page_size: NonZeroUsize) -> Page<T> {
  if offset >= items.len() {
    return Page::terminal(Vec::new());
  }

  let end = offset.saturating_add(page_size.get()).min(items.len());
  let data = items[offset..end].to_vec();

  if end < items.len() {
    Page {
      data,
      next_cursor: Some(cursor::encode(end)),
    }
  } else {
    Page::terminal(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
  }

  /// Follow cursors from the start until the listing is exhausted.
  fn walk<T: Clone>(items: &[T], page_size: usize) -> Vec<Page<T>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
      let page = paginate(items, cursor.as_deref(), size(page_size)).unwrap();
      cursor = page.next_cursor.clone();
      pages.push(page);
      if cursor.is_none() {
        return pages;
      }
    }
  }

  #[test]
  fn test_five_items_in_pages_of_two() {
    let items = ["A", "B", "C", "D", "E"];

    let first = paginate(&items, None, size(2)).unwrap();
    assert_eq!(first.data, vec!["A", "B"]);
    assert_eq!(first.next_cursor, Some(cursor::encode(2)));

    let second = paginate(&items, first.next_cursor.as_deref(), size(2)).unwrap();
    assert_eq!(second.data, vec!["C", "D"]);
    assert_eq!(second.next_cursor, Some(cursor::encode(4)));

    let third = paginate(&items, second.next_cursor.as_deref(), size(2)).unwrap();
    assert_eq!(third.data, vec!["E"]);
    assert_eq!(third.next_cursor, None);
  }

  #[test]
  fn test_pages_partition_listing() {
    let items: Vec<u32> = (0..257).collect();
    for page_size in [1, 2, 3, 10, 100, 256, 257, 1_000] {
      let pages = walk(&items, page_size);
      let joined: Vec<u32> = pages.into_iter().flat_map(|p| p.data).collect();
      assert_eq!(joined, items, "page size {}", page_size);
    }
  }

  #[test]
  fn test_exact_multiple_has_no_trailing_empty_page() {
    let items: Vec<u32> = (0..4).collect();
    let pages = walk(&items, 2);
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| !p.data.is_empty()));
  }

  #[test]
  fn test_past_the_end_is_empty_terminal_page() {
    let items = [1, 2, 3];
    let page = paginate(&items, Some(&cursor::encode(3)), size(2)).unwrap();
    assert_eq!(page, Page::terminal(Vec::new()));

    let page = paginate(&items, Some(&cursor::encode(50)), size(2)).unwrap();
    assert_eq!(page, Page::terminal(Vec::new()));
  }

  #[test]
  fn test_empty_listing() {
    let items: [u8; 0] = [];
    let page = paginate(&items, None, DEFAULT_PAGE_SIZE).unwrap();
    assert!(page.data.is_empty());
    assert!(page.next_cursor.is_none());
  }

  #[test]
  fn test_same_input_same_page() {
    let items: Vec<u32> = (0..10).collect();
    let cursor = cursor::encode(3);
    let a = paginate(&items, Some(&cursor), size(4)).unwrap();
    let b = paginate(&items, Some(&cursor), size(4)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn test_invalid_cursor_propagates() {
    let items = [1, 2, 3];
    assert!(paginate(&items, Some("%%%"), size(2)).is_err());
  }

  #[test]
  fn test_serialized_shape() {
    let page = paginate(&["A", "B", "C"], None, size(2)).unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["data"], serde_json::json!(["A", "B"]));
    assert_eq!(json["nextCursor"], serde_json::json!(cursor::encode(2)));

    let last = paginate(&["A"], None, size(2)).unwrap();
    let json = serde_json::to_value(&last).unwrap();
    assert!(json.get("nextCursor").is_none());
  }
}
