use std::collections::HashMap;

use crate::model::PdfListItem;
use crate::types::{LibraryError, Result};

/// Settings key holding the user's display order (JSON array of ids)
pub const ORDER_KEY: &str = "pdfOrder";

/// Arrange `items` by a saved id order.
///
/// Items named in `order` come first, in that order; items it does not
/// mention follow in their existing order. Ids in `order` with no matching
/// item are ignored, and a repeated id keeps its first position.
pub fn apply_order(items: Vec<PdfListItem>, order: &[String]) -> Vec<PdfListItem> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (index, id) in order.iter().enumerate() {
        positions.entry(id.as_str()).or_insert(index);
    }

    let mut ordered: Vec<(usize, PdfListItem)> = Vec::new();
    let mut unordered = Vec::new();
    for item in items {
        match positions.get(item.id.as_str()) {
            Some(&position) => ordered.push((position, item)),
            None => unordered.push(item),
        }
    }

    ordered.sort_by_key(|(position, _)| *position);
    ordered
        .into_iter()
        .map(|(_, item)| item)
        .chain(unordered)
        .collect()
}

/// Move the item at `from` so it lands at index `to`.
pub fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    if from >= len {
        return Err(LibraryError::InvalidIndex { index: from, len });
    }
    if to >= len {
        return Err(LibraryError::InvalidIndex { index: to, len });
    }
    if from == to {
        return Ok(());
    }

    let moved = items.remove(from);
    items.insert(to, moved);
    Ok(())
}

pub fn order_ids(items: &[PdfListItem]) -> Vec<String> {
    items.iter().map(|item| item.id.clone()).collect()
}

/// Parse a stored order; a malformed value is treated as no order at all
pub fn parse_order(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str(raw) {
        Ok(order) => Some(order),
        Err(e) => {
            log::error!("Error loading PDF order: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str) -> PdfListItem {
        PdfListItem {
            id: id.to_string(),
            name: format!("{id}.pdf"),
            upload_date: Utc::now(),
            size: 1,
            cover_image: None,
        }
    }

    fn ids(items: &[PdfListItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_order_puts_new_items_last() {
        let items = vec![item("a"), item("b"), item("c"), item("d")];
        let result = apply_order(items, &order(&["c", "a"]));
        assert_eq!(ids(&result), ["c", "a", "b", "d"]);
    }

    #[test]
    fn test_apply_order_ignores_stale_ids() {
        let items = vec![item("a"), item("b")];
        let result = apply_order(items, &order(&["gone", "b", "also-gone", "a"]));
        assert_eq!(ids(&result), ["b", "a"]);
    }

    #[test]
    fn test_apply_order_duplicate_id_uses_first_position() {
        let items = vec![item("a"), item("b"), item("c")];
        let result = apply_order(items, &order(&["b", "c", "b", "a"]));
        assert_eq!(ids(&result), ["b", "c", "a"]);
    }

    #[test]
    fn test_apply_empty_order_keeps_items() {
        let items = vec![item("a"), item("b")];
        let result = apply_order(items, &[]);
        assert_eq!(ids(&result), ["a", "b"]);
    }

    #[test]
    fn test_reorder_forward_and_backward() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        reorder(&mut v, 0, 2).unwrap();
        assert_eq!(v, ['b', 'c', 'a', 'd']);

        reorder(&mut v, 3, 0).unwrap();
        assert_eq!(v, ['d', 'b', 'c', 'a']);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut v = vec![1, 2, 3];
        reorder(&mut v, 1, 1).unwrap();
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut v = vec![1, 2, 3];
        assert!(matches!(
            reorder(&mut v, 3, 0),
            Err(LibraryError::InvalidIndex { index: 3, len: 3 })
        ));
        assert!(matches!(
            reorder(&mut v, 0, 5),
            Err(LibraryError::InvalidIndex { index: 5, len: 3 })
        ));
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order(r#"["a","b"]"#), Some(order(&["a", "b"])));
        assert_eq!(parse_order("not json"), None);
    }
}
