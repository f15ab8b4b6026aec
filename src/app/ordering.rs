//! Ordering policy for the item list.
//!
//! Items with text come first, ranked by importance (important, normal,
//! unimportant). Items without text follow, whatever their importance. The
//! sort is stable, so items sharing a key keep their relative input order and
//! the policy never shuffles equal items around.

use crate::domain::ItemRecord;

/// Sort key: `(has no text, importance rank)`.
///
/// Empty items share a single key so their importance is ignored.
fn rank(item: &ItemRecord) -> (bool, u8) {
    if item.is_placeholder() {
        (true, 0)
    } else {
        (false, item.importance as u8)
    }
}

/// Sorts items in place according to the ordering policy.
///
/// # Examples
///
/// ```
/// use shoplist::app::ordering::sort_items;
/// use shoplist::domain::{Importance, ItemId, ItemRecord};
///
/// let mut items = vec![
///     ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
///     ItemRecord::new(ItemId(2), "soap", Importance::Important),
///     ItemRecord::placeholder(ItemId(3)),
/// ];
/// sort_items(&mut items);
/// let ids: Vec<i64> = items.iter().map(|i| i.id.get()).collect();
/// assert_eq!(ids, vec![2, 1, 3]);
/// ```
pub fn sort_items(items: &mut [ItemRecord]) {
    items.sort_by_key(rank);
}

/// Returns a new, ordered copy of `items`.
#[must_use]
pub fn order(items: &[ItemRecord]) -> Vec<ItemRecord> {
    let mut ordered = items.to_vec();
    sort_items(&mut ordered);
    ordered
}
