//! Inventory operations for agents.
//!
//! Each agent holds items as an item-keyed quantity map. This module provides
//! functions for adding, removing, and querying items with full checked
//! arithmetic. A key whose quantity drops to zero is removed, so absence
//! always means zero.

use std::collections::BTreeMap;

use isle_types::ItemId;

use crate::error::AgentError;

/// Quantity of `item` held, zero when absent.
pub fn held(inventory: &BTreeMap<ItemId, u32>, item: &ItemId) -> u32 {
    inventory.get(item).copied().unwrap_or(0)
}

/// Check whether the inventory contains at least `amount` of the given item.
pub fn has_item(inventory: &BTreeMap<ItemId, u32>, item: &ItemId, amount: u32) -> bool {
    held(inventory, item) >= amount
}

/// Add `amount` units of `item` to the inventory, returning the new quantity.
///
/// Adding zero units is a no-op and does not create an entry.
pub fn add_item(
    inventory: &mut BTreeMap<ItemId, u32>,
    item: &ItemId,
    amount: u32,
) -> Result<u32, AgentError> {
    let current = held(inventory, item);
    let updated = current
        .checked_add(amount)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("quantity of {item} overflow in add_item"),
        })?;
    if updated > 0 {
        inventory.insert(item.clone(), updated);
    }
    Ok(updated)
}

/// Remove `amount` units of `item` from the inventory, returning the
/// remaining quantity.
///
/// Fails if the agent does not hold enough of the item.
/// Removes the key entirely if quantity reaches zero.
pub fn remove_item(
    inventory: &mut BTreeMap<ItemId, u32>,
    item: &ItemId,
    amount: u32,
) -> Result<u32, AgentError> {
    let current = held(inventory, item);

    let remaining = current
        .checked_sub(amount)
        .ok_or_else(|| AgentError::InsufficientInventory {
            item: item.clone(),
            requested: amount,
            available: current,
        })?;

    if remaining == 0 {
        inventory.remove(item);
    } else {
        inventory.insert(item.clone(), remaining);
    }

    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> ItemId {
        ItemId::from(name)
    }

    #[test]
    fn has_item_checks_quantity() {
        let mut inv = BTreeMap::new();
        inv.insert(item("Pear"), 3);
        assert!(has_item(&inv, &item("Pear"), 3));
        assert!(!has_item(&inv, &item("Pear"), 4));
        assert!(!has_item(&inv, &item("Cherry"), 1));
        assert!(has_item(&inv, &item("Cherry"), 0));
    }

    #[test]
    fn add_then_remove_to_zero_drops_key() {
        let mut inv = BTreeMap::new();
        assert_eq!(add_item(&mut inv, &item("turnip"), 10), Ok(10));
        assert_eq!(remove_item(&mut inv, &item("turnip"), 4), Ok(6));
        assert_eq!(remove_item(&mut inv, &item("turnip"), 6), Ok(0));
        assert!(!inv.contains_key(&item("turnip")));
    }

    #[test]
    fn add_zero_creates_no_entry() {
        let mut inv = BTreeMap::new();
        assert_eq!(add_item(&mut inv, &item("Pear"), 0), Ok(0));
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_more_than_held_fails_without_change() {
        let mut inv = BTreeMap::new();
        inv.insert(item("Koi"), 1);
        let err = remove_item(&mut inv, &item("Koi"), 2);
        assert_eq!(
            err,
            Err(AgentError::InsufficientInventory {
                item: item("Koi"),
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(held(&inv, &item("Koi")), 1);
    }

    #[test]
    fn add_overflow_is_an_error() {
        let mut inv = BTreeMap::new();
        inv.insert(item("Stone"), u32::MAX);
        assert!(matches!(
            add_item(&mut inv, &item("Stone"), 1),
            Err(AgentError::ArithmeticOverflow { .. })
        ));
        assert_eq!(held(&inv, &item("Stone")), u32::MAX);
    }
}
