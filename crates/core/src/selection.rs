//! Loadout selection state and the category limit rules.

use thiserror::Error;

use crate::models::{Category, Item, ARMOR_LIMIT, GRENADE_LIMIT, WEAPON_WEIGHT_LIMIT};

/// Reason a candidate item was rejected by the limit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reject {
    /// The loadout already holds the maximum number of grenades.
    #[error("Maximum {GRENADE_LIMIT} grenade items allowed.")]
    GrenadeLimit,
    /// Adding the weapon would exceed the combined weight budget.
    #[error("Exceeded weapon weight limit (max {WEAPON_WEIGHT_LIMIT}).")]
    WeaponWeightLimit,
    /// The loadout already holds a suit of armor.
    #[error("You may only equip one suit of armor.")]
    ArmorLimit,
}

/// Error from positional operations on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The given index does not refer to a selected item.
    #[error("selection index {0} out of range")]
    IndexOutOfRange(usize),
}

/// Derived counters over the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Sum of point costs.
    pub points: u32,
    /// Number of Grenade-category items.
    pub grenades: u32,
    /// Combined weapon weight.
    pub weapon_weight: u32,
    /// Number of Armor-category items.
    pub armor: u32,
}

/// Ordered list of chosen items. Duplicates are permitted and insertion
/// order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<Item>,
}

impl Selection {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether `candidate` could be added without breaking a limit.
    ///
    /// Pure predicate: evaluates the rules against the current selection and
    /// never mutates it. Each rule is keyed off the candidate's category;
    /// categories outside the constrained set are always allowed.
    pub fn check(&self, candidate: &Item) -> Result<(), Reject> {
        let totals = self.totals();

        if candidate.category == Category::Grenade && totals.grenades >= GRENADE_LIMIT {
            return Err(Reject::GrenadeLimit);
        }

        if candidate.category.is_weapon()
            && totals.weapon_weight + candidate.category.weapon_weight() > WEAPON_WEIGHT_LIMIT
        {
            return Err(Reject::WeaponWeightLimit);
        }

        if candidate.category == Category::Armor && totals.armor >= ARMOR_LIMIT {
            return Err(Reject::ArmorLimit);
        }

        Ok(())
    }

    /// Add an item, appending on success. On rejection the selection is
    /// left unchanged and the reason is returned.
    pub fn add(&mut self, item: Item) -> Result<(), Reject> {
        self.check(&item)?;
        self.items.push(item);
        Ok(())
    }

    /// Remove the item at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Result<Item, SelectionError> {
        if index >= self.items.len() {
            return Err(SelectionError::IndexOutOfRange(index));
        }
        Ok(self.items.remove(index))
    }

    /// Recompute all counters by a linear scan. Never cached incrementally,
    /// so the counters cannot drift from the list.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for item in &self.items {
            totals.points += item.points;
            totals.weapon_weight += item.category.weapon_weight();
            match item.category {
                Category::Grenade => totals.grenades += 1,
                Category::Armor => totals.armor += 1,
                _ => {}
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn item(name: &str, category: Category, points: u32) -> Item {
        Item::new(name, category, points)
    }

    #[test]
    fn totals_match_recount_after_add_remove() {
        let mut selection = Selection::new();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        selection.add(item("Bolt Pistol", Category::Pistol, 5)).unwrap();
        selection.add(item("Medkit", Category::Utility, 2)).unwrap();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        selection.remove(1).unwrap();

        let totals = selection.totals();
        let points: u32 = selection.items().iter().map(|i| i.points).sum();
        let grenades = selection
            .items()
            .iter()
            .filter(|i| i.category == Category::Grenade)
            .count() as u32;
        assert_eq!(totals.points, points);
        assert_eq!(totals.grenades, grenades);
        assert_eq!(totals.weapon_weight, 0);
        assert_eq!(totals.armor, 0);
    }

    #[test]
    fn third_grenade_rejected_until_one_removed() {
        let mut selection = Selection::new();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        selection.add(item("Krak", Category::Grenade, 4)).unwrap();
        assert_eq!(
            selection.add(item("Smoke", Category::Grenade, 1)),
            Err(Reject::GrenadeLimit)
        );
        assert_eq!(selection.len(), 2);

        selection.remove(0).unwrap();
        selection.add(item("Smoke", Category::Grenade, 1)).unwrap();
        assert_eq!(selection.totals().grenades, 2);
    }

    #[test]
    fn weapon_weight_budget() {
        let mut selection = Selection::new();
        selection
            .add(item("Lascannon", Category::HeavyRanged, 20))
            .unwrap();
        // 2 + 1 = 3 sits exactly at the budget.
        selection.add(item("Bolt Pistol", Category::Pistol, 5)).unwrap();
        assert_eq!(selection.totals().weapon_weight, 3);

        assert_eq!(
            selection.add(item("Combat Knife", Category::Melee, 1)),
            Err(Reject::WeaponWeightLimit)
        );
    }

    #[test]
    fn two_heavy_weapons_reject_any_third_weapon() {
        let mut selection = Selection::new();
        selection
            .add(item("Lascannon", Category::HeavyRanged, 20))
            .unwrap();
        assert_eq!(
            selection.add(item("Thunder Hammer", Category::HeavyMelee, 18)),
            Err(Reject::WeaponWeightLimit)
        );
        // A one-weight weapon still fits after a single heavy weapon.
        selection.add(item("Chainsword", Category::Melee, 6)).unwrap();
        assert_eq!(selection.totals().weapon_weight, 3);
    }

    #[test]
    fn second_armor_rejected_regardless_of_order() {
        let mut selection = Selection::new();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        selection
            .add(item("Carapace", Category::Armor, 10))
            .unwrap();
        selection.add(item("Medkit", Category::Utility, 2)).unwrap();
        assert_eq!(
            selection.add(item("Flak", Category::Armor, 4)),
            Err(Reject::ArmorLimit)
        );
        assert_eq!(selection.totals().armor, 1);
    }

    #[test]
    fn unconstrained_categories_always_allowed() {
        let mut selection = Selection::new();
        for _ in 0..10 {
            selection.add(item("Medkit", Category::Utility, 2)).unwrap();
            selection
                .add(item("Relic", Category::Custom("Relic".into()), 7))
                .unwrap();
        }
        assert_eq!(selection.len(), 20);
    }

    #[test]
    fn duplicates_are_permitted() {
        let mut selection = Selection::new();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        selection.add(item("Frag", Category::Grenade, 3)).unwrap();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn remove_out_of_range() {
        let mut selection = Selection::new();
        assert_eq!(
            selection.remove(0),
            Err(SelectionError::IndexOutOfRange(0))
        );
    }

    #[test]
    fn rejection_reasons_are_human_readable() {
        assert_eq!(
            Reject::GrenadeLimit.to_string(),
            "Maximum 2 grenade items allowed."
        );
        assert_eq!(
            Reject::WeaponWeightLimit.to_string(),
            "Exceeded weapon weight limit (max 3)."
        );
        assert_eq!(
            Reject::ArmorLimit.to_string(),
            "You may only equip one suit of armor."
        );
    }
}
