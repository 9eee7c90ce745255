//! Catalog column sorting.
//!
//! Sorting is a display concern over the catalog list; it never touches the
//! selection or the metadata file.

use std::cmp::Ordering;

use crate::models::Item;

/// Sortable catalog columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SortColumn {
    Name,
    Category,
    Points,
}

impl SortColumn {
    /// Column header label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Points => "Points",
        }
    }
}

/// Current sort column and direction.
///
/// Reselecting the active column toggles the direction; choosing a different
/// column resets to ascending.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortState {
    /// Active column, if any sort has been applied.
    pub column: Option<SortColumn>,
    /// Whether the active sort is descending.
    pub descending: bool,
}

impl SortState {
    /// Register a column selection, adjusting the direction.
    pub fn toggle(&mut self, column: SortColumn) {
        self.descending = match self.column {
            Some(current) if current == column => !self.descending,
            _ => false,
        };
        self.column = Some(column);
    }

    /// Sort `items` in place according to the current state. Stable, so
    /// equal keys keep their relative file order.
    pub fn apply(&self, items: &mut [Item]) {
        let Some(column) = self.column else {
            return;
        };
        items.sort_by(|a, b| {
            let ordering = match column {
                SortColumn::Name => cmp_text(&a.name, &b.name),
                SortColumn::Category => cmp_text(a.category.label(), b.category.label()),
                SortColumn::Points => a.points.cmp(&b.points),
            };
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

/// Case-insensitive text comparison used for non-numeric columns.
pub fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Parse a raw cell as an integer sort key. Non-numeric input yields `None`.
pub fn numeric_key(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Compare numeric sort keys with non-numeric values (`None`) treated as
/// +infinity, so they land at the end of an ascending sort.
pub fn cmp_numeric(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn items() -> Vec<Item> {
        vec![
            Item::new("Chainsword", Category::Melee, 6),
            Item::new("bolt pistol", Category::Pistol, 5),
            Item::new("Frag", Category::Grenade, 3),
            Item::new("Lascannon", Category::HeavyRanged, 20),
        ]
    }

    #[test]
    fn toggle_flips_direction_on_same_column() {
        let mut state = SortState::default();
        state.toggle(SortColumn::Points);
        assert!(!state.descending);
        state.toggle(SortColumn::Points);
        assert!(state.descending);
        // Switching columns resets to ascending.
        state.toggle(SortColumn::Name);
        assert!(!state.descending);
    }

    #[test]
    fn points_descending_reverses_ascending_for_distinct_values() {
        let mut ascending = items();
        let mut state = SortState::default();
        state.toggle(SortColumn::Points);
        state.apply(&mut ascending);
        let up: Vec<u32> = ascending.iter().map(|i| i.points).collect();
        assert_eq!(up, vec![3, 5, 6, 20]);

        let mut descending = items();
        state.toggle(SortColumn::Points);
        state.apply(&mut descending);
        let down: Vec<u32> = descending.iter().map(|i| i.points).collect();
        assert_eq!(down, vec![20, 6, 5, 3]);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut sorted = items();
        let mut state = SortState::default();
        state.toggle(SortColumn::Name);
        state.apply(&mut sorted);
        let names: Vec<&str> = sorted.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["bolt pistol", "Chainsword", "Frag", "Lascannon"]);
    }

    #[test]
    fn non_numeric_cells_sort_last_ascending() {
        let mut cells = vec!["12", "n/a", "3", "", "100"];
        cells.sort_by(|a, b| cmp_numeric(numeric_key(a), numeric_key(b)));
        assert_eq!(cells, vec!["3", "12", "100", "n/a", ""]);
    }
}
