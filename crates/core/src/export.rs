//! Loadout report rendering.

use crate::{
    models::{Category, ALL_CATEGORIES, GRENADE_LIMIT, WEAPON_WEIGHT_LIMIT},
    selection::Selection,
};

const CLOSING_LINE: &str = "Praise the Emperor!";

/// Render the plain-text loadout report.
///
/// Items are grouped by category and the groups are emitted in the fixed
/// priority order (Armor first, Heavy Melee last); categories outside the
/// fixed set follow in the order they were first encountered. Output is
/// deterministic for a given selection and username.
pub fn render_report(selection: &Selection, username: &str) -> String {
    let items = selection.items();
    let totals = selection.totals();

    // First-encounter order for every category present in the selection.
    let mut encountered: Vec<&Category> = Vec::new();
    for item in items {
        if !encountered.contains(&&item.category) {
            encountered.push(&item.category);
        }
    }

    let mut ordered: Vec<&Category> = Vec::new();
    for category in &ALL_CATEGORIES {
        if encountered.contains(&category) {
            ordered.push(category);
        }
    }
    for category in &encountered {
        if !ALL_CATEGORIES.contains(*category) {
            ordered.push(*category);
        }
    }

    let mut lines = vec![format!("Requisition Loadout for {username}:\n")];
    for category in ordered {
        lines.push(format!("\n== {} ==", category.label().to_uppercase()));
        for item in items.iter().filter(|item| &item.category == category) {
            lines.push(format!("- {}", item.display_label()));
        }
    }

    lines.push(format!("\nTotal: {} pts", totals.points));
    lines.push(format!(
        "Grenades Used: {} / {GRENADE_LIMIT}",
        totals.grenades
    ));
    lines.push(format!(
        "Weapon Weight Used: {} / {WEAPON_WEIGHT_LIMIT}",
        totals.weapon_weight
    ));
    lines.push(CLOSING_LINE.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    #[test]
    fn grenade_group_precedes_pistol_group() {
        let mut selection = Selection::new();
        selection
            .add(Item::new("Bolt Pistol", Category::Pistol, 5))
            .unwrap();
        selection.add(Item::new("Frag", Category::Grenade, 3)).unwrap();

        let report = render_report(&selection, "Aldric");
        let grenade_at = report.find("== GRENADE ==").unwrap();
        let pistol_at = report.find("== PISTOL ==").unwrap();
        assert!(grenade_at < pistol_at);

        assert!(report.starts_with("Requisition Loadout for Aldric:\n"));
        assert!(report.contains("- Bolt Pistol (5 pts)"));
        assert!(report.contains("- Frag (3 pts)"));
        assert!(report.contains("\nTotal: 8 pts"));
        assert!(report.contains("Grenades Used: 1 / 2"));
        assert!(report.contains("Weapon Weight Used: 1 / 3"));
        assert!(report.ends_with("Praise the Emperor!"));
    }

    #[test]
    fn exact_report_shape() {
        let mut selection = Selection::new();
        selection.add(Item::new("Frag", Category::Grenade, 3)).unwrap();

        let report = render_report(&selection, "Aldric");
        // The header line carries its own trailing newline, so a blank line
        // separates it from the first group.
        let expected = "Requisition Loadout for Aldric:\n\n\n\
== GRENADE ==\n\
- Frag (3 pts)\n\
\nTotal: 3 pts\n\
Grenades Used: 1 / 2\n\
Weapon Weight Used: 0 / 3\n\
Praise the Emperor!";
        assert_eq!(report, expected);
    }

    #[test]
    fn unknown_categories_follow_in_encounter_order() {
        let mut selection = Selection::new();
        selection
            .add(Item::new("Banner", Category::Custom("Relic".into()), 9))
            .unwrap();
        selection
            .add(Item::new("Incense", Category::Custom("Votive".into()), 2))
            .unwrap();
        selection
            .add(Item::new("Carapace", Category::Armor, 10))
            .unwrap();

        let report = render_report(&selection, "Aldric");
        let armor_at = report.find("== ARMOR ==").unwrap();
        let relic_at = report.find("== RELIC ==").unwrap();
        let votive_at = report.find("== VOTIVE ==").unwrap();
        assert!(armor_at < relic_at);
        assert!(relic_at < votive_at);
    }

    #[test]
    fn duplicate_items_each_get_a_line() {
        let mut selection = Selection::new();
        selection.add(Item::new("Frag", Category::Grenade, 3)).unwrap();
        selection.add(Item::new("Frag", Category::Grenade, 3)).unwrap();

        let report = render_report(&selection, "Aldric");
        assert_eq!(report.matches("- Frag (3 pts)").count(), 2);
        assert!(report.contains("Grenades Used: 2 / 2"));
    }

    #[test]
    fn deterministic_output() {
        let mut selection = Selection::new();
        selection
            .add(Item::new("Chainsword", Category::Melee, 6))
            .unwrap();
        assert_eq!(
            render_report(&selection, "Aldric"),
            render_report(&selection, "Aldric")
        );
    }
}
