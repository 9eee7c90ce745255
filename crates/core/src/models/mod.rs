//! Shared domain models.

use serde::{Deserialize, Serialize};

/// Maximum number of Grenade-category items in a loadout.
pub const GRENADE_LIMIT: u32 = 2;
/// Maximum combined weapon weight in a loadout.
pub const WEAPON_WEIGHT_LIMIT: u32 = 3;
/// Maximum number of Armor-category items in a loadout.
pub const ARMOR_LIMIT: u32 = 1;

/// The fixed category set, in export priority order.
pub static ALL_CATEGORIES: [Category; 9] = [
    Category::Armor,
    Category::Grenade,
    Category::Utility,
    Category::Other,
    Category::Pistol,
    Category::Ranged,
    Category::HeavyRanged,
    Category::Melee,
    Category::HeavyMelee,
];

/// Item category. The closed set drives the selection limits; labels
/// outside it are preserved verbatim so a hand-edited catalog still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[allow(missing_docs)]
pub enum Category {
    Armor,
    Grenade,
    Utility,
    Other,
    Pistol,
    Ranged,
    HeavyRanged,
    Melee,
    HeavyMelee,
    /// Label outside the fixed set, kept as written in the source file.
    Custom(String),
}

impl Category {
    /// Parse a label. Unknown labels become [`Category::Custom`]; this never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Armor" => Self::Armor,
            "Grenade" => Self::Grenade,
            "Utility" => Self::Utility,
            "Other" => Self::Other,
            "Pistol" => Self::Pistol,
            "Ranged" => Self::Ranged,
            "Heavy Ranged" => Self::HeavyRanged,
            "Melee" => Self::Melee,
            "Heavy Melee" => Self::HeavyMelee,
            other => Self::Custom(other.to_string()),
        }
    }

    /// User-facing label, matching the catalog file spelling.
    pub fn label(&self) -> &str {
        match self {
            Self::Armor => "Armor",
            Self::Grenade => "Grenade",
            Self::Utility => "Utility",
            Self::Other => "Other",
            Self::Pistol => "Pistol",
            Self::Ranged => "Ranged",
            Self::HeavyRanged => "Heavy Ranged",
            Self::Melee => "Melee",
            Self::HeavyMelee => "Heavy Melee",
            Self::Custom(label) => label,
        }
    }

    /// Whether this category counts against the weapon weight budget.
    pub fn is_weapon(&self) -> bool {
        matches!(
            self,
            Self::Pistol | Self::Ranged | Self::Melee | Self::HeavyRanged | Self::HeavyMelee
        )
    }

    /// Weight contributed to the weapon budget: 2 for heavy weapons,
    /// 1 for other weapons, 0 for everything else.
    pub fn weapon_weight(&self) -> u32 {
        match self {
            Self::HeavyRanged | Self::HeavyMelee => 2,
            _ if self.is_weapon() => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

/// A selectable catalog entry.
///
/// Serde field names match the catalog header and the metadata JSON written
/// by earlier versions of the tool, so both round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// Item name; the catalog key.
    pub name: String,
    /// Category driving the selection limits.
    pub category: Category,
    /// Point cost.
    pub points: u32,
    /// Optional flavour/description text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    /// New item without a description.
    pub fn new(name: impl Into<String>, category: Category, points: u32) -> Self {
        Self {
            name: name.into(),
            category,
            points,
            description: None,
        }
    }

    /// Label used in the selection pane and the export report.
    pub fn display_label(&self) -> String {
        format!("{} ({} pts)", self.name, self.points)
    }
}
