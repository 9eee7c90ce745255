//! Catalog loading and the in-memory catalog store.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::{
    models::{Category, Item},
    sort::{SortColumn, SortState},
};

/// Columns every catalog file must declare in its header row.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Name", "Category", "Points", "Description"];

/// Errors raised while loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("catalog file not found: {0}")]
    NotFound(PathBuf),
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The catalog file is malformed.
    #[error("failed to parse catalog {path}: {message}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// What was wrong with the content.
        message: String,
    },
}

/// Read the catalog file into items, preserving file order, and append the
/// user's personal items after the base rows.
///
/// Personal items are selectable identically to built-in rows; duplicate
/// names across the two sources are deliberately left alone.
pub fn load_items(path: impl AsRef<Path>, personal: &[Item]) -> Result<Vec<Item>, CatalogError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut items = parse_catalog(&content).map_err(|message| CatalogError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    debug!(
        base = items.len(),
        personal = personal.len(),
        "Catalog loaded"
    );
    items.extend(personal.iter().cloned());
    Ok(items)
}

fn parse_catalog(content: &str) -> Result<Vec<Item>, String> {
    let mut records = split_records(content)?.into_iter();
    let header = records.next().ok_or_else(|| "empty catalog".to_string())?;

    let mut columns = [0usize; 4];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|cell| cell.trim() == name)
            .ok_or_else(|| format!("missing required column '{name}'"))?;
    }
    let [name_col, category_col, points_col, description_col] = columns;

    let mut items = Vec::new();
    for (row_index, record) in records.enumerate() {
        // Header is line one; data rows start at line two.
        let line = row_index + 2;
        let cell = |col: usize| -> Result<&str, String> {
            record
                .get(col)
                .map(String::as_str)
                .ok_or_else(|| format!("line {line}: too few columns"))
        };

        let name = cell(name_col)?.trim().to_string();
        if name.is_empty() {
            return Err(format!("line {line}: empty item name"));
        }
        let category = Category::from_label(cell(category_col)?);
        let points_raw = cell(points_col)?.trim();
        let points = points_raw
            .parse::<u32>()
            .map_err(|_| format!("line {line}: points '{points_raw}' is not a whole number"))?;
        let description = cell(description_col)?.trim();
        let description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };

        items.push(Item {
            name,
            category,
            points,
            description,
        });
    }

    Ok(items)
}

/// Split CSV text into records. Handles quoted fields, doubled-quote
/// escapes, and newlines inside quotes. Blank lines between records are
/// skipped.
fn split_records(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                other => field.push(other),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if record.len() > 1 || !record[0].trim().is_empty() {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        if record.len() > 1 || !record[0].trim().is_empty() {
            records.push(record);
        }
    }

    Ok(records)
}

/// Thread-safe catalog store holding the loaded items and the active sort.
pub struct Catalog {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    items: Vec<Item>,
    sort: SortState,
}

impl Catalog {
    /// Load the catalog from `path`, appending `personal` items at the end.
    pub fn load(path: impl AsRef<Path>, personal: &[Item]) -> Result<Self, CatalogError> {
        let items = load_items(path, personal)?;
        Ok(Self::from_items(items))
    }

    /// Build a catalog directly from items, bypassing the file system.
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                items,
                sort: SortState::default(),
            })),
        }
    }

    /// All items in the current display order.
    pub fn items(&self) -> Vec<Item> {
        self.inner.read().items.clone()
    }

    /// Number of items, base and personal combined.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    /// Filter items with a case-insensitive substring search over name,
    /// category, and description.
    pub fn items_matching(&self, query: &str) -> Vec<Item> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items();
        }

        self.inner
            .read()
            .items
            .iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.category.label().to_lowercase().contains(&needle)
                    || item
                        .description
                        .as_ref()
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Re-sort the catalog by `column`, toggling direction when the same
    /// column is chosen again. Returns the resulting sort state.
    pub fn sort_by(&self, column: SortColumn) -> SortState {
        let mut inner = self.inner.write();
        inner.sort.toggle(column);
        let sort = inner.sort;
        sort.apply(&mut inner.items);
        sort
    }

    /// Append a newly created personal item so it shows up for selection.
    pub fn append(&self, item: Item) {
        self.inner.write().items.push(item);
    }
}

impl Clone for Catalog {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
Name,Category,Points,Description
Bolt Pistol,Pistol,5,Reliable sidearm
Frag,Grenade,3,
\"Sword, Power\",Melee,12,\"Crackles with a \"\"field\"\"\"
";

    fn write_catalog(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_rows_in_file_order() {
        let (_dir, path) = write_catalog(SAMPLE);
        let items = load_items(&path, &[]).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "Bolt Pistol");
        assert_eq!(items[0].category, Category::Pistol);
        assert_eq!(items[0].points, 5);
        assert_eq!(items[1].description, None);
        assert_eq!(items[2].name, "Sword, Power");
        assert_eq!(
            items[2].description.as_deref(),
            Some("Crackles with a \"field\"")
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_items(dir.path().join("nope.csv"), &[]).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn missing_column_is_parse_error() {
        let (_dir, path) = write_catalog("Name,Points\nFrag,3\n");
        let err = load_items(&path, &[]).unwrap_err();
        match err {
            CatalogError::Parse { message, .. } => {
                assert!(message.contains("Category"), "unexpected: {message}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_points_is_parse_error() {
        let (_dir, path) =
            write_catalog("Name,Category,Points,Description\nFrag,Grenade,lots,\n");
        let err = load_items(&path, &[]).unwrap_err();
        match err {
            CatalogError::Parse { message, .. } => {
                assert!(message.contains("whole number"), "unexpected: {message}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn personal_items_append_after_base_rows() {
        let (_dir, path) = write_catalog(SAMPLE);
        let personal = vec![Item::new("Lucky Charm", Category::Utility, 1)];
        let items = load_items(&path, &personal).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[3].name, "Lucky Charm");

        // Duplicate names are kept as-is.
        let duplicate = vec![Item::new("Frag", Category::Grenade, 3)];
        let items = load_items(&path, &duplicate).unwrap();
        assert_eq!(
            items.iter().filter(|item| item.name == "Frag").count(),
            2
        );
    }

    #[test]
    fn store_filters_and_sorts() {
        let (_dir, path) = write_catalog(SAMPLE);
        let catalog = Catalog::load(&path, &[]).unwrap();

        let hits = catalog.items_matching("sword");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sword, Power");

        let state = catalog.sort_by(SortColumn::Points);
        assert!(!state.descending);
        let points: Vec<u32> = catalog.items().iter().map(|i| i.points).collect();
        assert_eq!(points, vec![3, 5, 12]);

        let state = catalog.sort_by(SortColumn::Points);
        assert!(state.descending);
        let points: Vec<u32> = catalog.items().iter().map(|i| i.points).collect();
        assert_eq!(points, vec![12, 5, 3]);
    }
}
