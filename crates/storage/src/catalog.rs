//! Catalog providers: turn a region selection into the items a round can draw from.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use quiz_core::model::{Catalog, Item, Region};
use thiserror::Error;
use tracing::{debug, warn};

const FLAG_EXTENSION: &str = "png";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to list flags for region {region}: {source}")]
    Io {
        region: Region,
        #[source]
        source: io::Error,
    },
}

/// Supplies the items belonging to a set of regions.
///
/// Called on every round start; implementations must not cache a stale selection.
pub trait CatalogProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `CatalogError` when the backing assets cannot be enumerated.
    fn catalog_for(&self, regions: &BTreeSet<Region>) -> Result<Catalog, CatalogError>;
}

//
// ─── ASSET DIRECTORY ───────────────────────────────────────────────────────────
//

/// Flags laid out on disk as `<root>/<region>/<region>-<Name>.png`.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the image for `item`.
    #[must_use]
    pub fn flag_path(&self, item: &Item) -> PathBuf {
        self.root
            .join(item.region().as_str())
            .join(format!("{}.{FLAG_EXTENSION}", item.id()))
    }

    fn list_region(&self, region: &Region) -> Result<Vec<Item>, CatalogError> {
        let dir = self.root.join(region.as_str());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(region = %region, dir = %dir.display(), "no flag directory for region");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    region: region.clone(),
                    source,
                });
            }
        };

        let mut items = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    region: region.clone(),
                    source,
                })?
                .path();
            let is_flag = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(FLAG_EXTENSION));
            if !is_flag {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match Item::parse_id(stem) {
                Ok(item) if item.region() == region => items.push(item),
                Ok(item) => {
                    debug!(file = %path.display(), found = %item.region(), "flag filed under another region");
                }
                Err(err) => {
                    debug!(file = %path.display(), error = %err, "skipping unparsable flag name");
                }
            }
        }
        Ok(items)
    }
}

impl CatalogProvider for AssetCatalog {
    fn catalog_for(&self, regions: &BTreeSet<Region>) -> Result<Catalog, CatalogError> {
        let mut items = Vec::new();
        for region in regions {
            items.extend(self.list_region(region)?);
        }
        let catalog = Catalog::new(items);
        debug!(regions = regions.len(), items = catalog.len(), "built asset catalog");
        Ok(catalog)
    }
}

//
// ─── BUILT-IN ──────────────────────────────────────────────────────────────────
//

/// In-memory catalog, seeded with a built-in flag list or arbitrary items.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    items: Vec<Item>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Countries of every known region.
    #[must_use]
    pub fn builtin() -> Self {
        let items = BUILTIN
            .iter()
            .flat_map(|(region, names)| {
                names
                    .iter()
                    .map(move |name| Item::parse_id(&format!("{region}-{name}")))
            })
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        Self { items }
    }
}

impl CatalogProvider for StaticCatalog {
    fn catalog_for(&self, regions: &BTreeSet<Region>) -> Result<Catalog, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|item| regions.contains(item.region()))
            .cloned()
            .collect())
    }
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Africa",
        &[
            "Algeria", "Angola", "Botswana", "Cameroon", "Egypt", "Ethiopia", "Ghana",
            "Guinea-Bissau", "Kenya", "Morocco", "Nigeria", "Senegal", "South_Africa",
            "Tanzania", "Uganda",
        ],
    ),
    (
        "Asia",
        &[
            "Bangladesh", "China", "India", "Indonesia", "Japan", "Kazakhstan", "Malaysia",
            "Mongolia", "Nepal", "Pakistan", "Philippines", "South_Korea", "Thailand",
            "Vietnam",
        ],
    ),
    (
        "Europe",
        &[
            "Austria", "Belgium", "Denmark", "Finland", "France", "Germany", "Greece",
            "Ireland", "Italy", "Netherlands", "Norway", "Poland", "Portugal", "Spain",
            "Sweden", "United_Kingdom",
        ],
    ),
    (
        "North_America",
        &[
            "Bahamas", "Barbados", "Belize", "Canada", "Costa_Rica", "Cuba",
            "Dominican_Republic", "El_Salvador", "Guatemala", "Haiti", "Honduras", "Jamaica",
            "Mexico", "Nicaragua", "Panama", "United_States",
        ],
    ),
    (
        "Oceania",
        &[
            "Australia", "Fiji", "Kiribati", "Marshall_Islands", "Micronesia", "Nauru",
            "New_Zealand", "Palau", "Papua_New_Guinea", "Samoa", "Solomon_Islands", "Tonga",
        ],
    ),
    (
        "South_America",
        &[
            "Argentina", "Bolivia", "Brazil", "Chile", "Colombia", "Ecuador", "Guyana",
            "Paraguay", "Peru", "Suriname", "Uruguay", "Venezuela",
        ],
    ),
];
