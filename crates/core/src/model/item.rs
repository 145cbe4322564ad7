use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("region cannot be empty")]
    EmptyRegion,

    #[error("region cannot contain '-': {0}")]
    InvalidRegion(String),

    #[error("item name cannot be empty")]
    EmptyName,

    #[error("item id must look like region-NAME: {0}")]
    MalformedId(String),
}

//
// ─── REGION ────────────────────────────────────────────────────────────────────
//

/// A world region that groups flags, e.g. `Europe` or `North_America`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region(String);

impl Region {
    /// Regions shipped with the flag assets.
    pub const KNOWN: [&'static str; 6] = [
        "Africa",
        "Asia",
        "Europe",
        "North_America",
        "Oceania",
        "South_America",
    ];

    /// Region substituted when the user deselects every region.
    pub const DEFAULT: &'static str = "North_America";

    /// Creates a validated region identifier.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyRegion` for blank input and
    /// `ItemError::InvalidRegion` when the value contains the id separator.
    pub fn new(name: impl Into<String>) -> Result<Self, ItemError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ItemError::EmptyRegion);
        }
        if name.contains('-') {
            return Err(ItemError::InvalidRegion(name));
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn default_region() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// All regions in `KNOWN`, in order.
    #[must_use]
    pub fn all_known() -> Vec<Self> {
        Self::KNOWN.iter().map(|r| Self((*r).to_string())).collect()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region({})", self.0)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Region {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// One quizzable flag, identified as `region-NAME`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    region: Region,
    name: String,
}

impl Item {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyName` if the trimmed name is empty.
    pub fn new(region: Region, name: impl Into<String>) -> Result<Self, ItemError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ItemError::EmptyName);
        }
        Ok(Self { region, name })
    }

    /// Parse the canonical `region-NAME` form, splitting at the first `-`.
    ///
    /// Names may contain further dashes (`Africa-Guinea-Bissau`).
    ///
    /// # Errors
    ///
    /// Returns `ItemError::MalformedId` when there is no separator, or the
    /// region/name validation error for the respective half.
    pub fn parse_id(id: &str) -> Result<Self, ItemError> {
        let Some((region, name)) = id.split_once('-') else {
            return Err(ItemError::MalformedId(id.to_string()));
        };
        Self::new(Region::new(region)?, name)
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Name as stored in the id, e.g. `United_States`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `region-NAME` identifier.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}-{}", self.region, self.name)
    }

    /// Human readable name with underscores turned into spaces.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Turns a stored item name into the text shown on a choice.
#[must_use]
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({}-{})", self.region, self.name)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.region, self.name)
    }
}

impl FromStr for Item {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_id(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_id() {
        let item = Item::parse_id("Europe-France").unwrap();
        assert_eq!(item.region().as_str(), "Europe");
        assert_eq!(item.name(), "France");
        assert_eq!(item.id(), "Europe-France");
    }

    #[test]
    fn splits_on_first_dash_only() {
        let item: Item = "Africa-Guinea-Bissau".parse().unwrap();
        assert_eq!(item.region().as_str(), "Africa");
        assert_eq!(item.name(), "Guinea-Bissau");
    }

    #[test]
    fn display_name_replaces_underscores() {
        let item = Item::parse_id("North_America-United_States").unwrap();
        assert_eq!(item.display_name(), "United States");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(
            Item::parse_id("France").unwrap_err(),
            ItemError::MalformedId("France".into())
        );
        assert_eq!(Item::parse_id("-France").unwrap_err(), ItemError::EmptyRegion);
        assert_eq!(Item::parse_id("Europe-").unwrap_err(), ItemError::EmptyName);
    }

    #[test]
    fn region_rejects_separator() {
        assert!(matches!(
            Region::new("North-America"),
            Err(ItemError::InvalidRegion(_))
        ));
        assert_eq!(Region::default_region().as_str(), "North_America");
        assert_eq!(Region::all_known().len(), 6);
    }
}
