//! Dataset types for the navigation content.
//!
//! Field names follow the camelCase layout of the bundled JSON so the same
//! types load both the embedded dataset and an override file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::SeedError;

/// Bundled navigation dataset.
const BUILTIN_DATASET: &str = include_str!("../data/navigation.json");

/// Top-level entry of a menu group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Menu group identifier, shared by every row of the group.
    pub id: i32,
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub sub_items: Vec<SubItem>,
}

/// Child of a top-level menu item.
///
/// An entry with a non-empty `href` is a link even if it also lists children.
/// Otherwise an entry listing `subItems` is a group, and anything else is a
/// bare label that is not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged, from = "RawSubItem")]
pub enum SubItem {
    Link(MenuLink),
    Group(MenuGroup),
    Label(MenuLabel),
}

impl SubItem {
    pub fn label(&self) -> &str {
        match self {
            SubItem::Link(link) => &link.label,
            SubItem::Group(group) => &group.label,
            SubItem::Label(label) => &label.label,
        }
    }
}

/// Wire shape of a sub-item before it is classified.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubItem {
    label: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    sub_items: Option<Vec<MenuLink>>,
}

impl From<RawSubItem> for SubItem {
    fn from(raw: RawSubItem) -> Self {
        match (non_empty(raw.href), raw.sub_items) {
            (Some(href), _) => SubItem::Link(MenuLink {
                label: raw.label,
                href: Some(href),
            }),
            (None, Some(sub_items)) => SubItem::Group(MenuGroup {
                label: raw.label,
                sub_items,
            }),
            (None, None) => SubItem::Label(MenuLabel { label: raw.label }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuLink {
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Intermediate menu node without a link target of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    pub label: String,
    #[serde(default)]
    pub sub_items: Vec<MenuLink>,
}

/// Sub-item with neither a link nor children, e.g. a divider caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuLabel {
    pub label: String,
}

/// Treats an empty string like a missing value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// A group of pages listed under one header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGroup {
    pub id: i32,
    pub header: String,
    #[serde(default)]
    pub items: Vec<PageItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageItem {
    pub href: String,
    pub label: String,
    #[serde(default)]
    pub badge: Option<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub href: String,
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainPage {
    pub href: String,
    pub alt: String,
    pub src: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: i32,
    pub icon_class: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeLink {
    pub id: i32,
    pub href: String,
    pub img_alt: String,
    pub img_src: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherMenuItem {
    pub href: String,
    pub icon: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialIcon {
    pub href: String,
    pub icon_class: String,
}

/// Footer section; its title is repeated on every stored link row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub links: Vec<SectionLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLink {
    pub text: String,
    pub href: String,
}

/// The complete set of records written by one seeding run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub menu_items: Vec<MenuItem>,
    pub pages: Vec<PageGroup>,
    pub nav_items: Vec<NavItem>,
    pub main_pages: Vec<MainPage>,
    pub features: Vec<Feature>,
    pub home_links: Vec<HomeLink>,
    pub other_menu_items: Vec<OtherMenuItem>,
    pub social_icons: Vec<SocialIcon>,
    pub sections: Vec<Section>,
}

impl Dataset {
    /// Parses the dataset bundled with the crate.
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_json(BUILTIN_DATASET)
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a dataset from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the override file at `path` if given, the bundled dataset otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, SeedError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }
}
