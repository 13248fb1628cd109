// The menu catalog: every node built from the source, in source order, with
// the main menu first. Menus reference each other only by title, so cycles
// and forward references need no special handling.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{MenuError, Result};
use crate::menu::MenuNode;
use crate::parser::{self, RawMenu};

#[derive(Debug, Clone)]
pub struct MenuCatalog {
    menus: Vec<MenuNode>,
}

impl MenuCatalog {
    /// Read and build the catalog from a menu file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_raw(parser::read_menu_file(path)?)
    }

    /// Build the catalog from an in-memory source.
    pub fn from_source(source: &str) -> Result<Self> {
        Self::from_raw(parser::parse_str(source)?)
    }

    /// Build one node per raw record. Titles must be unique ignoring case.
    pub fn from_raw(raw: Vec<RawMenu>) -> Result<Self> {
        if raw.is_empty() {
            return Err(MenuError::EmptySource);
        }
        let mut seen = HashSet::new();
        let mut menus = Vec::with_capacity(raw.len());
        for (index, record) in raw.iter().enumerate() {
            if !seen.insert(record.title.to_lowercase()) {
                return Err(MenuError::DuplicateTitle(record.title.clone()));
            }
            menus.push(MenuNode::build(index == 0, &record.title, &record.options));
        }
        tracing::debug!(menus = menus.len(), "menu catalog built");
        Ok(MenuCatalog { menus })
    }

    pub fn main_menu(&self) -> &MenuNode {
        &self.menus[0]
    }

    /// Case-insensitive exact title match.
    pub fn lookup(&self, title: &str) -> Option<&MenuNode> {
        let wanted = title.to_lowercase();
        self.menus
            .iter()
            .find(|menu| menu.title().to_lowercase() == wanted)
    }

    // never empty: building fails on a source without menus
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuNode> {
        self.menus.iter()
    }
}
