// Menu source parser: turns the blank-line delimited text description into
// raw `(title, option lines)` records. Indentation is ignored, blank lines
// separate blocks, and the first block is the main menu.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{MenuError, Result};

/// One block of the menu source before any option processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMenu {
    pub title: String,
    pub options: Vec<String>,
}

/// Open `path` and parse it. An unopenable file is `SourceUnavailable`.
pub fn read_menu_file(path: &Path) -> Result<Vec<RawMenu>> {
    let file = File::open(path).map_err(|source| MenuError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_menus(BufReader::new(file))
}

/// Parse every block in `reader`. Runs of blank lines never yield an empty
/// record, and a title followed directly by a blank line (or EOF) is a menu
/// with no options.
pub fn parse_menus<R: BufRead>(reader: R) -> Result<Vec<RawMenu>> {
    let mut menus = Vec::new();
    let mut current: Option<RawMenu> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            if let Some(menu) = current.take() {
                menus.push(menu);
            }
            continue;
        }

        match current.as_mut() {
            Some(menu) => menu.options.push(line.to_string()),
            None => {
                current = Some(RawMenu {
                    title: line.to_string(),
                    options: Vec::new(),
                })
            }
        }
    }
    if let Some(menu) = current {
        menus.push(menu);
    }
    Ok(menus)
}

/// Convenience wrapper over [`parse_menus`] for in-memory sources.
pub fn parse_str(source: &str) -> Result<Vec<RawMenu>> {
    parse_menus(source.as_bytes())
}
