// Error types for loading the menu hierarchy. Everything past startup is
// absorbed by the navigation loop, so only the menu source has a typed
// taxonomy; the collaborators use `anyhow` like the rest of the binary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the menu source or building the catalog.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The menu file could not be opened.
    #[error("could not locate menu file \"{}\"", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source opened but a line could not be read.
    #[error("failed to read menu source")]
    Read(#[from] io::Error),
    /// The source contained no menu block, so there is no main menu.
    #[error("menu source defines no menus")]
    EmptySource,
    /// Two menus share a title (compared case-insensitively).
    #[error("duplicate menu title \"{0}\"")]
    DuplicateTitle(String),
}

/// A typed result for the menu-source layer.
pub type Result<T> = std::result::Result<T, MenuError>;
