// Library root
// -----------
// The binary (`main.rs`) loads the menu catalog, connects to the data
// gateway and hands both to the navigator.
//
// Module responsibilities:
// - `parser`, `menu`, `catalog`: read the menu hierarchy file into an
//   immutable catalog of menu nodes keyed by title.
// - `render`: fixed-width, centered screen text.
// - `navigation`: the traversal stack and the back / quit / open loop.
// - `input`, `auth`, `api`: the collaborators the navigator calls (line
//   input, the restricted-menu gate, the data store).
// - `ui`: terminal implementations of those collaborators.
// - `config`, `error`: settings and the menu-source error type.
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod menu;
pub mod navigation;
pub mod parser;
pub mod render;
pub mod ui;
