// Menu node model. A node is built once from its raw option lines and then
// copied (by value) every time the navigator enters it.

/// Label of the synthesized back entry.
pub const BACK_LABEL: &str = "B";
/// Label of the synthesized quit entry.
pub const QUIT_LABEL: &str = "Q";
pub const BACK_TEXT: &str = "Back";
pub const QUIT_TEXT: &str = "Quit";

/// Option lines starting with this prefix bind the node to a data operation.
pub const OPERATION_PREFIX: &str = "sql#";
/// Marker flagging a restricted entry; stripped before display.
pub const RESTRICTED_MARKER: &str = "**R**";

/// Opaque key routed to the data-store dispatcher, e.g. `sql#4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationKey(String);

impl OperationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One selectable line of a menu screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub text: String,
}

/// One menu screen: a title and either an ordered option list or a bound
/// data operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    main: bool,
    restricted: bool,
    title: String,
    options: Vec<MenuOption>,
    operation: Option<OperationKey>,
}

impl MenuNode {
    /// Build a node from its raw option lines.
    ///
    /// Ordinal labels are the 1-based position of each line. The first
    /// line carrying [`OPERATION_PREFIX`] becomes the bound operation and
    /// ends processing; lines after it are ignored. Back (non-main only) and
    /// Quit entries are appended unless already listed.
    pub fn build<S: AsRef<str>>(main: bool, title: &str, raw_options: &[S]) -> Self {
        let mut node = MenuNode {
            main,
            restricted: false,
            title: title.to_string(),
            options: Vec::new(),
            operation: None,
        };
        let mut has_back = false;
        let mut has_quit = false;

        for (index, raw) in raw_options.iter().enumerate() {
            let raw = raw.as_ref();
            if is_operation_line(raw) {
                node.operation = Some(OperationKey(raw.to_string()));
                break;
            }

            let mut text = raw.to_string();
            if text.contains(RESTRICTED_MARKER) {
                node.restricted = true;
                text = text.replace(RESTRICTED_MARKER, "");
            }
            has_back |= text.eq_ignore_ascii_case(BACK_TEXT);
            has_quit |= text.eq_ignore_ascii_case(QUIT_TEXT);

            node.options.push(MenuOption {
                label: (index + 1).to_string(),
                text,
            });
        }

        if !has_back && !main {
            node.push_option(BACK_LABEL, BACK_TEXT);
        }
        if !has_quit {
            node.push_option(QUIT_LABEL, QUIT_TEXT);
        }
        node
    }

    /// The "coming soon" stand-in pushed for a selection with no menu.
    pub fn placeholder(selection: &str) -> Self {
        let empty: &[&str] = &[];
        Self::build(false, &format!("{selection} - COMING SOON!"), empty)
    }

    fn push_option(&mut self, label: &str, text: &str) {
        self.options.push(MenuOption {
            label: label.to_string(),
            text: text.to_string(),
        });
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Lift the restriction on this copy after a successful challenge.
    pub fn grant_access(&mut self) {
        self.restricted = false;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &[MenuOption] {
        &self.options
    }

    pub fn operation(&self) -> Option<&OperationKey> {
        self.operation.as_ref()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    /// Display text for `label`, matched case-insensitively.
    pub fn option_text(&self, label: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(label))
            .map(|o| o.text.as_str())
    }
}

fn is_operation_line(line: &str) -> bool {
    line.get(..OPERATION_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(OPERATION_PREFIX))
}
