//! Stateless line classification for the stylus dialect.
//!
//! Each line maps to exactly one `LineKind`; the extractor and reconstructor
//! keep their own scan state and decide what a kind means in context.

pub const USERSTYLE_OPEN_TOKEN: &str = "/*";
pub const USERSTYLE_CLOSE_TOKEN: &str = "*/";
pub const USERSTYLE_NAME: &str = "UserStyle";
pub const USERSTYLE_END_NAME: &str = "/UserStyle";
pub const VAR_MARKER: &str = "@var";
pub const ROOT_SELECTOR: &str = ":root";
pub const PROPERTY_PREFIX: &str = "--";
pub const PROPERTY_ACCESS_OPEN: &str = "var(--";

/// Declared kind of a `@var` line, taken from its second token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarKind {
    Range,
    Number,
    Select,
    Other(String),
    /// The line mentions `@var` but does not start with a declaration.
    Unrecognized,
}

impl VarKind {
    fn from_line(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            return VarKind::Unrecognized;
        };
        if !first.starts_with(VAR_MARKER) {
            return VarKind::Unrecognized;
        }
        match tokens.next() {
            Some("range") => VarKind::Range,
            Some("number") => VarKind::Number,
            Some("select") => VarKind::Select,
            Some(other) => VarKind::Other(other.to_string()),
            None => VarKind::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Opening comment line of the UserStyle block.
    UserStyleOpen,
    /// Closing comment line of the UserStyle block.
    UserStyleClose,
    /// `:root {` selector opener.
    RootOpen,
    /// A `@var <kind> ...` declaration.
    VarDecl(VarKind),
    /// A plain `@name value` declaration.
    MetaDecl,
    /// A select option line (`* label: value,`).
    SelectOption,
    /// Any line containing a closing brace.
    BlockClose,
    Blank,
    Plain,
}

/// Classify one line of source text. Precedence follows the order of the
/// variants in `LineKind`.
pub fn classify(line: &str) -> LineKind {
    if line.contains(USERSTYLE_OPEN_TOKEN) && line.contains(USERSTYLE_NAME) {
        LineKind::UserStyleOpen
    } else if line.contains(USERSTYLE_CLOSE_TOKEN) && line.contains(USERSTYLE_END_NAME) {
        LineKind::UserStyleClose
    } else if is_root_open(line) {
        LineKind::RootOpen
    } else if line.contains(VAR_MARKER) {
        LineKind::VarDecl(VarKind::from_line(line))
    } else if line.contains('@') {
        LineKind::MetaDecl
    } else if line.contains('*') {
        LineKind::SelectOption
    } else if line.contains('}') {
        LineKind::BlockClose
    } else if line.trim().is_empty() {
        LineKind::Blank
    } else {
        LineKind::Plain
    }
}

pub fn is_root_open(line: &str) -> bool {
    line.contains(ROOT_SELECTOR) && line.contains('{')
}

/// True when the first non-space character closes a block.
pub fn is_block_tail(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_userstyle_delimiters() {
        assert_eq!(classify("/* ==UserStyle=="), LineKind::UserStyleOpen);
        assert_eq!(classify("==/UserStyle== */"), LineKind::UserStyleClose);
    }

    #[test]
    fn var_kinds_come_from_second_token() {
        assert_eq!(
            classify("@var range opacity 'Opacity' [50, 0, 100]"),
            LineKind::VarDecl(VarKind::Range)
        );
        assert_eq!(
            classify("  @var number size 'Size' [12, 8, 24]"),
            LineKind::VarDecl(VarKind::Number)
        );
        assert_eq!(
            classify("@var select theme 'Theme' {"),
            LineKind::VarDecl(VarKind::Select)
        );
        assert_eq!(
            classify("@var color accent 'Accent' #fff"),
            LineKind::VarDecl(VarKind::Other("color".to_string()))
        );
    }

    #[test]
    fn var_marker_mid_line_is_unrecognized() {
        assert_eq!(
            classify("note: see @var below"),
            LineKind::VarDecl(VarKind::Unrecognized)
        );
    }

    #[test]
    fn meta_select_and_braces() {
        assert_eq!(classify("@name Dark Telegram"), LineKind::MetaDecl);
        assert_eq!(classify("  * Blue: blue,"), LineKind::SelectOption);
        assert_eq!(classify("  }"), LineKind::BlockClose);
        assert_eq!(classify(":root {"), LineKind::RootOpen);
    }

    #[test]
    fn blank_and_plain() {
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("  color: red;"), LineKind::Plain);
    }

    #[test]
    fn block_tail_requires_leading_brace() {
        assert!(is_block_tail("  }"));
        assert!(is_block_tail("} /* end */"));
        assert!(!is_block_tail("a { }"));
    }
}
