//! In-memory model of the UserStyle metadata block.
//!
//! Rendering is line-oriented: every rendered item ends with a newline so a
//! block can be spliced into an output stream verbatim.
use serde::Serialize;

const INDENT: &str = "    ";

/// Meta fields whose name contains this token render as a blank line.
pub const RESERVED_META_TOKEN: &str = "preprocessor";

/// One theme-configurable value or one harvested custom property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: None,
            name: name.into(),
            comment: None,
            value: value.into(),
        }
    }

    /// Render as `name = value` (body) or `name value` (meta).
    ///
    /// A captured comment appends ` // comment`, followed by ` (type)` when the
    /// type is known. An empty value degrades to the bare name.
    pub fn render(&self, is_meta: bool, indent_level: usize) -> String {
        let mut line = self.name.clone();
        if self.value.is_empty() {
            tracing::warn!(name = %self.name, "empty value");
        } else {
            if !is_meta {
                line.push_str(" =");
            }
            line.push(' ');
            line.push_str(&self.value);
            if let Some(comment) = &self.comment {
                line.push_str(" // ");
                line.push_str(comment);
                if let Some(type_name) = &self.type_name {
                    line.push_str(&format!(" ({type_name})"));
                }
            }
        }

        let mut out = String::new();
        if !line.is_empty() {
            out.push_str(&INDENT.repeat(indent_level));
        }
        out.push_str(&line);
        out.push('\n');
        out
    }
}

/// Entry in a block body: a variable or a spacing placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyItem {
    Var(Variable),
    Blank,
}

/// The UserStyle metadata section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub header: Option<String>,
    pub meta: Vec<Variable>,
    pub body: Vec<BodyItem>,
    pub footer: Option<String>,
    pub indent_level: usize,
}

impl Block {
    pub fn set_header(&mut self, header: &str) {
        self.header = Some(header.trim().to_string());
    }

    pub fn set_footer(&mut self, footer: &str) {
        self.footer = Some(footer.trim().to_string());
    }

    pub fn add_meta(&mut self, meta: Variable) {
        tracing::debug!(line = %meta.render(true, 0).trim_end(), "added meta variable");
        self.meta.push(meta);
    }

    pub fn add_var(&mut self, var: Variable) {
        tracing::debug!(line = %var.render(false, 0).trim_end(), "added variable");
        self.body.push(BodyItem::Var(var));
    }

    pub fn add_blank(&mut self) {
        self.body.push(BodyItem::Blank);
    }

    /// Variables in the body, skipping placeholders.
    pub fn vars(&self) -> impl Iterator<Item = &Variable> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Var(var) => Some(var),
            BodyItem::Blank => None,
        })
    }

    pub fn render_meta(&self) -> String {
        let mut out = String::new();
        for meta in &self.meta {
            if meta.name.contains(RESERVED_META_TOKEN) {
                out.push('\n');
            } else {
                out.push_str(&meta.render(true, self.indent_level));
            }
        }
        out
    }

    pub fn render_body(&self) -> String {
        let mut out = String::new();
        for item in &self.body {
            match item {
                BodyItem::Var(var) => out.push_str(&var.render(false, self.indent_level + 1)),
                BodyItem::Blank => out.push('\n'),
            }
        }
        out
    }

    /// Header, meta section, footer, then body: the form spliced in at the
    /// marker line.
    pub fn render_splice(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(header);
            out.push('\n');
        }
        out.push_str(&self.render_meta());
        if let Some(footer) = &self.footer {
            out.push_str(footer);
            out.push('\n');
        }
        out.push_str(&self.render_body());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(type_name: &str, name: &str, comment: Option<&str>, value: &str) -> Variable {
        Variable {
            type_name: Some(type_name.to_string()),
            name: name.to_string(),
            comment: comment.map(str::to_string),
            value: value.to_string(),
        }
    }

    #[test]
    fn body_variable_renders_assignment() {
        let var = typed("color", "accent", None, "#5288c1");
        assert_eq!(var.render(false, 1), "    accent = #5288c1\n");
    }

    #[test]
    fn meta_variable_renders_without_operator() {
        let var = Variable::new("@name", "Dark Telegram");
        assert_eq!(var.render(true, 0), "@name Dark Telegram\n");
    }

    #[test]
    fn comment_and_type_are_appended_when_captured() {
        let var = typed("color", "accent", Some("Accent color"), "#5288c1");
        assert_eq!(
            var.render(false, 0),
            "accent = #5288c1 // Accent color (color)\n"
        );
    }

    #[test]
    fn empty_value_renders_name_only() {
        let var = Variable::new("accent", "");
        assert_eq!(var.render(false, 2), "        accent\n");
    }

    #[test]
    fn reserved_meta_renders_blank_line() {
        let mut block = Block::default();
        block.add_meta(Variable::new("@name", "Foo"));
        block.add_meta(Variable::new("@preprocessor", "stylus"));
        block.add_meta(Variable::new("@version", "1.0"));
        assert_eq!(block.render_meta(), "@name Foo\n\n@version 1.0\n");
    }

    #[test]
    fn body_indents_one_level_past_block() {
        let mut block = Block {
            indent_level: 1,
            ..Block::default()
        };
        block.add_var(Variable::new("bg", "#000"));
        block.add_blank();
        assert_eq!(block.render_body(), "        bg = #000\n\n");
    }

    #[test]
    fn splice_orders_header_meta_footer_body() {
        let mut block = Block::default();
        block.set_header("  /* ==UserStyle==\n");
        block.add_meta(Variable::new("@name", "Foo"));
        block.set_footer("==/UserStyle== */");
        block.add_var(Variable::new("bg", "#000"));
        assert_eq!(
            block.render_splice(),
            "/* ==UserStyle==\n@name Foo\n==/UserStyle== */\n    bg = #000\n"
        );
    }
}
