//! Single-pass extraction of the UserStyle block and `:root` properties.
//!
//! Lines are pulled from the reader one at a time and reading stops at the
//! first closing brace of the root block; nothing past it is read.
use super::classify::{classify, LineKind, VarKind, PROPERTY_PREFIX};
use super::model::{Block, Variable};
use crate::error::StyleError;
use crate::util::{open_reader, strip_line};
use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Capture declaration comments and keep blank placeholders.
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    UserStyle,
    Root,
    Finished,
}

/// Multi-line select declaration being accumulated into one synthetic line.
struct SelectAccumulator {
    line_no: usize,
    text: String,
}

struct Extractor {
    options: ExtractOptions,
    block: Block,
    state: ScanState,
    userstyle_closed: bool,
    select: Option<SelectAccumulator>,
}

/// Extract the block from a source file on disk.
pub fn extract_file(path: &Path, options: ExtractOptions) -> Result<Block> {
    if !path.is_file() {
        return Err(StyleError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }
    tracing::info!(path = %path.display(), "extracting variables");
    let block = extract_block(open_reader(path)?, options)
        .with_context(|| format!("extract {}", path.display()))?;
    tracing::info!(
        meta = block.meta.len(),
        vars = block.vars().count(),
        "done extracting variables"
    );
    Ok(block)
}

pub fn extract_block<R: BufRead>(reader: R, options: ExtractOptions) -> Result<Block> {
    let mut extractor = Extractor {
        options,
        block: Block::default(),
        state: ScanState::Outside,
        userstyle_closed: false,
        select: None,
    };
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("read source line")?;
        extractor.scan_line(idx + 1, strip_line(&line))?;
        if extractor.state == ScanState::Finished {
            break;
        }
    }
    extractor.close_select()?;
    Ok(extractor.block)
}

impl Extractor {
    fn scan_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let kind = classify(line);
        match kind {
            LineKind::UserStyleOpen => {
                tracing::debug!(line_no, "found UserStyle block start");
                self.block = Block::default();
                self.block.set_header(line);
                self.select = None;
                self.state = ScanState::UserStyle;
                return Ok(());
            }
            LineKind::UserStyleClose => {
                tracing::debug!(line_no, "found UserStyle block end");
                self.close_select()?;
                self.block.set_footer(line);
                self.userstyle_closed = true;
                self.state = ScanState::Outside;
                return Ok(());
            }
            _ => {}
        }

        match self.state {
            ScanState::UserStyle => self.scan_userstyle_line(line_no, line, kind),
            ScanState::Outside => {
                if self.userstyle_closed && kind == LineKind::RootOpen {
                    tracing::debug!(line_no, "found root block start");
                    self.state = ScanState::Root;
                }
                Ok(())
            }
            ScanState::Root => {
                if line.contains('}') {
                    tracing::debug!(line_no, "found root block end");
                    self.state = ScanState::Finished;
                } else if let Some(var) = parse_root_var(line) {
                    self.block.add_var(var);
                }
                Ok(())
            }
            ScanState::Finished => Ok(()),
        }
    }

    /// An open select accumulator at this point never saw its closing brace.
    fn close_select(&mut self) -> Result<()> {
        match self.select.take() {
            Some(select) => {
                Err(StyleError::malformed(select.line_no, "unterminated select block").into())
            }
            None => Ok(()),
        }
    }

    fn scan_userstyle_line(&mut self, line_no: usize, line: &str, kind: LineKind) -> Result<()> {
        if self.select.is_some() {
            // Inside a select, option and close tests outrank the general
            // classification; option labels may contain `@`.
            if line.contains('*') {
                let option = select_option_token(line, line_no)?;
                if let Some(select) = self.select.as_mut() {
                    select.text.push(' ');
                    select.text.push_str(&option);
                }
            } else if line.contains('}') {
                if let Some(select) = self.select.take() {
                    let var = parse_quoted(&select.text, select.line_no, self.options.verbose)?;
                    self.block.add_var(var);
                }
            }
            return Ok(());
        }

        match kind {
            LineKind::VarDecl(VarKind::Range) | LineKind::VarDecl(VarKind::Number) => {
                let mut var = parse_quoted(line, line_no, self.options.verbose)?;
                var.value = extract_range_value(&var.value, line_no)?;
                self.block.add_var(var);
            }
            LineKind::VarDecl(VarKind::Select) => {
                self.select = Some(SelectAccumulator {
                    line_no,
                    text: line.replace('{', ""),
                });
            }
            LineKind::VarDecl(VarKind::Other(type_name)) => {
                tracing::trace!(line_no, %type_name, "plain variable");
                let var = parse_quoted(line, line_no, self.options.verbose)?;
                self.block.add_var(var);
            }
            LineKind::VarDecl(VarKind::Unrecognized) => {
                return Err(StyleError::malformed(line_no, "expected `@var <type> <name>`").into());
            }
            LineKind::MetaDecl => {
                let meta = parse_meta(line, line_no)?;
                self.block.add_meta(meta);
            }
            _ => {
                if self.options.verbose {
                    self.block.add_blank();
                }
            }
        }
        Ok(())
    }
}

/// Parse `@var <type> <name> '<comment>' <value>`.
///
/// The comment is only kept when `capture_comment` is set.
pub fn parse_quoted(line: &str, line_no: usize, capture_comment: bool) -> Result<Variable> {
    let Some((head, rest)) = line.split_once('\'') else {
        return Err(StyleError::malformed(line_no, "expected a single-quoted comment").into());
    };
    let Some((comment, value)) = rest.split_once('\'') else {
        return Err(StyleError::malformed(line_no, "unbalanced quote in declaration").into());
    };
    let mut tokens = head.split_whitespace();
    let (Some(_keyword), Some(type_name), Some(name)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(StyleError::malformed(line_no, "expected `@var <type> <name>` before quote").into());
    };
    let comment = comment.trim();
    Ok(Variable {
        type_name: Some(type_name.to_string()),
        name: name.to_string(),
        comment: (capture_comment && !comment.is_empty()).then(|| comment.to_string()),
        value: value.trim().to_string(),
    })
}

/// Parse `@name value` into a meta variable.
pub fn parse_meta(line: &str, line_no: usize) -> Result<Variable> {
    let trimmed = line.trim();
    let Some((name, value)) = trimmed.split_once(char::is_whitespace) else {
        return Err(StyleError::malformed(line_no, "meta declaration without a value").into());
    };
    Ok(Variable::new(name, value.trim()))
}

/// First element of a bracketed range payload plus its first quoted unit.
///
/// `[50, 0, 100, 1, '%']` yields `50%`.
pub fn extract_range_value(payload: &str, line_no: usize) -> Result<String> {
    let stripped = payload.replace(['[', ']'], "");
    let first = stripped.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(StyleError::malformed(line_no, "range payload has no default value").into());
    }
    let mut value = first.to_string();
    for quote in ['"', '\''] {
        if !stripped.contains(quote) {
            continue;
        }
        if stripped.matches(quote).count() % 2 != 0 {
            return Err(StyleError::malformed(line_no, "unbalanced quote in range payload").into());
        }
        value.push_str(stripped.split(quote).nth(1).unwrap_or_default());
        break;
    }
    Ok(value)
}

fn select_option_token(line: &str, line_no: usize) -> Result<String> {
    let compact: String = line
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .collect();
    compact
        .split(':')
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| StyleError::malformed(line_no, "select option without ':'").into())
}

/// Parse a `--name value` root line; self-referential placeholders are dropped.
pub fn parse_root_var(line: &str) -> Option<Variable> {
    let (name, value) = line.trim().split_once(char::is_whitespace)?;
    let name = name.strip_prefix(PROPERTY_PREFIX).unwrap_or(name);
    let name = name.strip_suffix(':').unwrap_or(name);
    let value = value.trim();
    let value = value.strip_suffix(';').unwrap_or(value).trim_end();
    if name.is_empty() || value.is_empty() || name == value {
        return None;
    }
    Some(Variable::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::model::BodyItem;

    const SOURCE: &str = "\
/* ==UserStyle==
@name           Dark Telegram
@namespace      github.com/Barina/dark-telegram
@version        2.3
@preprocessor   stylus

@var color accent 'Accent color' #5288c1
@var range opacity 'Panel opacity' [50, 0, 100, 1, '%']
@var number radius 'Corner radius' [6, 0, 20]
@var select theme 'Theme' {
    * Night: night,
    * Day: day,
    * Tinted: tinted,
}
==/UserStyle== */

:root {
    --accent accent
    --bg: #17212b;
}

@-moz-document domain(\"web.telegram.org\") {
    body { color: var(--accent); }
}
";

    fn body_line(block: &Block, name: &str) -> String {
        let var = block
            .vars()
            .find(|var| var.name == name)
            .unwrap_or_else(|| panic!("missing {name}"));
        var.render(false, 0).trim_end().to_string()
    }

    #[test]
    fn extracts_header_meta_and_footer() {
        let block = extract_block(SOURCE.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(block.header.as_deref(), Some("/* ==UserStyle=="));
        assert_eq!(block.footer.as_deref(), Some("==/UserStyle== */"));
        let names: Vec<&str> = block.meta.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["@name", "@namespace", "@version", "@preprocessor"]);
        assert_eq!(block.meta[0].value, "Dark Telegram");
    }

    #[test]
    fn extracts_each_variable_kind() {
        let block = extract_block(SOURCE.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(body_line(&block, "accent"), "accent = #5288c1");
        assert_eq!(body_line(&block, "opacity"), "opacity = 50%");
        assert_eq!(body_line(&block, "radius"), "radius = 6");
        assert_eq!(body_line(&block, "theme"), "theme = night day tinted");
    }

    #[test]
    fn harvests_root_properties_and_drops_placeholders() {
        let block = extract_block(SOURCE.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(body_line(&block, "bg"), "bg = #17212b");
        assert_eq!(block.vars().filter(|var| var.name == "accent").count(), 1);
    }

    #[test]
    fn quiet_mode_skips_comments_and_blanks() {
        let block = extract_block(SOURCE.as_bytes(), ExtractOptions::default()).expect("extract");
        assert!(block.vars().all(|var| var.comment.is_none()));
        assert!(!block.body.contains(&BodyItem::Blank));
    }

    #[test]
    fn verbose_mode_keeps_comments_and_blank_lines() {
        let block = extract_block(SOURCE.as_bytes(), ExtractOptions { verbose: true }).expect("extract");
        assert_eq!(
            body_line(&block, "accent"),
            "accent = #5288c1 // Accent color (color)"
        );
        assert_eq!(block.body[0], BodyItem::Blank);
    }

    #[test]
    fn new_header_resets_block() {
        let text = "/* ==UserStyle==\n@name First\n/* ==UserStyle==\n@name Second\n==/UserStyle== */\n";
        let block = extract_block(text.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(block.meta.len(), 1);
        assert_eq!(block.meta[0].value, "Second");
    }

    #[test]
    fn root_before_userstyle_is_ignored() {
        let text = ":root {\n--a red\n}\n/* ==UserStyle==\n@name X\n==/UserStyle== */\n";
        let block = extract_block(text.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(block.vars().count(), 0);
    }

    #[test]
    fn scan_stops_at_root_block_end() {
        let text = "/* ==UserStyle==\n==/UserStyle== */\n:root {\n--a red\n}\n:root {\n--b blue\n}\n";
        let block = extract_block(text.as_bytes(), ExtractOptions::default()).expect("extract");
        let names: Vec<&str> = block.vars().map(|var| var.name.as_str()).collect();
        assert_eq!(names, ["a"]);
    }

    #[test]
    fn range_value_takes_first_element_and_unit() {
        assert_eq!(extract_range_value("[50, 0, 100, 1, '%']", 1).unwrap(), "50%");
        assert_eq!(extract_range_value("[12, 8, 24, 1, \"px\"]", 1).unwrap(), "12px");
        assert_eq!(extract_range_value("[3, 0, 10]", 1).unwrap(), "3");
    }

    #[test]
    fn malformed_range_is_a_typed_error() {
        let err = extract_range_value("[]", 7).unwrap_err();
        let style = err.downcast_ref::<StyleError>().expect("typed error");
        assert!(matches!(style, StyleError::MalformedDeclaration { line: 7, .. }));
        assert!(extract_range_value("[5, 'px]", 1).is_err());
    }

    #[test]
    fn unquoted_declaration_is_rejected() {
        let text = "/* ==UserStyle==\n@var color accent #fff\n==/UserStyle== */\n";
        let err = extract_block(text.as_bytes(), ExtractOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StyleError>(),
            Some(StyleError::MalformedDeclaration { line: 2, .. })
        ));
    }

    #[test]
    fn select_option_without_colon_is_rejected() {
        let text = "/* ==UserStyle==\n@var select t 'T' {\n * nothing here\n}\n==/UserStyle== */\n";
        assert!(extract_block(text.as_bytes(), ExtractOptions::default()).is_err());
    }

    #[test]
    fn unterminated_select_is_rejected() {
        let text = "/* ==UserStyle==\n@var select theme 'Theme' {\n    * Night: night,\n    * Day: day,\n==/UserStyle== */\n";
        let err = extract_block(text.as_bytes(), ExtractOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StyleError>(),
            Some(StyleError::MalformedDeclaration { line: 2, .. })
        ));
    }

    #[test]
    fn select_open_at_end_of_input_is_rejected() {
        let text = "/* ==UserStyle==\n@var select theme 'Theme' {\n    * Night: night,\n";
        assert!(extract_block(text.as_bytes(), ExtractOptions::default()).is_err());
    }

    #[test]
    fn select_options_may_contain_at_signs() {
        let text = "/* ==UserStyle==\n@var select contact 'Contact' {\n    * Mail: user@host,\n    * Plain: plain,\n}\n==/UserStyle== */\n";
        let block = extract_block(text.as_bytes(), ExtractOptions::default()).expect("extract");
        assert_eq!(body_line(&block, "contact"), "contact = user@host plain");
        assert!(block.meta.is_empty());
    }

    #[test]
    fn untyped_var_is_rejected() {
        let text = "/* ==UserStyle==\n@name X\n@var\n==/UserStyle== */\n";
        let err = extract_block(text.as_bytes(), ExtractOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StyleError>(),
            Some(StyleError::MalformedDeclaration { line: 3, .. })
        ));
    }

    #[test]
    fn reading_stops_at_root_block_end() {
        // Invalid UTF-8 after the root block is never read.
        let mut bytes = b"/* ==UserStyle==\n==/UserStyle== */\n:root {\n--a red\n}\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let block = extract_block(bytes.as_slice(), ExtractOptions::default()).expect("extract");
        assert_eq!(block.vars().count(), 1);
    }

    #[test]
    fn missing_file_reports_missing_input() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = extract_file(&dir.path().join("nope.styl"), ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StyleError>(),
            Some(StyleError::MissingInput { .. })
        ));
    }
}
