//! reStructuredText to HTML.
//!
//! Covers the structural core of the format, enough for prose pages:
//!
//! - Section titles: underline only, or overline + underline. Heading levels
//!   follow the order in which adornment styles first appear.
//! - Paragraphs, block quotes, transitions (`----` on its own).
//! - Bullet lists (`-`, `*`, `+`) and enumerated lists (`1.`, `#.`, `1)`).
//! - Literal blocks introduced by `::`, and the `code`/`code-block` directive.
//! - `image` and admonition directives (`note`, `warning`, ...).
//! - Inline `*emphasis*`, `**strong**`, ``` ``literal`` ```, `` `text <url>`_ ``
//!   hyperlinks and `` `interpreted` `` text.
//!
//! Comments, hyperlink targets and unknown directives are dropped. The output
//! is the document body only, wrapped in `<div class="document">`.

use super::{DecodeError, Decoder};
use std::collections::HashSet;

const DIALECT: &str = "reStructuredText";

const ADMONITIONS: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

/// reStructuredText body to HTML fragment.
///
/// Fails only on a section title whose adornment style skips a level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Restructured;

impl Decoder for Restructured {
    fn decode(&self, body: &str) -> Result<String, DecodeError> {
        let lines: Vec<String> = body.lines().map(expand_tabs).collect();
        let mut writer = Writer::default();
        writer.blocks(&lines, 0, true)?;
        writer.close_sections(0);
        Ok(format!("<div class=\"document\">\n{}</div>\n", writer.out))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Adornment {
    ch: char,
    overline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet(char),
    Enumerated,
}

#[derive(Default)]
struct Writer {
    out: String,
    /// Title styles in order of first appearance; index + 1 is the level.
    styles: Vec<Adornment>,
    /// Number of currently open sections.
    depth: usize,
    ids: HashSet<String>,
}

impl Writer {
    /// Render a run of body elements. `first_line` is the 0-based line number
    /// of `lines[0]` in the document, for error messages. Section titles are
    /// only recognized at the top level.
    fn blocks(
        &mut self,
        lines: &[String],
        first_line: usize,
        top: bool,
    ) -> Result<(), DecodeError> {
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if is_blank(line) {
                i += 1;
                continue;
            }

            if indent_of(line) > 0 {
                let end = indented_end(lines, i);
                self.out.push_str("<blockquote>\n");
                self.blocks(&dedent(&lines[i..end]), first_line + i, false)?;
                self.out.push_str("</blockquote>\n");
                i = end;
                continue;
            }

            if top {
                if let Some((title, style, consumed)) = title_at(lines, i) {
                    self.section(title, style, first_line + i + 1)?;
                    i += consumed;
                    continue;
                }
            }

            if is_transition(line) && lines.get(i + 1).is_none_or(|next| is_blank(next)) {
                self.out.push_str("<hr class=\"docutils\" />\n");
                i += 1;
                continue;
            }

            if line == ".." || line.starts_with(".. ") {
                i = self.explicit(lines, i, first_line)?;
                continue;
            }

            if let Some(kind) = list_kind(line) {
                i = self.list(lines, i, kind, first_line)?;
                continue;
            }

            i = self.paragraph(lines, i);
        }
        Ok(())
    }

    fn section(&mut self, title: &str, style: Adornment, line: usize) -> Result<(), DecodeError> {
        let known = self.styles.iter().position(|s| *s == style);
        let level = known.map_or(self.styles.len() + 1, |p| p + 1);
        if level > self.depth + 1 {
            return Err(DecodeError::Malformed {
                dialect: DIALECT,
                line,
                message: format!("title level inconsistent: \"{title}\""),
            });
        }
        if known.is_none() {
            self.styles.push(style);
        }

        self.close_sections(level - 1);
        let id = self.unique_id(title);
        let tag = level.min(6);
        self.out.push_str(&format!(
            "<div class=\"section\" id=\"{id}\">\n<h{tag}>{}</h{tag}>\n",
            inline(title)
        ));
        self.depth = level;
        Ok(())
    }

    fn close_sections(&mut self, level: usize) {
        while self.depth > level {
            self.out.push_str("</div>\n");
            self.depth -= 1;
        }
    }

    fn unique_id(&mut self, title: &str) -> String {
        let base = slug(title);
        let mut id = base.clone();
        let mut n = 1;
        while !self.ids.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }
        id
    }

    /// A paragraph, plus the literal block it introduces if it ends in `::`.
    fn paragraph(&mut self, lines: &[String], start: usize) -> usize {
        let mut end = start;
        while end < lines.len() && !is_blank(&lines[end]) {
            end += 1;
        }
        let text = lines[start..end].join("\n");

        let Some(text) = strip_literal_marker(&text) else {
            self.out.push_str(&format!("<p>{}</p>\n", inline(&text)));
            return end;
        };
        if !text.is_empty() {
            self.out.push_str(&format!("<p>{}</p>\n", inline(text)));
        }

        let mut next = end;
        while next < lines.len() && is_blank(&lines[next]) {
            next += 1;
        }
        if next < lines.len() && indent_of(&lines[next]) > 0 {
            let block_end = indented_end(lines, next);
            let literal = dedent(&lines[next..block_end]).join("\n");
            self.out.push_str(&format!(
                "<pre class=\"literal-block\">{}</pre>\n",
                escape(&literal)
            ));
            return block_end;
        }
        end
    }

    fn list(
        &mut self,
        lines: &[String],
        start: usize,
        kind: ListKind,
        first_line: usize,
    ) -> Result<usize, DecodeError> {
        let mut items: Vec<(usize, Vec<String>)> = Vec::new();
        let mut start_number = None;
        let mut i = start;

        while i < lines.len() && list_kind(&lines[i]) == Some(kind) {
            let (width, number) = marker(&lines[i]).unwrap_or((0, None));
            if start_number.is_none() {
                start_number = Some(number.unwrap_or(1));
            }
            let item_start = i;
            let mut item = vec![lines[i][width..].trim_start().to_string()];
            i += 1;
            let end = indented_end(lines, i);
            item.extend(dedent(&lines[i..end]));
            if end > i && item.len() > 1 && has_blank_before_body(&lines[i..end]) {
                item.insert(1, String::new());
            }
            i = end;
            while item.last().is_some_and(|l| l.is_empty()) {
                item.pop();
            }
            items.push((item_start, item));
        }

        let simple = items.iter().all(|(_, item)| !item.iter().any(|l| l.is_empty()));
        let open = match kind {
            ListKind::Bullet(_) => "<ul".to_string(),
            ListKind::Enumerated => match start_number {
                Some(n) if n != 1 => format!("<ol class=\"arabic\" start=\"{n}\""),
                _ => "<ol class=\"arabic\"".to_string(),
            },
        };
        let close = match kind {
            ListKind::Bullet(_) => "</ul>\n",
            ListKind::Enumerated => "</ol>\n",
        };

        if simple {
            let open = if open.starts_with("<ul") {
                "<ul class=\"simple\"".to_string()
            } else {
                open
            };
            self.out.push_str(&open);
            self.out.push_str(">\n");
            for (_, item) in &items {
                self.out
                    .push_str(&format!("<li>{}</li>\n", inline(&item.join("\n"))));
            }
        } else {
            self.out.push_str(&open);
            self.out.push_str(">\n");
            for (item_start, item) in &items {
                self.out.push_str("<li>");
                self.blocks(item, first_line + item_start, false)?;
                self.out.push_str("</li>\n");
            }
        }
        self.out.push_str(close);
        Ok(i)
    }

    /// `..` explicit markup: directives we know, everything else dropped.
    fn explicit(
        &mut self,
        lines: &[String],
        start: usize,
        first_line: usize,
    ) -> Result<usize, DecodeError> {
        let content = lines[start].get(2..).unwrap_or("").trim();
        let end = indented_end(lines, start + 1);
        let body = dedent(&lines[start + 1..end]);

        let Some((name, argument)) = directive(content) else {
            return Ok(end);
        };

        match name.as_str() {
            "image" => {
                let src = escape(argument);
                self.out
                    .push_str(&format!("<img alt=\"{src}\" src=\"{src}\" />\n"));
            }
            "code" | "code-block" | "sourcecode" => {
                // Directive options (`:linenos:` and friends) are skipped.
                let code = body
                    .iter()
                    .skip_while(|l| l.starts_with(':') || l.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n");
                let class = if argument.is_empty() {
                    "code literal-block".to_string()
                } else {
                    format!("code {} literal-block", escape(argument))
                };
                self.out.push_str(&format!(
                    "<pre class=\"{class}\">{}</pre>\n",
                    escape(&code)
                ));
            }
            admonition if ADMONITIONS.contains(&admonition) => {
                let mut content = Vec::new();
                if !argument.is_empty() {
                    content.push(argument.to_string());
                }
                content.extend(body);
                self.out
                    .push_str(&format!("<div class=\"admonition {admonition}\">\n"));
                self.out.push_str(&format!(
                    "<p class=\"admonition-title\">{}</p>\n",
                    title_case(admonition)
                ));
                self.blocks(&content, first_line + start, false)?;
                self.out.push_str("</div>\n");
            }
            _ => {}
        }
        Ok(end)
    }
}

// ============================================================================
// Line classification
// ============================================================================

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 8);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let n = 8 - column % 8;
            out.extend(std::iter::repeat_n(' ', n));
            column += n;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// End of the indented run starting at `start`: the first non-blank line at
/// column zero, or the end of input.
fn indented_end(lines: &[String], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && (is_blank(&lines[end]) || indent_of(&lines[end]) > 0) {
        end += 1;
    }
    end
}

/// Strip the common indentation and surrounding blank lines.
fn dedent(lines: &[String]) -> Vec<String> {
    let width = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    let mut out: Vec<String> = lines
        .iter()
        .map(|l| {
            if is_blank(l) {
                String::new()
            } else {
                l[width..].to_string()
            }
        })
        .collect();
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let leading = out.iter().take_while(|l| l.is_empty()).count();
    out.drain(..leading);
    out
}

fn has_blank_before_body(lines: &[String]) -> bool {
    lines.first().is_some_and(|l| is_blank(l))
}

/// A line made of one repeated punctuation character.
fn adornment(line: &str) -> Option<char> {
    let line = line.trim_end();
    let mut chars = line.chars();
    let first = chars.next()?;
    if !first.is_ascii_punctuation() || line.len() < 2 {
        return None;
    }
    chars.all(|c| c == first).then_some(first)
}

fn is_transition(line: &str) -> bool {
    adornment(line).is_some() && line.trim_end().len() >= 4
}

/// Section title at `i`: `(title, style, lines consumed)`.
fn title_at(lines: &[String], i: usize) -> Option<(&str, Adornment, usize)> {
    let line = &lines[i];

    if let Some(ch) = adornment(line) {
        let text = lines.get(i + 1)?;
        let under = lines.get(i + 2)?;
        if !is_blank(text) && adornment(text).is_none() && adornment(under) == Some(ch) {
            return Some((text.trim(), Adornment { ch, overline: true }, 3));
        }
        return None;
    }

    let under = lines.get(i + 1)?;
    let ch = adornment(under)?;
    let text = line.trim();
    let width = text.chars().count();
    if under.trim_end().len() >= width.min(4) {
        return Some((text, Adornment { ch, overline: false }, 2));
    }
    None
}

fn list_kind(line: &str) -> Option<ListKind> {
    let (_, number) = marker(line)?;
    match number {
        Some(_) => Some(ListKind::Enumerated),
        None => line.chars().next().and_then(|c| match c {
            '-' | '*' | '+' => Some(ListKind::Bullet(c)),
            '#' => Some(ListKind::Enumerated),
            _ => None,
        }),
    }
}

/// Width of a list marker (including the following space) and, for numbered
/// items, the number.
fn marker(line: &str) -> Option<(usize, Option<u32>)> {
    for bullet in ["- ", "* ", "+ "] {
        if line.starts_with(bullet) {
            return Some((2, None));
        }
    }
    if line.starts_with("#. ") || line.starts_with("#) ") {
        return Some((3, None));
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    if rest.starts_with(". ") || rest.starts_with(") ") {
        let number = line[..digits].parse().ok()?;
        return Some((digits + 2, Some(number)));
    }
    None
}

/// `name:: argument` from the text after `..`.
fn directive(content: &str) -> Option<(String, &str)> {
    let (name, argument) = content.split_once("::")?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_ascii_lowercase(), argument.trim()))
}

/// For a paragraph ending in `::`, the paragraph text to keep.
fn strip_literal_marker(text: &str) -> Option<&str> {
    let trimmed = text.trim_end();
    if trimmed == "::" {
        return Some("");
    }
    if let Some(rest) = trimmed.strip_suffix("::") {
        if rest.ends_with(char::is_whitespace) {
            return Some(rest.trim_end());
        }
        return Some(&trimmed[..trimmed.len() - 1]);
    }
    None
}

// ============================================================================
// Inline markup
// ============================================================================

fn inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            let after = &rest[1..];
            if let Some(next) = after.chars().next() {
                push_escaped(&mut out, next);
                prev = Some(next);
                rest = &after[next.len_utf8()..];
            } else {
                rest = after;
            }
            continue;
        }

        if can_open(prev) {
            if let Some((html, after)) = markup(rest) {
                out.push_str(&html);
                prev = rest[..rest.len() - after.len()].chars().last();
                rest = after;
                continue;
            }
        }

        push_escaped(&mut out, c);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn can_open(prev: Option<char>) -> bool {
    prev.is_none_or(|p| p.is_whitespace() || "'\"([{<-/:".contains(p))
}

fn markup(s: &str) -> Option<(String, &str)> {
    if let Some(inner) = s.strip_prefix("``") {
        let (body, after) = delimited(inner, "``")?;
        return Some((format!("<code>{}</code>", escape(body)), after));
    }
    if let Some(inner) = s.strip_prefix("**") {
        let (body, after) = delimited(inner, "**")?;
        return Some((format!("<strong>{}</strong>", escape(body)), after));
    }
    if let Some(inner) = s.strip_prefix('*') {
        let (body, after) = delimited(inner, "*")?;
        return Some((format!("<em>{}</em>", escape(body)), after));
    }
    if let Some(inner) = s.strip_prefix('`') {
        let (body, after) = delimited(inner, "`")?;
        if let Some(after) = after.strip_prefix("__").or_else(|| after.strip_prefix('_')) {
            return Some((reference(body), after));
        }
        return Some((format!("<cite>{}</cite>", escape(body)), after));
    }
    None
}

/// Split `s` at the closing `end` delimiter: `(inner, after)`.
fn delimited<'a>(s: &'a str, end: &str) -> Option<(&'a str, &'a str)> {
    if s.is_empty() || s.starts_with(char::is_whitespace) {
        return None;
    }
    let mut from = 0;
    while let Some(pos) = s[from..].find(end) {
        let idx = from + pos;
        let after = &s[idx + end.len()..];
        let closes = idx > 0
            && !s[..idx].ends_with(char::is_whitespace)
            && after
                .chars()
                .next()
                .is_none_or(|c| c.is_whitespace() || "'\")]}>-/:.,;!?\\_".contains(c));
        if closes {
            return Some((&s[..idx], after));
        }
        from = idx + 1;
    }
    None
}

fn reference(body: &str) -> String {
    if let (Some(open), true) = (body.rfind('<'), body.ends_with('>')) {
        let url = body[open + 1..body.len() - 1].trim();
        let text = body[..open].trim();
        let text = if text.is_empty() { url } else { text };
        return format!(
            "<a class=\"reference external\" href=\"{}\">{}</a>",
            escape(url),
            escape(text)
        );
    }
    format!(
        "<a class=\"reference internal\" href=\"#{}\">{}</a>",
        slug(body),
        escape(body)
    )
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("section");
    }
    out
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(c),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}
