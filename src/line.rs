//! Screen line representation
//!
//! A line is an unbounded row of cells plus three lazily-populated sidecars:
//! embedded elements (referenced by element cells), a sparse column → URL
//! map for OSC 8 hyperlinks, and namespaced key/value metadata.
//!
//! Lines render through two projections: [`Line::as_html`] for styled output
//! and [`Line::as_plain`] for raw text.

use std::collections::HashMap;

use crate::cell::Cell;
use crate::element::Element;
use crate::style::Style;

/// Sentinel column meaning "through the end of the line"
pub(crate) const END_OF_LINE: usize = usize::MAX;

/// A single line in the screen buffer
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub(crate) cells: Vec<Cell>,
    pub(crate) elements: Vec<Element>,
    pub(crate) hyperlinks: Option<HashMap<usize, String>>,
    pub(crate) metadata: Option<HashMap<String, HashMap<String, String>>>,
}

impl Line {
    /// Create an empty line with room for `cols` cells
    pub(crate) fn with_capacity(cols: usize) -> Line {
        Line {
            cells: Vec::with_capacity(cols),
            ..Line::default()
        }
    }

    /// Rebuild this line for reuse as a fresh tail line, keeping the cell
    /// allocation but dropping all content and sidecars.
    pub(crate) fn reset_for_reuse(&mut self) {
        self.cells.clear();
        self.elements.clear();
        self.hyperlinks = None;
        self.metadata = None;
    }

    /// The line's cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Elements embedded in this line
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The hyperlink URL covering column `col`, if any
    pub fn hyperlink_at(&self, col: usize) -> Option<&str> {
        self.hyperlinks.as_ref()?.get(&col).map(String::as_str)
    }

    /// Metadata for `namespace`, if any has been set
    pub fn metadata(&self, namespace: &str) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()?.get(namespace)
    }

    /// Record a hyperlink URL for column `col`
    pub(crate) fn set_hyperlink(&mut self, col: usize, url: String) {
        self.hyperlinks
            .get_or_insert_with(HashMap::new)
            .insert(col, url);
    }

    /// Append an element, returning its index
    pub(crate) fn add_element(&mut self, element: Element) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Merge `data` into the metadata for `namespace`, overwriting on key
    /// collisions.
    pub(crate) fn set_metadata(&mut self, namespace: &str, data: HashMap<String, String>) {
        match &mut self.metadata {
            None => {
                let mut metadata = HashMap::new();
                metadata.insert(namespace.to_string(), data);
                self.metadata = Some(metadata);
            }
            Some(metadata) => match metadata.get_mut(namespace) {
                Some(existing) => existing.extend(data),
                None => {
                    metadata.insert(namespace.to_string(), data);
                }
            },
        }
    }

    /// Clear the whole line
    pub(crate) fn clear_all(&mut self) {
        self.cells.clear();
    }

    /// Clear the inclusive column range `start..=end`. A range reaching the
    /// last cell truncates the line; an interior range blanks the cells.
    pub(crate) fn clear_range(&mut self, start: usize, end: usize) {
        if end < start {
            return;
        }
        if start >= self.cells.len() {
            return;
        }
        if end >= self.cells.len() - 1 {
            self.cells.truncate(start);
            return;
        }
        for cell in &mut self.cells[start..=end] {
            *cell = Cell::EMPTY;
        }
    }

    /// Render as plain text. Element cells contribute nothing.
    pub fn as_plain(&self) -> String {
        self.cells
            .iter()
            .filter(|cell| !cell.is_element())
            .map(|cell| cell.glyph)
            .collect()
    }

    /// Render as an HTML fragment. Consecutive cells sharing a style and
    /// hyperlink coalesce into one run; an empty rendering yields `&nbsp;`
    /// so blank lines keep their height.
    pub fn as_html(&self) -> String {
        // A column's recorded URL only applies while the cell still carries
        // the hyperlink flag; overwritten cells drop back to plain text.
        let link_at = |col: usize| {
            if self.cells[col].style.hyperlink() {
                self.hyperlink_at(col)
            } else {
                None
            }
        };

        let mut out = String::new();
        let mut i = 0;
        while i < self.cells.len() {
            let cell = self.cells[i];
            if let Some(idx) = cell.element_index() {
                if let Some(element) = self.elements.get(idx) {
                    out.push_str(&element.as_html());
                }
                i += 1;
                continue;
            }

            let style = cell.style;
            let link = link_at(i);
            let mut text = String::new();
            while i < self.cells.len() {
                let run = self.cells[i];
                if run.is_element() || run.style != style || link_at(i) != link {
                    break;
                }
                text.push(run.glyph);
                i += 1;
            }

            let escaped = html_escape(&text);
            let body = if style.is_plain() {
                escaped
            } else {
                span(style, &escaped)
            };
            match link {
                Some(url) => {
                    out.push_str(&format!(r#"<a href="{}">{}</a>"#, html_escape(url), body));
                }
                None => out.push_str(&body),
            }
        }

        if out.is_empty() {
            "&nbsp;".to_string()
        } else {
            out
        }
    }
}

fn span(style: Style, text: &str) -> String {
    let classes = style.css_classes();
    let inline = style.css_inline();
    let mut tag = String::from("<span");
    if !classes.is_empty() {
        tag.push_str(&format!(r#" class="{}""#, classes.join(" ")));
    }
    if !inline.is_empty() {
        tag.push_str(&format!(r#" style="{}""#, inline.join(";")));
    }
    format!("{tag}>{text}</span>")
}

/// Escape HTML special characters
pub(crate) fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::parse_element_sequence;

    fn line_of(text: &str) -> Line {
        let mut line = Line::default();
        for c in text.chars() {
            line.cells.push(Cell {
                glyph: c,
                style: Style::default(),
            });
        }
        line
    }

    #[test]
    fn test_as_plain() {
        assert_eq!(line_of("hello").as_plain(), "hello");
        assert_eq!(Line::default().as_plain(), "");
    }

    #[test]
    fn test_as_html_plain_text() {
        assert_eq!(line_of("hello").as_html(), "hello");
    }

    #[test]
    fn test_as_html_escapes() {
        assert_eq!(line_of("a<b>&c").as_html(), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_as_html_empty_line() {
        assert_eq!(Line::default().as_html(), "&nbsp;");
    }

    #[test]
    fn test_as_html_coalesces_runs() {
        let mut line = line_of("redplain");
        let red = Style::default().apply_sgr(&["31".to_string()]);
        for cell in &mut line.cells[..3] {
            cell.style = red;
        }
        assert_eq!(
            line.as_html(),
            r#"<span class="term-fg31">red</span>plain"#
        );
    }

    #[test]
    fn test_as_html_hyperlink_run() {
        let mut line = line_of("link");
        let mut style = Style::default();
        style.set_hyperlink(true);
        for cell in &mut line.cells {
            cell.style = style;
        }
        for col in 0..4 {
            line.set_hyperlink(col, "https://x/".to_string());
        }
        assert_eq!(line.as_html(), r#"<a href="https://x/">link</a>"#);
    }

    #[test]
    fn test_as_html_overwritten_link_cell_is_plain() {
        let mut line = line_of("ab");
        line.set_hyperlink(0, "https://x/".to_string());
        // The map has an entry but the cell lost its hyperlink flag
        assert_eq!(line.as_html(), "ab");
    }

    #[test]
    fn test_as_html_element() {
        let mut line = Line::default();
        let element = parse_element_sequence("1339;url=https://x/;content=go")
            .unwrap()
            .unwrap();
        let idx = line.add_element(element);
        let mut style = Style::default();
        style.set_element(true);
        line.cells.push(Cell {
            glyph: char::from_u32(idx as u32).unwrap(),
            style,
        });
        assert_eq!(line.as_html(), r#"<a href="https://x/">go</a>"#);
        assert_eq!(line.as_plain(), "");
    }

    #[test]
    fn test_clear_range_interior() {
        let mut line = line_of("abcdef");
        line.clear_range(1, 3);
        assert_eq!(line.as_plain(), "a   ef");
    }

    #[test]
    fn test_clear_range_to_end_truncates() {
        let mut line = line_of("abcdef");
        line.clear_range(2, END_OF_LINE);
        assert_eq!(line.as_plain(), "ab");
    }

    #[test]
    fn test_clear_range_past_end_is_noop() {
        let mut line = line_of("ab");
        line.clear_range(5, END_OF_LINE);
        assert_eq!(line.as_plain(), "ab");
    }

    #[test]
    fn test_clear_range_empty_range_is_noop() {
        let mut line = line_of("ab");
        line.clear_range(1, 0);
        assert_eq!(line.as_plain(), "ab");
    }

    #[test]
    fn test_clear_all() {
        let mut line = line_of("ab");
        line.clear_all();
        assert_eq!(line.as_plain(), "");
    }

    #[test]
    fn test_metadata_merge_overwrites() {
        let mut line = Line::default();
        line.set_metadata(
            "bk",
            HashMap::from([("t".to_string(), "100".to_string())]),
        );
        line.set_metadata(
            "bk",
            HashMap::from([("t".to_string(), "200".to_string())]),
        );
        assert_eq!(line.metadata("bk").unwrap().get("t").unwrap(), "200");
        assert_eq!(line.metadata("other"), None);
    }

    #[test]
    fn test_reset_for_reuse() {
        let mut line = line_of("abc");
        line.set_hyperlink(0, "https://x/".to_string());
        line.set_metadata("bk", HashMap::from([("t".to_string(), "1".to_string())]));
        line.reset_for_reuse();
        assert_eq!(line.as_plain(), "");
        assert_eq!(line.hyperlink_at(0), None);
        assert_eq!(line.metadata("bk"), None);
    }
}
