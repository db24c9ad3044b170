//! Embedded elements decoded from OSC payloads
//!
//! Three payload families are recognized:
//! - `1337;File=...`: iTerm2 inline images
//! - `1338;url=...`: artifact images referenced by URL
//! - `1339;url=...`: inline links rendered as elements
//!
//! Anything else is not an element and is ignored by the caller. Parse
//! failures carry a message that the screen renders inline as literal text.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::line::html_escape;

/// Element parse error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// iTerm images must be declared inline
    #[error("images must be inline, expected `inline=1`")]
    NotInline,

    /// Width/height argument was not a recognized dimension
    #[error("invalid image dimension {0:?}")]
    InvalidDimension(String),

    /// The `name` argument was not valid base64
    #[error("name is not valid base64: {0}")]
    InvalidName(String),

    /// Image and link sequences need a `url` argument
    #[error("url argument is required")]
    MissingUrl,
}

/// What kind of element a cell embeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// iTerm2 inline image (`1337;File=…`)
    ItermImage,
    /// Image referenced by URL (`1338;…`)
    Image,
    /// Inline link (`1339;…`)
    Link,
}

/// An embedded non-character element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: ElementKind,
    url: Option<String>,
    alt: Option<String>,
    width: Option<String>,
    height: Option<String>,
    content: Option<String>,
}

impl Element {
    /// The element's kind
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Target URL for images and links
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Alt text (the decoded `name` for iTerm images)
    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    /// Render this element as an HTML fragment
    pub fn as_html(&self) -> String {
        match self.kind {
            ElementKind::Link => {
                let url = self.url.as_deref().unwrap_or("");
                let content = self.content.as_deref().unwrap_or(url);
                format!(
                    r#"<a href="{}">{}</a>"#,
                    html_escape(url),
                    html_escape(content)
                )
            }
            ElementKind::Image => {
                let url = self.url.as_deref().unwrap_or("");
                let mut img = format!(r#"<img src="{}""#, html_escape(url));
                self.push_img_attrs(&mut img);
                img.push_str("/>");
                img
            }
            ElementKind::ItermImage => {
                let mut img = String::from("<img");
                if let Some(content) = &self.content {
                    let media = media_type(self.alt.as_deref().unwrap_or(""));
                    img.push_str(&format!(r#" src="data:{media};base64,{content}""#));
                }
                self.push_img_attrs(&mut img);
                img.push_str("/>");
                img
            }
        }
    }

    fn push_img_attrs(&self, img: &mut String) {
        if let Some(alt) = &self.alt {
            img.push_str(&format!(r#" alt="{}""#, html_escape(alt)));
        }
        if let Some(width) = &self.width {
            img.push_str(&format!(r#" width="{}""#, html_escape(width)));
        }
        if let Some(height) = &self.height {
            img.push_str(&format!(r#" height="{}""#, html_escape(height)));
        }
    }

    fn new(kind: ElementKind) -> Element {
        Element {
            kind,
            url: None,
            alt: None,
            width: None,
            height: None,
            content: None,
        }
    }
}

/// Decode an OSC payload into an element.
///
/// Returns `Ok(None)` for payloads that are not element sequences at all
/// (window titles, unknown commands) so the caller can ignore them.
pub fn parse_element_sequence(sequence: &str) -> Result<Option<Element>, ElementError> {
    if let Some(rest) = sequence.strip_prefix("1337;File=") {
        return parse_iterm_image(rest).map(Some);
    }
    if let Some(rest) = sequence.strip_prefix("1338;") {
        return parse_image(rest).map(Some);
    }
    if let Some(rest) = sequence.strip_prefix("1339;") {
        return parse_link(rest).map(Some);
    }
    Ok(None)
}

fn parse_iterm_image(rest: &str) -> Result<Element, ElementError> {
    let (args, content) = match rest.split_once(':') {
        Some((args, content)) => (args, Some(content)),
        None => (rest, None),
    };

    let mut element = Element::new(ElementKind::ItermImage);
    let mut inline = false;
    for (key, value) in arguments(args) {
        match key {
            "name" => {
                let decoded = BASE64
                    .decode(value)
                    .map_err(|_| ElementError::InvalidName(value.to_string()))?;
                element.alt = Some(String::from_utf8_lossy(&decoded).into_owned());
            }
            "width" => element.width = Some(parse_dimension(value)?),
            "height" => element.height = Some(parse_dimension(value)?),
            "inline" => inline = value == "1",
            _ => {}
        }
    }

    if !inline {
        return Err(ElementError::NotInline);
    }
    element.content = content.map(str::to_string);
    Ok(element)
}

fn parse_image(rest: &str) -> Result<Element, ElementError> {
    let mut element = Element::new(ElementKind::Image);
    for (key, value) in arguments(rest) {
        match key {
            "url" => element.url = Some(value.to_string()),
            "alt" => element.alt = Some(value.to_string()),
            "width" => element.width = Some(parse_dimension(value)?),
            "height" => element.height = Some(parse_dimension(value)?),
            _ => {}
        }
    }
    if element.url.is_none() {
        return Err(ElementError::MissingUrl);
    }
    Ok(element)
}

fn parse_link(rest: &str) -> Result<Element, ElementError> {
    let mut element = Element::new(ElementKind::Link);
    for (key, value) in arguments(rest) {
        match key {
            "url" => element.url = Some(value.to_string()),
            "content" => element.content = Some(value.to_string()),
            _ => {}
        }
    }
    if element.url.is_none() {
        return Err(ElementError::MissingUrl);
    }
    Ok(element)
}

/// Iterate `;`-separated `key=value` arguments, skipping malformed pairs
fn arguments(args: &str) -> impl Iterator<Item = (&str, &str)> {
    args.split(';').filter_map(|pair| pair.split_once('='))
}

/// A dimension is digits, digits with a `px`/`%` suffix, or `auto`
fn parse_dimension(value: &str) -> Result<String, ElementError> {
    if value == "auto" {
        return Ok(value.to_string());
    }
    let digits = value
        .strip_suffix("px")
        .or_else(|| value.strip_suffix('%'))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ElementError::InvalidDimension(value.to_string()));
    }
    Ok(value.to_string())
}

/// Guess a media type from the image name's extension
fn media_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "image/png",
    }
}
