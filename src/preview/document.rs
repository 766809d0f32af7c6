//! Markup side of extraction: turns raw HTML into the title, meta tags and
//! link tags the extractor works on.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile title selector"));
static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Failed to compile meta selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link").expect("Failed to compile link selector"));

/// Attribute lookup by name. Implemented by anything the extractor can scan.
pub trait TagAttrs {
    fn attr(&self, name: &str) -> Option<&str>;
}

impl TagAttrs for HashMap<String, String> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Owned copy of an element's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    attrs: HashMap<String, String>,
}

impl Tag {
    pub fn new<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        Self::new(element.value().attrs())
    }
}

impl TagAttrs for Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.attr(name)
    }
}

/// A page reduced to the parts that carry preview metadata.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub metas: Vec<Tag>,
    pub links: Vec<Tag>,
}

impl ParsedDocument {
    /// Parses markup leniently. Returns `None` only when there is nothing to
    /// parse at all; broken markup still yields whatever tags could be found.
    pub fn parse(html: &str) -> Option<Self> {
        if html.trim().is_empty() {
            log::debug!("empty document, nothing to parse");
            return None;
        }

        let document = Html::parse_document(html);
        if !document.errors.is_empty() {
            log::debug!("document parsed with {} markup errors", document.errors.len());
        }

        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| {
                el.text()
                    .flat_map(str::split_whitespace)
                    .collect::<Vec<_>>()
                    .join(" ")
            });

        let metas = document.select(&META_SELECTOR).map(Tag::from_element).collect();
        let links = document.select(&LINK_SELECTOR).map(Tag::from_element).collect();

        Some(Self {
            title,
            metas,
            links,
        })
    }
}
