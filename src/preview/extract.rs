//! Rule table that turns meta and link tags into a [`PreviewRecord`].
//!
//! Tags are scanned once in document order and every rule is checked against
//! every tag, so a later tag overwrites whatever an earlier one set. Link tags
//! are scanned afterwards and always have the last word on the image.

use crate::preview::document::{ParsedDocument, TagAttrs};
use crate::preview::types::{PreviewFields, PreviewRecord, PreviewType};
use url::Url;

#[derive(Debug, Clone, Copy)]
enum Key {
    Property,
    Name,
    Itemprop,
}

impl Key {
    fn attr(self) -> &'static str {
        match self {
            Key::Property => "property",
            Key::Name => "name",
            Key::Itemprop => "itemprop",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    ContentType,
    SiteName,
    Title,
    Description,
    ItempropImage,
    Image,
    Video,
    Locale,
    Price,
    Currency,
}

struct MetaRule {
    key: Key,
    values: &'static [&'static str],
    target: Target,
}

// Application order matters: rules later in this list win within one tag.
const META_RULES: &[MetaRule] = &[
    MetaRule { key: Key::Property, values: &["og:type"], target: Target::ContentType },
    MetaRule { key: Key::Property, values: &["og:site_name", "twitter:site_name"], target: Target::SiteName },
    MetaRule { key: Key::Property, values: &["og:title", "twitter:title"], target: Target::Title },
    MetaRule { key: Key::Property, values: &["og:description", "twitter:description"], target: Target::Description },
    MetaRule { key: Key::Name, values: &["description", "twitter:description", "og:description"], target: Target::Description },
    MetaRule { key: Key::Itemprop, values: &["image"], target: Target::ItempropImage },
    MetaRule { key: Key::Property, values: &["og:image", "twitter:image"], target: Target::Image },
    MetaRule { key: Key::Property, values: &["og:video"], target: Target::Video },
    MetaRule { key: Key::Property, values: &["og:locale"], target: Target::Locale },
    MetaRule { key: Key::Property, values: &["product:price:amount"], target: Target::Price },
    MetaRule { key: Key::Property, values: &["product:price:currency"], target: Target::Currency },
];

/// Builds a preview record from already-parsed tags.
///
/// Never fails: tags that match nothing just leave their fields empty.
pub fn extract<M, L>(
    tags: &[M],
    link_tags: &[L],
    document_title: Option<&str>,
    source_url: &Url,
) -> PreviewRecord
where
    M: TagAttrs,
    L: TagAttrs,
{
    let mut fields = PreviewFields {
        title: document_title.map(str::to_string),
        ..Default::default()
    };

    for tag in tags {
        // a missing content attribute reads as empty and still fires
        let content = tag.attr("content").unwrap_or("");

        for rule in META_RULES {
            let matched = tag
                .attr(rule.key.attr())
                .is_some_and(|v| rule.values.contains(&v));
            if matched {
                apply(&mut fields, rule.target, content, source_url);
            }
        }
    }

    for link in link_tags {
        if link.attr("as") != Some("image") {
            continue;
        }
        fields.image_url = Url::parse(link.attr("href").unwrap_or("")).ok();
    }

    PreviewRecord::new(source_url.clone(), fields)
}

/// Convenience wrapper over [`extract`] for a parsed page.
pub fn extract_document(document: &ParsedDocument, source_url: &Url) -> PreviewRecord {
    extract(
        &document.metas,
        &document.links,
        document.title.as_deref(),
        source_url,
    )
}

fn apply(fields: &mut PreviewFields, target: Target, content: &str, source_url: &Url) {
    match target {
        Target::ContentType => fields.content_type = PreviewType::from_og_type(content),
        Target::SiteName => fields.site_name = Some(content.to_string()),
        Target::Title => fields.title = Some(content.to_string()),
        Target::Description => fields.description = Some(content.to_string()),
        Target::ItempropImage => {
            // needs a host to fall back on; without one the tag is skipped
            if let Some(host) = source_url.host_str() {
                fields.image_url = resolve_with_host(content, host, source_url.scheme());
            }
        }
        Target::Image => fields.image_url = Url::parse(content).ok(),
        Target::Video => fields.video_url = Url::parse(content).ok(),
        Target::Locale => fields.locale = Some(content.to_string()),
        Target::Price => fields.price = Some(content.to_string()),
        Target::Currency => fields.currency = Some(content.to_string()),
    }
}

/// Absolute parse first, then the host glued in front of the value. A bare
/// `host/path` has no scheme, so the page's scheme is tried last.
fn resolve_with_host(content: &str, host: &str, scheme: &str) -> Option<Url> {
    Url::parse(content)
        .or_else(|_| Url::parse(&format!("{host}{content}")))
        .or_else(|_| Url::parse(&format!("{scheme}://{host}{content}")))
        .ok()
}
