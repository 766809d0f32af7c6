use crate::preview::{extract, preview_from_html, PreviewType, Tag};
use url::Url;

fn source() -> Url {
    Url::parse("https://example.com/page").unwrap()
}

fn meta(attrs: &[(&str, &str)]) -> Tag {
    Tag::new(attrs.iter().copied())
}

fn html_with_head(head: &str) -> String {
    format!("<html><head>{head}</head><body></body></html>")
}

#[test]
fn test_no_recognized_tags_leaves_fields_empty() {
    let tags = vec![
        meta(&[("charset", "utf-8")]),
        meta(&[("name", "viewport"), ("content", "width=device-width")]),
    ];
    let record = extract(&tags, &[] as &[Tag], Some("Doc Title"), &source());

    assert_eq!(record.content_type(), PreviewType::Unknown);
    assert_eq!(record.title(), Some("Doc Title"));
    assert_eq!(record.url(), &source());
    assert!(record.site_name().is_none());
    assert!(record.description().is_none());
    assert!(record.image_url().is_none());
    assert!(record.video_url().is_none());
    assert!(record.locale().is_none());
    assert!(record.price().is_none());
    assert!(record.currency().is_none());
}

#[test]
fn test_minimal_document_only_title() {
    let record = preview_from_html("<html><head><title>Hello</title></head></html>", &source()).unwrap();

    assert_eq!(record.title(), Some("Hello"));
    assert_eq!(record.content_type(), PreviewType::Unknown);
    assert!(record.site_name().is_none());
    assert!(record.description().is_none());
    assert!(record.image_url().is_none());
}

#[test]
fn test_every_rule_fills_its_field() {
    let html = html_with_head(
        r#"
        <title>Fallback</title>
        <meta property="og:type" content="product">
        <meta property="og:site_name" content="Shop">
        <meta property="og:title" content="Blue Mug">
        <meta property="og:description" content="A mug.">
        <meta property="og:image" content="https://cdn.example.com/mug.jpg">
        <meta property="og:video" content="https://cdn.example.com/mug.mp4">
        <meta property="og:locale" content="en_GB">
        <meta property="product:price:amount" content="12.50">
        <meta property="product:price:currency" content="GBP">
        "#,
    );
    let record = preview_from_html(&html, &source()).unwrap();

    assert_eq!(record.content_type(), PreviewType::Product);
    assert_eq!(record.site_name(), Some("Shop"));
    assert_eq!(record.title(), Some("Blue Mug"));
    assert_eq!(record.description(), Some("A mug."));
    assert_eq!(record.image_url().unwrap().as_str(), "https://cdn.example.com/mug.jpg");
    assert_eq!(record.video_url().unwrap().as_str(), "https://cdn.example.com/mug.mp4");
    assert_eq!(record.locale(), Some("en_GB"));
    assert_eq!(record.price(), Some("12.50"));
    assert_eq!(record.currency(), Some("GBP"));
}

#[test]
fn test_twitter_variants() {
    let html = html_with_head(
        r#"
        <meta property="twitter:site_name" content="Bird">
        <meta property="twitter:title" content="Tweet">
        <meta property="twitter:description" content="Short">
        <meta property="twitter:image" content="https://pbs.example.com/t.png">
        "#,
    );
    let record = preview_from_html(&html, &source()).unwrap();

    assert_eq!(record.site_name(), Some("Bird"));
    assert_eq!(record.title(), Some("Tweet"));
    assert_eq!(record.description(), Some("Short"));
    assert_eq!(record.image_url().unwrap().as_str(), "https://pbs.example.com/t.png");
}

#[test]
fn test_last_og_title_wins() {
    let html = html_with_head(
        r#"
        <meta property="og:title" content="First">
        <meta property="og:title" content="Second">
        "#,
    );
    let record = preview_from_html(&html, &source()).unwrap();
    assert_eq!(record.title(), Some("Second"));
}

#[test]
fn test_description_order_decides_between_property_and_name() {
    let name_last = html_with_head(
        r#"
        <meta property="og:description" content="from property">
        <meta name="description" content="from name">
        "#,
    );
    let property_last = html_with_head(
        r#"
        <meta name="description" content="from name">
        <meta property="og:description" content="from property">
        "#,
    );

    let record = preview_from_html(&name_last, &source()).unwrap();
    assert_eq!(record.description(), Some("from name"));

    let record = preview_from_html(&property_last, &source()).unwrap();
    assert_eq!(record.description(), Some("from property"));
}

#[test]
fn test_og_image_after_itemprop_wins() {
    let tags = vec![
        meta(&[("itemprop", "image"), ("content", "https://a.com/item.jpg")]),
        meta(&[("property", "og:image"), ("content", "https://a.com/og.jpg")]),
    ];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.image_url().unwrap().as_str(), "https://a.com/og.jpg");
}

#[test]
fn test_itemprop_after_og_image_wins() {
    let tags = vec![
        meta(&[("property", "og:image"), ("content", "https://a.com/og.jpg")]),
        meta(&[("itemprop", "image"), ("content", "https://a.com/item.jpg")]),
    ];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.image_url().unwrap().as_str(), "https://a.com/item.jpg");
}

#[test]
fn test_link_image_beats_meta_regardless_of_order() {
    let html = r#"<html><head>
        <link rel="preload" as="image" href="https://b.com/y.jpg">
        <meta property="og:image" content="https://a.com/x.jpg">
    </head><body>
        <meta itemprop="image" content="https://a.com/z.jpg">
    </body></html>"#;
    let record = preview_from_html(html, &source()).unwrap();
    assert_eq!(record.image_url().unwrap().as_str(), "https://b.com/y.jpg");
}

#[test]
fn test_last_link_image_wins_and_other_links_ignored() {
    let links = vec![
        meta(&[("as", "image"), ("href", "https://b.com/1.jpg")]),
        meta(&[("as", "image"), ("href", "https://b.com/2.jpg")]),
        meta(&[("as", "style"), ("href", "https://b.com/site.css")]),
    ];
    let record = extract(&[] as &[Tag], &links, None, &source());
    assert_eq!(record.image_url().unwrap().as_str(), "https://b.com/2.jpg");
}

#[test]
fn test_itemprop_relative_image_resolves_against_host() {
    let tags = vec![meta(&[("itemprop", "image"), ("content", "/img.png")])];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.image_url().unwrap().as_str(), "https://example.com/img.png");
}

#[test]
fn test_og_image_relative_has_no_fallback() {
    let tags = vec![
        meta(&[("property", "og:image"), ("content", "https://a.com/x.jpg")]),
        meta(&[("property", "og:image"), ("content", "/relative.png")]),
    ];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert!(record.image_url().is_none());
}

#[test]
fn test_unknown_og_type_is_unknown() {
    let tags = vec![meta(&[("property", "og:type"), ("content", "gibberish")])];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.content_type(), PreviewType::Unknown);

    let tags = vec![meta(&[("property", "og:type"), ("content", "Article")])];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.content_type(), PreviewType::Unknown);
}

#[test]
fn test_media_og_types() {
    for (value, expected) in [
        ("video.movie", PreviewType::Movie),
        ("video.tv_show", PreviewType::TvShow),
        ("video.other", PreviewType::Video),
        ("music.song", PreviewType::Song),
        ("music.album", PreviewType::Album),
        ("music.playlist", PreviewType::Playlist),
        ("music.radio_station", PreviewType::RadioStation),
    ] {
        let tags = vec![meta(&[("property", "og:type"), ("content", value)])];
        let record = extract(&tags, &[] as &[Tag], None, &source());
        assert_eq!(record.content_type(), expected, "og:type {value}");
    }
}

#[test]
fn test_tag_without_content_reads_as_empty() {
    let tags = vec![
        meta(&[("property", "og:image"), ("content", "https://a.com/x.jpg")]),
        meta(&[("property", "og:image")]),
        meta(&[("property", "og:title")]),
    ];
    let record = extract(&tags, &[] as &[Tag], Some("Doc"), &source());
    assert_eq!(record.title(), Some(""));
    assert!(record.image_url().is_none());
}

#[test]
fn test_image_link_without_href_clears_image() {
    let tags = vec![meta(&[("property", "og:image"), ("content", "https://a.com/x.jpg")])];
    let links = vec![meta(&[("as", "image")])];
    let record = extract(&tags, &links, None, &source());
    assert!(record.image_url().is_none());
}

#[test]
fn test_document_title_whitespace_collapsed() {
    let record = preview_from_html("<title>\n   Hello\n   World  </title>", &source()).unwrap();
    assert_eq!(record.title(), Some("Hello World"));
}

#[test]
fn test_price_kept_verbatim() {
    let tags = vec![meta(&[("property", "product:price:amount"), ("content", "1,299.00 ")])];
    let record = extract(&tags, &[] as &[Tag], None, &source());
    assert_eq!(record.price(), Some("1,299.00 "));
}

#[test]
fn test_empty_document_yields_no_record() {
    assert!(preview_from_html("", &source()).is_none());
}

#[test]
fn test_independent_extractions_do_not_share_state() {
    let a = vec![meta(&[("property", "og:title"), ("content", "A")])];
    let b = vec![meta(&[("property", "og:locale"), ("content", "fr_FR")])];

    let first = extract(&a, &[] as &[Tag], None, &source());
    let second = extract(&b, &[] as &[Tag], None, &source());

    assert_eq!(first.title(), Some("A"));
    assert!(first.locale().is_none());
    assert!(second.title().is_none());
    assert_eq!(second.locale(), Some("fr_FR"));
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_concurrent_extractions() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let html = html_with_head(&format!(r#"<meta property="og:title" content="title {i}">"#));
                let record = preview_from_html(&html, &source()).unwrap();
                (i, record.title().map(str::to_string))
            })
        })
        .collect();

    for handle in handles {
        let (i, title) = handle.join().unwrap();
        assert_eq!(title, Some(format!("title {i}")));
    }
}
