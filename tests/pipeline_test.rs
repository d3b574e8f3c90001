//! End-to-end tests for the parsing pipeline.

mod common;

use std::collections::HashSet;

use common::{idml_zip, newsletter, newsletter_files};
use unidml::{
    parse_bytes, parse_bytes_with_options, parse_file, parse_files, AssignmentStrategy,
    DiagnosticKind, ElementKind, Error, JsonFormat, PageSelection, ParseOptions, RenderOptions,
    Unidml, Unit,
};

#[test]
fn test_newsletter_metadata() {
    let doc = parse_bytes(&newsletter()).unwrap();

    assert_eq!(doc.metadata.name.as_deref(), Some("newsletter.indd"));
    assert_eq!(doc.metadata.dom_version.as_deref(), Some("18.0"));
    assert_eq!(doc.metadata.measurement_unit, Unit::Points);
    assert!(doc.metadata.facing_pages);
    assert_eq!(doc.metadata.page_count, 3);
    assert_eq!(doc.metadata.spread_count, 2);
    assert_eq!(doc.metadata.story_count, 2);
    assert_eq!(doc.metadata.element_count, 8);
}

#[test]
fn test_newsletter_pages() {
    let doc = parse_bytes(&newsletter()).unwrap();

    let ids: Vec<&str> = doc.pages.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert_eq!(doc.master_pages.len(), 1);
    assert_eq!(doc.pages[0].applied_master.as_deref(), Some("ma"));

    // First page's top-left is the element-space origin
    assert_eq!(doc.coordinate_offset.x, 0.0);
    assert_eq!(doc.coordinate_offset.y, 528.0);
    assert_eq!(doc.pages[0].origin.x, 0.0);
    assert_eq!(doc.pages[1].origin.x, -816.0);
    assert_eq!(doc.pages[2].origin.x, 0.0);
    for page in &doc.pages {
        assert_eq!(page.width, 816.0);
        assert_eq!(page.height, 1056.0);
        assert_eq!(page.origin.y, 0.0);
    }
}

#[test]
fn test_newsletter_elements() {
    let doc = parse_bytes(&newsletter()).unwrap();

    let ids: Vec<&str> = doc.elements.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["bg1", "tf1", "tf2", "tf3", "photo", "grp", "dot", "far"]);
    assert!(!doc.elements.contains_key("mtf"));

    let photo = doc.element("photo").unwrap();
    assert_eq!(photo.kind, ElementKind::ContentFrame);
    assert_eq!(photo.image_uri.as_deref(), Some("file:/images/photo.jpg"));

    let dot = doc.element("dot").unwrap();
    assert_eq!(dot.parent_id.as_deref(), Some("grp"));
    assert_eq!(doc.element("grp").unwrap().child_ids, vec!["dot"]);

    let tf1 = doc.element("tf1").unwrap();
    assert_eq!(tf1.geometry.x, 96.0);
    assert_eq!(tf1.geometry.y, 96.0);
    assert_eq!(tf1.geometry.width, 624.0);
    assert_eq!(tf1.geometry.height, 384.0);
    assert_eq!(tf1.next_frame_id.as_deref(), Some("tf2"));
}

#[test]
fn test_newsletter_page_assignment() {
    let doc = parse_bytes(&newsletter()).unwrap();
    let page_of = |id: &str| doc.element(id).and_then(|e| e.page_id.clone());

    assert_eq!(page_of("bg1").as_deref(), Some("p1"));
    assert_eq!(page_of("tf1").as_deref(), Some("p1"));
    assert_eq!(page_of("tf2").as_deref(), Some("p2"));
    assert_eq!(page_of("tf3").as_deref(), Some("p3"));
    assert_eq!(page_of("photo").as_deref(), Some("p3"));
    assert_eq!(page_of("dot").as_deref(), Some("p2"));
    assert_eq!(page_of("far").as_deref(), Some("p1"));

    let tf2 = doc.element("tf2").unwrap();
    assert_eq!(tf2.assignment, Some(AssignmentStrategy::Spatial));
    let position = tf2.page_position.unwrap();
    assert_eq!((position.x, position.y), (96.0, 96.0));

    let far = doc.element("far").unwrap();
    assert_eq!(far.assignment, Some(AssignmentStrategy::Fallback));
    let fallbacks: Vec<_> = doc
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::AmbiguousPageAssignment)
        .collect();
    assert_eq!(fallbacks.len(), 1);
    assert_eq!(fallbacks[0].subject.as_deref(), Some("far"));
}

#[test]
fn test_page_index_lists_every_element_once() {
    let doc = parse_bytes(&newsletter()).unwrap();

    assert_eq!(doc.page_index.len(), doc.pages.len());
    let mut seen = HashSet::new();
    for (page_id, ids) in &doc.page_index {
        for id in ids {
            assert!(seen.insert(id.clone()), "{} listed twice", id);
            assert_eq!(doc.element(id).unwrap().page_id.as_deref(), Some(page_id.as_str()));
        }
    }
    assert_eq!(seen.len(), doc.elements.len());
}

#[test]
fn test_backgrounds() {
    let doc = parse_bytes(&newsletter()).unwrap();

    assert_eq!(doc.page("p1").unwrap().background_color, "#FFF7E0");
    assert_eq!(doc.page("p2").unwrap().background_color, "#FFFFFF");
    assert_eq!(doc.page("p3").unwrap().background_color, "#FFFFFF");
    assert_eq!(doc.spreads[0].background_color, "#FFF7E0");
    assert_eq!(doc.spreads[1].background_color, "#FFFFFF");
}

#[test]
fn test_stories() {
    let doc = parse_bytes(&newsletter()).unwrap();

    let intro = doc.story("u1").unwrap();
    assert_eq!(intro.text, "Intro\nBody");
    assert_eq!(intro.title, None);
    assert_eq!(intro.word_count, 2);
    assert_eq!(intro.frame_ids, vec!["tf1", "tf2"]);
    assert_eq!(intro.line_breaks.explicit, 1);
    assert!(intro
        .runs
        .iter()
        .filter(|r| !r.is_break)
        .all(|r| r.formatting.font_size == 14.0));

    let sidebar = doc.story("u2").unwrap();
    assert_eq!(sidebar.title.as_deref(), Some("Sidebar"));
    assert_eq!(sidebar.frame_ids, vec!["tf3"]);
    assert_eq!(sidebar.paragraph_count, 2);
    assert!(sidebar.text.starts_with("News\n\n"));
    assert!(sidebar.text.contains("Hello."));
}

#[test]
fn test_text_follows_page_order() {
    let doc = parse_bytes(&newsletter()).unwrap();
    let text = unidml::render::to_text(&doc, &RenderOptions::default()).unwrap();

    let intro = text.find("Intro").unwrap();
    let news = text.find("News").unwrap();
    assert!(intro < news);
    assert!(text.starts_with("Intro\nBody\n\n"));

    let page_three = RenderOptions::default().with_pages(PageSelection::Pages(vec![3]));
    let text = unidml::render::to_text(&doc, &page_three).unwrap();
    assert!(text.starts_with("News"));
    assert!(!text.contains("Intro"));
}

#[test]
fn test_json_output() {
    let doc = parse_bytes(&newsletter()).unwrap();
    let json = unidml::render::to_json(&doc, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in ["metadata", "resources", "spreads", "pages", "elements", "stories", "page_index"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["elements"]["tf1"]["page_id"], "p1");
    assert_eq!(value["stories"]["u1"]["text"], "Intro\nBody");
}

#[test]
fn test_structure_only() {
    let options = ParseOptions::new().structure_only();
    let doc = parse_bytes_with_options(&newsletter(), options).unwrap();

    assert!(doc.stories.is_empty());
    assert_eq!(doc.pages.len(), 3);
    assert_eq!(doc.elements.len(), 8);
}

#[test]
fn test_dpi_scales_geometry() {
    let options = ParseOptions::new().with_dpi(72.0);
    let doc = parse_bytes_with_options(&newsletter(), options).unwrap();

    assert_eq!(doc.pages[0].width, 612.0);
    let tf1 = doc.element("tf1").unwrap();
    assert_eq!(tf1.geometry.x, 72.0);
    assert_eq!(tf1.geometry.width, 468.0);
}

#[test]
fn test_malformed_story_strict_and_lenient() {
    let mut files = newsletter_files();
    files.retain(|(path, _)| *path != "Stories/Story_u2.xml");
    files.push(("Stories/Story_u2.xml", "<idPkg:Story><Story Self=\"u2\"><Content>"));
    let bytes = idml_zip(&files);

    let strict = parse_bytes_with_options(&bytes, ParseOptions::new().strict());
    assert!(matches!(strict, Err(Error::MalformedXml { .. })));

    let doc = parse_bytes_with_options(&bytes, ParseOptions::new().lenient()).unwrap();
    assert!(doc.story("u2").is_none());
    assert_eq!(doc.story("u1").unwrap().text, "Intro\nBody");
    assert!(doc
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::MalformedXml
            && d.file.as_deref() == Some("Stories/Story_u2.xml")));
}

#[test]
fn test_missing_designmap() {
    let files: Vec<_> = newsletter_files()
        .into_iter()
        .filter(|(path, _)| *path != "designmap.xml")
        .collect();
    let result = parse_bytes(&idml_zip(&files));
    assert!(matches!(result, Err(Error::MalformedArchive { .. })));
}

#[test]
fn test_no_pages() {
    let bytes = idml_zip(&[
        ("designmap.xml", r#"<Document Name="empty"><idPkg:Spread src="Spreads/Spread_a.xml"/></Document>"#),
        ("Spreads/Spread_a.xml", r#"<idPkg:Spread><Spread Self="a"/></idPkg:Spread>"#),
    ]);
    let result = parse_bytes(&bytes);
    assert!(matches!(result, Err(Error::NoPagesExtracted { .. })));
}

#[test]
fn test_not_an_idml_package() {
    let result = parse_bytes(b"%PDF-1.7 this is not a package");
    assert!(matches!(result, Err(Error::UnknownFormat)));
}

#[test]
fn test_parse_file_and_batch() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("one.idml");
    let second = dir.path().join("two.idml");
    std::fs::write(&first, newsletter()).unwrap();
    std::fs::write(&second, newsletter()).unwrap();

    let doc = parse_file(&first).unwrap();
    assert_eq!(doc.pages.len(), 3);

    let missing = dir.path().join("missing.idml");
    let paths = vec![first.clone(), missing.clone(), second.clone()];
    let results = parse_files(&paths, &ParseOptions::default());

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, first);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
    assert_eq!(results[2].1.as_ref().unwrap().stories.len(), 2);
}

#[test]
fn test_builder_api() {
    let result = Unidml::new().without_diagnostics().parse_bytes(&newsletter()).unwrap();

    let json = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["diagnostics"].as_array().map(Vec::len), Some(0));

    let stats = result.stats();
    assert_eq!(stats.page_count, 3);
    assert_eq!(stats.story_count, 2);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_parse_file_async() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("async.idml");
    std::fs::write(&path, newsletter()).unwrap();

    let doc = unidml::parse_file_async(&path, ParseOptions::default()).await.unwrap();
    assert_eq!(doc.story("u1").unwrap().text, "Intro\nBody");
}
