//! Benchmarks for unidml parsing performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks build synthetic IDML packages in memory.

use std::io::{Cursor, Write};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Creates a synthetic IDML package with the given number of single-page spreads.
fn create_test_idml(spread_count: usize) -> Vec<u8> {
    let mut files: Vec<(String, String)> = Vec::new();
    let mut designmap = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Document DOMVersion="18.0" Name="bench.indd">"#);

    for i in 0..spread_count {
        designmap.push_str(&format!(r#"<idPkg:Spread src="Spreads/Spread_s{i}.xml"/>"#));
        designmap.push_str(&format!(r#"<idPkg:Story src="Stories/Story_u{i}.xml"/>"#));

        files.push((
            format!("Spreads/Spread_s{i}.xml"),
            format!(
                r#"<idPkg:Spread><Spread Self="s{i}">
<Page Self="p{i}" Name="{n}" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396"/>
<Rectangle Self="bg{i}" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396" FillColor="Color/Paper"/>
<TextFrame Self="tf{i}" ParentStory="u{i}" GeometricBounds="72 72 720 540" ItemTransform="1 0 0 1 0 -396"/>
<Group Self="g{i}" ItemTransform="1 0 0 1 20 20">
<Oval Self="o{i}" GeometricBounds="0 0 50 50" ItemTransform="1 0 0 1 0 -396"/>
<GraphicLine Self="l{i}" GeometricBounds="60 0 60 100" ItemTransform="1 0 0 1 0 -396"/>
</Group>
</Spread></idPkg:Spread>"#,
                n = i + 1
            ),
        ));

        let mut story = format!(r#"<idPkg:Story><Story Self="u{i}">"#);
        for p in 0..8 {
            story.push_str(r#"<ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Body">"#);
            story.push_str(&format!(
                r#"<CharacterStyleRange><Content>Paragraph {p} of spread {i} with benchmark text</Content><Br/></CharacterStyleRange>"#
            ));
            story.push_str(r#"<CharacterStyleRange FontStyle="Bold"><Content>and a bold tail.</Content></CharacterStyleRange>"#);
            story.push_str("</ParagraphStyleRange>");
        }
        story.push_str("</Story></idPkg:Story>");
        files.push((format!("Stories/Story_u{i}.xml"), story));
    }
    designmap.push_str("</Document>");

    files.push((
        "Resources/Styles.xml".to_string(),
        r#"<idPkg:Styles><RootParagraphStyleGroup>
<ParagraphStyle Self="ParagraphStyle/$ID/NormalParagraphStyle" Name="$ID/NormalParagraphStyle" PointSize="12"/>
<ParagraphStyle Self="ParagraphStyle/Body" Name="Body" BasedOn="ParagraphStyle/$ID/NormalParagraphStyle" PointSize="10"/>
</RootParagraphStyleGroup></idPkg:Styles>"#
            .to_string(),
    ));
    files.push((
        "Resources/Graphic.xml".to_string(),
        r#"<idPkg:Graphic><Color Self="Color/Paper" Name="Paper" Space="CMYK" ColorValue="0 0 0 0"/></idPkg:Graphic>"#
            .to_string(),
    ));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(b"application/vnd.adobe.indesign-idml-package").unwrap();
    writer.start_file("designmap.xml", SimpleFileOptions::default()).unwrap();
    writer.write_all(designmap.as_bytes()).unwrap();
    for (path, content) in &files {
        writer.start_file(path.as_str(), SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Benchmark IDML format detection.
fn bench_format_detection(c: &mut Criterion) {
    let idml_data = create_test_idml(1);
    let non_idml_data = b"Not an IDML package at all, just random text content";

    c.bench_function("detect_valid_idml", |b| {
        b.iter(|| unidml::detect_format_from_bytes(black_box(&idml_data)).unwrap());
    });

    c.bench_function("detect_non_idml", |b| {
        b.iter(|| unidml::detect_format_from_bytes(black_box(non_idml_data)).is_err());
    });
}

/// Benchmark the full pipeline at various sizes.
fn bench_idml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("idml_parsing");

    for spread_count in [1, 10, 50].iter() {
        let data = create_test_idml(*spread_count);

        group.bench_function(format!("{}_spreads", spread_count), |b| {
            b.iter(|| unidml::parse_bytes(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark structure-only parsing against the full pipeline.
fn bench_structure_only(c: &mut Criterion) {
    let data = create_test_idml(10);

    c.bench_function("structure_only_10_spreads", |b| {
        b.iter(|| {
            let options = unidml::ParseOptions::new().structure_only();
            unidml::parse_bytes_with_options(black_box(&data), options).unwrap()
        });
    });
}

/// Benchmark rendering a parsed document.
fn bench_rendering(c: &mut Criterion) {
    let doc = unidml::parse_bytes(&create_test_idml(10)).unwrap();
    let options = unidml::RenderOptions::default();

    c.bench_function("render_json_10_spreads", |b| {
        b.iter(|| unidml::render::to_json(black_box(&doc), unidml::JsonFormat::Compact).unwrap());
    });

    c.bench_function("render_text_10_spreads", |b| {
        b.iter(|| unidml::render::to_text(black_box(&doc), &options).unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_idml_parsing,
    bench_structure_only,
    bench_rendering,
);
criterion_main!(benches);
