//! IDML document parser.

use std::io::Read;
use std::path::Path;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::Result;
use crate::model::DocumentModel;
use crate::package::PackageContents;

use super::association::{apply_backgrounds, associate};
use super::context::ParseContext;
use super::geometry::{extract_elements, thread_frames};
use super::options::{ExtractMode, ParseOptions};
use super::resources::build_catalog;
use super::structure::{build_structure, read_metadata};
use super::text::reconstruct_story;

/// IDML document parser.
///
/// Holds the read package; [`IdmlParser::parse`] runs the pipeline and can
/// be called more than once.
pub struct IdmlParser {
    package: PackageContents,
    options: ParseOptions,
}

impl IdmlParser {
    /// Open an IDML file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open an IDML file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's an IDML package
        detect_format_from_path(path)?;

        let package = PackageContents::open(path, &options)?;
        Ok(Self { package, options })
    }

    /// Parse an IDML package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse an IDML package from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let package = PackageContents::from_bytes(data, &options)?;
        Ok(Self { package, options })
    }

    /// Parse an IDML package from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse an IDML package from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Use an already-read package.
    pub fn from_package(package: PackageContents, options: ParseOptions) -> Self {
        Self { package, options }
    }

    /// The package being parsed.
    pub fn package(&self) -> &PackageContents {
        &self.package
    }

    /// Parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Run the pipeline and build the document model.
    ///
    /// Fails only when the document has no pages; every other problem is
    /// recorded in [`DocumentModel::diagnostics`].
    pub fn parse(&self) -> Result<DocumentModel> {
        let mut ctx = ParseContext::new(self.options.clone());
        ctx.extend_diagnostics(self.package.diagnostics().iter().cloned());

        let catalog = build_catalog(&self.package, &mut ctx);
        log::debug!(
            "Catalog: {} style(s), {} color(s), {} font family(ies)",
            catalog.style_count(),
            catalog.colors.len(),
            catalog.fonts.len()
        );

        let mut metadata = read_metadata(&self.package);
        let mut structure = build_structure(&self.package, &catalog, &ctx)?;
        log::debug!(
            "Structure: {} spread(s), {} page(s)",
            structure.spreads.len(),
            structure.pages.len()
        );

        let mut elements = extract_elements(&self.package, &structure, &catalog, &mut ctx);

        let mut document = DocumentModel::new(self.options.dpi);

        if self.options.extract_mode == ExtractMode::Full {
            let threads = thread_frames(&elements);
            for path in self.package.story_paths() {
                let Some(root) = self.package.tree(&path) else {
                    continue;
                };
                let raw = self.package.raw_text(&path);
                let mut story = reconstruct_story(&path, root, raw, &catalog, &mut ctx);
                story.frame_ids = threads.get(&story.id).cloned().unwrap_or_default();
                if document.stories.contains_key(&story.id) {
                    log::warn!("Duplicate story {} in {}; keeping the first", story.id, path);
                    continue;
                }
                document.stories.insert(story.id.clone(), story);
            }
            log::debug!("Reconstructed {} story(ies)", document.stories.len());
        }

        let page_index = associate(&mut elements, &structure.pages, &mut ctx);
        apply_backgrounds(&mut structure.pages, &mut structure.spreads, &elements, &catalog);

        metadata.page_count = structure.pages.len();
        metadata.spread_count = structure.spreads.len();
        metadata.story_count = document.stories.len();
        metadata.element_count = elements.len();

        document.metadata = metadata;
        document.resources = catalog;
        document.spreads = structure.spreads;
        document.pages = structure.pages;
        document.master_spreads = structure.master_spreads;
        document.master_pages = structure.master_pages;
        document.coordinate_offset = structure.coordinate_offset;
        document.elements = elements.into_iter().map(|e| (e.id.clone(), e)).collect();
        document.page_index = page_index;
        document.diagnostics = ctx.into_diagnostics();

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{AssignmentStrategy, ElementKind};

    const DESIGNMAP: &str = r#"<Document DOMVersion="18.0" Name="flyer.indd">
  <idPkg:Spread src="Spreads/Spread_s1.xml"/>
  <idPkg:Story src="Stories/Story_u1.xml"/>
</Document>"#;

    const SPREAD: &str = r#"<idPkg:Spread><Spread Self="s1">
  <Page Self="p1" Name="1" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396"/>
  <Rectangle Self="bg" GeometricBounds="-10 -10 802 622" ItemTransform="1 0 0 1 0 -396" FillColor="Color/Paper"/>
  <TextFrame Self="tf1" ParentStory="u1" GeometricBounds="72 72 144 540" ItemTransform="1 0 0 1 0 -396"/>
  <Rectangle Self="bg" GeometricBounds="0 0 10 10" ItemTransform="1 0 0 1 0 -396"/>
</Spread></idPkg:Spread>"#;

    const STORY: &str = r#"<idPkg:Story><Story Self="u1">
  <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/$ID/NormalParagraphStyle">
    <CharacterStyleRange><Content>Hello</Content><Br/></CharacterStyleRange>
    <CharacterStyleRange><Content>World</Content></CharacterStyleRange>
  </ParagraphStyleRange>
</Story></idPkg:Story>"#;

    fn parser(options: ParseOptions) -> IdmlParser {
        let package = PackageContents::from_raw(
            [
                ("designmap.xml", DESIGNMAP),
                ("Spreads/Spread_s1.xml", SPREAD),
                ("Stories/Story_u1.xml", STORY),
            ],
            &options,
        )
        .unwrap();
        IdmlParser::from_package(package, options)
    }

    #[test]
    fn test_parse_full_pipeline() {
        let doc = parser(ParseOptions::default()).parse().unwrap();

        assert_eq!(doc.metadata.name.as_deref(), Some("flyer.indd"));
        assert_eq!(doc.metadata.page_count, 1);
        assert_eq!(doc.metadata.story_count, 1);
        assert_eq!(doc.metadata.element_count, 3);

        let story = doc.story("u1").unwrap();
        assert_eq!(story.text, "Hello\nWorld");
        assert_eq!(story.frame_ids, vec!["tf1"]);

        let tf = doc.element("tf1").unwrap();
        assert_eq!(tf.kind, ElementKind::TextFrame);
        assert_eq!(tf.page_id.as_deref(), Some("p1"));
        assert_eq!(tf.assignment, Some(AssignmentStrategy::SinglePageSpread));
        assert_eq!(doc.page_index["p1"].len(), 3);
    }

    #[test]
    fn test_duplicate_ids_are_renamed() {
        let doc = parser(ParseOptions::default()).parse().unwrap();
        assert!(doc.element("bg").is_some());
        assert!(doc.element("bg_2").is_some());
    }

    #[test]
    fn test_structure_only_skips_stories() {
        let doc = parser(ParseOptions::new().structure_only()).parse().unwrap();
        assert!(doc.stories.is_empty());
        assert_eq!(doc.elements.len(), 3);
    }

    #[test]
    fn test_not_a_package() {
        let result = IdmlParser::from_bytes(b"%PDF-1.7 not a zip");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
