//! IDML package contents.
//!
//! A package is a zip archive of XML files. [`PackageContents`] holds one
//! generic tree per file plus the raw text of story files, which text
//! reconstruction needs to recover the order of fragments and breaks.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use indexmap::IndexMap;
use zip::ZipArchive;

use crate::error::{Diagnostic, DiagnosticKind, Error, Result, Stage};
use crate::parser::ParseOptions;
use crate::tree::{self, XmlElement};

/// Path of the package manifest.
pub const DESIGNMAP_PATH: &str = "designmap.xml";

/// Path of the XMP metadata file.
pub const METADATA_PATH: &str = "META-INF/metadata.xml";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Resource files read by the style and color resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFile {
    /// `Resources/Styles.xml`
    Styles,
    /// `Resources/Graphic.xml`
    Graphic,
    /// `Resources/Fonts.xml`
    Fonts,
    /// `Resources/Preferences.xml`
    Preferences,
}

impl ResourceFile {
    /// Package path of the resource.
    pub fn path(self) -> &'static str {
        match self {
            ResourceFile::Styles => "Resources/Styles.xml",
            ResourceFile::Graphic => "Resources/Graphic.xml",
            ResourceFile::Fonts => "Resources/Fonts.xml",
            ResourceFile::Preferences => "Resources/Preferences.xml",
        }
    }
}

/// What a package file is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    /// Style, color, font, or preference resources
    Resource(ResourceFile),
    /// `designmap.xml`
    Designmap,
    /// `Spreads/*.xml`
    Spread,
    /// `MasterSpreads/*.xml`
    MasterSpread,
    /// `META-INF/metadata.xml`
    Metadata,
    /// `Stories/*.xml`
    Story,
    /// Anything the pipeline ignores
    Other,
}

impl FileClass {
    /// Classify a package path.
    pub fn of(path: &str) -> FileClass {
        match path {
            DESIGNMAP_PATH => return FileClass::Designmap,
            METADATA_PATH => return FileClass::Metadata,
            _ => {}
        }
        for resource in [
            ResourceFile::Styles,
            ResourceFile::Graphic,
            ResourceFile::Fonts,
            ResourceFile::Preferences,
        ] {
            if path == resource.path() {
                return FileClass::Resource(resource);
            }
        }
        if !path.ends_with(".xml") {
            return FileClass::Other;
        }
        if path.starts_with("Spreads/") {
            FileClass::Spread
        } else if path.starts_with("MasterSpreads/") {
            FileClass::MasterSpread
        } else if path.starts_with("Stories/") {
            FileClass::Story
        } else {
            FileClass::Other
        }
    }

    /// Whether raw text is kept for files of this class.
    fn keeps_raw_text(self) -> bool {
        matches!(self, FileClass::Story)
    }
}

/// Normalize an archive path to forward slashes without a leading `./` or `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").trim_start_matches('/').to_string()
}

/// Parsed package files.
#[derive(Debug, Clone, Default)]
pub struct PackageContents {
    trees: IndexMap<String, XmlElement>,
    raw: HashMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl PackageContents {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package file from disk.
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, options)
    }

    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8], options: &ParseOptions) -> Result<Self> {
        Self::from_reader(Cursor::new(data), options)
    }

    /// Read a package from a seekable reader.
    ///
    /// Fails with [`Error::MalformedArchive`] when the zip cannot be read or
    /// has no `designmap.xml`. Individual XML files that fail to parse are
    /// skipped with a diagnostic unless strict mode is enabled.
    pub fn from_reader<R: Read + Seek>(reader: R, options: &ParseOptions) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let path = normalize_path(entry.name());
            if !path.ends_with(".xml") {
                continue;
            }
            let declared = entry.size().min(MAX_PREALLOCATION) as usize;
            let mut bytes = Vec::with_capacity(declared);
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| Error::archive(format!("cannot read {}: {}", path, e)))?;
            files.push((path, bytes));
        }

        if !files.iter().any(|(path, _)| path == DESIGNMAP_PATH) {
            return Err(Error::archive(format!("{} not found", DESIGNMAP_PATH)));
        }
        log::debug!("Read {} XML entries from archive", files.len());

        let mut package = Self::new();
        for (path, bytes) in files {
            match String::from_utf8(bytes) {
                Ok(text) => package.insert_raw(&path, text, options)?,
                Err(e) => package.reject(
                    &path,
                    Error::MalformedXml {
                        file: path.clone(),
                        message: format!("invalid UTF-8: {}", e),
                    },
                    options,
                )?,
            }
        }
        Ok(package)
    }

    /// Build a package from raw XML text keyed by path.
    pub fn from_raw<I, K, V>(files: I, options: &ParseOptions) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut package = Self::new();
        for (path, text) in files {
            package.insert_raw(&normalize_path(path.as_ref()), text.into(), options)?;
        }
        Ok(package)
    }

    /// Build a package from already-parsed trees.
    ///
    /// `raw_stories` supplies the unparsed text of story files; stories
    /// without it are reconstructed from the tree alone.
    pub fn from_trees<I>(trees: I, raw_stories: HashMap<String, String>) -> Self
    where
        I: IntoIterator<Item = (String, XmlElement)>,
    {
        let mut package = Self::new();
        for (path, tree) in trees {
            package.insert_tree(&normalize_path(&path), tree);
        }
        for (path, text) in raw_stories {
            package.raw.insert(normalize_path(&path), text);
        }
        package
    }

    /// Build a package from a JSON object mapping paths to prefix-keyed
    /// element objects (see [`tree::document_from_json`]).
    pub fn from_json(value: &serde_json::Value, raw_stories: HashMap<String, String>) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::archive("package JSON must be an object keyed by path"))?;
        let mut package = Self::new();
        for (path, document) in map {
            let path = normalize_path(path);
            match tree::document_from_json(document) {
                Some(root) => package.insert_tree(&path, root),
                None => package.diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MalformedXml, Stage::Tree, "no root element")
                        .in_file(path.clone()),
                ),
            }
        }
        for (path, text) in raw_stories {
            package.raw.insert(normalize_path(&path), text);
        }
        Ok(package)
    }

    /// Parse and insert one file.
    pub fn insert_raw(&mut self, path: &str, text: String, options: &ParseOptions) -> Result<()> {
        match tree::parse_xml(path, &text) {
            Ok(root) => {
                if FileClass::of(path).keeps_raw_text() {
                    self.raw.insert(path.to_string(), text);
                }
                self.insert_tree(path, root);
                Ok(())
            }
            Err(err) => self.reject(path, err, options),
        }
    }

    /// Insert a parsed tree.
    pub fn insert_tree(&mut self, path: &str, tree: XmlElement) {
        self.trees.insert(path.to_string(), tree);
    }

    fn reject(&mut self, path: &str, err: Error, options: &ParseOptions) -> Result<()> {
        if options.is_strict() {
            return Err(err);
        }
        log::warn!("Skipping {}: {}", path, err);
        let message = match &err {
            Error::MalformedXml { message, .. } => message.clone(),
            other => other.to_string(),
        };
        self.diagnostics.push(
            Diagnostic::new(DiagnosticKind::MalformedXml, Stage::Tree, message).in_file(path),
        );
        Ok(())
    }

    /// Tree of a file.
    pub fn tree(&self, path: &str) -> Option<&XmlElement> {
        self.trees.get(path)
    }

    /// Raw text of a story file.
    pub fn raw_text(&self, path: &str) -> Option<&str> {
        self.raw.get(path).map(String::as_str)
    }

    /// All file paths, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Number of parsed files.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the package has no parsed files.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Tree of a resource file.
    pub fn resource(&self, resource: ResourceFile) -> Option<&XmlElement> {
        self.tree(resource.path())
    }

    /// The designmap tree.
    pub fn designmap(&self) -> Option<&XmlElement> {
        self.tree(DESIGNMAP_PATH)
    }

    /// The XMP metadata tree.
    pub fn metadata(&self) -> Option<&XmlElement> {
        self.tree(METADATA_PATH)
    }

    /// Spread files in document order.
    pub fn spread_paths(&self) -> Vec<String> {
        self.ordered_paths(FileClass::Spread, "idPkg:Spread")
    }

    /// Master spread files in document order.
    pub fn master_spread_paths(&self) -> Vec<String> {
        self.ordered_paths(FileClass::MasterSpread, "idPkg:MasterSpread")
    }

    /// Story files in document order.
    pub fn story_paths(&self) -> Vec<String> {
        self.ordered_paths(FileClass::Story, "idPkg:Story")
    }

    /// Files of one class: designmap order first, then any files the
    /// designmap does not list, in sorted path order.
    fn ordered_paths(&self, class: FileClass, designmap_key: &str) -> Vec<String> {
        let mut ordered: Vec<String> = Vec::new();
        if let Some(designmap) = self.designmap() {
            for entry in designmap.children(designmap_key) {
                if let Some(src) = entry.attr_text("src") {
                    let path = normalize_path(&src);
                    if self.trees.contains_key(&path) && !ordered.contains(&path) {
                        ordered.push(path);
                    }
                }
            }
        }

        let mut rest: Vec<String> = self
            .trees
            .keys()
            .filter(|path| FileClass::of(path) == class && !ordered.contains(*path))
            .cloned()
            .collect();
        rest.sort();
        ordered.extend(rest);
        ordered
    }

    /// Diagnostics recorded while reading the package.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const DESIGNMAP: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Document DOMVersion="18.0" Self="d" Name="sample">
  <idPkg:Spread src="Spreads/Spread_b.xml"/>
  <idPkg:Spread src="Spreads/Spread_a.xml"/>
  <idPkg:Story src="Stories/Story_u1.xml"/>
</Document>"#;

    fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_classify() {
        assert_eq!(FileClass::of("designmap.xml"), FileClass::Designmap);
        assert_eq!(
            FileClass::of("Resources/Graphic.xml"),
            FileClass::Resource(ResourceFile::Graphic)
        );
        assert_eq!(FileClass::of("Spreads/Spread_u1.xml"), FileClass::Spread);
        assert_eq!(FileClass::of("MasterSpreads/MasterSpread_u2.xml"), FileClass::MasterSpread);
        assert_eq!(FileClass::of("Stories/Story_u3.xml"), FileClass::Story);
        assert_eq!(FileClass::of("XML/Tags.xml"), FileClass::Other);
        assert_eq!(FileClass::of("META-INF/container.xml"), FileClass::Other);
    }

    #[test]
    fn test_designmap_order_is_authoritative() {
        let package = PackageContents::from_raw(
            [
                ("designmap.xml", DESIGNMAP),
                ("Spreads/Spread_a.xml", "<idPkg:Spread/>"),
                ("Spreads/Spread_b.xml", "<idPkg:Spread/>"),
                ("Spreads/Spread_c.xml", "<idPkg:Spread/>"),
            ],
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(
            package.spread_paths(),
            vec!["Spreads/Spread_b.xml", "Spreads/Spread_a.xml", "Spreads/Spread_c.xml"]
        );
    }

    #[test]
    fn test_story_raw_text_kept() {
        let story = "<idPkg:Story><Story Self=\"u1\"/></idPkg:Story>";
        let package = PackageContents::from_raw(
            [("Stories/Story_u1.xml", story), ("Resources/Styles.xml", "<idPkg:Styles/>")],
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(package.raw_text("Stories/Story_u1.xml"), Some(story));
        assert!(package.raw_text("Resources/Styles.xml").is_none());
        assert!(package.resource(ResourceFile::Styles).is_some());
    }

    #[test]
    fn test_malformed_file_lenient_and_strict() {
        let files = [("designmap.xml", DESIGNMAP), ("Stories/Story_u1.xml", "<Story><Content>")];

        let package = PackageContents::from_raw(files, &ParseOptions::default()).unwrap();
        assert!(package.tree("Stories/Story_u1.xml").is_none());
        assert_eq!(package.diagnostics().len(), 1);
        assert_eq!(package.diagnostics()[0].kind, DiagnosticKind::MalformedXml);

        let result = PackageContents::from_raw(files, &ParseOptions::default().strict());
        assert!(matches!(result, Err(Error::MalformedXml { .. })));
    }

    #[test]
    fn test_zip_round_trip() {
        let bytes = zip_bytes(&[
            ("mimetype", crate::detect::IDML_MIMETYPE),
            ("designmap.xml", DESIGNMAP),
            ("Spreads/Spread_a.xml", "<idPkg:Spread><Spread Self=\"a\"/></idPkg:Spread>"),
        ]);
        let package = PackageContents::from_bytes(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(package.len(), 2);
        assert!(package.designmap().is_some());
        assert_eq!(package.spread_paths(), vec!["Spreads/Spread_a.xml"]);
    }

    #[test]
    fn test_zip_without_designmap() {
        let bytes = zip_bytes(&[("Spreads/Spread_a.xml", "<idPkg:Spread/>")]);
        let result = PackageContents::from_bytes(&bytes, &ParseOptions::default());
        assert!(matches!(result, Err(Error::MalformedArchive { .. })));
    }

    #[test]
    fn test_corrupt_entry_is_malformed_archive() {
        let story = "<idPkg:Story><Story Self=\"u1\"><Content>checksum payload</Content></Story></idPkg:Story>";
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in [("designmap.xml", DESIGNMAP), ("Stories/Story_u1.xml", story)] {
            writer.start_file(name, stored).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let mut bytes = writer.finish().unwrap().into_inner();

        let needle = b"checksum payload";
        let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
        bytes[at] = b'C';

        let result = PackageContents::from_bytes(&bytes, &ParseOptions::default());
        match result {
            Err(Error::MalformedArchive { message, .. }) => {
                assert!(message.contains("Stories/Story_u1.xml"));
            }
            other => panic!("expected a malformed archive, got {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn test_not_a_zip() {
        let result = PackageContents::from_bytes(b"definitely not a zip", &ParseOptions::default());
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::MalformedArchive { .. } | Error::Io(_)));
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!({
            "designmap.xml": { "Document": { "@_Name": "doc" } },
            "Stories/Story_u1.xml": { "idPkg:Story": { "Story": { "@_Self": "u1" } } },
            "Broken.xml": "nope"
        });
        let package = PackageContents::from_json(&value, HashMap::new()).unwrap();
        assert_eq!(package.len(), 2);
        assert_eq!(package.story_paths(), vec!["Stories/Story_u1.xml"]);
        assert_eq!(package.diagnostics().len(), 1);
    }
}
