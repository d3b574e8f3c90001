//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const MIMETYPE: &str = "application/vnd.adobe.indesign-idml-package";

/// Zip the given files into an IDML package, mimetype first.
pub fn idml_zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(MIMETYPE.as_bytes()).unwrap();
    for (path, content) in files {
        writer.start_file(*path, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub const DESIGNMAP: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Document DOMVersion="18.0" Name="newsletter.indd">
  <idPkg:Graphic src="Resources/Graphic.xml"/>
  <idPkg:Styles src="Resources/Styles.xml"/>
  <idPkg:Preferences src="Resources/Preferences.xml"/>
  <idPkg:MasterSpread src="MasterSpreads/MasterSpread_ma.xml"/>
  <idPkg:Spread src="Spreads/Spread_s1.xml"/>
  <idPkg:Spread src="Spreads/Spread_s2.xml"/>
  <idPkg:Story src="Stories/Story_u1.xml"/>
  <idPkg:Story src="Stories/Story_u2.xml"/>
</Document>"#;

pub const STYLES: &str = r#"<idPkg:Styles>
  <RootParagraphStyleGroup>
    <ParagraphStyle Self="ParagraphStyle/$ID/NormalParagraphStyle" Name="$ID/NormalParagraphStyle" PointSize="12" AppliedFont="Minion Pro"/>
    <ParagraphStyle Self="ParagraphStyle/P1" Name="P1" BasedOn="ParagraphStyle/$ID/NormalParagraphStyle" PointSize="10"/>
    <ParagraphStyle Self="ParagraphStyle/Heading" Name="Heading" BasedOn="ParagraphStyle/P1" PointSize="24" FontStyle="Bold"/>
  </RootParagraphStyleGroup>
  <RootCharacterStyleGroup>
    <CharacterStyle Self="CharacterStyle/$ID/[No character style]" Name="$ID/[No character style]"/>
    <CharacterStyle Self="CharacterStyle/Big" Name="Big" PointSize="14"/>
  </RootCharacterStyleGroup>
</idPkg:Styles>"#;

pub const GRAPHIC: &str = r#"<idPkg:Graphic>
  <Color Self="Color/Paper" Name="Paper" Model="Process" Space="CMYK" ColorValue="0 0 0 0"/>
  <Color Self="Color/Black" Name="Black" Model="Process" Space="CMYK" ColorValue="0 0 0 100"/>
  <Color Self="Color/Cream" Name="Cream" Model="Process" Space="CMYK" ColorValue="0 3 12 0"/>
  <Swatch Self="Swatch/None" Name="None"/>
</idPkg:Graphic>"#;

pub const PREFERENCES: &str = r#"<idPkg:Preferences>
  <DocumentPreference PageWidth="612" PageHeight="792" FacingPages="true"/>
  <ViewPreference HorizontalMeasurementUnits="Points"/>
</idPkg:Preferences>"#;

pub const MASTER: &str = r#"<idPkg:MasterSpread><MasterSpread Self="ma" NamePrefix="A" BaseName="Master">
  <Page Self="mp1" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396"/>
  <TextFrame Self="mtf" GeometricBounds="0 0 20 100" ItemTransform="1 0 0 1 0 -396"/>
</MasterSpread></idPkg:MasterSpread>"#;

/// Spread 1: one page, a cream background and the first frame of story u1.
pub const SPREAD_1: &str = r#"<idPkg:Spread><Spread Self="s1">
  <Page Self="p1" Name="1" AppliedMaster="ma" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396"/>
  <Rectangle Self="bg1" ContentType="Unassigned" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396" FillColor="Color/Cream"/>
  <TextFrame Self="tf1" ParentStory="u1" NextTextFrame="tf2" GeometricBounds="72 72 360 540" ItemTransform="1 0 0 1 0 -396"/>
</Spread></idPkg:Spread>"#;

/// Spread 2: a facing pair; page p2 left of the spine, p3 right of it.
pub const SPREAD_2: &str = r#"<idPkg:Spread><Spread Self="s2">
  <Page Self="p2" Name="2" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 -612 -396"/>
  <Page Self="p3" Name="3" GeometricBounds="0 0 792 612" ItemTransform="1 0 0 1 0 -396"/>
  <TextFrame Self="tf2" ParentStory="u1" PreviousTextFrame="tf1" GeometricBounds="72 72 360 540" ItemTransform="1 0 0 1 -612 -396"/>
  <TextFrame Self="tf3" ParentStory="u2" GeometricBounds="72 72 360 540" ItemTransform="1 0 0 1 0 -396"/>
  <Rectangle Self="photo" GeometricBounds="400 72 700 540" ItemTransform="1 0 0 1 0 -396">
    <Image Self="img1"><Link Self="lnk1" LinkResourceURI="file:/images/photo.jpg"/></Image>
  </Rectangle>
  <Group Self="grp" ItemTransform="1 0 0 1 -612 0">
    <Oval Self="dot" GeometricBounds="400 100 420 120" ItemTransform="1 0 0 1 0 -396"/>
  </Group>
  <GraphicLine Self="far" GeometricBounds="5000 5000 5000 5100" ItemTransform="1 0 0 1 0 0"/>
</Spread></idPkg:Spread>"#;

pub const STORY_1: &str = r#"<idPkg:Story DOMVersion="18.0">
  <Story Self="u1" StoryTitle="$ID/">
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/P1">
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/Big">
        <Content>Intro</Content>
        <Br/>
      </CharacterStyleRange>
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/Big">
        <Content>Body</Content>
      </CharacterStyleRange>
    </ParagraphStyleRange>
  </Story>
</idPkg:Story>"#;

pub const STORY_2: &str = r#"<idPkg:Story DOMVersion="18.0">
  <Story Self="u2" StoryTitle="Sidebar">
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Heading">
      <CharacterStyleRange><Content>News</Content></CharacterStyleRange>
    </ParagraphStyleRange>
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/P1">
      <CharacterStyleRange><Content>Hel</Content></CharacterStyleRange>
      <CharacterStyleRange><Content>lo.</Content></CharacterStyleRange>
      <CharacterStyleRange><Content>World</Content></CharacterStyleRange>
    </ParagraphStyleRange>
  </Story>
</idPkg:Story>"#;

/// Every file of the newsletter fixture.
pub fn newsletter_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("designmap.xml", DESIGNMAP),
        ("Resources/Styles.xml", STYLES),
        ("Resources/Graphic.xml", GRAPHIC),
        ("Resources/Preferences.xml", PREFERENCES),
        ("MasterSpreads/MasterSpread_ma.xml", MASTER),
        ("Spreads/Spread_s1.xml", SPREAD_1),
        ("Spreads/Spread_s2.xml", SPREAD_2),
        ("Stories/Story_u1.xml", STORY_1),
        ("Stories/Story_u2.xml", STORY_2),
        ("META-INF/container.xml", "<container/>"),
    ]
}

/// The newsletter fixture as package bytes.
pub fn newsletter() -> Vec<u8> {
    idml_zip(&newsletter_files())
}
