//! Document-order trace of story fragments and breaks.
//!
//! The generic tree groups a run's `Content` and `Br` children by name, so
//! their interleaving is lost. The trace recovers it by scanning the raw
//! story text for the markers in the order they appear.

use std::sync::OnceLock;

use regex::Regex;

/// One text fragment and the breaks that immediately follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFragment {
    /// Fragment text, unescaped, processing instructions removed
    pub text: String,
    /// Break markers between this fragment and the next one
    pub breaks_after: usize,
}

impl TraceFragment {
    /// Create a fragment.
    pub fn new(text: impl Into<String>, breaks_after: usize) -> Self {
        Self {
            text: text.into(),
            breaks_after,
        }
    }
}

/// Markers of one character style range, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceRun {
    /// Breaks before the first fragment
    pub leading_breaks: usize,
    /// Fragments in order
    pub fragments: Vec<TraceFragment>,
}

impl TraceRun {
    /// Total break markers in the run.
    pub fn break_count(&self) -> usize {
        self.leading_breaks + self.fragments.iter().map(|f| f.breaks_after).sum::<usize>()
    }

    fn push_break(&mut self) {
        match self.fragments.last_mut() {
            Some(fragment) => fragment.breaks_after += 1,
            None => self.leading_breaks += 1,
        }
    }
}

/// Trace of a whole story file; runs are indexed in opening order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryTrace {
    /// Runs in the order their opening tags appear
    pub runs: Vec<TraceRun>,
}

fn marker_regex() -> &'static Regex {
    static MARKERS: OnceLock<Regex> = OnceLock::new();
    MARKERS.get_or_init(|| {
        Regex::new(concat!(
            r"(?s)<CharacterStyleRange(?:\s[^>]*?)?(?P<csr_empty>/?)>",
            r"|(?P<csr_end></CharacterStyleRange\s*>)",
            r"|(?P<content_empty><Content(?:\s[^>]*?)?/>)",
            r"|<Content(?:\s[^>]*?)?>(?P<content>.*?)</Content\s*>",
            r"|(?P<br><Br(?:\s[^>]*?)?/>|<Br(?:\s[^>]*?)?>\s*</Br\s*>)",
        ))
        .expect("marker pattern is valid")
    })
}

fn processing_instruction_regex() -> &'static Regex {
    static PI: OnceLock<Regex> = OnceLock::new();
    PI.get_or_init(|| Regex::new(r"(?s)<\?.*?\?>").expect("PI pattern is valid"))
}

fn element_tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("tag pattern is valid"))
}

/// Replace element tags nested in raw content with spaces and trim.
fn strip_element_tags(raw: &str) -> String {
    if !element_tag_regex().is_match(raw) {
        return raw.to_string();
    }
    let spaced = element_tag_regex().replace_all(raw, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip processing instructions and unescape entities of raw content.
pub fn clean_content(raw: &str) -> String {
    let stripped = processing_instruction_regex().replace_all(raw, "");
    match quick_xml::escape::unescape(&stripped) {
        Ok(text) => text.into_owned(),
        Err(_) => stripped.into_owned(),
    }
}

impl StoryTrace {
    /// Build a trace from explicit runs.
    pub fn from_runs(runs: Vec<TraceRun>) -> Self {
        Self { runs }
    }

    /// Scan raw story XML.
    ///
    /// Character style ranges nested inside another range (table cells,
    /// notes) get their own runs; markers attach to the innermost open run.
    /// Markers outside any run are ignored.
    pub fn scan(raw: &str) -> Self {
        let mut runs: Vec<TraceRun> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for caps in marker_regex().captures_iter(raw) {
            if let Some(empty) = caps.name("csr_empty") {
                runs.push(TraceRun::default());
                if empty.as_str().is_empty() {
                    open.push(runs.len() - 1);
                }
            } else if caps.name("csr_end").is_some() {
                open.pop();
            } else if let Some(&current) = open.last() {
                let run = &mut runs[current];
                if caps.name("br").is_some() {
                    run.push_break();
                } else if caps.name("content_empty").is_some() {
                    run.fragments.push(TraceFragment::new("", 0));
                } else if let Some(content) = caps.name("content") {
                    let text = clean_content(&strip_element_tags(content.as_str()));
                    run.fragments.push(TraceFragment::new(text, 0));
                }
            }
        }

        log::trace!("Scanned story trace with {} run(s)", runs.len());
        Self { runs }
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the trace has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_interleaving() {
        let raw = r#"<Story Self="u1">
  <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/P1">
    <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/A">
      <Content>A</Content>
      <Br />
      <Br/>
      <Content>B</Content>
    </CharacterStyleRange>
    <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/B">
      <Br/>
      <Content>C &amp; D</Content>
      <Br></Br>
    </CharacterStyleRange>
  </ParagraphStyleRange>
</Story>"#;

        let trace = StoryTrace::scan(raw);
        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace.runs[0].fragments,
            vec![TraceFragment::new("A", 2), TraceFragment::new("B", 0)]
        );
        assert_eq!(trace.runs[1].leading_breaks, 1);
        assert_eq!(trace.runs[1].fragments, vec![TraceFragment::new("C & D", 1)]);
        assert_eq!(trace.runs[1].break_count(), 2);
    }

    #[test]
    fn test_self_closing_run_and_empty_content() {
        let raw = r#"<CharacterStyleRange AppliedCharacterStyle="x"/>
<CharacterStyleRange><Content/><Content>z</Content></CharacterStyleRange>"#;
        let trace = StoryTrace::scan(raw);
        assert_eq!(trace.len(), 2);
        assert!(trace.runs[0].fragments.is_empty());
        assert_eq!(
            trace.runs[1].fragments,
            vec![TraceFragment::new("", 0), TraceFragment::new("z", 0)]
        );
    }

    #[test]
    fn test_processing_instructions_stripped() {
        let raw = "<CharacterStyleRange><Content>Page <?ACE 18?>of 3</Content></CharacterStyleRange>";
        let trace = StoryTrace::scan(raw);
        assert_eq!(trace.runs[0].fragments[0].text, "Page of 3");
    }

    #[test]
    fn test_nested_markup_in_content_is_stripped() {
        let raw = "<CharacterStyleRange><Content><Sup>2</Sup></Content><Content><Bogus/></Content></CharacterStyleRange>";
        let trace = StoryTrace::scan(raw);
        assert_eq!(
            trace.runs[0].fragments,
            vec![TraceFragment::new("2", 0), TraceFragment::new("", 0)]
        );
    }

    #[test]
    fn test_nested_runs_attach_to_innermost() {
        let raw = r#"<CharacterStyleRange><Content>before</Content>
<Table><Cell><ParagraphStyleRange><CharacterStyleRange><Content>cell</Content><Br/></CharacterStyleRange></ParagraphStyleRange></Cell></Table>
<Content>after</Content></CharacterStyleRange>"#;
        let trace = StoryTrace::scan(raw);
        assert_eq!(trace.len(), 2);
        let outer: Vec<_> = trace.runs[0].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(outer, vec!["before", "after"]);
        assert_eq!(trace.runs[1].fragments, vec![TraceFragment::new("cell", 1)]);
    }

    #[test]
    fn test_similar_tag_names_ignored() {
        let raw = "<CharacterStyleRange><ContentX>no</ContentX><Content>yes</Content><Break/></CharacterStyleRange>";
        let trace = StoryTrace::scan(raw);
        assert_eq!(trace.runs[0].fragments, vec![TraceFragment::new("yes", 0)]);
    }
}
