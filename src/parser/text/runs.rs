//! Collecting style ranges and turning each run into text and break pieces.

use crate::model::BreakType;
use crate::tree::XmlElement;

use super::trace::{clean_content, StoryTrace, TraceRun};

/// Elements that wrap runs without changing their formatting.
pub const RUN_WRAPPERS: [&str; 4] = [
    "HyperlinkTextSource",
    "XMLElement",
    "Change",
    "HyperlinkTextDestination",
];

/// Visible marker emitted for content that cannot be read.
pub const UNREADABLE_MARKER: &str = "[unreadable text]";

/// One output piece of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text without line breaks
    Text(String),
    /// A line break
    Break(BreakType),
}

impl Piece {
    /// Emitted text of the piece.
    pub fn as_str(&self) -> &str {
        match self {
            Piece::Text(text) => text,
            Piece::Break(_) => "\n",
        }
    }
}

/// Join the emitted text of a piece sequence.
pub fn pieces_text(pieces: &[Piece]) -> String {
    pieces.iter().map(Piece::as_str).collect()
}

/// Paragraph style ranges of a story, through wrappers.
///
/// A story whose runs sit directly under it (no paragraph ranges) is
/// treated as one paragraph.
pub fn story_paragraphs(story: &XmlElement) -> Vec<&XmlElement> {
    let mut paragraphs = Vec::new();
    collect_through_wrappers(story, "ParagraphStyleRange", &mut paragraphs);
    if paragraphs.is_empty() && !paragraph_runs(story).is_empty() {
        paragraphs.push(story);
    }
    paragraphs
}

/// Character style ranges of a paragraph, directly and through wrappers.
/// Tables and notes are not walked.
pub fn paragraph_runs(paragraph: &XmlElement) -> Vec<&XmlElement> {
    let mut runs = Vec::new();
    collect_through_wrappers(paragraph, "CharacterStyleRange", &mut runs);
    runs
}

fn collect_through_wrappers<'a>(parent: &'a XmlElement, tag: &str, out: &mut Vec<&'a XmlElement>) {
    out.extend(parent.children(tag));
    for wrapper in RUN_WRAPPERS {
        for child in parent.children(wrapper) {
            collect_through_wrappers(child, tag, out);
        }
    }
}

/// Text of a run's `Content` children as the tree sees them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeRun {
    /// Fragment texts in order; `None` for unreadable content
    pub fragments: Vec<Option<String>>,
    /// Text found under each unreadable fragment's child elements
    pub salvaged: Vec<Option<String>>,
    /// Number of `Br` children
    pub breaks: usize,
}

impl TreeRun {
    /// Read a `CharacterStyleRange` element.
    pub fn read(run: &XmlElement) -> Self {
        let contents = run.children("Content");
        let fragments = contents
            .iter()
            .map(|content| match content.text() {
                Some(text) => Some(clean_content_tree(&text)),
                None if content.has_children() => None,
                None => Some(String::new()),
            })
            .collect::<Vec<_>>();
        let salvaged = contents
            .iter()
            .zip(&fragments)
            .map(|(content, fragment)| match fragment {
                Some(_) => None,
                None => descendant_text(content),
            })
            .collect();
        Self {
            fragments,
            salvaged,
            breaks: run.children("Br").len(),
        }
    }

    /// Whether any fragment could not be read.
    pub fn is_malformed(&self) -> bool {
        self.fragments.iter().any(Option::is_none)
    }

    /// Whether the run has neither fragments nor breaks.
    pub fn is_bare(&self) -> bool {
        self.fragments.is_empty() && self.breaks == 0
    }
}

/// Text of all descendants joined by spaces; `None` when there is none.
fn descendant_text(element: &XmlElement) -> Option<String> {
    fn collect(element: &XmlElement, out: &mut Vec<String>) {
        for child in element.all_children() {
            if let Some(text) = child.text().filter(|t| !t.trim().is_empty()) {
                out.push(text.into_owned());
            }
            collect(child, out);
        }
    }
    let mut parts = Vec::new();
    collect(element, &mut parts);
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn clean_content_tree(text: &str) -> String {
    if text.contains("<?") {
        clean_content(text)
    } else {
        text.to_string()
    }
}

fn fragment_matches(tree: &str, traced: &str) -> bool {
    if tree == traced {
        return true;
    }
    match (tree.trim().parse::<f64>(), traced.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Same break and fragment counts, and every readable fragment matches.
/// Unreadable fragments pair with whatever fragment sits at their position.
fn run_matches(tree: &TreeRun, traced: &TraceRun) -> bool {
    tree.breaks == traced.break_count()
        && tree.fragments.len() == traced.fragments.len()
        && tree
            .fragments
            .iter()
            .zip(&traced.fragments)
            .all(|(t, f)| t.as_deref().map_or(true, |t| fragment_matches(t, &f.text)))
}

/// Matches tree runs to trace runs in document order.
#[derive(Debug)]
pub struct TraceMatcher<'a> {
    trace: &'a StoryTrace,
    cursor: usize,
    used: Vec<bool>,
}

impl<'a> TraceMatcher<'a> {
    /// Create a matcher over a story trace.
    pub fn new(trace: &'a StoryTrace) -> Self {
        Self {
            trace,
            cursor: 0,
            used: vec![false; trace.len()],
        }
    }

    /// Find the trace run of a tree run.
    ///
    /// Searches forward from the cursor first, then the unused runs before
    /// it. A match moves the cursor past the matched run.
    pub fn find(&mut self, tree: &TreeRun) -> Option<(usize, &'a TraceRun)> {
        let trace = self.trace;
        let candidates = (self.cursor..trace.len()).chain(0..self.cursor.min(trace.len()));
        for index in candidates {
            if !self.used[index] && run_matches(tree, &trace.runs[index]) {
                self.used[index] = true;
                self.cursor = index + 1;
                return Some((index, &trace.runs[index]));
            }
        }
        None
    }
}

/// Split text on line and paragraph separators.
///
/// CRLF and CR become LF; LF and U+2028 are explicit breaks, U+2029 is a
/// paragraph break.
pub fn split_text(text: &str, out: &mut Vec<Piece>) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut current = String::new();
    for c in normalized.chars() {
        let kind = match c {
            '\n' | '\u{2028}' => BreakType::Explicit,
            '\u{2029}' => BreakType::Paragraph,
            _ => {
                current.push(c);
                continue;
            }
        };
        if !current.is_empty() {
            out.push(Piece::Text(std::mem::take(&mut current)));
        }
        out.push(Piece::Break(kind));
    }
    if !current.is_empty() {
        out.push(Piece::Text(current));
    }
}

fn push_breaks(count: usize, out: &mut Vec<Piece>) {
    out.extend(std::iter::repeat(Piece::Break(BreakType::Explicit)).take(count));
}

/// Pieces of a run using its document-order trace.
pub fn pieces_from_trace(run: &TraceRun) -> Vec<Piece> {
    let mut pieces = Vec::new();
    push_breaks(run.leading_breaks, &mut pieces);
    for fragment in &run.fragments {
        split_text(&fragment.text, &mut pieces);
        push_breaks(fragment.breaks_after, &mut pieces);
    }
    pieces
}

/// Pieces of a malformed run from the trace run paired with it.
///
/// `None` when the trace holds no text for one of the unreadable fragments.
pub fn pieces_from_paired_trace(tree: &TreeRun, traced: &TraceRun) -> Option<Vec<Piece>> {
    let recovered = tree
        .fragments
        .iter()
        .zip(&traced.fragments)
        .all(|(fragment, traced)| fragment.is_some() || !traced.text.trim().is_empty());
    recovered.then(|| pieces_from_trace(traced))
}

/// Breaks after each fragment when no trace is available.
///
/// Breaks are split evenly across the non-terminal fragments with the
/// remainder going to the later ones. The terminal fragment gets none,
/// except that a single fragment is followed by all breaks.
pub fn distribute_breaks(fragments: usize, breaks: usize) -> Vec<usize> {
    match fragments {
        0 => Vec::new(),
        1 => vec![breaks],
        n => {
            let slots = n - 1;
            let (base, remainder) = (breaks / slots, breaks % slots);
            let mut counts: Vec<usize> = (0..slots)
                .map(|i| base + usize::from(i >= slots - remainder))
                .collect();
            counts.push(0);
            counts
        }
    }
}

/// Pieces of a run without a trace.
///
/// Unreadable fragments use their salvaged text, or become
/// [`UNREADABLE_MARKER`] when there is none. Returns the pieces and whether a
/// marker was emitted.
pub fn pieces_without_trace(tree: &TreeRun) -> (Vec<Piece>, bool) {
    let mut pieces = Vec::new();
    let mut marked = false;

    if tree.fragments.is_empty() {
        push_breaks(tree.breaks, &mut pieces);
        return (pieces, false);
    }

    let counts = distribute_breaks(tree.fragments.len(), tree.breaks);
    for (index, (fragment, breaks)) in tree.fragments.iter().zip(counts).enumerate() {
        let salvaged = tree.salvaged.get(index).and_then(Option::as_deref);
        match (fragment.as_deref(), salvaged) {
            (Some(text), _) | (None, Some(text)) => split_text(text, &mut pieces),
            (None, None) => {
                pieces.push(Piece::Text(UNREADABLE_MARKER.to_string()));
                marked = true;
            }
        }
        push_breaks(breaks, &mut pieces);
    }
    (pieces, marked)
}

/// Best-effort text of a run with neither content nor breaks: the text of
/// any other child element, in child-key order.
pub fn best_effort_pieces(run: &XmlElement) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for (name, children) in &run.children {
        if matches!(name.as_str(), "Properties" | "Content" | "Br") {
            continue;
        }
        for child in children {
            if let Some(text) = child.text() {
                split_text(&text, &mut pieces);
            }
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::text::trace::TraceFragment;

    fn content(text: &str) -> XmlElement {
        XmlElement::new("Content").with_text(text)
    }

    #[test]
    fn test_runs_through_wrappers() {
        let paragraph = XmlElement::new("ParagraphStyleRange")
            .with_child(XmlElement::new("CharacterStyleRange").with_attr("Self", "a"))
            .with_child(
                XmlElement::new("HyperlinkTextSource").with_child(
                    XmlElement::new("CharacterStyleRange").with_attr("Self", "b"),
                ),
            )
            .with_child(XmlElement::new("Table").with_child(
                XmlElement::new("Cell").with_child(XmlElement::new("CharacterStyleRange")),
            ));
        let ids: Vec<_> = paragraph_runs(&paragraph)
            .iter()
            .filter_map(|r| r.attr_text("Self"))
            .map(|s| s.into_owned())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_story_without_paragraph_ranges() {
        let story = XmlElement::new("Story")
            .with_child(XmlElement::new("CharacterStyleRange").with_child(content("x")));
        assert_eq!(story_paragraphs(&story).len(), 1);
        assert!(story_paragraphs(&XmlElement::new("Story")).is_empty());
    }

    #[test]
    fn test_distribute_breaks() {
        assert_eq!(distribute_breaks(1, 3), vec![3]);
        assert_eq!(distribute_breaks(2, 3), vec![3, 0]);
        assert_eq!(distribute_breaks(3, 3), vec![1, 2, 0]);
        assert_eq!(distribute_breaks(4, 4), vec![1, 1, 2, 0]);
        assert_eq!(distribute_breaks(3, 0), vec![0, 0, 0]);
    }

    #[test]
    fn test_pieces_from_trace() {
        let run = TraceRun {
            leading_breaks: 1,
            fragments: vec![TraceFragment::new("A", 2), TraceFragment::new("B", 0)],
        };
        let pieces = pieces_from_trace(&run);
        assert_eq!(pieces_text(&pieces), "\nA\n\nB");
    }

    #[test]
    fn test_matcher_skips_table_runs() {
        let trace = StoryTrace::from_runs(vec![
            TraceRun {
                leading_breaks: 0,
                fragments: vec![TraceFragment::new("cell", 0)],
            },
            TraceRun {
                leading_breaks: 0,
                fragments: vec![TraceFragment::new("body", 1)],
            },
        ]);
        let mut matcher = TraceMatcher::new(&trace);
        let tree = TreeRun {
            fragments: vec![Some("body".into())],
            breaks: 1,
            ..Default::default()
        };
        assert_eq!(matcher.find(&tree).map(|(i, _)| i), Some(1));
        // Already used
        assert!(matcher.find(&tree).is_none());
    }

    #[test]
    fn test_numeric_fragments_match_leniently() {
        let trace = StoryTrace::from_runs(vec![TraceRun {
            leading_breaks: 0,
            fragments: vec![TraceFragment::new("2.50", 0)],
        }]);
        let mut matcher = TraceMatcher::new(&trace);
        let tree = TreeRun {
            fragments: vec![Some("2.5".into())],
            breaks: 0,
            ..Default::default()
        };
        assert!(matcher.find(&tree).is_some());
    }

    #[test]
    fn test_unreadable_content_marker() {
        let run = XmlElement::new("CharacterStyleRange")
            .with_child(XmlElement::new("Content").with_child(XmlElement::new("Garbage")));
        let tree = TreeRun::read(&run);
        assert!(tree.is_malformed());
        let (pieces, marked) = pieces_without_trace(&tree);
        assert!(marked);
        assert_eq!(pieces, vec![Piece::Text(UNREADABLE_MARKER.to_string())]);
    }

    #[test]
    fn test_malformed_run_pairs_with_trace_by_position() {
        let trace = StoryTrace::from_runs(vec![
            TraceRun {
                leading_breaks: 0,
                fragments: vec![TraceFragment::new("other", 0), TraceFragment::new("x", 0)],
            },
            TraceRun {
                leading_breaks: 0,
                fragments: vec![TraceFragment::new("E = mc", 0), TraceFragment::new("2", 1)],
            },
        ]);
        let tree = TreeRun {
            fragments: vec![Some("E = mc".into()), None],
            salvaged: vec![None, Some("2".into())],
            breaks: 1,
        };
        let mut matcher = TraceMatcher::new(&trace);
        let (index, traced) = matcher.find(&tree).unwrap();
        assert_eq!(index, 1);
        let pieces = pieces_from_paired_trace(&tree, traced).unwrap();
        assert_eq!(pieces_text(&pieces), "E = mc2\n");
    }

    #[test]
    fn test_paired_trace_without_text_is_rejected() {
        let traced = TraceRun {
            leading_breaks: 0,
            fragments: vec![TraceFragment::new("", 0)],
        };
        let tree = TreeRun {
            fragments: vec![None],
            salvaged: vec![None],
            breaks: 0,
        };
        assert!(pieces_from_paired_trace(&tree, &traced).is_none());
    }

    #[test]
    fn test_unreadable_content_is_salvaged_from_children() {
        let run = XmlElement::new("CharacterStyleRange").with_child(
            XmlElement::new("Content")
                .with_child(XmlElement::new("Sup").with_text("TM"))
                .with_child(XmlElement::new("Note").with_child(XmlElement::new("Para").with_text("see"))),
        );
        let tree = TreeRun::read(&run);
        assert!(tree.is_malformed());
        assert_eq!(tree.salvaged, vec![Some("TM see".to_string())]);

        let (pieces, marked) = pieces_without_trace(&tree);
        assert!(!marked);
        assert_eq!(pieces_text(&pieces), "TM see");
    }

    #[test]
    fn test_split_special_characters() {
        let mut pieces = Vec::new();
        split_text("a\u{2028}b\u{2029}c\r\nd", &mut pieces);
        assert_eq!(
            pieces,
            vec![
                Piece::Text("a".into()),
                Piece::Break(BreakType::Explicit),
                Piece::Text("b".into()),
                Piece::Break(BreakType::Paragraph),
                Piece::Text("c".into()),
                Piece::Break(BreakType::Explicit),
                Piece::Text("d".into()),
            ]
        );
    }

    #[test]
    fn test_best_effort_pieces() {
        let run = XmlElement::new("CharacterStyleRange")
            .with_child(XmlElement::new("Properties").with_child(content("skip")))
            .with_child(XmlElement::new("TextVariableInstance").with_text("Chapter 1"));
        assert_eq!(pieces_text(&best_effort_pieces(&run)), "Chapter 1");
    }
}
