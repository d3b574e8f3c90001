//! Story reconstruction.

use crate::error::{Diagnostic, DiagnosticKind, Stage};
use crate::model::{
    BreakType, FormattedRun, LineBreakStats, ResolvedFormatting, ResourceCatalog, Story,
    StyleKind,
};
use crate::parser::context::ParseContext;
use crate::parser::resources::{parse_formatting, qualify_style_ref, resolve_formatting, StyleLevel};
use crate::tree::XmlElement;

use super::merge::{is_heading_style, join_runs, Join, RunSide};
use super::runs::{
    best_effort_pieces, paragraph_runs, pieces_from_paired_trace, pieces_from_trace, pieces_text,
    pieces_without_trace, story_paragraphs, Piece, TraceMatcher, TreeRun,
};
use super::trace::StoryTrace;

/// A run ready for emission.
struct PreparedRun {
    pieces: Vec<Piece>,
    formatting: ResolvedFormatting,
    heading: bool,
    trace_index: Option<usize>,
}

/// Story id from the file name (`Stories/Story_u1f.xml` → `u1f`).
pub fn story_id_from_path(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.strip_suffix(".xml").unwrap_or(name);
    stem.strip_prefix("Story_").unwrap_or(stem).to_string()
}

/// Reconstruct one story file.
///
/// `raw` is the unparsed story text; without it, break placement falls back
/// to an even split. Problems are recorded on `ctx` and never abort the
/// story.
pub fn reconstruct_story(
    path: &str,
    root: &XmlElement,
    raw: Option<&str>,
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
) -> Story {
    let story_el = root.find_first("Story").unwrap_or(root);
    let id = story_el
        .attr_text("Self")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| story_id_from_path(path));

    let mut story = Story::new(id, path);
    story.title = story_el
        .attr_text("StoryTitle")
        .filter(|t| !t.is_empty() && !t.starts_with("$ID/"))
        .map(|t| t.into_owned());

    let trace: Option<StoryTrace> = raw.map(|raw| ctx.trace(path, raw).clone());
    let mut matcher = trace.as_ref().map(TraceMatcher::new);

    let paragraphs = story_paragraphs(story_el);
    let mut emitter = Emitter::default();

    for (index, paragraph) in paragraphs.iter().enumerate() {
        let runs = prepare_paragraph(path, &story.id, paragraph, catalog, ctx, matcher.as_mut());

        if runs.iter().all(|r| r.pieces.is_empty()) {
            let formatting = paragraph_formatting(paragraph, catalog, ctx);
            emitter.push_empty_paragraph(formatting, index);
            continue;
        }

        if index > 0 {
            if let Some(first) = runs.iter().find(|r| !r.pieces.is_empty()) {
                emitter.top_up_paragraph(first.formatting.clone(), index);
            }
        }
        emitter.emit_paragraph(runs, index);
    }

    story.paragraph_count = paragraphs.len();
    story.word_count = emitter.text.split_whitespace().count();
    story.char_count = emitter.text.chars().count();
    story.line_breaks = emitter.stats;
    story.text = emitter.text;
    story.runs = emitter.runs;

    log::trace!(
        "Story {}: {} run(s), {} word(s), {} paragraph(s)",
        story.id,
        story.runs.len(),
        story.word_count,
        story.paragraph_count
    );
    story
}

fn paragraph_formatting(
    paragraph: &XmlElement,
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
) -> ResolvedFormatting {
    let direct = parse_formatting(paragraph);
    let style = paragraph.attr_text("AppliedParagraphStyle");
    resolve_formatting(
        catalog,
        ctx,
        StyleLevel::default(),
        StyleLevel {
            style: style.as_deref(),
            direct: Some(&direct),
        },
    )
}

fn style_is_heading(catalog: &ResourceCatalog, kind: StyleKind, reference: Option<&str>) -> bool {
    let Some(reference) = reference.filter(|r| !r.contains("$ID/[No")) else {
        return false;
    };
    let id = qualify_style_ref(kind, reference);
    match catalog.style(kind, &id) {
        Some(style) => is_heading_style(&style.name),
        None => is_heading_style(id.rsplit('/').next().unwrap_or(&id)),
    }
}

fn prepare_paragraph(
    path: &str,
    story_id: &str,
    paragraph: &XmlElement,
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
    mut matcher: Option<&mut TraceMatcher<'_>>,
) -> Vec<PreparedRun> {
    let paragraph_style = paragraph.attr_text("AppliedParagraphStyle");
    let paragraph_direct = parse_formatting(paragraph);
    let paragraph_heading = style_is_heading(catalog, StyleKind::Paragraph, paragraph_style.as_deref());

    let mut prepared = Vec::new();
    for run in paragraph_runs(paragraph) {
        let tree = TreeRun::read(run);

        let matched = matcher.as_mut().and_then(|matcher| matcher.find(&tree));
        let traced = match matched {
            Some((index, traced)) if tree.is_malformed() => {
                pieces_from_paired_trace(&tree, traced).map(|pieces| (pieces, index))
            }
            Some((index, traced)) => Some((pieces_from_trace(traced), index)),
            None => None,
        };

        let (pieces, trace_index) = match traced {
            Some((pieces, index)) => (pieces, Some(index)),
            None if tree.is_bare() => (best_effort_pieces(run), None),
            None => {
                let (pieces, marked) = pieces_without_trace(&tree);
                if marked {
                    ctx.record(
                        Diagnostic::new(
                            DiagnosticKind::TextReconstructionFailure,
                            Stage::Text,
                            "content could not be read as text",
                        )
                        .in_file(path)
                        .about(story_id),
                    );
                }
                (pieces, None)
            }
        };

        let character_style = run.attr_text("AppliedCharacterStyle");
        let run_direct = parse_formatting(run);
        let formatting = resolve_formatting(
            catalog,
            ctx,
            StyleLevel {
                style: character_style.as_deref(),
                direct: Some(&run_direct),
            },
            StyleLevel {
                style: paragraph_style.as_deref(),
                direct: Some(&paragraph_direct),
            },
        );
        let heading = paragraph_heading
            || style_is_heading(catalog, StyleKind::Character, character_style.as_deref());

        prepared.push(PreparedRun {
            pieces,
            formatting,
            heading,
            trace_index,
        });
    }

    if !prepared.is_empty() && prepared.iter().all(|r| r.trace_index.is_some()) {
        prepared.sort_by_key(|r| r.trace_index);
    }
    prepared
}

#[derive(Default)]
struct Emitter {
    text: String,
    runs: Vec<FormattedRun>,
    stats: LineBreakStats,
    /// Trailing newlines that belong to empty paragraphs
    held_newlines: usize,
}

impl Emitter {
    fn push_text(&mut self, text: &str, formatting: ResolvedFormatting, paragraph: usize) {
        self.held_newlines = 0;
        self.text.push_str(text);
        self.runs.push(FormattedRun::text(text, formatting, paragraph));
    }

    fn push_break(&mut self, kind: BreakType, formatting: ResolvedFormatting, paragraph: usize) {
        self.text.push('\n');
        self.stats.record(kind);
        self.runs.push(FormattedRun::line_break(kind, formatting, paragraph));
    }

    fn push_space(&mut self, formatting: ResolvedFormatting, paragraph: usize) {
        self.text.push(' ');
        self.runs.push(FormattedRun::space(formatting, paragraph));
    }

    fn trailing_newlines(&self) -> usize {
        self.text.chars().rev().take_while(|c| *c == '\n').count()
    }

    /// An empty paragraph is a newline of its own; the next boundary never
    /// absorbs it.
    fn push_empty_paragraph(&mut self, formatting: ResolvedFormatting, paragraph: usize) {
        self.push_break(BreakType::Paragraph, formatting, paragraph);
        self.held_newlines += 1;
    }

    /// Ensure the text ends with two newlines before a new paragraph, not
    /// counting newlines held by empty paragraphs.
    fn top_up_paragraph(&mut self, formatting: ResolvedFormatting, paragraph: usize) {
        let existing = self.trailing_newlines().saturating_sub(self.held_newlines);
        for _ in existing..2 {
            self.push_break(BreakType::Paragraph, formatting.clone(), paragraph);
        }
        self.held_newlines = 0;
    }

    fn emit_paragraph(&mut self, runs: Vec<PreparedRun>, paragraph: usize) {
        let mut previous: Option<(String, ResolvedFormatting, bool)> = None;

        for run in runs.into_iter().filter(|r| !r.pieces.is_empty()) {
            let text = pieces_text(&run.pieces);

            if let Some((prev_text, prev_formatting, prev_heading)) = &previous {
                let join = join_runs(
                    RunSide {
                        text: prev_text,
                        formatting: prev_formatting,
                        heading: *prev_heading,
                    },
                    RunSide {
                        text: &text,
                        formatting: &run.formatting,
                        heading: run.heading,
                    },
                );
                match join {
                    Join::Space => self.push_space(prev_formatting.clone(), paragraph),
                    Join::Newline => {
                        self.push_break(BreakType::Implicit, prev_formatting.clone(), paragraph)
                    }
                    Join::Merge | Join::Nothing => {}
                }
            }

            for piece in &run.pieces {
                match piece {
                    Piece::Text(t) => self.push_text(t, run.formatting.clone(), paragraph),
                    Piece::Break(kind) => self.push_break(*kind, run.formatting.clone(), paragraph),
                }
            }
            previous = Some((text, run.formatting, run.heading));
        }
    }
}
