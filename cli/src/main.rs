//! unidml CLI - IDML content extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unidml::{
    parse_file_with_options, parse_files, render, DocumentModel, ExtractionStats, JsonFormat,
    PageSelection, ParseOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "unidml")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract IDML layout content to JSON and text", long_about = None)]
struct Cli {
    /// Input IDML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    parse: ParseArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that parses a document.
#[derive(clap::Args, Clone)]
struct ParseArgs {
    /// Output resolution for pixel geometry
    #[arg(long, global = true, default_value = "96", env = "UNIDML_DPI")]
    dpi: f64,

    /// Fail on malformed XML files instead of skipping them
    #[arg(long, global = true)]
    strict: bool,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        let options = ParseOptions::new().with_dpi(self.dpi);
        if self.strict {
            options.strict()
        } else {
            options.lenient()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert IDML files to JSON and text
    Convert {
        /// Input IDML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert IDML to the JSON document model
    Json {
        /// Input IDML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Omit recovered diagnostics
        #[arg(long)]
        no_diagnostics: bool,

        /// Skip story text
        #[arg(long)]
        structure_only: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert IDML to plain text in page order
    Text {
        /// Input IDML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show document information
    Info {
        /// Input IDML file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List pages with their elements
    Pages {
        /// Input IDML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let parse = cli.parse.options();

    let result = match cli.command {
        Some(Commands::Convert { inputs, output }) => cmd_convert(&inputs, output.as_deref(), &parse),
        Some(Commands::Json {
            input,
            output,
            compact,
            no_diagnostics,
            structure_only,
            pages,
        }) => cmd_json(
            &input,
            output.as_deref(),
            compact,
            no_diagnostics,
            structure_only,
            pages.as_deref(),
            parse,
        ),
        Some(Commands::Text {
            input,
            output,
            pages,
        }) => cmd_text(&input, output.as_deref(), pages.as_deref(), parse),
        Some(Commands::Info { input }) => cmd_info(&input, parse),
        Some(Commands::Pages { input, pages }) => cmd_pages(&input, pages.as_deref(), parse),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&[input], cli.output.as_deref(), &parse)
            } else {
                println!("{}", "Usage: unidml <FILE> [OUTPUT]".yellow());
                println!("       unidml --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn page_selection(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match pages {
        Some(p) => Ok(PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?),
        None => Ok(PageSelection::All),
    }
}

fn write_or_print(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn report_diagnostics(doc: &DocumentModel) {
    if !doc.diagnostics.is_empty() {
        eprintln!(
            "{} {} recovered problem(s); run with RUST_LOG=warn for details",
            "Note:".yellow(),
            doc.diagnostics.len()
        );
    }
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    options: &ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(inputs.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing IDML...");
    let results = parse_files(inputs, options);
    pb.inc(inputs.len() as u64);

    let render_options = RenderOptions::new();
    let mut failures = 0;
    let mut written = Vec::new();

    for (input, result) in results {
        pb.set_message(format!("Writing {}", input.display()));
        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failures += 1;
                pb.inc(1);
                continue;
            }
        };

        let stem = input.file_stem().unwrap_or_default().to_string_lossy().to_string();
        let output_dir = output
            .map(|p| p.join(&stem))
            .unwrap_or_else(|| PathBuf::from(format!("{}_output", stem)));
        fs::create_dir_all(&output_dir)?;

        let json = render::to_json_with_options(&doc, &render_options)?;
        fs::write(output_dir.join("document.json"), &json)?;
        let text = render::to_text(&doc, &render_options)?;
        fs::write(output_dir.join("extract.txt"), &text)?;
        written.push(output_dir);
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    for dir in &written {
        println!("  {} {}", "├─".dimmed(), dir.join("document.json").display());
        println!("  {} {}", "└─".dimmed(), dir.join("extract.txt").display());
    }

    if failures > 0 {
        return Err(format!("{} of {} file(s) failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    no_diagnostics: bool,
    structure_only: bool,
    pages: Option<&str>,
    options: ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = if structure_only {
        options.structure_only()
    } else {
        options
    };
    let doc = parse_file_with_options(input, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let render_options = RenderOptions::new()
        .with_json_format(format)
        .with_diagnostics(!no_diagnostics)
        .with_pages(page_selection(pages)?);

    let json = render::to_json_with_options(&doc, &render_options)?;
    write_or_print(&json, output)?;
    report_diagnostics(&doc);
    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
    options: ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, options)?;
    let render_options = RenderOptions::new().with_pages(page_selection(pages)?);

    let text = render::to_text(&doc, &render_options)?;
    write_or_print(&text, output)?;
    report_diagnostics(&doc);
    Ok(())
}

fn cmd_info(input: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, options)?;
    let meta = &doc.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref version) = meta.dom_version {
        println!("{}: IDML (DOM {})", "Format".bold(), version);
    }
    if let Some(ref name) = meta.name {
        println!("{}: {}", "Name".bold(), name);
    }
    if let Some(ref title) = meta.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = meta.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref tool) = meta.creator_tool {
        println!("{}: {}", "Creator Tool".bold(), tool);
    }
    if let Some(ref created) = meta.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = meta.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }
    println!("{}: {}", "Units".bold(), meta.measurement_unit);
    println!(
        "{}: {}",
        "Facing Pages".bold(),
        if meta.facing_pages { "Yes" } else { "No" }
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = ExtractionStats::from_document(&doc);
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Spreads".bold(), stats.spread_count);
    println!("{}: {}", "Master Spreads".bold(), stats.master_spread_count);
    println!("{}: {}", "Elements".bold(), stats.element_count);
    println!("{}: {}", "Text Frames".bold(), stats.text_frame_count);
    println!("{}: {}", "Images".bold(), stats.image_count);
    println!("{}: {}", "Stories".bold(), stats.story_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
    println!("{}: {}", "Styles".bold(), stats.style_count);
    println!("{}: {}", "Colors".bold(), stats.color_count);

    if stats.diagnostic_count > 0 {
        println!();
        println!("{}", "Diagnostics".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        for diagnostic in &doc.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    Ok(())
}

fn cmd_pages(
    input: &Path,
    pages: Option<&str>,
    options: ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let selection = page_selection(pages)?;
    let doc = parse_file_with_options(input, options.structure_only())?;

    for page in &doc.pages {
        if !selection.includes(page.index as u32 + 1) {
            continue;
        }
        println!(
            "{} {} ({}) {}x{} px, background {}",
            "Page".cyan().bold(),
            page.name,
            page.id.dimmed(),
            page.width,
            page.height,
            page.background_color
        );
        for element in doc.elements_on_page(&page.id) {
            let geometry = &element.geometry;
            println!(
                "  {} {:<13} {} at ({}, {}) {}x{}",
                "•".dimmed(),
                element.kind.to_string(),
                element.id,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height
            );
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unidml".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("IDML content extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unidml".dimmed());
    println!("License: MIT");
}
