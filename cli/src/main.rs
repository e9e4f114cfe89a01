//! unfdb CLI - legacy test-bank conversion tool
//!
//! A command-line tool for converting .fdb/.et1 test banks to readable text,
//! Markdown, JSON and PDF.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unfdb::encoding_rs::Encoding;
use unfdb::render::{self, CommandPdfEngine};
use unfdb::{
    encoding_for_label, AnswerPrefix, CorrectAnswers, ParseOptions, ParseResult, RenderOptions,
};

/// Legacy test-bank conversion to text, Markdown, JSON and PDF
#[derive(Parser)]
#[command(
    name = "unfdb",
    author = "iyulab",
    version,
    about = "Convert .fdb/.et1 test banks",
    long_about = "unfdb - Tolerant parser for legacy tagged test-bank exports.\n\n\
                  Decodes hex-packed question blocks in Windows-1251, UTF-8, UTF-16\n\
                  or IBM866 and converts them to text, Markdown, JSON or PDF.\n\n\
                  Usage:\n  \
                  unfdb <file>              Convert to all formats in <file>_output\n  \
                  unfdb <file> <output>     Convert into the specified directory\n  \
                  unfdb md <file>           Convert to Markdown only"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default conversion)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output directory (for default conversion)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Also render a PDF (default conversion)
    #[arg(long, global = false)]
    pdf: bool,

    /// Print parser diagnostics
    #[arg(short, long, global = true)]
    debug: bool,

    /// Force the source encoding (win1251, utf-8, utf-16le, cp866, ...)
    #[arg(short, long, global = true)]
    encoding: Option<String>,

    /// Keep questions marked as deleted
    #[arg(long, global = true)]
    include_deleted: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a test bank (default command - writes all formats)
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output directory (default: <filename>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render a PDF
        #[arg(long)]
        pdf: bool,

        /// Directory prefix for image links
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },

    /// Re-serialize a test bank as readable tagged text
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Encoding of the written file (default: utf-8)
        #[arg(long, default_value = "utf-8")]
        output_encoding: String,
    },

    /// Convert a test bank to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include YAML frontmatter with metadata
        #[arg(short, long)]
        frontmatter: bool,

        /// Directory prefix for image links
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// Which answers are marked correct
        #[arg(long, default_value = "bitmap")]
        correct: CorrectMode,

        /// Answer numbering style
        #[arg(long, default_value = "auto")]
        prefix: PrefixMode,

        /// Leave out question descriptions
        #[arg(long)]
        no_descriptions: bool,
    },

    /// Convert a test bank to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Render a test bank to PDF through an external HTML-to-PDF program
    Pdf {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: <filename>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory images are resolved against
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// CSS file replacing the built-in stylesheet
        #[arg(long)]
        stylesheet: Option<PathBuf>,

        /// PDF program reading HTML on stdin and writing PDF to stdout
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Argument passed to the PDF program (repeatable)
        #[arg(long = "engine-arg", requires = "engine", allow_hyphen_values = true)]
        engine_args: Vec<String>,
    },

    /// Show test information and statistics
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Correct-answer convention
#[derive(Clone, ValueEnum)]
enum CorrectMode {
    /// Positions flagged in the value bitmap
    Bitmap,
    /// The first `right` answers
    Leading,
}

impl From<CorrectMode> for CorrectAnswers {
    fn from(mode: CorrectMode) -> Self {
        match mode {
            CorrectMode::Bitmap => CorrectAnswers::ValueBitmap,
            CorrectMode::Leading => CorrectAnswers::LeadingRight,
        }
    }
}

/// Answer numbering style
#[derive(Clone, ValueEnum)]
enum PrefixMode {
    /// Letters for image matching questions, numbers otherwise
    Auto,
    /// 1. 2. 3.
    Numbers,
    /// A. B. C.
    Letters,
}

impl From<PrefixMode> for AnswerPrefix {
    fn from(mode: PrefixMode) -> Self {
        match mode {
            PrefixMode::Auto => AnswerPrefix::Auto,
            PrefixMode::Numbers => AnswerPrefix::Numbers,
            PrefixMode::Letters => AnswerPrefix::Letters,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let parse_options = parse_options(&cli)?;

    let Some(command) = cli.command else {
        // Default command: unfdb <file> [output]
        return match cli.input {
            Some(input) => run_convert(&input, cli.output.as_ref(), cli.pdf, None, &parse_options),
            None => {
                use clap::CommandFactory;
                Cli::command().print_help()?;
                Ok(())
            }
        };
    };

    match command {
        Commands::Convert {
            input,
            output,
            pdf,
            image_dir,
        } => {
            run_convert(&input, output.as_ref(), pdf, image_dir, &parse_options)?;
        }

        Commands::Text {
            input,
            output,
            output_encoding,
        } => {
            let encoding = encoding_for_label(&output_encoding)?;
            let pb = create_spinner("Decoding test...");

            let data = fs::read(&input)?;
            let bytes = encoded_text(&data, &parse_options, encoding);

            pb.finish_and_clear();
            match output {
                Some(path) => {
                    fs::write(&path, bytes)?;
                    println!(
                        "{} Converted to text: {}",
                        "✓".green().bold(),
                        path.display()
                    );
                }
                None => {
                    let mut handle = io::stdout().lock();
                    handle.write_all(&bytes)?;
                    handle.flush()?;
                }
            }
        }

        Commands::Markdown {
            input,
            output,
            frontmatter,
            image_dir,
            correct,
            prefix,
            no_descriptions,
        } => {
            let pb = create_spinner("Parsing test...");

            let result = unfdb::parse_file_with_options(&input, &parse_options)?;
            pb.set_message("Rendering to Markdown...");

            let mut options = RenderOptions::default()
                .with_correct_answers(correct.into())
                .with_answer_prefix(prefix.into());
            if frontmatter {
                options = options.with_frontmatter();
            }
            if let Some(dir) = image_dir {
                options = options.with_image_dir(dir);
            }
            if no_descriptions {
                options = options.without_descriptions();
            }

            let markdown = render::render_markdown(&result.test, &options)?;

            pb.finish_and_clear();
            print_warnings(&result);
            write_output(output.as_ref(), &markdown)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to Markdown: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Json {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Parsing test...");

            let result = unfdb::parse_file_with_options(&input, &parse_options)?;
            pb.set_message("Rendering to JSON...");

            let json = if compact {
                result.test.to_json_compact()?
            } else {
                result.test.to_json()?
            };

            pb.finish_and_clear();
            print_warnings(&result);
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to JSON: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Pdf {
            input,
            output,
            image_dir,
            stylesheet,
            engine,
            engine_args,
        } => {
            let stylesheet = stylesheet.map(fs::read_to_string).transpose()?;
            let engine = match engine {
                Some(program) => CommandPdfEngine::new(program, engine_args),
                None => CommandPdfEngine::wkhtmltopdf(),
            };
            let output = output.unwrap_or_else(|| input.with_extension("pdf"));

            let pb = create_spinner("Parsing test...");
            let result = unfdb::parse_file_with_options(&input, &parse_options)?;

            pb.set_message(format!("Rendering with {}...", engine.program().display()));
            let mut options = RenderOptions::default();
            if let Some(dir) = image_dir {
                options = options.with_image_dir(dir);
            }
            let pdf = render::render_pdf(&result.test, &options, stylesheet.as_deref(), &engine)?;
            fs::write(&output, pdf)?;

            pb.finish_and_clear();
            print_warnings(&result);
            println!(
                "{} Converted to PDF: {}",
                "✓".green().bold(),
                output.display()
            );
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing test...");

            let data = fs::read(&input)?;
            let decoded = unfdb::decode::decode_detected(&data, parse_options.encoding);
            let result = unfdb::parse_bytes_with_options(&data, &parse_options)?;
            let test = &result.test;

            pb.finish_and_clear();

            println!("{}", "Test Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            if decoded.fell_back() {
                println!(
                    "{}: {} (detected {})",
                    "Encoding".bold(),
                    decoded.encoding.name(),
                    decoded.detected.name()
                );
            } else {
                println!("{}: {}", "Encoding".bold(), decoded.encoding.name());
            }
            println!("{}: {}", "Title".bold(), test.title);
            if let Some(ref author) = test.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref date) = test.date {
                println!("{}: {}", "Date".bold(), date);
            }
            if let Some(ref copyright) = test.copyright {
                println!("{}: {}", "Copyright".bold(), copyright);
            }
            if let Some(ref id) = test.source_id {
                println!("{}: {}", "ID".bold(), id);
            }

            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Questions".bold(), test.questions.len());
            println!("{}: {}", "Points".bold(), test.total_points());
            println!(
                "{}: {}",
                "Categories".bold(),
                test.categories.iter().map(|c| c.flatten().len()).sum::<usize>()
            );
            if let Some(ref groups) = test.groups {
                println!("{}: {}", "Groups".bold(), groups.len());
            }
            if result.deleted_skipped > 0 {
                println!("{}: {}", "Deleted (skipped)".bold(), result.deleted_skipped);
            }
            println!(
                "{}: {}",
                "With images".bold(),
                test.questions.iter().filter(|q| q.image.is_some()).count()
            );

            let mut by_type: Vec<(String, usize)> = Vec::new();
            for question in &test.questions {
                let name = question.question_type.to_string();
                match by_type.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, count)) => *count += 1,
                    None => by_type.push((name, 1)),
                }
            }
            for (name, count) in by_type {
                println!("  {}: {}", name, count);
            }

            print_warnings(&result);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn parse_options(cli: &Cli) -> unfdb::Result<ParseOptions> {
    let mut options = ParseOptions::new();
    if cli.debug {
        options = options.debug();
    }
    if cli.include_deleted {
        options = options.include_deleted();
    }
    if let Some(ref label) = cli.encoding {
        options = options.with_encoding_label(label)?;
    }
    Ok(options)
}

/// Re-serializes a test bank and encodes it for output, file or stdout alike.
fn encoded_text(data: &[u8], parse_options: &ParseOptions, encoding: &'static Encoding) -> Vec<u8> {
    let text = render::render_source_bytes(data, parse_options);
    render::encode_output(&text, encoding)
}

/// Run the default convert command - writes every format to the output directory
fn run_convert(
    input: &Path,
    output: Option<&PathBuf>,
    pdf: bool,
    image_dir: Option<PathBuf>,
    parse_options: &ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Parsing test...");

    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let output_dir = match output {
        Some(p) => p.clone(),
        None => {
            let parent = input.parent().unwrap_or(Path::new("."));
            parent.join(format!("{}_output", stem))
        }
    };

    fs::create_dir_all(&output_dir)?;

    let data = fs::read(input)?;
    let result = unfdb::parse_bytes_with_options(&data, parse_options)?;

    let mut options = RenderOptions::default().with_frontmatter();
    if let Some(dir) = image_dir {
        options = options.with_image_dir(dir);
    }

    pb.set_message("Generating text...");
    let text = render::render_source_bytes(&data, parse_options);
    let txt_name = format!("{}.txt", stem);
    fs::write(output_dir.join(&txt_name), &text)?;

    pb.set_message("Generating Markdown...");
    let markdown = render::render_markdown(&result.test, &options)?;
    let md_name = format!("{}.md", stem);
    fs::write(output_dir.join(&md_name), &markdown)?;

    pb.set_message("Generating JSON...");
    let json = result.test.to_json()?;
    let json_name = format!("{}.json", stem);
    fs::write(output_dir.join(&json_name), &json)?;

    let pdf_name = if pdf {
        pb.set_message("Generating PDF...");
        let bytes = render::render_pdf(
            &result.test,
            &options,
            None,
            &CommandPdfEngine::wkhtmltopdf(),
        )?;
        let name = format!("{}.pdf", stem);
        fs::write(output_dir.join(&name), bytes)?;
        Some(name)
    } else {
        None
    };

    pb.finish_and_clear();

    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    println!("  {} {}", "✓".green(), txt_name);
    println!("  {} {}", "✓".green(), md_name);
    println!("  {} {}", "✓".green(), json_name);
    if let Some(name) = pdf_name {
        println!("  {} {}", "✓".green(), name);
    }

    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Questions".bold(), result.test.questions.len());
    println!("{}: {}", "Points".bold(), result.test.total_points());
    println!("{}: {}", "Categories".bold(), result.test.categories.len());

    print_warnings(&result);
    Ok(())
}

fn print_warnings(result: &ParseResult) {
    if !result.has_warnings() {
        return;
    }
    eprintln!(
        "\n{} {} warning(s)",
        "!".yellow().bold(),
        result.warnings.len()
    );
    for message in result.warning_messages() {
        eprintln!("  {}", message.yellow());
    }
}

fn print_version() {
    println!("{} {}", "unfdb".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Legacy test-bank conversion to text, Markdown, JSON and PDF");
    println!();
    println!("Supported formats: .fdb, .et1 (Windows-1251, UTF-8, UTF-16, IBM866)");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_build_parse_options() {
        let cli = Cli::parse_from(["unfdb", "--include-deleted", "-e", "cp866", "info", "x.fdb"]);
        let options = parse_options(&cli).unwrap();
        assert!(options.include_deleted);
        assert_eq!(options.encoding, Some(encoding_rs::IBM866));
    }

    #[test]
    fn test_text_output_honors_requested_encoding() {
        let data = b"<T_id>7</T_id><T_body></T_body>";
        let utf16 = encoding_for_label("utf-16le").unwrap();
        let bytes = encoded_text(data, &ParseOptions::default(), utf16);
        assert_eq!(&bytes[..4], &[b'<', 0x00, b'T', 0x00]);

        let utf8 = encoded_text(data, &ParseOptions::default(), encoding_rs::UTF_8);
        assert!(utf8.starts_with(b"<T_id>\n7\n</T_id>"));
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let cli = Cli::parse_from(["unfdb", "--encoding", "klingon", "info", "x.fdb"]);
        assert!(parse_options(&cli).is_err());
    }
}
