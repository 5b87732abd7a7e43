use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docoutline::core::config::{DetectorConfig, OutlineConfig};
use docoutline::export::{Exporter, JsonExporter};
use docoutline::layout::{LayoutModel, ScriptLayoutModel};
use docoutline::ocr::{PdftoppmRasterizer, TesseractOcr};
use docoutline::parser::{PdfReader, PdftotextBlocks};
use docoutline::pipeline::{Collaborators, OutlineEngine};
use docoutline::text::{CorrectionRules, TextCorrector};

#[derive(Parser, Debug)]
#[command(name = "docoutline")]
#[command(version, about = "Extract a document's title and heading outline from page layouts", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the outline of one PDF
    Extract {
        /// Input PDF file path
        input: PathBuf,

        /// Output JSON file (default: ./<input_name>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OutlineArgs,
    },

    /// Extract outlines of multiple PDFs
    Batch {
        /// Input PDF files
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OutlineArgs,
    },

    /// Show information about a PDF file
    Info {
        /// Input PDF file path
        input: PathBuf,
    },

    /// Run OCR text correction on a string
    Correct {
        text: String,

        #[arg(long)]
        aggressive: bool,

        /// Extra `wrong=correct` rules, one per line
        #[arg(long)]
        corrections: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct OutlineArgs {
    /// JSON file with pipeline thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rendering DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// Layout inference script printing a detection tensor as JSON
    #[arg(long)]
    model_script: Option<PathBuf>,

    /// Directory holding the model's config.json (default: the script's directory)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Extra `wrong=correct` rules, one per line
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Enable regex-based correction rules
    #[arg(long)]
    aggressive: bool,

    /// Detection confidence threshold
    #[arg(long)]
    conf: Option<f32>,

    /// NMS IoU threshold
    #[arg(long)]
    nms: Option<f32>,

    /// Interpreter used to run the layout script
    #[arg(long, default_value = "python3")]
    python: String,

    /// Model input size as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x1024", value_parser = parse_size)]
    input_size: (u32, u32),

    /// Tesseract language, e.g. `eng` or `eng+deu`
    #[arg(long)]
    lang: Option<String>,

    /// Tesseract page segmentation mode
    #[arg(long, default_value_t = 6)]
    psm: u8,

    /// Scratch directory for rendered pages and crops
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("input size must be positive".to_string());
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            output,
            options,
        } => extract_single(&input, output, &options, cli.verbose),
        Commands::Batch {
            inputs,
            output,
            options,
        } => extract_batch(inputs, output, &options, cli.verbose),
        Commands::Info { input } => show_info(input),
        Commands::Correct {
            text,
            aggressive,
            corrections,
        } => correct_text(&text, aggressive, corrections),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Engine plus the adapters it drives, built once per invocation.
struct Toolchain {
    engine: OutlineEngine,
    rasterizer: PdftoppmRasterizer,
    model: Option<ScriptLayoutModel>,
    ocr: TesseractOcr,
    blocks: PdftotextBlocks,
}

impl Toolchain {
    fn from_args(options: &OutlineArgs) -> Result<Self> {
        let mut config = match &options.config {
            Some(path) => OutlineConfig::from_file(path)?,
            None => OutlineConfig::default(),
        };
        if let Some(dpi) = options.dpi {
            config.dpi = dpi;
        }
        if options.corrections.is_some() {
            config.corrections_file = options.corrections.clone();
        }
        config.aggressive_correction |= options.aggressive;

        let model_dir = options.model_dir.clone().or_else(|| {
            options
                .model_script
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        });
        let mut detector = model_dir
            .map(|dir| dir.join("config.json"))
            .filter(|path| path.exists())
            .and_then(|path| DetectorConfig::load(&path))
            .unwrap_or_default();
        // CLI thresholds win over the model's config.json
        if options.conf.is_some() {
            detector.confidence_threshold = options.conf;
        }
        if options.nms.is_some() {
            detector.nms_threshold = options.nms;
        }

        let engine = OutlineEngine::new(config).with_detector_config(&detector)?;

        let work_dir = options
            .work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("docoutline"));
        let (input_w, input_h) = options.input_size;
        let model = options.model_script.clone().map(|script| {
            ScriptLayoutModel::new(work_dir.join("layout"), script)
                .with_interpreter(options.python.clone())
                .with_input_size(input_w, input_h)
        });
        let mut ocr = TesseractOcr::new(work_dir.join("ocr")).with_psm(options.psm);
        if let Some(lang) = &options.lang {
            ocr = ocr.with_lang(lang.clone());
        }

        Ok(Self {
            engine,
            rasterizer: PdftoppmRasterizer::new(work_dir.join("pages")),
            model,
            ocr,
            blocks: PdftotextBlocks::new(),
        })
    }

    fn run(&self, input: &Path, exporter: &JsonExporter, verbose: bool) -> Result<()> {
        if !input.is_file() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        let title = PdfReader::new(input.to_path_buf()).title();
        let collaborators = Collaborators {
            rasterizer: &self.rasterizer,
            model: self.model.as_ref().map(|m| m as &dyn LayoutModel),
            ocr: &self.ocr,
            blocks: &self.blocks,
        };
        let outline = self
            .engine
            .build_outline(input, title, &collaborators)
            .with_context(|| format!("Failed to process PDF: {}", input.display()))?;

        exporter
            .export(&outline)
            .with_context(|| format!("Failed to export to: {}", exporter.path().display()))?;

        println!("[✓] {} -> {}", input.display(), exporter.path().display());
        if verbose {
            println!("    Title: {}", outline.title);
            println!("    Headings: {} ({})", outline.outline.len(), outline.level_counts());
            println!("    Time: {:.2}s", outline.processing_time_seconds);
        }
        Ok(())
    }
}

fn extract_single(
    input: &Path,
    output: Option<PathBuf>,
    options: &OutlineArgs,
    verbose: bool,
) -> Result<()> {
    let toolchain = Toolchain::from_args(options)?;
    let exporter = match output {
        Some(path) => JsonExporter::new(path),
        None => JsonExporter::for_input(Path::new("."), input),
    };
    toolchain.run(input, &exporter, verbose)
}

fn extract_batch(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    options: &OutlineArgs,
    verbose: bool,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let toolchain = Toolchain::from_args(options)?;
    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_output"));

    println!("[*] Batch processing {} file(s)", inputs.len());
    println!("[*] Output: {}\n", base_output.display());

    let mut success = 0;
    let mut failed = 0;

    for (i, input) in inputs.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, inputs.len(), input.display());
        let exporter = JsonExporter::for_input(&base_output, input);
        match toolchain.run(input, &exporter, verbose) {
            Ok(()) => success += 1,
            Err(e) => {
                eprintln!("  [✗] Failed: {e:#}");
                failed += 1;
            }
        }
    }

    println!("\n[*] Summary: {} succeeded, {} failed", success, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to process", failed);
    }

    Ok(())
}

fn show_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let reader = PdfReader::new(input.clone());
    let page_count = reader
        .page_count()
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    println!("PDF Information");
    println!("===============");
    println!("File: {}", input.display());
    println!("Title: {}", reader.title());
    println!("Pages: {}", page_count);

    Ok(())
}

fn correct_text(text: &str, aggressive: bool, corrections: Option<PathBuf>) -> Result<()> {
    let mut rules = CorrectionRules::builtin();
    if let Some(path) = corrections {
        rules.load_supplement(&path)?;
    }
    let corrector = TextCorrector::new(rules, aggressive);
    println!("{}", corrector.correct(text));
    Ok(())
}
