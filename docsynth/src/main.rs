use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use docsynth::{
    BatchPaths, GeneratorConfig, OpenAiCompletions, TextDirectory, TextService, generate_signatures,
    load_fonts, run_batch,
};
use docsynth_render::{Augment, BodyFont, FontFace, Identity, NoiseAugmenter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Generate labeled synthetic document images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log every placement decision.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate documents with signatures and stamps.
    Generate(GenerateArgs),
    /// Render signature images from handwriting fonts.
    Signatures(SignatureArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Directory of signature PNGs with alpha.
    #[arg(long)]
    signatures: PathBuf,

    /// Directory of stamp PNGs with alpha.
    #[arg(long)]
    stamps: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Number of documents.
    #[arg(short = 'n', long, default_value_t = 1)]
    num: usize,

    /// TrueType font for the body text. Helvetica is used otherwise, which
    /// cannot draw Cyrillic.
    #[arg(long)]
    font: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Completions endpoint of the language model server.
    #[arg(long, conflicts_with = "text_dir")]
    endpoint: Option<String>,

    /// Model name sent to the endpoint.
    #[arg(short, long)]
    model: Option<String>,

    /// Read body texts from the .txt files of a directory instead of
    /// querying a model.
    #[arg(long)]
    text_dir: Option<PathBuf>,

    /// Seed for all random choices.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the composed PDF of every document.
    #[arg(long)]
    pdf: bool,

    /// Output resolution.
    #[arg(long)]
    dpi: Option<f64>,

    /// Skip noise augmentation.
    #[arg(long)]
    no_augment: bool,
}

#[derive(Args, Debug)]
struct SignatureArgs {
    /// Directory of .ttf handwriting fonts.
    #[arg(long)]
    fonts: PathBuf,

    /// Output directory.
    #[arg(short, long)]
    out: PathBuf,

    /// Number of signatures.
    #[arg(short = 'n', long, default_value_t = 500)]
    num: usize,

    /// Seed for all random choices.
    #[arg(long)]
    seed: Option<u64>,
}

enum TextSource {
    Model(OpenAiCompletions),
    Files(TextDirectory),
}

impl TextService for TextSource {
    fn generate(&mut self, prompt: &str) -> Result<String, docsynth::Error> {
        match self {
            Self::Model(client) => client.generate(prompt),
            Self::Files(files) => files.generate(prompt),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Signatures(args) => signatures(args),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.text.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        config.text.model = model;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(dpi) = args.dpi {
        config.raster.dpi = dpi;
    }
    config.output.write_pdf |= args.pdf;
    config.augment.enabled &= !args.no_augment;
    config.validate().context("invalid configuration")?;

    let font = body_font(args.font.as_deref(), &config)?;
    let text = match &args.text_dir {
        Some(dir) => TextSource::Files(TextDirectory::open(dir)?),
        None => TextSource::Model(OpenAiCompletions::new(config.text.clone())?),
    };
    let augment: Box<dyn Augment> = if config.augment.enabled {
        // Keep the noise independent of the placement stream.
        let seed = config.seed.map(|s| s.wrapping_add(1));
        Box::new(NoiseAugmenter::new(config.augment.settings(), seed)?)
    } else {
        Box::new(Identity)
    };

    let paths = BatchPaths {
        signatures: &args.signatures,
        stamps: &args.stamps,
        output: &args.out,
    };
    let report = run_batch(config, paths, font, text, augment, args.num)?;

    if report.generated() == 0 && args.num > 0 {
        bail!("no document could be generated ({} failed)", report.failed);
    }
    for (kind, n) in &report.failures {
        log::warn!("{n} documents failed with {kind}");
    }

    Ok(())
}

fn body_font(path: Option<&Path>, config: &GeneratorConfig) -> Result<BodyFont> {
    let font = match path {
        Some(path) => {
            let face = FontFace::open(path)
                .with_context(|| format!("failed to load font {}", path.display()))?;
            BodyFont::Embedded(Arc::new(face))
        }
        None => BodyFont::Helvetica,
    };

    let topics = config.prompt.topics.join(" ");
    if !font.supports(&topics)? {
        log::warn!("the body font cannot draw the prompt topics, pass --font with a matching font");
    }

    Ok(font)
}

fn signatures(args: SignatureArgs) -> Result<()> {
    let fonts = load_fonts(&args.fonts)
        .with_context(|| format!("failed to load fonts from {}", args.fonts.display()))?;
    generate_signatures(&fonts, &args.out, args.num, args.seed)?;
    Ok(())
}
