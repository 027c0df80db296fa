use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use posterframe::{
    Category, FontBook, MediaElement, MediaFactory, MediaRef, OpenOptions, Page, PosterConfig,
    PosterFormat, PosterGenerator, ScriptedMedia,
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "posterframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate posters for every video in a page manifest that lacks one.
    Generate(GenerateArgs),
    /// Render a single category placeholder.
    Placeholder(PlaceholderArgs),
    /// Print media metadata and the capture timestamp (requires `ffprobe` on PATH).
    Probe(ProbeArgs),
    /// Print the YouTube player iframe for a video id.
    Embed(EmbedArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input page manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for poster files and `posters.json`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Optional poster config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poster encoding.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Include data URLs in `posters.json`.
    #[arg(long)]
    data_urls: bool,

    /// Skip media entirely; every video gets its category placeholder.
    #[arg(long)]
    dry_run: bool,

    /// Extra directory of `.ttf`/`.otf`/`.ttc` fonts for placeholder text.
    #[arg(long)]
    font_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlaceholderArgs {
    /// Section id or category label (e.g. `gaming`, `music-videos`).
    #[arg(long)]
    category: Option<String>,

    /// Title text; defaults to the category title.
    #[arg(long)]
    title: Option<String>,

    /// Output image path; the extension is not inspected.
    #[arg(long)]
    out: PathBuf,

    /// Optional poster config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poster encoding.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Extra font directory.
    #[arg(long)]
    font_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Media file path or URL.
    #[arg(long)]
    src: String,

    /// Optional poster config JSON (seek settings).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct EmbedArgs {
    /// YouTube video id.
    #[arg(long)]
    id: String,

    /// Print the attributes as JSON instead of HTML.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

impl From<FormatChoice> for PosterFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Jpeg => PosterFormat::Jpeg,
            FormatChoice::Png => PosterFormat::Png,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Placeholder(args) => cmd_placeholder(args),
        Command::Probe(args) => cmd_probe(args),
        Command::Embed(args) => cmd_embed(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<PosterConfig> {
    match path {
        Some(p) => Ok(PosterConfig::from_path(p)?),
        None => Ok(PosterConfig::default()),
    }
}

fn make_generator(cfg: PosterConfig, font_dir: Option<&Path>) -> anyhow::Result<PosterGenerator> {
    let fonts = FontBook::load(font_dir);
    tracing::debug!(faces = fonts.face_count(), "fonts ready");
    Ok(PosterGenerator::with_fonts(cfg, fonts)?)
}

fn dry_run_factory() -> Box<MediaFactory> {
    Box::new(|_: &MediaRef, _: OpenOptions| -> Box<dyn MediaElement> {
        Box::new(ScriptedMedia::failing("dry run: media not loaded"))
    })
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = read_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        cfg.format = format.into();
    }
    if let Some(quality) = args.quality {
        cfg.jpeg_quality = quality;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    cfg.embed_data_urls |= args.data_urls;
    let embed_data_urls = cfg.embed_data_urls;

    let mut page = Page::from_path(&args.in_path)
        .with_context(|| format!("load page manifest '{}'", args.in_path.display()))?;
    let generator = make_generator(cfg, args.font_dir.as_deref())?;

    let factory = if args.dry_run {
        dry_run_factory()
    } else {
        posterframe::ffmpeg_factory()
    };
    let report = page.generate_missing(&generator, factory.as_ref())?;

    let index = page
        .write_posters(&args.out_dir, embed_data_urls)
        .with_context(|| format!("write posters to '{}'", args.out_dir.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "wrote {} posters to {}",
        index.len(),
        args.out_dir.display()
    );

    if !report.failed.is_empty() {
        anyhow::bail!("{} video(s) failed poster generation", report.failed.len());
    }
    Ok(())
}

fn cmd_placeholder(args: PlaceholderArgs) -> anyhow::Result<()> {
    let mut cfg = read_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        cfg.format = format.into();
    }
    let generator = make_generator(cfg, args.font_dir.as_deref())?;

    let category = Category::from_label(args.category.as_deref());
    let poster = generator.placeholder(category, args.title.as_deref())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &poster.bytes)
        .with_context(|| format!("write poster '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let src = MediaRef::new(args.src)?;
    let meta = posterframe::media::ffmpeg::probe(&src)
        .with_context(|| format!("probe '{src}'"))?;
    let policy = posterframe::CapturePolicy::from_config(&cfg);
    let size =
        posterframe::capture::capture_size(meta.width, meta.height, policy.fallback_size);
    let seek_sec = posterframe::seek_target(
        meta.duration_sec,
        policy.seek_cap_sec,
        policy.seek_fraction,
    );

    let out = serde_json::json!({
        "src": src.as_str(),
        "width": meta.width,
        "height": meta.height,
        "duration_sec": meta.duration_sec.is_finite().then_some(meta.duration_sec),
        "capture_size": size,
        "seek_sec": seek_sec,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_embed(args: EmbedArgs) -> anyhow::Result<()> {
    let embed = posterframe::youtube_embed(&args.id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&embed)?);
    } else {
        println!("{}", embed.to_html());
    }
    Ok(())
}
