use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chroma_matte::Compositor as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "chroma-matte", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key a single still image to a transparent PNG.
    Frame(FrameArgs),
    /// Key a video or image sequence into a directory of transparent PNGs.
    Render(RenderArgs),
    /// Write the embedded web document for a media URI.
    Embed(EmbedArgs),
    /// Print the generated shader sources.
    Shader(ShaderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image (PNG or JPEG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Compositor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend to use; overrides the config.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input video file (requires the `media-ffmpeg` feature) or directory of frames.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Compositor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend to use; overrides the config.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Frame rate for image sequences, e.g. `30` or `30000/1001`.
    #[arg(long, default_value = "30")]
    fps: String,
}

#[derive(Parser, Debug)]
struct EmbedArgs {
    /// Media URI the document will play.
    #[arg(long)]
    uri: String,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Compositor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ShaderArgs {
    /// Shader language.
    #[arg(long, value_enum, default_value_t = ShaderLang::Wgsl)]
    lang: ShaderLang,

    /// Compositor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Gpu,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShaderLang {
    Wgsl,
    Glsl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Embed(args) => cmd_embed(args),
        Command::Shader(args) => cmd_shader(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<chroma_matte::MatteConfig> {
    match path {
        Some(p) => chroma_matte::MatteConfig::load(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(chroma_matte::MatteConfig::default()),
    }
}

fn backend_kind(
    choice: Option<BackendChoice>,
    cfg: &chroma_matte::MatteConfig,
) -> chroma_matte::BackendKind {
    match choice {
        Some(BackendChoice::Cpu) => chroma_matte::BackendKind::Cpu,
        Some(BackendChoice::Gpu) => chroma_matte::BackendKind::Gpu,
        None => cfg.backend,
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let frame = chroma_matte::load_image(&args.in_path)?;

    let kind = backend_kind(args.backend, &cfg);
    let mut compositor = chroma_matte::create_compositor(kind, frame.size(), &cfg.key)
        .with_context(|| format!("create {kind:?} compositor"))?;
    compositor.draw(&frame)?;
    let out = compositor.readback()?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    chroma_matte::write_png(&args.out, &out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let fps = chroma_matte::Fps::parse_ratio(&args.fps)?;
    let uri = chroma_matte::MediaUri::parse(args.in_path.to_string_lossy())?;
    let source = chroma_matte::open_source(&uri, fps)
        .with_context(|| format!("open '{}'", args.in_path.display()))?;

    let kind = backend_kind(args.backend, &cfg);
    let compositor = chroma_matte::create_compositor(kind, cfg.surface.pixel_size(), &cfg.key)
        .with_context(|| format!("create {kind:?} compositor"))?;

    let mut session = chroma_matte::PlaybackSession::new(source, compositor)
        .with_play_retry_interval(cfg.play_retry_interval);
    let mut sink = chroma_matte::PngSequenceSink::new(&args.out_dir);
    let summary = chroma_matte::render_to_sink(&mut session, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        summary.frames_drawn,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_embed(args: EmbedArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let uri = chroma_matte::MediaUri::parse(args.uri)?;
    let doc = chroma_matte::EmbeddedDocument::build_with(&uri, &cfg.key, (&cfg).into())?;

    std::fs::write(&args.out, &doc.html)
        .with_context(|| format!("write html '{}'", args.out.display()))?;

    match &doc.base_url {
        Some(base) => println!("{base}"),
        None => eprintln!("warning: no base url could be derived from '{uri}'"),
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_shader(args: ShaderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    match args.lang {
        ShaderLang::Wgsl => print!("{}", chroma_matte::shader::wgsl_source(&cfg.key)),
        ShaderLang::Glsl => {
            println!("// vertex");
            print!("{}", chroma_matte::shader::glsl_vertex_source());
            println!("// fragment");
            print!("{}", chroma_matte::shader::glsl_fragment_source(&cfg.key));
        }
    }
    Ok(())
}
