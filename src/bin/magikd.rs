use std::{
    net::IpAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use magikd::{
    AppState, BoxSize, CpuImaging, DivisionInput, Effect, ElectionInput, EncodedImage,
    FsSourceFetcher, ServiceConfig, SvgRasterizer, encode::assembler::format_from_hint,
    service::http::load_overlay_template,
};

#[derive(Parser, Debug)]
#[command(name = "magikd", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Seam-carve an image (every frame of an animation).
    Distort(DistortArgs),
    /// Blend the pride flag over an image.
    Pride(PrideArgs),
    /// Render a division diagram from JSON.
    Division(ChartArgs),
    /// Render an election pie chart or table from JSON.
    Election(ChartArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Service configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    bind: Option<IpAddr>,
}

#[derive(Parser, Debug)]
struct DistortArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path. Its extension picks the format.
    #[arg(long)]
    out: PathBuf,

    /// Box the image is fitted into first, as WxH.
    #[arg(long = "box", default_value = "800x800", value_parser = parse_box)]
    bounds: BoxSize,
}

#[derive(Parser, Debug)]
struct PrideArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    out: PathBuf,

    /// Overlay image; the built-in flag when omitted.
    #[arg(long)]
    overlay: Option<PathBuf>,

    #[arg(long, default_value_t = 0.6)]
    opacity: f32,

    #[arg(long = "box", default_value = "800x800", value_parser = parse_box)]
    bounds: BoxSize,
}

#[derive(Parser, Debug)]
struct ChartArgs {
    /// Input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Extra directory of `ttf`/`otf` fonts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn parse_box(s: &str) -> Result<BoxSize, String> {
    BoxSize::parse(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    magikd::service::logging::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Distort(args) => {
            let config = ServiceConfig {
                box_width: args.bounds.width,
                box_height: args.bounds.height,
                ..ServiceConfig::default()
            };
            cmd_effect(Effect::Distort, config, &args.in_path, &args.out)
        }
        Command::Pride(args) => {
            let config = ServiceConfig {
                box_width: args.bounds.width,
                box_height: args.bounds.height,
                overlay_opacity: args.opacity,
                overlay_path: args.overlay,
                ..ServiceConfig::default()
            };
            cmd_effect(Effect::Pride, config, &args.in_path, &args.out)
        }
        Command::Division(args) => cmd_chart(args, |bytes, charts| {
            Ok(magikd::render_division(
                &DivisionInput::from_json(bytes)?,
                charts,
            )?)
        }),
        Command::Election(args) => cmd_chart(args, |bytes, charts| {
            Ok(magikd::render_election(
                &ElectionInput::from_json(bytes)?,
                charts,
            )?)
        }),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_path(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    let state = AppState::from_config(config)?;
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?
        .block_on(magikd::serve(state))
}

fn cmd_effect(
    effect: Effect,
    config: ServiceConfig,
    input: &Path,
    out: &Path,
) -> anyhow::Result<()> {
    config.validate()?;
    let overlay = load_overlay_template(&config)?;
    let state = AppState::new(
        config,
        Arc::new(CpuImaging::default()),
        overlay,
        SvgRasterizer::without_fonts(),
        Arc::new(FsSourceFetcher::new(".")?),
    )?;

    let bytes =
        std::fs::read(input).with_context(|| format!("read image '{}'", input.display()))?;
    let hint = out.to_string_lossy();
    let (encoded, _name) = state.run_effect(effect, &bytes, Some(hint.as_ref()))?;
    if format_from_hint(&hint) != Some(encoded.format) {
        tracing::warn!(
            out = %out.display(),
            format = ?encoded.format,
            "output written in a format its extension does not name"
        );
    }
    write_output(out, &encoded)
}

fn cmd_chart(
    args: ChartArgs,
    render: impl FnOnce(&[u8], &SvgRasterizer) -> anyhow::Result<EncodedImage>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read chart json '{}'", args.in_path.display()))?;
    let charts = SvgRasterizer::new(args.fonts_dir.as_deref());
    let encoded = render(&bytes, &charts)?;
    write_output(&args.out, &encoded)
}

fn write_output(out: &Path, encoded: &EncodedImage) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, &encoded.bytes)
        .with_context(|| format!("write image '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} frame(s), {:?})",
        out.display(),
        encoded.frames,
        encoded.format
    );
    Ok(())
}
