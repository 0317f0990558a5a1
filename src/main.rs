//! Binary entrypoint: load configuration, scan photos, render the collage,
//! and export it to disk.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use photo_collage::config::{self, CollageConfig};
use photo_collage::export;
use photo_collage::render::{
    BytesDecoder, CanvasSurface, CollageImageItem, CollageProgress, RenderPhase, RenderRequest,
    render_collage,
};
use photo_collage::scan;

#[derive(Debug, Parser)]
#[command(name = "photo-collage", about = "Pack photos into a collage grid")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override the canvas edge in pixels
    #[arg(long, value_name = "PIXELS")]
    size: Option<u32>,

    /// Override the inter-cell gap in pixels
    #[arg(long, value_name = "PIXELS")]
    gap: Option<u32>,

    /// Override the output file path
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Shuffle seed for reproducible collages
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("photo_collage={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn load_items(cfg: &CollageConfig) -> Result<(Vec<CollageImageItem>, Option<String>)> {
    let mut paths = scan::scan_photos(&cfg.photo_paths)?;
    if let Some(main) = &cfg.main_photo
        && !paths.contains(main)
    {
        paths.push(main.clone());
    }
    ensure!(!paths.is_empty(), "no images found in configured paths");

    let mut items = Vec::with_capacity(paths.len());
    for path in &paths {
        let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        items.push(CollageImageItem {
            id: path.display().to_string(),
            data,
        });
    }
    let main_id = cfg.main_photo.as_ref().map(|p| p.display().to_string());
    Ok((items, main_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = config::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(size) = cli.size {
        cfg.size = size;
    }
    if let Some(gap) = cli.gap {
        cfg.gap = gap;
    }
    if let Some(out) = cli.out {
        cfg.output.path = out;
    }
    if cli.seed.is_some() {
        cfg.shuffle_seed = cli.seed;
    }
    cfg.validate().context("validating configuration")?;

    let (items, main_id) = load_items(&cfg)?;
    info!(count = items.len(), "loaded source images");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let mut rng = match cfg.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let request = RenderRequest {
        items: &items,
        main_id: main_id.as_deref(),
        size: cfg.size,
        main_ratio: cfg.main_ratio,
        gap: cfg.gap,
        shuffle_others: cfg.shuffle_others,
        background: [cfg.background[0], cfg.background[1], cfg.background[2], 255],
    };

    let mut surface = CanvasSurface::new();
    let mut sink = |p: CollageProgress| match p.phase {
        RenderPhase::Layout => info!(total = p.total, "computing layout"),
        RenderPhase::Decode | RenderPhase::Render => {
            debug!(phase = ?p.phase, done = p.done, total = p.total, "progress");
        }
        RenderPhase::Export => info!("encoding output"),
    };

    let result = render_collage(
        &request,
        &BytesDecoder,
        &mut surface,
        &mut rng,
        &mut sink,
        &cancel,
    )
    .await;

    match result {
        Ok(()) => {}
        Err(err) if err.is_canceled() => {
            info!("render canceled");
            return Ok(());
        }
        Err(err) => return Err(err).context("rendering collage"),
    }

    sink(CollageProgress {
        phase: RenderPhase::Export,
        done: items.len(),
        total: items.len(),
        message: None,
    });
    let bytes = export::encode_canvas(surface.canvas(), &cfg.output.format, cfg.output.quality)
        .context("encoding collage")?;
    std::fs::write(&cfg.output.path, &bytes)
        .with_context(|| format!("writing {}", cfg.output.path.display()))?;
    info!(path = %cfg.output.path.display(), bytes = bytes.len(), "collage written");
    Ok(())
}
