//! tonezone — apply zonal shadow/midtone/highlight color balance to images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tonezone_core::{ZonalBalanceStage, ZoneImage, process_batch};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::ZoneOverrides;

#[derive(Parser)]
#[command(name = "tonezone")]
#[command(author, version, about = "Zonal shadow/midtone/highlight color balance")]
#[command(long_about = "
Recolors images by blending shadow, midtone and highlight adjustments with
smooth luminance weights. Zone values are R,G,B,BRIGHTNESS,CONTRAST where
R/G/B are percentages (-100..100) and brightness/contrast are multipliers.

Examples:
  tonezone in.png -o out/ --shadow 20,0,-10,1,1
  tonezone *.jpg -o graded/ -s look.json
  TONEZONE_SETTINGS=look.json tonezone a.png b.png -o out/
")]
struct Cli {
    /// Input images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for processed images (same file names as the inputs)
    #[arg(short, long)]
    output_dir: PathBuf,

    /// JSON settings file: {"enabled", "shadow", "middle", "highlight"}
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Shadow zone as R,G,B,BRIGHTNESS,CONTRAST
    #[arg(long, allow_hyphen_values = true)]
    shadow: Option<String>,

    /// Midtone zone as R,G,B,BRIGHTNESS,CONTRAST
    #[arg(long, allow_hyphen_values = true)]
    middle: Option<String>,

    /// Highlight zone as R,G,B,BRIGHTNESS,CONTRAST
    #[arg(long, allow_hyphen_values = true)]
    highlight: Option<String>,

    /// Pass images through unchanged
    #[arg(long)]
    disable: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load(path: &Path) -> Result<ZoneImage> {
    let img = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(ZoneImage::from_dynamic(&img))
}

fn output_path(dir: &Path, input: &Path) -> Result<PathBuf> {
    let Some(name) = input.file_name() else {
        bail!("input path has no file name: {}", input.display());
    };
    Ok(dir.join(name))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("failed to configure thread pool")?;
    }

    let overrides = ZoneOverrides {
        shadow: cli.shadow,
        middle: cli.middle,
        highlight: cli.highlight,
    };
    let settings = settings::resolve(cli.settings.as_deref(), &overrides, cli.disable)?;
    tracing::debug!("settings: {:?}", settings);

    let mut images = cli
        .inputs
        .iter()
        .map(|p| load(p))
        .collect::<Result<Vec<_>>>()?;

    let stage = ZonalBalanceStage::new(settings);
    let transformed = process_batch(&stage, &mut images).context("zonal balance failed")?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;

    for (input, image) in cli.inputs.iter().zip(images) {
        let out = output_path(&cli.output_dir, input)?;
        image
            .into_dynamic()?
            .save(&out)
            .with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!("{} -> {}", input.display(), out.display());
    }

    tracing::info!("{} of {} image(s) transformed", transformed, cli.inputs.len());
    Ok(())
}
