use std::{path::PathBuf, str::FromStr};

use autosize::{
    AutoEncircle, CoinDenomination, EncircleConfig, Orientation, SegmentationProfile, crop_mole,
    measure::DEFAULT_CROP_SIZE,
};
use autosize_cli::{build_encircler, CoinReport, TapRequest};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TapArgs {
    /// Photo to search
    #[arg(short, long)]
    image: PathBuf,
    /// Tap position in the displayed photo
    #[arg(long)]
    x: f64,
    #[arg(long)]
    y: f64,
    /// Radius of the tap circle
    #[arg(long, default_value = "30.0")]
    radius: f64,
    /// How the stored bitmap is displayed
    #[arg(long, default_value = "right", value_parser = Orientation::from_str)]
    orientation: Orientation,
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the final segmentation mask here
    #[arg(long)]
    debug_mask: Option<PathBuf>,
}

impl TapArgs {
    fn request(&self) -> TapRequest {
        TapRequest {
            image: self.image.clone(),
            x: self.x,
            y: self.y,
            radius: self.radius,
            orientation: self.orientation,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encircle the mole under a tap
    Mole {
        #[command(flatten)]
        tap: TapArgs,
        /// Also write a crop around the mole
        #[arg(long)]
        crop: Option<PathBuf>,
    },
    /// Encircle the reference coin under a tap
    Coin {
        #[command(flatten)]
        tap: TapArgs,
        /// Report the mm-per-pixel scale for this coin
        #[arg(long, value_parser = CoinDenomination::from_str)]
        denomination: Option<CoinDenomination>,
    },
    /// Print the built-in segmentation profiles as JSON
    Profiles,
    /// Print the default configuration as TOML
    Config,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Mole { tap, crop } => encircle_mole(tap, crop.as_ref())?,
        Commands::Coin { tap, denomination } => encircle_coin(tap, *denomination)?,
        Commands::Profiles => {
            let profiles = [
                SegmentationProfile::MOLE,
                SegmentationProfile::DARK_COIN,
                SegmentationProfile::SHINY_COIN,
            ];
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        }
        Commands::Config => print!("{}", EncircleConfig::default().to_toml()?),
    }

    Ok(())
}

fn write_debug_mask(
    encircler: &AutoEncircle,
    tap: &TapArgs,
    data: &autosize::FixableData,
    profile: &SegmentationProfile,
) -> Result<()> {
    if let Some(path) = &tap.debug_mask {
        let mask = encircler.debug_mask(data, profile)?;
        mask.bitmap().save(path)?;
        info!("Wrote {} mask to {:?}", profile.object_class(), path);
    }
    Ok(())
}

fn encircle_mole(tap: &TapArgs, crop: Option<&PathBuf>) -> Result<()> {
    let encircler = build_encircler(tap.config.as_deref())?;
    let data = tap.request().load()?;
    info!("Searching for a mole near ({}, {})", tap.x, tap.y);

    let mole = encircler.encircle_mole(&data)?;
    write_debug_mask(&encircler, tap, &data, &encircler.config().profiles.mole)?;

    if let (Some(path), Some(mole)) = (crop, mole) {
        let rotate = data.image.orientation() == Orientation::Right;
        crop_mole(&data.image, mole, rotate, DEFAULT_CROP_SIZE)?.save(path)?;
        info!("Wrote mole crop to {:?}", path);
    } else if crop.is_some() {
        return Err(eyre!("no mole found near the tap, nothing to crop"));
    }

    println!("{}", serde_json::to_string_pretty(&mole)?);
    Ok(())
}

fn encircle_coin(tap: &TapArgs, denomination: Option<CoinDenomination>) -> Result<()> {
    let encircler = build_encircler(tap.config.as_deref())?;
    let data = tap.request().load()?;
    info!("Searching for a coin near ({}, {})", tap.x, tap.y);

    let coin = encircler.encircle_coin(&data)?;
    write_debug_mask(&encircler, tap, &data, &encircler.config().profiles.dark_coin)?;

    println!("{}", serde_json::to_string_pretty(&CoinReport::new(coin, denomination))?);
    Ok(())
}
