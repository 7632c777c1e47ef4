use std::path::{Path, PathBuf};

use autosize::{
    AutoEncircle, AutosizeError, CirclePosition, CoinDenomination, EncircleConfig, FixableData,
    OrientedImage, Orientation, mm_per_unit,
};
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Autosize(#[from] AutosizeError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error("radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// A tap on a displayed photo.
#[derive(Debug, Clone, PartialEq)]
pub struct TapRequest {
    pub image: PathBuf,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub orientation: Orientation,
}

impl TapRequest {
    pub fn seed(&self) -> CirclePosition {
        CirclePosition::new(Coord { x: self.x, y: self.y }, self.radius)
    }

    pub fn load(&self) -> Result<FixableData, CliError> {
        if !(self.radius > 0.0) {
            return Err(CliError::InvalidRadius(self.radius));
        }
        let bitmap = image::open(&self.image)?;
        let image = OrientedImage::new(bitmap, self.orientation)?;
        Ok(FixableData::new(image, self.seed()))
    }
}

/// JSON printed for a coin run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinReport {
    pub circle: CirclePosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denomination: Option<CoinDenomination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mm_per_pixel: Option<f64>,
}

impl CoinReport {
    pub fn new(circle: CirclePosition, denomination: Option<CoinDenomination>) -> Self {
        let mm_per_pixel = denomination.and_then(|coin| mm_per_unit(circle.radius * 2.0, coin));
        Self {
            circle,
            denomination,
            mm_per_pixel,
        }
    }
}

pub fn build_encircler(config: Option<&Path>) -> Result<AutoEncircle, CliError> {
    let config = match config {
        Some(path) => EncircleConfig::from_file(path)?,
        None => EncircleConfig::default(),
    };
    Ok(AutoEncircle::builder().with_config(config).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_report_includes_scale_only_with_denomination() {
        let circle = CirclePosition::new(Coord { x: 10.0, y: 10.0 }, 12.13);
        let report = CoinReport::new(circle, Some(CoinDenomination::Quarter));
        let scale = report.mm_per_pixel.expect("quarter has a diameter");
        assert!((scale - 1.0).abs() < 1e-12);

        let json = serde_json::to_value(CoinReport::new(circle, None)).expect("serialize");
        assert!(json.get("mm_per_pixel").is_none());
        assert!(json.get("denomination").is_none());
        assert_eq!(json["circle"]["radius"], 12.13);
    }

    #[test]
    fn non_positive_radius_is_rejected_before_loading() {
        let request = TapRequest {
            image: PathBuf::from("does-not-exist.jpg"),
            x: 1.0,
            y: 1.0,
            radius: 0.0,
            orientation: Orientation::Up,
        };
        assert!(matches!(request.load(), Err(CliError::InvalidRadius(_))));
    }

    #[test]
    fn flag_values_parse_through_library_enums() {
        assert_eq!("right".parse::<Orientation>().expect("orientation"), Orientation::Right);
        assert_eq!("up".parse::<Orientation>().expect("orientation"), Orientation::Up);
        let quarter = "quarter".parse::<CoinDenomination>().expect("denomination");
        assert_eq!(quarter, CoinDenomination::Quarter);
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn default_encircler_without_config_file() {
        let encircler = build_encircler(None).expect("defaults are valid");
        assert_eq!(encircler.config(), &EncircleConfig::default());
    }
}
