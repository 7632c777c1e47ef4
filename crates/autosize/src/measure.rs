//! Measurement helpers built on top of encircled moles and coins.

use image::{imageops::FilterType, DynamicImage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{AutosizeError, Result},
    geometry::calc_clipping_rect,
    types::{CirclePosition, OrientedImage, Size},
};

/// Edge length of a stored mole crop.
pub const DEFAULT_CROP_SIZE: u32 = 320;

/// US coins usable as a size reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CoinDenomination {
    Penny,
    Nickel,
    Dime,
    Quarter,
}

impl CoinDenomination {
    pub fn diameter_mm(self) -> f64 {
        match self {
            Self::Penny => 19.05,
            Self::Nickel => 21.21,
            Self::Dime => 17.91,
            Self::Quarter => 24.26,
        }
    }

    /// Value in cents.
    pub fn to_int(self) -> u32 {
        match self {
            Self::Penny => 1,
            Self::Nickel => 5,
            Self::Dime => 10,
            Self::Quarter => 25,
        }
    }

    pub fn from_int(cents: u32) -> Option<Self> {
        match cents {
            1 => Some(Self::Penny),
            5 => Some(Self::Nickel),
            10 => Some(Self::Dime),
            25 => Some(Self::Quarter),
            _ => None,
        }
    }
}

/// Millimetres per image unit, given the coin's measured diameter.
pub fn mm_per_unit(diameter: f64, coin: CoinDenomination) -> Option<f64> {
    (diameter > 0.0).then(|| coin.diameter_mm() / diameter)
}

/// Mole diameter in millimetres, scaled by a coin in the same photo.
pub fn mole_diameter_mm(
    mole: CirclePosition,
    coin: CirclePosition,
    denomination: CoinDenomination,
) -> Option<f64> {
    if !mole.is_fit() {
        return None;
    }
    mm_per_unit(coin.radius * 2.0, denomination).map(|scale| mole.radius * 2.0 * scale)
}

/// Crop a square of four mole radii around `mole` (display frame).
///
/// The crop comes from the stored bitmap; pass `rotate90` to turn it
/// upright for right-tagged sources.
pub fn crop_mole(
    source: &OrientedImage,
    mole: CirclePosition,
    rotate90: bool,
    rescale_to: u32,
) -> Result<DynamicImage> {
    if !mole.is_fit() {
        return Err(AutosizeError::ImageProcessing(format!(
            "cannot crop around radius {}",
            mole.radius
        )));
    }
    if rescale_to == 0 {
        return Err(AutosizeError::ImageProcessing("crop size must be positive".into()));
    }

    let side = mole.radius * 4.0;
    let rect = calc_clipping_rect(mole, source, Size::new(side, side));
    let bounds = source.bitmap_size();

    let left = rect.left.max(0.0);
    let top = rect.top.max(0.0);
    let right = (rect.left + rect.width).min(bounds.width);
    let bottom = (rect.top + rect.height).min(bounds.height);
    if right <= left || bottom <= top {
        return Err(AutosizeError::ImageProcessing(format!(
            "crop rectangle {rect:?} is outside the image"
        )));
    }

    let cropped = source
        .bitmap()
        .crop_imm(left as u32, top as u32, (right - left) as u32, (bottom - top) as u32);
    let cropped = if rotate90 { cropped.rotate90() } else { cropped };
    Ok(cropped.resize_exact(rescale_to, rescale_to, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Orientation;
    use geo_types::Coord;
    use image::{GenericImageView, Rgb, RgbImage};
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn denominations_round_trip_through_cents() {
        for coin in CoinDenomination::iter() {
            assert_eq!(CoinDenomination::from_int(coin.to_int()), Some(coin));
            assert_eq!(CoinDenomination::from_str(coin.into()).expect("parse"), coin);
        }
        assert_eq!(CoinDenomination::from_int(50), None);
    }

    #[test]
    fn scale_from_coin() {
        let scale = mm_per_unit(48.52, CoinDenomination::Quarter).expect("positive diameter");
        assert!((scale - 0.5).abs() < 1e-12);
        assert_eq!(mm_per_unit(0.0, CoinDenomination::Dime), None);
        assert_eq!(mm_per_unit(-3.0, CoinDenomination::Dime), None);

        let coin = CirclePosition::new(Coord { x: 0.0, y: 0.0 }, 24.26);
        let mole = CirclePosition::new(Coord { x: 10.0, y: 10.0 }, 10.0);
        let mm = mole_diameter_mm(mole, coin, CoinDenomination::Quarter).expect("measurable");
        assert!((mm - 10.0).abs() < 1e-12);
        let unfit = CirclePosition::new(mole.center, -1.0);
        assert_eq!(mole_diameter_mm(unfit, coin, CoinDenomination::Quarter), None);
    }

    #[test]
    fn crop_is_centered_and_rescaled() {
        let mut bitmap = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        bitmap.put_pixel(100, 100, Rgb([0, 0, 0]));
        let source =
            OrientedImage::new(DynamicImage::ImageRgb8(bitmap), Orientation::Up).expect("valid");
        let mole = CirclePosition::new(Coord { x: 100.0, y: 100.0 }, 10.0);

        // 4 * radius is already 40, so no rescaling happens
        let crop = crop_mole(&source, mole, false, 40).expect("crop");
        assert_eq!(crop.dimensions(), (40, 40));
        let dark = crop.to_rgb8().pixels().filter(|p| p[0] < 255).count();
        assert!(dark > 0, "mole pixel survives the crop");

        let small = crop_mole(&source, mole, false, 16).expect("crop");
        assert_eq!(small.dimensions(), (16, 16));
    }

    #[test]
    fn crop_near_border_shifts_inside() {
        let bitmap = DynamicImage::ImageRgb8(RgbImage::new(100, 60));
        let source = OrientedImage::new(bitmap, Orientation::Right).expect("valid");
        let mole = CirclePosition::new(Coord { x: 2.0, y: 3.0 }, 5.0);
        let crop = crop_mole(&source, mole, true, DEFAULT_CROP_SIZE).expect("crop");
        assert_eq!(crop.dimensions(), (DEFAULT_CROP_SIZE, DEFAULT_CROP_SIZE));
    }

    #[test]
    fn crop_rejects_unfit_mole() {
        let bitmap = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        let source = OrientedImage::new(bitmap, Orientation::Up).expect("valid");
        let unfit = CirclePosition::new(Coord { x: 5.0, y: 5.0 }, CirclePosition::NO_FIT_RADIUS);
        assert!(crop_mole(&source, unfit, false, 32).is_err());
        assert!(crop_mole(&source, CirclePosition::new(unfit.center, 2.0), false, 0).is_err());
    }
}
