//! Object-level encirclers.
//!
//! Moles run one profile and may come back empty; coins run the shiny and
//! dark profiles and always return a circle, falling back to a default one
//! at the seed.

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::{
    algorithms::ImageprocOps,
    config::{CoinLimits, EncircleConfig, MoleLimits},
    error::Result,
    geometry::{ensure_orientation, from_working_frame, to_working_frame},
    pipeline::{self, builder::AutoEncircleBuilder},
    profile::{ObjectClass, SegmentationProfile},
    traits::ImageOps,
    types::{
        squared_distance, CirclePosition, FixableData, ObjectDetection, OrientedImage, Orientation,
        Point,
    },
};

/// One coin hypothesis: the circle found with a profile and its blob area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinCandidate {
    pub class: ObjectClass,
    pub circle: Option<CirclePosition>,
    pub blob_area: f64,
}

impl CoinCandidate {
    /// Blob pixels over fitted disk area; near 1 for solid round blobs.
    pub fn coverage(&self) -> Option<f64> {
        self.circle.map(|circle| self.blob_area / circle.area())
    }
}

/// Pick the candidate closest to `seed`, distance divided by coverage.
/// Candidates outside the open radius band never win; with no winner the
/// default circle at the seed is returned.
pub fn arbitrate_coin(
    seed: Point,
    candidates: &[CoinCandidate],
    limits: &CoinLimits,
) -> CirclePosition {
    let mut best = None;
    let mut best_score = limits.initial_score;

    for candidate in candidates {
        let Some(circle) = candidate.circle else {
            debug!(profile = %candidate.class, "coin candidate has no fit");
            continue;
        };
        if !(circle.radius > limits.min_radius && circle.radius < limits.max_radius) {
            debug!(
                profile = %candidate.class,
                radius = circle.radius,
                "coin candidate outside radius band"
            );
            continue;
        }
        let coverage = candidate.blob_area / circle.area();
        let score = squared_distance(circle.center, seed) / coverage;
        if score < best_score {
            debug!(profile = %candidate.class, score, coverage, "choosing coin candidate");
            best_score = score;
            best = Some(circle);
        }
    }

    best.unwrap_or_else(|| {
        warn!(
            x = seed.x,
            y = seed.y,
            radius = limits.default_radius,
            "no coin candidate qualified, using default circle"
        );
        CirclePosition::new(seed, limits.default_radius)
    })
}

pub fn clamp_mole_radius(circle: CirclePosition, limits: &MoleLimits) -> CirclePosition {
    CirclePosition::new(circle.center, circle.radius.clamp(limits.min_radius, limits.max_radius))
}

/// Entry point for the capture and fix workflows.
pub struct AutoEncircle {
    ops: Box<dyn ImageOps>,
    config: EncircleConfig,
}

impl AutoEncircle {
    pub fn new() -> Self {
        Self::from_parts(Box::new(ImageprocOps), EncircleConfig::default())
    }

    pub fn builder() -> AutoEncircleBuilder {
        AutoEncircleBuilder::new()
    }

    pub(crate) fn from_parts(ops: Box<dyn ImageOps>, config: EncircleConfig) -> Self {
        Self { ops, config }
    }

    pub fn config(&self) -> &EncircleConfig {
        &self.config
    }

    /// Run one profile on `data`, converting into and out of the bitmap frame.
    pub fn encircle_object(
        &self,
        data: &FixableData,
        profile: &SegmentationProfile,
    ) -> Result<ObjectDetection> {
        let working = ensure_orientation(&data.image, Orientation::Up);
        let seed = to_working_frame(data.circle.center, &data.image);

        let result =
            pipeline::encircle(self.ops.as_ref(), &self.config, working.bitmap(), seed, profile)?;

        let circle = result.circle.is_fit().then(|| {
            let center = from_working_frame(result.circle.center, &data.image);
            CirclePosition::new(center, result.circle.radius)
        });
        let debug_mask = OrientedImage::new(
            DynamicImage::ImageLuma8(result.debug_image),
            data.image.orientation(),
        )?;

        Ok(ObjectDetection {
            circle,
            debug_mask,
            blob_area: result.blob_area,
        })
    }

    /// Final mask of one profile run, shown the way the input is shown.
    pub fn debug_mask(
        &self,
        data: &FixableData,
        profile: &SegmentationProfile,
    ) -> Result<OrientedImage> {
        Ok(self.encircle_object(data, profile)?.debug_mask)
    }

    /// `None` when no blob is near the seed; callers keep the seed circle.
    pub fn encircle_mole(&self, data: &FixableData) -> Result<Option<CirclePosition>> {
        let detection = self.encircle_object(data, &self.config.profiles.mole)?;
        match detection.circle {
            Some(circle) => {
                let clamped = clamp_mole_radius(circle, &self.config.mole);
                info!(
                    x = clamped.center.x,
                    y = clamped.center.y,
                    radius = clamped.radius,
                    "mole encircled"
                );
                Ok(Some(clamped))
            }
            None => {
                info!("no mole found near seed");
                Ok(None)
            }
        }
    }

    pub fn encircle_coin(&self, data: &FixableData) -> Result<CirclePosition> {
        let profiles = [&self.config.profiles.shiny_coin, &self.config.profiles.dark_coin];
        let mut candidates = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let detection = self.encircle_object(data, profile)?;
            candidates.push(CoinCandidate {
                class: profile.object_class(),
                circle: detection.circle,
                blob_area: detection.blob_area,
            });
        }

        let coin = arbitrate_coin(data.circle.center, &candidates, &self.config.coin);
        info!(x = coin.center.x, y = coin.center.y, radius = coin.radius, "coin encircled");
        Ok(coin)
    }
}

impl Default for AutoEncircle {
    fn default() -> Self {
        Self::new()
    }
}
