use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    algorithms::BorderPolicy,
    error::{AutosizeError, Result},
    profile::{ObjectClass, SegmentationProfile},
};

/// Radius band a mole detection is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoleLimits {
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for MoleLimits {
    fn default() -> Self {
        Self {
            min_radius: 5.0,
            max_radius: 80.0,
        }
    }
}

/// Coin arbitration bounds and fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinLimits {
    /// Candidates must be strictly larger.
    pub min_radius: f64,
    /// Candidates must be strictly smaller.
    pub max_radius: f64,
    /// Radius of the circle returned when no candidate qualifies.
    pub default_radius: f64,
    /// Score a candidate has to beat.
    pub initial_score: f64,
}

impl Default for CoinLimits {
    fn default() -> Self {
        Self {
            min_radius: 12.0,
            max_radius: 55.0,
            default_radius: 25.0,
            initial_score: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSet {
    pub mole: SegmentationProfile,
    pub dark_coin: SegmentationProfile,
    pub shiny_coin: SegmentationProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            mole: SegmentationProfile::MOLE,
            dark_coin: SegmentationProfile::DARK_COIN,
            shiny_coin: SegmentationProfile::SHINY_COIN,
        }
    }
}

impl ProfileSet {
    pub fn get(&self, class: ObjectClass) -> &SegmentationProfile {
        match class {
            ObjectClass::Mole => &self.mole,
            ObjectClass::DarkCoin => &self.dark_coin,
            ObjectClass::ShinyCoin => &self.shiny_coin,
        }
    }
}

/// Tunables that are not part of a profile.
///
/// The prune threshold and hair kernel size are empirical values; keep them
/// unless revalidated against real photographs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncircleConfig {
    /// Border-touching components above this pixel count are discarded.
    pub prune_area_threshold: u32,
    /// Size of the open (erode, dilate) element that strips hairs.
    pub hair_kernel_size: u32,
    /// How far outside a component's bounding box the seed may fall.
    pub seed_tolerance: f64,
    pub blur_border: BorderPolicy,
    pub mole: MoleLimits,
    pub coin: CoinLimits,
    pub profiles: ProfileSet,
}

impl Default for EncircleConfig {
    fn default() -> Self {
        Self {
            prune_area_threshold: 105,
            hair_kernel_size: 7,
            seed_tolerance: 10.0,
            blur_border: BorderPolicy::Replicate,
            mole: MoleLimits::default(),
            coin: CoinLimits::default(),
            profiles: ProfileSet::default(),
        }
    }
}

impl EncircleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hair_kernel_size == 0 {
            return Err(AutosizeError::InvalidConfig("hair_kernel_size must be positive".into()));
        }
        if !(self.seed_tolerance >= 0.0) {
            return Err(AutosizeError::InvalidConfig("seed_tolerance must not be negative".into()));
        }
        if !(self.mole.min_radius < self.mole.max_radius) {
            return Err(AutosizeError::InvalidConfig(format!(
                "mole radius band is empty: {} .. {}",
                self.mole.min_radius, self.mole.max_radius
            )));
        }
        if !(self.coin.min_radius < self.coin.max_radius) {
            return Err(AutosizeError::InvalidConfig(format!(
                "coin radius band is empty: {} .. {}",
                self.coin.min_radius, self.coin.max_radius
            )));
        }
        if !(self.coin.default_radius > 0.0) {
            return Err(AutosizeError::InvalidConfig("coin default_radius must be positive".into()));
        }
        let classes = [
            (ObjectClass::Mole, &self.profiles.mole),
            (ObjectClass::DarkCoin, &self.profiles.dark_coin),
            (ObjectClass::ShinyCoin, &self.profiles.shiny_coin),
        ];
        for (class, profile) in classes {
            if profile.object_class() != class {
                return Err(AutosizeError::InvalidConfig(format!(
                    "profile in the {class} slot targets {}",
                    profile.object_class()
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EncircleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: EncircleConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(AutosizeError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
