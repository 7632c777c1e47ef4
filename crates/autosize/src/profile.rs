use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{AutosizeError, Result};

/// What the pipeline is looking for; selects the color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Mole,
    DarkCoin,
    ShinyCoin,
}

impl ObjectClass {
    /// Shiny metal separates best in blue; skin and dark coins in red.
    pub fn channel(self) -> ColorChannel {
        match self {
            Self::ShinyCoin => ColorChannel::Blue,
            Self::Mole | Self::DarkCoin => ColorChannel::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Which side of the local mean becomes foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Foreground where `pixel > mean - offset`.
    BrightOnDark,
    /// Foreground where `pixel <= mean - offset`.
    DarkOnBright,
}

/// Serialized form of a profile; turned into a [`SegmentationProfile`] only
/// through validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub object_class: ObjectClass,
    pub adaptive_threshold_block_size: u32,
    pub adaptive_threshold_offset: i32,
    pub adaptive_threshold_polarity: Polarity,
    pub blur_kernel_size: u32,
    pub blur_sigma: f64,
    pub erode_kernel_size: u32,
    pub dilate_kernel_size: u32,
}

/// Every tunable of one encircle run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileSpec", into = "ProfileSpec")]
pub struct SegmentationProfile {
    object_class: ObjectClass,
    block_size: u32,
    offset: i32,
    polarity: Polarity,
    blur_kernel_size: u32,
    blur_sigma: f64,
    erode_kernel_size: u32,
    dilate_kernel_size: u32,
}

impl SegmentationProfile {
    pub const MOLE: Self =
        Self::preset(ObjectClass::Mole, 39, 5, Polarity::DarkOnBright, 7, 2.5, 11, 9);
    pub const DARK_COIN: Self =
        Self::preset(ObjectClass::DarkCoin, 55, 10, Polarity::DarkOnBright, 11, 3.5, 25, 23);
    pub const SHINY_COIN: Self =
        Self::preset(ObjectClass::ShinyCoin, 65, -16, Polarity::BrightOnDark, 5, 2.0, 21, 21);

    /// Compile-time checked constructor for the built-in profiles.
    #[allow(clippy::too_many_arguments)]
    const fn preset(
        object_class: ObjectClass,
        block_size: u32,
        offset: i32,
        polarity: Polarity,
        blur_kernel_size: u32,
        blur_sigma: f64,
        erode_kernel_size: u32,
        dilate_kernel_size: u32,
    ) -> Self {
        assert!(block_size % 2 == 1 && block_size >= 3, "block size must be odd and at least 3");
        assert!(blur_kernel_size % 2 == 1, "blur kernel size must be odd");
        assert!(blur_sigma > 0.0, "blur sigma must be positive");
        assert!(
            erode_kernel_size > 0 && dilate_kernel_size > 0,
            "morphology kernels must be non-empty"
        );
        assert!(offset >= -255 && offset <= 255, "offset must fit the 8-bit range");
        Self {
            object_class,
            block_size,
            offset,
            polarity,
            blur_kernel_size,
            blur_sigma,
            erode_kernel_size,
            dilate_kernel_size,
        }
    }

    pub fn new(spec: ProfileSpec) -> Result<Self> {
        let invalid = |field, reason: &str| AutosizeError::InvalidProfile {
            field,
            reason: reason.to_owned(),
        };

        if spec.adaptive_threshold_block_size % 2 == 0 || spec.adaptive_threshold_block_size < 3 {
            return Err(invalid("adaptive_threshold_block_size", "must be odd and at least 3"));
        }
        if !(-255..=255).contains(&spec.adaptive_threshold_offset) {
            return Err(invalid("adaptive_threshold_offset", "must lie in -255..=255"));
        }
        if spec.blur_kernel_size % 2 == 0 {
            return Err(invalid("blur_kernel_size", "must be odd"));
        }
        if !spec.blur_sigma.is_finite() || spec.blur_sigma <= 0.0 {
            return Err(invalid("blur_sigma", "must be a positive number"));
        }
        if spec.erode_kernel_size == 0 {
            return Err(invalid("erode_kernel_size", "must be positive"));
        }
        if spec.dilate_kernel_size == 0 {
            return Err(invalid("dilate_kernel_size", "must be positive"));
        }

        Ok(Self {
            object_class: spec.object_class,
            block_size: spec.adaptive_threshold_block_size,
            offset: spec.adaptive_threshold_offset,
            polarity: spec.adaptive_threshold_polarity,
            blur_kernel_size: spec.blur_kernel_size,
            blur_sigma: spec.blur_sigma,
            erode_kernel_size: spec.erode_kernel_size,
            dilate_kernel_size: spec.dilate_kernel_size,
        })
    }

    pub fn for_class(class: ObjectClass) -> Self {
        match class {
            ObjectClass::Mole => Self::MOLE,
            ObjectClass::DarkCoin => Self::DARK_COIN,
            ObjectClass::ShinyCoin => Self::SHINY_COIN,
        }
    }

    pub fn object_class(&self) -> ObjectClass {
        self.object_class
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn blur_kernel_size(&self) -> u32 {
        self.blur_kernel_size
    }

    pub fn blur_sigma(&self) -> f64 {
        self.blur_sigma
    }

    pub fn erode_kernel_size(&self) -> u32 {
        self.erode_kernel_size
    }

    pub fn dilate_kernel_size(&self) -> u32 {
        self.dilate_kernel_size
    }

    pub fn to_spec(&self) -> ProfileSpec {
        self.clone().into()
    }
}

impl TryFrom<ProfileSpec> for SegmentationProfile {
    type Error = AutosizeError;

    fn try_from(spec: ProfileSpec) -> Result<Self> {
        Self::new(spec)
    }
}

impl From<SegmentationProfile> for ProfileSpec {
    fn from(profile: SegmentationProfile) -> Self {
        Self {
            object_class: profile.object_class,
            adaptive_threshold_block_size: profile.block_size,
            adaptive_threshold_offset: profile.offset,
            adaptive_threshold_polarity: profile.polarity,
            blur_kernel_size: profile.blur_kernel_size,
            blur_sigma: profile.blur_sigma,
            erode_kernel_size: profile.erode_kernel_size,
            dilate_kernel_size: profile.dilate_kernel_size,
        }
    }
}

impl fmt::Display for SegmentationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (block {}, offset {}, {}, blur {}/{}, erode {}, dilate {})",
            self.object_class,
            self.block_size,
            self.offset,
            self.polarity,
            self.blur_kernel_size,
            self.blur_sigma,
            self.erode_kernel_size,
            self.dilate_kernel_size,
        )
    }
}
