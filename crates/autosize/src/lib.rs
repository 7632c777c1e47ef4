//! # Autosize
//!
//! Seeded auto-encircling of skin moles and reference coins in photographs.
//! The user taps near an object; the library segments the neighbourhood and
//! returns the smallest circle around the blob under the tap.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: every image primitive sits behind [`ImageOps`]
//! - **Segmentation Profiles**: validated presets for moles, dark coins and shiny coins
//! - **Orientation Aware**: results come back in the frame the photo is displayed in
//! - **Coin Arbitration**: two profiles compete, with a default circle as fallback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autosize::{AutoEncircle, CirclePosition, FixableData, OrientedImage, Orientation};
//! use geo_types::Coord;
//!
//! let photo = image::open("mole.jpg")?;
//! let image = OrientedImage::new(photo, Orientation::Right)?;
//! let tap = CirclePosition::new(Coord { x: 420.0, y: 610.0 }, 30.0);
//!
//! let encircler = AutoEncircle::new();
//! if let Some(mole) = encircler.encircle_mole(&FixableData::new(image, tap))? {
//!     println!("mole at {:?}, radius {}", mole.center, mole.radius);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Setup
//!
//! ```rust,no_run
//! use autosize::{AutoEncircle, EncircleConfig};
//!
//! let config = EncircleConfig::from_file("autosize.toml")?;
//! let encircler = AutoEncircle::builder().with_config(config).build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod geometry;
pub mod profile;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod config;
pub mod encircler;
pub mod measure;

pub use error::{AutosizeError, Result};
pub use types::*;
pub use profile::*;
pub use traits::*;
pub use config::{CoinLimits, EncircleConfig, MoleLimits, ProfileSet};
pub use encircler::{arbitrate_coin, AutoEncircle, CoinCandidate};
pub use pipeline::{builder::AutoEncircleBuilder, encircle};
pub use algorithms::ImageprocOps;
pub use measure::{crop_mole, mm_per_unit, CoinDenomination};
