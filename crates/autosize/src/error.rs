use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutosizeError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Unsupported color type {0:?}: a color channel cannot be extracted")]
    UnsupportedColorType(image::ColorType),

    #[error("Invalid segmentation profile field `{field}`: {reason}")]
    InvalidProfile { field: &'static str, reason: String },

    #[error("Invalid structuring element: {0}")]
    InvalidKernel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

pub type Result<T> = std::result::Result<T, AutosizeError>;
