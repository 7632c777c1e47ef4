use crate::{
    algorithms::ImageprocOps,
    config::EncircleConfig,
    encircler::AutoEncircle,
    error::Result,
    traits::ImageOps,
};

/// Builder for [`AutoEncircle`] with a fluent API
pub struct AutoEncircleBuilder {
    ops: Option<Box<dyn ImageOps>>,
    config: EncircleConfig,
}

impl AutoEncircleBuilder {
    pub fn new() -> Self {
        Self {
            ops: None,
            config: EncircleConfig::default(),
        }
    }

    /// Swap the image-operations backend (replaces any existing one)
    pub fn with_ops<O>(mut self, ops: O) -> Self
    where
        O: ImageOps + 'static,
    {
        self.ops = Some(Box::new(ops));
        self
    }

    pub fn with_config(mut self, config: EncircleConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration; the imageproc backend is used unless
    /// another one was set.
    pub fn build(self) -> Result<AutoEncircle> {
        self.config.validate()?;
        let ops = self.ops.unwrap_or_else(|| Box::new(ImageprocOps));
        Ok(AutoEncircle::from_parts(ops, self.config))
    }
}

impl Default for AutoEncircleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
