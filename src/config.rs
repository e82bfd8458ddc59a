//! Server limits.

/// Limits applied to rendering requests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Largest accepted scale factor for image tools.
    pub max_scale: f32,
    /// Largest accepted pixel area of a rendered image or crop.
    ///
    /// The default fits a 14400x14400 pt page, the largest PDF allows, at scale 1.0.
    pub max_pixels: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_scale: 10.0,
            max_pixels: 250_000_000,
        }
    }
}
