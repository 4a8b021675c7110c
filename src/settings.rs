//! Image settings.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::*;

/// Color mode of the image.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One gray channel.
    Gray,
    /// Red, green and blue.
    Rgb,
}

impl Channels {
    /// Gets the number of channels.
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }

    /// Gets the channel names, in order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Channels::Gray => &["gray"],
            Channels::Rgb => &["red", "green", "blue"],
        }
    }
}

/// Specifies what image to generate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color mode.
    pub channels: Channels,
    /// Tree generation settings, shared by all channels.
    pub gen: GenSettings,
    /// Seed of the random number generator.
    ///
    /// When `None`, the generator is seeded from the operating system.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            width: 301,
            height: 301,
            channels: Channels::Gray,
            gen: GenSettings::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Creates settings for an image size, using defaults for the rest.
    pub fn new(width: u32, height: u32) -> Settings {
        Settings {width, height, ..Settings::default()}
    }

    /// Checks the settings before any work is done.
    ///
    /// Width and height must be at least 2,
    /// since the pixel grid spans `[-1, 1]` edge to edge.
    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 2 {
            return Err(Error::config(format!(
                "image must be at least 2x2 pixels, got {}x{}", self.width, self.height)));
        }
        self.gen.validate()
    }

    /// Creates the random number generator for these settings.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
