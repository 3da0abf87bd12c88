//! Conversion options

use pageplane_core::{AffinityCheck, PlaneLayout, RepackStrategy, Resolution};

/// Options controlling how pages are rasterized and repacked
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Rasterization resolution (default: 300 dpi on both axes)
    pub resolution: Resolution,
    /// Repacker variant (default: row-cached)
    pub strategy: RepackStrategy,
    /// How the row-cached repacker decides a plane is affine
    pub affinity: AffinityCheck,
    /// Storage layout of the destination planes (default: bottom-up,
    /// plane-major, unpadded)
    pub layout: PlaneLayout,
    /// RGB color pages are cleared to before drawing (default: white)
    pub background: [u8; 3],
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            strategy: RepackStrategy::default(),
            affinity: AffinityCheck::default(),
            layout: PlaneLayout::default(),
            background: [255, 255, 255],
        }
    }
}

impl ConvertOptions {
    /// Set the same resolution on both axes.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.resolution = Resolution::uniform(dpi);
        self
    }

    /// Set the resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the repacker variant.
    pub fn with_strategy(mut self, strategy: RepackStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the affinity check.
    pub fn with_affinity(mut self, affinity: AffinityCheck) -> Self {
        self.affinity = affinity;
        self
    }

    /// Set the destination layout.
    pub fn with_layout(mut self, layout: PlaneLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }
}
