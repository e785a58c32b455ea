/// Viewport tuning.
#[derive(Debug, Clone, Copy)]
pub struct ViewportConfig {
    /// Upper bound applied to the device pixel ratio. Rendering above 2x costs
    /// fill rate with little visible gain.
    pub max_pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { max_pixel_ratio: 2.0 }
    }
}

/// Current viewport, in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    /// Effective ratio (device ratio capped by the config).
    pub pixel_ratio: f32,
    pub fullscreen: bool,
}

impl ViewportState {
    /// `width / height`, or `None` for a degenerate (minimized) viewport.
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }

    /// Backing-store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| (v as f32 * self.pixel_ratio).round() as u32;
        (scale(self.width), scale(self.height))
    }
}
