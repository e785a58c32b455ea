/// Adapter, device and swapchain choices made once when the window opens.
///
/// The depth buffer format is fixed by the mesh pipeline and the pixel ratio
/// comes from the viewport, so neither lives here.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Pick an sRGB swapchain when the surface offers one. Shaders write
    /// linear color and rely on the swapchain to encode it.
    pub prefer_srgb: bool,

    /// `Fifo` is vsync and always available.
    pub present_mode: wgpu::PresentMode,
    /// Falls back to the first supported mode when `None` or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub desired_maximum_frame_latency: u32,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    /// `false` presents as fast as the backend allows, tearing if it must.
    pub fn vsync(mut self, on: bool) -> Self {
        self.present_mode = if on { wgpu::PresentMode::AutoVsync } else { wgpu::PresentMode::AutoNoVsync };
        self
    }

    /// Integrated GPU and downlevel limits, for laptops and older hardware.
    pub fn low_power(mut self) -> Self {
        self.power_preference = wgpu::PowerPreference::LowPower;
        self.required_limits = wgpu::Limits::downlevel_defaults();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_only_touch_their_fields() {
        let init = GpuInit::default().vsync(false).low_power();
        assert_eq!(init.present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(init.power_preference, wgpu::PowerPreference::LowPower);
        assert!(init.prefer_srgb);
        assert_eq!(init.backends, wgpu::Backends::all());
        assert_eq!(init.desired_maximum_frame_latency, 2);
    }
}
