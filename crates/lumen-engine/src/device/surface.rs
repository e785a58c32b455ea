use crate::render::RenderError;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *caps.formats.first()?;
    if prefer_srgb {
        let preferred = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }
    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Maps a swapchain acquisition failure onto the frame loop's error model.
///
/// `Lost`/`Outdated` need a reconfigure (done by the caller); `OutOfMemory`
/// ends rendering.
pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> RenderError {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => RenderError::Fatal(err.to_string()),
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => RenderError::SkipFrame(err.to_string()),
    }
}
