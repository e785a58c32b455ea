//! Engine error taxonomy.
//!
//! - [`ConfigError`]: invalid setup parameters; fatal at initialization.
//! - [`LoadError`]: per-resource load failure; the resource becomes `Errored`
//!   and the frame loop keeps running.
//! - [`PlatformError`]: a host capability was denied (e.g. fullscreen); logged
//!   and rolled back to the last known-good state.

use std::path::PathBuf;

/// Setup-time configuration error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("camera near plane must be positive and finite (got {near})")]
    InvalidNear { near: f32 },

    #[error("camera near plane ({near}) must be less than far plane ({far})")]
    NearNotLessThanFar { near: f32, far: f32 },

    #[error("perspective field of view must be in (0, 180) degrees (got {fov_deg})")]
    InvalidFov { fov_deg: f32 },

    #[error("aspect ratio must be positive and finite (got {aspect})")]
    InvalidAspect { aspect: f32 },

    #[error("orthographic extents are degenerate (left {left}, right {right}, top {top}, bottom {bottom})")]
    DegenerateOrthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },

    #[error("orbit {what} range is empty or not a number (min {min}, max {max})")]
    InvalidOrbitRange { what: &'static str, min: f32, max: f32 },

    #[error("orbit {what} must be positive and finite (got {value})")]
    InvalidOrbitFactor { what: &'static str, value: f32 },

    #[error("render surface is missing: {0}")]
    MissingSurface(String),
}

/// Per-resource load failure.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {uri} ({path}): {source}")]
    Io {
        uri: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {uri}: {message}")]
    Decode { uri: String, message: String },

    #[error("load of {uri} was abandoned before completion")]
    Abandoned { uri: String },
}

impl LoadError {
    /// The resource URI the error refers to.
    pub fn uri(&self) -> &str {
        match self {
            LoadError::Io { uri, .. } => uri,
            LoadError::Decode { uri, .. } => uri,
            LoadError::Abandoned { uri } => uri,
        }
    }
}

/// A host capability was unavailable or denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("fullscreen request denied: {reason}")]
    FullscreenDenied { reason: String },
}
