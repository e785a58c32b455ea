use std::fmt;

use crate::paint::Color;

/// Identifies a binding inside its registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) usize);

/// Identifies a folder inside its registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FolderId(pub(crate) usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BindingKind {
    Numeric,
    Boolean,
    Color,
    Action,
}

/// A bound property's value, as seen by change handlers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BindingValue {
    Numeric(f32),
    Boolean(bool),
    Color(Color),
    /// Actions carry no value.
    Trigger,
}

impl BindingValue {
    pub fn kind(&self) -> BindingKind {
        match self {
            BindingValue::Numeric(_) => BindingKind::Numeric,
            BindingValue::Boolean(_) => BindingKind::Boolean,
            BindingValue::Color(_) => BindingKind::Color,
            BindingValue::Trigger => BindingKind::Action,
        }
    }

    pub fn as_numeric(&self) -> Option<f32> {
        match *self {
            BindingValue::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match *self {
            BindingValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            BindingValue::Color(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Numeric(v) => write!(f, "{v}"),
            BindingValue::Boolean(v) => write!(f, "{v}"),
            BindingValue::Color(c) => write!(f, "{c}"),
            BindingValue::Trigger => f.write_str("()"),
        }
    }
}

/// Range and step of a numeric binding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Constraints {
    pub min: f32,
    pub max: f32,
    /// Values snap to multiples of `step` when set.
    pub step: Option<f32>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self { min: f32::NEG_INFINITY, max: f32::INFINITY, step: None }
    }
}

impl Constraints {
    pub fn range(min: f32, max: f32) -> Self {
        Self { min, max, step: None }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = Some(step);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err("min/max must not be NaN".into());
        }
        if self.min > self.max {
            return Err(format!("min {} exceeds max {}", self.min, self.max));
        }
        if let Some(step) = self.step {
            if !(step.is_finite() && step > 0.0) {
                return Err(format!("step must be positive and finite (got {step})"));
            }
        }
        Ok(())
    }

    /// Clamp, snap to `step`, then clamp again (snapping can overshoot a bound
    /// that is not itself a multiple of `step`).
    pub fn apply(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        match self.step {
            Some(step) => ((clamped / step).round() * step).clamp(self.min, self.max),
            None => clamped,
        }
    }
}

/// Registry API misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("property '{label}' is missing on the bound object")]
    MissingProperty { label: String },

    #[error("invalid constraints for '{label}': {reason}")]
    InvalidConstraints { label: String, reason: String },

    #[error("unknown binding {0:?}")]
    UnknownBinding(BindingId),

    #[error("unknown folder {0:?}")]
    UnknownFolder(FolderId),

    #[error("binding '{label}' is {actual:?}, not {expected:?}")]
    KindMismatch {
        label: String,
        expected: BindingKind,
        actual: BindingKind,
    },

    #[error("non-finite value for '{label}'")]
    NonFinite { label: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_then_snaps_then_clamps() {
        let c = Constraints::range(-3.0, 3.0).with_step(0.01);
        assert_eq!(c.apply(10.0), 3.0);
        assert!((c.apply(1.234) - 1.23).abs() < 1e-6);

        // 0.9 snaps to 1.0 with step 0.5, which then clamps back to max.
        let odd = Constraints::range(0.0, 0.9).with_step(0.5);
        assert_eq!(odd.apply(0.9), 0.9);
    }

    #[test]
    fn validation() {
        assert!(Constraints::range(1.0, 20.0).with_step(1.0).validate().is_ok());
        assert!(Constraints::range(2.0, 1.0).validate().is_err());
        assert!(Constraints::range(0.0, 1.0).with_step(0.0).validate().is_err());
        assert!(Constraints::range(0.0, 1.0).with_step(f32::INFINITY).validate().is_err());
        assert!(Constraints::default().validate().is_ok());
    }
}
