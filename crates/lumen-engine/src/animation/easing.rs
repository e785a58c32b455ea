/// Progress curve of a tween. `Power2` is the cubic family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    Power2In,
    #[default]
    Power2Out,
    Power2InOut,
}

impl Easing {
    /// Maps linear progress `t` (clamped to `[0, 1]`) onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2In => t * t * t,
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [Easing::Linear, Easing::Power2In, Easing::Power2Out, Easing::Power2InOut];

    #[test]
    fn endpoints_are_fixed() {
        for e in ALL {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-6, "{e:?}");
            assert_eq!(e.apply(-3.0), 0.0);
            assert!((e.apply(7.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for e in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = e.apply(i as f32 / 100.0);
                assert!(v >= prev, "{e:?} at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn shapes() {
        assert!(Easing::Power2In.apply(0.5) < 0.5);
        assert!(Easing::Power2Out.apply(0.5) > 0.5);
        assert!((Easing::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
