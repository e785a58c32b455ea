use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::error::ConfigError;
use crate::scene::{NodeId, SceneGraph};

const EPS: f32 = 1e-6;

/// Orbit controller tuning.
#[derive(Debug, Clone, Copy)]
pub struct OrbitConfig {
    /// Spread each input over several frames instead of applying it at once.
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per frame when damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits, radians from `+Y`.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            enable_zoom: true,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

impl OrbitConfig {
    pub fn damped(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor.clamp(EPS, 1.0);
        self
    }

    /// Rejects empty or NaN limit ranges and non-positive factors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("distance", self.min_distance, self.max_distance),
            ("polar angle", self.min_polar_angle, self.max_polar_angle),
        ];
        for (what, min, max) in ranges {
            // Also true when either bound is NaN.
            if !(min <= max) {
                return Err(ConfigError::InvalidOrbitRange { what, min, max });
            }
        }

        let factors = [
            ("damping factor", self.damping_factor),
            ("rotate speed", self.rotate_speed),
            ("zoom speed", self.zoom_speed),
        ];
        for (what, value) in factors {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidOrbitFactor { what, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum DragState {
    Idle,
    Dragging { last: Vec2 },
}

/// Pending spherical motion.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Rotates a camera node around a target point from pointer drags, and
/// dollies it with the wheel.
///
/// Input handlers only accumulate motion; [`OrbitControls::update`] applies it
/// and must run once per frame so damping can settle.
///
/// The camera node's local position is treated as world space, so the camera
/// should hang directly under the scene root.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitConfig,
    target: Vec3,
    state: DragState,
    delta: SphericalDelta,
    scale: f32,
    last_position: Option<Vec3>,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: OrbitConfig) -> Self {
        Self {
            config,
            target: Vec3::ZERO,
            state: DragState::Idle,
            delta: SphericalDelta::default(),
            scale: 1.0,
            last_position: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Swaps the tuning; an invalid config leaves the current one in place.
    pub fn set_config(&mut self, config: OrbitConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.last_position = None;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Whether motion is still pending (a drag or an unsettled damping tail).
    pub fn is_active(&self) -> bool {
        self.is_dragging() || self.delta != SphericalDelta::default() || self.scale != 1.0
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.state = DragState::Dragging { last: pos };
    }

    /// Pointer motion in logical pixels. A drag across the full viewport height
    /// turns the camera one full revolution.
    pub fn pointer_move(&mut self, pos: Vec2, viewport_height: f32) {
        let DragState::Dragging { last } = self.state else {
            return;
        };
        self.state = DragState::Dragging { last: pos };

        if viewport_height <= 0.0 {
            return;
        }
        let d = (pos - last) * self.config.rotate_speed;
        self.rotate_left(2.0 * PI * d.x / viewport_height);
        self.rotate_up(2.0 * PI * d.y / viewport_height);
    }

    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Wheel motion; negative `delta_y` (scroll up) moves closer.
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.config.enable_zoom || delta_y == 0.0 {
            return;
        }
        let step = 0.95f32.powf(self.config.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Applies pending motion to `camera` and re-aims it at the target.
    ///
    /// Returns `true` when the camera moved. Returns `false` without touching
    /// the scene when there is nothing to apply.
    pub fn update(&mut self, scene: &mut SceneGraph, camera: NodeId) -> bool {
        let Some(position) = scene.transform(camera).map(|t| t.position) else {
            return false;
        };
        if !self.is_active() && self.last_position == Some(position) {
            return false;
        }

        let offset = position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };

        let factor = if self.config.enable_damping { self.config.damping_factor } else { 1.0 };
        theta += self.delta.theta * factor;
        phi += self.delta.phi * factor;

        phi = phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(EPS, PI - EPS);

        radius = (radius * self.scale).clamp(self.config.min_distance, self.config.max_distance);

        let sin_phi_r = radius * phi.sin();
        let offset = Vec3::new(sin_phi_r * theta.sin(), radius * phi.cos(), sin_phi_r * theta.cos());
        let new_position = self.target + offset;

        if let Some(t) = scene.transform_mut(camera) {
            t.position = new_position;
        }
        if let Err(err) = scene.look_at(camera, self.target) {
            log::debug!("orbit: {err}");
        }

        if self.config.enable_damping {
            self.delta.theta *= 1.0 - factor;
            self.delta.phi *= 1.0 - factor;
            if self.delta.theta.abs() < EPS && self.delta.phi.abs() < EPS {
                self.delta = SphericalDelta::default();
            }
        } else {
            self.delta = SphericalDelta::default();
        }
        self.scale = 1.0;

        let moved = self.last_position.is_none_or(|last| last.distance_squared(new_position) > EPS * EPS);
        self.last_position = Some(new_position);
        moved
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::with_valid_config(OrbitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn setup(position: Vec3) -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let cam = scene.spawn(NodeKind::Camera);
        scene.add(scene.root(), cam).unwrap();
        scene.transform_mut(cam).unwrap().position = position;
        (scene, cam)
    }

    fn theta_of(scene: &SceneGraph, cam: NodeId) -> f32 {
        let p = scene.transform(cam).unwrap().position;
        p.x.atan2(p.z)
    }

    #[test]
    fn undamped_drag_applies_immediately() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 3.0));
        let mut orbit = OrbitControls::default();

        orbit.pointer_down(Vec2::new(100.0, 100.0));
        // A quarter of the viewport height is a quarter turn.
        orbit.pointer_move(Vec2::new(75.0, 100.0), 100.0);
        orbit.pointer_up();
        assert!(orbit.update(&mut scene, cam));

        assert!((theta_of(&scene, cam) - PI / 2.0).abs() < 1e-4);
        let p = scene.transform(cam).unwrap().position;
        assert!((p.length() - 3.0).abs() < 1e-4);
        assert!(!orbit.is_active());
    }

    #[test]
    fn damped_motion_converges_to_full_delta() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 5.0));
        let mut orbit = OrbitControls::new(OrbitConfig::default().damped(0.05)).unwrap();

        orbit.rotate_left(-0.5);
        assert!(orbit.update(&mut scene, cam));
        // First frame applies only the damping fraction.
        assert!((theta_of(&scene, cam) - 0.025).abs() < 1e-4);

        let mut frames = 1;
        while orbit.is_active() && frames < 1000 {
            orbit.update(&mut scene, cam);
            frames += 1;
        }
        assert!(!orbit.is_active(), "damping never settled");
        assert!((theta_of(&scene, cam) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn held_drag_then_release_settles_monotonically() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 5.0));
        let mut orbit = OrbitControls::new(OrbitConfig::default().damped(0.1)).unwrap();

        // One pixel left per frame for ten frames on a 100px viewport.
        let per_frame = 2.0 * PI / 100.0;
        let target = 10.0 * per_frame;

        let mut thetas = vec![theta_of(&scene, cam)];
        orbit.pointer_down(Vec2::new(50.0, 50.0));
        for frame in 1..=10 {
            orbit.pointer_move(Vec2::new(50.0 - frame as f32, 50.0), 100.0);
            orbit.update(&mut scene, cam);
            thetas.push(theta_of(&scene, cam));
        }
        orbit.pointer_up();

        let mut frames = 0;
        while orbit.is_active() && frames < 1000 {
            orbit.update(&mut scene, cam);
            thetas.push(theta_of(&scene, cam));
            frames += 1;
        }
        assert!(!orbit.is_active(), "damping never settled");

        for pair in thetas.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-6, "theta reversed: {} -> {}", pair[0], pair[1]);
            assert!(pair[1] <= target + 1e-4, "theta overshot {target}: {}", pair[1]);
        }
        let last = thetas.last().copied().unwrap();
        assert!((last - target).abs() < 1e-3, "settled at {last}, expected {target}");
    }

    #[test]
    fn invalid_limits_are_rejected_at_setup() {
        let inverted = OrbitConfig { min_distance: 5.0, max_distance: 2.0, ..Default::default() };
        assert!(matches!(
            OrbitControls::new(inverted),
            Err(ConfigError::InvalidOrbitRange { what: "distance", .. })
        ));

        let nan = OrbitConfig { max_polar_angle: f32::NAN, ..Default::default() };
        assert!(matches!(
            OrbitControls::new(nan),
            Err(ConfigError::InvalidOrbitRange { what: "polar angle", .. })
        ));

        let frozen = OrbitConfig { rotate_speed: 0.0, ..Default::default() };
        assert!(matches!(OrbitControls::new(frozen), Err(ConfigError::InvalidOrbitFactor { .. })));
    }

    #[test]
    fn rejected_config_swap_keeps_orbit_running() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 4.0));
        let mut orbit = OrbitControls::default();

        let inverted = OrbitConfig { min_distance: 5.0, max_distance: 2.0, ..Default::default() };
        assert!(orbit.set_config(inverted).is_err());
        assert_eq!(orbit.config().max_distance, f32::INFINITY);

        orbit.wheel(-1.0);
        assert!(orbit.update(&mut scene, cam));
        assert!(scene.transform(cam).unwrap().position.length() < 4.0);
    }

    #[test]
    fn camera_keeps_facing_target() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 2.0, 4.0));
        let mut orbit = OrbitControls::default();
        orbit.set_target(Vec3::new(0.0, 0.5, 0.0));

        orbit.rotate_left(0.7);
        orbit.rotate_up(0.3);
        orbit.update(&mut scene, cam);

        let world = scene.world_matrix(cam).unwrap();
        let forward = world.transform_vector3(-Vec3::Z).normalize();
        let to_target = (orbit.target() - world.w_axis.truncate()).normalize();
        assert!(forward.dot(to_target) > 0.9999);
    }

    #[test]
    fn polar_and_distance_limits_clamp() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 4.0));
        let mut orbit = OrbitControls::new(OrbitConfig {
            min_distance: 2.0,
            max_distance: 6.0,
            max_polar_angle: PI / 2.0,
            ..Default::default()
        })
        .unwrap();

        // Try to swing far below the equator.
        orbit.rotate_up(-2.0);
        orbit.update(&mut scene, cam);
        assert!(scene.transform(cam).unwrap().position.y >= -1e-4);

        for _ in 0..100 {
            orbit.wheel(-1.0);
        }
        orbit.update(&mut scene, cam);
        assert!((scene.transform(cam).unwrap().position.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn idle_update_is_a_noop() {
        let (mut scene, cam) = setup(Vec3::new(0.0, 0.0, 4.0));
        let mut orbit = OrbitControls::default();
        assert!(orbit.update(&mut scene, cam));
        let before = *scene.transform(cam).unwrap();

        assert!(!orbit.update(&mut scene, cam));
        assert_eq!(*scene.transform(cam).unwrap(), before);

        // Moves while not dragging are ignored.
        orbit.pointer_move(Vec2::new(50.0, 50.0), 100.0);
        assert!(!orbit.update(&mut scene, cam));
    }
}
