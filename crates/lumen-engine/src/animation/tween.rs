use crate::scene::{NodeId, SceneGraph, Transform};

use super::easing::Easing;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A single animatable transform channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TweenProperty {
    Position(Axis),
    Rotation(Axis),
    Scale(Axis),
}

impl TweenProperty {
    fn read(self, t: &Transform) -> f32 {
        match self {
            TweenProperty::Position(a) => pick(a, t.position.x, t.position.y, t.position.z),
            TweenProperty::Rotation(a) => pick(a, t.rotation.x, t.rotation.y, t.rotation.z),
            TweenProperty::Scale(a) => pick(a, t.scale.x, t.scale.y, t.scale.z),
        }
    }

    fn write(self, t: &mut Transform, value: f32) {
        let slot = match self {
            TweenProperty::Position(a) => pick_mut(a, &mut t.position.x, &mut t.position.y, &mut t.position.z),
            TweenProperty::Rotation(a) => pick_mut(a, &mut t.rotation.x, &mut t.rotation.y, &mut t.rotation.z),
            TweenProperty::Scale(a) => pick_mut(a, &mut t.scale.x, &mut t.scale.y, &mut t.scale.z),
        };
        *slot = value;
    }
}

fn pick(axis: Axis, x: f32, y: f32, z: f32) -> f32 {
    match axis {
        Axis::X => x,
        Axis::Y => y,
        Axis::Z => z,
    }
}

fn pick_mut<'a>(axis: Axis, x: &'a mut f32, y: &'a mut f32, z: &'a mut f32) -> &'a mut f32 {
    match axis {
        Axis::X => x,
        Axis::Y => y,
        Axis::Z => z,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

#[derive(Debug, Copy, Clone)]
enum Goal {
    To(f32),
    By(f32),
}

/// Timing of one tween, in seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TweenTiming {
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,
}

impl TweenTiming {
    pub fn new(duration: f32) -> Self {
        Self { duration, delay: 0.0, easing: Easing::default() }
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Debug)]
struct Tween {
    id: TweenId,
    node: NodeId,
    property: TweenProperty,
    goal: Goal,
    timing: TweenTiming,
    start: f32,
    /// `(from, to)`, captured once the delay has elapsed.
    span: Option<(f32, f32)>,
}

/// Elapsed-time driven animation of scene-node transforms.
///
/// A tween starts at the elapsed time of the last [`Tweens::update`] before it
/// was created. Its start value is read when its delay runs out, so chained
/// tweens on the same channel compose.
#[derive(Debug, Default)]
pub struct Tweens {
    active: Vec<Tween>,
    now: f32,
    next_id: u64,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animates `property` of `node` to the absolute value `target`.
    pub fn to(&mut self, node: NodeId, property: TweenProperty, target: f32, timing: TweenTiming) -> TweenId {
        self.push(node, property, Goal::To(target), timing)
    }

    /// Animates `property` of `node` by `amount` relative to its start value.
    pub fn by(&mut self, node: NodeId, property: TweenProperty, amount: f32, timing: TweenTiming) -> TweenId {
        self.push(node, property, Goal::By(amount), timing)
    }

    fn push(&mut self, node: NodeId, property: TweenProperty, goal: Goal, timing: TweenTiming) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.active.push(Tween { id, node, property, goal, timing, start: self.now, span: None });
        log::trace!("tween {id:?}: {property:?} on {node} over {}s", timing.duration);
        id
    }

    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        self.active.len() != before
    }

    /// Cancels every tween targeting `node`.
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let before = self.active.len();
        self.active.retain(|t| t.node != node);
        before - self.active.len()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.active.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advances every tween to `elapsed` seconds. Finished tweens snap to
    /// their target and are removed; tweens whose node is gone are dropped.
    pub fn update(&mut self, scene: &mut SceneGraph, elapsed: f32) {
        self.now = self.now.max(elapsed);
        let now = self.now;

        self.active.retain_mut(|tween| {
            let Some(transform) = scene.transform_mut(tween.node) else {
                log::debug!("tween {:?}: node {} is gone", tween.id, tween.node);
                return false;
            };

            let local = now - tween.start - tween.timing.delay;
            if local < 0.0 {
                return true;
            }

            let (from, to) = *tween.span.get_or_insert_with(|| {
                let from = tween.property.read(transform);
                let to = match tween.goal {
                    Goal::To(v) => v,
                    Goal::By(d) => from + d,
                };
                (from, to)
            });

            let progress = if tween.timing.duration > 0.0 { local / tween.timing.duration } else { 1.0 };
            if progress >= 1.0 {
                tween.property.write(transform, to);
                return false;
            }
            let eased = tween.timing.easing.apply(progress);
            tween.property.write(transform, from + (to - from) * eased);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn scene_with_node() -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let node = scene.spawn(NodeKind::Group);
        scene.add(scene.root(), node).unwrap();
        (scene, node)
    }

    fn x(scene: &SceneGraph, node: NodeId) -> f32 {
        scene.transform(node).unwrap().position.x
    }

    // ── timing ────────────────────────────────────────────────────────────

    #[test]
    fn linear_tween_reaches_target_and_is_removed() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::new();
        let id = tweens.to(
            node,
            TweenProperty::Position(Axis::X),
            2.0,
            TweenTiming::new(1.0).easing(Easing::Linear),
        );

        tweens.update(&mut scene, 0.5);
        assert!((x(&scene, node) - 1.0).abs() < 1e-6);
        assert!(tweens.is_active(id));

        tweens.update(&mut scene, 1.7);
        assert_eq!(x(&scene, node), 2.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn delay_holds_start_value() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::new();
        tweens.update(&mut scene, 10.0);
        tweens.to(
            node,
            TweenProperty::Position(Axis::X),
            2.0,
            TweenTiming::new(1.0).delay(1.0).easing(Easing::Linear),
        );

        tweens.update(&mut scene, 10.9);
        assert_eq!(x(&scene, node), 0.0);
        tweens.update(&mut scene, 11.5);
        assert!((x(&scene, node) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_snaps() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::new();
        tweens.to(node, TweenProperty::Scale(Axis::Y), 3.0, TweenTiming::new(0.0));
        tweens.update(&mut scene, 0.0);
        assert_eq!(scene.transform(node).unwrap().scale.y, 3.0);
        assert!(tweens.is_empty());
    }

    // ── relative ──────────────────────────────────────────────────────────

    #[test]
    fn by_is_relative_to_value_at_start() {
        let (mut scene, node) = scene_with_node();
        scene.transform_mut(node).unwrap().rotation.y = 1.0;
        let mut tweens = Tweens::new();
        tweens.by(node, TweenProperty::Rotation(Axis::Y), std::f32::consts::TAU, TweenTiming::new(1.0));

        tweens.update(&mut scene, 2.0);
        let y = scene.transform(node).unwrap().rotation.y;
        assert!((y - (1.0 + std::f32::consts::TAU)).abs() < 1e-5);
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn despawned_node_drops_tween() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::new();
        tweens.to(node, TweenProperty::Position(Axis::Z), 1.0, TweenTiming::new(1.0));
        scene.despawn(node).unwrap();

        tweens.update(&mut scene, 0.5);
        assert!(tweens.is_empty());
    }

    #[test]
    fn cancel_by_id_and_node() {
        let (_, node) = scene_with_node();
        let mut tweens = Tweens::new();
        let a = tweens.to(node, TweenProperty::Position(Axis::X), 1.0, TweenTiming::new(1.0));
        tweens.to(node, TweenProperty::Position(Axis::Y), 1.0, TweenTiming::new(1.0));
        tweens.to(node, TweenProperty::Position(Axis::Z), 1.0, TweenTiming::new(1.0));

        assert!(tweens.cancel(a));
        assert!(!tweens.cancel(a));
        assert_eq!(tweens.cancel_node(node), 2);
    }
}
