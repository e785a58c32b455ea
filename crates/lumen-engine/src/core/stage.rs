use glam::Vec2;

use crate::animation::Tweens;
use crate::assets::ResourceLoader;
use crate::camera::CameraRig;
use crate::controls::OrbitControls;
use crate::input::{ButtonState, InputEvent, InputState, MouseButton};
use crate::scene::{NodeId, SceneGraph};
use crate::viewport::ViewportController;

/// Everything a frame loop owns on the frame thread.
///
/// Passed explicitly to the app; there is no global stage, so several loops
/// can coexist.
#[derive(Debug)]
pub struct Stage {
    pub scene: SceneGraph,
    pub cameras: CameraRig,
    /// Orbit controls driving the active camera, if any.
    pub controls: Option<OrbitControls>,
    pub loader: ResourceLoader,
    pub tweens: Tweens,
    pub viewport: ViewportController,
    pub input: InputState,
}

impl Stage {
    pub fn new(loader: ResourceLoader, viewport: ViewportController) -> Self {
        Self {
            scene: SceneGraph::new(),
            cameras: CameraRig::new(),
            controls: None,
            loader,
            tweens: Tweens::new(),
            viewport,
            input: InputState::default(),
        }
    }

    /// Scene node of the camera that draws.
    pub fn active_camera_node(&self) -> Option<NodeId> {
        self.cameras.active().map(|c| c.node())
    }

    /// Folds `event` into the input state and routes pointer and wheel input
    /// to the orbit controls.
    pub fn apply_input(&mut self, event: &InputEvent) {
        self.input.apply_event(event);

        let Some(controls) = self.controls.as_mut() else {
            return;
        };
        match *event {
            InputEvent::PointerButton { button: MouseButton::Left, state, x, y } => match state {
                ButtonState::Pressed => controls.pointer_down(Vec2::new(x, y)),
                ButtonState::Released => controls.pointer_up(),
            },
            InputEvent::PointerMoved { x, y } => {
                let height = self.viewport.state().height as f32;
                controls.pointer_move(Vec2::new(x, y), height);
            }
            InputEvent::PointerLeft | InputEvent::Focused(false) => controls.pointer_up(),
            InputEvent::Wheel(delta) => controls.wheel(delta.scroll_down()),
            _ => {}
        }
    }

    /// Applies pending orbit motion to the active camera. Returns whether the
    /// camera moved.
    pub fn update_controls(&mut self) -> bool {
        let (Some(controls), Some(camera)) = (self.controls.as_mut(), self.cameras.active()) else {
            return false;
        };
        controls.update(&mut self.scene, camera.node())
    }
}
