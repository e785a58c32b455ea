use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Vec3;

use lumen_engine::animation::{Axis, Easing, TweenProperty, TweenTiming};
use lumen_engine::assets::{FilterMode, LoadingSession, WrapMode};
use lumen_engine::camera::{Camera, CameraId};
use lumen_engine::controls::{OrbitConfig, OrbitControls};
use lumen_engine::core::{App, AppControl, FrameCtx, Stage};
use lumen_engine::debug::{BindingError, BindingId, BindingValue, Constraints, DebugRegistry};
use lumen_engine::geometry::{BoxGeometry, GeometryHandle};
use lumen_engine::input::{InputEvent, Key};
use lumen_engine::paint::Color;
use lumen_engine::scene::{BasicMaterial, MaterialHandle, Mesh, NodeId, NodeKind};

const PALETTE: [u32; 4] = [0xff0000, 0x44aa88, 0x8844aa, 0xaa8844];

/// Cube with live debug controls, a group of three cubes and a switchable
/// perspective/orthographic camera under damped orbit controls.
pub struct Lesson {
    debug: DebugRegistry<Stage>,
    elevation: BindingId,
    wireframe: BindingId,
    color: BindingId,
    spin: BindingId,
    subdivision: BindingId,
    palette_index: usize,

    group: NodeId,
    perspective: CameraId,
    orthographic: CameraId,
}

impl Lesson {
    /// Populates the stage and binds the debug controls.
    pub fn build(stage: &mut Stage) -> Result<Self> {
        let root = stage.scene.root();

        // ── textures ──────────────────────────────────────────────────────
        let session = stage.loader.create_session(
            LoadingSession::new("door")
                .on_start(|uri, loaded, total| log::info!("textures: loading {uri} ({loaded}/{total})"))
                .on_progress(|uri, loaded, total| log::info!("textures: {uri} done ({loaded}/{total})"))
                .on_load(|| log::info!("textures: all loaded"))
                .on_error(|uri, err| log::warn!("textures: {uri} failed: {err}")),
        );
        let door = stage.loader.load_in(session, "textures/door/color.jpg");
        door.configure(|s| {
            s.repeat = glam::Vec2::new(2.0, 3.0);
            s.wrap_s = WrapMode::MirroredRepeat;
            s.wrap_t = WrapMode::Repeat;
            s.rotation = std::f32::consts::FRAC_PI_4;
            s.center = glam::Vec2::splat(0.5);
        });
        let checker = stage.loader.load_in(session, "textures/checkerboard-8x8.png");
        checker.configure(|s| {
            s.min_filter = FilterMode::Nearest;
            s.mag_filter = FilterMode::Nearest;
            s.generate_mipmaps = false;
        });

        // ── cube ──────────────────────────────────────────────────────────
        let material = MaterialHandle::new(BasicMaterial::with_map(door));
        let cube = stage.scene.spawn_named(
            NodeKind::Mesh(Mesh::new(
                BoxGeometry::new(1.0, 1.0, 1.0).with_segments(2, 2, 2).build(),
                material.clone(),
            )),
            "cube",
        );
        stage.scene.add(root, cube)?;

        // ── group ─────────────────────────────────────────────────────────
        let group = stage.scene.spawn_named(NodeKind::Group, "group");
        stage.scene.add(root, group)?;
        if let Some(t) = stage.scene.transform_mut(group) {
            t.position = Vec3::new(0.0, -2.0, 0.0);
        }
        for (i, hex) in PALETTE[1..].iter().enumerate() {
            let mut look = BasicMaterial::with_color(Color::from_hex(*hex));
            if i == 1 {
                look.map = Some(checker.clone());
            }
            let node = stage.scene.spawn(NodeKind::Mesh(Mesh::new(BoxGeometry::new(0.6, 0.6, 0.6).build(), look)));
            stage.scene.add(group, node)?;
            if let Some(t) = stage.scene.transform_mut(node) {
                t.position.x = (i as f32 - 1.0) * 1.5;
            }
        }

        // ── cameras ───────────────────────────────────────────────────────
        let eye = stage.scene.spawn_named(NodeKind::Camera, "eye");
        stage.scene.add(root, eye)?;
        if let Some(t) = stage.scene.transform_mut(eye) {
            t.position = Vec3::new(1.0, 1.0, 3.0);
        }
        stage.scene.look_at(eye, Vec3::ZERO)?;

        let aspect = stage.viewport.state().aspect().unwrap_or(1.0);
        let perspective = Camera::perspective(eye, 75.0, aspect, 0.1, 100.0)?;
        let mut orthographic = Camera::orthographic(eye, -2.0, 2.0, 2.0, -2.0, 0.1, 100.0)?;
        orthographic.set_aspect(aspect);
        orthographic.update_projection();
        let perspective = stage.cameras.insert(perspective);
        let orthographic = stage.cameras.insert(orthographic);

        stage.controls = Some(OrbitControls::new(OrbitConfig::default().damped(0.05)).context("orbit controls")?);

        // ── debug panel ───────────────────────────────────────────────────
        let mut debug = DebugRegistry::new("lesson");
        let tweaks = debug.add_folder("tweaks");

        let elevation = debug
            .add_numeric(
                stage,
                "position.y",
                move |s: &Stage| s.scene.transform(cube).map(|t| t.position.y),
                move |s: &mut Stage, v| {
                    if let Some(t) = s.scene.transform_mut(cube) {
                        t.position.y = v;
                    }
                },
                Constraints::range(-3.0, 3.0).with_step(0.01),
            )
            .context("binding elevation")?
            .name("elevation")
            .in_folder(tweaks)
            .id();

        let wireframe = {
            let (get, set) = (material.clone(), material.clone());
            debug
                .add_boolean(
                    stage,
                    "wireframe",
                    move |_: &Stage| Some(get.borrow().wireframe),
                    move |_: &mut Stage, v| set.borrow_mut().wireframe = v,
                )
                .context("binding wireframe")?
                .in_folder(tweaks)
                .id()
        };

        let color = {
            let (get, set) = (material.clone(), material.clone());
            debug
                .add_color(
                    stage,
                    "color",
                    move |_: &Stage| Some(get.borrow().color),
                    move |_: &mut Stage, c| set.borrow_mut().color = c,
                )
                .context("binding color")?
                .on_change(|_, value| log::info!("color: {value}"))
                .id()
        };

        let spin = debug
            .add_action("spin", move |s: &mut Stage| {
                s.tweens.by(
                    cube,
                    TweenProperty::Rotation(Axis::Y),
                    TAU,
                    TweenTiming::new(1.0).easing(Easing::Power2InOut),
                );
            })
            .id();

        let segments = Rc::new(Cell::new(2u32));
        let subdivision = {
            let (get, set) = (segments.clone(), segments);
            debug
                .add_numeric(
                    stage,
                    "subdivision",
                    move |_: &Stage| Some(get.get() as f32),
                    move |_: &mut Stage, v| set.set(v as u32),
                    Constraints::range(1.0, 20.0).with_step(1.0),
                )
                .context("binding subdivision")?
                .in_folder(tweaks)
                .on_finish_change(move |s: &mut Stage, value: BindingValue| {
                    let Some(n) = value.as_numeric() else { return };
                    let n = n as u32;
                    let geometry = GeometryHandle::new(BoxGeometry::new(1.0, 1.0, 1.0).with_segments(n, n, n).build());
                    match s.scene.replace_geometry(cube, geometry) {
                        Ok(()) => log::info!("cube: {n} segments per side"),
                        Err(err) => log::warn!("cube: {err}"),
                    }
                })
                .id()
        };

        for line in debug.snapshot(stage) {
            log::debug!("panel: {line}");
        }

        Ok(Self {
            debug,
            elevation,
            wireframe,
            color,
            spin,
            subdivision,
            palette_index: 0,
            group,
            perspective,
            orthographic,
        })
    }

    fn switch_camera(&mut self, stage: &mut Stage) {
        let next = if stage.cameras.active_id() == Some(self.perspective) {
            self.orthographic
        } else {
            self.perspective
        };
        stage.cameras.set_active(next);
        log::info!("camera: {}", if next == self.perspective { "perspective" } else { "orthographic" });
    }

    /// Keyboard stands in for the panel widgets while it is visible.
    fn tweak(&mut self, stage: &mut Stage, key: Key) -> Result<(), BindingError> {
        match key {
            Key::ArrowUp | Key::ArrowDown => {
                let steps = if key == Key::ArrowUp { 10.0 } else { -10.0 };
                self.debug.nudge_numeric(self.elevation, stage, steps)?;
                self.debug.finish_change(self.elevation, stage)?;
            }
            Key::PageUp | Key::PageDown => {
                let steps = if key == Key::PageUp { 1.0 } else { -1.0 };
                self.debug.nudge_numeric(self.subdivision, stage, steps)?;
                self.debug.finish_change(self.subdivision, stage)?;
            }
            Key::W => {
                self.debug.toggle_boolean(self.wireframe, stage)?;
            }
            Key::C => {
                self.palette_index = (self.palette_index + 1) % PALETTE.len();
                self.debug.set_color(self.color, stage, Color::from_hex(PALETTE[self.palette_index]))?;
            }
            Key::Space => self.debug.press(self.spin, stage)?,
            _ => {}
        }
        Ok(())
    }
}

impl App for Lesson {
    fn on_input(&mut self, stage: &mut Stage, event: &InputEvent) -> AppControl {
        let Some(key) = event.pressed_key() else {
            return AppControl::Continue;
        };

        match key {
            Key::Escape => return AppControl::Exit,
            Key::P => self.switch_camera(stage),
            _ if self.debug.handle_key(key) => {
                if self.debug.is_visible() {
                    for line in self.debug.snapshot(stage) {
                        log::info!("panel: {line}");
                    }
                }
            }
            _ if self.debug.is_visible() => {
                if let Err(err) = self.tweak(stage, key) {
                    log::warn!("panel: {err}");
                }
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Some(t) = ctx.stage.scene.transform_mut(self.group) {
            t.rotation.y = ctx.time.elapsed * 0.25;
        }
        AppControl::Continue
    }
}
