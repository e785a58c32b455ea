use std::fmt;

use crate::input::Key;
use crate::paint::Color;

use super::binding::{
    BindingError, BindingId, BindingKind, BindingValue, Constraints, FolderId,
};

type Getter<T, V> = Box<dyn Fn(&T) -> Option<V>>;
type Setter<T, V> = Box<dyn FnMut(&mut T, V)>;
type Handler<T> = Box<dyn FnMut(&mut T, BindingValue)>;

enum Accessor<T> {
    Numeric {
        get: Getter<T, f32>,
        set: Setter<T, f32>,
        constraints: Constraints,
    },
    Boolean {
        get: Getter<T, bool>,
        set: Setter<T, bool>,
    },
    Color {
        get: Getter<T, Color>,
        set: Setter<T, Color>,
    },
    Action {
        run: Box<dyn FnMut(&mut T)>,
    },
}

impl<T> Accessor<T> {
    fn kind(&self) -> BindingKind {
        match self {
            Accessor::Numeric { .. } => BindingKind::Numeric,
            Accessor::Boolean { .. } => BindingKind::Boolean,
            Accessor::Color { .. } => BindingKind::Color,
            Accessor::Action { .. } => BindingKind::Action,
        }
    }

    fn read(&self, ctx: &T) -> Option<BindingValue> {
        match self {
            Accessor::Numeric { get, .. } => get(ctx).map(BindingValue::Numeric),
            Accessor::Boolean { get, .. } => get(ctx).map(BindingValue::Boolean),
            Accessor::Color { get, .. } => get(ctx).map(BindingValue::Color),
            Accessor::Action { .. } => Some(BindingValue::Trigger),
        }
    }
}

struct Binding<T> {
    label: String,
    name: Option<String>,
    folder: Option<FolderId>,
    accessor: Accessor<T>,
    on_change: Option<Handler<T>>,
    on_finish_change: Option<Handler<T>>,
    /// An edit happened since the last finish.
    editing: bool,
}

impl<T> Binding<T> {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.label)
    }

    fn mismatch(&self, expected: BindingKind) -> BindingError {
        BindingError::KindMismatch {
            label: self.label.clone(),
            expected,
            actual: self.accessor.kind(),
        }
    }

    fn fire_change(&mut self, ctx: &mut T, value: BindingValue) {
        if let Some(f) = self.on_change.as_mut() {
            f(ctx, value);
        }
    }

    fn fire_finish(&mut self, ctx: &mut T, value: BindingValue) {
        if let Some(f) = self.on_finish_change.as_mut() {
            f(ctx, value);
        }
    }
}

#[derive(Debug, Clone)]
struct Folder {
    title: String,
    open: bool,
}

/// One row of [`DebugRegistry::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub id: BindingId,
    pub folder: Option<String>,
    pub name: String,
    pub kind: BindingKind,
    /// `None` when the property has gone missing since registration.
    pub value: Option<BindingValue>,
    pub constraints: Option<Constraints>,
}

impl fmt::Display for ControllerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(folder) = &self.folder {
            write!(f, "{folder}/")?;
        }
        write!(f, "{}", self.name)?;
        match &self.value {
            Some(BindingValue::Trigger) => f.write_str(" [button]"),
            Some(value) => write!(f, " = {value}"),
            None => f.write_str(" = <missing>"),
        }
    }
}

/// Live tweakable parameters over an application context `T`.
///
/// Each binding pairs a typed getter/setter over `T` with optional change
/// handlers. Numeric edits fire `on_change` for every value and
/// `on_finish_change` once when the edit session ends
/// ([`DebugRegistry::finish_change`]); boolean, color and action edits are
/// discrete and fire both immediately.
///
/// Handlers receive `&mut T`, so a handler can rebuild resources (e.g. swap a
/// mesh geometry via [`SceneGraph::replace_geometry`](crate::scene::SceneGraph::replace_geometry),
/// which disposes the old one).
pub struct DebugRegistry<T> {
    title: String,
    bindings: Vec<Binding<T>>,
    folders: Vec<Folder>,
    visible: bool,
    toggle_key: Key,
}

impl<T> fmt::Debug for DebugRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugRegistry")
            .field("title", &self.title)
            .field("bindings", &self.bindings.len())
            .field("folders", &self.folders)
            .field("visible", &self.visible)
            .finish()
    }
}

impl<T> DebugRegistry<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bindings: Vec::new(),
            folders: Vec::new(),
            visible: true,
            toggle_key: Key::H,
        }
    }

    pub fn with_toggle_key(mut self, key: Key) -> Self {
        self.toggle_key = key;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    // ── registration ──────────────────────────────────────────────────────

    pub fn add_folder(&mut self, title: impl Into<String>) -> FolderId {
        self.folders.push(Folder { title: title.into(), open: true });
        FolderId(self.folders.len() - 1)
    }

    pub fn set_folder_open(&mut self, id: FolderId, open: bool) -> Result<(), BindingError> {
        let folder = self.folders.get_mut(id.0).ok_or(BindingError::UnknownFolder(id))?;
        folder.open = open;
        Ok(())
    }

    pub fn is_folder_open(&self, id: FolderId) -> Option<bool> {
        self.folders.get(id.0).map(|f| f.open)
    }

    /// Binds a numeric property clamped to `constraints`.
    ///
    /// `get` is evaluated once against `ctx`; `None` rejects the binding.
    pub fn add_numeric(
        &mut self,
        ctx: &T,
        label: impl Into<String>,
        get: impl Fn(&T) -> Option<f32> + 'static,
        set: impl FnMut(&mut T, f32) + 'static,
        constraints: Constraints,
    ) -> Result<BindingMut<'_, T>, BindingError> {
        let label = label.into();
        constraints
            .validate()
            .map_err(|reason| BindingError::InvalidConstraints { label: label.clone(), reason })?;
        if get(ctx).is_none() {
            return Err(BindingError::MissingProperty { label });
        }
        Ok(self.push(
            label,
            Accessor::Numeric { get: Box::new(get), set: Box::new(set), constraints },
        ))
    }

    pub fn add_boolean(
        &mut self,
        ctx: &T,
        label: impl Into<String>,
        get: impl Fn(&T) -> Option<bool> + 'static,
        set: impl FnMut(&mut T, bool) + 'static,
    ) -> Result<BindingMut<'_, T>, BindingError> {
        let label = label.into();
        if get(ctx).is_none() {
            return Err(BindingError::MissingProperty { label });
        }
        Ok(self.push(label, Accessor::Boolean { get: Box::new(get), set: Box::new(set) }))
    }

    pub fn add_color(
        &mut self,
        ctx: &T,
        label: impl Into<String>,
        get: impl Fn(&T) -> Option<Color> + 'static,
        set: impl FnMut(&mut T, Color) + 'static,
    ) -> Result<BindingMut<'_, T>, BindingError> {
        let label = label.into();
        if get(ctx).is_none() {
            return Err(BindingError::MissingProperty { label });
        }
        Ok(self.push(label, Accessor::Color { get: Box::new(get), set: Box::new(set) }))
    }

    /// A button: `run` executes on [`DebugRegistry::press`].
    pub fn add_action(&mut self, label: impl Into<String>, run: impl FnMut(&mut T) + 'static) -> BindingMut<'_, T> {
        self.push(label.into(), Accessor::Action { run: Box::new(run) })
    }

    fn push(&mut self, label: String, accessor: Accessor<T>) -> BindingMut<'_, T> {
        log::debug!("debug '{}': bound {:?} '{label}'", self.title, accessor.kind());
        self.bindings.push(Binding {
            label,
            name: None,
            folder: None,
            accessor,
            on_change: None,
            on_finish_change: None,
            editing: false,
        });
        let id = BindingId(self.bindings.len() - 1);
        BindingMut { registry: self, id }
    }

    /// First binding registered under `label`.
    pub fn find(&self, label: &str) -> Option<BindingId> {
        self.bindings.iter().position(|b| b.label == label).map(BindingId)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> Result<BindingMut<'_, T>, BindingError> {
        self.get(id)?;
        Ok(BindingMut { registry: self, id })
    }

    fn get(&self, id: BindingId) -> Result<&Binding<T>, BindingError> {
        self.bindings.get(id.0).ok_or(BindingError::UnknownBinding(id))
    }

    fn get_mut(&mut self, id: BindingId) -> Result<&mut Binding<T>, BindingError> {
        self.bindings.get_mut(id.0).ok_or(BindingError::UnknownBinding(id))
    }

    // ── editing ───────────────────────────────────────────────────────────

    /// Current value read through the binding's getter.
    pub fn value(&self, id: BindingId, ctx: &T) -> Result<Option<BindingValue>, BindingError> {
        Ok(self.get(id)?.accessor.read(ctx))
    }

    /// Constrains `value`, assigns it and fires `on_change`. Returns the value
    /// actually assigned.
    pub fn set_numeric(&mut self, id: BindingId, ctx: &mut T, value: f32) -> Result<f32, BindingError> {
        let binding = self.get_mut(id)?;
        if !value.is_finite() {
            return Err(BindingError::NonFinite { label: binding.label.clone() });
        }
        let Accessor::Numeric { set, constraints, .. } = &mut binding.accessor else {
            return Err(binding.mismatch(BindingKind::Numeric));
        };

        let applied = constraints.apply(value);
        set(ctx, applied);
        binding.editing = true;
        binding.fire_change(ctx, BindingValue::Numeric(applied));
        Ok(applied)
    }

    /// Moves a numeric binding by `steps` increments of its step (or 1% of its
    /// range when it has no step).
    pub fn nudge_numeric(&mut self, id: BindingId, ctx: &mut T, steps: f32) -> Result<f32, BindingError> {
        let binding = self.get(id)?;
        let Accessor::Numeric { get, constraints, .. } = &binding.accessor else {
            return Err(binding.mismatch(BindingKind::Numeric));
        };
        let current = get(ctx).ok_or_else(|| BindingError::MissingProperty { label: binding.label.clone() })?;

        let increment = match constraints.step {
            Some(step) => step,
            None if (constraints.max - constraints.min).is_finite() => (constraints.max - constraints.min) / 100.0,
            None => 1.0,
        };
        self.set_numeric(id, ctx, current + steps * increment)
    }

    /// Ends a numeric edit session, firing `on_finish_change` once.
    ///
    /// Returns `false` (firing nothing) when no edit happened since the last
    /// finish.
    pub fn finish_change(&mut self, id: BindingId, ctx: &mut T) -> Result<bool, BindingError> {
        let binding = self.get_mut(id)?;
        if !binding.editing {
            return Ok(false);
        }
        binding.editing = false;

        match binding.accessor.read(ctx) {
            Some(value) => binding.fire_finish(ctx, value),
            None => log::warn!("debug: '{}' went missing before its edit finished", binding.label),
        }
        Ok(true)
    }

    pub fn set_boolean(&mut self, id: BindingId, ctx: &mut T, value: bool) -> Result<(), BindingError> {
        let binding = self.get_mut(id)?;
        let Accessor::Boolean { set, .. } = &mut binding.accessor else {
            return Err(binding.mismatch(BindingKind::Boolean));
        };
        set(ctx, value);
        binding.fire_change(ctx, BindingValue::Boolean(value));
        binding.fire_finish(ctx, BindingValue::Boolean(value));
        Ok(())
    }

    /// Flips a boolean binding. Returns the new value.
    pub fn toggle_boolean(&mut self, id: BindingId, ctx: &mut T) -> Result<bool, BindingError> {
        let current = match self.value(id, ctx)? {
            Some(BindingValue::Boolean(v)) => v,
            Some(_) => return Err(self.get(id)?.mismatch(BindingKind::Boolean)),
            None => return Err(BindingError::MissingProperty { label: self.get(id)?.label.clone() }),
        };
        self.set_boolean(id, ctx, !current)?;
        Ok(!current)
    }

    pub fn set_color(&mut self, id: BindingId, ctx: &mut T, value: Color) -> Result<(), BindingError> {
        let binding = self.get_mut(id)?;
        let Accessor::Color { set, .. } = &mut binding.accessor else {
            return Err(binding.mismatch(BindingKind::Color));
        };
        set(ctx, value);
        binding.fire_change(ctx, BindingValue::Color(value));
        binding.fire_finish(ctx, BindingValue::Color(value));
        Ok(())
    }

    /// Runs an action binding.
    pub fn press(&mut self, id: BindingId, ctx: &mut T) -> Result<(), BindingError> {
        let binding = self.get_mut(id)?;
        let Accessor::Action { run } = &mut binding.accessor else {
            return Err(binding.mismatch(BindingKind::Action));
        };
        run(ctx);
        binding.fire_change(ctx, BindingValue::Trigger);
        binding.fire_finish(ctx, BindingValue::Trigger);
        Ok(())
    }

    // ── panel ─────────────────────────────────────────────────────────────

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Toggles panel visibility on the configured key. Returns whether the
    /// key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if key != self.toggle_key {
            return false;
        }
        self.visible = !self.visible;
        log::debug!("debug '{}': panel {}", self.title, if self.visible { "shown" } else { "hidden" });
        true
    }

    /// Every controller with its current value, in registration order.
    /// Controllers in closed folders are still listed.
    pub fn snapshot(&self, ctx: &T) -> Vec<ControllerSnapshot> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| ControllerSnapshot {
                id: BindingId(i),
                folder: b.folder.and_then(|f| self.folders.get(f.0)).map(|f| f.title.clone()),
                name: b.display_name().to_string(),
                kind: b.accessor.kind(),
                value: b.accessor.read(ctx),
                constraints: match &b.accessor {
                    Accessor::Numeric { constraints, .. } => Some(*constraints),
                    _ => None,
                },
            })
            .collect()
    }
}

/// Chained configuration of a freshly registered binding.
pub struct BindingMut<'a, T> {
    registry: &'a mut DebugRegistry<T>,
    id: BindingId,
}

impl<'a, T> BindingMut<'a, T> {
    pub fn id(&self) -> BindingId {
        self.id
    }

    fn binding(&mut self) -> &mut Binding<T> {
        &mut self.registry.bindings[self.id.0]
    }

    /// Display name; defaults to the label.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.binding().name = Some(name.into());
        self
    }

    /// Places the binding in `folder`. Unknown folders are ignored with a
    /// warning.
    pub fn in_folder(mut self, folder: FolderId) -> Self {
        if folder.0 < self.registry.folders.len() {
            self.binding().folder = Some(folder);
        } else {
            log::warn!("debug: unknown folder {folder:?} for '{}'", self.binding().label);
        }
        self
    }

    pub fn on_change(mut self, f: impl FnMut(&mut T, BindingValue) + 'static) -> Self {
        self.binding().on_change = Some(Box::new(f));
        self
    }

    pub fn on_finish_change(mut self, f: impl FnMut(&mut T, BindingValue) + 'static) -> Self {
        self.binding().on_finish_change = Some(Box::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Params {
        elevation: f32,
        wireframe: bool,
        color: Option<Color>,
        spins: u32,
        rebuilds: Vec<u32>,
        changes: Vec<f32>,
    }

    fn numeric(reg: &mut DebugRegistry<Params>, ctx: &Params) -> BindingId {
        reg.add_numeric(
            ctx,
            "elevation",
            |p| Some(p.elevation),
            |p, v| p.elevation = v,
            Constraints::range(-3.0, 3.0).with_step(0.01),
        )
        .unwrap()
        .on_change(|p, v| p.changes.push(v.as_numeric().unwrap()))
        .on_finish_change(|p, v| p.rebuilds.push(v.as_numeric().unwrap() as u32))
        .id()
    }

    // ── registration ──────────────────────────────────────────────────────

    #[test]
    fn missing_property_is_rejected() {
        let ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let err = reg
            .add_color(&ctx, "color", |p: &Params| p.color, |p, c| p.color = Some(c))
            .err()
            .unwrap();
        assert_eq!(err, BindingError::MissingProperty { label: "color".into() });
        assert!(reg.is_empty());
    }

    #[test]
    fn invalid_constraints_are_rejected() {
        let ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let result = reg.add_numeric(&ctx, "x", |p| Some(p.elevation), |p, v| p.elevation = v, Constraints::range(5.0, 1.0));
        assert!(matches!(result, Err(BindingError::InvalidConstraints { .. })));
    }

    // ── numeric edits ─────────────────────────────────────────────────────

    #[test]
    fn numeric_clamps_and_fires_change_per_edit() {
        let mut ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let id = numeric(&mut reg, &ctx);

        assert_eq!(reg.set_numeric(id, &mut ctx, 10.0), Ok(3.0));
        assert_eq!(ctx.elevation, 3.0);

        let v = reg.set_numeric(id, &mut ctx, 1.234).unwrap();
        assert!((v - 1.23).abs() < 1e-6);
        assert_eq!(ctx.changes.len(), 2);
        assert!(ctx.rebuilds.is_empty());
    }

    #[test]
    fn finish_fires_once_per_edit_session() {
        let mut ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let id = numeric(&mut reg, &ctx);

        assert_eq!(reg.finish_change(id, &mut ctx), Ok(false));

        for v in [0.5, 1.0, 2.0] {
            reg.set_numeric(id, &mut ctx, v).unwrap();
        }
        assert_eq!(reg.finish_change(id, &mut ctx), Ok(true));
        assert_eq!(reg.finish_change(id, &mut ctx), Ok(false));
        assert_eq!(ctx.rebuilds, vec![2]);
    }

    #[test]
    fn nudge_moves_by_step() {
        let mut ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let id = numeric(&mut reg, &ctx);

        reg.nudge_numeric(id, &mut ctx, 10.0).unwrap();
        assert!((ctx.elevation - 0.1).abs() < 1e-5);
    }

    #[test]
    fn non_finite_and_wrong_kind_are_errors() {
        let mut ctx = Params::default();
        let mut reg = DebugRegistry::new("test");
        let id = numeric(&mut reg, &ctx);

        assert!(matches!(reg.set_numeric(id, &mut ctx, f32::NAN), Err(BindingError::NonFinite { .. })));
        assert!(matches!(reg.set_boolean(id, &mut ctx, true), Err(BindingError::KindMismatch { .. })));
        assert!(matches!(
            reg.set_numeric(BindingId(42), &mut ctx, 1.0),
            Err(BindingError::UnknownBinding(_))
        ));
    }

    // ── discrete edits ────────────────────────────────────────────────────

    #[test]
    fn boolean_color_and_action_fire_both_handlers() {
        let mut ctx = Params { color: Some(Color::from_hex(0xff0000)), ..Default::default() };
        let mut reg = DebugRegistry::new("test");

        let wire = reg
            .add_boolean(&ctx, "wireframe", |p: &Params| Some(p.wireframe), |p, v| p.wireframe = v)
            .unwrap()
            .on_finish_change(|p, _| p.spins += 100)
            .id();
        let color = reg
            .add_color(&ctx, "color", |p: &Params| p.color, |p, c| p.color = Some(c))
            .unwrap()
            .on_change(|p, _| p.spins += 10)
            .id();
        let spin = reg.add_action("spin", |p: &mut Params| p.spins += 1).id();

        assert_eq!(reg.toggle_boolean(wire, &mut ctx), Ok(true));
        assert!(ctx.wireframe);
        reg.set_color(color, &mut ctx, Color::from_hex(0x00ff00)).unwrap();
        assert_eq!(ctx.color.map(Color::to_hex), Some(0x00ff00));
        reg.press(spin, &mut ctx).unwrap();

        assert_eq!(ctx.spins, 111);
    }

    // ── panel ─────────────────────────────────────────────────────────────

    #[test]
    fn h_toggles_visibility() {
        let mut reg: DebugRegistry<Params> = DebugRegistry::new("test");
        assert!(reg.is_visible());
        assert!(!reg.handle_key(Key::J));
        assert!(reg.handle_key(Key::H));
        assert!(!reg.is_visible());
        assert!(reg.handle_key(Key::H));
        assert!(reg.is_visible());
    }

    #[test]
    fn snapshot_lists_folders_names_and_values() {
        let ctx = Params { elevation: 1.5, ..Default::default() };
        let mut reg = DebugRegistry::new("test");
        let folder = reg.add_folder("cube");
        reg.set_folder_open(folder, false).unwrap();

        reg.add_numeric(&ctx, "elevation", |p: &Params| Some(p.elevation), |p, v| p.elevation = v, Constraints::range(-3.0, 3.0))
            .unwrap()
            .name("Elevation")
            .in_folder(folder);
        reg.add_action("spin", |_: &mut Params| {});

        let rows = reg.snapshot(&ctx);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].to_string(), "cube/Elevation = 1.5");
        assert_eq!(rows[1].to_string(), "spin [button]");
        assert_eq!(reg.is_folder_open(folder), Some(false));
    }
}
