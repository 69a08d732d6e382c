use orrery_render::SceneGraph;
use orrery_scene::{BindingSpec, ParamTarget, SceneDescription};

/// Errors from debug-panel operations.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("no binding with id {0}")]
    UnknownBinding(usize),
    #[error("binding {label:?} targets a parameter the scene does not have")]
    UnknownParam { label: String },
}

/// Anything a panel binding can read from and write to.
pub trait Bindable {
    fn read_param(&self, target: &ParamTarget) -> Option<f32>;

    /// Returns false when the target does not exist.
    fn write_param(&mut self, target: &ParamTarget, value: f32) -> bool;
}

impl Bindable for SceneDescription {
    fn read_param(&self, target: &ParamTarget) -> Option<f32> {
        match target {
            ParamTarget::Material { material, param } => self.materials.get(material)?.param(*param),
            ParamTarget::CameraPosition { axis } => Some(self.camera.position[axis.index()]),
        }
    }

    fn write_param(&mut self, target: &ParamTarget, value: f32) -> bool {
        match target {
            ParamTarget::Material { material, param } => self
                .materials
                .get_mut(material)
                .is_some_and(|m| m.set_param(*param, value)),
            ParamTarget::CameraPosition { axis } => {
                self.camera.position[axis.index()] = value;
                true
            }
        }
    }
}

impl Bindable for SceneGraph {
    fn read_param(&self, target: &ParamTarget) -> Option<f32> {
        match target {
            ParamTarget::Material { material, param } => self.material(material)?.param(*param),
            ParamTarget::CameraPosition { axis } => Some(self.camera().position[axis.index()]),
        }
    }

    fn write_param(&mut self, target: &ParamTarget, value: f32) -> bool {
        match target {
            ParamTarget::Material { material, param } => {
                let Some(mut updated) = self.material(material).cloned() else {
                    return false;
                };
                updated.set_param(*param, value) && self.update_material(material, &updated) > 0
            }
            ParamTarget::CameraPosition { axis } => {
                self.camera_mut().position[axis.index()] = value;
                true
            }
        }
    }
}

/// Index of a binding within its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub usize);

/// A numeric widget bound to one scene parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub target: ParamTarget,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub step: Option<f32>,
    pub label: String,
}

impl Binding {
    pub fn from_spec(spec: &BindingSpec) -> Self {
        Self {
            target: spec.target.clone(),
            min: spec.min,
            max: spec.max,
            step: spec.step,
            label: spec.label(),
        }
    }

    /// Clamp into `[min, max]`, then snap to the step grid anchored at `min`.
    pub fn constrain(&self, value: f32) -> f32 {
        let clamp = |v: f32| {
            let v = self.min.map_or(v, |lo| v.max(lo));
            self.max.map_or(v, |hi| v.min(hi))
        };
        let mut v = clamp(value);
        if let Some(step) = self.step.filter(|s| *s > 0.0) {
            let origin = self.min.unwrap_or(0.0);
            v = origin + ((v - origin) / step).round() * step;
            v = clamp(v);
        }
        v
    }
}

/// Key-value binding sink standing in for an on-screen tweak panel.
#[derive(Debug, Clone, Default)]
pub struct DebugPanel {
    bindings: Vec<Binding>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[BindingSpec]) -> Self {
        Self {
            bindings: specs.iter().map(Binding::from_spec).collect(),
        }
    }

    pub fn add(&mut self, binding: Binding) -> BindingId {
        self.bindings.push(binding);
        BindingId(self.bindings.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (BindingId(i), b))
    }

    pub fn get(&self, id: BindingId) -> Result<&Binding, PanelError> {
        self.bindings
            .get(id.0)
            .ok_or(PanelError::UnknownBinding(id.0))
    }

    pub fn find(&self, label: &str) -> Option<BindingId> {
        self.bindings
            .iter()
            .position(|b| b.label == label)
            .map(BindingId)
    }

    /// Current value of the bound parameter.
    pub fn value(&self, id: BindingId, host: &impl Bindable) -> Result<f32, PanelError> {
        let binding = self.get(id)?;
        host.read_param(&binding.target)
            .ok_or_else(|| PanelError::UnknownParam {
                label: binding.label.clone(),
            })
    }

    /// Constrain `value` and write it. Returns the value actually written.
    pub fn set(
        &self,
        id: BindingId,
        value: f32,
        host: &mut impl Bindable,
    ) -> Result<f32, PanelError> {
        let binding = self.get(id)?;
        let applied = binding.constrain(value);
        if !host.write_param(&binding.target, applied) {
            return Err(PanelError::UnknownParam {
                label: binding.label.clone(),
            });
        }
        tracing::debug!(label = %binding.label, requested = value, applied, "panel write");
        Ok(applied)
    }

    /// Drop bindings whose target the host lacks. Returns how many were dropped.
    pub fn retain_resolvable(&mut self, host: &impl Bindable) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| {
            let ok = host.read_param(&b.target).is_some();
            if !ok {
                tracing::warn!(label = %b.label, "dropping unresolvable binding");
            }
            ok
        });
        before - self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_render::Stage;
    use orrery_scene::{MaterialParam, presets};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn constrain_clamps_and_snaps() {
        let b = Binding::from_spec(&BindingSpec::material(
            "m",
            MaterialParam::Metalness,
            0.0,
            1.0,
            0.1,
        ));
        assert!(close(b.constrain(0.34), 0.3));
        assert!(close(b.constrain(0.36), 0.4));
        assert_eq!(b.constrain(-2.0), 0.0);
        assert_eq!(b.constrain(7.0), 1.0);
    }

    #[test]
    fn open_ended_binding_only_clamps_below() {
        let scene = presets::solar_system();
        let b = Binding::from_spec(&scene.bindings[2]);
        assert!(close(b.constrain(123.44), 123.4));
        assert_eq!(b.constrain(-5.0), 0.0);
    }

    #[test]
    fn set_writes_through_to_scene_description() {
        let mut scene = presets::physical_material();
        let panel = DebugPanel::from_specs(&scene.bindings);
        let id = panel.find("clearcoat").unwrap();
        let applied = panel.set(id, 0.66, &mut scene).unwrap();
        assert!(close(applied, 0.7));
        assert!(close(panel.value(id, &scene).unwrap(), 0.7));
    }

    #[test]
    fn set_writes_through_to_scene_graph() {
        let scene = presets::physical_material();
        let panel = DebugPanel::from_specs(&scene.bindings);
        let mut session = Stage::build(&scene, SceneGraph::default()).unwrap();
        let id = panel.find("Ao Intensity").unwrap();
        panel.set(id, 0.557, session.sink_mut()).unwrap();
        let value = panel.value(id, session.sink()).unwrap();
        assert!(close(value, 0.56));
    }

    #[test]
    fn opacity_binding_fades_every_glass_mesh() {
        let scene = presets::fog_boxes();
        let panel = DebugPanel::from_specs(&scene.bindings);
        let mut session = Stage::build(&scene, SceneGraph::default()).unwrap();
        let id = panel.find("opacity").unwrap();
        assert!(close(panel.value(id, session.sink()).unwrap(), 0.5));
        let applied = panel.set(id, 0.22, session.sink_mut()).unwrap();
        assert!(close(applied, 0.2));
        assert!(close(panel.value(id, session.sink()).unwrap(), 0.2));
    }

    #[test]
    fn camera_binding_moves_camera() {
        let mut scene = presets::solar_system();
        let panel = DebugPanel::from_specs(&scene.bindings);
        let z = panel.find("position.z").unwrap();
        assert_eq!(panel.value(z, &scene).unwrap(), 40.0);
        panel.set(z, 55.0, &mut scene).unwrap();
        assert_eq!(scene.camera.position.z, 55.0);
    }

    #[test]
    fn unknown_binding_errors() {
        let mut scene = presets::fog_boxes();
        let panel = DebugPanel::new();
        assert!(matches!(
            panel.set(BindingId(3), 1.0, &mut scene),
            Err(PanelError::UnknownBinding(3))
        ));
    }

    #[test]
    fn unresolvable_bindings_are_dropped() {
        let scene = presets::fog_boxes();
        let mut panel = DebugPanel::from_specs(&scene.bindings);
        panel.add(Binding::from_spec(&BindingSpec::material(
            "glass",
            MaterialParam::Metalness,
            0.0,
            1.0,
            0.1,
        )));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.retain_resolvable(&scene), 1);
        assert_eq!(panel.len(), 1);
    }

    #[test]
    fn writing_missing_param_errors() {
        let mut scene = presets::fog_boxes();
        let mut panel = DebugPanel::new();
        let id = panel.add(Binding::from_spec(&BindingSpec::material(
            "glass",
            MaterialParam::Roughness,
            0.0,
            1.0,
            0.1,
        )));
        assert!(matches!(
            panel.set(id, 0.5, &mut scene),
            Err(PanelError::UnknownParam { .. })
        ));
    }
}
