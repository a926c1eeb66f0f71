//! Control panel binding between [`TransformStore`] and externally editable
//! fields.
//!
//! Inbound edits arrive as [`FieldEdited`] and are written immediately.
//! Outbound refresh runs once per frame in [`FrameSet::Panel`] and only
//! updates cached display values, so it never re-enters the inbound path.

mod layout;

use std::f32::consts::TAU;

use anyhow::{Context, bail, ensure};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    FrameSet,
    scene::{MaterialColor, SelectedShape, ShapeKind},
    transform_store::{TransformField, TransformStore},
};

pub use layout::{FieldBinding, PanelLayoutPlugin, PanelNode};

/// Headless half of the panel: binding state, inbound edits, outbound refresh.
pub struct PanelBindingPlugin;

impl Plugin for PanelBindingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelBinding>()
            .add_observer(apply_field_edit)
            .add_systems(Update, refresh_panel_fields.in_set(FrameSet::Panel));
    }
}

/// What a panel field drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    Transform(TransformField),
    Color,
    Shape,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldConstraints {
    pub fn range(min: f32, max: f32, step: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
            options: Vec::new(),
        }
    }

    pub fn options(options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..default()
        }
    }

    /// Reject constraint sets no widget could honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            ensure!(min <= max, "min {min} is greater than max {max}");
        }
        if let Some(step) = self.step {
            ensure!(step.is_finite() && step > 0.0, "step must be positive, got {step}");
        }
        Ok(())
    }

    fn is_numeric(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.step.is_some()
    }
}

/// One row of the panel table. Adding a field is a data change here, not new
/// wiring code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub target: FieldTarget,
    #[serde(flatten)]
    pub constraints: FieldConstraints,
}

impl FieldSpec {
    pub fn new(name: &str, target: FieldTarget, constraints: FieldConstraints) -> Self {
        Self {
            name: name.to_string(),
            target,
            constraints,
        }
    }

    pub fn transform(field: TransformField, constraints: FieldConstraints) -> Self {
        Self::new(field.name(), FieldTarget::Transform(field), constraints)
    }

    /// Fields shown by default, in display order.
    pub fn default_table() -> Vec<FieldSpec> {
        use TransformField::*;
        vec![
            FieldSpec::new(
                "geometry",
                FieldTarget::Shape,
                FieldConstraints::options(ShapeKind::ALL.map(ShapeKind::name)),
            ),
            FieldSpec::transform(PositionX, FieldConstraints::range(-14.0, 14.0, 0.1)),
            FieldSpec::transform(PositionY, FieldConstraints::range(-14.0, 14.0, 0.1)),
            FieldSpec::transform(PositionZ, FieldConstraints::range(-14.0, 15.0, 0.1)),
            FieldSpec::new("color", FieldTarget::Color, FieldConstraints::range(0.0, 1.0, 0.01)),
            FieldSpec::transform(RotationX, FieldConstraints::range(0.0, TAU, 0.01)),
            FieldSpec::transform(RotationY, FieldConstraints::range(0.0, TAU, 0.01)),
            FieldSpec::transform(RotationZ, FieldConstraints::range(0.0, TAU, 0.01)),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PanelValue {
    Number(f32),
    Color(Srgba),
    Choice(String),
}

/// Index of a bound field inside [`PanelBinding`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldHandle(usize);

#[derive(Clone, Debug)]
pub struct PanelField {
    pub name: String,
    pub target: FieldTarget,
    pub constraints: FieldConstraints,
    /// Last value pushed to or received from the panel.
    cached: PanelValue,
}

impl PanelField {
    pub fn displayed(&self) -> &PanelValue {
        &self.cached
    }
}

/// Side effect of an inbound edit that lands outside the transform store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelEffect {
    Color(Srgba),
    Shape(ShapeKind),
}

/// User edit coming from the panel.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct FieldEdited {
    pub handle: FieldHandle,
    pub value: PanelValue,
}

#[derive(Resource, Debug, Default)]
pub struct PanelBinding {
    fields: Vec<PanelField>,
}

impl PanelBinding {
    /// Bind every spec in order. Specs that fail to bind are logged and left
    /// out; the rest of the panel still works.
    pub fn from_specs(
        specs: &[FieldSpec],
        store: &TransformStore,
        color: Srgba,
        shape: ShapeKind,
    ) -> Self {
        let mut binding = Self::default();
        for spec in specs {
            let initial = match spec.target {
                FieldTarget::Transform(field) => PanelValue::Number(field.get(&store.get())),
                FieldTarget::Color => PanelValue::Color(color),
                FieldTarget::Shape => PanelValue::Choice(shape.name().to_string()),
            };
            if let Err(err) = binding.bind_field(spec, initial) {
                error!("Skipping panel field '{}': {err:#}", spec.name);
            }
        }
        binding
    }

    pub fn bind_field(&mut self, spec: &FieldSpec, initial: PanelValue) -> anyhow::Result<FieldHandle> {
        ensure!(
            self.handle(&spec.name).is_none(),
            "field '{}' is already bound",
            spec.name
        );
        spec.constraints
            .validate()
            .with_context(|| format!("invalid constraints on '{}'", spec.name))?;

        let constraints = &spec.constraints;
        match (spec.target, &initial) {
            (FieldTarget::Transform(_), PanelValue::Number(_))
            | (FieldTarget::Color, PanelValue::Color(_)) => {
                ensure!(
                    constraints.options.is_empty(),
                    "numeric field '{}' cannot have options",
                    spec.name
                );
            }
            (FieldTarget::Shape, PanelValue::Choice(choice)) => {
                ensure!(
                    !constraints.is_numeric(),
                    "choice field '{}' cannot have min, max or step",
                    spec.name
                );
                ensure!(
                    constraints.options.contains(choice),
                    "initial choice '{choice}' is not one of the options of '{}'",
                    spec.name
                );
                for option in &constraints.options {
                    option
                        .parse::<ShapeKind>()
                        .with_context(|| format!("bad option on '{}'", spec.name))?;
                }
            }
            (target, value) => bail!("{value:?} does not fit a {target:?} field"),
        }

        self.fields.push(PanelField {
            name: spec.name.clone(),
            target: spec.target,
            constraints: spec.constraints.clone(),
            cached: initial,
        });
        Ok(FieldHandle(self.fields.len() - 1))
    }

    pub fn handle(&self, name: &str) -> Option<FieldHandle> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .map(FieldHandle)
    }

    pub fn field(&self, handle: FieldHandle) -> Option<&PanelField> {
        self.fields.get(handle.0)
    }

    pub fn displayed(&self, handle: FieldHandle) -> Option<&PanelValue> {
        self.field(handle).map(PanelField::displayed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldHandle, &PanelField)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| (FieldHandle(index), field))
    }

    /// Inbound path: write a user edit through immediately.
    ///
    /// Transform fields go straight into the store. Colour and shape edits are
    /// returned as a [`PanelEffect`] for the caller to apply.
    pub fn apply_edit(
        &mut self,
        handle: FieldHandle,
        value: PanelValue,
        store: &mut TransformStore,
    ) -> anyhow::Result<Option<PanelEffect>> {
        let Some(field) = self.fields.get_mut(handle.0) else {
            bail!("no panel field with handle {handle:?}");
        };
        let effect = match (field.target, &value) {
            (FieldTarget::Transform(target), PanelValue::Number(number)) => {
                store.set_field(target, *number);
                None
            }
            (FieldTarget::Color, PanelValue::Color(color)) => Some(PanelEffect::Color(*color)),
            (FieldTarget::Shape, PanelValue::Choice(choice)) => {
                ensure!(
                    field.constraints.options.contains(choice),
                    "'{choice}' is not an option of '{}'",
                    field.name
                );
                Some(PanelEffect::Shape(choice.parse()?))
            }
            (target, value) => bail!("{value:?} does not fit a {target:?} field"),
        };
        field.cached = value;
        Ok(effect)
    }

    /// Outbound path: copy the store into the cached display values.
    ///
    /// Returns the fields whose display changed. Calling it again without an
    /// intervening store write changes nothing.
    pub fn refresh_outbound(&mut self, store: &TransformStore) -> Vec<FieldHandle> {
        let snapshot = store.get();
        let mut changed = Vec::new();
        for (index, field) in self.fields.iter_mut().enumerate() {
            let FieldTarget::Transform(target) = field.target else {
                continue;
            };
            let value = PanelValue::Number(target.get(&snapshot));
            if field.cached != value {
                field.cached = value;
                changed.push(FieldHandle(index));
            }
        }
        changed
    }
}

fn apply_field_edit(
    edit: On<FieldEdited>,
    mut binding: ResMut<PanelBinding>,
    mut store: ResMut<TransformStore>,
    mut color: ResMut<MaterialColor>,
    mut shape: ResMut<SelectedShape>,
) {
    match binding.apply_edit(edit.handle, edit.value.clone(), &mut store) {
        Ok(None) => {}
        Ok(Some(PanelEffect::Color(new_color))) => color.0 = new_color,
        Ok(Some(PanelEffect::Shape(new_shape))) => {
            if shape.0 != new_shape {
                shape.0 = new_shape;
            }
        }
        Err(err) => warn!("Ignoring panel edit: {err:#}"),
    }
}

fn refresh_panel_fields(store: Res<TransformStore>, mut binding: ResMut<PanelBinding>) {
    if !store.is_changed() {
        return;
    }
    // Go through `bypass_change_detection` so an unchanged panel does not
    // look edited to the widget sync.
    let changed = binding.bypass_change_detection().refresh_outbound(&store);
    if !changed.is_empty() {
        binding.set_changed();
    }
}
