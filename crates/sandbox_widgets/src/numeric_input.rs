use bevy::prelude::*;

use crate::WidgetSystems;

pub struct NumericInputPlugin;

impl Plugin for NumericInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NumericDragState>()
            .add_observer(start_numeric_drag)
            .add_systems(
                Update,
                (
                    update_numeric_drag.in_set(WidgetSystems::Interaction),
                    update_numeric_display.in_set(WidgetSystems::Display),
                ),
            );
    }
}

/// Drag-to-edit number field.
///
/// Writing `value` directly only refreshes the display. User drags go through
/// [`NumericInput::constrain`] and fire [`NumericValueChanged`].
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NumericInput {
    pub value: f64,
    pub step: f64,
    pub precision: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericInput {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            step: 0.01,
            precision: 3,
            min: None,
            max: None,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self.precision = precision_for_step(step);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Snap a raw value onto the step grid (anchored at `min` when set) and
    /// clamp it into range.
    pub fn constrain(&self, raw: f64) -> f64 {
        let mut value = raw;
        if self.step > 0.0 {
            let base = self.min.unwrap_or(0.0);
            value = base + ((value - base) / self.step).round() * self.step;
        }
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        value
    }

    pub fn formatted(&self) -> String {
        format!("{:.prec$}", self.value, prec = self.precision)
    }
}

fn precision_for_step(step: f64) -> usize {
    let mut precision = 0;
    let mut scaled = step.abs();
    while precision < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        precision += 1;
    }
    precision
}

/// Bundle for a numeric field with its text display child.
pub fn numeric_input(input: NumericInput) -> impl Bundle {
    let text = input.formatted();
    (
        Node {
            min_width: px(72.0),
            padding: UiRect::axes(px(6.0), px(2.0)),
            ..default()
        },
        BackgroundColor(Color::srgb(0.16, 0.16, 0.18)),
        input,
        children![(
            Text::new(text),
            TextFont {
                font_size: 13.0,
                ..default()
            },
            NumericInputDisplay,
            Pickable::IGNORE,
        )],
    )
}

#[derive(Component)]
pub struct NumericInputDisplay;

/// Fired when the user edits a numeric field.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct NumericValueChanged {
    pub entity: Entity,
    pub value: f64,
}

#[derive(Resource, Default)]
pub struct NumericDragState {
    pub active: Option<ActiveDrag>,
}

pub struct ActiveDrag {
    pub entity: Entity,
    pub last_screen_x: f32,
    /// Unsnapped value, so sub-step motion accumulates.
    pub raw_value: f64,
}

fn start_numeric_drag(
    press: On<Pointer<Press>>,
    mut state: ResMut<NumericDragState>,
    inputs: Query<&NumericInput>,
    windows: Query<&Window>,
) {
    if press.button != PointerButton::Primary {
        return;
    }
    let entity = press.event_target();
    let Ok(input) = inputs.get(entity) else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(pos) = window.cursor_position() else {
        return;
    };
    state.active = Some(ActiveDrag {
        entity,
        last_screen_x: pos.x,
        raw_value: input.value,
    });
}

fn update_numeric_drag(
    mut state: ResMut<NumericDragState>,
    mut query: Query<&mut NumericInput>,
    windows: Query<&Window>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
) {
    let Some(active) = &mut state.active else {
        return;
    };

    if !mouse.pressed(MouseButton::Left) {
        state.active = None;
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };

    let delta_x = cursor_pos.x - active.last_screen_x;
    active.last_screen_x = cursor_pos.x;

    if delta_x.abs() < 0.1 {
        return;
    }

    let Ok(mut input) = query.get_mut(active.entity) else {
        state.active = None;
        return;
    };

    let mut sensitivity = input.step;
    if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        sensitivity *= 0.1;
    }
    if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
        sensitivity *= 10.0;
    }

    active.raw_value += delta_x as f64 * sensitivity;
    let value = input.constrain(active.raw_value);
    if (value - input.value).abs() <= f64::EPSILON {
        return;
    }
    input.value = value;

    let entity = active.entity;
    commands.trigger(NumericValueChanged { entity, value });
}

fn update_numeric_display(
    inputs: Query<(&NumericInput, &Children), Changed<NumericInput>>,
    mut displays: Query<&mut Text, With<NumericInputDisplay>>,
) {
    for (input, children) in &inputs {
        for child in children.iter() {
            if let Ok(mut text) = displays.get_mut(child) {
                text.0 = input.formatted();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrain_snaps_and_clamps() {
        let input = NumericInput::new(0.0)
            .with_step(0.1)
            .with_min(-14.0)
            .with_max(14.0);
        assert!((input.constrain(1.234) - 1.2).abs() < 1e-9);
        assert_eq!(input.constrain(20.0), 14.0);
        assert_eq!(input.constrain(-20.0), -14.0);
    }

    #[test]
    fn precision_follows_step() {
        assert_eq!(NumericInput::new(0.0).with_step(0.1).precision, 1);
        assert_eq!(NumericInput::new(0.0).with_step(0.01).precision, 2);
        assert_eq!(NumericInput::new(0.0).with_step(1.0).precision, 0);
    }

    #[test]
    fn formatted_uses_precision() {
        let input = NumericInput::new(1.23456).with_step(0.01);
        assert_eq!(input.formatted(), "1.23");
    }
}
