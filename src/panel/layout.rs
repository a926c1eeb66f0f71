use bevy::prelude::*;
use sandbox_widgets::{
    choice_input::{ChoiceChanged, ChoiceInput, choice_input},
    numeric_input::{NumericInput, NumericValueChanged, numeric_input},
};

use super::{FieldConstraints, FieldEdited, FieldHandle, PanelBinding, PanelValue};
use crate::{FrameSet, SandboxEntity};

const PANEL_BG: Color = Color::srgba(0.12, 0.12, 0.12, 0.92);
const LABEL_COLOR: Color = Color::srgb(0.75, 0.75, 0.78);
const CHANNEL_NAMES: [&str; 3] = ["R", "G", "B"];

/// On-screen panel for [`PanelBinding`]: one row per bound field.
pub struct PanelLayoutPlugin;

impl Plugin for PanelLayoutPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_panel)
            .add_observer(forward_numeric_edit)
            .add_observer(forward_choice_edit)
            .add_systems(
                Update,
                sync_panel_widgets
                    .after(super::refresh_panel_fields)
                    .in_set(FrameSet::Panel),
            );
    }
}

/// Marker on every panel UI node. Pointer presses over these never start a
/// drag in the scene.
#[derive(Component, Default)]
pub struct PanelNode;

/// Links a widget to its panel field. Colour fields use one widget per
/// channel.
#[derive(Component, Clone, Copy, Debug)]
pub struct FieldBinding {
    pub handle: FieldHandle,
    pub channel: Option<usize>,
}

fn spawn_panel(mut commands: Commands, binding: Res<PanelBinding>) {
    let root = commands
        .spawn((
            Name::new("Control Panel"),
            SandboxEntity,
            PanelNode,
            Node {
                position_type: PositionType::Absolute,
                top: px(8.0),
                right: px(8.0),
                width: px(280.0),
                flex_direction: FlexDirection::Column,
                row_gap: px(4.0),
                padding: UiRect::all(px(8.0)),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .id();

    for (handle, field) in binding.iter() {
        let row = commands
            .spawn((
                PanelNode,
                Node {
                    flex_direction: FlexDirection::Row,
                    align_items: AlignItems::Center,
                    column_gap: px(6.0),
                    ..default()
                },
                children![(
                    PanelNode,
                    Node {
                        width: px(88.0),
                        ..default()
                    },
                    Text::new(field.name.clone()),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    TextColor(LABEL_COLOR),
                )],
            ))
            .id();
        commands.entity(root).add_child(row);

        match field.displayed() {
            PanelValue::Number(value) => {
                let widget = commands
                    .spawn((
                        PanelNode,
                        FieldBinding {
                            handle,
                            channel: None,
                        },
                        numeric_input(numeric_widget(*value, &field.constraints)),
                    ))
                    .id();
                commands.entity(row).add_child(widget);
            }
            PanelValue::Color(color) => {
                let channels = [color.red, color.green, color.blue];
                for (channel, value) in channels.into_iter().enumerate() {
                    let widget = commands
                        .spawn((
                            PanelNode,
                            Name::new(format!("{} {}", field.name, CHANNEL_NAMES[channel])),
                            FieldBinding {
                                handle,
                                channel: Some(channel),
                            },
                            numeric_input(numeric_widget(value, &field.constraints)),
                        ))
                        .id();
                    commands.entity(row).add_child(widget);
                }
            }
            PanelValue::Choice(choice) => {
                let mut input = ChoiceInput::new(field.constraints.options.clone(), 0);
                input.select(choice);
                let widget = commands
                    .spawn((
                        PanelNode,
                        FieldBinding {
                            handle,
                            channel: None,
                        },
                        choice_input(input),
                    ))
                    .id();
                commands.entity(row).add_child(widget);
            }
        }
    }
}

fn numeric_widget(value: f32, constraints: &FieldConstraints) -> NumericInput {
    let mut input = NumericInput::new(f64::from(value));
    if let Some(step) = constraints.step {
        input = input.with_step(f64::from(step));
    }
    if let Some(min) = constraints.min {
        input = input.with_min(f64::from(min));
    }
    if let Some(max) = constraints.max {
        input = input.with_max(f64::from(max));
    }
    input
}

fn forward_numeric_edit(
    changed: On<NumericValueChanged>,
    widgets: Query<&FieldBinding>,
    binding: Res<PanelBinding>,
    mut commands: Commands,
) {
    let Ok(widget) = widgets.get(changed.entity) else {
        return;
    };
    let value = changed.value as f32;
    let value = match (widget.channel, binding.displayed(widget.handle)) {
        (None, _) => PanelValue::Number(value),
        (Some(channel), Some(PanelValue::Color(color))) => {
            let mut color = *color;
            match channel {
                0 => color.red = value,
                1 => color.green = value,
                _ => color.blue = value,
            }
            PanelValue::Color(color)
        }
        (Some(_), _) => return,
    };
    commands.trigger(FieldEdited {
        handle: widget.handle,
        value,
    });
}

fn forward_choice_edit(
    changed: On<ChoiceChanged>,
    widgets: Query<&FieldBinding>,
    mut commands: Commands,
) {
    let Ok(widget) = widgets.get(changed.entity) else {
        return;
    };
    commands.trigger(FieldEdited {
        handle: widget.handle,
        value: PanelValue::Choice(changed.value.clone()),
    });
}

/// Push cached display values into the widgets by assigning their values
/// directly. This never fires the widgets' change events.
fn sync_panel_widgets(
    binding: Res<PanelBinding>,
    mut numbers: Query<(&FieldBinding, &mut NumericInput)>,
    mut choices: Query<(&FieldBinding, &mut ChoiceInput)>,
) {
    if !binding.is_changed() {
        return;
    }
    for (widget, mut input) in &mut numbers {
        let shown = match (widget.channel, binding.displayed(widget.handle)) {
            (None, Some(PanelValue::Number(value))) => *value,
            (Some(channel), Some(PanelValue::Color(color))) => match channel {
                0 => color.red,
                1 => color.green,
                _ => color.blue,
            },
            _ => continue,
        };
        let shown = f64::from(shown);
        if (input.value - shown).abs() > f64::EPSILON {
            input.value = shown;
        }
    }
    for (widget, mut input) in &mut choices {
        if let Some(PanelValue::Choice(choice)) = binding.displayed(widget.handle)
            && input.current() != Some(choice.as_str())
        {
            input.select(choice);
        }
    }
}
