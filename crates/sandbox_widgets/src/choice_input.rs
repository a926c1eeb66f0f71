use bevy::prelude::*;

use crate::WidgetSystems;

pub struct ChoiceInputPlugin;

impl Plugin for ChoiceInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(cycle_choice_on_click)
            .add_systems(Update, update_choice_display.in_set(WidgetSystems::Display));
    }
}

/// Field that picks one of a fixed list of options. Clicking advances to the
/// next option (shift-click goes back).
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ChoiceInput {
    pub options: Vec<String>,
    pub selected: usize,
}

impl ChoiceInput {
    pub fn new(options: Vec<String>, selected: usize) -> Self {
        let selected = selected.min(options.len().saturating_sub(1));
        Self { options, selected }
    }

    pub fn current(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    /// Select `option` by name. Returns false if it isn't one of the options.
    pub fn select(&mut self, option: &str) -> bool {
        match self.options.iter().position(|o| o == option) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    fn step(&mut self, forward: bool) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }
}

#[derive(Component)]
pub struct ChoiceInputDisplay;

/// Fired when the user picks a different option.
#[derive(EntityEvent, Debug, Clone)]
pub struct ChoiceChanged {
    pub entity: Entity,
    pub index: usize,
    pub value: String,
}

pub fn choice_input(input: ChoiceInput) -> impl Bundle {
    let text = input.current().unwrap_or_default().to_string();
    (
        Node {
            min_width: px(72.0),
            padding: UiRect::axes(px(6.0), px(2.0)),
            ..default()
        },
        BackgroundColor(Color::srgb(0.2, 0.2, 0.24)),
        input,
        children![(
            Text::new(text),
            TextFont {
                font_size: 13.0,
                ..default()
            },
            ChoiceInputDisplay,
            Pickable::IGNORE,
        )],
    )
}

fn cycle_choice_on_click(
    click: On<Pointer<Click>>,
    mut inputs: Query<&mut ChoiceInput>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
) {
    if click.button != PointerButton::Primary {
        return;
    }
    let entity = click.event_target();
    let Ok(mut input) = inputs.get_mut(entity) else {
        return;
    };
    let backward = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let before = input.selected;
    input.step(!backward);
    if input.selected == before {
        return;
    }
    let Some(value) = input.current().map(str::to_string) else {
        return;
    };
    commands.trigger(ChoiceChanged {
        entity,
        index: input.selected,
        value,
    });
}

fn update_choice_display(
    inputs: Query<(&ChoiceInput, &Children), Changed<ChoiceInput>>,
    mut displays: Query<&mut Text, With<ChoiceInputDisplay>>,
) {
    for (input, children) in &inputs {
        for child in children.iter() {
            if let Ok(mut text) = displays.get_mut(child) {
                text.0 = input.current().unwrap_or_default().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes() -> ChoiceInput {
        ChoiceInput::new(
            vec!["Sphere".into(), "Box".into(), "Cone".into()],
            0,
        )
    }

    #[test]
    fn stepping_wraps_both_ways() {
        let mut input = shapes();
        input.step(false);
        assert_eq!(input.current(), Some("Cone"));
        input.step(true);
        assert_eq!(input.current(), Some("Sphere"));
    }

    #[test]
    fn select_rejects_unknown_option() {
        let mut input = shapes();
        assert!(input.select("Box"));
        assert_eq!(input.selected, 1);
        assert!(!input.select("Torus"));
        assert_eq!(input.selected, 1);
    }

    #[test]
    fn new_clamps_selection() {
        let input = ChoiceInput::new(vec!["A".into()], 5);
        assert_eq!(input.selected, 0);
    }
}
