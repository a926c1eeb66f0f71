use std::collections::{BTreeSet, HashMap, HashSet};

use bevy::{input::keyboard::Key, prelude::*};
use sandbox_widgets::numeric_input::NumericDragState;
use serde::{Deserialize, Serialize};

use crate::{input_mode::InputState, transform_store::TransformStore};

/// Case-normalized key identifier: `"w"`, `"arrowup"`, `"shift"`, `"space"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    pub fn from_logical(key: &Key) -> Self {
        match key {
            Key::Character(text) => Self::new(text),
            Key::Space => Self::new("space"),
            other => Self::new(&format!("{other:?}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A key press or release delivered to the session.
#[derive(Message, Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: KeyId,
    pub pressed: bool,
}

/// Keys currently held down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys(HashSet<KeyId>);

impl HeldKeys {
    pub fn press(&mut self, key: KeyId) {
        self.0.insert(key);
    }

    pub fn release(&mut self, key: &KeyId) {
        self.0.remove(key);
    }

    pub fn release_all(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyId> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Motion {
    Translate,
    Rotate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// What a bound key does: move or turn one signed unit along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisEffect {
    pub motion: Motion,
    pub axis: Axis,
    pub positive: bool,
}

impl AxisEffect {
    pub const fn translate(axis: Axis, positive: bool) -> Self {
        Self {
            motion: Motion::Translate,
            axis,
            positive,
        }
    }

    pub const fn rotate(axis: Axis, positive: bool) -> Self {
        Self {
            motion: Motion::Rotate,
            axis,
            positive,
        }
    }

    fn signed_unit(self) -> Vec3 {
        if self.positive {
            self.axis.unit()
        } else {
            -self.axis.unit()
        }
    }
}

/// Which keyboard layout a deployment uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    /// Arrows, space and shift translate; W/S, A/D, Q/E rotate about X, Y, Z.
    #[default]
    Rotate,
    /// Arrows and WASD both translate on the ground plane; space and shift
    /// move vertically. No rotation keys.
    Translate,
}

/// Key to axis-effect table. Several keys may share an effect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyBindings(HashMap<KeyId, AxisEffect>);

impl KeyBindings {
    pub fn for_scheme(scheme: ControlScheme) -> Self {
        let mut bindings = Self::default();
        bindings
            .bind("arrowup", AxisEffect::translate(Axis::Z, false))
            .bind("arrowdown", AxisEffect::translate(Axis::Z, true))
            .bind("arrowleft", AxisEffect::translate(Axis::X, false))
            .bind("arrowright", AxisEffect::translate(Axis::X, true))
            .bind("space", AxisEffect::translate(Axis::Y, true))
            .bind("shift", AxisEffect::translate(Axis::Y, false));

        match scheme {
            ControlScheme::Rotate => {
                bindings
                    .bind("w", AxisEffect::rotate(Axis::X, false))
                    .bind("s", AxisEffect::rotate(Axis::X, true))
                    .bind("a", AxisEffect::rotate(Axis::Y, false))
                    .bind("d", AxisEffect::rotate(Axis::Y, true))
                    .bind("q", AxisEffect::rotate(Axis::Z, false))
                    .bind("e", AxisEffect::rotate(Axis::Z, true));
            }
            ControlScheme::Translate => {
                bindings
                    .bind("w", AxisEffect::translate(Axis::Z, false))
                    .bind("s", AxisEffect::translate(Axis::Z, true))
                    .bind("a", AxisEffect::translate(Axis::X, false))
                    .bind("d", AxisEffect::translate(Axis::X, true));
            }
        }
        bindings
    }

    pub fn bind(&mut self, key: &str, effect: AxisEffect) -> &mut Self {
        self.0.insert(KeyId::new(key), effect);
        self
    }

    pub fn effect(&self, key: &KeyId) -> Option<AxisEffect> {
        self.0.get(key).copied()
    }
}

/// Per-frame translation and rotation produced by held keys.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyboardDelta {
    pub translation: Vec3,
    pub rotation: Vec3,
}

/// Turns held keys into one delta per rendered frame, independent of how
/// often key events arrive.
#[derive(Resource, Clone, Debug)]
pub struct KeyboardDeltaAccumulator {
    pub bindings: KeyBindings,
    /// World units per frame.
    pub move_speed: f32,
    /// Radians per frame.
    pub rotation_speed: f32,
}

impl Default for KeyboardDeltaAccumulator {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::for_scheme(ControlScheme::default()),
            move_speed: 0.1,
            rotation_speed: 0.05,
        }
    }
}

impl KeyboardDeltaAccumulator {
    /// Sum the effects of every held key. An effect reached through several
    /// held keys counts once.
    pub fn compute_deltas(&self, held: &HeldKeys) -> KeyboardDelta {
        let effects: BTreeSet<AxisEffect> = held
            .iter()
            .filter_map(|key| self.bindings.effect(key))
            .collect();

        let mut delta = KeyboardDelta::default();
        for effect in effects {
            match effect.motion {
                Motion::Translate => delta.translation += effect.signed_unit() * self.move_speed,
                Motion::Rotate => delta.rotation += effect.signed_unit() * self.rotation_speed,
            }
        }
        delta
    }
}

pub(crate) fn track_held_keys(mut keys: MessageReader<KeyInput>, mut input: ResMut<InputState>) {
    for KeyInput { key, pressed } in keys.read() {
        if *pressed {
            input.held_keys.press(key.clone());
        } else {
            input.held_keys.release(key);
        }
    }
}

/// Apply one frame of held-key motion. Keys stay held but do nothing while a
/// panel number is being dragged.
pub(crate) fn apply_keyboard_deltas(
    accumulator: Res<KeyboardDeltaAccumulator>,
    input: Res<InputState>,
    widget_drag: Option<Res<NumericDragState>>,
    mut store: ResMut<TransformStore>,
) {
    if input.held_keys.is_empty() {
        return;
    }
    if widget_drag.is_some_and(|drag| drag.active.is_some()) {
        return;
    }
    let delta = accumulator.compute_deltas(&input.held_keys);
    store.translate_and_rotate(delta.translation, delta.rotation);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[&str]) -> HeldKeys {
        let mut held = HeldKeys::default();
        for key in keys {
            held.press(KeyId::new(key));
        }
        held
    }

    fn translate_scheme() -> KeyboardDeltaAccumulator {
        KeyboardDeltaAccumulator {
            bindings: KeyBindings::for_scheme(ControlScheme::Translate),
            ..default()
        }
    }

    #[test]
    fn key_ids_are_case_normalized() {
        assert_eq!(KeyId::new("W"), KeyId::new("w"));
        assert_eq!(KeyId::from_logical(&Key::Character("A".into())), KeyId::new("a"));
        assert_eq!(KeyId::from_logical(&Key::ArrowUp).as_str(), "arrowup");
        assert_eq!(KeyId::from_logical(&Key::Shift).as_str(), "shift");
        assert_eq!(KeyId::from_logical(&Key::Space).as_str(), "space");
    }

    #[test]
    fn aliased_keys_apply_their_effect_once() {
        let accumulator = translate_scheme();
        let delta = accumulator.compute_deltas(&held(&["arrowright", "d"]));
        assert_eq!(delta.translation, Vec3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn distinct_effects_sum_diagonally() {
        let accumulator = KeyboardDeltaAccumulator::default();
        let delta = accumulator.compute_deltas(&held(&["arrowright", "arrowdown"]));
        assert_eq!(delta.translation, Vec3::new(0.1, 0.0, 0.1));
        assert_eq!(delta.rotation, Vec3::ZERO);
    }

    #[test]
    fn opposite_effects_cancel() {
        let accumulator = KeyboardDeltaAccumulator::default();
        let delta = accumulator.compute_deltas(&held(&["space", "shift"]));
        assert_eq!(delta.translation, Vec3::ZERO);
    }

    #[test]
    fn rotate_scheme_turns_on_letter_keys() {
        let accumulator = KeyboardDeltaAccumulator::default();
        let delta = accumulator.compute_deltas(&held(&["d", "q"]));
        assert_eq!(delta.translation, Vec3::ZERO);
        assert_eq!(delta.rotation, Vec3::new(0.0, 0.05, -0.05));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let accumulator = KeyboardDeltaAccumulator::default();
        let delta = accumulator.compute_deltas(&held(&["f1", "z"]));
        assert_eq!(delta, KeyboardDelta::default());
    }

    #[test]
    fn release_removes_held_key() {
        let mut keys = held(&["w"]);
        keys.release(&KeyId::new("W"));
        assert!(keys.is_empty());
    }
}
