//! Keyboard and gamepad bindings, and per-frame edit coalescing.

use gilrs::Button;
use shellcloud_core::{GenerationParameters, ParameterEdit, MAX_TRIANGLE_COUNT};
use winit::keyboard::KeyCode;

const RADIUS_STEP: f32 = 1.25;
const SIZE_STEP: f32 = 0.25;

/// What a key or button asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Change a generation parameter (always rebuilds)
    Edit(ParameterEdit),
    /// Rebuild the same parameters from a fresh seed
    Reseed,
    /// Display-only: pause or resume auto-rotation
    ToggleRotation,
    Quit,
}

/// Map a pressed key to a control, given the parameters it edits.
pub fn control_for_key(key: KeyCode, params: &GenerationParameters) -> Option<Control> {
    let edit = match key {
        KeyCode::Equal | KeyCode::NumpadAdd => ParameterEdit::TriangleCount(
            params
                .total_triangle_count
                .saturating_mul(2)
                .min(MAX_TRIANGLE_COUNT),
        ),
        KeyCode::Minus | KeyCode::NumpadSubtract => {
            ParameterEdit::TriangleCount(params.total_triangle_count / 2)
        }
        KeyCode::BracketLeft => ParameterEdit::OuterRadius(params.outer_radius / RADIUS_STEP),
        KeyCode::BracketRight => ParameterEdit::OuterRadius(params.outer_radius * RADIUS_STEP),
        KeyCode::Digit1 => ParameterEdit::SizeMin(params.size_min - SIZE_STEP),
        KeyCode::Digit2 => ParameterEdit::SizeMin(params.size_min + SIZE_STEP),
        KeyCode::Digit3 => ParameterEdit::SizeMax(params.size_max - SIZE_STEP),
        KeyCode::Digit4 => ParameterEdit::SizeMax(params.size_max + SIZE_STEP),
        KeyCode::Comma => ParameterEdit::ShellCount(params.shell_count.saturating_sub(1)),
        KeyCode::Period => ParameterEdit::ShellCount(params.shell_count.saturating_add(1)),
        KeyCode::KeyF => ParameterEdit::Wireframe(!params.wireframe),
        KeyCode::KeyR => return Some(Control::Reseed),
        KeyCode::Space => return Some(Control::ToggleRotation),
        KeyCode::Escape => return Some(Control::Quit),
        _ => return None,
    };
    Some(Control::Edit(edit))
}

/// Map a pressed gamepad button to a control.
pub fn control_for_button(button: Button, params: &GenerationParameters) -> Option<Control> {
    let key = match button {
        Button::DPadUp => KeyCode::Equal,
        Button::DPadDown => KeyCode::Minus,
        Button::LeftTrigger => KeyCode::BracketLeft,
        Button::RightTrigger => KeyCode::BracketRight,
        Button::DPadLeft => KeyCode::Comma,
        Button::DPadRight => KeyCode::Period,
        Button::South => KeyCode::KeyF,
        Button::North => KeyCode::KeyR,
        Button::Start => KeyCode::Space,
        _ => return None,
    };
    control_for_key(key, params)
}

/// Edits received since the last frame, folded into one snapshot.
///
/// Several key presses in one frame cost a single rebuild. Edits stack on
/// each other, starting from the live parameters.
#[derive(Debug, Default)]
pub struct EditQueue {
    pending: Option<GenerationParameters>,
    reseed: bool,
}

impl EditQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters the next edit should build on.
    pub fn current(&self, live: &GenerationParameters) -> GenerationParameters {
        self.pending.unwrap_or(*live)
    }

    pub fn push(&mut self, edit: ParameterEdit, live: &GenerationParameters) {
        self.pending = Some(edit.apply(self.current(live)));
    }

    /// Request a rebuild from a fresh seed.
    pub fn reseed(&mut self, live: &GenerationParameters) {
        self.reseed = true;
        self.pending.get_or_insert(*live);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Take the coalesced snapshot and whether to reseed first.
    pub fn take(&mut self) -> Option<(GenerationParameters, bool)> {
        let params = self.pending.take()?;
        Some((params, std::mem::take(&mut self.reseed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_doubles_count() {
        let params = GenerationParameters::default();
        assert_eq!(
            control_for_key(KeyCode::Equal, &params),
            Some(Control::Edit(ParameterEdit::TriangleCount(200_000)))
        );
    }

    #[test]
    fn doubling_stops_at_budget_limit() {
        let live = GenerationParameters::default();
        let mut queue = EditQueue::new();
        for _ in 0..32 {
            let current = queue.current(&live);
            if let Some(Control::Edit(edit)) = control_for_key(KeyCode::Equal, &current) {
                queue.push(edit, &live);
            }
        }

        let (params, _) = queue.take().unwrap();
        assert_eq!(params.total_triangle_count, MAX_TRIANGLE_COUNT);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn wireframe_key_toggles() {
        let params = GenerationParameters::default();
        assert_eq!(
            control_for_key(KeyCode::KeyF, &params),
            Some(Control::Edit(ParameterEdit::Wireframe(false)))
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let params = GenerationParameters::default();
        assert_eq!(control_for_key(KeyCode::KeyQ, &params), None);
        assert_eq!(control_for_button(Button::Mode, &params), None);
    }

    #[test]
    fn gamepad_mirrors_keyboard() {
        let params = GenerationParameters::default();
        assert_eq!(
            control_for_button(Button::North, &params),
            Some(Control::Reseed)
        );
        assert_eq!(
            control_for_button(Button::DPadRight, &params),
            Some(Control::Edit(ParameterEdit::ShellCount(8)))
        );
    }

    #[test]
    fn edits_in_one_frame_coalesce() {
        let live = GenerationParameters::default();
        let mut queue = EditQueue::new();
        assert!(queue.is_empty());

        for key in [KeyCode::Equal, KeyCode::Equal, KeyCode::KeyF] {
            if let Some(Control::Edit(edit)) = control_for_key(key, &queue.current(&live)) {
                queue.push(edit, &live);
            }
        }

        let (params, reseed) = queue.take().unwrap();
        assert_eq!(params.total_triangle_count, 400_000);
        assert!(!params.wireframe);
        assert!(!reseed);
        assert!(queue.take().is_none());
    }

    #[test]
    fn reseed_without_edits_rebuilds_live_params() {
        let live = GenerationParameters::default().with_triangle_count(700);
        let mut queue = EditQueue::new();
        queue.reseed(&live);

        assert_eq!(queue.take(), Some((live, true)));
    }

    #[test]
    fn shell_count_cannot_underflow() {
        let params = GenerationParameters::default().with_shell_count(0);
        assert_eq!(
            control_for_key(KeyCode::Comma, &params),
            Some(Control::Edit(ParameterEdit::ShellCount(0)))
        );
    }
}
