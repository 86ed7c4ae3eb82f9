//! Keyboard mapping
//!
//! Raw `KeyboardEvent.code` values map to game actions. Codes are layout
//! independent, so WASD stays in place on AZERTY keyboards.

use crate::sim::Action;

/// Action bound to a key code, if any
pub fn action_for_key(code: &str) -> Option<Action> {
    let action = match code {
        "ArrowLeft" | "KeyA" => Action::RotateLeft,
        "ArrowRight" | "KeyD" => Action::RotateRight,
        "ArrowUp" | "KeyW" => Action::ThrustForward,
        "ArrowDown" | "KeyS" => Action::ThrustBackward,
        "KeyQ" => Action::StrafeLeft,
        "KeyE" => Action::StrafeRight,
        "Space" => Action::Shoot,
        "Enter" | "NumpadEnter" => Action::Start,
        _ => return None,
    };
    Some(action)
}

/// Keys whose browser default (scrolling) should be suppressed while a round runs
pub fn blocks_page_scroll(code: &str) -> bool {
    matches!(
        code,
        "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown" | "Space"
    )
}
