//! Centralized actions for Stash.
//!
//! Actions are dispatched by GPUI's key binding system.

use gpui::actions;

// =============================================================================
// Navigation Actions
// =============================================================================

actions!(stash, [Back, Undo, FocusSearch]);

// =============================================================================
// Text Editing Actions
// =============================================================================

actions!(
    stash,
    [
        Backspace,
        Delete,
        MoveLeft,
        MoveRight,
        TextSelectAll,
        Home,
        End,
        Paste,
    ]
);

// =============================================================================
// Action Lookup
// =============================================================================

/// Look up an action by name for GPUI registration.
pub fn action_from_name(name: &str) -> Option<Box<dyn gpui::Action>> {
    match name {
        // Navigation
        "back" => Some(Box::new(Back)),
        "undo" => Some(Box::new(Undo)),
        "focus_search" => Some(Box::new(FocusSearch)),

        // Text editing
        "backspace" => Some(Box::new(Backspace)),
        "delete" => Some(Box::new(Delete)),
        "move_left" => Some(Box::new(MoveLeft)),
        "move_right" => Some(Box::new(MoveRight)),
        "text_select_all" => Some(Box::new(TextSelectAll)),
        "home" => Some(Box::new(Home)),
        "end" => Some(Box::new(End)),
        "paste" => Some(Box::new(Paste)),

        _ => None,
    }
}

/// Get all available action names.
pub fn available_actions() -> &'static [&'static str] {
    &[
        "back",
        "undo",
        "focus_search",
        "backspace",
        "delete",
        "move_left",
        "move_right",
        "text_select_all",
        "home",
        "end",
        "paste",
    ]
}
