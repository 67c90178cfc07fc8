//! GPUI keybinding registration.
//!
//! ## Binding Order
//!
//! GPUI uses last-wins semantics: later bindings override earlier ones at the
//! same context depth.

use std::rc::Rc;

use gpui::{App, DummyKeyboardMapper, KeyBinding, KeyBindingContextPredicate};

use crate::actions::action_from_name;

/// Key context of the MyStuff panel.
pub const PANEL_CONTEXT: &str = "MyStuff";

/// Key context of the search field.
pub const INPUT_CONTEXT: &str = "SearchInput";

/// A key bound to a named action in a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub key: String,
    pub action: String,
    pub context: Option<String>,
}

impl Binding {
    fn new(key: &str, action: &str, context: &str) -> Self {
        Self {
            key: key.to_string(),
            action: action.to_string(),
            context: Some(context.to_string()),
        }
    }
}

/// Built-in bindings.
///
/// Shortcuts that differ by platform are bound with both `cmd` and `ctrl`.
pub fn default_bindings() -> Vec<Binding> {
    let mut bindings = vec![
        Binding::new("escape", "back", PANEL_CONTEXT),
        Binding::new("cmd+z", "undo", PANEL_CONTEXT),
        Binding::new("ctrl+z", "undo", PANEL_CONTEXT),
        Binding::new("cmd+f", "focus_search", PANEL_CONTEXT),
        Binding::new("ctrl+f", "focus_search", PANEL_CONTEXT),
    ];

    for (key, action) in [
        ("backspace", "backspace"),
        ("delete", "delete"),
        ("left", "move_left"),
        ("right", "move_right"),
        ("home", "home"),
        ("end", "end"),
        ("cmd+a", "text_select_all"),
        ("ctrl+a", "text_select_all"),
        ("cmd+v", "paste"),
        ("ctrl+v", "paste"),
    ] {
        bindings.push(Binding::new(key, action, INPUT_CONTEXT));
    }
    bindings
}

// =============================================================================
// Keystroke Parsing
// =============================================================================

/// Convert user-friendly keystroke to GPUI format.
///
/// "cmd+shift+z" becomes "cmd-shift-z".
fn normalize_keystroke(s: &str) -> String {
    s.replace('+', "-")
}

fn build_context_predicate(context: Option<&str>) -> Option<Rc<KeyBindingContextPredicate>> {
    KeyBindingContextPredicate::parse(context.unwrap_or(PANEL_CONTEXT))
        .ok()
        .map(Rc::new)
}

// =============================================================================
// Apply Keybindings
// =============================================================================

/// Register bindings with GPUI. Unknown actions and bad keys are skipped.
pub fn apply_keybindings(bindings: impl IntoIterator<Item = Binding>, cx: &mut App) {
    let mut count = 0;
    for binding in bindings {
        let Some(action) = action_from_name(&binding.action) else {
            tracing::warn!("Unknown action: {}", binding.action);
            continue;
        };
        match KeyBinding::load(
            &normalize_keystroke(&binding.key),
            action,
            build_context_predicate(binding.context.as_deref()),
            false, // use_key_equivalents
            None,  // action_input
            &DummyKeyboardMapper,
        ) {
            Ok(key_binding) => {
                cx.bind_keys([key_binding]);
                count += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to create binding for '{}': {:?}", binding.key, e);
            }
        }
    }
    tracing::debug!("Registered {} key bindings", count);
}
