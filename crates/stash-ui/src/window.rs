//! Window management for Stash.
//!
//! This module provides `StashWindow` which owns the window, feeds library
//! snapshots to the panel and runs the panel's intents against the backend.

use std::sync::Arc;

use gpui::{
    px, size, App, AppContext, AsyncApp, Bounds, Entity, Task, TitlebarOptions,
    WindowAppearance, WindowBounds, WindowHandle, WindowKind, WindowOptions,
};

use stash_core::{AppConfig, Folders, MyStuffIntent, MyStuffProps};

use crate::backend::Backend;
use crate::keymap::{apply_keybindings, default_bindings};
use crate::model::StatusMessage;
use crate::theme::{Theme, ThemeSettings};
use crate::views::{MyStuffPanel, MyStuffPanelEvent};

// =============================================================================
// Window Configuration
// =============================================================================

/// Default window dimensions.
pub const DEFAULT_WIDTH: f32 = 420.0;
pub const DEFAULT_HEIGHT: f32 = 640.0;

/// Window title.
pub const TITLE: &str = "Stash";

/// Create window options for the MyStuff panel.
///
/// Bounds are set after creation since centering needs the App context.
fn create_window_options() -> WindowOptions {
    WindowOptions {
        window_bounds: None,
        titlebar: Some(TitlebarOptions {
            title: Some(TITLE.into()),
            ..Default::default()
        }),
        focus: true,
        show: true,
        kind: WindowKind::Normal,
        is_movable: true,
        ..Default::default()
    }
}

/// Where the window starts: an initial search term and folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostNavigation {
    pub search: String,
    pub folder: Option<String>,
}

/// Props the window passes down for a library snapshot.
///
/// `search` and `folder` stay at their launch values so later snapshots
/// never reschedule them; navigation after launch happens inside the panel.
/// Back is always allowed since the panel is the root view.
pub(crate) fn host_props(navigation: &HostNavigation, folders: Folders) -> MyStuffProps {
    MyStuffProps {
        folders,
        search: navigation.search.clone(),
        can_go_back: true,
        folder: navigation.folder.clone(),
    }
}

// =============================================================================
// Stash Window
// =============================================================================

/// The main window manager.
///
/// ## Architecture
///
/// ```text
/// [Library] --(watch)--> [feed task] --(set_props)--> [MyStuffPanel]
/// [MyStuffPanel] --(Intent event)--> [background apply] --(set_status)--> [MyStuffPanel]
/// ```
pub struct StashWindow {
    window_handle: WindowHandle<MyStuffPanel>,
    /// Task forwarding library snapshots (kept alive).
    _feed_task: Task<()>,
}

impl StashWindow {
    /// Open the window. Returns `None` if the window couldn't be created.
    pub fn new(
        config: &AppConfig,
        navigation: HostNavigation,
        backend: Arc<dyn Backend>,
        cx: &mut App,
    ) -> Option<Self> {
        let settings = ThemeSettings::from_config(&config.appearance);
        let options_view = config.view_options();
        let mut state_rx = backend.subscribe();
        let initial = host_props(&navigation, state_rx.borrow_and_update().folders.clone());

        let bounds = Bounds::centered(None, size(px(DEFAULT_WIDTH), px(DEFAULT_HEIGHT)), cx);
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..create_window_options()
        };

        let mut panel_entity: Option<Entity<MyStuffPanel>> = None;
        let window_handle = cx
            .open_window(options, |window, cx| {
                let system_is_dark = matches!(
                    window.appearance(),
                    WindowAppearance::Dark | WindowAppearance::VibrantDark
                );
                cx.set_global(Theme::from_settings(&settings, system_is_dark));
                cx.set_global(settings.clone());

                let panel = cx.new(|cx| MyStuffPanel::new(initial, options_view, cx));
                panel.update(cx, |panel, cx| panel.focus_search(window, cx));
                panel_entity = Some(panel.clone());
                panel
            })
            .ok()?;

        let panel_entity = panel_entity?;
        Self::forward_intents(&panel_entity, backend, cx);

        let feed_task = cx.spawn(async move |cx: &mut AsyncApp| {
            while state_rx.changed().await.is_ok() {
                let snapshot = state_rx.borrow_and_update().clone();
                if let Some(selection) = &snapshot.selection {
                    tracing::debug!("Selected '{}' in '{}'", selection.name, selection.folder);
                }
                let props = host_props(&navigation, snapshot.folders);
                let updated = window_handle.update(cx, |panel, _window, cx| {
                    panel.set_props(props, cx);
                });
                if updated.is_err() {
                    break;
                }
            }
        });

        Some(Self {
            window_handle,
            _feed_task: feed_task,
        })
    }

    /// Run each intent off the main thread and report the outcome.
    fn forward_intents(panel: &Entity<MyStuffPanel>, backend: Arc<dyn Backend>, cx: &mut App) {
        cx.subscribe(panel, move |panel, event: &MyStuffPanelEvent, cx| match event {
            MyStuffPanelEvent::Intent(intent) => {
                Self::apply(panel, backend.clone(), intent.clone(), cx);
            }
        })
        .detach();
    }

    fn apply(
        panel: Entity<MyStuffPanel>,
        backend: Arc<dyn Backend>,
        intent: MyStuffIntent,
        cx: &mut App,
    ) {
        let name = intent.name();
        let request = cx.background_executor().spawn(backend.apply(intent));
        let panel = panel.downgrade();
        cx.spawn(async move |cx: &mut AsyncApp| {
            let status = match request.await {
                Ok(outcome) => {
                    tracing::info!("{}", outcome);
                    StatusMessage::Complete {
                        message: outcome.to_string(),
                    }
                }
                Err(e) => {
                    tracing::error!("{} failed: {}", name, e);
                    StatusMessage::Failed {
                        error: e.to_string(),
                    }
                }
            };
            let _ = panel.update(cx, |panel, cx| panel.set_status(status, cx));
        })
        .detach();
    }

    /// Activate the window.
    pub fn show(&self, cx: &mut App) {
        let _ = self.window_handle.update(cx, |_panel, window, _cx| {
            window.activate_window();
        });
    }

    /// Get the window handle.
    pub fn handle(&self) -> WindowHandle<MyStuffPanel> {
        self.window_handle
    }
}

// =============================================================================
// App Entry Point
// =============================================================================

/// Initialize and run the application.
///
/// Sets up gpui-component and the default keybindings, opens the window,
/// and quits once the window is closed.
pub fn run_app(config: AppConfig, navigation: HostNavigation, backend: Arc<dyn Backend>) {
    gpui::Application::new().run(move |cx| {
        gpui_component::init(cx);
        apply_keybindings(default_bindings(), cx);

        let Some(window) = StashWindow::new(&config, navigation, backend, cx) else {
            tracing::error!("Failed to create window");
            cx.quit();
            return;
        };

        window.show(cx);
        cx.on_window_closed(|cx| cx.quit()).detach();

        // Keep the window alive by storing it as a global
        cx.set_global(window);
    });
}

// =============================================================================
// Global Storage
// =============================================================================

impl gpui::Global for StashWindow {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stash_core::Item;

    #[test]
    fn test_window_options() {
        let options = create_window_options();
        assert!(options.show);
        assert!(options.is_movable);
        assert!(matches!(options.kind, WindowKind::Normal));
        let title = options.titlebar.and_then(|t| t.title);
        assert_eq!(title.as_deref(), Some(TITLE));
    }

    #[test]
    fn test_host_props_carry_launch_navigation() {
        let mut folders = Folders::new();
        folders.insert("A", vec![Item::new("1", "Foo", "note", 1)]);

        let props = host_props(&HostNavigation::default(), folders.clone());
        assert!(props.can_go_back);
        assert!(props.search.is_empty());
        assert!(props.folder.is_none());
        assert_eq!(props.folders.items("A").len(), 1);

        let navigation = HostNavigation {
            search: String::new(),
            folder: Some("A".into()),
        };
        assert_eq!(host_props(&navigation, folders).folder.as_deref(), Some("A"));
    }
}
