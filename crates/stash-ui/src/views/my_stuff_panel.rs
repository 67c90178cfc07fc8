//! MyStuff panel - browsing, searching and managing items.
//!
//! ## Architecture
//!
//! - The window owns the library and passes folders down as props
//! - `MyStuffState` (from stash-core) holds the debounced search and folder
//! - Each debounced cell has one timer `Task`; replacing or dropping the task
//!   cancels the pending update
//! - User actions never touch items; they are emitted as intents

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gpui::{
    div, prelude::*, px, size, Animation, AnimationExt, AnyElement, App, AsyncApp, ClickEvent,
    Context, ElementId, Entity, EventEmitter, FocusHandle, Focusable, FontWeight, IntoElement,
    ParentElement, Pixels, Render, SharedString, Size, Styled, Task, WeakEntity, Window,
};
use gpui_component::{v_virtual_list, VirtualListScrollHandle};

use stash_core::{
    render, ElementRow, ElementState, Leading, MyStuffIntent, MyStuffProps, MyStuffState,
    MyStuffView, RowAction, RowTarget, ViewOptions, Where, EMPTY_PLACEHOLDER,
};

use crate::actions::{Back, FocusSearch, Undo};
use crate::keymap::PANEL_CONTEXT;
use crate::model::{flatten, ListEntry, StatusMessage};
use crate::theme::{avatar_color, Theme, ThemeExt};
use crate::views::{SearchInput, SearchInputEvent};

/// Fade-in duration of the row action cluster.
const ACTIONS_FADE: Duration = Duration::from_millis(150);

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MyStuffPanelEvent {
    /// The user asked for a side effect.
    Intent(MyStuffIntent),
}

// =============================================================================
// MyStuffPanel
// =============================================================================

pub struct MyStuffPanel {
    props: MyStuffProps,
    state: MyStuffState,
    view: MyStuffView,
    entries: Vec<ListEntry>,
    /// Pointer state per row key.
    hover: HashMap<String, ElementState>,
    status: Option<StatusMessage>,
    search_input: Entity<SearchInput>,
    focus_handle: FocusHandle,
    scroll_handle: VirtualListScrollHandle,
    search_timer: Option<(Instant, Task<()>)>,
    folder_timer: Option<(Instant, Task<()>)>,
    /// Open file picker, if any.
    import_prompt: Option<Task<()>>,
}

impl MyStuffPanel {
    pub fn new(props: MyStuffProps, options: ViewOptions, cx: &mut Context<Self>) -> Self {
        let state = MyStuffState::new(&props, options);
        let view = render(&props, &state);
        let entries = flatten(&view);

        let search_input = cx.new(|cx| {
            let mut input = SearchInput::new(view.search_bar.placeholder.clone(), cx);
            input.set_text(view.search_bar.value.clone(), cx);
            input
        });
        cx.subscribe(&search_input, Self::on_search_input_event)
            .detach();
        cx.on_release(|this, _cx| this.teardown()).detach();

        Self {
            props,
            state,
            view,
            entries,
            hover: HashMap::new(),
            status: None,
            search_input,
            focus_handle: cx.focus_handle(),
            scroll_handle: VirtualListScrollHandle::new(),
            search_timer: None,
            folder_timer: None,
            import_prompt: None,
        }
    }

    /// The current render model.
    pub fn view(&self) -> &MyStuffView {
        &self.view
    }

    /// Receive new props from the owner.
    ///
    /// Folder contents show immediately; changed `search` and `folder`
    /// values go through the debounce.
    pub fn set_props(&mut self, props: MyStuffProps, cx: &mut Context<Self>) {
        self.state.receive_props(&props, Instant::now());
        self.props = props;
        self.rebuild(cx);
        self.arm_timers(cx);
    }

    pub fn set_status(&mut self, status: StatusMessage, cx: &mut Context<Self>) {
        self.status = Some(status);
        cx.notify();
    }

    pub fn focus_search(&self, window: &mut Window, cx: &mut Context<Self>) {
        let handle = self.search_input.read(cx).focus_handle(cx);
        window.focus(&handle, cx);
    }

    // -------------------------------------------------------------------------
    // Debounce
    // -------------------------------------------------------------------------

    /// Make sure each pending cell has a timer for its current deadline.
    fn arm_timers(&mut self, cx: &mut Context<Self>) {
        Self::arm(&mut self.search_timer, self.state.search_deadline(), cx);
        Self::arm(&mut self.folder_timer, self.state.folder_deadline(), cx);
    }

    fn arm(
        slot: &mut Option<(Instant, Task<()>)>,
        deadline: Option<Instant>,
        cx: &mut Context<Self>,
    ) {
        let armed = slot.as_ref().map(|(armed, _)| *armed);
        match plan_timer(armed, deadline, Instant::now()) {
            TimerPlan::Clear => *slot = None,
            TimerPlan::Keep => {}
            TimerPlan::Arm { deadline, delay } => {
                let task = cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
                    cx.background_executor().timer(delay).await;
                    let _ = this.update(cx, |this, cx| this.flush(cx));
                });
                *slot = Some((deadline, task));
            }
        }
    }

    /// Drop pending debounced values and their timers.
    fn teardown(&mut self) {
        self.state.cancel();
        self.search_timer = None;
        self.folder_timer = None;
        self.import_prompt = None;
    }

    fn flush(&mut self, cx: &mut Context<Self>) {
        self.search_timer = None;
        self.folder_timer = None;
        if self.state.flush_due(Instant::now()) {
            self.rebuild(cx);
        }
        self.arm_timers(cx);
    }

    /// Re-render the model and sync the search field.
    fn rebuild(&mut self, cx: &mut Context<Self>) {
        self.view = render(&self.props, &self.state);
        self.entries = flatten(&self.view);

        let keys: Vec<String> = self
            .entries
            .iter()
            .enumerate()
            .map(|(ix, entry)| entry.key(ix))
            .collect();
        self.hover.retain(|key, _| keys.contains(key));

        let placeholder = self.view.search_bar.placeholder.clone();
        // Leave the field alone while the user is still typing.
        let value = self
            .state
            .search_deadline()
            .is_none()
            .then(|| self.view.search_bar.value.clone());
        self.search_input.update(cx, |input, cx| {
            input.set_placeholder(placeholder, cx);
            if let Some(value) = value {
                input.set_text(value, cx);
            }
        });
        cx.notify();
    }

    // -------------------------------------------------------------------------
    // User Input
    // -------------------------------------------------------------------------

    fn on_search_input_event(
        &mut self,
        _search_input: Entity<SearchInput>,
        event: &SearchInputEvent,
        cx: &mut Context<Self>,
    ) {
        match event {
            SearchInputEvent::Changed(text) => {
                self.state.type_search(text.clone(), Instant::now());
                self.arm_timers(cx);
            }
            SearchInputEvent::Back => self.go_back(cx),
        }
    }

    fn go_back(&mut self, cx: &mut Context<Self>) {
        if self.state.where_() == Where::Folders {
            return;
        }
        self.state.go_back(Instant::now());
        self.arm_timers(cx);
    }

    fn open_folder(&mut self, folder: String, cx: &mut Context<Self>) {
        self.state.open_folder(folder, Instant::now());
        self.arm_timers(cx);
    }

    fn set_hover(&mut self, key: &str, hovered: bool, cx: &mut Context<Self>) {
        let state = self.hover.entry(key.to_string()).or_default();
        if hovered {
            state.pointer_enter();
        } else {
            state.pointer_leave();
        }
        cx.notify();
    }

    fn emit_intent(&mut self, intent: MyStuffIntent, cx: &mut Context<Self>) {
        tracing::debug!("{} intent for '{}'", intent.name(), intent.folder());
        cx.emit(MyStuffPanelEvent::Intent(intent));
    }

    /// Open the file picker; the selection is forwarded once, then cleared.
    fn prompt_import(&mut self, cx: &mut Context<Self>) {
        if self.import_prompt.is_some() {
            return;
        }
        let task = cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let files = rfd::AsyncFileDialog::new()
                .set_title("Import items")
                .add_filter("JSON", &["json"])
                .pick_files()
                .await
                .map(|handles| {
                    handles
                        .iter()
                        .map(|handle| handle.path().to_path_buf())
                        .collect::<Vec<_>>()
                });
            let _ = this.update(cx, |this, cx| {
                this.import_prompt = None;
                if let Some(intent) = this.state.import(files) {
                    this.emit_intent(intent, cx);
                }
            });
        });
        self.import_prompt = Some(task);
    }

    // -------------------------------------------------------------------------
    // Action Handlers
    // -------------------------------------------------------------------------

    fn on_back(&mut self, _: &Back, _window: &mut Window, cx: &mut Context<Self>) {
        self.go_back(cx);
    }

    fn on_undo(&mut self, _: &Undo, _window: &mut Window, cx: &mut Context<Self>) {
        let folder = self.state.folder().unwrap_or_default().to_string();
        self.emit_intent(MyStuffIntent::Undo { folder, item: None }, cx);
    }

    fn on_focus_search(&mut self, _: &FocusSearch, window: &mut Window, cx: &mut Context<Self>) {
        self.focus_search(window, cx);
    }

    // -------------------------------------------------------------------------
    // Render Helpers
    // -------------------------------------------------------------------------

    fn render_search_bar(&self, theme: &Theme, cx: &mut Context<Self>) -> AnyElement {
        let leading = match self.view.search_bar.leading {
            Leading::Logo => div()
                .id("logo")
                .size(px(24.))
                .rounded(px(6.))
                .bg(theme.accent)
                .flex()
                .items_center()
                .justify_center()
                .text_color(theme.background)
                .font_weight(FontWeight::BOLD)
                .child("S"),
            Leading::Back => div()
                .id("back")
                .size(px(24.))
                .rounded(px(6.))
                .flex()
                .items_center()
                .justify_center()
                .cursor_pointer()
                .text_color(theme.text)
                .hover(|style| style.bg(theme.surface_hover))
                .on_click(cx.listener(|this, _: &ClickEvent, _window, cx| this.go_back(cx)))
                .child("←"),
        };

        div()
            .w_full()
            .px_3()
            .py_2()
            .flex()
            .items_center()
            .gap_2()
            .bg(theme.surface)
            .border_b_1()
            .border_color(theme.border)
            .child(leading)
            .child(self.search_input.clone())
            .into_any_element()
    }

    fn render_entry(
        &self,
        ix: usize,
        entry: &ListEntry,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let key = entry.key(ix);
        match entry {
            ListEntry::Folder { name } => {
                let folder = name.clone();
                div()
                    .id(ElementId::Name(key.into()))
                    .w_full()
                    .h(theme.item_height)
                    .px_3()
                    .flex()
                    .items_center()
                    .rounded(theme.radius)
                    .cursor_pointer()
                    .text_size(theme.font_size_large)
                    .text_color(theme.text)
                    .hover(|style| style.bg(theme.surface_hover))
                    .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                        this.open_folder(folder.clone(), cx)
                    }))
                    .child(name.clone())
                    .into_any_element()
            }
            ListEntry::FolderHeader { folder } => self.render_folder_header(folder, theme, cx),
            ListEntry::SectionHeader { title, count } => div()
                .w_full()
                .h(theme.group_header_height)
                .px_3()
                .flex()
                .items_center()
                .justify_between()
                .bg(theme.header_background)
                .text_xs()
                .font_weight(FontWeight::SEMIBOLD)
                .text_color(theme.text_muted)
                .child(title.to_uppercase())
                .child(count.to_string())
                .into_any_element(),
            ListEntry::Row(row) => self.render_row(key, row, theme, cx),
            ListEntry::Empty => div()
                .w_full()
                .h(theme.item_height * 2.)
                .flex()
                .items_center()
                .justify_center()
                .text_color(theme.text_muted)
                .child(EMPTY_PLACEHOLDER)
                .into_any_element(),
        }
    }

    fn render_folder_header(
        &self,
        folder: &str,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let add = MyStuffIntent::Add {
            folder: folder.to_string(),
        };
        let button = |id: &'static str, label: &'static str| {
            div()
                .id(id)
                .px_2()
                .py_1()
                .rounded(px(4.))
                .cursor_pointer()
                .bg(theme.action_background)
                .text_color(theme.text)
                .text_size(theme.font_size_small)
                .child(label)
        };

        div()
            .w_full()
            .h(theme.item_height)
            .px_3()
            .flex()
            .items_center()
            .justify_between()
            .child(
                div()
                    .text_size(theme.font_size_large)
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.text)
                    .child(folder.to_string()),
            )
            .child(
                div()
                    .flex()
                    .gap_2()
                    .child(button("folder-new", "New").on_click(cx.listener(
                        move |this, _: &ClickEvent, _window, cx| this.emit_intent(add.clone(), cx),
                    )))
                    .child(button("folder-import", "Import").on_click(cx.listener(
                        |this, _: &ClickEvent, _window, cx| this.prompt_import(cx),
                    ))),
            )
            .into_any_element()
    }

    fn render_row(
        &self,
        key: String,
        row: &ElementRow,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let hovered = self
            .hover
            .get(&key)
            .is_some_and(ElementState::actions_visible);
        let select = row.click(RowTarget::Row);
        let avatar = &row.avatar;

        let labels = div()
            .flex_1()
            .flex()
            .flex_col()
            .overflow_hidden()
            .child(
                div()
                    .text_color(theme.text)
                    .text_ellipsis()
                    .child(row.item.name.clone()),
            )
            .children(row.secondary().map(|kind| {
                div()
                    .text_color(theme.text_muted)
                    .text_size(theme.font_size_small)
                    .child(kind.to_string())
            }));

        div()
            .id(ElementId::Name(key.clone().into()))
            .w_full()
            .h(theme.item_height)
            .px_3()
            .flex()
            .items_center()
            .gap_3()
            .rounded(theme.radius)
            .cursor_pointer()
            .when(hovered, |this| this.bg(theme.surface_hover))
            .on_hover(cx.listener({
                let key = key.clone();
                move |this, hovered: &bool, _window, cx| this.set_hover(&key, *hovered, cx)
            }))
            .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                this.emit_intent(select.clone(), cx)
            }))
            .child(
                div()
                    .size(theme.avatar_size)
                    .flex_shrink_0()
                    .rounded_full()
                    .flex()
                    .items_center()
                    .justify_center()
                    .bg(avatar_color(avatar.background))
                    .text_color(avatar_color(avatar.foreground))
                    .text_size(theme.font_size_small)
                    .font_weight(FontWeight::SEMIBOLD)
                    .child(avatar.abbreviation.clone()),
            )
            .child(labels)
            .when(hovered, |this| {
                this.child(self.render_row_actions(&key, row, theme, cx))
            })
            .into_any_element()
    }

    /// Export, duplicate and delete buttons. Each consumes its click so the
    /// row never also selects.
    fn render_row_actions(
        &self,
        key: &str,
        row: &ElementRow,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let buttons: Vec<_> = RowAction::ALL
            .into_iter()
            .map(|action| {
                let intent = row.click(RowTarget::Action(action));
                div()
                    .id(ElementId::Name(format!("{key}-{}", action.id()).into()))
                    .px_2()
                    .py_1()
                    .rounded(px(4.))
                    .bg(theme.action_background)
                    .text_color(if action == RowAction::Delete {
                        theme.error
                    } else {
                        theme.text
                    })
                    .text_size(theme.font_size_small)
                    .hover(|style| style.bg(theme.surface_hover))
                    .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                        cx.stop_propagation();
                        this.emit_intent(intent.clone(), cx);
                    }))
                    .child(action.label())
            })
            .collect();

        div()
            .flex()
            .flex_shrink_0()
            .gap_1()
            .children(buttons)
            .with_animation(
                ElementId::Name(format!("{key}-actions").into()),
                Animation::new(ACTIONS_FADE),
                |this, delta| this.opacity(delta),
            )
            .into_any_element()
    }

    fn render_status(&self, theme: &Theme) -> Option<AnyElement> {
        let status = self.status.as_ref()?;
        Some(
            div()
                .w_full()
                .px_3()
                .py_1()
                .border_t_1()
                .border_color(theme.border)
                .text_size(theme.font_size_small)
                .text_color(if status.is_error() {
                    theme.error
                } else {
                    theme.text_muted
                })
                .child(SharedString::from(status.text().to_string()))
                .into_any_element(),
        )
    }
}

/// What to do with a cell's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPlan {
    /// Nothing pending; drop any timer.
    Clear,
    /// The armed timer already fires at the pending deadline.
    Keep,
    /// Start a timer that fires after `delay`.
    Arm { deadline: Instant, delay: Duration },
}

fn plan_timer(armed: Option<Instant>, deadline: Option<Instant>, now: Instant) -> TimerPlan {
    match deadline {
        None => TimerPlan::Clear,
        Some(deadline) if armed == Some(deadline) => TimerPlan::Keep,
        Some(deadline) => TimerPlan::Arm {
            deadline,
            delay: deadline.saturating_duration_since(now),
        },
    }
}

/// Row height of a list entry.
fn entry_height(entry: &ListEntry, theme: &Theme) -> Pixels {
    match entry {
        ListEntry::SectionHeader { .. } => theme.group_header_height,
        ListEntry::Empty => theme.item_height * 2.,
        ListEntry::Folder { .. } | ListEntry::FolderHeader { .. } | ListEntry::Row(_) => {
            theme.item_height
        }
    }
}

// =============================================================================
// Focusable
// =============================================================================

impl Focusable for MyStuffPanel {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

// =============================================================================
// EventEmitter
// =============================================================================

impl EventEmitter<MyStuffPanelEvent> for MyStuffPanel {}

// =============================================================================
// Render
// =============================================================================

impl Render for MyStuffPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();

        let item_sizes: Rc<Vec<Size<Pixels>>> = Rc::new(
            self.entries
                .iter()
                .map(|entry| size(px(0.0), entry_height(entry, &theme)))
                .collect(),
        );

        let list = v_virtual_list(
            cx.entity().clone(),
            "my-stuff-list",
            item_sizes,
            |this, range, _window, cx| {
                let theme = cx.theme().clone();
                range
                    .map(|ix| match this.entries.get(ix).cloned() {
                        Some(entry) => this.render_entry(ix, &entry, &theme, cx),
                        None => div().into_any_element(),
                    })
                    .collect::<Vec<_>>()
            },
        )
        .track_scroll(&self.scroll_handle)
        .w_full()
        .h_full();

        div()
            .id("my-stuff-panel")
            .key_context(PANEL_CONTEXT)
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(Self::on_back))
            .on_action(cx.listener(Self::on_undo))
            .on_action(cx.listener(Self::on_focus_search))
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.background)
            .font_family(theme.font_family.clone())
            .text_size(theme.font_size)
            .child(self.render_search_bar(&theme, cx))
            .child(div().w_full().flex_1().overflow_hidden().p_2().child(list))
            .children(self.render_status(&theme))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stash_core::Item;

    #[test]
    fn test_entry_heights() {
        let theme = Theme::dark();
        let row = ListEntry::Row(ElementRow::new("A", Item::new("1", "Foo", "x", 1), false));
        assert_eq!(entry_height(&row, &theme), theme.item_height);
        assert_eq!(
            entry_height(
                &ListEntry::SectionHeader {
                    title: "Latest".into(),
                    count: 1
                },
                &theme
            ),
            theme.group_header_height
        );
        assert_eq!(entry_height(&ListEntry::Empty, &theme), theme.item_height * 2.);
    }

    #[test]
    fn test_plan_timer_clears_without_deadline() {
        let now = Instant::now();
        assert_eq!(plan_timer(None, None, now), TimerPlan::Clear);
        assert_eq!(plan_timer(Some(now), None, now), TimerPlan::Clear);
    }

    #[test]
    fn test_plan_timer_keeps_matching_timer() {
        let now = Instant::now();
        let deadline = now + Duration::from_millis(750);
        assert_eq!(plan_timer(Some(deadline), Some(deadline), now), TimerPlan::Keep);
    }

    #[test]
    fn test_plan_timer_rearms_when_deadline_moves() {
        let now = Instant::now();
        let first = now + Duration::from_millis(750);
        let later = now + Duration::from_millis(950);
        assert_eq!(
            plan_timer(Some(first), Some(later), now),
            TimerPlan::Arm {
                deadline: later,
                delay: Duration::from_millis(950)
            }
        );
    }

    #[test]
    fn test_plan_timer_follows_typing_burst() {
        let options = ViewOptions::default();
        let t0 = Instant::now();
        let mut state = MyStuffState::new(&MyStuffProps::default(), options);

        state.type_search("f", t0);
        let TimerPlan::Arm { deadline: first, .. } =
            plan_timer(None, state.search_deadline(), t0)
        else {
            panic!("expected a timer for the first keystroke");
        };

        // A keystroke before the timer fires moves the deadline.
        let t1 = t0 + Duration::from_millis(200);
        state.type_search("fo", t1);
        let TimerPlan::Arm { deadline, delay } =
            plan_timer(Some(first), state.search_deadline(), t1)
        else {
            panic!("expected the timer to be replaced");
        };
        assert_eq!(delay, options.debounce);

        // The stale timer fires early and applies nothing; the new one applies the last value.
        assert!(!state.flush_due(first));
        assert_eq!(plan_timer(Some(deadline), state.search_deadline(), first), TimerPlan::Keep);
        assert!(state.flush_due(deadline));
        assert_eq!(state.search(), "fo");
        assert_eq!(plan_timer(Some(deadline), state.search_deadline(), deadline), TimerPlan::Clear);
    }

    #[test]
    fn test_plan_timer_clears_after_teardown_cancel() {
        let t0 = Instant::now();
        let mut state = MyStuffState::new(&MyStuffProps::default(), ViewOptions::default());
        state.open_folder("A", t0);
        let armed = state.folder_deadline();
        assert!(armed.is_some());

        state.cancel();
        assert_eq!(plan_timer(armed, state.folder_deadline(), t0), TimerPlan::Clear);
    }
}
