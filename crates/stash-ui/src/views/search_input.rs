//! Single-line search field with IME support.
//!
//! Editing state lives in [`EditBuffer`], which knows nothing about GPUI and
//! is tested on its own. [`SearchInput`] wires it to actions, the platform
//! input handler and painting.

use std::ops::Range;

use gpui::{
    div, fill, point, prelude::*, px, relative, size, App, Bounds, Context, CursorStyle, Element,
    ElementId, ElementInputHandler, Entity, EntityInputHandler, EventEmitter, FocusHandle,
    Focusable, GlobalElementId, IntoElement, LayoutId, PaintQuad, Pixels, Point, Render,
    ShapedLine, SharedString, Style, TextRun, UTF16Selection, UnderlineStyle, Window,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::actions::{Backspace, Delete, End, Home, MoveLeft, MoveRight, Paste, TextSelectAll};
use crate::theme::ThemeExt;

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SearchInputEvent {
    /// Text content changed.
    Changed(String),
    /// Backspace on an empty field.
    Back,
}

// =============================================================================
// EditBuffer
// =============================================================================

/// Text plus selection and IME composition.
///
/// All ranges are UTF-8 byte offsets. UTF-16 conversions exist for the
/// platform input APIs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditBuffer {
    text: String,
    selected: Range<usize>,
    marked: Option<Range<usize>>,
}

impl EditBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected(&self) -> Range<usize> {
        self.selected.clone()
    }

    pub fn marked(&self) -> Option<Range<usize>> {
        self.marked.clone()
    }

    /// Replace everything and put the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selected = self.text.len()..self.text.len();
        self.marked = None;
    }

    pub fn select_all(&mut self) {
        self.selected = 0..self.text.len();
    }

    pub fn move_to(&mut self, offset: usize) {
        let offset = offset.min(self.text.len());
        self.selected = offset..offset;
    }

    pub fn move_left(&mut self) {
        let target = if self.selected.is_empty() {
            self.previous_boundary(self.selected.start)
        } else {
            self.selected.start
        };
        self.move_to(target);
    }

    pub fn move_right(&mut self) {
        let target = if self.selected.is_empty() {
            self.next_boundary(self.selected.end)
        } else {
            self.selected.end
        };
        self.move_to(target);
    }

    /// Delete the selection or the grapheme before the cursor.
    pub fn backspace(&mut self) {
        if self.selected.is_empty() {
            self.selected = self.previous_boundary(self.selected.start)..self.selected.end;
        }
        self.replace(None, "");
    }

    /// Delete the selection or the grapheme after the cursor.
    pub fn delete(&mut self) {
        if self.selected.is_empty() {
            self.selected = self.selected.start..self.next_boundary(self.selected.end);
        }
        self.replace(None, "");
    }

    /// Replace `range` (or the composition, or the selection) with `new_text`.
    pub fn replace(&mut self, range: Option<Range<usize>>, new_text: &str) {
        let range = self.target_range(range);
        self.text.replace_range(range.clone(), new_text);
        let cursor = range.start + new_text.len();
        self.selected = cursor..cursor;
        self.marked = None;
    }

    /// Replace and mark the inserted text as an IME composition.
    pub fn replace_and_mark(
        &mut self,
        range: Option<Range<usize>>,
        new_text: &str,
        selected_within: Option<Range<usize>>,
    ) {
        let range = self.target_range(range);
        self.text.replace_range(range.clone(), new_text);
        self.marked = (!new_text.is_empty()).then(|| range.start..range.start + new_text.len());
        self.selected = match selected_within {
            Some(r) => range.start + r.start..range.start + r.end,
            None => {
                let cursor = range.start + new_text.len();
                cursor..cursor
            }
        };
    }

    pub fn unmark(&mut self) {
        self.marked = None;
    }

    fn target_range(&self, range: Option<Range<usize>>) -> Range<usize> {
        range
            .or_else(|| self.marked.clone())
            .unwrap_or_else(|| self.selected.clone())
    }

    fn previous_boundary(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .rev()
            .find_map(|(idx, _)| (idx < offset).then_some(idx))
            .unwrap_or(0)
    }

    fn next_boundary(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .find_map(|(idx, _)| (idx > offset).then_some(idx))
            .unwrap_or(self.text.len())
    }

    // -------------------------------------------------------------------------
    // UTF-16 Conversion
    // -------------------------------------------------------------------------

    pub fn offset_to_utf16(&self, offset: usize) -> usize {
        self.text[..offset].encode_utf16().count()
    }

    pub fn offset_from_utf16(&self, utf16_offset: usize) -> usize {
        let mut utf8 = 0;
        let mut utf16 = 0;
        for ch in self.text.chars() {
            if utf16 >= utf16_offset {
                break;
            }
            utf16 += ch.len_utf16();
            utf8 += ch.len_utf8();
        }
        utf8
    }

    pub fn range_to_utf16(&self, range: &Range<usize>) -> Range<usize> {
        self.offset_to_utf16(range.start)..self.offset_to_utf16(range.end)
    }

    pub fn range_from_utf16(&self, range: &Range<usize>) -> Range<usize> {
        self.offset_from_utf16(range.start)..self.offset_from_utf16(range.end)
    }
}

// =============================================================================
// SearchInput
// =============================================================================

pub struct SearchInput {
    buffer: EditBuffer,
    placeholder: SharedString,
    focus_handle: FocusHandle,
    /// Shaped text from the last paint, for IME bounds queries.
    last_layout: Option<ShapedLine>,
    last_bounds: Option<Bounds<Pixels>>,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<SharedString>, cx: &mut Context<Self>) -> Self {
        Self {
            buffer: EditBuffer::default(),
            placeholder: placeholder.into(),
            focus_handle: cx.focus_handle(),
            last_layout: None,
            last_bounds: None,
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Set the text without emitting `Changed`.
    pub fn set_text(&mut self, text: impl Into<String>, cx: &mut Context<Self>) {
        let text = text.into();
        if text != self.buffer.text() {
            self.buffer.set_text(text);
            cx.notify();
        }
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<SharedString>, cx: &mut Context<Self>) {
        let placeholder = placeholder.into();
        if placeholder != self.placeholder {
            self.placeholder = placeholder;
            cx.notify();
        }
    }

    fn edited(&mut self, cx: &mut Context<Self>) {
        cx.emit(SearchInputEvent::Changed(self.buffer.text().to_string()));
        cx.notify();
    }

    // -------------------------------------------------------------------------
    // Action Handlers
    // -------------------------------------------------------------------------

    fn backspace(&mut self, _: &Backspace, _window: &mut Window, cx: &mut Context<Self>) {
        if self.buffer.text().is_empty() {
            cx.emit(SearchInputEvent::Back);
            return;
        }
        self.buffer.backspace();
        self.edited(cx);
    }

    fn delete(&mut self, _: &Delete, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.delete();
        self.edited(cx);
    }

    fn left(&mut self, _: &MoveLeft, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.move_left();
        cx.notify();
    }

    fn right(&mut self, _: &MoveRight, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.move_right();
        cx.notify();
    }

    fn select_all(&mut self, _: &TextSelectAll, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.select_all();
        cx.notify();
    }

    fn home(&mut self, _: &Home, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.move_to(0);
        cx.notify();
    }

    fn end(&mut self, _: &End, _window: &mut Window, cx: &mut Context<Self>) {
        self.buffer.move_to(self.buffer.text().len());
        cx.notify();
    }

    fn paste(&mut self, _: &Paste, _window: &mut Window, cx: &mut Context<Self>) {
        if let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) {
            self.buffer.replace(None, &text.replace('\n', " "));
            self.edited(cx);
        }
    }
}

impl EventEmitter<SearchInputEvent> for SearchInput {}

impl Focusable for SearchInput {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

// =============================================================================
// EntityInputHandler Implementation (IME Support)
// =============================================================================

impl EntityInputHandler for SearchInput {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        actual_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let range = self.buffer.range_from_utf16(&range_utf16);
        actual_range.replace(self.buffer.range_to_utf16(&range));
        self.buffer.text().get(range).map(str::to_string)
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        Some(UTF16Selection {
            range: self.buffer.range_to_utf16(&self.buffer.selected()),
            reversed: false,
        })
    }

    fn marked_text_range(
        &self,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Range<usize>> {
        self.buffer
            .marked()
            .map(|r| self.buffer.range_to_utf16(&r))
    }

    fn unmark_text(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {
        self.buffer.unmark();
    }

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let range = range_utf16.map(|r| self.buffer.range_from_utf16(&r));
        self.buffer.replace(range, new_text);
        self.edited(cx);
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        new_selected_range_utf16: Option<Range<usize>>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let range = range_utf16.map(|r| self.buffer.range_from_utf16(&r));
        // The selection is relative to the inserted text.
        let selected = new_selected_range_utf16.map(|r| {
            let mut composed = EditBuffer::default();
            composed.set_text(new_text);
            composed.range_from_utf16(&r)
        });
        self.buffer.replace_and_mark(range, new_text, selected);
        self.edited(cx);
    }

    fn bounds_for_range(
        &mut self,
        range_utf16: Range<usize>,
        element_bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        let layout = self.last_layout.as_ref()?;
        let range = self.buffer.range_from_utf16(&range_utf16);
        Some(Bounds::from_corners(
            point(
                element_bounds.left() + layout.x_for_index(range.start),
                element_bounds.top(),
            ),
            point(
                element_bounds.left() + layout.x_for_index(range.end),
                element_bounds.bottom(),
            ),
        ))
    }

    fn character_index_for_point(
        &mut self,
        point: Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        let bounds = self.last_bounds.as_ref()?;
        let layout = self.last_layout.as_ref()?;
        let local = bounds.localize(&point)?;
        let index = layout.index_for_x(local.x)?;
        Some(self.buffer.offset_to_utf16(index))
    }
}

// =============================================================================
// Render Implementation
// =============================================================================

impl Render for SearchInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .id("search-input")
            .key_context("SearchInput")
            .track_focus(&self.focus_handle)
            .cursor(CursorStyle::IBeam)
            .on_action(cx.listener(Self::backspace))
            .on_action(cx.listener(Self::delete))
            .on_action(cx.listener(Self::left))
            .on_action(cx.listener(Self::right))
            .on_action(cx.listener(Self::select_all))
            .on_action(cx.listener(Self::home))
            .on_action(cx.listener(Self::end))
            .on_action(cx.listener(Self::paste))
            .flex_1()
            .child(TextInputElement {
                input: cx.entity().clone(),
            })
    }
}

// =============================================================================
// Text Element
// =============================================================================

/// Paints text, cursor and selection, and registers the input handler.
struct TextInputElement {
    input: Entity<SearchInput>,
}

struct TextInputPrepaintState {
    line: Option<ShapedLine>,
    cursor: Option<PaintQuad>,
    selection: Option<PaintQuad>,
}

impl IntoElement for TextInputElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for TextInputElement {
    type RequestLayoutState = ();
    type PrepaintState = TextInputPrepaintState;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let mut style = Style::default();
        style.size.width = relative(1.).into();
        style.size.height = window.line_height().into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        let input = self.input.read(cx);
        let theme = cx.theme();
        let buffer = &input.buffer;
        let is_empty = buffer.text().is_empty();
        let is_focused = input.focus_handle.is_focused(window);
        let style = window.text_style();

        let (display_text, color) = if is_empty {
            (input.placeholder.clone(), theme.text_placeholder)
        } else {
            (SharedString::from(buffer.text().to_string()), theme.text)
        };

        let base_run = TextRun {
            len: display_text.len(),
            font: style.font(),
            color,
            background_color: None,
            underline: None,
            strikethrough: None,
        };

        // Underline the IME composition.
        let runs = match buffer.marked().filter(|_| !is_empty) {
            Some(marked) => [
                TextRun {
                    len: marked.start,
                    ..base_run.clone()
                },
                TextRun {
                    len: marked.end - marked.start,
                    underline: Some(UnderlineStyle {
                        color: Some(color),
                        thickness: px(1.0),
                        wavy: false,
                    }),
                    ..base_run.clone()
                },
                TextRun {
                    len: display_text.len().saturating_sub(marked.end),
                    ..base_run
                },
            ]
            .into_iter()
            .filter(|run| run.len > 0)
            .collect(),
            None => vec![base_run],
        };

        let font_size = style.font_size.to_pixels(window.rem_size());
        let line = window
            .text_system()
            .shape_line(display_text, font_size, &runs, None);

        let selected = buffer.selected();
        let caret = |x: Pixels| {
            fill(
                Bounds::new(point(bounds.left() + x, bounds.top()), size(px(2.), bounds.size.height)),
                theme.accent,
            )
        };
        let (selection, cursor) = if is_empty {
            (None, is_focused.then(|| caret(px(0.))))
        } else if selected.is_empty() {
            (None, is_focused.then(|| caret(line.x_for_index(selected.end))))
        } else {
            let quad = fill(
                Bounds::from_corners(
                    point(bounds.left() + line.x_for_index(selected.start), bounds.top()),
                    point(bounds.left() + line.x_for_index(selected.end), bounds.bottom()),
                ),
                theme.action_background,
            );
            (Some(quad), None)
        };

        TextInputPrepaintState {
            line: Some(line),
            cursor,
            selection,
        }
    }

    fn paint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let focus_handle = self.input.read(cx).focus_handle.clone();
        window.handle_input(
            &focus_handle,
            ElementInputHandler::new(bounds, self.input.clone()),
            cx,
        );

        if let Some(selection) = prepaint.selection.take() {
            window.paint_quad(selection);
        }

        if let Some(line) = prepaint.line.take() {
            let _ = line.paint(bounds.origin, window.line_height(), window, cx);
            self.input.update(cx, |input, _cx| {
                input.last_layout = Some(line);
                input.last_bounds = Some(bounds);
            });
        }

        if let Some(cursor) = prepaint.cursor.take() {
            window.paint_quad(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> EditBuffer {
        let mut buffer = EditBuffer::default();
        buffer.set_text(text);
        buffer
    }

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let mut b = buffer("cafe\u{301}");
        b.backspace();
        assert_eq!(b.text(), "caf");
    }

    #[test]
    fn test_backspace_removes_selection() {
        let mut b = buffer("hello");
        b.select_all();
        b.backspace();
        assert_eq!(b.text(), "");
        assert_eq!(b.selected(), 0..0);
    }

    #[test]
    fn test_move_and_delete() {
        let mut b = buffer("abc");
        b.move_to(0);
        b.delete();
        assert_eq!(b.text(), "bc");
        b.move_right();
        assert_eq!(b.selected(), 1..1);
        b.move_left();
        assert_eq!(b.selected(), 0..0);
    }

    #[test]
    fn test_replace_inserts_at_cursor() {
        let mut b = buffer("ac");
        b.move_to(1);
        b.replace(None, "b");
        assert_eq!(b.text(), "abc");
        assert_eq!(b.selected(), 2..2);
    }

    #[test]
    fn test_composition_is_replaced_on_commit() {
        let mut b = buffer("x");
        b.replace_and_mark(None, "ni", None);
        assert_eq!(b.marked(), Some(1..3));
        b.replace(None, "你");
        assert_eq!(b.text(), "x你");
        assert_eq!(b.marked(), None);
    }

    #[test]
    fn test_utf16_conversion() {
        let b = buffer("a😀b");
        assert_eq!(b.offset_to_utf16(5), 3);
        assert_eq!(b.offset_from_utf16(3), 5);
        assert_eq!(b.range_from_utf16(&(1..3)), 1..5);
    }
}
