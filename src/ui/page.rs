//! Demo page: a handful of form elements the keyboard can write into
//!
//! Each element keeps its own model ([`TextField`], [`RichRegion`] or a
//! plain flag) and is drawn with an egui widget every frame. The page tracks
//! which element held egui focus last and the cursor inside it, which is
//! what the keyboard captures as its commit target.

use crate::osk::commit::{
    ElementId, ElementKind, InputNotification, InputType, PageSurface, RichRegion, TextField,
};
use chrono::Local;
use eframe::egui::text::{CCursor, CCursorRange};
use eframe::egui::text_edit::TextEditState;
use eframe::egui::{self, Id, RichText};
use std::collections::VecDeque;
use tracing::debug;

use super::common::{create_frame, UiColors};

const EVENT_LOG_LEN: usize = 8;

#[derive(Debug, Clone)]
enum ElementContent {
    Field(TextField),
    Rich(RichRegion),
    Toggle(bool),
    Action,
}

#[derive(Debug, Clone)]
struct PageElement {
    label: &'static str,
    kind: ElementKind,
    content: ElementContent,
}

impl PageElement {
    fn egui_id(id: ElementId) -> Id {
        Id::new(("page-element", id))
    }
}

#[derive(Debug)]
pub struct DemoPage {
    elements: Vec<PageElement>,
    active: Option<ElementId>,
    pending_focus: Option<ElementId>,
    events: VecDeque<String>,
}

impl Default for DemoPage {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoPage {
    pub fn new() -> Self {
        let elements = vec![
            PageElement {
                label: "Search",
                kind: ElementKind::Input(InputType::Search),
                content: ElementContent::Field(TextField::new("")),
            },
            PageElement {
                label: "Password",
                kind: ElementKind::Input(InputType::Password),
                content: ElementContent::Field(TextField::new("")),
            },
            PageElement {
                label: "Comment",
                kind: ElementKind::TextArea,
                content: ElementContent::Field(TextField::new("")),
            },
            PageElement {
                label: "Notes",
                kind: ElementKind::ContentEditable,
                content: ElementContent::Rich(RichRegion::new("")),
            },
            PageElement {
                label: "Remember me",
                kind: ElementKind::Input(InputType::Checkbox),
                content: ElementContent::Toggle(false),
            },
            PageElement {
                label: "Quantity",
                kind: ElementKind::Input(InputType::Number),
                content: ElementContent::Field(TextField::new("1")),
            },
            PageElement {
                label: "Submit",
                kind: ElementKind::Input(InputType::Button),
                content: ElementContent::Action,
            },
        ];

        Self {
            elements,
            active: None,
            pending_focus: None,
            events: VecDeque::with_capacity(EVENT_LOG_LEN),
        }
    }

    /// Latest page events, newest first
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(String::as_str)
    }

    fn log_event(&mut self, line: String) {
        if self.events.len() == EVENT_LOG_LEN {
            self.events.pop_back();
        }
        self.events.push_front(line);
    }

    /// Draws all elements; with `freeze_focus` the focus bookkeeping is kept
    /// as it was, so clicking the keyboard does not move the commit target.
    pub fn render(&mut self, ui: &mut egui::Ui, freeze_focus: bool) {
        let pending = self.pending_focus.take();
        let mut focused = None;
        let mut submitted = None;

        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ui.heading("Form");
            ui.add_space(6.0);

            for (id, element) in self.elements.iter_mut().enumerate() {
                let egui_id = PageElement::egui_id(id);
                if pending == Some(id) {
                    apply_focus(ui.ctx(), egui_id, &element.content);
                }

                ui.label(RichText::new(element.label).color(UiColors::KEY_BORDER));
                let has_focus = match &mut element.content {
                    ElementContent::Field(field) => {
                        render_field(ui, egui_id, field, element.kind)
                    }
                    ElementContent::Rich(region) => render_rich(ui, egui_id, region),
                    ElementContent::Toggle(checked) => {
                        ui.checkbox(checked, element.label).has_focus()
                    }
                    ElementContent::Action => {
                        let response = ui.button(element.label);
                        if response.clicked() {
                            submitted = Some(element.label);
                        }
                        response.has_focus()
                    }
                };
                if has_focus {
                    focused = Some(id);
                }
                ui.add_space(4.0);
            }
        });

        if let Some(label) = submitted {
            self.log_event(format!("{} click on {}", Local::now().format("%H:%M:%S%.3f"), label));
        }

        if !freeze_focus && self.active != focused {
            debug!("Page focus moved from {:?} to {:?}", self.active, focused);
            self.active = focused;
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Page events").strong());
        for line in self.events() {
            ui.monospace(line);
        }
    }
}

fn render_field(ui: &mut egui::Ui, id: Id, field: &mut TextField, kind: ElementKind) -> bool {
    let mut value = field.value().to_string();
    let edit = match kind {
        ElementKind::TextArea => egui::TextEdit::multiline(&mut value).desired_rows(3),
        ElementKind::Input(input_type) => {
            egui::TextEdit::singleline(&mut value).password(input_type == InputType::Password)
        }
        _ => egui::TextEdit::singleline(&mut value),
    };
    let output = edit.id(id).desired_width(f32::INFINITY).show(ui);

    if output.response.changed() {
        field.set_value(value);
    }
    let has_focus = output.response.has_focus();
    if has_focus {
        if let Some(range) = output.state.cursor.char_range() {
            field.set_selection(range.primary.index, range.secondary.index);
        }
    }
    has_focus
}

fn render_rich(ui: &mut egui::Ui, id: Id, region: &mut RichRegion) -> bool {
    let mut text = region.text().to_string();
    let output = egui::TextEdit::multiline(&mut text)
        .id(id)
        .desired_rows(2)
        .desired_width(f32::INFINITY)
        .background_color(UiColors::EXTREME_BG)
        .show(ui);

    if output.response.changed() {
        region.set_text(text);
    }
    let has_focus = output.response.has_focus();
    if has_focus {
        if let Some(range) = output.state.cursor.char_range() {
            region.select(range.primary.index, range.secondary.index);
        }
    }
    has_focus
}

/// Requests egui focus and moves the widget's cursor to the model's selection
fn apply_focus(ctx: &egui::Context, id: Id, content: &ElementContent) {
    let selection = match content {
        ElementContent::Field(field) => Some(field.selection()),
        ElementContent::Rich(region) => region.selection(),
        ElementContent::Toggle(_) | ElementContent::Action => None,
    };
    if let Some((start, end)) = selection {
        let mut state = TextEditState::load(ctx, id).unwrap_or_default();
        state.cursor.set_char_range(Some(CCursorRange::two(
            CCursor::new(start),
            CCursor::new(end),
        )));
        state.store(ctx, id);
    }
    ctx.memory_mut(|m| m.request_focus(id));
}

impl PageSurface for DemoPage {
    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn element_kind(&self, id: ElementId) -> Option<ElementKind> {
        self.elements.get(id).map(|e| e.kind)
    }

    fn text_field_mut(&mut self, id: ElementId) -> Option<&mut TextField> {
        match self.elements.get_mut(id).map(|e| &mut e.content) {
            Some(ElementContent::Field(field)) => Some(field),
            _ => None,
        }
    }

    fn rich_region_mut(&mut self, id: ElementId) -> Option<&mut RichRegion> {
        match self.elements.get_mut(id).map(|e| &mut e.content) {
            Some(ElementContent::Rich(region)) => Some(region),
            _ => None,
        }
    }

    fn notify(&mut self, id: ElementId, notification: InputNotification) {
        let label = self.elements.get(id).map_or("?", |e| e.label);
        let line = format!(
            "{} {:?} on {}",
            Local::now().format("%H:%M:%S%.3f"),
            notification,
            label
        );
        self.log_event(line);
    }

    fn focus(&mut self, id: ElementId) {
        self.active = Some(id);
        self.pending_focus = Some(id);
    }
}
