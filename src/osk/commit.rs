//! Writing composed text into the page
//!
//! The element that held focus when the keyboard opened is classified once,
//! at capture time, into a [`CommitTarget`]. Commit then only has to check
//! that the element still exists and still has the same kind.

use crate::osk::buffer::byte_offset;
use std::fmt;
use tracing::{debug, info, warn};

/// Page-assigned identity of an element
pub type ElementId = usize;

/// `type` attribute of a single-line input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Password,
    Email,
    Search,
    Tel,
    Url,
    Number,
    Checkbox,
    Button,
}

impl InputType {
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            InputType::Text
                | InputType::Password
                | InputType::Email
                | InputType::Search
                | InputType::Tel
                | InputType::Url
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Input(InputType),
    TextArea,
    ContentEditable,
}

impl ElementKind {
    fn is_plain_text(&self) -> bool {
        match self {
            ElementKind::Input(input_type) => input_type.accepts_text(),
            ElementKind::TextArea => true,
            _ => false,
        }
    }
}

/// Notifications synthesized after a plain text commit, in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputNotification {
    Input,
    Change,
    KeyUp,
}

pub const COMMIT_NOTIFICATIONS: [InputNotification; 3] = [
    InputNotification::Input,
    InputNotification::Change,
    InputNotification::KeyUp,
];

/// Value and selection of an input or text area; offsets count characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    selection_start: usize,
    selection_end: usize,
}

impl TextField {
    /// New field with the cursor at the end
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let end = value.chars().count();
        Self {
            value,
            selection_start: end,
            selection_end: end,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Sets the selection, clamped to the value and ordered
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.value.chars().count();
        let (start, end) = (start.min(len), end.min(len));
        self.selection_start = start.min(end);
        self.selection_end = start.max(end);
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        let (start, end) = self.selection();
        self.set_selection(start, end);
    }

    /// Replaces the selection with `text` and puts the cursor behind it
    pub fn splice(&mut self, text: &str) {
        let (start, end) = self.selection();
        let from = byte_offset(&self.value, start);
        let to = byte_offset(&self.value, end);
        self.value.replace_range(from..to, text);

        let cursor = start + text.chars().count();
        self.selection_start = cursor;
        self.selection_end = cursor;
    }
}

/// Content of a content-editable region
///
/// `selection` is `None` when the region holds no caret at all; a caret is an
/// empty range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichRegion {
    text: String,
    selection: Option<(usize, usize)>,
}

impl RichRegion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if let Some((start, end)) = self.selection {
            self.select(start, end);
        }
    }

    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.text.chars().count();
        let (start, end) = (start.min(len), end.min(len));
        self.selection = Some((start.min(end), start.max(end)));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Deletes the selection and inserts at the caret, collapsing behind the
    /// inserted text. Without a selection the text is appended.
    pub fn insert(&mut self, text: &str) {
        match self.selection {
            Some((start, end)) => {
                let from = byte_offset(&self.text, start);
                let to = byte_offset(&self.text, end);
                self.text.replace_range(from..to, text);
                let caret = start + text.chars().count();
                self.selection = Some((caret, caret));
            }
            None => self.text.push_str(text),
        }
    }
}

/// The page the keyboard writes into
pub trait PageSurface {
    /// Element currently holding input focus
    fn active_element(&self) -> Option<ElementId>;

    /// Kind of an element; `None` once it is detached
    fn element_kind(&self, id: ElementId) -> Option<ElementKind>;

    fn text_field_mut(&mut self, id: ElementId) -> Option<&mut TextField>;

    fn rich_region_mut(&mut self, id: ElementId) -> Option<&mut RichRegion>;

    fn notify(&mut self, id: ElementId, notification: InputNotification);

    fn focus(&mut self, id: ElementId);
}

/// Where a commit goes, decided when the keyboard opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTarget {
    PlainText(ElementId),
    RichEditable(ElementId),
    None,
}

impl fmt::Display for CommitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitTarget::PlainText(id) => write!(f, "plain text #{}", id),
            CommitTarget::RichEditable(id) => write!(f, "rich editable #{}", id),
            CommitTarget::None => write!(f, "none"),
        }
    }
}

/// Result of a commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Written,
    Discarded,
}

impl CommitTarget {
    pub fn capture<P: PageSurface + ?Sized>(page: &P) -> Self {
        let Some(id) = page.active_element() else {
            return CommitTarget::None;
        };
        Self::classify(id, page.element_kind(id))
    }

    fn classify(id: ElementId, kind: Option<ElementKind>) -> Self {
        match kind {
            Some(kind) if kind.is_plain_text() => CommitTarget::PlainText(id),
            Some(ElementKind::ContentEditable) => CommitTarget::RichEditable(id),
            _ => CommitTarget::None,
        }
    }

    pub fn id(&self) -> Option<ElementId> {
        match self {
            CommitTarget::PlainText(id) | CommitTarget::RichEditable(id) => Some(*id),
            CommitTarget::None => None,
        }
    }

    /// The element still exists and still accepts the same kind of text
    pub fn is_valid<P: PageSurface + ?Sized>(&self, page: &P) -> bool {
        match self.id() {
            Some(id) => Self::classify(id, page.element_kind(id)) == *self,
            None => false,
        }
    }

    /// Writes `text` into the target; invalid targets discard it
    pub fn commit<P: PageSurface + ?Sized>(&self, page: &mut P, text: &str) -> CommitStatus {
        if !self.is_valid(page) {
            warn!("No valid input element to commit into ({}), discarding", self);
            return CommitStatus::Discarded;
        }

        let status = match *self {
            CommitTarget::PlainText(id) => match page.text_field_mut(id) {
                Some(field) => {
                    field.splice(text);
                    for notification in COMMIT_NOTIFICATIONS {
                        page.notify(id, notification);
                    }
                    CommitStatus::Written
                }
                None => CommitStatus::Discarded,
            },
            CommitTarget::RichEditable(id) => match page.rich_region_mut(id) {
                Some(region) => {
                    region.insert(text);
                    CommitStatus::Written
                }
                None => CommitStatus::Discarded,
            },
            CommitTarget::None => CommitStatus::Discarded,
        };

        match status {
            CommitStatus::Written => info!("Committed {} char(s) into {}", text.chars().count(), self),
            CommitStatus::Discarded => warn!("Target {} refused the commit, discarding", self),
        }
        status
    }

    /// Gives focus back to the target if it can still take text
    pub fn restore_focus<P: PageSurface + ?Sized>(&self, page: &mut P) -> bool {
        match self.id() {
            Some(id) if self.is_valid(page) => {
                debug!("Restoring focus to {}", self);
                page.focus(id);
                true
            }
            _ => false,
        }
    }
}
