//! On-screen keyboard
//!
//! A modal composition surface with two states. While closed there is no
//! session at all; opening creates one and captures the page's focused
//! element as the commit target. The session is dropped on a second toggle,
//! on Escape, or after Enter commits the buffer.
//!
//! Rendering lives in `ui::osk_overlay`; everything here is plain state and
//! can be driven without a window.
//!
//! - [`layout`] - the key grid, labels and the shifted-symbol table
//! - [`buffer`] - the composition buffer
//! - [`commit`] - writing the buffer back into the page

pub mod buffer;
pub mod commit;
pub mod layout;

use self::buffer::InputBuffer;
use self::commit::{CommitStatus, CommitTarget, PageSurface};
use self::layout::{resolve_char, GridCursor, KeyGrid, NavDirection, OskKey};
use tracing::{debug, info, warn};

/// Keyboard-style input while the keyboard is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OskInput {
    Navigate(NavDirection),
    /// Enter or Space: activates the selected cell
    Activate,
    /// Escape
    Close,
}

/// What a single operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OskOutcome {
    /// Nothing to do, e.g. input while closed
    Ignored,
    Opened,
    /// Closed without committing
    Closed,
    /// Enter: buffer written or discarded, keyboard closed
    Committed(CommitStatus),
    /// Session state changed, keyboard stays open
    Updated,
    /// Exit was activated; the host should terminate
    ExitRequested,
}

/// State of one open keyboard
#[derive(Debug, Clone)]
pub struct OskSession {
    buffer: InputBuffer,
    shift: bool,
    caps: bool,
    cursor: GridCursor,
    target: CommitTarget,
}

impl OskSession {
    fn new(target: CommitTarget) -> Self {
        Self {
            buffer: InputBuffer::new(),
            shift: false,
            caps: false,
            cursor: GridCursor::default(),
            target,
        }
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn shift(&self) -> bool {
        self.shift
    }

    pub fn caps(&self) -> bool {
        self.caps
    }

    pub fn cursor(&self) -> GridCursor {
        self.cursor
    }

    pub fn target(&self) -> CommitTarget {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct OnScreenKeyboard {
    grid: KeyGrid,
    allow_exit: bool,
    session: Option<OskSession>,
}

impl OnScreenKeyboard {
    /// QWERTY keyboard; the Exit cell only exists when `allow_exit` is set
    pub fn new(allow_exit: bool) -> Self {
        Self::with_grid(KeyGrid::qwerty(allow_exit), allow_exit)
    }

    pub fn with_grid(grid: KeyGrid, allow_exit: bool) -> Self {
        Self {
            grid,
            allow_exit,
            session: None,
        }
    }

    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&OskSession> {
        self.session.as_ref()
    }

    /// Label of a cell under the current modifier state
    pub fn label(&self, key: OskKey) -> String {
        match &self.session {
            Some(session) => key.display_label(session.shift, session.caps),
            None => key.display_label(false, false),
        }
    }

    /// Opens the keyboard, or closes it without committing if already open
    pub fn toggle<P: PageSurface + ?Sized>(&mut self, page: &mut P) -> OskOutcome {
        if self.is_open() {
            self.close(page)
        } else {
            self.open(page)
        }
    }

    pub fn open<P: PageSurface + ?Sized>(&mut self, page: &P) -> OskOutcome {
        if self.is_open() {
            return OskOutcome::Ignored;
        }
        let target = CommitTarget::capture(page);
        info!("Opening on-screen keyboard, commit target: {}", target);
        self.session = Some(OskSession::new(target));
        OskOutcome::Opened
    }

    /// Drops the session and hands focus back to the captured element
    pub fn close<P: PageSurface + ?Sized>(&mut self, page: &mut P) -> OskOutcome {
        match self.session.take() {
            Some(session) => {
                info!("Closing on-screen keyboard");
                session.target.restore_focus(page);
                OskOutcome::Closed
            }
            None => OskOutcome::Ignored,
        }
    }

    pub fn navigate(&mut self, direction: NavDirection) -> OskOutcome {
        match self.session.as_mut() {
            Some(session) => {
                session.cursor.step(direction, &self.grid);
                debug!("OSK cursor at {:?}", session.cursor);
                OskOutcome::Updated
            }
            None => OskOutcome::Ignored,
        }
    }

    pub fn handle_input<P: PageSurface + ?Sized>(
        &mut self,
        input: OskInput,
        page: &mut P,
    ) -> OskOutcome {
        match input {
            OskInput::Navigate(direction) => self.navigate(direction),
            OskInput::Activate => self.activate_selected(page),
            OskInput::Close => self.close(page),
        }
    }

    /// Activates the cell under the navigation cursor
    pub fn activate_selected<P: PageSurface + ?Sized>(&mut self, page: &mut P) -> OskOutcome {
        let Some(cursor) = self.session.as_ref().map(OskSession::cursor) else {
            return OskOutcome::Ignored;
        };
        match self.grid.get(cursor.row, cursor.col) {
            Some(key) => self.activate(key, page),
            None => OskOutcome::Ignored,
        }
    }

    /// Pointer activation: moves the cursor to the cell, then activates it
    pub fn activate_cell<P: PageSurface + ?Sized>(
        &mut self,
        row: usize,
        col: usize,
        page: &mut P,
    ) -> OskOutcome {
        let Some(key) = self.grid.get(row, col) else {
            return OskOutcome::Ignored;
        };
        match self.session.as_mut() {
            Some(session) => session.cursor = GridCursor { row, col },
            None => return OskOutcome::Ignored,
        }
        self.activate(key, page)
    }

    fn activate<P: PageSurface + ?Sized>(&mut self, key: OskKey, page: &mut P) -> OskOutcome {
        let Some(session) = self.session.as_mut() else {
            return OskOutcome::Ignored;
        };
        debug!("OSK key activated: {}", key);

        match key {
            OskKey::Char(c) => {
                let typed = resolve_char(c, session.shift, session.caps);
                session.buffer.insert_char(typed);
                session.shift = false;
            }
            OskKey::Backspace => {
                session.buffer.backspace();
            }
            OskKey::Space => session.buffer.insert_char(' '),
            OskKey::Shift => session.shift = !session.shift,
            OskKey::Caps => session.caps = !session.caps,
            OskKey::Enter => return self.commit(page),
            OskKey::Exit => {
                if !self.allow_exit {
                    warn!("Exit activated without the exit capability, ignoring");
                    return OskOutcome::Ignored;
                }
                info!("Exit requested from on-screen keyboard");
                return OskOutcome::ExitRequested;
            }
        }
        OskOutcome::Updated
    }

    fn commit<P: PageSurface + ?Sized>(&mut self, page: &mut P) -> OskOutcome {
        let Some(mut session) = self.session.take() else {
            return OskOutcome::Ignored;
        };
        let text = session.buffer.take();
        let status = session.target.commit(page, &text);
        session.target.restore_focus(page);
        OskOutcome::Committed(status)
    }
}
