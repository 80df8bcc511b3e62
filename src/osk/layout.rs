//! Declarative key grid of the on-screen keyboard
//!
//! The grid is plain data, separate from whatever draws it. Rows may differ in
//! length; navigation clamps against the row it lands on.

use std::fmt;

/// One cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OskKey {
    /// Letter, digit or symbol; stored unshifted
    Char(char),
    Backspace,
    Space,
    Enter,
    Shift,
    Caps,
    /// Terminates the host application, only present when granted
    Exit,
}

impl OskKey {
    /// Text shown on the cell for the given modifier state
    ///
    /// Mirrors what a press would type: letters follow `shift XOR caps`,
    /// symbols show their shifted form while either modifier is active.
    pub fn display_label(&self, shift: bool, caps: bool) -> String {
        match self {
            OskKey::Char(c) => resolve_char(*c, shift, caps).to_string(),
            OskKey::Backspace => "Backspace".to_string(),
            OskKey::Space => "Space".to_string(),
            OskKey::Enter => "Enter".to_string(),
            OskKey::Shift => "Shift".to_string(),
            OskKey::Caps => "Caps".to_string(),
            OskKey::Exit => "Exit".to_string(),
        }
    }
}

impl fmt::Display for OskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_label(false, false))
    }
}

/// US QWERTY shifted symbol table
pub fn shifted_symbol(c: char) -> Option<char> {
    let shifted = match c {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        _ => return None,
    };
    Some(shifted)
}

/// Character a key produces under the given modifier state
pub fn resolve_char(c: char, shift: bool, caps: bool) -> char {
    if c.is_ascii_lowercase() {
        if shift ^ caps {
            c.to_ascii_uppercase()
        } else {
            c
        }
    } else if shift || caps {
        shifted_symbol(c).unwrap_or(c)
    } else {
        c
    }
}

/// Rows of key cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGrid {
    rows: Vec<Vec<OskKey>>,
}

impl KeyGrid {
    /// Builds a grid from rows; empty rows are dropped
    pub fn new(rows: Vec<Vec<OskKey>>) -> Self {
        Self {
            rows: rows.into_iter().filter(|row| !row.is_empty()).collect(),
        }
    }

    /// The standard US QWERTY layout
    pub fn qwerty(with_exit: bool) -> Self {
        let chars = |s: &str| s.chars().map(OskKey::Char).collect::<Vec<_>>();

        let mut numbers = chars("1234567890-=");
        numbers.push(OskKey::Backspace);

        let top = chars("qwertyuiop[]\\");

        let mut home = vec![OskKey::Caps];
        home.extend(chars("asdfghjkl;'"));
        home.push(OskKey::Enter);

        let mut bottom = vec![OskKey::Shift];
        bottom.extend(chars("zxcvbnm,./"));
        bottom.push(OskKey::Shift);

        let mut last = vec![OskKey::Space];
        if with_exit {
            last.push(OskKey::Exit);
        }

        Self::new(vec![numbers, top, home, bottom, last])
    }

    pub fn rows(&self) -> &[Vec<OskKey>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<OskKey> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Direction of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Selected cell; always inside the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCursor {
    pub row: usize,
    pub col: usize,
}

impl GridCursor {
    /// Moves one step. Rows stop at the edges and reclamp the column,
    /// columns wrap around within the row.
    pub fn step(&mut self, direction: NavDirection, grid: &KeyGrid) {
        if grid.row_count() == 0 {
            return;
        }

        match direction {
            NavDirection::Up => {
                if self.row > 0 {
                    self.row -= 1;
                    self.clamp_col(grid);
                }
            }
            NavDirection::Down => {
                if self.row + 1 < grid.row_count() {
                    self.row += 1;
                    self.clamp_col(grid);
                }
            }
            NavDirection::Left => {
                let len = grid.row_len(self.row);
                self.col = if self.col == 0 { len - 1 } else { self.col - 1 };
            }
            NavDirection::Right => {
                let len = grid.row_len(self.row);
                self.col = if self.col + 1 >= len { 0 } else { self.col + 1 };
            }
        }
    }

    fn clamp_col(&mut self, grid: &KeyGrid) {
        let last = grid.row_len(self.row).saturating_sub(1);
        if self.col > last {
            self.col = last;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qwerty_shape() {
        let grid = KeyGrid::qwerty(true);

        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.row_len(0), 13);
        assert_eq!(grid.row_len(3), 12);
        assert_eq!(grid.get(0, 12), Some(OskKey::Backspace));
        assert_eq!(grid.get(2, 12), Some(OskKey::Enter));
        assert_eq!(grid.get(4, 1), Some(OskKey::Exit));
        assert_eq!(grid.get(5, 0), None);

        assert_eq!(KeyGrid::qwerty(false).row_len(4), 1);
    }

    #[test]
    fn test_resolve_char() {
        assert_eq!(resolve_char('h', true, false), 'H');
        assert_eq!(resolve_char('h', false, true), 'H');
        assert_eq!(resolve_char('h', true, true), 'h');
        assert_eq!(resolve_char('2', true, false), '@');
        assert_eq!(resolve_char('/', false, true), '?');
        assert_eq!(resolve_char('2', false, false), '2');
    }

    #[test]
    fn test_column_wraps() {
        let grid = KeyGrid::qwerty(true);
        let mut cursor = GridCursor::default();

        cursor.step(NavDirection::Left, &grid);
        assert_eq!(cursor, GridCursor { row: 0, col: 12 });

        cursor.step(NavDirection::Right, &grid);
        assert_eq!(cursor, GridCursor { row: 0, col: 0 });
    }

    #[test]
    fn test_rows_stop_at_edges_and_reclamp() {
        let grid = KeyGrid::qwerty(true);
        let mut cursor = GridCursor { row: 0, col: 12 };

        cursor.step(NavDirection::Up, &grid);
        assert_eq!(cursor, GridCursor { row: 0, col: 12 });

        cursor.step(NavDirection::Down, &grid);
        cursor.step(NavDirection::Down, &grid);
        cursor.step(NavDirection::Down, &grid);
        assert_eq!(cursor, GridCursor { row: 3, col: 11 });

        cursor.step(NavDirection::Down, &grid);
        assert_eq!(cursor, GridCursor { row: 4, col: 1 });

        cursor.step(NavDirection::Down, &grid);
        assert_eq!(cursor.row, 4);

        // the clamped column is kept when moving back up
        cursor.step(NavDirection::Up, &grid);
        assert_eq!(cursor, GridCursor { row: 3, col: 1 });
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let grid = KeyGrid::qwerty(false);
        let mut cursor = GridCursor::default();
        let moves = [
            NavDirection::Down,
            NavDirection::Left,
            NavDirection::Down,
            NavDirection::Down,
            NavDirection::Down,
            NavDirection::Right,
            NavDirection::Right,
            NavDirection::Up,
            NavDirection::Left,
            NavDirection::Left,
        ];

        for direction in moves {
            cursor.step(direction, &grid);
            assert!(grid.get(cursor.row, cursor.col).is_some());
        }
    }
}
