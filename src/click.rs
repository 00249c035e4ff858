//! Tap targets for the browser front end.
//!
//! Rendering registers which terminal row triggers which [`Command`]; the
//! mouse handler converts a pixel position back to a row and looks it up.
//! Nothing here touches the DOM, so it is unit tested natively.

use crate::ui::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTarget {
    pub row: u16,
    pub command: Command,
}

#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame at the given terminal size.
    pub fn reset_frame(&mut self, cols: u16, rows: u16) {
        self.terminal_cols = cols;
        self.terminal_rows = rows;
        self.targets.clear();
    }

    pub fn add_target(&mut self, row: u16, command: Command) {
        self.targets.push(ClickTarget { row, command });
    }

    /// First command registered on `row`.
    pub fn command_at(&self, row: u16) -> Option<Command> {
        self.targets
            .iter()
            .find(|t| t.row == row)
            .map(|t| t.command)
    }
}

/// Map a Y offset inside the grid (pixels) to a terminal row.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if !(grid_height > 0.0) || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let row = (click_y / (grid_height / terminal_rows as f64)) as u16;
    (row < terminal_rows).then_some(row)
}

pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_pixels() {
        // 20 rows in 300px: 15px per row
        assert_eq!(pixel_y_to_row(0.0, 300.0, 20), Some(0));
        assert_eq!(pixel_y_to_row(14.9, 300.0, 20), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 300.0, 20), Some(1));
        assert_eq!(pixel_y_to_row(299.0, 300.0, 20), Some(19));
    }

    #[test]
    fn pixels_outside_grid() {
        assert_eq!(pixel_y_to_row(300.0, 300.0, 20), None);
        assert_eq!(pixel_y_to_row(-2.0, 300.0, 20), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 20), None);
        assert_eq!(pixel_y_to_row(10.0, f64::NAN, 20), None);
        assert_eq!(pixel_y_to_row(10.0, 300.0, 0), None);
    }

    #[test]
    fn lookup_returns_first_registration() {
        let mut cs = ClickState::new();
        cs.add_target(3, Command::Tap);
        cs.add_target(3, Command::Prestige);
        cs.add_target(5, Command::BuyOne(2));
        assert_eq!(cs.command_at(3), Some(Command::Tap));
        assert_eq!(cs.command_at(5), Some(Command::BuyOne(2)));
        assert_eq!(cs.command_at(4), None);
    }

    #[test]
    fn new_frame_forgets_targets() {
        let mut cs = ClickState::new();
        cs.add_target(1, Command::Save);
        cs.reset_frame(80, 24);
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (80, 24));
    }

    #[test]
    fn tap_on_registered_generator_row() {
        let mut cs = ClickState::new();
        cs.reset_frame(40, 30);
        for (i, row) in (10u16..14).enumerate() {
            cs.add_target(row, Command::BuyOne(i));
        }
        // 30 rows in 600px: row 12 spans 240..260
        let row = pixel_y_to_row(250.0, 600.0, cs.terminal_rows).unwrap();
        assert_eq!(cs.command_at(row), Some(Command::BuyOne(2)));
        assert!(is_narrow_layout(cs.terminal_cols));
    }
}
