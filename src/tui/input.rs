//! Key bindings and grid selection for the TUI.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::model::pattern::StepIndex;
use crate::model::track::{TrackId, TRACK_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    ToggleStep,
    TogglePlayback,
    Reset,
    /// Tempo option by zero-based position.
    TempoAt(usize),
    PrevTempo,
    NextTempo,
    Quit,
}

pub fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    if mods.contains(KeyModifiers::CONTROL) {
        return matches!(code, KeyCode::Char('c') | KeyCode::Char('d')).then_some(Action::Quit);
    }
    let action = match code {
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::ToggleStep,
        KeyCode::Char('p') => Action::TogglePlayback,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('[') => Action::PrevTempo,
        KeyCode::Char(']') => Action::NextTempo,
        KeyCode::Char(c @ '1'..='9') => Action::TempoAt(c as usize - '1' as usize),
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// The selected cell. Rows clamp at the edges, steps wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    row: usize,
    step: StepIndex,
}

impl GridCursor {
    pub fn track(&self) -> TrackId {
        TrackId::ALL[self.row]
    }

    pub fn step(&self) -> StepIndex {
        self.step
    }

    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn down(&mut self) {
        self.row = (self.row + 1).min(TRACK_COUNT - 1);
    }

    pub fn left(&mut self) {
        self.step = self.step.prev();
    }

    pub fn right(&mut self) {
        self.step = self.step.next();
    }
}
