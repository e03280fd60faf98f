//! The step grid widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use crate::audio::registry::{AssetLoadState, SoundRegistry};
use crate::model::pattern::{Pattern, StepIndex, STEPS};
use crate::model::track::TrackId;

use super::input::GridCursor;

const COL_NUM: usize = 3;
const COL_NAME: usize = 12;
const COL_STATE: usize = 8;
const PREFIX_WIDTH: usize = COL_NUM + 1 + COL_NAME + 1 + COL_STATE + 2;
/// Each step takes a cell plus a gap.
const GRID_WIDTH: usize = STEPS * 2;

pub struct StepGrid<'a> {
    pattern: &'a Pattern,
    registry: Option<&'a SoundRegistry>,
    block: Option<Block<'a>>,
    highlight: Option<StepIndex>,
    cursor: Option<GridCursor>,
}

impl<'a> StepGrid<'a> {
    pub fn new(pattern: &'a Pattern) -> Self {
        Self { pattern, registry: None, block: None, highlight: None, cursor: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn registry(mut self, registry: &'a SoundRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Step currently sounding; `None` while stopped.
    pub fn highlight(mut self, step: Option<StepIndex>) -> Self {
        self.highlight = step;
        self
    }

    pub fn cursor(mut self, cursor: GridCursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    fn state_cell(registry: Option<&SoundRegistry>, track: TrackId) -> (&'static str, Style) {
        match registry.and_then(|r| r.load_state(track)) {
            None if track.is_sample() => ("sample", Style::default().fg(Color::DarkGray)),
            None => ("synth", Style::default().fg(Color::Rgb(90, 90, 90))),
            Some(AssetLoadState::Pending) => ("loading", Style::default().fg(Color::Yellow)),
            Some(AssetLoadState::Loaded) => ("ready", Style::default().fg(Color::Rgb(140, 200, 140))),
            Some(AssetLoadState::Failed(_)) => ("failed", Style::default().fg(Color::Red)),
        }
    }
}

fn clear_row(buf: &mut Buffer, area: Rect, y: u16) {
    for x in area.x..area.x + area.width {
        buf[(x, y)].set_char(' ').set_style(Style::default());
    }
}

impl Widget for StepGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let StepGrid { pattern, registry, block, highlight, cursor } = self;
        let mut area = area;
        if let Some(block) = block {
            let inner = block.inner(area);
            block.render(area, buf);
            area = inner;
        }
        if area.height < 1 {
            return;
        }

        let dim = Style::default().fg(Color::DarkGray);
        if (area.width as usize) < PREFIX_WIDTH + GRID_WIDTH {
            clear_row(buf, area, area.y);
            buf.set_string(area.x, area.y, "terminal too narrow, widen to view the grid", dim);
            return;
        }
        let grid_x = area.x + PREFIX_WIDTH as u16;

        // header: beat numbers
        let y = area.y;
        clear_row(buf, area, y);
        let header_style = Style::default().fg(Color::Rgb(100, 100, 100));
        buf.set_string(area.x, y, format!("{:>w$}", "#", w = COL_NUM), header_style);
        buf.set_string(area.x + (COL_NUM + 1) as u16, y, format!("{:<w$}", "TRACK", w = COL_NAME), header_style);
        for step in StepIndex::all().filter(|s| s.get() % 4 == 0) {
            buf.set_string(grid_x + (step.get() * 2) as u16, y, format!("{}", step.get() + 1), dim);
        }

        for (i, track) in TrackId::ALL.into_iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            clear_row(buf, area, y);

            let (r, g, b) = track.color();
            let color = Color::Rgb(r, g, b);
            let selected_row = cursor.is_some_and(|c| c.track() == track);

            buf.set_string(area.x, y, format!("{:>w$}", i + 1, w = COL_NUM), Style::default().fg(Color::Rgb(80, 80, 80)));
            let mut name_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            if selected_row {
                name_style = name_style.add_modifier(Modifier::REVERSED);
            }
            buf.set_string(area.x + (COL_NUM + 1) as u16, y, format!("{:<w$}", track.label(), w = COL_NAME), name_style);

            let (state, state_style) = Self::state_cell(registry, track);
            buf.set_string(area.x + (COL_NUM + 1 + COL_NAME + 1) as u16, y, format!("{:<w$}", state, w = COL_STATE), state_style);

            for step in StepIndex::all() {
                let x = grid_x + (step.get() * 2) as u16;
                let on = pattern.is_active(track, step);
                let playing = highlight == Some(step);
                let selected = selected_row && cursor.is_some_and(|c| c.step() == step);

                let ch = if on { '●' } else if step.get() % 4 == 0 { '┆' } else { '·' };
                let mut style = match (on, playing) {
                    (true, true) => Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
                    (false, true) => Style::default().fg(Color::DarkGray).bg(Color::Rgb(60, 60, 60)),
                    (true, false) => Style::default().fg(color),
                    (false, false) => Style::default().fg(Color::Rgb(50, 50, 50)),
                };
                if selected {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                buf.set_string(x, y, ch.to_string(), style);
            }
        }

        let rows_end = area.y + 1 + TrackId::ALL.len() as u16;
        for y in rows_end..area.y + area.height {
            clear_row(buf, area, y);
        }
    }
}
