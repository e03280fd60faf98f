//! Terminal UI for the drum machine.
//!
//! Draws the step grid with a live playhead and drives the engine's host
//! loop between frames.

mod input;
mod widgets;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::audio::loader::SampleLoader;
use crate::audio::output::AudioOutput;
use crate::console::{self, Level};
use crate::engine::{Engine, PlaybackState, Snapshot};

pub use input::{map_key, Action, GridCursor};
use widgets::StepGrid;

struct Message {
    text: String,
    level: Level,
}

pub struct TuiApp<O: AudioOutput> {
    engine: Engine<O>,
    cursor: GridCursor,
    messages: Vec<Message>,
    console: console::Subscription,
    should_quit: bool,
}

impl<O: AudioOutput> TuiApp<O> {
    pub fn new(engine: Engine<O>) -> Self {
        Self {
            engine,
            cursor: GridCursor::default(),
            messages: Vec::new(),
            console: console::subscribe(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, loader: Arc<dyn SampleLoader>) -> Result<()> {
        self.engine.load_samples(loader);
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        self.engine.shutdown();
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let frame = Duration::from_millis(16);

        loop {
            let started = Instant::now();
            self.engine.pump();
            for log in self.console.drain() {
                self.msg(&log.text, log.level);
            }

            let snap = self.engine.snapshot();
            terminal.draw(|f| self.render(f, &snap))?;

            // Keys are handled between pumps; the look-ahead window covers
            // the time spent waiting here.
            let timeout = frame.saturating_sub(started.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = map_key(key.code, key.modifiers) {
                            self.apply(action);
                        }
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Up => self.cursor.up(),
            Action::Down => self.cursor.down(),
            Action::Left => self.cursor.left(),
            Action::Right => self.cursor.right(),
            Action::ToggleStep => self.engine.toggle_step(self.cursor.track(), self.cursor.step()),
            Action::TogglePlayback => {
                if let Err(e) = self.engine.toggle_playback() {
                    self.msg(&e.to_string(), Level::Error);
                }
            }
            Action::Reset => self.engine.reset(),
            Action::TempoAt(i) => {
                if let Some(bpm) = self.engine.tempo_options().nth(i) {
                    self.select_tempo(bpm);
                }
            }
            Action::PrevTempo => {
                let bpm = self.engine.tempo_options().prev_before(self.engine.tempo().bpm());
                self.select_tempo(bpm);
            }
            Action::NextTempo => {
                let bpm = self.engine.tempo_options().next_after(self.engine.tempo().bpm());
                self.select_tempo(bpm);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn select_tempo(&mut self, bpm: u32) {
        match self.engine.set_tempo(bpm) {
            Ok(t) => self.msg(&format!("tempo {} bpm", t.bpm()), Level::Info),
            Err(e) => self.msg(&e.to_string(), Level::Error),
        }
    }

    fn msg(&mut self, text: &str, level: Level) {
        self.messages.push(Message { text: text.to_string(), level });
        if self.messages.len() > 50 {
            self.messages.remove(0);
        }
    }

    fn render(&self, frame: &mut Frame, snap: &Snapshot) {
        let area = frame.area();
        frame.render_widget(ratatui::widgets::Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(9), // grid
                Constraint::Min(3),    // messages
                Constraint::Length(1), // key help
            ])
            .split(area);

        self.render_header(frame, chunks[0], snap);
        self.render_grid(frame, chunks[1], snap);
        self.render_messages(frame, chunks[2]);
        render_help(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, snap: &Snapshot) {
        let transport = match snap.state {
            PlaybackState::Running => {
                Span::styled(" ▶ ", Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD))
            }
            PlaybackState::Stopped => {
                Span::styled(" ■ ", Style::default().fg(Color::DarkGray).bg(Color::Rgb(40, 40, 40)))
            }
        };

        let mut spans = vec![
            Span::styled(" DRUM MACHINE ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            transport,
            Span::raw("  "),
        ];
        for (i, bpm) in self.engine.tempo_options().values().iter().enumerate() {
            let style = if *bpm == snap.bpm {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {}:{} ", i + 1, bpm), style));
        }
        spans.push(Span::raw("  "));
        if let Some(step) = snap.highlight {
            spans.push(Span::styled(format!("step {:>2}/16", step.get() + 1), Style::default().fg(Color::DarkGray)));
        }
        if snap.start_pending {
            spans.push(Span::styled("  waiting for samples…", Style::default().fg(Color::Yellow)));
        } else if !snap.all_samples_loaded && self.engine.registry().loads_in_flight() {
            spans.push(Span::styled("  loading samples…", Style::default().fg(Color::Yellow)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect, snap: &Snapshot) {
        let block = Block::default()
            .title(" Pattern ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(60, 60, 60)));
        let grid = StepGrid::new(self.engine.pattern())
            .block(block)
            .registry(self.engine.registry())
            .highlight(snap.highlight)
            .cursor(self.cursor);
        frame.render_widget(grid, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(60, 60, 60)));
        let max_lines = block.inner(area).height as usize;

        let mut lines: Vec<Line> = Vec::new();
        for msg in self.messages.iter().rev().take(max_lines) {
            let style = match msg.level {
                Level::Error => Style::default().fg(Color::Red),
                Level::Warn => Style::default().fg(Color::Yellow),
                Level::Info => Style::default().fg(Color::DarkGray),
            };
            lines.push(Line::styled(msg.text.as_str(), style));
        }
        lines.reverse();

        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = " ←↓↑→/hjkl move  space toggle  p play/stop  r reset  1-9 [ ] tempo  q quit";
    frame.render_widget(Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))), area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn run<O: AudioOutput>(engine: Engine<O>, loader: Arc<dyn SampleLoader>) -> Result<()> {
    TuiApp::new(engine).run(loader)
}
