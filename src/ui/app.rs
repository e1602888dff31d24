//! Main TUI application state and logic

use crate::trace::{TraceEvent, TraceLog};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Trace,
    Bindings,
    Scope,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> trace -> bindings -> scope)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Trace,
            FocusedPane::Trace => FocusedPane::Bindings,
            FocusedPane::Bindings => FocusedPane::Scope,
            FocusedPane::Scope => FocusedPane::Source,
        }
    }
}

/// The main application state
///
/// The whole trace is computed before the UI starts, so stepping is pure
/// index movement over the event log. Backward steps are as cheap as forward
/// ones.
pub struct App {
    /// The completed trace being browsed
    pub trace: TraceLog,

    /// Diagnostics recorded during the run
    pub diagnostics: Vec<String>,

    /// The source code that was traced
    pub source_code: String,

    /// Index of the current step in the trace
    pub position: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub trace_scroll: usize,
    pub bindings_scroll: usize,
    pub scope_scroll: usize,

    /// Target visual row for the current line (None = not initialized yet).
    /// Keeps the highlighted line at a fixed position when stepping.
    pub target_line_row: Option<usize>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(trace: TraceLog, diagnostics: Vec<String>, source_code: String) -> Self {
        App {
            trace,
            diagnostics,
            source_code,
            position: 0,
            focused_pane: FocusedPane::Source,
            trace_scroll: 0,
            bindings_scroll: 0,
            scope_scroll: 0,
            target_line_row: None,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    fn current_event(&self) -> Option<&TraceEvent> {
        self.trace.get(self.position)
    }

    /// Run the TUI event loop until quit
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing {
                if self.last_play_time.elapsed() >= Duration::from_secs(1) {
                    if self.position + 1 < self.trace.len() {
                        self.position += 1;
                        self.status_message = "Playing...".to_string();
                        self.trace_scroll = usize::MAX;
                    } else {
                        self.is_playing = false;
                        self.status_message = "Playback complete".to_string();
                    }
                    self.last_play_time = Instant::now();
                }
            }

            // Poll with timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(pane_area);

        // Left column: Source (top) | Trace (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        // Right column: Bindings (top) | Scope stack (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let current_line = self.current_event().map(|e| e.line).unwrap_or(0);
        let mut source_scroll = 0;
        super::panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            current_line,
            self.focused_pane == FocusedPane::Source,
            &mut source_scroll,
            &mut self.target_line_row,
        );

        super::panes::render_trace_pane(
            frame,
            left_rows[1],
            self.trace.events(),
            &self.diagnostics,
            self.position,
            self.focused_pane == FocusedPane::Trace,
            &mut self.trace_scroll,
        );

        // Field access keeps the event borrow disjoint from the scroll
        // offsets; a method call would borrow all of self.
        super::panes::render_bindings_pane(
            frame,
            right_rows[0],
            self.trace.get(self.position),
            self.focused_pane == FocusedPane::Bindings,
            &mut self.bindings_scroll,
        );

        super::panes::render_scope_pane(
            frame,
            right_rows[1],
            self.trace.get(self.position),
            self.focused_pane == FocusedPane::Scope,
            &mut self.scope_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.position,
            self.trace.len(),
            self.is_playing,
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let last = self.trace.len().saturating_sub(1);
                let target = (self.position + n).min(last);
                let stepped = target - self.position;
                self.position = target;
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.trace_scroll = usize::MAX;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.target_line_row {
                        self.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Trace => {
                    self.trace_scroll = self.trace_scroll.saturating_sub(1);
                }
                FocusedPane::Bindings => {
                    self.bindings_scroll = self.bindings_scroll.saturating_sub(1);
                }
                FocusedPane::Scope => {
                    self.scope_scroll = self.scope_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.target_line_row {
                        self.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Trace => {
                    self.trace_scroll = self.trace_scroll.saturating_add(1);
                }
                FocusedPane::Bindings => {
                    self.bindings_scroll = self.bindings_scroll.saturating_add(1);
                }
                FocusedPane::Scope => {
                    self.scope_scroll = self.scope_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.trace.len().saturating_sub(1);
                self.status_message = "Jumped to end".to_string();
                self.trace_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.status_message = "Jumped to start".to_string();
                self.trace_scroll = 0;
            }
            _ => {}
        }
    }

    fn step_forward(&mut self) {
        if self.position + 1 < self.trace.len() {
            self.position += 1;
            self.status_message = "Stepped forward".to_string();
            self.trace_scroll = usize::MAX;
        } else {
            self.status_message = "Already at the last step".to_string();
        }
    }

    fn step_backward(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.status_message = "Stepped backward".to_string();
            self.trace_scroll = usize::MAX;
        } else {
            self.status_message = "Already at the first step".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace_with(n: usize) -> TraceLog {
        let mut trace = TraceLog::new();
        for i in 0..n {
            trace
                .push(TraceEvent {
                    statement: format!("int v{} = {};", i, i),
                    line: i + 1,
                    iteration: None,
                    bindings: vec![],
                    scope_names: vec![],
                })
                .unwrap();
        }
        trace
    }

    #[test]
    fn test_stepping_is_clamped() {
        let mut app = App::new(trace_with(3), vec![], String::new());
        app.step_backward();
        assert_eq!(app.position, 0);
        app.step_forward();
        app.step_forward();
        app.step_forward();
        assert_eq!(app.position, 2);
    }

    #[test]
    fn test_jump_to_end_of_empty_trace() {
        let mut app = App::new(trace_with(0), vec![], String::new());
        app.handle_key_event(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.position, 0);
    }

    #[test]
    fn test_fatal_diagnostic_rendered_in_trace_pane() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        let diagnostics = vec!["Fatal: Trace limit of 16 events exceeded".to_string()];
        let mut app = App::new(trace_with(2), diagnostics, "int x;\nint y;".to_string());
        terminal.draw(|f| app.render(f)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Fatal: Trace limit"));
    }

    #[test]
    fn test_focus_cycles_through_all_panes() {
        let start = FocusedPane::Source;
        let mut pane = start;
        for _ in 0..4 {
            pane = pane.next();
        }
        assert_eq!(pane, start);
    }
}
