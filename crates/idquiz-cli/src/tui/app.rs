//! TUI application state and event loop.
//!
//! Design: one trial on screen at a time. The reference photo sits on the
//! left, the six candidates on the right, the countdown in the title bar.
//! Keyboard input and clock ticks are both handled on the main loop, and both
//! go through the proctor, so a trial can only ever be closed once.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use idquiz_core::{Advance, OPTION_COUNT, Proctor, ScoreReport, TickOutcome, TrialView};

/// Option index for a digit key (`'1'` → 0 … `'6'` → 5).
pub fn option_index(key: KeyCode) -> Option<usize> {
    match key {
        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            (idx < OPTION_COUNT).then_some(idx)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    proctor: Proctor,
    image_root: PathBuf,
    /// Show image paths on the trial screen.
    show_files: bool,
    tick_rate: Duration,
    running: bool,
    cursor: usize,
    /// Report scroll offset, in lines.
    scroll: u16,
    report: Option<ScoreReport>,
    /// One-line feedback for the status bar.
    status: Option<String>,
    last_export: Option<PathBuf>,
}

impl App {
    pub fn new(proctor: Proctor, image_root: PathBuf, tick_rate: Duration) -> Self {
        let report = proctor.report();
        Self {
            proctor,
            image_root,
            show_files: false,
            tick_rate,
            running: true,
            cursor: 0,
            scroll: 0,
            report,
            status: None,
            last_export: None,
        }
    }

    pub fn with_file_names(mut self, show: bool) -> Self {
        self.show_files = show;
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        if let Some(path) = &self.last_export {
            println!("Report saved to {}", path.display());
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let mut last_tick = Instant::now();

        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key(key.code)
            {
                // A new trial starts on a full tick.
                last_tick = Instant::now();
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    /// Returns true when the key closed a trial.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if let Some(idx) = option_index(key) {
            return self.select_option(idx);
        }
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.cursor + 1 < OPTION_COUNT {
                    self.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.report.is_some() {
                    self.scroll = self.scroll.saturating_sub(1);
                } else {
                    self.cursor = self.cursor.saturating_sub(3);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.report.is_some() {
                    self.scroll = self.scroll.saturating_add(1);
                } else if self.cursor + 3 < OPTION_COUNT {
                    self.cursor += 3;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => return self.select_option(self.cursor),
            KeyCode::Char('s') => self.export_report(),
            _ => {}
        }
        false
    }

    fn select_option(&mut self, idx: usize) -> bool {
        let Some(person) = self
            .proctor
            .view()
            .and_then(|v| v.options.get(idx).map(|o| o.person))
        else {
            return false;
        };

        match self.proctor.select(person) {
            Ok(advance) => {
                self.after_advance(advance);
                self.status = None;
                true
            }
            Err(e) => {
                log::debug!("selection ignored: {e}");
                false
            }
        }
    }

    pub fn on_tick(&mut self) {
        if let TickOutcome::TimedOut(advance) = self.proctor.tick() {
            self.after_advance(advance);
            self.status = Some("Time's up: trial recorded without an answer".to_string());
        }
    }

    fn after_advance(&mut self, advance: Advance) {
        self.cursor = 0;
        if advance == Advance::Finished {
            self.report = self.proctor.report();
        }
    }

    fn export_report(&mut self) {
        let Some(report) = &self.report else {
            return;
        };

        let epoch = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let path = PathBuf::from(format!("idquiz-report-{epoch}.txt"));

        match std::fs::write(&path, report.to_text()) {
            Ok(()) => {
                self.status = Some(format!("Saved {}", path.display()));
                self.last_export = Some(path);
            }
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    // --- Public accessors ---

    pub fn view(&self) -> Option<TrialView<'_>> {
        self.proctor.view()
    }

    pub fn countdown(&self) -> Option<u32> {
        self.proctor.countdown()
    }

    pub fn countdown_ticks(&self) -> u32 {
        self.proctor.countdown_ticks()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    pub fn show_files(&self) -> bool {
        self.show_files
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn completed_trials(&self) -> usize {
        self.proctor.responses().len()
    }

    pub fn total_trials(&self) -> usize {
        self.proctor.session().total_trials()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
