//! App: terminal init, main loop, tick and key handling.

use crate::background::Background;
use crate::game::{CommitOutcome, GameState};
use crate::highscore::HighScore;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, GameOverFx, Hud};
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub struct App {
    theme: Theme,
    background: Option<Background>,
    state: GameState,
    high_score: HighScore,
    /// The last game beat the stored best.
    new_record: bool,
    paused: bool,
    frame_interval: Duration,
    no_animation: bool,
    game_over_fx: GameOverFx,
}

impl App {
    pub fn new(args: &Args, config: &GameConfig, theme: Theme, high_score: HighScore) -> Self {
        let background = args.background.as_deref().and_then(Background::load);
        let fps = if args.fps.is_finite() && args.fps > 0.0 { args.fps } else { 60.0 };
        Self {
            theme,
            background,
            state: GameState::new(config),
            high_score,
            new_record: false,
            paused: false,
            frame_interval: Duration::from_secs_f64(1.0 / fps),
            no_animation: args.no_animation,
            game_over_fx: GameOverFx::default(),
        }
    }

    /// Apply one key action. Returns false when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Stack if !self.paused => self.stack(),
            Action::Restart if self.state.is_over() => self.restart(),
            Action::Pause if !self.state.is_over() => self.paused = !self.paused,
            _ => {}
        }
        true
    }

    fn stack(&mut self) {
        let (state, outcome) = std::mem::take(&mut self.state).commit();
        self.state = state;
        if let CommitOutcome::Missed { score } = outcome {
            self.new_record = self.high_score.submit(score);
            log::info!(
                "game over: score {}, best {}{}",
                score,
                self.high_score.best(),
                if self.new_record { " (new record)" } else { "" }
            );
        }
    }

    fn restart(&mut self) {
        self.state = std::mem::take(&mut self.state).reset();
        self.new_record = false;
        self.paused = false;
        self.game_over_fx.clear();
    }

    fn tick(&mut self) {
        if !self.paused {
            self.state = std::mem::take(&mut self.state).tick();
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            best: self.high_score.best(),
            new_record: self.new_record,
            paused: self.paused,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            cursor::{Hide, Show},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
        self.high_score.flush();

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut next_tick = Instant::now() + self.frame_interval;
        loop {
            let hud = self.hud();
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    hud,
                    self.background.as_ref(),
                    &mut self.game_over_fx,
                    self.no_animation,
                    Instant::now(),
                );
            })?;

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Ignore releases and OS repeats
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            if now >= next_tick {
                self.tick();
                next_tick += self.frame_interval;
                // After a stall, resume from now instead of replaying missed ticks.
                if next_tick < now {
                    next_tick = now + self.frame_interval;
                }
            }
        }
    }
}
