//! Layout and drawing: tower playfield, sidebar, pause and game-over overlays.

use crate::background::Background;
use crate::camera::Camera;
use crate::game::GameState;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

const SIDEBAR_WIDTH: u16 = 20;

/// Duration of the game-over popup fade-in (TachyonFX).
const GAME_OVER_FADE_MS: u32 = 450;

/// Per-frame HUD values that live outside the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub best: u32,
    pub new_record: bool,
    pub paused: bool,
}

/// Game-over popup animation, created when the popup first shows.
#[derive(Default)]
pub struct GameOverFx {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl GameOverFx {
    pub fn clear(&mut self) {
        self.effect = None;
        self.last_process = None;
    }
}

/// Board size in terminal cells (width, height) for the space left of the sidebar, keeping the
/// world's aspect ratio. Each cell holds two vertical pixels.
pub fn board_size_for_area(area: Rect, world_width: f32, world_height: f32) -> (u16, u16) {
    let max_w = area.width.saturating_sub(SIDEBAR_WIDTH + 2).max(1);
    let max_h = area.height.saturating_sub(2).max(1);
    let aspect = world_width / world_height;
    let cols = (2.0 * max_h as f32 * aspect).round() as u16;
    if cols <= max_w {
        (cols.max(1), max_h)
    } else {
        let rows = (max_w as f32 / (2.0 * aspect)).round() as u16;
        (max_w, rows.clamp(1, max_h))
    }
}

/// World-space rectangles rasterised to half-cell pixels.
struct Pixels {
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
    camera: Camera,
    data: Vec<Option<Color>>,
}

impl Pixels {
    fn new(cols: u16, rows: u16, state: &GameState) -> Self {
        let (cols, rows) = (cols as usize, rows as usize * 2);
        let config = state.config();
        Self {
            cols,
            rows,
            scale_x: cols as f32 / config.world_width,
            scale_y: rows as f32 / config.world_height,
            camera: state.camera,
            data: vec![None; cols * rows],
        }
    }

    /// Snap a world span to a pixel span; anything with positive extent covers at least one pixel.
    fn span(start: f32, len: f32, scale: f32, limit: usize) -> Option<(usize, usize)> {
        let a = (start * scale).round();
        let mut b = ((start + len) * scale).round();
        if len > 0.0 && b <= a {
            b = a + 1.0;
        }
        let a = a.max(0.0);
        let b = b.min(limit as f32);
        (b > a).then_some((a as usize, b as usize))
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let view_y = self.camera.to_view(y);
        let Some((x0, x1)) = Self::span(x, width, self.scale_x, self.cols) else {
            return;
        };
        let Some((y0, y1)) = Self::span(view_y, height, self.scale_y, self.rows) else {
            return;
        };
        for py in y0..y1 {
            let row = py * self.cols;
            self.data[row + x0..row + x1].fill(Some(color));
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.data.get(y * self.cols + x).copied().flatten()
    }
}

/// Draw the whole screen.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    hud: Hud,
    background: Option<&Background>,
    game_over_fx: &mut GameOverFx,
    no_animation: bool,
    now: Instant,
) {
    let area = frame.area();
    let config = state.config();
    let (cols, rows) = board_size_for_area(area, config.world_width, config.world_height);
    let total_w = cols + 2 + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(rows + 2),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(cols + 2), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (playfield_area, sidebar_area) = (inner[0], inner[1]);

    draw_playfield(frame.buffer_mut(), state, theme, background, playfield_area);
    draw_sidebar(frame.buffer_mut(), state, theme, hud, sidebar_area);

    if state.is_over() {
        let popup = draw_game_over(frame.buffer_mut(), state, theme, hud, playfield_area);
        if !no_animation {
            apply_game_over_effect(frame, theme, popup, game_over_fx, now);
        }
    } else if hud.paused {
        draw_pause_overlay(frame.buffer_mut(), theme, playfield_area);
    }
}

fn draw_playfield(
    buf: &mut Buffer,
    state: &GameState,
    theme: &Theme,
    background: Option<&Background>,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Stacktower ", theme.title));
    let board = block.inner(area);
    block.render(area, buf);
    if board.width == 0 || board.height == 0 {
        return;
    }

    let mut pixels = Pixels::new(board.width, board.height, state);
    for b in &state.stack {
        pixels.fill(b.x, b.y, b.width, b.height, theme.block_color(b.number));
    }
    for trim in state.stack.iter().filter_map(|b| b.falling_trim) {
        pixels.fill(trim.x, trim.y, trim.width, trim.height, theme.trim);
    }
    if !state.is_over() {
        let c = &state.current;
        pixels.fill(c.x, c.y, c.width, c.height, theme.block_color(c.number));
    }

    for row in 0..board.height {
        for col in 0..board.width {
            let top = pixels.get(col as usize, row as usize * 2);
            let bottom = pixels.get(col as usize, row as usize * 2 + 1);
            let cell = &mut buf[(board.x + col, board.y + row)];
            if top.is_none() && bottom.is_none() {
                let glyph = background.and_then(|bg| bg.glyph_at(col, row, board.width, board.height));
                match glyph {
                    Some(ch) => {
                        cell.set_char(ch)
                            .set_style(Style::default().fg(theme.inactive_fg).bg(theme.bg));
                    }
                    None => {
                        cell.set_char(' ').set_style(Style::default().bg(theme.bg));
                    }
                }
            } else {
                cell.set_symbol("▀").set_style(
                    Style::default()
                        .fg(top.unwrap_or(theme.bg))
                        .bg(bottom.unwrap_or(theme.bg)),
                );
            }
        }
    }
}

fn draw_sidebar(buf: &mut Buffer, state: &GameState, theme: &Theme, hud: Hud, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats (border + score, best, speed)
            Constraint::Length(1), // gap
            Constraint::Length(6), // Controls
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], buf);
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(hud.best.max(state.score).to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Speed: ", title_style),
            Span::styled(format!("{:.2}", state.speed), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, buf);

    let keys_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let keys_inner = keys_block.inner(chunks[2]);
    keys_block.render(chunks[2], buf);
    let keys = [("Space", "Stack"), ("R", "Restart"), ("P", "Pause"), ("Q", "Quit")]
        .into_iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<6}"), title_style),
                Span::styled(what, fg_style),
            ])
        })
        .collect::<Vec<_>>();
    Paragraph::new(Text::from(keys)).render(keys_inner, buf);
}

/// Centre a `w` × `h` popup inside `area`.
fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 24, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(" P — Resume ", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, buf);
}

/// Returns the popup's rect so the fade effect can target it.
fn draw_game_over(buf: &mut Buffer, state: &GameState, theme: &Theme, hud: Hud, area: Rect) -> Rect {
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " GAME OVER ",
            Style::default().fg(Color::White).bg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score), fg)),
        Line::from(Span::styled(format!(" High Score: {} ", hud.best), fg)),
    ];
    if hud.new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R — Restart  Q — Quit ", fg)));

    let popup = popup_rect(area, 28, lines.len() as u16 + 2);
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, buf);
    popup
}

/// Create or advance the popup fade-in and render it over `popup`.
fn apply_game_over_effect(
    frame: &mut Frame,
    theme: &Theme,
    popup: Rect,
    game_over_fx: &mut GameOverFx,
    now: Instant,
) {
    let delta = game_over_fx
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    game_over_fx.last_process = Some(now);

    let effect = game_over_fx.effect.get_or_insert_with(|| {
        fx::fade_from(theme.bg, theme.bg, (GAME_OVER_FADE_MS, Interpolation::QuadOut))
    });
    if !effect.done() {
        frame.render_effect(effect, popup, TfxDuration::from_millis(delta_ms));
    }
}
