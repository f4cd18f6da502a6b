//! Game state: tower, moving block, score, speed, camera and the commit/tick transitions.

use crate::GameConfig;
use crate::block::{self, Block, Direction, Overlap, Trim};
use crate::camera::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// What a stack key-press did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommitOutcome {
    /// Block locked onto the tower with the given width; `trim` is the piece cut off, if any.
    Stacked { width: f32, trim: Option<Trim> },
    /// Block missed the tower entirely; the game is over with this final score.
    Missed { score: u32 },
    /// Not playing; nothing happened.
    Ignored,
}

/// One session of play. Transitions consume the state and hand back the next one.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Committed blocks, bottom to top. Never empty: index 0 is the base.
    pub stack: Vec<Block>,
    pub current: Block,
    pub score: u32,
    /// Successful commits this session; drives the spawn side of the next block.
    pub commits: u32,
    pub speed: f32,
    pub camera: Camera,
    pub phase: Phase,
    config: GameConfig,
}

impl GameState {
    /// Fresh game: full-width base block centred at the bottom with the first block above it.
    pub fn new(config: &GameConfig) -> Self {
        let base = Block::new(
            (config.world_width - config.start_width) / 2.0,
            config.world_height - config.block_height,
            config.start_width,
            config.block_height,
            Direction::Right,
            0,
        );
        let current = Block::spawn_above(&base, 1, config.world_width);
        Self {
            stack: vec![base],
            current,
            score: 0,
            commits: 0,
            speed: config.initial_speed,
            camera: Camera::new(config.scroll_margin, config.scroll_smoothing),
            phase: Phase::Playing,
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Topmost committed block.
    pub fn top(&self) -> &Block {
        // The base block is never removed.
        &self.stack[self.stack.len() - 1]
    }

    /// Lock the moving block onto the tower, or end the game if it misses.
    pub fn commit(mut self) -> (Self, CommitOutcome) {
        if self.is_over() {
            return (self, CommitOutcome::Ignored);
        }
        match block::overlap(&self.current, self.top()) {
            Overlap::Miss => {
                self.phase = Phase::GameOver;
                let score = self.score;
                (self, CommitOutcome::Missed { score })
            }
            Overlap::Hit { width, x, trim } => {
                let mut placed = self.current.clone();
                if let Some((trim_x, trim_width)) = trim {
                    placed.drop_trim(trim_x, trim_width);
                }
                placed.width = width;
                placed.x = x;
                let dropped = placed.falling_trim;

                self.score += 1;
                self.commits += 1;
                self.speed += self.config.speed_increment;
                if self.config.difficulty_step > 0 && self.score % self.config.difficulty_step == 0 {
                    self.speed += self.config.difficulty_increment;
                }
                self.current = Block::spawn_above(&placed, self.commits + 1, self.config.world_width);
                self.stack.push(placed);
                (self, CommitOutcome::Stacked { width, trim: dropped })
            }
        }
    }

    /// One frame: move the current block, ease the camera, let trims fall.
    pub fn tick(mut self) -> Self {
        if self.is_over() {
            return self;
        }
        self.current.advance(self.speed, self.config.world_width);
        let top_y = self.top().y;
        self.camera.follow(top_y, self.config.world_height);
        let (fall, camera, view) = (self.config.drop_speed, self.camera.offset, self.config.world_height);
        for b in &mut self.stack {
            b.update_falling(fall, camera, view);
        }
        self
    }

    /// Start over with the same configuration.
    pub fn reset(self) -> Self {
        Self::new(&self.config)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> GameState {
        GameState::new(&GameConfig::default())
    }

    /// Place the moving block at `x` and commit.
    fn commit_at(mut state: GameState, x: f32) -> (GameState, CommitOutcome) {
        state.current.x = x;
        state.commit()
    }

    #[test]
    fn test_initial_state() {
        let s = fresh();
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.stack.len(), 1);
        assert_eq!(s.stack[0].x, 150.0);
        assert_eq!(s.stack[0].y, 670.0);
        assert_eq!(s.current.x, 0.0);
        assert_eq!(s.current.y, 640.0);
        assert_eq!(s.current.direction, Direction::Right);
        assert_eq!(s.score, 0);
        assert_eq!(s.speed, 3.0);
    }

    #[test]
    fn test_commit_offset_block_trims_and_scores() {
        let (s, outcome) = commit_at(fresh(), 170.0);
        assert_eq!(s.score, 1);
        assert_eq!(s.stack.len(), 2);
        assert_eq!(s.top().width, 180.0);
        assert_eq!(s.top().x, 170.0);
        match outcome {
            CommitOutcome::Stacked { width, trim: Some(trim) } => {
                assert_eq!(width, 180.0);
                assert_eq!(trim.width, 20.0);
                assert_eq!(trim.x, 350.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_perfect_commit_has_no_trim() {
        let (s, outcome) = commit_at(fresh(), 150.0);
        assert!(matches!(outcome, CommitOutcome::Stacked { trim: None, .. }));
        assert!(s.top().falling_trim.is_none());
        assert_eq!(s.top().width, 200.0);
    }

    #[test]
    fn test_next_block_alternates_side() {
        let (s, _) = commit_at(fresh(), 150.0);
        assert_eq!(s.current.number, 2);
        assert_eq!(s.current.direction, Direction::Left);
        assert_eq!(s.current.x, 300.0);
        assert_eq!(s.current.y, 610.0);
        let (s, _) = commit_at(s, 150.0);
        assert_eq!(s.current.number, 3);
        assert_eq!(s.current.direction, Direction::Right);
        assert_eq!(s.current.x, 0.0);
    }

    #[test]
    fn test_stack_is_monotonic() {
        let mut s = fresh();
        for _ in 0..6 {
            s = commit_at(s, 150.0).0;
        }
        for pair in s.stack.windows(2) {
            assert_eq!(pair[1].y, pair[0].y - 30.0);
            assert!(pair[1].width <= pair[0].width);
        }
    }

    #[test]
    fn test_miss_ends_game() {
        let (s, outcome) = commit_at(fresh(), 0.0);
        // 0..200 overlaps 150..350, so miss needs a disjoint range
        assert!(matches!(outcome, CommitOutcome::Stacked { .. }));
        let mut s = s;
        s.current.x = 400.0;
        s.current.width = 50.0;
        let (s, outcome) = s.commit();
        assert_eq!(outcome, CommitOutcome::Missed { score: 1 });
        assert!(s.is_over());
    }

    #[test]
    fn test_commit_after_game_over_is_ignored() {
        let mut s = fresh();
        s.current.x = 400.0;
        s.current.width = 50.0;
        let (s, _) = s.commit();
        let (s, outcome) = s.commit();
        assert_eq!(outcome, CommitOutcome::Ignored);
        assert_eq!(s.stack.len(), 1);
    }

    #[test]
    fn test_speed_milestone_applied_once() {
        let mut s = fresh();
        for _ in 0..5 {
            s = commit_at(s, 150.0).0;
        }
        let expected = 3.0 + 5.0 * 0.15 + 0.5;
        assert!((s.speed - expected).abs() < 1e-4);
        for _ in 0..30 {
            s = s.tick();
        }
        assert!((s.speed - expected).abs() < 1e-4);
        let x = s.top().x;
        s = commit_at(s, x).0;
        assert!((s.speed - (expected + 0.15)).abs() < 1e-4);
    }

    #[test]
    fn test_tick_moves_block_and_drops_trim() {
        let (s, _) = commit_at(fresh(), 170.0);
        let before = s.current.x;
        let trim_y = s.top().falling_trim.map(|t| t.y);
        let s = s.tick();
        assert!((s.current.x - (before - s.speed)).abs() < 1e-4);
        assert_eq!(s.top().falling_trim.map(|t| t.y), trim_y.map(|y| y + 10.0));
    }

    #[test]
    fn test_tick_is_frozen_after_game_over() {
        let mut s = fresh();
        s.current.x = 400.0;
        s.current.width = 50.0;
        let (s, _) = s.commit();
        let x = s.current.x;
        let s = s.tick();
        assert_eq!(s.current.x, x);
    }

    #[test]
    fn test_camera_scrolls_as_tower_grows() {
        let mut s = fresh();
        for _ in 0..20 {
            s = commit_at(s, 150.0).0;
            s = s.tick();
        }
        assert!(s.camera.offset < 0.0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut s = fresh();
        for _ in 0..7 {
            s = commit_at(s, 160.0).0;
        }
        s.current.x = 480.0;
        s.current.width = 10.0;
        let (s, _) = s.commit();
        for _ in 0..3 {
            let s = s.clone().reset();
            assert_eq!(s.score, 0);
            assert_eq!(s.speed, 3.0);
            assert_eq!(s.stack.len(), 1);
            assert_eq!(s.stack[0].width, 200.0);
            assert_eq!(s.camera.offset, 0.0);
            assert_eq!(s.phase, Phase::Playing);
        }
    }
}
