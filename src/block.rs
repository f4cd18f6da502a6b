//! Block geometry: horizontal bounce, overlap/trim against the block below, falling trim pieces.

/// How far below the visible frame a trim piece falls before it is dropped.
const TRIM_DISCARD_MARGIN: f32 = 50.0;

/// Horizontal movement direction of a sliding block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Sign applied to speed: -1 for left, +1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Spawn direction for a block sequence number: odd numbers sweep right from the left edge,
    /// even numbers sweep left from the right edge.
    pub fn for_number(number: u32) -> Self {
        if number % 2 == 1 { Self::Right } else { Self::Left }
    }
}

/// Piece cut off a block during a commit, falling out of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trim {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One tower block in world units (y grows downward).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: Direction,
    /// Sequence number: 0 for the base, then 1, 2, ... Parity selects colour and spawn side.
    pub number: u32,
    pub falling_trim: Option<Trim>,
}

/// Result of testing the moving block against the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    /// The x-ranges do not intersect.
    Miss,
    Hit {
        /// Intersection width; becomes the committed block's width.
        width: f32,
        /// Left edge of the intersection; becomes the committed block's x.
        x: f32,
        /// Overhanging part as (x, width), if any.
        trim: Option<(f32, f32)>,
    },
}

impl Block {
    pub fn new(x: f32, y: f32, width: f32, height: f32, direction: Direction, number: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            direction,
            number,
            falling_trim: None,
        }
    }

    /// Spawn the next moving block one block-height above `prev`, entering from the side given
    /// by the parity of `number`.
    pub fn spawn_above(prev: &Self, number: u32, world_width: f32) -> Self {
        let direction = Direction::for_number(number);
        let x = match direction {
            Direction::Right => 0.0,
            Direction::Left => world_width - prev.width,
        };
        Self::new(x, prev.y - prev.height, prev.width, prev.height, direction, number)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Advance by `speed` in the current direction, bouncing off both edges of the world.
    pub fn advance(&mut self, speed: f32, world_width: f32) {
        self.x += speed * self.direction.sign();
        if self.x <= 0.0 {
            self.x = 0.0;
            self.direction = Direction::Right;
        } else if self.right() >= world_width {
            self.x = world_width - self.width;
            self.direction = Direction::Left;
        }
    }

    /// Detach `(x, width)` as a falling trim at this block's height. Zero-width trims are ignored.
    pub fn drop_trim(&mut self, x: f32, width: f32) {
        if width > 0.0 {
            self.falling_trim = Some(Trim {
                x,
                y: self.y,
                width,
                height: self.height,
            });
        }
    }

    /// Let the trim fall by `fall_speed`; drop it once it is well below the camera's view.
    pub fn update_falling(&mut self, fall_speed: f32, camera: f32, view_height: f32) {
        if let Some(trim) = self.falling_trim.as_mut() {
            trim.y += fall_speed;
            if trim.y - camera > view_height + TRIM_DISCARD_MARGIN {
                self.falling_trim = None;
            }
        }
    }
}

/// Horizontal overlap of `current` against `last`.
///
/// A left overhang is trimmed in preference to a right one. Widths only ever shrink up the
/// tower, so a block never overhangs both sides at once.
pub fn overlap(current: &Block, last: &Block) -> Overlap {
    let left = current.x.max(last.x);
    let right = current.right().min(last.right());
    let width = right - left;
    if width <= 0.0 {
        return Overlap::Miss;
    }
    let trim = if current.x < last.x {
        Some((current.x, last.x - current.x))
    } else if current.right() > last.right() {
        Some((last.right(), current.right() - last.right()))
    } else {
        None
    };
    Overlap::Hit { width, x: left, trim }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(x: f32, width: f32) -> Block {
        Block::new(x, 670.0, width, 30.0, Direction::Right, 1)
    }

    #[test]
    fn test_overlap_miss_when_ranges_disjoint() {
        let last = block_at(150.0, 200.0);
        assert_eq!(overlap(&block_at(350.0, 100.0), &last), Overlap::Miss);
        assert_eq!(overlap(&block_at(0.0, 150.0), &last), Overlap::Miss);
        assert_eq!(overlap(&block_at(400.0, 100.0), &last), Overlap::Miss);
    }

    #[test]
    fn test_overlap_exact_alignment_has_no_trim() {
        let last = block_at(150.0, 200.0);
        let hit = overlap(&block_at(150.0, 200.0), &last);
        assert_eq!(
            hit,
            Overlap::Hit {
                width: 200.0,
                x: 150.0,
                trim: None
            }
        );
    }

    #[test]
    fn test_overlap_right_overhang() {
        let last = block_at(150.0, 200.0);
        let hit = overlap(&block_at(170.0, 200.0), &last);
        assert_eq!(
            hit,
            Overlap::Hit {
                width: 180.0,
                x: 170.0,
                trim: Some((350.0, 20.0))
            }
        );
    }

    #[test]
    fn test_overlap_left_overhang() {
        let last = block_at(150.0, 200.0);
        let hit = overlap(&block_at(100.0, 200.0), &last);
        assert_eq!(
            hit,
            Overlap::Hit {
                width: 150.0,
                x: 150.0,
                trim: Some((100.0, 50.0))
            }
        );
    }

    #[test]
    fn test_overlap_width_never_exceeds_inputs() {
        let last = block_at(120.0, 140.0);
        for step in 0..40 {
            let cur = block_at(step as f32 * 10.0, 140.0);
            if let Overlap::Hit { width, x, trim } = overlap(&cur, &last) {
                assert!(width <= cur.width && width <= last.width);
                assert!(x >= last.x && x + width <= last.right());
                let trimmed = trim.map_or(0.0, |(_, w)| w);
                assert!((width + trimmed - cur.width).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_advance_bounces_off_edges() {
        let mut b = block_at(495.0 - 200.0, 200.0);
        b.advance(10.0, 500.0);
        assert_eq!(b.x, 300.0);
        assert_eq!(b.direction, Direction::Left);

        let mut b = Block::new(2.0, 0.0, 200.0, 30.0, Direction::Left, 2);
        b.advance(3.0, 500.0);
        assert_eq!(b.x, 0.0);
        assert_eq!(b.direction, Direction::Right);
    }

    #[test]
    fn test_spawn_side_follows_parity() {
        let base = Block::new(150.0, 670.0, 180.0, 30.0, Direction::Right, 0);
        let odd = Block::spawn_above(&base, 1, 500.0);
        assert_eq!((odd.x, odd.direction), (0.0, Direction::Right));
        let even = Block::spawn_above(&base, 2, 500.0);
        assert_eq!((even.x, even.direction), (320.0, Direction::Left));
        assert_eq!(even.y, 640.0);
        assert_eq!(even.width, 180.0);
    }

    #[test]
    fn test_trim_falls_then_is_discarded() {
        let mut b = block_at(150.0, 200.0);
        b.drop_trim(350.0, 0.0);
        assert!(b.falling_trim.is_none());

        b.drop_trim(350.0, 20.0);
        b.update_falling(10.0, 0.0, 700.0);
        assert_eq!(b.falling_trim.map(|t| t.y), Some(680.0));
        for _ in 0..8 {
            b.update_falling(10.0, 0.0, 700.0);
        }
        assert!(b.falling_trim.is_none());
    }

    #[test]
    fn test_trim_discard_is_relative_to_camera() {
        let mut b = Block::new(0.0, -2000.0, 100.0, 30.0, Direction::Right, 9);
        b.drop_trim(100.0, 10.0);
        b.update_falling(10.0, -2400.0, 700.0);
        assert!(b.falling_trim.is_some());
    }
}
