//! Vertical camera that eases upward to keep the top of the tower in view.

/// Scroll offset in world units. Starts at 0 and goes negative as the tower grows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub offset: f32,
    /// Fraction of the view height to keep free above the top block.
    margin: f32,
    /// Fraction of the deficit closed each tick.
    smoothing: f32,
}

impl Camera {
    pub fn new(margin: f32, smoothing: f32) -> Self {
        Self {
            offset: 0.0,
            margin,
            smoothing,
        }
    }

    /// Move toward keeping `margin * view_height` of free space above `top_y`.
    pub fn follow(&mut self, top_y: f32, view_height: f32) {
        let margin = view_height * self.margin;
        let free_space = top_y - self.offset;
        if free_space < margin {
            self.offset -= (margin - free_space) * self.smoothing;
        }
    }

    /// World y to view y.
    #[inline]
    pub fn to_view(&self, world_y: f32) -> f32 {
        world_y - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scroll_while_space_remains() {
        let mut cam = Camera::new(0.4, 0.1);
        cam.follow(670.0, 700.0);
        assert_eq!(cam.offset, 0.0);
    }

    #[test]
    fn test_scrolls_by_fraction_of_deficit() {
        let mut cam = Camera::new(0.4, 0.1);
        // margin = 280, free = 180, deficit = 100
        cam.follow(180.0, 700.0);
        assert!((cam.offset + 10.0).abs() < 1e-4);
        cam.follow(180.0, 700.0);
        // deficit now 90
        assert!((cam.offset + 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut cam = Camera::new(0.4, 0.1);
        for _ in 0..500 {
            cam.follow(-1000.0, 700.0);
        }
        let free = -1000.0 - cam.offset;
        assert!(free <= 280.0);
        assert!(280.0 - free < 0.01);
    }
}
