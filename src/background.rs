//! Optional static backdrop: plain-text art drawn behind the tower.

use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Background {
    rows: Vec<Vec<char>>,
}

impl Background {
    /// Read backdrop art from `path`. A missing or unreadable file means no backdrop.
    pub fn load(path: &Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(s) => Some(Self::from_text(&s)),
            Err(e) => {
                log::warn!("no background from {}: {e}", path.display());
                None
            }
        }
    }

    pub fn from_text(s: &str) -> Self {
        let rows = s
            .lines()
            .map(|l| l.trim_end().chars().collect())
            .collect();
        Self { rows }
    }

    /// Glyph at cell (`col`, `row`) of a `cols` × `rows` area. The art is centred horizontally
    /// and sits on the bottom edge; blanks are `None`.
    pub fn glyph_at(&self, col: u16, row: u16, cols: u16, rows: u16) -> Option<char> {
        let art_h = self.rows.len();
        let art_w = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let top = rows as isize - art_h as isize;
        let left = (cols as isize - art_w as isize) / 2;
        let r = row as isize - top;
        let c = col as isize - left;
        if r < 0 || c < 0 {
            return None;
        }
        self.rows
            .get(r as usize)
            .and_then(|line| line.get(c as usize))
            .copied()
            .filter(|ch| !ch.is_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_art_sits_on_bottom_centre() {
        let bg = Background::from_text(" /\\ \n|##|");
        // 4 wide, 2 tall in a 10 x 5 area: left = 3, top = 3
        assert_eq!(bg.glyph_at(3, 4, 10, 5), Some('|'));
        assert_eq!(bg.glyph_at(4, 3, 10, 5), Some('/'));
        assert_eq!(bg.glyph_at(3, 3, 10, 5), None);
        assert_eq!(bg.glyph_at(0, 4, 10, 5), None);
        assert_eq!(bg.glyph_at(4, 0, 10, 5), None);
    }

    #[test]
    fn test_missing_file_is_tolerated() {
        assert!(Background::load(Path::new("/nonexistent/stacktower-bg.txt")).is_none());
    }
}
