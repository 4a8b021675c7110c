//! Grid.

/// Stores a grid size, mapping pixels onto `[-1, 1] x [-1, 1]`.
///
/// The first and last pixel of every row and column land exactly on the edges,
/// so each dimension needs at least 2 pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid2(pub [u32; 2]);

impl Grid2 {
    /// Gets the distance between neighbour pixels as `[dx, dy]`.
    pub fn step(&self) -> [f64; 2] {
        [
            2.0 / (self.0[0] - 1) as f64,
            2.0 / (self.0[1] - 1) as f64,
        ]
    }

    /// Gets the normalized coordinate of column `i`.
    pub fn x(&self, i: u32) -> f64 {i as f64 * self.step()[0] - 1.0}

    /// Gets the normalized coordinate of row `j`.
    pub fn y(&self, j: u32) -> f64 {j as f64 * self.step()[1] - 1.0}

    /// Gets the normalized coordinates of one column for every pixel in a row.
    pub fn xs(&self) -> Vec<f64> {
        let dx = self.step()[0];
        (0..self.0[0]).map(|i| i as f64 * dx - 1.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_unit_square() {
        let grid = Grid2([3, 5]);
        assert_eq!(grid.step(), [1.0, 0.5]);
        assert_eq!(grid.xs(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(grid.y(0), -1.0);
        assert_eq!(grid.y(1), -0.5);
        assert_eq!(grid.y(4), 1.0);

        let grid = Grid2([301, 2]);
        assert_eq!(grid.x(0), -1.0);
        assert!(grid.x(150).abs() < 1e-12);
        assert!((grid.x(300) - 1.0).abs() < 1e-12);
        assert_eq!(grid.y(1), 1.0);
    }

    #[test]
    fn xs_match_x() {
        let grid = Grid2([17, 4]);
        for (i, &v) in grid.xs().iter().enumerate() {
            assert_eq!(v, grid.x(i as u32));
        }
    }
}
