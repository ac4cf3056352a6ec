use serde::{Deserialize, Serialize};

/// A square-or-rectangular 2D grid stored row-major. Does not wrap at the edges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T> Tilemap<T> {
    /// Build a map by calling `f(index)` for every cell in row-major order.
    pub fn from_fn(width: usize, height: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            width,
            height,
            data: (0..width * height).map(f).collect(),
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({}, {}) outside tilemap", x, y);
        y * self.width + x
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Linear index of a signed coordinate, or `None` when it falls off the map.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Coordinates of a linear index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Get value at (x, y)
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    /// Direct access by linear index. Panics when the index is outside the map.
    pub fn at(&self, index: usize) -> &T {
        &self.data[index]
    }

    pub fn at_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let map = Tilemap::from_fn(7, 5, |_| 0u8);
        let idx = map.index_of(3, 4).unwrap();
        assert_eq!(idx, 31);
        assert_eq!(map.coords(idx), (3, 4));
        assert_eq!(map.index_of(7, 0), None);
        assert_eq!(map.index_of(-1, 2), None);
    }

    #[test]
    fn test_from_fn() {
        let map = Tilemap::from_fn(3, 2, |i| i * 10);
        assert_eq!(*map.get(2, 1), 50);
        assert_eq!(*map.at(1), 10);
        assert_eq!(map.iter().filter(|&(_, y, _)| y == 1).count(), 3);
    }
}
