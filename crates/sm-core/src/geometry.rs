//! Axis-aligned rectangles in CSS pixels.

/// Rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-edge offsets, e.g. an observer root margin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideOffsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl SideOffsets {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0.0
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows each edge outward by the given offsets (negative values shrink).
    pub fn outset(&self, offsets: SideOffsets) -> Self {
        Self::new(
            self.x - offsets.left,
            self.y - offsets.top,
            (self.width + offsets.left + offsets.right).max(0.0),
            (self.height + offsets.top + offsets.bottom).max(0.0),
        )
    }

    /// Edge-inclusive intersection: rectangles that only touch produce a
    /// zero-area result instead of `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left > right || top > bottom {
            return None;
        }

        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;
    use super::SideOffsets;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 25.0, 100.0, 100.0);
        let hit = a.intersection(&b);
        assert_eq!(hit, Some(Rect::new(50.0, 25.0, 50.0, 75.0)));
    }

    #[test]
    fn touching_rects_produce_zero_area_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 50.0);
        let hit = a.intersection(&b);
        assert!(hit.is_some_and(|rect| rect.is_empty()));
    }

    #[test]
    fn disjoint_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.5, 10.0, 10.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn outset_grows_each_edge() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0).outset(SideOffsets::uniform(5.0));
        assert_eq!(rect, Rect::new(5.0, 5.0, 20.0, 20.0));
    }
}
