/// Axis-aligned rectangles and the overlap test used for every hit check.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Anything that occupies a rectangle on the playfield.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// True iff the rectangles overlap on both axes.
///
/// Bounds are half-open: rectangles that only touch along an edge do not
/// intersect, and a zero-extent rectangle can only intersect when it lies
/// strictly inside the other's span.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_inside_enemy_overlaps() {
        let bullet = Rect::new(100.0, 50.0, 4.0, 12.0);
        let enemy = Rect::new(98.0, 55.0, 35.0, 28.0);
        assert!(intersects(&bullet, &enemy));
        assert!(intersects(&enemy, &bullet));
    }

    #[test]
    fn edge_touch_is_not_a_hit() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn degenerate_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let point_inside = Rect::new(5.0, 5.0, 0.0, 0.0);
        let point_on_edge = Rect::new(10.0, 5.0, 0.0, 0.0);
        assert!(intersects(&a, &point_inside));
        assert!(!intersects(&a, &point_on_edge));
        assert!(!intersects(&point_inside, &point_inside));
    }
}
