use serde::{Deserialize, Deserializer, Serialize};

/// A point in either coordinate frame (abstract units or pixels).
///
/// Accepts both `{"x": 1, "y": 2}` and `[1, 2]` on input; waypoint lists in
/// older documents use the array form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Unit vector pointing from `self` toward `other`. Falls back to the
    /// positive x axis when the two points coincide.
    pub fn direction_to(&self, other: Point) -> Point {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < f64::EPSILON {
            Point::new(1.0, 0.0)
        } else {
            Point::new(dx / len, dy / len)
        }
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pair([f64; 2]),
            Named { x: f64, y: f64 },
        }
        match Repr::deserialize(deserializer)? {
            Repr::Pair([x, y]) => Ok(Point { x, y }),
            Repr::Named { x, y } => Ok(Point { x, y }),
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, stored as top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect from its center point and size.
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rect covering both `self` and `other`.
    pub fn union(&self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Whether `other` lies entirely inside `self` (boundaries may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Intersection of the ray from the rect center toward `toward` with the
    /// rect boundary. Returns the center itself for a degenerate rect.
    pub fn boundary_toward(&self, toward: Point) -> Point {
        let c = self.center();
        let dx = toward.x - c.x;
        let dy = toward.y - c.y;
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return c;
        }
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        if hw < f64::EPSILON || hh < f64::EPSILON {
            return c;
        }
        // Scale the direction so the larger normalized component hits 1.
        let tx = if dx.abs() < f64::EPSILON {
            f64::INFINITY
        } else {
            hw / dx.abs()
        };
        let ty = if dy.abs() < f64::EPSILON {
            f64::INFINITY
        } else {
            hh / dy.abs()
        };
        let t = tx.min(ty);
        Point::new(c.x + dx * t, c.y + dy * t)
    }

    /// Intersection of the ray from the center toward `toward` with the
    /// inscribed ellipse boundary (cloud-shaped nodes).
    pub fn ellipse_boundary_toward(&self, toward: Point) -> Point {
        let c = self.center();
        let dir = c.direction_to(toward);
        let a = self.width / 2.0;
        let b = self.height / 2.0;
        if a < f64::EPSILON || b < f64::EPSILON {
            return c;
        }
        // Parametrize p = c + t*dir, solve (tx/a)^2 + (ty/b)^2 = 1.
        let denom = (dir.x / a).powi(2) + (dir.y / b).powi(2);
        let t = 1.0 / denom.sqrt();
        Point::new(c.x + dir.x * t, c.y + dir.y * t)
    }
}

// ── Segment intersection ────────────────────────────────────────────────

/// Signed area of the triangle (a, b, c): positive for counter-clockwise.
pub fn ccw(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether the open segments (p1, p2) and (p3, p4) properly cross.
///
/// Shared endpoints do not count as a crossing; the barycenter stage counts
/// only genuine edge crossings, and adjacent edges always share a node.
pub fn segments_cross(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = ccw(p3, p4, p1);
    let d2 = ccw(p3, p4, p2);
    let d3 = ccw(p1, p2, p3);
    let d4 = ccw(p1, p2, p4);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Whether the segment (p1, p2) intersects the rectangle `rect`.
pub fn segment_intersects_rect(p1: Point, p2: Point, rect: &Rect) -> bool {
    if rect.contains_point(p1) || rect.contains_point(p2) {
        return true;
    }
    let tl = Point::new(rect.left(), rect.top());
    let tr = Point::new(rect.right(), rect.top());
    let bl = Point::new(rect.left(), rect.bottom());
    let br = Point::new(rect.right(), rect.bottom());
    segments_cross(p1, p2, tl, tr)
        || segments_cross(p1, p2, tr, br)
        || segments_cross(p1, p2, br, bl)
        || segments_cross(p1, p2, bl, tl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_direction_to_degenerate_falls_back() {
        let a = Point::new(2.0, 2.0);
        let d = a.direction_to(a);
        assert_eq!(d, Point::new(1.0, 0.0));
    }

    #[test]
    fn test_point_deserialize_both_forms() {
        let named: Point = serde_json::from_str(r#"{"x": 1.5, "y": 2.5}"#).unwrap();
        let pair: Point = serde_json::from_str("[1.5, 2.5]").unwrap();
        assert_eq!(named, pair);
    }

    #[test]
    fn test_rect_center_and_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let u = a.union(b);
        assert_eq!(u, Rect::new(0.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn test_boundary_toward_hits_right_edge() {
        let r = Rect::new(0.0, 0.0, 20.0, 10.0);
        let p = r.boundary_toward(Point::new(100.0, 5.0));
        assert!((p.x - 20.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_toward_hits_bottom_edge() {
        let r = Rect::new(0.0, 0.0, 20.0, 10.0);
        let p = r.boundary_toward(Point::new(10.0, 100.0));
        assert!((p.y - 10.0).abs() < 1e-9);
        assert!((p.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_ellipse_boundary_on_axis() {
        let r = Rect::new(0.0, 0.0, 80.0, 50.0);
        let p = r.ellipse_boundary_toward(Point::new(1000.0, 25.0));
        assert!((p.x - 80.0).abs() < 1e-9, "semi-major axis endpoint");
        assert!((p.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_segments_cross_basic() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let c = Point::new(0.0, 10.0);
        let d = Point::new(10.0, 0.0);
        assert!(segments_cross(a, b, c, d));
    }

    #[test]
    fn test_segments_shared_endpoint_not_a_crossing() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let c = Point::new(10.0, 10.0);
        let d = Point::new(20.0, 0.0);
        assert!(!segments_cross(a, b, c, d));
    }

    #[test]
    fn test_parallel_segments_do_not_cross() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let c = Point::new(0.0, 5.0);
        let d = Point::new(10.0, 5.0);
        assert!(!segments_cross(a, b, c, d));
    }

    #[test]
    fn test_segment_intersects_rect() {
        let rect = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(segment_intersects_rect(
            Point::new(0.0, 10.0),
            Point::new(20.0, 10.0),
            &rect
        ));
        assert!(!segment_intersects_rect(
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            &rect
        ));
    }
}
