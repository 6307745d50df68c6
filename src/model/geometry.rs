//! Screen geometry primitives

use serde::{Deserialize, Serialize};

/// A point on the screen, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangular region of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rightmost contained column
    pub fn right(&self) -> i32 {
        self.x + self.width as i32 - 1
    }

    /// Bottommost contained row
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32 - 1
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Clamp a point into this area
    pub fn clamp_point(&self, point: Point) -> Point {
        Point {
            x: point.x.clamp(self.x, self.right()),
            y: point.y.clamp(self.y, self.bottom()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_contains() {
        let area = Area::new(10, 10, 100, 50);
        assert!(area.contains(Point::new(10, 10)));
        assert!(area.contains(Point::new(109, 59)));
        assert!(!area.contains(Point::new(110, 59)));
        assert!(!area.contains(Point::new(9, 10)));
    }

    #[test]
    fn test_clamp_point() {
        let area = Area::new(0, 0, 1280, 720);
        assert_eq!(area.clamp_point(Point::new(-3, 40)), Point::new(0, 40));
        assert_eq!(area.clamp_point(Point::new(2000, 800)), Point::new(1279, 719));
        assert_eq!(area.clamp_point(Point::new(640, 360)), Point::new(640, 360));
    }
}
