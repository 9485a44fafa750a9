#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector for a heading in degrees, y pointing up (counter-clockwise positive).
    pub fn from_degrees(angle: f64) -> Self {
        let radians = angle.to_radians();
        Vector2D::new(radians.cos(), radians.sin())
    }

    /// Offset of `distance` along a heading, in screen space where y grows downwards.
    pub fn screen_offset(angle: f64, distance: f64) -> Self {
        let radians = angle.to_radians();
        Vector2D::new(distance * radians.cos(), -distance * radians.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rescales to `length` keeping the direction. A zero vector stays zero.
    pub fn scale_to_length(&self, length: f64) -> Self {
        let current = self.length();
        if current == 0.0 {
            *self
        } else {
            self.scale(length / current)
        }
    }
}

pub fn wrap_coordinate(value: f64, max: f64) -> f64 {
    let wrapped = value % max;
    let wrapped = if wrapped < 0.0 { wrapped + max } else { wrapped };
    // -tiny + max rounds up to max
    if wrapped >= max { 0.0 } else { wrapped }
}

/// Axis-aligned box centred on an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub center: Vector2D,
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub fn new(center: Vector2D, width: f64, height: f64) -> Self {
        Hitbox { center, width, height }
    }

    pub fn square(center: Vector2D, side: f64) -> Self {
        Hitbox::new(center, side, side)
    }

    /// Interiors overlap; boxes that only share an edge do not collide.
    pub fn intersects(&self, other: &Hitbox) -> bool {
        (self.center.x - other.center.x).abs() * 2.0 < self.width + other.width
            && (self.center.y - other.center.y).abs() * 2.0 < self.height + other.height
    }
}
