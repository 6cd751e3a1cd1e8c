use core::ops::{Add, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer lattice position: one unit cell of the voxel world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub fn above_n(self, n: i32) -> Self {
        self.offset(0, n, 0)
    }

    pub fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub fn below_n(self, n: i32) -> Self {
        self.offset(0, -n, 0)
    }

    /// Center of the cell's floor: where an agent stands when occupying it.
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    /// The cell containing a continuous position.
    pub fn containing(p: Vec3) -> Self {
        Self::new(
            p.x.floor() as i32,
            p.y.floor() as i32,
            p.z.floor() as i32,
        )
    }

    pub fn dist_sq(self, other: Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dy * dy + dz * dz
    }
}

/// Continuous world position / velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Distance ignoring the vertical axis; flight arrival checks use this.
    pub fn horizontal_distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < 1e-9 {
            return Self::ZERO;
        }
        self * (1.0 / len)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// One face of a lattice cell. Break/place/interact calls name the face hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Face {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Face {
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Face::Down => (0, -1, 0),
            Face::Up => (0, 1, 0),
            Face::North => (0, 0, -1),
            Face::South => (0, 0, 1),
            Face::West => (-1, 0, 0),
            Face::East => (1, 0, 0),
        }
    }
}

/// Agent orientation in degrees. Yaw 0 faces +z; pitch is positive downward
/// and clamped to [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw: yaw % 360.0,
            pitch: pitch.clamp(-90.0, 90.0),
        }
    }

    /// The yaw/pitch looking from `from` at `to`.
    pub fn toward(from: Vec3, to: Vec3) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let dz = to.z - from.z;
        let dist_xz = (dx * dx + dz * dz).sqrt();
        let yaw = (dz.atan2(dx).to_degrees() - 90.0) as f32;
        let pitch = (-dy.atan2(dist_xz).to_degrees()) as f32;
        Self { yaw, pitch }
    }

    /// Unit direction vector for this orientation.
    pub fn direction(self) -> Vec3 {
        direction_from_angles(self.pitch, self.yaw)
    }

}

/// Unit direction from pitch/yaw in degrees (pitch positive downward).
pub fn direction_from_angles(pitch: f32, yaw: f32) -> Vec3 {
    let yaw_rad = (yaw as f64).to_radians();
    let pitch_rad = (pitch as f64).to_radians();
    let cos_pitch = pitch_rad.cos();
    Vec3::new(
        -yaw_rad.sin() * cos_pitch,
        -pitch_rad.sin(),
        yaw_rad.cos() * cos_pitch,
    )
}

/// Wrap an angle to (-180, 180].
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    }
    if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Step `current` toward `target` along the shortest arc, at most `max_step`
/// degrees.
pub fn step_yaw(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = wrap_degrees(target - current);
    current + delta.clamp(-max_step, max_step)
}

/// Step a non-wrapping angle (pitch) toward `target` by at most `max_step`.
pub fn step_angle(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    current + delta.clamp(-max_step, max_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_degrees_keeps_half_open_range() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }

    #[test]
    fn step_yaw_takes_shortest_arc() {
        // 350 -> 10 should go through 0, not backwards through 180.
        let stepped = step_yaw(350.0, 10.0, 15.0);
        assert!((stepped - 365.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_toward_faces_positive_z() {
        let rot = Rotation::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert!(rot.yaw.abs() < 1e-4);
        assert!(rot.pitch.abs() < 1e-4);
        let dir = rot.direction();
        assert!((dir.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cell_containing_floors_negative_coordinates() {
        let cell = CellPos::containing(Vec3::new(-0.5, 64.2, 3.9));
        assert_eq!(cell, CellPos::new(-1, 64, 3));
    }
}
