use std::ops::{ Add, Sub, Neg, Mul };

use crate::consts::feq;

/// A homogeneous coordinate in 3D space.
///
/// Points carry `w == 1.0`, vectors carry `w == 0.0`. Keeping both in one
/// type lets `Mat4` transform either through a single multiplication, with
/// translation naturally ignored for vectors.
#[derive(Debug, Default, Copy, Clone)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl PartialEq for Vec4 {
    fn eq(&self, other: &Vec4) -> bool {
        feq(self.x, other.x)
            && feq(self.y, other.y)
            && feq(self.z, other.z)
            && feq(self.w, other.w)
    }
}

impl Vec4 {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Vec4 {
        Vec4 { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Vec4 {
        Vec4 { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Vec4 {
        Vec4 { x, y, z, w: 0.0 }
    }

    pub fn is_point(&self) -> bool {
        self.w == 1.0
    }

    pub fn is_vector(&self) -> bool {
        self.w == 0.0
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x
            + self.y * self.y
            + self.z * self.z
            + self.w * self.w).sqrt()
    }

    pub fn normalize(&self) -> Vec4 {
        let mag = self.magnitude();
        Vec4 {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    pub fn dot(&self, other: &Vec4) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    pub fn cross(&self, other: &Vec4) -> Vec4 {
        Vec4 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 0.0,
        }
    }

    /// Reflects this vector across a surface normal.
    pub fn reflect(&self, normal: &Vec4) -> Vec4 {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Add for Vec4 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w,
        }
    }
}

impl Sub for Vec4 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w,
        }
    }
}

impl Neg for Vec4 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z, w: -self.w }
    }
}

impl Mul<f64> for Vec4 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
            w: self.w * scalar,
        }
    }
}

impl Mul<Vec4> for f64 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Vec4 {
        v * self
    }
}

/* Tests */

#[test]
fn point_and_vector_flags() {
    assert!(Vec4::point(4.3, -4.2, 3.1).is_point());
    assert!(Vec4::vector(4.3, -4.2, 3.1).is_vector());
}

#[test]
fn add_vectors() {
    let a = Vec4::tuple(3.0, -2.0, 5.0, 1.0);
    let b = Vec4::tuple(-2.0, 3.0, 1.0, 0.0);

    assert_eq!(a + b, Vec4::tuple(1.0, 1.0, 6.0, 1.0));
}

#[test]
fn sub_points_gives_vector() {
    let p1 = Vec4::point(3.0, 2.0, 1.0);
    let p2 = Vec4::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vec4::vector(-2.0, -4.0, -6.0));
}

#[test]
fn neg_tuple() {
    let a = Vec4::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Vec4::tuple(-1.0, 2.0, -3.0, 4.0));
}

#[test]
fn scalar_multiplication() {
    let a = Vec4::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(a * 3.5, Vec4::tuple(3.5, -7.0, 10.5, -14.0));
    assert_eq!(0.5 * a, Vec4::tuple(0.5, -1.0, 1.5, -2.0));
}

#[test]
fn magnitude() {
    assert_eq!(Vec4::vector(1.0, 2.0, 3.0).magnitude(), 14.0f64.sqrt());
    assert_eq!(Vec4::vector(-1.0, -2.0, -3.0).magnitude(), 14.0f64.sqrt());
}

#[test]
fn normalize() {
    let v = Vec4::vector(4.0, 0.0, 0.0);
    assert_eq!(v.normalize(), Vec4::vector(1.0, 0.0, 0.0));

    let v = Vec4::vector(1.0, 2.0, 3.0);
    let n = v.normalize();
    assert!(feq(n.magnitude(), 1.0));
}

#[test]
fn dot_product() {
    let a = Vec4::vector(1.0, 2.0, 3.0);
    let b = Vec4::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_product() {
    let a = Vec4::vector(1.0, 2.0, 3.0);
    let b = Vec4::vector(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vec4::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vec4::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Vec4::vector(0.0, -1.0, 0.0);
    let n = Vec4::vector(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);
    let r = v.reflect(&n);

    assert_eq!(r, Vec4::vector(1.0, 0.0, 0.0));
}
