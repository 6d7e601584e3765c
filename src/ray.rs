use crate::matrix::Mat4;
use crate::vector::Vec4;

/// A ray in world space: an origin point and a direction vector.
///
/// Rays are value types; transforming one yields a new ray and never
/// mutates in place.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec4,
    pub direction: Vec4,
}

impl Ray {
    /// Creates a ray, coercing `origin` to a point and `direction` to a
    /// vector if their `w` components disagree.
    pub fn new(mut origin: Vec4, mut direction: Vec4) -> Ray {
        if !origin.is_point() {
            origin.w = 1.0;
        }

        if !direction.is_vector() {
            direction.w = 0.0;
        }

        Ray { origin, direction }
    }

    /// The point `t` units along the ray.
    pub fn position(&self, t: f64) -> Vec4 {
        self.origin + self.direction * t
    }

    pub fn transform(&self, m: Mat4) -> Ray {
        Ray {
            origin: m * self.origin,
            direction: m * self.direction,
        }
    }
}

/* Tests */

#[test]
fn position_along_ray() {
    let r = Ray::new(
        Vec4::point(2.0, 3.0, 4.0),
        Vec4::vector(1.0, 0.0, 0.0),
    );

    assert_eq!(r.position(0.0), Vec4::point(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vec4::point(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vec4::point(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vec4::point(4.5, 3.0, 4.0));
}

#[test]
fn translate_ray() {
    let r = Ray::new(
        Vec4::point(1.0, 2.0, 3.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );
    let t = r.transform(Mat4::translation(3.0, 4.0, 5.0));

    assert_eq!(t.origin, Vec4::point(4.0, 6.0, 8.0));
    assert_eq!(t.direction, Vec4::vector(0.0, 1.0, 0.0));
}

#[test]
fn scale_ray() {
    let r = Ray::new(
        Vec4::point(1.0, 2.0, 3.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );
    let t = r.transform(Mat4::scaling(2.0, 3.0, 4.0));

    assert_eq!(t.origin, Vec4::point(2.0, 6.0, 12.0));
    assert_eq!(t.direction, Vec4::vector(0.0, 3.0, 0.0));
}

#[test]
fn transform_round_trips_through_inverse() {
    let r = Ray::new(
        Vec4::point(1.0, 2.0, 3.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );
    let m = Mat4::translation(3.0, -2.0, 7.0)
        * Mat4::scaling(2.0, 3.0, 4.0)
        * Mat4::rotation_y(1.3);

    let back = r.transform(m).transform(m.inverse().unwrap());
    assert_eq!(back, r);
}
