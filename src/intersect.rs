use crate::consts::SURFACE_EPSILON;
use crate::ray::Ray;
use crate::shape::Shape;
use crate::vector::Vec4;

/// A single ray/shape crossing at parametric distance `t`.
///
/// Negative `t` values (behind the ray origin) are kept in intersection
/// lists; only hit selection filters them, because the refractive-index
/// walk needs every entry and exit event along the ray.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub shape: &'a Shape,
}

/// Two intersections are the same event when their distances match and
/// they reference the same shape, compared through the shape's stable id
/// rather than reference identity.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && self.shape.id() == other.shape.id()
    }
}

/// A list of intersections sorted ascending by `t`.
///
/// Duplicate `t` values are preserved, never deduplicated; overlapping
/// transparent volumes produce coincident entry/exit events that the
/// refraction bookkeeping must see.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    pub items: Vec<Intersection<'a>>,
}

impl<'a> Intersections<'a> {
    pub fn new() -> Intersections<'a> {
        Intersections { items: Vec::new() }
    }

    /// Builds a sorted list from arbitrary intersections.
    pub fn from_vec(items: Vec<Intersection<'a>>) -> Intersections<'a> {
        let mut xs = Intersections { items };
        xs.sort();
        xs
    }

    /// Appends another list, restoring the sort order.
    pub fn merge(&mut self, mut other: Intersections<'a>) {
        self.items.append(&mut other.items);
        self.sort();
    }

    /// Stable sort by `t`; NaN distances are left where the comparison
    /// abandons them and are skipped at hit selection.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b|
            a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal)
        );
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The visible hit: the first intersection at non-negative finite `t`.
    ///
    /// Returns `None` when every intersection lies behind the ray origin,
    /// rather than fabricating a placeholder the caller might forget to
    /// check.
    pub fn hit(&self) -> Option<Intersection<'a>> {
        self.items.iter()
            .find(|i| i.t.is_finite() && i.t >= 0.0)
            .copied()
    }
}

/// The shading frame derived from one hit.
///
/// Built from the hit, the original ray and the *full* sorted intersection
/// list; the list is required because the entering/exiting refractive
/// indices depend on every volume the ray is currently inside.
#[derive(Clone, Debug)]
pub struct Precomputation<'a> {
    pub t: f64,
    pub shape: &'a Shape,

    /// The world-space point where the hit occurs.
    pub point: Vec4,

    /// `point` nudged along the normal; origin for shadow and reflection
    /// rays so a surface cannot shade or reflect itself.
    pub over_point: Vec4,

    /// `point` nudged against the normal; origin for refraction rays.
    pub under_point: Vec4,

    /// Unit vector from the hit back toward the ray origin.
    pub eyev: Vec4,

    /// Surface normal, flipped toward the eye when the hit is inside.
    pub normalv: Vec4,

    /// The ray direction reflected about the (possibly flipped) normal.
    pub reflectv: Vec4,

    /// Whether the ray origin lies inside the shape.
    pub inside: bool,

    /// Refractive index of the medium being exited.
    pub n1: f64,

    /// Refractive index of the medium being entered.
    pub n2: f64,
}

impl<'a> Precomputation<'a> {
    pub fn new(hit: &Intersection<'a>, r: &Ray, xs: &Intersections<'a>)
        -> Precomputation<'a> {
        let t = hit.t;
        let shape = hit.shape;
        let point = r.position(t);
        let eyev = -r.direction;

        let mut normalv = shape.normal_at(point);
        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * SURFACE_EPSILON;
        let under_point = point - normalv * SURFACE_EPSILON;
        let reflectv = r.direction.reflect(&normalv);

        let (n1, n2) = Self::refractive_transition(hit, xs);

        Precomputation {
            t, shape,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// Derives the (exited, entered) refractive indices for the hit.
    ///
    /// Walks the sorted list nearest-first, maintaining the set of volumes
    /// the ray is currently inside; the innermost (most recently entered)
    /// volume controls the current index, and an empty set means vacuum.
    fn refractive_transition(hit: &Intersection<'a>, xs: &Intersections<'a>)
        -> (f64, f64) {
        let mut n1 = 1.0;
        let mut n2 = 1.0;

        // Shapes entered but not yet exited, in entry order.
        let mut containers: Vec<&'a Shape> = Vec::new();

        for i in xs.items.iter() {
            let is_hit = i == hit;

            if is_hit {
                n1 = containers.last()
                    .map_or(1.0, |s| s.material.refractive_index);
            }

            // An intersection with a contained shape is its exit event;
            // otherwise the ray is entering the shape here.
            if let Some(idx) = containers.iter()
                .position(|s| s.id() == i.shape.id()) {
                containers.remove(idx);
            } else {
                containers.push(i.shape);
            }

            if is_hit {
                n2 = containers.last()
                    .map_or(1.0, |s| s.material.refractive_index);
                break;
            }
        }

        (n1, n2)
    }

    /// The Schlick approximation of the Fresnel reflectance: the fraction
    /// of light reflected rather than refracted at this hit.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection is only possible leaving the denser
        // medium.
        if self.n1 > self.n2 {
            let ratio = self.n1 / self.n2;
            let sin2_t = ratio * ratio * (1.0 - cos * cos);
            if sin2_t > 1.0 {
                return 1.0;
            }

            // Use cos(theta_t) when n1 > n2.
            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

/* Tests */

#[cfg(test)]
use crate::consts::feq;
#[cfg(test)]
use crate::matrix::Mat4;
#[cfg(test)]
use crate::shape::IdAllocator;

#[test]
fn hit_with_all_positive_ts() {
    let s = Shape::sphere();
    let xs = Intersections::from_vec(vec![
        Intersection { t: 1.0, shape: &s },
        Intersection { t: 2.0, shape: &s },
    ]);

    assert_eq!(xs.hit().unwrap().t, 1.0);
}

#[test]
fn hit_skips_negative_ts() {
    let s = Shape::sphere();
    let xs = Intersections::from_vec(vec![
        Intersection { t: -1.0, shape: &s },
        Intersection { t: 1.0, shape: &s },
    ]);

    assert_eq!(xs.hit().unwrap().t, 1.0);
}

#[test]
fn no_hit_when_all_ts_negative() {
    let s = Shape::sphere();
    let xs = Intersections::from_vec(vec![
        Intersection { t: -2.0, shape: &s },
        Intersection { t: -1.0, shape: &s },
    ]);

    assert!(xs.hit().is_none());
}

#[test]
fn no_hit_in_empty_list() {
    assert!(Intersections::new().hit().is_none());
}

#[test]
fn hit_is_lowest_nonnegative_t() {
    let s = Shape::sphere();
    let xs = Intersections::from_vec(vec![
        Intersection { t: 5.0, shape: &s },
        Intersection { t: 7.0, shape: &s },
        Intersection { t: -3.0, shape: &s },
        Intersection { t: 2.0, shape: &s },
    ]);

    assert_eq!(xs.hit().unwrap().t, 2.0);
}

#[test]
fn precompute_outside_hit() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);
    let hit = xs.hit().unwrap();

    let comps = Precomputation::new(&hit, &r, &xs);
    assert_eq!(comps.t, 4.0);
    assert_eq!(comps.point, Vec4::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Vec4::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Vec4::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_hit_flips_normal() {
    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let xs = s.intersect(&r);
    let hit = xs.hit().unwrap();

    let comps = Precomputation::new(&hit, &r, &xs);
    assert_eq!(comps.point, Vec4::point(0.0, 0.0, 1.0));
    assert!(comps.inside);
    // Flipped from (0, 0, 1); the post-flip normal faces the eye.
    assert_eq!(comps.normalv, Vec4::vector(0.0, 0.0, -1.0));
    assert!(comps.normalv.dot(&comps.eyev) >= 0.0);
}

#[test]
fn over_point_sits_above_surface() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.transform = Mat4::translation(0.0, 0.0, 1.0);
    let xs = s.intersect(&r);
    let hit = xs.hit().unwrap();

    let comps = Precomputation::new(&hit, &r, &xs);
    assert!(comps.over_point.z < -SURFACE_EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
}

#[test]
fn under_point_sits_below_surface() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let mut s = Shape::glass_sphere();
    s.transform = Mat4::translation(0.0, 0.0, 1.0);
    let xs = s.intersect(&r);
    let hit = xs.hit().unwrap();

    let comps = Precomputation::new(&hit, &r, &xs);
    assert!(comps.under_point.z > SURFACE_EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precompute_reflection_vector() {
    let p = Shape::plane();
    let r = Ray::new(
        Vec4::point(0.0, 1.0, -1.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &p };
    let xs = Intersections::from_vec(vec![hit]);

    let comps = Precomputation::new(&hit, &r, &xs);
    assert_eq!(comps.reflectv,
        Vec4::vector(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
}

#[test]
fn refractive_indices_through_nested_glass_spheres() {
    // The classic containment fixture: a large glass sphere holding two
    // overlapping inner spheres of different indices.
    let mut ids = IdAllocator::new();

    let mut a = Shape::glass_sphere();
    a.transform = Mat4::scaling(2.0, 2.0, 2.0);
    a.material.refractive_index = 1.5;
    a.set_id(ids.allocate());

    let mut b = Shape::glass_sphere();
    b.transform = Mat4::translation(0.0, 0.0, -0.25);
    b.material.refractive_index = 2.0;
    b.set_id(ids.allocate());

    let mut c = Shape::glass_sphere();
    c.transform = Mat4::translation(0.0, 0.0, 0.25);
    c.material.refractive_index = 2.5;
    c.set_id(ids.allocate());

    let r = Ray::new(Vec4::point(0.0, 0.0, -4.0), Vec4::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from_vec(vec![
        Intersection { t: 2.0, shape: &a },
        Intersection { t: 2.75, shape: &b },
        Intersection { t: 3.25, shape: &c },
        Intersection { t: 4.75, shape: &b },
        Intersection { t: 5.25, shape: &c },
        Intersection { t: 6.0, shape: &a },
    ]);

    let expected = [
        (1.0, 1.5),
        (1.5, 2.0),
        (2.0, 2.5),
        (2.5, 2.5),
        (2.5, 1.5),
        (1.5, 1.0),
    ];

    for (i, (n1, n2)) in expected.iter().enumerate() {
        let hit = xs.items[i];
        let comps = Precomputation::new(&hit, &r, &xs);
        assert!(feq(comps.n1, *n1), "hit {}: n1 {} != {}", i, comps.n1, n1);
        assert!(feq(comps.n2, *n2), "hit {}: n2 {} != {}", i, comps.n2, n2);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let s = Shape::glass_sphere();
    let r = Ray::new(
        Vec4::point(0.0, 0.0, 2.0f64.sqrt() / 2.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );
    let xs = Intersections::from_vec(vec![
        Intersection { t: -(2.0f64.sqrt()) / 2.0, shape: &s },
        Intersection { t: 2.0f64.sqrt() / 2.0, shape: &s },
    ]);

    let hit = xs.items[1];
    let comps = Precomputation::new(&hit, &r, &xs);
    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_at_perpendicular_viewing_angle() {
    let s = Shape::glass_sphere();
    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from_vec(vec![
        Intersection { t: -1.0, shape: &s },
        Intersection { t: 1.0, shape: &s },
    ]);

    let hit = xs.items[1];
    let comps = Precomputation::new(&hit, &r, &xs);
    assert!(feq(comps.schlick(), 0.04));
}

#[test]
fn schlick_at_grazing_angle() {
    let s = Shape::glass_sphere();
    let r = Ray::new(Vec4::point(0.0, 0.99, -2.0), Vec4::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from_vec(vec![
        Intersection { t: 1.8589, shape: &s },
    ]);

    let hit = xs.items[0];
    let comps = Precomputation::new(&hit, &r, &xs);
    assert!(feq(comps.schlick(), 0.48873));
}
