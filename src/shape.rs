use crate::consts::FEQ_EPSILON;
use crate::intersect::{ Intersection, Intersections };
use crate::light::Material;
use crate::matrix::Mat4;
use crate::ray::Ray;
use crate::vector::Vec4;

/// The closed set of primitive geometries.
///
/// Each variant is defined in its own object space: the unit sphere and the
/// 2-unit cube sit at the origin, the plane spans XZ through the origin.
/// Placement comes entirely from the owning shape's transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Geometry {
    Sphere,
    Plane,
    Cube,
}

/// A renderable object: geometry, a world transform and a material.
///
/// Shapes carry a stable integer id used for equality and lookups; ids are
/// handed out by the `IdAllocator` of the world or scene that owns the
/// shape, never by ambient global state.
#[derive(Debug, Clone)]
pub struct Shape {
    pub geometry: Geometry,
    pub transform: Mat4,
    pub material: Material,

    id: u64,
}

impl PartialEq for Shape {
    fn eq(&self, other: &Shape) -> bool {
        self.geometry == other.geometry
            && self.transform == other.transform
            && self.material == other.material
    }
}

impl Shape {
    fn new(geometry: Geometry) -> Shape {
        Shape {
            geometry,
            transform: Mat4::identity(),
            material: Default::default(),
            id: 0,
        }
    }

    /// Creates a unit sphere with identity transform and default material.
    pub fn sphere() -> Shape {
        Shape::new(Geometry::Sphere)
    }

    /// Creates an XZ plane through the origin.
    pub fn plane() -> Shape {
        Shape::new(Geometry::Plane)
    }

    /// Creates a cube spanning -1 to 1 on every axis.
    pub fn cube() -> Shape {
        Shape::new(Geometry::Cube)
    }

    /// Creates a unit sphere of fully transparent glass.
    pub fn glass_sphere() -> Shape {
        let mut shape = Shape::sphere();
        shape.material = Material::glass();
        shape
    }

    /// The shape's stable identity token.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Intersects a world-space ray with this shape.
    ///
    /// The ray is carried into object space through the inverse transform;
    /// the returned `t` values remain parametric distances along the
    /// original world-space ray, so results from different shapes merge
    /// directly.
    pub fn intersect<'a>(&'a self, r: &Ray) -> Intersections<'a> {
        let inverse = self.transform.inverse().expect(
            "Shape transform should be invertible."
        );

        let local = r.transform(inverse);
        let ts = self.local_intersect(&local);

        Intersections::from_vec(
            ts.into_iter().map(|t| Intersection { t, shape: self }).collect()
        )
    }

    fn local_intersect(&self, r: &Ray) -> Vec<f64> {
        match self.geometry {
            Geometry::Sphere => {
                let sphere_to_ray = r.origin - Vec4::point(0.0, 0.0, 0.0);
                let a = r.direction.dot(&r.direction);
                let b = 2.0 * r.direction.dot(&sphere_to_ray);
                let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

                let discriminant = b * b - 4.0 * a * c;
                if discriminant < 0.0 {
                    return Vec::new();
                }

                let root = discriminant.sqrt();
                vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
            },

            Geometry::Plane => {
                // A ray parallel to the plane never crosses y == 0.
                if r.direction.y.abs() < FEQ_EPSILON {
                    return Vec::new();
                }

                vec![-r.origin.y / r.direction.y]
            },

            Geometry::Cube => {
                let (xmin, xmax) = Self::check_axis(r.origin.x, r.direction.x);
                let (ymin, ymax) = Self::check_axis(r.origin.y, r.direction.y);
                let (zmin, zmax) = Self::check_axis(r.origin.z, r.direction.z);

                let tmin = xmin.max(ymin).max(zmin);
                let tmax = xmax.min(ymax).min(zmax);

                if tmin > tmax {
                    return Vec::new();
                }

                vec![tmin, tmax]
            },
        }
    }

    /// Slab test for one cube axis.
    fn check_axis(origin: f64, direction: f64) -> (f64, f64) {
        let tmin_numerator = -1.0 - origin;
        let tmax_numerator = 1.0 - origin;

        let (tmin, tmax) = if direction.abs() >= FEQ_EPSILON {
            (tmin_numerator / direction, tmax_numerator / direction)
        } else {
            (
                tmin_numerator * std::f64::INFINITY,
                tmax_numerator * std::f64::INFINITY,
            )
        };

        if tmin > tmax {
            (tmax, tmin)
        } else {
            (tmin, tmax)
        }
    }

    /// The unit surface normal at a world-space point on this shape.
    pub fn normal_at(&self, world_point: Vec4) -> Vec4 {
        let inverse = self.transform.inverse().expect(
            "Shape transform should be invertible."
        );

        let local_point = inverse * world_point;
        let local_normal = self.local_normal_at(local_point);

        // Normals transform through the inverse transpose; the w component
        // is zeroed because translation has no meaning for directions.
        let mut world_normal = inverse.transpose() * local_normal;
        world_normal.w = 0.0;
        world_normal.normalize()
    }

    fn local_normal_at(&self, p: Vec4) -> Vec4 {
        match self.geometry {
            Geometry::Sphere => p - Vec4::point(0.0, 0.0, 0.0),

            Geometry::Plane => Vec4::vector(0.0, 1.0, 0.0),

            Geometry::Cube => {
                let max_component = p.x.abs().max(p.y.abs()).max(p.z.abs());
                if max_component == p.x.abs() {
                    Vec4::vector(p.x, 0.0, 0.0)
                } else if max_component == p.y.abs() {
                    Vec4::vector(0.0, p.y, 0.0)
                } else {
                    Vec4::vector(0.0, 0.0, p.z)
                }
            },
        }
    }
}

/// Hands out stable shape ids for one world or scene.
///
/// Owned by the constructing context and threaded explicitly; ids start at
/// 1 so that 0 marks a shape not yet registered anywhere.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> IdAllocator {
        IdAllocator { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> IdAllocator {
        Default::default()
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/* Tests */

#[test]
fn id_allocator_hands_out_sequential_ids() {
    let mut ids = IdAllocator::new();

    assert_eq!(ids.allocate(), 1);
    assert_eq!(ids.allocate(), 2);
    assert_eq!(Shape::sphere().id(), 0);
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    let xs = s.intersect(&r);
    assert_eq!(xs.len(), 2);
    assert_eq!(xs.items[0].t, 4.0);
    assert_eq!(xs.items[1].t, 6.0);
}

#[test]
fn ray_tangent_to_sphere() {
    let r = Ray::new(Vec4::point(0.0, 1.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    let xs = s.intersect(&r);
    assert_eq!(xs.len(), 2);
    assert_eq!(xs.items[0].t, 5.0);
    assert_eq!(xs.items[1].t, 5.0);
}

#[test]
fn ray_misses_sphere() {
    let r = Ray::new(Vec4::point(0.0, 2.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert!(s.intersect(&r).is_empty());
}

#[test]
fn ray_originates_inside_sphere() {
    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    let xs = s.intersect(&r);
    assert_eq!(xs.items[0].t, -1.0);
    assert_eq!(xs.items[1].t, 1.0);
}

#[test]
fn sphere_behind_ray() {
    let r = Ray::new(Vec4::point(0.0, 0.0, 5.0), Vec4::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    let xs = s.intersect(&r);
    assert_eq!(xs.items[0].t, -6.0);
    assert_eq!(xs.items[1].t, -4.0);
}

#[test]
fn intersect_scaled_sphere() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.transform = Mat4::scaling(2.0, 2.0, 2.0);

    let xs = s.intersect(&r);
    assert_eq!(xs.len(), 2);
    assert_eq!(xs.items[0].t, 3.0);
    assert_eq!(xs.items[1].t, 7.0);
}

#[test]
fn intersect_tiny_sphere() {
    // A 0.04 uniform scale has a determinant well under the comparison
    // epsilon; the transform must still invert and intersect normally.
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.transform = Mat4::scaling(0.04, 0.04, 0.04);

    let xs = s.intersect(&r);
    assert_eq!(xs.len(), 2);
    assert!(crate::consts::feq(xs.items[0].t, 4.96));
    assert!(crate::consts::feq(xs.items[1].t, 5.04));

    let n = s.normal_at(Vec4::point(0.0, 0.0, -0.04));
    assert_eq!(n, Vec4::vector(0.0, 0.0, -1.0));
}

#[test]
fn intersect_translated_sphere() {
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.transform = Mat4::translation(5.0, 0.0, 0.0);

    assert!(s.intersect(&r).is_empty());
}

#[test]
fn transformed_intersection_matches_inverse_transformed_ray() {
    // Intersecting a transformed shape must agree with intersecting the
    // unit shape against the inverse-transformed ray.
    let r = Ray::new(Vec4::point(0.0, 1.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let m = Mat4::translation(0.0, 1.0, 0.0) * Mat4::scaling(0.5, 0.5, 0.5);

    let mut transformed = Shape::sphere();
    transformed.transform = m;
    let unit = Shape::sphere();

    let direct = transformed.intersect(&r);
    let indirect = unit.intersect(&r.transform(m.inverse().unwrap()));

    assert_eq!(direct.len(), indirect.len());
    for (a, b) in direct.items.iter().zip(indirect.items.iter()) {
        assert!(crate::consts::feq(a.t, b.t));
    }
}

#[test]
fn ray_parallel_to_plane_misses() {
    let p = Shape::plane();
    let r = Ray::new(Vec4::point(0.0, 10.0, 0.0), Vec4::vector(0.0, 0.0, 1.0));

    assert!(p.intersect(&r).is_empty());
}

#[test]
fn coplanar_ray_misses_plane() {
    let p = Shape::plane();
    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 0.0, 1.0));

    assert!(p.intersect(&r).is_empty());
}

#[test]
fn ray_crosses_plane_from_above_and_below() {
    let p = Shape::plane();

    let above = Ray::new(
        Vec4::point(0.0, 1.0, 0.0), Vec4::vector(0.0, -1.0, 0.0));
    let xs = p.intersect(&above);
    assert_eq!(xs.len(), 1);
    assert_eq!(xs.items[0].t, 1.0);

    let below = Ray::new(
        Vec4::point(0.0, -1.0, 0.0), Vec4::vector(0.0, 1.0, 0.0));
    let xs = p.intersect(&below);
    assert_eq!(xs.len(), 1);
    assert_eq!(xs.items[0].t, 1.0);
}

#[test]
fn ray_intersects_cube_faces() {
    let c = Shape::cube();
    let cases = [
        (Vec4::point(5.0, 0.5, 0.0), Vec4::vector(-1.0, 0.0, 0.0), 4.0, 6.0),
        (Vec4::point(-5.0, 0.5, 0.0), Vec4::vector(1.0, 0.0, 0.0), 4.0, 6.0),
        (Vec4::point(0.5, 5.0, 0.0), Vec4::vector(0.0, -1.0, 0.0), 4.0, 6.0),
        (Vec4::point(0.5, -5.0, 0.0), Vec4::vector(0.0, 1.0, 0.0), 4.0, 6.0),
        (Vec4::point(0.5, 0.0, 5.0), Vec4::vector(0.0, 0.0, -1.0), 4.0, 6.0),
        (Vec4::point(0.5, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0), 4.0, 6.0),
        (Vec4::point(0.0, 0.5, 0.0), Vec4::vector(0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for (origin, direction, t1, t2) in cases.iter() {
        let xs = c.intersect(&Ray::new(*origin, *direction));
        assert_eq!(xs.len(), 2);
        assert_eq!(xs.items[0].t, *t1);
        assert_eq!(xs.items[1].t, *t2);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        (Vec4::point(-2.0, 0.0, 0.0), Vec4::vector(0.2673, 0.5345, 0.8018)),
        (Vec4::point(0.0, -2.0, 0.0), Vec4::vector(0.8018, 0.2673, 0.5345)),
        (Vec4::point(2.0, 0.0, 2.0), Vec4::vector(0.0, 0.0, -1.0)),
        (Vec4::point(2.0, 2.0, 0.0), Vec4::vector(-1.0, 0.0, 0.0)),
    ];

    for (origin, direction) in cases.iter() {
        assert!(c.intersect(&Ray::new(*origin, *direction)).is_empty());
    }
}

#[test]
fn sphere_normals() {
    let s = Shape::sphere();
    let root3over3 = 3.0f64.sqrt() / 3.0;

    assert_eq!(s.normal_at(Vec4::point(1.0, 0.0, 0.0)),
        Vec4::vector(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Vec4::point(root3over3, root3over3, root3over3)),
        Vec4::vector(root3over3, root3over3, root3over3));
}

#[test]
fn normal_on_translated_sphere() {
    let mut s = Shape::sphere();
    s.transform = Mat4::translation(0.0, 1.0, 0.0);

    let n = s.normal_at(Vec4::point(0.0, 1.70711, -0.70711));
    assert_eq!(n, Vec4::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_transformed_sphere() {
    let mut s = Shape::sphere();
    s.transform = Mat4::scaling(1.0, 0.5, 1.0)
        * Mat4::rotation_z(std::f64::consts::PI / 5.0);

    let n = s.normal_at(
        Vec4::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0)));
    assert_eq!(n, Vec4::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn plane_normal_is_constant() {
    let p = Shape::plane();
    let n = Vec4::vector(0.0, 1.0, 0.0);

    assert_eq!(p.normal_at(Vec4::point(0.0, 0.0, 0.0)), n);
    assert_eq!(p.normal_at(Vec4::point(10.0, 0.0, -10.0)), n);
    assert_eq!(p.normal_at(Vec4::point(-5.0, 0.0, 150.0)), n);
}

#[test]
fn cube_normals() {
    let c = Shape::cube();
    let cases = [
        (Vec4::point(1.0, 0.5, -0.8), Vec4::vector(1.0, 0.0, 0.0)),
        (Vec4::point(-1.0, -0.2, 0.9), Vec4::vector(-1.0, 0.0, 0.0)),
        (Vec4::point(-0.4, 1.0, -0.1), Vec4::vector(0.0, 1.0, 0.0)),
        (Vec4::point(0.3, -1.0, -0.7), Vec4::vector(0.0, -1.0, 0.0)),
        (Vec4::point(-0.6, 0.3, 1.0), Vec4::vector(0.0, 0.0, 1.0)),
        (Vec4::point(0.4, 0.4, -1.0), Vec4::vector(0.0, 0.0, -1.0)),
        (Vec4::point(1.0, 1.0, 1.0), Vec4::vector(1.0, 0.0, 0.0)),
    ];

    for (point, normal) in cases.iter() {
        assert_eq!(c.normal_at(*point), *normal);
    }
}

#[test]
fn glass_sphere_material() {
    let s = Shape::glass_sphere();

    assert_eq!(s.material.transparency, 1.0);
    assert_eq!(s.material.refractive_index, 1.5);
}
