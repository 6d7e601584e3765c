use crate::color::Color;
use crate::matrix::Mat4;
use crate::shape::Shape;
use crate::vector::Vec4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PatternKind {
    /// Alternating bands along the X axis.
    Stripe(Color, Color),

    /// Linear blend from the first color to the second along X.
    Gradient(Color, Color),

    /// Concentric rings in the XZ plane.
    Ring(Color, Color),

    /// A 3D checkerboard with unit cells.
    Checker(Color, Color),
}

/// A procedural surface pattern.
///
/// Patterns override a material's flat color. Each pattern carries its own
/// transform so it can be scaled, rotated or slid independently of the
/// shape it decorates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub transform: Mat4,
}

impl Pattern {
    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern { kind: PatternKind::Stripe(a, b), transform: Mat4::identity() }
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern { kind: PatternKind::Gradient(a, b), transform: Mat4::identity() }
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern { kind: PatternKind::Ring(a, b), transform: Mat4::identity() }
    }

    pub fn checker(a: Color, b: Color) -> Pattern {
        Pattern { kind: PatternKind::Checker(a, b), transform: Mat4::identity() }
    }

    /// Samples the pattern at a point already in pattern space.
    pub fn color_at(&self, p: Vec4) -> Color {
        match self.kind {
            PatternKind::Stripe(a, b) => {
                if p.x.floor().rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            },

            PatternKind::Gradient(a, b) => {
                a + (b - a) * (p.x - p.x.floor())
            },

            PatternKind::Ring(a, b) => {
                let radial = (p.x * p.x + p.z * p.z).sqrt();
                if radial.floor().rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            },

            PatternKind::Checker(a, b) => {
                let cell = p.x.floor() + p.y.floor() + p.z.floor();
                if cell.rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            },
        }
    }

    /// Samples the pattern at a world-space point on a shape, applying the
    /// shape transform and then the pattern transform.
    pub fn color_at_object(&self, shape: &Shape, world_point: Vec4) -> Color {
        let object_point = shape.transform.inverse()
            .expect("Shape transform should be invertible.") * world_point;
        let pattern_point = self.transform.inverse()
            .expect("Pattern transform should be invertible.") * object_point;

        self.color_at(pattern_point)
    }
}

/* Tests */

#[test]
fn stripes_alternate_along_x_only() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 1.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 2.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.9, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(-0.1, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(-1.1, 0.0, 0.0)), Color::white());
}

#[test]
fn gradient_interpolates_linearly() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.color_at(Vec4::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.color_at(Vec4::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn rings_extend_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 1.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn checkers_repeat_in_all_dimensions() {
    let pattern = Pattern::checker(Color::white(), Color::black());

    assert_eq!(pattern.color_at(Vec4::point(0.99, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(1.01, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.99, 0.0)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 1.01, 0.0)), Color::black());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 0.99)), Color::white());
    assert_eq!(pattern.color_at(Vec4::point(0.0, 0.0, 1.01)), Color::black());
}

#[test]
fn pattern_follows_object_transform() {
    use crate::matrix::Mat4;

    let mut shape = Shape::sphere();
    shape.transform = Mat4::scaling(2.0, 2.0, 2.0);
    let pattern = Pattern::stripe(Color::white(), Color::black());

    let c = pattern.color_at_object(&shape, Vec4::point(1.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}

#[test]
fn pattern_has_its_own_transform() {
    use crate::matrix::Mat4;

    let shape = Shape::sphere();
    let mut pattern = Pattern::stripe(Color::white(), Color::black());
    pattern.transform = Mat4::scaling(2.0, 2.0, 2.0);

    let c = pattern.color_at_object(&shape, Vec4::point(1.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}

#[test]
fn object_and_pattern_transforms_compose() {
    use crate::matrix::Mat4;

    let mut shape = Shape::sphere();
    shape.transform = Mat4::scaling(2.0, 2.0, 2.0);
    let mut pattern = Pattern::stripe(Color::white(), Color::black());
    pattern.transform = Mat4::translation(0.5, 0.0, 0.0);

    let c = pattern.color_at_object(&shape, Vec4::point(2.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}
