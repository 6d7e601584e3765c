use std::ops::{ Index, IndexMut, Mul };

use crate::consts::feq;
use crate::vector::Vec4;

/// A 4-by-4 transformation matrix in row-major order.
#[derive(Debug, Copy, Clone)]
pub struct Mat4 {
    rows: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Mat4 {
        Mat4::identity()
    }
}

impl PartialEq for Mat4 {
    fn eq(&self, other: &Mat4) -> bool {
        for r in 0..4 {
            for c in 0..4 {
                if !feq(self.rows[r][c], other.rows[r][c]) {
                    return false;
                }
            }
        }

        true
    }
}

impl From<[[f64; 4]; 4]> for Mat4 {
    fn from(rows: [[f64; 4]; 4]) -> Mat4 {
        Mat4 { rows }
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.rows[row][col]
    }
}

impl IndexMut<(usize, usize)> for Mat4 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.rows[row][col]
    }
}

/// Determinant of a 3-by-3 submatrix, expanded along its first row.
fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

impl Mat4 {
    pub fn identity() -> Mat4 {
        Mat4 {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Mat4 {
        Mat4 {
            rows: [
                [1.0, 0.0, 0.0, x],
                [0.0, 1.0, 0.0, y],
                [0.0, 0.0, 1.0, z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Mat4 {
        Mat4 {
            rows: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_x(r: f64) -> Mat4 {
        let (sin, cos) = r.sin_cos();
        Mat4 {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, cos, -sin, 0.0],
                [0.0, sin, cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_y(r: f64) -> Mat4 {
        let (sin, cos) = r.sin_cos();
        Mat4 {
            rows: [
                [cos, 0.0, sin, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-sin, 0.0, cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_z(r: f64) -> Mat4 {
        let (sin, cos) = r.sin_cos();
        Mat4 {
            rows: [
                [cos, -sin, 0.0, 0.0],
                [sin, cos, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Mat4 {
        Mat4 {
            rows: [
                [1.0, xy, xz, 0.0],
                [yx, 1.0, yz, 0.0],
                [zx, zy, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Builds the world-to-camera orientation for an eye at `from` looking
    /// at `to`, with `up` fixing the roll.
    pub fn view_transform(from: Vec4, to: Vec4, up: Vec4) -> Mat4 {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation = Mat4 {
            rows: [
                [left.x, left.y, left.z, 0.0],
                [true_up.x, true_up.y, true_up.z, 0.0],
                [-forward.x, -forward.y, -forward.z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };

        orientation * Mat4::translation(-from.x, -from.y, -from.z)
    }

    pub fn transpose(&self) -> Mat4 {
        let mut out = Mat4::identity();
        for r in 0..4 {
            for c in 0..4 {
                out.rows[c][r] = self.rows[r][c];
            }
        }

        out
    }

    /// The 3-by-3 minor left after deleting `row` and `col`.
    fn minor(&self, row: usize, col: usize) -> f64 {
        let mut sub = [[0.0; 3]; 3];
        let mut sr = 0;
        for r in 0..4 {
            if r == row {
                continue;
            }

            let mut sc = 0;
            for c in 0..4 {
                if c == col {
                    continue;
                }
                sub[sr][sc] = self.rows[r][c];
                sc += 1;
            }
            sr += 1;
        }

        det3(sub)
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        if (row + col) % 2 == 0 {
            self.minor(row, col)
        } else {
            -self.minor(row, col)
        }
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self.rows[0][c] * self.cofactor(0, c)).sum()
    }

    /// Inverts this matrix via the cofactor expansion.
    ///
    /// Returns `None` for singular matrices. Scenes must only carry
    /// invertible transforms; callers on the render path treat `None` as a
    /// fatal precondition violation.
    ///
    /// Singularity is an exact zero determinant; a small determinant (a
    /// tiny but valid scaling, say) still inverts.
    pub fn inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }

        let mut out = Mat4::identity();
        for r in 0..4 {
            for c in 0..4 {
                // Transposed assignment inverts in one pass.
                out.rows[c][r] = self.cofactor(r, c) / det;
            }
        }

        Some(out)
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, other: Mat4) -> Mat4 {
        let mut out = Mat4::identity();
        for r in 0..4 {
            for c in 0..4 {
                out.rows[r][c] = (0..4)
                    .map(|k| self.rows[r][k] * other.rows[k][c])
                    .sum();
            }
        }

        out
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Vec4 {
        let row = |r: usize| {
            self.rows[r][0] * v.x
                + self.rows[r][1] * v.y
                + self.rows[r][2] * v.z
                + self.rows[r][3] * v.w
        };

        Vec4::tuple(row(0), row(1), row(2), row(3))
    }
}

/* Tests */

#[test]
fn multiply_matrices() {
    let a: Mat4 = [
        [1.0, 2.0, 3.0, 4.0],
        [5.0, 6.0, 7.0, 8.0],
        [9.0, 8.0, 7.0, 6.0],
        [5.0, 4.0, 3.0, 2.0],
    ].into();
    let b: Mat4 = [
        [-2.0, 1.0, 2.0, 3.0],
        [3.0, 2.0, 1.0, -1.0],
        [4.0, 3.0, 6.0, 5.0],
        [1.0, 2.0, 7.0, 8.0],
    ].into();

    let expected: Mat4 = [
        [20.0, 22.0, 50.0, 48.0],
        [44.0, 54.0, 114.0, 108.0],
        [40.0, 58.0, 110.0, 102.0],
        [16.0, 26.0, 46.0, 42.0],
    ].into();

    assert_eq!(a * b, expected);
}

#[test]
fn multiply_by_identity() {
    let a: Mat4 = [
        [0.0, 1.0, 2.0, 4.0],
        [1.0, 2.0, 4.0, 8.0],
        [2.0, 4.0, 8.0, 16.0],
        [4.0, 8.0, 16.0, 32.0],
    ].into();

    assert_eq!(a * Mat4::identity(), a);
}

#[test]
fn multiply_by_tuple() {
    let a: Mat4 = [
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 4.0, 4.0, 2.0],
        [8.0, 6.0, 4.0, 1.0],
        [0.0, 0.0, 0.0, 1.0],
    ].into();
    let p = Vec4::point(1.0, 2.0, 3.0);

    assert_eq!(a * p, Vec4::point(18.0, 24.0, 33.0));
}

#[test]
fn transpose_matrix() {
    let a: Mat4 = [
        [0.0, 9.0, 3.0, 0.0],
        [9.0, 8.0, 0.0, 8.0],
        [1.0, 8.0, 5.0, 3.0],
        [0.0, 0.0, 5.0, 8.0],
    ].into();
    let expected: Mat4 = [
        [0.0, 9.0, 1.0, 0.0],
        [9.0, 8.0, 8.0, 0.0],
        [3.0, 0.0, 5.0, 5.0],
        [0.0, 8.0, 3.0, 5.0],
    ].into();

    assert_eq!(a.transpose(), expected);
}

#[test]
fn determinant_of_4x4() {
    let a: Mat4 = [
        [-2.0, -8.0, 3.0, 5.0],
        [-3.0, 1.0, 7.0, 3.0],
        [1.0, 2.0, -9.0, 6.0],
        [-6.0, 7.0, 7.0, -9.0],
    ].into();

    assert!(feq(a.determinant(), -4071.0));
}

#[test]
fn singular_matrix_has_no_inverse() {
    let a: Mat4 = [
        [-4.0, 2.0, -2.0, -3.0],
        [9.0, 6.0, 2.0, 6.0],
        [0.0, -5.0, 1.0, -5.0],
        [0.0, 0.0, 0.0, 0.0],
    ].into();

    assert!(a.inverse().is_none());
}

#[test]
fn small_determinant_is_not_singular() {
    // det 6.4e-5 sits below the geometric comparison tolerance but the
    // matrix is perfectly invertible.
    let a = Mat4::scaling(0.04, 0.04, 0.04);

    let inv = a.inverse().unwrap();
    assert_eq!(inv * a, Mat4::identity());
}

#[test]
fn inverse_matrix() {
    let a: Mat4 = [
        [-5.0, 2.0, 6.0, -8.0],
        [1.0, -5.0, 1.0, 8.0],
        [7.0, 7.0, -6.0, -7.0],
        [1.0, -3.0, 7.0, 4.0],
    ].into();
    let expected: Mat4 = [
        [0.21805, 0.45113, 0.24060, -0.04511],
        [-0.80827, -1.45677, -0.44361, 0.52068],
        [-0.07895, -0.22368, -0.05263, 0.19737],
        [-0.52256, -0.81391, -0.30075, 0.30639],
    ].into();

    assert_eq!(a.inverse().unwrap(), expected);
}

#[test]
fn multiply_product_by_inverse_recovers_operand() {
    let a: Mat4 = [
        [3.0, -9.0, 7.0, 3.0],
        [3.0, -8.0, 2.0, -9.0],
        [-4.0, 4.0, 4.0, 1.0],
        [-6.0, 5.0, -1.0, 1.0],
    ].into();
    let b: Mat4 = [
        [8.0, 2.0, 2.0, 2.0],
        [3.0, -1.0, 7.0, 0.0],
        [7.0, 0.0, 5.0, 4.0],
        [6.0, -2.0, 0.0, 5.0],
    ].into();

    let c = a * b;
    assert_eq!(c * b.inverse().unwrap(), a);
}

#[test]
fn translation_moves_points_not_vectors() {
    let t = Mat4::translation(5.0, -3.0, 2.0);

    assert_eq!(t * Vec4::point(-3.0, 4.0, 5.0), Vec4::point(2.0, 1.0, 7.0));
    assert_eq!(t * Vec4::vector(-3.0, 4.0, 5.0),
        Vec4::vector(-3.0, 4.0, 5.0));
}

#[test]
fn scaling_applies_to_vectors() {
    let s = Mat4::scaling(2.0, 3.0, 4.0);

    assert_eq!(s * Vec4::vector(-4.0, 6.0, 8.0),
        Vec4::vector(-8.0, 18.0, 32.0));
}

#[test]
fn rotate_point_around_x() {
    let p = Vec4::point(0.0, 1.0, 0.0);
    let half_quarter = Mat4::rotation_x(std::f64::consts::PI / 4.0);
    let full_quarter = Mat4::rotation_x(std::f64::consts::PI / 2.0);

    assert_eq!(half_quarter * p,
        Vec4::point(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
    assert_eq!(full_quarter * p, Vec4::point(0.0, 0.0, 1.0));
}

#[test]
fn rotate_point_around_y() {
    let p = Vec4::point(0.0, 0.0, 1.0);
    let full_quarter = Mat4::rotation_y(std::f64::consts::PI / 2.0);

    assert_eq!(full_quarter * p, Vec4::point(1.0, 0.0, 0.0));
}

#[test]
fn rotate_point_around_z() {
    let p = Vec4::point(0.0, 1.0, 0.0);
    let full_quarter = Mat4::rotation_z(std::f64::consts::PI / 2.0);

    assert_eq!(full_quarter * p, Vec4::point(-1.0, 0.0, 0.0));
}

#[test]
fn shearing_moves_x_in_proportion_to_y() {
    let s = Mat4::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    assert_eq!(s * Vec4::point(2.0, 3.0, 4.0), Vec4::point(5.0, 3.0, 4.0));
}

#[test]
fn default_view_transform_is_identity() {
    let t = Mat4::view_transform(
        Vec4::point(0.0, 0.0, 0.0),
        Vec4::point(0.0, 0.0, -1.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(t, Mat4::identity());
}

#[test]
fn view_transform_looking_backwards_mirrors() {
    let t = Mat4::view_transform(
        Vec4::point(0.0, 0.0, 0.0),
        Vec4::point(0.0, 0.0, 1.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(t, Mat4::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn view_transform_moves_the_world() {
    let t = Mat4::view_transform(
        Vec4::point(0.0, 0.0, 8.0),
        Vec4::point(0.0, 0.0, 0.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(t, Mat4::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view_transform() {
    let t = Mat4::view_transform(
        Vec4::point(1.0, 3.0, 2.0),
        Vec4::point(4.0, -2.0, 8.0),
        Vec4::vector(1.0, 1.0, 0.0),
    );
    let expected: Mat4 = [
        [-0.50709, 0.50709, 0.67612, -2.36643],
        [0.76772, 0.60609, 0.12122, -2.82843],
        [-0.35857, 0.59761, -0.71714, 0.00000],
        [0.00000, 0.00000, 0.00000, 1.00000],
    ].into();

    assert_eq!(t, expected);
}
