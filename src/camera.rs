use crate::canvas::Canvas;
use crate::consts::MAX_BOUNCES;
use crate::matrix::Mat4;
use crate::ray::Ray;
use crate::vector::Vec4;
use crate::world::World;

/// A pinhole camera mapping canvas pixels to world-space rays.
///
/// The derived fields (`pixel_size`, `half_width`, `half_height`) are kept
/// consistent with the canvas dimensions and field of view; mutate those
/// through `set_size` and `set_field_of_view` so they stay in sync.
#[derive(Clone, Debug)]
pub struct Camera {
    pub hsize: usize,
    pub vsize: usize,
    pub transform: Mat4,

    field_of_view: f64,
    pixel_size: f64,
    half_width: f64,
    half_height: f64,
}

impl Camera {
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let mut camera = Camera {
            hsize,
            vsize,
            transform: Mat4::identity(),
            field_of_view,
            pixel_size: 0.0,
            half_width: 0.0,
            half_height: 0.0,
        };
        camera.update_pixel_geometry();

        camera
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// Resizes the canvas, recomputing the derived pixel geometry.
    pub fn set_size(&mut self, hsize: usize, vsize: usize) {
        self.hsize = hsize;
        self.vsize = vsize;
        self.update_pixel_geometry();
    }

    /// Changes the field of view, recomputing the derived pixel geometry.
    pub fn set_field_of_view(&mut self, field_of_view: f64) {
        self.field_of_view = field_of_view;
        self.update_pixel_geometry();
    }

    fn update_pixel_geometry(&mut self) {
        let half_view = (self.field_of_view / 2.0).tan();
        let aspect = (self.hsize as f64) / (self.vsize as f64);

        if aspect >= 1.0 {
            self.half_width = half_view;
            self.half_height = half_view / aspect;
        } else {
            self.half_width = half_view * aspect;
            self.half_height = half_view;
        }

        self.pixel_size = (self.half_width * 2.0) / (self.hsize as f64);
    }

    /// The world-space ray passing through the center of pixel (x, y).
    pub fn ray_for_pixel(&self, x: usize, y: usize) -> Ray {
        // Offsets from the canvas edge to the pixel center.
        let x_offset = ((x as f64) + 0.5) * self.pixel_size;
        let y_offset = ((y as f64) + 0.5) * self.pixel_size;

        // The untransformed canvas sits at z = -1 with +x to the left.
        let world_x = self.half_width - x_offset;
        let world_y = self.half_height - y_offset;

        let inverse = self.transform.inverse()
            .expect("Camera transform should be invertible.");
        let pixel = inverse * Vec4::point(world_x, world_y, -1.0);
        let origin = inverse * Vec4::point(0.0, 0.0, 0.0);
        let direction = (pixel - origin).normalize();

        Ray::new(origin, direction)
    }

    /// Renders the world on a single thread, pixel by pixel.
    pub fn render(&self, world: &World) -> Canvas {
        self.render_with_bounces(world, MAX_BOUNCES)
    }

    /// Single-threaded render with an explicit bounce budget.
    pub fn render_with_bounces(&self, world: &World, bounces: usize)
        -> Canvas {
        let mut canvas = Canvas::new(self.hsize, self.vsize);
        for y in 0..self.vsize {
            for x in 0..self.hsize {
                let ray = self.ray_for_pixel(x, y);
                let color = world.color_at(&ray, bounces);
                canvas.write_pixel(x, y, &color);
            }
        }

        canvas
    }
}

/* Tests */

#[cfg(test)]
use crate::color::Color;
#[cfg(test)]
use crate::consts::feq;
#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn pixel_size_for_horizontal_canvas() {
    let c = Camera::new(200, 125, PI / 2.0);
    assert!(feq(c.pixel_size(), 0.01));
}

#[test]
fn pixel_size_for_vertical_canvas() {
    let c = Camera::new(125, 200, PI / 2.0);
    assert!(feq(c.pixel_size(), 0.01));
}

#[test]
fn resizing_updates_pixel_geometry() {
    let mut c = Camera::new(200, 125, PI / 2.0);
    c.set_size(125, 200);
    assert!(feq(c.pixel_size(), 0.01));
}

#[test]
fn ray_through_canvas_center() {
    let c = Camera::new(201, 101, PI / 2.0);
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Vec4::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Vec4::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_canvas_corner() {
    let c = Camera::new(201, 101, PI / 2.0);
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Vec4::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Vec4::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_with_transformed_camera() {
    let mut c = Camera::new(201, 101, PI / 2.0);
    c.transform = Mat4::rotation_y(PI / 4.0)
        * Mat4::translation(0.0, -2.0, 5.0);
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Vec4::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Vec4::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt()) / 2.0));
}

#[test]
fn render_default_world() {
    let w: World = Default::default();
    let mut c = Camera::new(11, 11, PI / 2.0);
    c.transform = Mat4::view_transform(
        Vec4::point(0.0, 0.0, -5.0),
        Vec4::point(0.0, 0.0, 0.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    let image = c.render(&w);
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
