use std::fs::File;
use std::io::{ self, Write };
use std::path::Path;

use crate::color::Color;

/// The output raster.
///
/// Pixels accumulate here during a render; `save` clamps them to 8-bit
/// channels and writes a plain-text PPM file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height],
        }
    }

    /// Writes a color at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[y * self.width + x] = *color;
    }

    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[y * self.width + x])
    }

    /// Renders the canvas as a P3 PPM document.
    ///
    /// Channel values are scaled to 0..=255 and lines are wrapped before the
    /// 70-column mark, which some PPM readers require.
    pub fn to_ppm(&self) -> String {
        let mut out = format!("P3\n{} {}\n255\n", self.width, self.height);

        let mut line = String::new();
        for pixel in self.pixels.iter() {
            for channel in [pixel.r, pixel.g, pixel.b].iter() {
                let scaled = (channel * 255.0).round().clamp(0.0, 255.0);
                let token = format!("{}", scaled as u8);

                if line.is_empty() {
                    line.push_str(&token);
                } else if line.len() + 1 + token.len() > 70 {
                    out.push_str(&line);
                    out.push('\n');
                    line = token;
                } else {
                    line.push(' ');
                    line.push_str(&token);
                }
            }
        }

        if !line.is_empty() {
            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_ppm().as_bytes())
    }
}

/* Tests */

#[test]
fn new_canvas_is_black() {
    let canvas = Canvas::new(10, 20);

    assert_eq!(canvas.width, 10);
    assert_eq!(canvas.height, 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(canvas.read_pixel(x, y).unwrap(), Color::black());
        }
    }
}

#[test]
fn write_and_read_pixel() {
    let red = Color::rgb(1.0, 0.0, 0.0);
    let mut canvas = Canvas::new(10, 20);

    canvas.write_pixel(2, 3, &red);
    assert_eq!(canvas.read_pixel(2, 3).unwrap(), red);
}

#[test]
fn out_of_bounds_reads_and_writes() {
    let mut canvas = Canvas::new(4, 4);

    canvas.write_pixel(10, 10, &Color::white());
    assert_eq!(canvas.read_pixel(10, 10), None);
}

#[test]
fn ppm_header() {
    let canvas = Canvas::new(5, 3);
    let ppm = canvas.to_ppm();
    let mut lines = ppm.lines();

    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("5 3"));
    assert_eq!(lines.next(), Some("255"));
}

#[test]
fn ppm_clamps_channels() {
    let mut canvas = Canvas::new(2, 1);
    canvas.write_pixel(0, 0, &Color::rgb(1.5, 0.0, -0.5));
    canvas.write_pixel(1, 0, &Color::rgb(0.0, 0.5, 0.0));

    let ppm = canvas.to_ppm();
    let body: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(body.join(" "), "255 0 0 0 128 0");
}

#[test]
fn ppm_wraps_long_lines() {
    let mut canvas = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            canvas.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    for line in canvas.to_ppm().lines() {
        assert!(line.len() <= 70);
    }
}
