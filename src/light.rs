use crate::color::Color;
use crate::consts::{ GLASS_IOR, VACUUM_IOR };
use crate::pattern::Pattern;
use crate::shape::Shape;
use crate::vector::Vec4;

/// A point light: a position radiating light of a fixed intensity.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Vec4,
}

impl PointLight {
    /// Creates a point light, coercing `position` to a point if needed.
    pub fn new(intensity: Color, mut position: Vec4) -> PointLight {
        if !position.is_point() {
            position.w = 1.0;
        }

        PointLight { intensity, position }
    }
}

/// Phong-family surface attributes.
///
/// `reflective` and `transparency` are independent sliders; a surface may
/// be both at once, in which case the shader blends the two contributions
/// with the Schlick reflectance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: VACUUM_IOR,
        }
    }
}

impl Material {
    /// A fully transparent glass material.
    pub fn glass() -> Material {
        Material {
            transparency: 1.0,
            refractive_index: GLASS_IOR,
            ..Default::default()
        }
    }
}

/// Computes the local (ambient + diffuse + specular) color at a point.
///
/// `attenuation` is the shadow attenuation in [0, 1] for the light being
/// evaluated: 0 means fully lit, 1 means fully occluded. Ambient light is
/// unaffected by shadowing; diffuse and specular terms are scaled by
/// `1 - attenuation`, so partially transparent occluders dim rather than
/// erase them.
pub fn lighting(shape: &Shape, light: &PointLight, point: Vec4,
    eyev: Vec4, normalv: Vec4, attenuation: f64) -> Color {
    let m = &shape.material;

    let color = if let Some(pattern) = m.pattern {
        pattern.color_at_object(shape, point)
    } else {
        m.color
    };

    // Surface color filtered through the light's intensity.
    let effective_color = color * light.intensity;
    let ambient = effective_color * m.ambient;

    let visibility = 1.0 - attenuation;
    if visibility <= 0.0 {
        return ambient;
    }

    let lightv = (light.position - point).normalize();

    let diffuse;
    let specular;

    // A negative cosine means the light is on the other side of the surface.
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        diffuse = Color::black();
        specular = Color::black();
    } else {
        diffuse = effective_color * m.diffuse * light_dot_normal * visibility;

        let reflectv = (-lightv).reflect(&normalv);
        let reflect_dot_eye = reflectv.dot(&eyev);

        if reflect_dot_eye <= 0.0 {
            specular = Color::black();
        } else {
            let factor = reflect_dot_eye.powf(m.shininess);
            specular = light.intensity * m.specular * factor * visibility;
        }
    }

    ambient + diffuse + specular
}

/* Tests */

#[cfg(test)]
fn lighting_fixture() -> (Shape, Vec4) {
    (Shape::sphere(), Vec4::point(0.0, 0.0, 0.0))
}

#[test]
fn eye_between_light_and_surface() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 0.0);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_offset_45_degrees() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0));
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 0.0);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn light_offset_45_degrees() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 10.0, -10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 0.0);
    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn eye_in_path_of_reflection() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, -(2.0f64.sqrt()) / 2.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 10.0, -10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 0.0);
    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, 10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 0.0);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn full_occlusion_leaves_only_ambient() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    let res = lighting(&s, &light, position, eyev, normalv, 1.0);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn partial_occlusion_scales_diffuse_and_specular() {
    let (s, position) = lighting_fixture();
    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    // Fully lit this configuration yields 1.9; ambient (0.1) is exempt from
    // attenuation while diffuse and specular (0.9 each) are halved.
    let res = lighting(&s, &light, position, eyev, normalv, 0.5);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn lighting_samples_pattern() {
    let mut s = Shape::sphere();
    s.material.pattern = Some(Pattern::stripe(Color::white(), Color::black()));
    s.material.ambient = 1.0;
    s.material.diffuse = 0.0;
    s.material.specular = 0.0;

    let eyev = Vec4::vector(0.0, 0.0, -1.0);
    let normalv = Vec4::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    let c1 = lighting(&s, &light, Vec4::point(0.9, 0.0, 0.0),
        eyev, normalv, 0.0);
    let c2 = lighting(&s, &light, Vec4::point(1.1, 0.0, 0.0),
        eyev, normalv, 0.0);

    assert_eq!(c1, Color::white());
    assert_eq!(c2, Color::black());
}
