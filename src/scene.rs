use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use serde::{ Serialize, Deserialize };

use crate::camera::Camera;
use crate::color::Color;
use crate::light::{ Material, PointLight };
use crate::matrix::Mat4;
use crate::pattern::Pattern;
use crate::shape::Shape;
use crate::vector::Vec4;
use crate::world::World;

/// A fully assembled scene: world contents plus the camera observing them.
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Loads and assembles a scene from a JSON description file.
    pub fn load(path: &Path) -> Result<Scene, SceneError> {
        let text = fs::read_to_string(path)?;
        let scene_json: SceneJson = serde_json::from_str(&text)?;

        debug!("loaded scene with {} objects and {} lights",
            scene_json.objects.len(), scene_json.lights.len());

        Ok(scene_json.into())
    }
}

/// Errors raised while reading or decoding a scene file.
#[derive(Debug)]
pub enum SceneError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneError::Io(err) => write!(f, "could not read scene: {}", err),
            SceneError::Parse(err) => write!(f, "invalid scene: {}", err),
        }
    }
}

impl error::Error for SceneError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SceneError::Io(err) => Some(err),
            SceneError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for SceneError {
    fn from(err: io::Error) -> SceneError {
        SceneError::Io(err)
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> SceneError {
        SceneError::Parse(err)
    }
}

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    camera: CameraJson,
    lights: Vec<LightJson>,
    objects: Vec<ObjectJson>,
}

#[derive(Serialize, Deserialize)]
struct CameraJson {
    width: usize,
    height: usize,
    field_of_view: f64,

    from: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
}

#[derive(Clone, Serialize, Deserialize)]
struct LightJson {
    intensity: [f64; 3],
    position: [f64; 3],
}

#[derive(Clone, Serialize, Deserialize)]
struct ObjectJson {
    shape: ShapeKindJson,

    #[serde(default)]
    transform: Vec<TransformJson>,

    #[serde(default)]
    material: MaterialJson,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShapeKindJson {
    Sphere,
    GlassSphere,
    Plane,
    Cube,
}

/// One step of an object or pattern transform.
///
/// Steps are applied to the object in the order they are listed, so each
/// later step multiplies on the left of the accumulated matrix.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TransformJson {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Shear([f64; 6]),
}

/// Material fields are all optional: an absent field keeps the shape's
/// base material value, while an explicit value always wins, even when it
/// happens to equal a default.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct MaterialJson {
    color: Option<[f64; 3]>,
    pattern: Option<PatternJson>,

    ambient: Option<f64>,
    diffuse: Option<f64>,
    specular: Option<f64>,
    shininess: Option<f64>,

    reflective: Option<f64>,
    transparency: Option<f64>,
    refractive_index: Option<f64>,
}

#[derive(Clone, Serialize, Deserialize)]
struct PatternJson {
    kind: PatternKindJson,
    first: [f64; 3],
    second: [f64; 3],

    #[serde(default)]
    transform: Vec<TransformJson>,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PatternKindJson {
    Stripe,
    Gradient,
    Ring,
    Checker,
}

fn color_of(rgb: [f64; 3]) -> Color {
    Color::rgb(rgb[0], rgb[1], rgb[2])
}

fn compose_transform(steps: &[TransformJson]) -> Mat4 {
    let mut transform = Mat4::identity();
    for step in steps {
        let m = match *step {
            TransformJson::Translate([x, y, z]) => Mat4::translation(x, y, z),
            TransformJson::Scale([x, y, z]) => Mat4::scaling(x, y, z),
            TransformJson::RotateX(r) => Mat4::rotation_x(r),
            TransformJson::RotateY(r) => Mat4::rotation_y(r),
            TransformJson::RotateZ(r) => Mat4::rotation_z(r),
            TransformJson::Shear([xy, xz, yx, yz, zx, zy]) =>
                Mat4::shearing(xy, xz, yx, yz, zx, zy),
        };

        transform = m * transform;
    }

    transform
}

impl From<SceneJson> for Scene {
    fn from(scene_json: SceneJson) -> Scene {
        let mut camera = Camera::new(
            scene_json.camera.width,
            scene_json.camera.height,
            scene_json.camera.field_of_view,
        );

        let [fx, fy, fz] = scene_json.camera.from;
        let [tx, ty, tz] = scene_json.camera.to;
        let [ux, uy, uz] = scene_json.camera.up;
        camera.transform = Mat4::view_transform(
            Vec4::point(fx, fy, fz),
            Vec4::point(tx, ty, tz),
            Vec4::vector(ux, uy, uz),
        );

        let lights = scene_json.lights.into_iter().map(|light| {
            let [px, py, pz] = light.position;
            PointLight::new(color_of(light.intensity),
                Vec4::point(px, py, pz))
        }).collect();

        let objects = scene_json.objects.into_iter()
            .map(|object| object.into())
            .collect();

        Scene { world: World::with(lights, objects), camera }
    }
}

impl From<ObjectJson> for Shape {
    fn from(object_json: ObjectJson) -> Shape {
        let mut shape = match object_json.shape {
            ShapeKindJson::Sphere => Shape::sphere(),
            ShapeKindJson::GlassSphere => Shape::glass_sphere(),
            ShapeKindJson::Plane => Shape::plane(),
            ShapeKindJson::Cube => Shape::cube(),
        };

        shape.transform = compose_transform(&object_json.transform);

        // The material overlay starts from glass for glass spheres.
        let base_material = match object_json.shape {
            ShapeKindJson::GlassSphere => Material::glass(),
            _ => Material::default(),
        };
        shape.material = object_json.material
            .into_material(base_material);

        shape
    }
}

impl MaterialJson {
    /// Overlays the fields present in the JSON onto `base`.
    fn into_material(self, base: Material) -> Material {
        let mut material = base;

        if let Some(color) = self.color {
            material.color = color_of(color);
        }
        if let Some(pattern) = self.pattern {
            material.pattern = Some(pattern.into());
        }

        if let Some(ambient) = self.ambient {
            material.ambient = ambient;
        }
        if let Some(diffuse) = self.diffuse {
            material.diffuse = diffuse;
        }
        if let Some(specular) = self.specular {
            material.specular = specular;
        }
        if let Some(shininess) = self.shininess {
            material.shininess = shininess;
        }

        if let Some(reflective) = self.reflective {
            material.reflective = reflective;
        }
        if let Some(transparency) = self.transparency {
            material.transparency = transparency;
        }
        if let Some(refractive_index) = self.refractive_index {
            material.refractive_index = refractive_index;
        }

        material
    }
}

impl From<PatternJson> for Pattern {
    fn from(pattern_json: PatternJson) -> Pattern {
        let first = color_of(pattern_json.first);
        let second = color_of(pattern_json.second);

        let mut pattern = match pattern_json.kind {
            PatternKindJson::Stripe => Pattern::stripe(first, second),
            PatternKindJson::Gradient => Pattern::gradient(first, second),
            PatternKindJson::Ring => Pattern::ring(first, second),
            PatternKindJson::Checker => Pattern::checker(first, second),
        };
        pattern.transform = compose_transform(&pattern_json.transform);

        pattern
    }
}

/* Tests */

#[cfg(test)]
const MINIMAL_SCENE: &str = r#"{
    "camera": {
        "width": 100, "height": 50, "field_of_view": 1.0472,
        "from": [0.0, 1.5, -5.0], "to": [0.0, 1.0, 0.0], "up": [0.0, 1.0, 0.0]
    },
    "lights": [
        { "intensity": [1.0, 1.0, 1.0], "position": [-10.0, 10.0, -10.0] }
    ],
    "objects": [
        { "shape": "plane" },
        {
            "shape": "sphere",
            "transform": [
                { "scale": [0.5, 0.5, 0.5] },
                { "translate": [-1.5, 0.5, -0.75] }
            ],
            "material": {
                "color": [0.8, 0.1, 0.1],
                "diffuse": 0.7,
                "pattern": {
                    "kind": "checker",
                    "first": [1.0, 1.0, 1.0],
                    "second": [0.0, 0.0, 0.0]
                }
            }
        },
        { "shape": "glass_sphere" }
    ]
}"#;

#[test]
fn scene_from_json_description() {
    let scene_json: SceneJson = serde_json::from_str(MINIMAL_SCENE).unwrap();
    let scene: Scene = scene_json.into();

    assert_eq!(scene.camera.hsize, 100);
    assert_eq!(scene.camera.vsize, 50);
    assert_eq!(scene.world.lights.len(), 1);
    assert_eq!(scene.world.objects.len(), 3);
}

#[test]
fn object_transform_steps_compose_in_order() {
    let scene_json: SceneJson = serde_json::from_str(MINIMAL_SCENE).unwrap();
    let scene: Scene = scene_json.into();

    let expected = Mat4::translation(-1.5, 0.5, -0.75)
        * Mat4::scaling(0.5, 0.5, 0.5);
    assert_eq!(scene.world.objects[1].transform, expected);
}

#[test]
fn material_defaults_fill_missing_fields() {
    let scene_json: SceneJson = serde_json::from_str(MINIMAL_SCENE).unwrap();
    let scene: Scene = scene_json.into();

    let material = &scene.world.objects[1].material;
    assert_eq!(material.color, Color::rgb(0.8, 0.1, 0.1));
    assert_eq!(material.diffuse, 0.7);
    assert_eq!(material.ambient, 0.1);
    assert_eq!(material.specular, 0.9);
    assert!(material.pattern.is_some());
}

#[test]
fn glass_sphere_keeps_glass_material() {
    let scene_json: SceneJson = serde_json::from_str(MINIMAL_SCENE).unwrap();
    let scene: Scene = scene_json.into();

    let material = &scene.world.objects[2].material;
    assert_eq!(material.transparency, 1.0);
    assert_eq!(material.refractive_index, crate::consts::GLASS_IOR);
}

#[test]
fn explicit_values_override_glass_defaults() {
    // Values that happen to equal a built-in default still apply; a glass
    // sphere can be dialed back to opaque vacuum.
    let json = r#"{
        "shape": "glass_sphere",
        "material": { "transparency": 0.0, "refractive_index": 1.0 }
    }"#;

    let object: ObjectJson = serde_json::from_str(json).unwrap();
    let shape: Shape = object.into();

    assert_eq!(shape.material.transparency, 0.0);
    assert_eq!(shape.material.refractive_index, 1.0);
}

#[test]
fn absent_material_fields_keep_base_values() {
    let json = r#"{
        "shape": "glass_sphere",
        "material": { "reflective": 0.9 }
    }"#;

    let object: ObjectJson = serde_json::from_str(json).unwrap();
    let shape: Shape = object.into();

    assert_eq!(shape.material.reflective, 0.9);
    assert_eq!(shape.material.transparency, 1.0);
    assert_eq!(shape.material.refractive_index, crate::consts::GLASS_IOR);
}

#[test]
fn loading_missing_file_is_an_io_error() {
    let result = Scene::load(Path::new("no-such-scene.json"));
    match result {
        Err(SceneError::Io(_)) => {},
        _ => panic!("Expected an I/O error for a missing scene file."),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let result: Result<SceneJson, serde_json::Error> =
        serde_json::from_str("{ \"camera\": 12 }");
    assert!(result.is_err());
}
