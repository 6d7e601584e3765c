use crate::color::Color;
use crate::consts::{ feq, SHADOW_EPSILON };
use crate::intersect::{ Intersections, Precomputation };
use crate::light::{ lighting, PointLight };
use crate::matrix::Mat4;
use crate::ray::Ray;
use crate::shape::{ IdAllocator, Shape };
use crate::vector::Vec4;

/// The scene contents: lights and objects.
///
/// The world owns the id allocator for its shapes; every shape added
/// through `add_object` (or `with`) receives a unique stable id used for
/// intersection identity and containment bookkeeping.
#[derive(Clone, Debug)]
pub struct World {
    pub lights: Vec<PointLight>,
    pub objects: Vec<Shape>,

    ids: IdAllocator,
}

impl Default for World {
    fn default() -> World {
        let light = PointLight::new(
            Color::white(),
            Vec4::point(-10.0, 10.0, -10.0),
        );

        let mut s1 = Shape::sphere();
        s1.material.color = Color::rgb(0.8, 1.0, 0.6);
        s1.material.diffuse = 0.7;
        s1.material.specular = 0.2;

        let mut s2 = Shape::sphere();
        s2.transform = Mat4::scaling(0.5, 0.5, 0.5);

        World::with(vec![light], vec![s1, s2])
    }
}

impl World {
    /// The default two-sphere world, the standard shading fixture.
    pub fn new() -> World {
        Default::default()
    }

    /// A world with no lights and no objects.
    pub fn empty() -> World {
        World {
            lights: Vec::new(),
            objects: Vec::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Builds a world from parts, assigning ids to every object.
    pub fn with(lights: Vec<PointLight>, objects: Vec<Shape>) -> World {
        let mut world = World::empty();
        world.lights = lights;
        for object in objects {
            world.add_object(object);
        }

        world
    }

    /// Adds an object, stamping it with a fresh id.
    pub fn add_object(&mut self, mut object: Shape) {
        object.set_id(self.ids.allocate());
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// Intersects a ray against every object in the world.
    ///
    /// A deliberate brute-force linear scan with no culling; results from
    /// all objects are merged into one ascending-sorted list.
    pub fn intersect(&self, r: &Ray) -> Intersections {
        let mut intersections = Intersections::new();
        for object in self.objects.iter() {
            intersections.merge(object.intersect(r));
        }

        intersections
    }

    /// Shadow attenuation in [0, 1] for `point` with respect to `light`:
    /// 0 means fully lit, 1 means fully occluded.
    ///
    /// Every distinct occluder between the point and the light scales the
    /// transmitted light by its transparency, so semi-transparent objects
    /// cast dim shadows instead of binary ones. Fully transparent
    /// occluders are skipped outright, and transmission collapsing below
    /// the loose shadow epsilon short-circuits to full occlusion.
    pub fn shadow_attenuation(&self, point: Vec4, light: &PointLight) -> f64 {
        let to_light = light.position - point;
        let distance = to_light.magnitude();

        let shadow_ray = Ray::new(point, to_light.normalize());
        let xs = self.intersect(&shadow_ray);

        let mut transmission: f64 = 1.0;
        let mut counted: Vec<u64> = Vec::new();

        for i in xs.items.iter() {
            if i.t < 0.0 {
                continue;
            }

            // Sorted ascending, so everything from here on lies beyond the
            // light.
            if i.t >= distance {
                break;
            }

            let transparency = i.shape.material.transparency;
            if feq(transparency, 1.0) {
                continue;
            }

            // An occluder attenuates once, not once per entry/exit event.
            if counted.contains(&i.shape.id()) {
                continue;
            }
            counted.push(i.shape.id());

            transmission *= transparency;
            if transmission < SHADOW_EPSILON {
                return 1.0;
            }
        }

        1.0 - transmission
    }

    /// Whether `point` receives meaningfully attenuated light from `light`.
    pub fn is_shadowed(&self, point: Vec4, light: &PointLight) -> bool {
        self.shadow_attenuation(point, light) > SHADOW_EPSILON
    }

    /// Shades a precomputed hit.
    ///
    /// The local Phong term is accumulated per light; the reflected and
    /// refracted contributions depend only on view and geometry, so they
    /// are evaluated once per hit and blended by the Schlick reflectance
    /// when the surface is both reflective and transparent.
    pub fn shade_hit(&self, comps: &Precomputation, remaining: usize) -> Color {
        let mut surface = Color::black();
        for light in self.lights.iter() {
            let attenuation = self.shadow_attenuation(comps.over_point, light);
            surface = surface + lighting(
                comps.shape, light,
                comps.point, comps.eyev, comps.normalv,
                attenuation,
            );
        }

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        let material = &comps.shape.material;
        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface
                + reflected * reflectance
                + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// The color contributed by the reflection bounce, black once the
    /// bounce budget is spent or for non-reflective surfaces.
    pub fn reflected_color(&self, comps: &Precomputation, remaining: usize)
        -> Color {
        if remaining == 0 || feq(comps.shape.material.reflective, 0.0) {
            return Color::black();
        }

        let reflect_ray = Ray::new(comps.over_point, comps.reflectv);
        let color = self.color_at(&reflect_ray, remaining - 1);

        color * comps.shape.material.reflective
    }

    /// The color contributed by the refraction bounce.
    ///
    /// Applies Snell's law with the precomputed n1/n2 transition; when
    /// sin^2(theta_t) exceeds 1 the ray is totally internally reflected
    /// and refraction contributes black, which is the physically expected
    /// outcome rather than an error.
    pub fn refracted_color(&self, comps: &Precomputation, remaining: usize)
        -> Color {
        if remaining == 0 || feq(comps.shape.material.transparency, 0.0) {
            return Color::black();
        }

        let ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = ratio * ratio * (1.0 - cos_i * cos_i);
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (ratio * cos_i - cos_t)
            - comps.eyev * ratio;

        let refract_ray = Ray::new(comps.under_point, direction);
        let color = self.color_at(&refract_ray, remaining - 1);

        color * comps.shape.material.transparency
    }

    /// Traces a ray to its final color.
    ///
    /// A miss is the background (black). A hit is precomputed against the
    /// full intersection list and shaded, recursing into reflection and
    /// refraction rays until `remaining` bounces run out.
    pub fn color_at(&self, r: &Ray, remaining: usize) -> Color {
        let xs = self.intersect(r);
        match xs.hit() {
            None => Color::black(),
            Some(hit) => {
                let comps = Precomputation::new(&hit, r, &xs);
                self.shade_hit(&comps, remaining)
            },
        }
    }
}

/* Tests */

#[cfg(test)]
use crate::consts::MAX_BOUNCES;
#[cfg(test)]
use crate::intersect::Intersection;

#[test]
fn intersect_default_world() {
    let w: World = Default::default();
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));

    let xs = w.intersect(&r);
    assert_eq!(xs.len(), 4);
    assert_eq!(xs.items[0].t, 4.0);
    assert_eq!(xs.items[1].t, 4.5);
    assert_eq!(xs.items[2].t, 5.5);
    assert_eq!(xs.items[3].t, 6.0);
}

#[test]
fn objects_receive_unique_ids() {
    let w: World = Default::default();

    assert_eq!(w.objects[0].id(), 1);
    assert_eq!(w.objects[1].id(), 2);
}

#[test]
fn shade_intersection_from_outside() {
    let w: World = Default::default();
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));

    let xs = w.intersect(&r);
    let hit = xs.hit().unwrap();
    let comps = Precomputation::new(&hit, &r, &xs);

    let c = w.shade_hit(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_in_shadow() {
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));
    let s1 = Shape::sphere();
    let mut s2 = Shape::sphere();
    s2.transform = Mat4::translation(0.0, 0.0, 10.0);
    let w = World::with(vec![light], vec![s1, s2]);

    let r = Ray::new(Vec4::point(0.0, 0.0, 5.0), Vec4::vector(0.0, 0.0, 1.0));
    let hit = Intersection { t: 4.0, shape: &w.objects[1] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    let c = w.shade_hit(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn color_of_missed_ray_is_black() {
    let w: World = Default::default();
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 1.0, 0.0));

    assert_eq!(w.color_at(&r, MAX_BOUNCES), Color::black());
}

#[test]
fn color_of_hit_ray() {
    let w: World = Default::default();
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));

    assert_eq!(w.color_at(&r, MAX_BOUNCES),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w: World = Default::default();
    w.objects[0].material.ambient = 1.0;
    w.objects[1].material.ambient = 1.0;
    let inner_color = w.objects[1].material.color;

    let r = Ray::new(
        Vec4::point(0.0, 0.0, 0.75), Vec4::vector(0.0, 0.0, -1.0));

    assert_eq!(w.color_at(&r, MAX_BOUNCES), inner_color);
}

#[test]
fn no_shadow_when_nothing_blocks_light() {
    let w: World = Default::default();
    let light = w.lights[0];

    assert!(!w.is_shadowed(Vec4::point(0.0, 10.0, 0.0), &light));
}

#[test]
fn shadow_when_object_between_point_and_light() {
    let w: World = Default::default();
    let light = w.lights[0];

    assert!(w.is_shadowed(Vec4::point(10.0, -10.0, 10.0), &light));
}

#[test]
fn no_shadow_when_object_behind_light() {
    let w: World = Default::default();
    let light = w.lights[0];

    assert!(!w.is_shadowed(Vec4::point(-20.0, 20.0, -20.0), &light));
}

#[test]
fn no_shadow_when_object_behind_point() {
    let w: World = Default::default();
    let light = w.lights[0];

    assert!(!w.is_shadowed(Vec4::point(-2.0, 2.0, -2.0), &light));
}

#[test]
fn opaque_occluder_fully_attenuates() {
    let w: World = Default::default();
    let light = w.lights[0];

    let attenuation =
        w.shadow_attenuation(Vec4::point(10.0, -10.0, 10.0), &light);
    assert_eq!(attenuation, 1.0);
}

#[test]
fn fully_transparent_occluder_casts_no_shadow() {
    let mut w: World = Default::default();
    w.objects[0].material.transparency = 1.0;
    w.objects[1].material.transparency = 1.0;
    let light = w.lights[0];

    let attenuation =
        w.shadow_attenuation(Vec4::point(10.0, -10.0, 10.0), &light);
    assert_eq!(attenuation, 0.0);
}

#[test]
fn semi_transparent_occluders_compound() {
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, -10.0));

    let mut near = Shape::sphere();
    near.transform = Mat4::translation(0.0, 0.0, 0.0);
    near.material.transparency = 0.5;
    let mut far = Shape::sphere();
    far.transform = Mat4::translation(0.0, 0.0, 4.0);
    far.material.transparency = 0.5;

    let w = World::with(vec![light], vec![near, far]);

    // Transmission 0.5 * 0.5 = 0.25, once per occluder even though each
    // sphere contributes an entry and an exit intersection.
    let attenuation =
        w.shadow_attenuation(Vec4::point(0.0, 0.0, 10.0), &light);
    assert!(feq(attenuation, 0.75));
}

#[test]
fn reflected_color_of_nonreflective_surface() {
    let mut w: World = Default::default();
    w.objects[1].material.ambient = 1.0;

    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 0.0, 1.0));
    let hit = Intersection { t: 1.0, shape: &w.objects[1] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    assert_eq!(w.reflected_color(&comps, MAX_BOUNCES), Color::black());
}

#[test]
fn reflected_color_of_reflective_surface() {
    let mut w: World = Default::default();
    let mut floor = Shape::plane();
    floor.material.reflective = 0.5;
    floor.transform = Mat4::translation(0.0, -1.0, 0.0);
    w.add_object(floor);

    let r = Ray::new(
        Vec4::point(0.0, 0.0, -3.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &w.objects[2] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    let c = w.reflected_color(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(0.19032, 0.2379, 0.14274));
}

#[test]
fn shade_hit_includes_reflection() {
    let mut w: World = Default::default();
    let mut floor = Shape::plane();
    floor.material.reflective = 0.5;
    floor.transform = Mat4::translation(0.0, -1.0, 0.0);
    w.add_object(floor);

    let r = Ray::new(
        Vec4::point(0.0, 0.0, -3.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &w.objects[2] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    let c = w.shade_hit(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflected_color_at_exhausted_bounce_budget() {
    let mut w: World = Default::default();
    let mut floor = Shape::plane();
    floor.material.reflective = 0.5;
    floor.transform = Mat4::translation(0.0, -1.0, 0.0);
    w.add_object(floor);

    let r = Ray::new(
        Vec4::point(0.0, 0.0, -3.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &w.objects[2] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let light = PointLight::new(Color::white(), Vec4::point(0.0, 0.0, 0.0));

    let mut lower = Shape::plane();
    lower.material.reflective = 1.0;
    lower.transform = Mat4::translation(0.0, -1.0, 0.0);

    let mut upper = Shape::plane();
    upper.material.reflective = 1.0;
    upper.transform = Mat4::translation(0.0, 1.0, 0.0);

    let w = World::with(vec![light], vec![lower, upper]);
    let r = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::vector(0.0, 1.0, 0.0));

    // The bounce budget must cut the infinite mirror corridor short.
    let _ = w.color_at(&r, MAX_BOUNCES);
}

#[test]
fn refracted_color_of_opaque_surface() {
    let w: World = Default::default();
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);
    let hit = xs.hit().unwrap();
    let comps = Precomputation::new(&hit, &r, &xs);

    assert_eq!(w.refracted_color(&comps, MAX_BOUNCES), Color::black());
}

#[test]
fn refracted_color_at_exhausted_bounce_budget() {
    let mut w: World = Default::default();
    w.objects[0].material.transparency = 1.0;
    w.objects[0].material.refractive_index = 1.5;

    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);
    let hit = xs.hit().unwrap();
    let comps = Precomputation::new(&hit, &r, &xs);

    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w: World = Default::default();
    w.objects[0].material.transparency = 1.0;
    w.objects[0].material.refractive_index = 1.5;

    let r = Ray::new(
        Vec4::point(0.0, 0.0, 2.0f64.sqrt() / 2.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );
    let xs = w.intersect(&r);

    // The hit of interest is the exit crossing, inside the sphere.
    let exit = xs.items.iter()
        .find(|i| i.t > 0.0 && i.shape.id() == w.objects[0].id())
        .copied()
        .unwrap();
    let comps = Precomputation::new(&exit, &r, &xs);

    assert_eq!(w.refracted_color(&comps, MAX_BOUNCES), Color::black());
}

#[test]
fn shade_hit_with_transparent_floor() {
    let mut w: World = Default::default();

    let mut floor = Shape::plane();
    floor.transform = Mat4::translation(0.0, -1.0, 0.0);
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    w.add_object(floor);

    let mut ball = Shape::sphere();
    ball.material.color = Color::rgb(1.0, 0.0, 0.0);
    ball.material.ambient = 0.5;
    ball.transform = Mat4::translation(0.0, -3.5, -0.5);
    w.add_object(ball);

    let r = Ray::new(
        Vec4::point(0.0, 0.0, -3.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &w.objects[2] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    // The ball below the floor is lit through it: the half-transparent
    // floor attenuates the ball's diffuse term by 0.5 instead of zeroing
    // it, so the refracted red contribution is 0.5 * 0.87808.
    let c = w.shade_hit(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(1.12546, 0.68643, 0.68643));
}

#[test]
fn shade_hit_blends_reflection_and_refraction_with_schlick() {
    let mut w: World = Default::default();

    let mut floor = Shape::plane();
    floor.transform = Mat4::translation(0.0, -1.0, 0.0);
    floor.material.reflective = 0.5;
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    w.add_object(floor);

    let mut ball = Shape::sphere();
    ball.material.color = Color::rgb(1.0, 0.0, 0.0);
    ball.material.ambient = 0.5;
    ball.transform = Mat4::translation(0.0, -3.5, -0.5);
    w.add_object(ball);

    let r = Ray::new(
        Vec4::point(0.0, 0.0, -3.0),
        Vec4::vector(0.0, -(2.0f64.sqrt()) / 2.0, 2.0f64.sqrt() / 2.0),
    );
    let hit = Intersection { t: 2.0f64.sqrt(), shape: &w.objects[2] };
    let xs = Intersections::from_vec(vec![hit]);
    let comps = Precomputation::new(&hit, &r, &xs);

    // Schlick reflectance at this angle is about 0.04207; the red channel
    // carries the refracted ball contribution scaled by (1 - reflectance).
    let c = w.shade_hit(&comps, MAX_BOUNCES);
    assert_eq!(c, Color::rgb(1.11500, 0.69643, 0.69243));
}

#[test]
fn two_lights_accumulate_local_contributions() {
    let mut w: World = Default::default();
    let extra = PointLight::new(Color::white(), Vec4::point(-10.0, 10.0, -10.0));
    w.add_light(extra);

    // Duplicating the only light must double the local term exactly.
    let r = Ray::new(Vec4::point(0.0, 0.0, -5.0), Vec4::vector(0.0, 0.0, 1.0));
    let single = Color::rgb(0.38066, 0.47583, 0.2855);

    assert_eq!(w.color_at(&r, MAX_BOUNCES), single + single);
}
