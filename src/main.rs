use std::error::Error;
use std::f64::consts::PI;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Instant;

use clap::Parser;
use log::{ info, LevelFilter };

use softray::camera::Camera;
use softray::color::Color;
use softray::consts::MAX_BOUNCES;
use softray::light::{ Material, PointLight };
use softray::matrix::Mat4;
use softray::parallel;
use softray::pattern::Pattern;
use softray::scene::Scene;
use softray::shape::Shape;
use softray::vector::Vec4;
use softray::world::World;

#[derive(Parser)]
#[clap(name = "softray", version, about = "A small recursive ray tracer")]
struct Args {
    /// Scene description JSON; renders the built-in demo scene if omitted
    #[clap(value_parser)]
    scene: Option<PathBuf>,

    /// Output PPM file
    #[clap(short, long, value_parser, default_value = "render.ppm")]
    output: PathBuf,

    /// Number of worker threads; defaults to the available parallelism
    #[clap(short, long, value_parser)]
    threads: Option<usize>,

    /// Maximum reflection and refraction bounces per ray
    #[clap(short, long, value_parser, default_value_t = MAX_BOUNCES)]
    bounces: usize,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => demo_scene(),
    };

    let threads = args.threads.unwrap_or_else(default_threads);

    let started = Instant::now();
    let canvas = parallel::render(
        &scene.world, &scene.camera, threads, args.bounces);
    info!("rendered in {:.2}s", started.elapsed().as_secs_f64());

    canvas.save(&args.output)?;
    info!("saved render to {}", args.output.display());

    Ok(())
}

fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// The built-in showcase scene: a checkered reflective floor, a glass
/// sphere, a mirror sphere and a pair of matte props.
fn demo_scene() -> Scene {
    let mut floor = Shape::plane();
    floor.material.color = Color::rgb(0.5, 0.5, 0.5);
    floor.material.specular = 0.0;
    floor.material.reflective = 0.2;
    floor.material.pattern = Some(Pattern::checker(
        Color::rgb(0.85, 0.85, 0.85),
        Color::rgb(0.15, 0.15, 0.15),
    ));

    let mut middle = Shape::sphere();
    middle.transform = Mat4::translation(-0.5, 1.0, 0.5);
    middle.material = Material::glass();
    middle.material.color = Color::rgb(0.05, 0.05, 0.05);
    middle.material.diffuse = 0.1;
    middle.material.specular = 1.0;
    middle.material.shininess = 300.0;
    middle.material.reflective = 0.9;

    let mut right = Shape::sphere();
    right.transform = Mat4::translation(1.5, 0.5, -0.5)
        * Mat4::scaling(0.5, 0.5, 0.5);
    right.material.color = Color::rgb(0.1, 0.1, 0.1);
    right.material.diffuse = 0.3;
    right.material.specular = 1.0;
    right.material.shininess = 400.0;
    right.material.reflective = 0.9;

    let mut left = Shape::sphere();
    left.transform = Mat4::translation(-1.5, 0.33, -0.75)
        * Mat4::scaling(0.33, 0.33, 0.33);
    left.material.color = Color::rgb(1.0, 0.8, 0.1);
    left.material.diffuse = 0.7;
    left.material.specular = 0.3;

    let mut back = Shape::cube();
    back.transform = Mat4::translation(2.5, 0.75, 3.5)
        * Mat4::scaling(0.75, 0.75, 0.75)
        * Mat4::rotation_y(PI / 6.0);
    back.material.color = Color::rgb(0.7, 0.3, 0.3);
    back.material.diffuse = 0.7;
    back.material.specular = 0.3;

    let light = PointLight::new(
        Color::white(),
        Vec4::point(-10.0, 10.0, -10.0),
    );

    let world = World::with(
        vec![light],
        vec![floor, middle, right, left, back],
    );

    let mut camera = Camera::new(960, 540, PI / 3.0);
    camera.transform = Mat4::view_transform(
        Vec4::point(0.0, 1.5, -5.0),
        Vec4::point(0.0, 1.0, 0.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    Scene { world, camera }
}
