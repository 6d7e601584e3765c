use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use indicatif::ProgressBar;
use log::info;

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::world::World;

pub enum Job {
    Pixel(usize, usize),
    Terminate,
}

/// One shaded pixel, sent back to the collector.
type PixelResult = (usize, usize, Color);

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(world: Arc<World>, camera: Arc<Camera>, bounces: usize,
        jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
        results: mpsc::Sender<PixelResult>) -> Worker {

        let thread = thread::spawn(move || loop {
            // Take the next job off the shared queue.
            let job: Job = jobs.lock().unwrap().recv().unwrap();

            match job {
                Job::Pixel(x, y) => {
                    let ray = camera.ray_for_pixel(x, y);
                    let color = world.color_at(&ray, bounces);

                    // The collector may already have everything it needs,
                    // in which case the send fails harmlessly.
                    let _ = results.send((x, y, color));
                },

                Job::Terminate => {
                    break;
                },
            }
        });

        Worker { thread: Some(thread) }
    }
}

/// A fixed-size pool of render workers.
///
/// Workers pull pixel jobs from a shared queue and push shaded pixels
/// through a results channel; only the collector on the submitting thread
/// ever touches the canvas. Dropping the pool terminates and joins every
/// worker.
pub struct RenderPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Job>,
}

impl RenderPool {
    pub fn new(size: usize, world: Arc<World>, camera: Arc<Camera>,
        bounces: usize, results: mpsc::Sender<PixelResult>) -> RenderPool {
        assert!(size > 0, "Render pool needs at least one worker.");

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for _ in 0..size {
            workers.push(Worker::new(
                Arc::clone(&world),
                Arc::clone(&camera),
                bounces,
                Arc::clone(&receiver),
                results.clone(),
            ));
        }

        RenderPool { workers, sender }
    }

    pub fn execute(&mut self, job: Job) {
        self.sender.send(job).unwrap();
    }
}

impl Drop for RenderPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            self.sender.send(Job::Terminate).unwrap();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                thread.join().unwrap();
            }
        }
    }
}

/// Renders the world across `threads` workers and collects the result
/// into a canvas.
///
/// Every pixel is submitted as its own job; the collector drains exactly
/// one result per pixel, so the canvas is complete when this returns.
pub fn render(world: &World, camera: &Camera, threads: usize,
    bounces: usize) -> Canvas {
    let hsize = camera.hsize;
    let vsize = camera.vsize;
    let total = hsize * vsize;

    let mut canvas = Canvas::new(hsize, vsize);
    let (results, collected) = mpsc::channel();

    info!("rendering {}x{} pixels on {} threads", hsize, vsize, threads);
    let progress = ProgressBar::new(total as u64);

    {
        let world = Arc::new(world.clone());
        let camera = Arc::new(camera.clone());
        let mut pool = RenderPool::new(threads, world, camera, bounces,
            results);

        for y in 0..vsize {
            for x in 0..hsize {
                pool.execute(Job::Pixel(x, y));
            }
        }

        for _ in 0..total {
            let (x, y, color) = collected.recv()
                .expect("Workers should outlive the collection loop.");
            canvas.write_pixel(x, y, &color);
            progress.inc(1);
        }
    }

    progress.finish_and_clear();
    canvas
}

/* Tests */

#[cfg(test)]
use std::f64::consts::PI;
#[cfg(test)]
use crate::consts::MAX_BOUNCES;
#[cfg(test)]
use crate::matrix::Mat4;
#[cfg(test)]
use crate::vector::Vec4;

#[cfg(test)]
fn test_camera() -> Camera {
    let mut camera = Camera::new(11, 11, PI / 2.0);
    camera.transform = Mat4::view_transform(
        Vec4::point(0.0, 0.0, -5.0),
        Vec4::point(0.0, 0.0, 0.0),
        Vec4::vector(0.0, 1.0, 0.0),
    );

    camera
}

#[test]
fn parallel_render_matches_sequential() {
    let world: World = Default::default();
    let camera = test_camera();

    let sequential = camera.render(&world);
    let parallel = render(&world, &camera, 4, MAX_BOUNCES);

    for y in 0..camera.vsize {
        for x in 0..camera.hsize {
            assert_eq!(parallel.read_pixel(x, y), sequential.read_pixel(x, y));
        }
    }
}

#[test]
fn single_worker_render_completes() {
    let world: World = Default::default();
    let camera = test_camera();

    let image = render(&world, &camera, 1, MAX_BOUNCES);
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
