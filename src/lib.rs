pub mod consts;
pub mod vector;
pub mod matrix;
pub mod color;
pub mod canvas;
pub mod ray;

pub mod light;
pub mod pattern;
pub mod shape;
pub mod intersect;
pub mod world;
pub mod camera;
pub mod parallel;

pub mod scene;
