// Floating point comparisons
pub const FEQ_EPSILON: f64 = 1e-4;

/// Distance by which shadow/reflection ray origins are nudged above a
/// surface (and refraction ray origins below it) to defeat self-intersection
/// acne.
pub const SURFACE_EPSILON: f64 = 1e-6;

/// Shadow attenuation below this value counts as "not shadowed"; light
/// transmission below it counts as full occlusion.
pub const SHADOW_EPSILON: f64 = 1e-2;

/// Default reflection/refraction recursion budget.
pub const MAX_BOUNCES: usize = 5;

// Common refractive indices
pub const VACUUM_IOR: f64 = 1.0;
pub const AIR_IOR: f64 = 1.00029;
pub const WATER_IOR: f64 = 1.333;
pub const GLASS_IOR: f64 = 1.5;
pub const DIAMOND_IOR: f64 = 2.417;

/// Approximate floating point equality, used for all geometric and color
/// comparisons.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

#[test]
fn feq_tolerates_rounding() {
    assert!(feq(1.0, 1.0 + FEQ_EPSILON / 2.0));
    assert!(!feq(1.0, 1.0 + FEQ_EPSILON * 2.0));
}
