//! Random reference trajectories: truncated Fourier series or a spline
//! through random control points

use crate::core::Point;
use crate::service::wire::NormalizedTrajectory;
use rand::Rng;
use serde_json::json;
use std::f64::consts::PI;

const MIN_POINTS: usize = 100;
const MAX_POINTS: usize = 300;
const MIN_HARMONICS: usize = 3;
const MAX_HARMONICS: usize = 8;
const MIN_CONTROL_POINTS: usize = 6;
const MAX_CONTROL_POINTS: usize = 10;
/// Control points are drawn from [-CONTROL_EXTENT, CONTROL_EXTENT]²
const CONTROL_EXTENT: f64 = 5.0;
/// Fewest samples taken along a spline
const MIN_SPLINE_SAMPLES: usize = 200;

/// One harmonic of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourierCoefficient {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

/// Point of the curve at parameter `t`
pub fn fourier_point(t: f64, coefficients: &[FourierCoefficient]) -> Point {
    coefficients.iter().fold(Point::default(), |acc, c| {
        let angle = c.frequency * t + c.phase;
        Point::new(acc.x + c.amplitude * angle.cos(), acc.y + c.amplitude * angle.sin())
    })
}

/// `n` harmonics with decaying random amplitudes and random phases
pub fn random_coefficients<R: Rng>(rng: &mut R, n: usize) -> Vec<FourierCoefficient> {
    (0..n)
        .map(|i| FourierCoefficient {
            amplitude: rng.gen_range(0.5..2.0) / (i + 1) as f64,
            frequency: (i + 1) as f64,
            phase: rng.gen_range(0.0..2.0 * PI),
        })
        .collect()
}

/// Scale each axis independently onto [0, 1], rounded to 4 decimals.
/// An axis without spread maps to 0.5.
pub fn normalize_to_unit(points: &[Point]) -> Vec<Point> {
    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), p| (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y)),
    );

    let unit = |v: f64, min: f64, max: f64| {
        if max != min {
            round4((v - min) / (max - min))
        } else {
            0.5
        }
    };

    points
        .iter()
        .map(|p| Point::new(unit(p.x, min_x, max_x), unit(p.y, min_y, max_y)))
        .collect()
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Catmull-Rom spline through `control`, sampled at `samples` evenly
/// spaced parameters. The curve passes through every control point.
pub fn catmull_rom(control: &[Point], samples: usize) -> Vec<Point> {
    if control.len() < 2 || samples < 2 {
        return control.iter().take(samples).copied().collect();
    }

    let segments = control.len() - 1;
    // End points are repeated so the first and last segments have neighbours
    let at = |i: isize| control[i.clamp(0, segments as isize) as usize];

    (0..samples)
        .map(|k| {
            let s = k as f64 / (samples - 1) as f64 * segments as f64;
            let i = (s.floor() as usize).min(segments - 1);
            let u = s - i as f64;
            let i = i as isize;
            catmull_rom_point(at(i - 1), at(i), at(i + 1), at(i + 2), u)
        })
        .collect()
}

fn catmull_rom_point(p0: Point, p1: Point, p2: Point, p3: Point, u: f64) -> Point {
    let (u2, u3) = (u * u, u * u * u);
    let blend = |a: f64, b: f64, c: f64, d: f64| {
        0.5 * (2.0 * b + (c - a) * u + (2.0 * a - 5.0 * b + 4.0 * c - d) * u2 + (3.0 * b - a - 3.0 * c + d) * u3)
    };
    Point::new(blend(p0.x, p1.x, p2.x, p3.x), blend(p0.y, p1.y, p2.y, p3.y))
}

/// Fourier curve with `num_points` samples over a random time range
pub fn generate_fourier_points<R: Rng>(rng: &mut R, num_points: usize) -> (Vec<Point>, serde_json::Value) {
    let time_range = rng.gen_range(4.0 * PI..8.0 * PI);
    let harmonics = rng.gen_range(MIN_HARMONICS..=MAX_HARMONICS);
    let coefficients = random_coefficients(rng, harmonics);

    let points = (0..num_points)
        .map(|i| fourier_point(i as f64 / num_points as f64 * time_range, &coefficients))
        .collect();

    let parameters = json!({
        "trajectory_type": "fourier",
        "num_points": num_points,
        "time_range": round4(time_range),
        "num_coefficients": coefficients.len(),
    });
    (points, parameters)
}

/// Spline through 6 to 10 random control points, sampled at least
/// 200 times
pub fn generate_spline_points<R: Rng>(rng: &mut R, num_points: usize) -> (Vec<Point>, serde_json::Value) {
    let samples = num_points.max(MIN_SPLINE_SAMPLES);
    let control_points = rng.gen_range(MIN_CONTROL_POINTS..=MAX_CONTROL_POINTS);
    let control: Vec<Point> = (0..control_points)
        .map(|_| {
            Point::new(
                rng.gen_range(-CONTROL_EXTENT..=CONTROL_EXTENT),
                rng.gen_range(-CONTROL_EXTENT..=CONTROL_EXTENT),
            )
        })
        .collect();

    let points = catmull_rom(&control, samples);
    let parameters = json!({
        "trajectory_type": "random_spline",
        "num_points": points.len(),
        "control_points": control_points,
    });
    (points, parameters)
}

/// Generate a fresh random trajectory in unit coordinates, Fourier or
/// spline with equal odds
pub fn generate_unit_trajectory<R: Rng>(rng: &mut R) -> NormalizedTrajectory {
    let num_points = rng.gen_range(MIN_POINTS..=MAX_POINTS);
    let (raw, mut parameters) = if rng.gen_bool(0.5) {
        generate_fourier_points(rng, num_points)
    } else {
        generate_spline_points(rng, num_points)
    };
    parameters["coordinates"] = json!("normalized_0_1");

    NormalizedTrajectory {
        trajectory_id: format!("{:08x}", rng.gen::<u32>()),
        normalized_points: normalize_to_unit(&raw),
        parameters,
    }
}
