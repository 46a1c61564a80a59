// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Accelerometer simulator for demo/testing

use async_trait::async_trait;
use chrono::Utc;
use rand::prelude::*;
use rand_distr::Normal;
use std::time::Duration;

use super::{MotionSample, MotionSource};
use crate::error::SchedulerError;

/// Simulates a handheld device at rest, with occasional pickups and
/// shakes. Gravity sits on the z axis.
pub struct MotionSimulator {
    id: String,
    sample_rate: f64,
    rng: rand::rngs::StdRng,

    // Simulation state
    shake_probability: f64,
    shake_left: u32,
}

impl MotionSimulator {
    pub fn new(id: &str, sample_rate: f64) -> Self {
        Self {
            id: id.to_string(),
            sample_rate: sample_rate.max(1.0),
            rng: rand::rngs::StdRng::from_entropy(),
            shake_probability: 0.005,
            shake_left: 0,
        }
    }

    fn generate(&mut self) -> MotionSample {
        let noise = Normal::new(0.0, 0.02).unwrap();
        let mut x = self.rng.sample(noise);
        let mut y = self.rng.sample(noise);
        let mut z = 9.81 + self.rng.sample(noise);

        // Shake events span several samples so the delta policy sees
        // consecutive large jumps.
        if self.shake_left == 0 && self.rng.gen::<f64>() < self.shake_probability {
            self.shake_left = self.rng.gen_range(5..20);
        }
        if self.shake_left > 0 {
            self.shake_left -= 1;
            let burst = Normal::new(0.0, 4.0).unwrap();
            x += self.rng.sample(burst);
            y += self.rng.sample(burst);
            z += self.rng.sample(burst);
        }

        MotionSample::new(x, y, z, Utc::now())
    }
}

#[async_trait]
impl MotionSource for MotionSimulator {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    async fn next_sample(&mut self) -> Result<MotionSample, SchedulerError> {
        tokio::time::sleep(Duration::from_secs_f64(1.0 / self.sample_rate)).await;
        Ok(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_magnitude_is_near_gravity() {
        let mut sim = MotionSimulator::new("sim-1", 20.0);
        sim.shake_probability = 0.0;
        for _ in 0..100 {
            let sample = sim.generate();
            assert!((sample.magnitude() - 9.81).abs() < 0.5);
        }
    }

    #[test]
    fn test_shake_burst_moves_the_axes() {
        let mut sim = MotionSimulator::new("sim-1", 20.0);
        sim.shake_probability = 1.0;
        let mut max_offset: f64 = 0.0;
        for _ in 0..50 {
            let sample = sim.generate();
            max_offset = max_offset.max(sample.x.abs()).max(sample.y.abs());
        }
        assert!(max_offset > 1.0, "bursts should leave the noise floor");
    }
}
