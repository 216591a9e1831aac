//! Headless simulation system
//!
//! Drives an active scene at a fixed frame rate:
//! - Frame time bookkeeping
//! - Physics update and owner sync
//! - Event collection

use arcade2d_core::{ActiveScene, PhysicsError, PhysicsEvent};
use log::{debug, trace};

/// Result of a simulation frame
#[derive(Debug, Default)]
pub struct SimulationResult {
    /// Fixed physics steps taken this frame
    pub steps: u32,
    /// Events the physics world queued during the frame
    pub events: Vec<PhysicsEvent>,
}

/// Totals over a run of frames
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSummary {
    pub frames: u64,
    pub steps: u64,
    pub collisions: usize,
    pub overlaps: usize,
    pub world_bounds: usize,
}

impl SimulationSummary {
    fn record(&mut self, result: &SimulationResult) {
        self.frames += 1;
        self.steps += u64::from(result.steps);
        for event in &result.events {
            match event {
                PhysicsEvent::Collide { .. } | PhysicsEvent::TileCollide { .. } => {
                    self.collisions += 1
                }
                PhysicsEvent::Overlap { .. } | PhysicsEvent::TileOverlap { .. } => {
                    self.overlaps += 1
                }
                PhysicsEvent::WorldBounds { .. } => self.world_bounds += 1,
                _ => {}
            }
        }
    }
}

/// Runs a scene frame by frame with a constant frame delta
pub struct SimulationSystem {
    frame_delta: f32,
    elapsed: f32,
    log_events: bool,
}

impl SimulationSystem {
    /// Create a simulation system feeding `frame_rate` frames per second
    pub fn new(frame_rate: f32) -> Self {
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            60.0
        };
        Self {
            frame_delta: 1.0 / frame_rate,
            elapsed: 0.0,
            log_events: false,
        }
    }

    /// Log every physics event at debug level
    pub fn with_event_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    #[inline]
    pub fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    /// Simulated seconds so far
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Run one simulation frame
    pub fn update(&mut self, scene: &mut ActiveScene) -> Result<SimulationResult, PhysicsError> {
        self.elapsed += self.frame_delta;
        let events = scene.update(self.elapsed, self.frame_delta)?;
        let steps = scene
            .world
            .physics()
            .map_or(0, |physics| physics.steps_last_frame());
        let result = SimulationResult { steps, events };

        trace!(
            "Frame at {:.3}s: {} steps, {} events",
            self.elapsed,
            result.steps,
            result.events.len()
        );
        if self.log_events {
            for event in &result.events {
                if !matches!(event, PhysicsEvent::WorldStep { .. }) {
                    debug!("{:?}", event);
                }
            }
        }
        Ok(result)
    }

    /// Run `frames` frames, stopping at the first error
    pub fn run(
        &mut self,
        scene: &mut ActiveScene,
        frames: u64,
    ) -> Result<SimulationSummary, PhysicsError> {
        let mut summary = SimulationSummary::default();
        for _ in 0..frames {
            let result = self.update(scene)?;
            summary.record(&result);
        }
        Ok(summary)
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(60.0)
    }
}
