//! Movement paths for kinematic platforms.

use glam::Vec2;

use crate::error::{PhysicsError, Result};

/// One straight leg of a movement path, travelled at constant velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub start: Vec2,
    pub end: Vec2,
    /// Seconds to travel from `start` to `end`.
    pub duration: f32,
    pub velocity: Vec2,
}

impl PathSegment {
    pub fn new(start: Vec2, end: Vec2, duration: f32) -> Self {
        let velocity = if duration > 0.0 {
            (end - start) / duration
        } else {
            Vec2::ZERO
        };
        Self {
            start,
            end,
            duration,
            velocity,
        }
    }
}

/// Cyclic sequence of path segments and the cursor into it.
#[derive(Debug, Clone)]
pub struct MovementPath {
    segments: Vec<PathSegment>,
    pub current: usize,
}

impl MovementPath {
    /// Build a path, rejecting empty lists and non-positive durations.
    pub fn new(segments: Vec<PathSegment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(PhysicsError::EmptyPath);
        }
        for (index, seg) in segments.iter().enumerate() {
            if !(seg.duration.is_finite() && seg.duration > 0.0) {
                return Err(PhysicsError::InvalidSegmentDuration {
                    index,
                    duration: seg.duration,
                });
            }
        }
        Ok(Self {
            segments,
            current: 0,
        })
    }

    /// Closed loop through `waypoints` at constant `speed` (px/s), returning
    /// from the last waypoint to the first.
    pub fn looped(waypoints: &[Vec2], speed: f32) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(PhysicsError::EmptyPath);
        }
        let segments = waypoints
            .iter()
            .zip(waypoints.iter().cycle().skip(1))
            .map(|(&start, &end)| PathSegment::new(start, end, start.distance(end) / speed))
            .collect();
        Self::new(segments)
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn current_segment(&self) -> &PathSegment {
        &self.segments[self.current % self.segments.len()]
    }

    /// Move the cursor to the next segment, wrapping past the last one.
    pub fn advance(&mut self) -> &PathSegment {
        self.current = (self.current + 1) % self.segments.len();
        &self.segments[self.current]
    }
}
