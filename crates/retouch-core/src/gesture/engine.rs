//! Pan, pinch and wheel zoom with inertial easing.
//!
//! Input moves a *target* transform immediately. A *display* transform eases
//! toward the target once per animation frame, and after the last pointer
//! lifts the remaining pan velocity keeps both moving until friction brings
//! it to rest.
//!
//! ## Frame Scheduling
//! The engine is either [`AnimationState::Idle`] or
//! [`AnimationState::Animating`]. While animating exactly one frame is
//! outstanding: the host schedules a callback when a method returns
//! [`FrameRequest::Schedule`] and calls [`GestureTransformEngine::tick`] from
//! it. A tick that arrives while idle (e.g. after [`reset`]) does nothing.
//!
//! [`reset`]: GestureTransformEngine::reset

use crate::config::GestureConfig;
use crate::geometry::Size;

use super::pointer::{PointerSample, PointerTable};
use super::transform::{Transform, Velocity};

/// Whether an animation frame is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Animating,
}

/// What the host should do after an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum FrameRequest {
    /// Schedule one animation frame and call `tick` from it.
    Schedule,
    /// Nothing to schedule: either at rest or a frame is already pending.
    Skip,
}

impl FrameRequest {
    pub fn should_schedule(self) -> bool {
        self == FrameRequest::Schedule
    }
}

/// Viewport transform controller driven by pointer input.
#[derive(Debug, Clone)]
pub struct GestureTransformEngine {
    config: GestureConfig,
    viewport: Size,
    pointers: PointerTable,
    display: Transform,
    target: Transform,
    velocity: Velocity,
    pinch_distance: Option<f64>,
    state: AnimationState,
}

impl Default for GestureTransformEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default(), Size::default())
    }
}

impl GestureTransformEngine {
    pub fn new(config: GestureConfig, viewport: Size) -> Self {
        Self {
            config,
            viewport,
            pointers: PointerTable::new(),
            display: Transform::IDENTITY,
            target: Transform::IDENTITY,
            velocity: Velocity::ZERO,
            pinch_distance: None,
            state: AnimationState::Idle,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Transform to render this frame.
    pub fn display(&self) -> Transform {
        self.display
    }

    /// Transform the display is easing toward.
    pub fn target(&self) -> Transform {
        self.target
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == AnimationState::Animating
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointers(&self) -> &PointerTable {
        &self.pointers
    }

    /// A pointer went down. Any fling in progress stops.
    pub fn pointer_down(&mut self, sample: PointerSample) -> FrameRequest {
        self.pointers.insert(sample);
        self.velocity = Velocity::ZERO;
        self.reset_pinch_baseline();
        tracing::debug!(id = sample.id, active = self.pointers.len(), "pointer down");
        self.request_frame()
    }

    /// A tracked pointer moved. One pointer pans; two or more pinch using
    /// the two earliest pointers. Moves of untracked ids are ignored.
    pub fn pointer_move(&mut self, sample: PointerSample) -> FrameRequest {
        let Some(previous) = self.pointers.update(sample) else {
            tracing::debug!(id = sample.id, "ignoring move for untracked pointer");
            return FrameRequest::Skip;
        };

        if self.pointers.len() == 1 {
            let dt = sample.t - previous.t;
            self.apply_pointer_delta(sample.x - previous.x, sample.y - previous.y, dt);
        } else if self.pointers.is_primary(sample.id) {
            if let Some((a, b)) = self.pointers.primary_pair() {
                let distance = a.distance_to(b);
                let (mx, my) = a.midpoint(b);
                if let Some(previous_distance) = self.pinch_distance.filter(|d| *d > 0.0) {
                    self.apply_pinch(distance / previous_distance, mx, my);
                }
                self.pinch_distance = Some(distance);
            }
        }

        self.request_frame()
    }

    /// A pointer lifted. Releasing the last pointer leaves the pan velocity
    /// in place to carry the fling.
    pub fn pointer_up(&mut self, id: i32) -> FrameRequest {
        if self.pointers.remove(id).is_none() {
            tracing::debug!(id, "ignoring release of untracked pointer");
            return FrameRequest::Skip;
        }
        self.reset_pinch_baseline();
        tracing::debug!(
            id,
            active = self.pointers.len(),
            vx = self.velocity.vx,
            vy = self.velocity.vy,
            "pointer up"
        );
        self.request_frame()
    }

    /// A pointer was cancelled by the platform. Same as a release, but
    /// without a fling.
    pub fn pointer_cancel(&mut self, id: i32) -> FrameRequest {
        if self.pointers.remove(id).is_none() {
            return FrameRequest::Skip;
        }
        self.velocity = Velocity::ZERO;
        self.reset_pinch_baseline();
        self.request_frame()
    }

    /// Zoom by `factor` around the display point (x, y), e.g. from a wheel
    /// event. Non-positive or non-finite factors are ignored.
    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) -> FrameRequest {
        if !(factor.is_finite() && factor > 0.0) {
            return FrameRequest::Skip;
        }
        self.apply_pinch(factor, x, y);
        self.request_frame()
    }

    /// Move the target by a pointer displacement that happened over `dt`
    /// milliseconds, and record the per-frame velocity for the fling.
    pub fn apply_pointer_delta(&mut self, dx: f64, dy: f64, dt: f64) {
        self.target.tx += dx;
        self.target.ty += dy;

        self.velocity = if dt > 0.0 {
            let frames = self.config.frame_ms / dt;
            Velocity::new(dx * frames, dy * frames)
        } else {
            Velocity::new(dx, dy)
        };
    }

    /// Scale the target by `factor` while keeping the image point under
    /// (x, y) fixed on screen. The resulting scale is clamped.
    pub fn apply_pinch(&mut self, factor: f64, x: f64, y: f64) {
        let previous = self.target.scale;
        let scale = (previous * factor).clamp(self.config.min_scale, self.config.max_scale);
        let ratio = scale / previous;

        let (ox, oy) = self.target.image_center(self.viewport);
        self.target.tx -= (ratio - 1.0) * (x - ox);
        self.target.ty -= (ratio - 1.0) * (y - oy);
        self.target.scale = scale;
        self.velocity = Velocity::ZERO;
    }

    /// Advance one animation frame.
    ///
    /// Returns [`FrameRequest::Schedule`] if another frame is needed. On
    /// convergence the display snaps to the target and the engine goes idle.
    pub fn tick(&mut self) -> FrameRequest {
        if self.state == AnimationState::Idle {
            return FrameRequest::Skip;
        }

        let v = self.velocity;
        if self.pointers.is_empty() && !v.is_zero() {
            self.target.tx += v.vx;
            self.target.ty += v.vy;
            self.display.tx += v.vx;
            self.display.ty += v.vy;
        }

        let k = self.config.smoothing;
        self.display.tx += (self.target.tx - self.display.tx) * k;
        self.display.ty += (self.target.ty - self.display.ty) * k;
        self.display.scale += (self.target.scale - self.display.scale) * k;

        self.velocity.vx *= self.config.friction;
        self.velocity.vy *= self.config.friction;
        if self.velocity.is_below(self.config.velocity_epsilon) {
            self.velocity = Velocity::ZERO;
        }

        if self.is_settled() {
            self.display = self.target;
            self.state = AnimationState::Idle;
            tracing::debug!(
                tx = self.display.tx,
                ty = self.display.ty,
                scale = self.display.scale,
                "transform settled"
            );
            return FrameRequest::Skip;
        }

        FrameRequest::Schedule
    }

    /// Return to the identity transform and drop the current gesture. Any
    /// outstanding frame becomes a no-op.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.display = Transform::IDENTITY;
        self.target = Transform::IDENTITY;
        self.velocity = Velocity::ZERO;
        self.pinch_distance = None;
        self.state = AnimationState::Idle;
    }

    fn is_settled(&self) -> bool {
        self.velocity.is_zero()
            && self.display.is_close(
                &self.target,
                self.config.converge_translation,
                self.config.converge_scale,
            )
    }

    /// The pointer set changed, so the previous distance no longer
    /// describes the same pair.
    fn reset_pinch_baseline(&mut self) {
        self.pinch_distance = self.pointers.primary_pair().map(|(a, b)| a.distance_to(b));
    }

    fn request_frame(&mut self) -> FrameRequest {
        let at_rest = self.velocity.is_zero() && self.display == self.target;
        if self.state == AnimationState::Animating || at_rest {
            return FrameRequest::Skip;
        }
        self.state = AnimationState::Animating;
        FrameRequest::Schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 16.67;

    fn engine() -> GestureTransformEngine {
        GestureTransformEngine::new(GestureConfig::default(), Size::new(400.0, 400.0))
    }

    fn p(id: i32, x: f64, y: f64, t: f64) -> PointerSample {
        PointerSample::new(id, x, y, t)
    }

    /// Tick until idle, returning the number of frames run.
    fn run_to_rest(engine: &mut GestureTransformEngine) -> usize {
        let mut frames = 0;
        while engine.tick().should_schedule() {
            frames += 1;
            assert!(frames < 10_000, "animation never converged");
        }
        frames + 1
    }

    #[test]
    fn test_pan_moves_target_immediately() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 100.0, 100.0, 0.0));
        let request = e.pointer_move(p(1, 130.0, 90.0, FRAME));

        assert_eq!(request, FrameRequest::Schedule);
        assert_eq!(e.target(), Transform::new(30.0, -10.0, 1.0));
        assert_eq!(e.display(), Transform::IDENTITY);
        assert!((e.velocity().vx - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_normalized_to_frame() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        let _ = e.pointer_move(p(1, 10.0, 0.0, 2.0 * FRAME));
        assert!((e.velocity().vx - 5.0).abs() < 1e-9);

        // Zero elapsed time uses the raw displacement
        let _ = e.pointer_move(p(1, 14.0, 0.0, 2.0 * FRAME));
        assert_eq!(e.velocity(), Velocity::new(4.0, 0.0));
    }

    #[test]
    fn test_only_one_frame_outstanding() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        assert_eq!(e.pointer_move(p(1, 10.0, 0.0, FRAME)), FrameRequest::Schedule);
        assert_eq!(e.pointer_move(p(1, 20.0, 0.0, 2.0 * FRAME)), FrameRequest::Skip);
        assert!(e.is_animating());
    }

    #[test]
    fn test_fling_continues_after_release() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        let _ = e.pointer_move(p(1, 20.0, 0.0, FRAME));
        let _ = e.pointer_up(1);

        let before = e.target().tx;
        assert!(e.tick().should_schedule());
        assert!(e.target().tx > before, "velocity should carry the target");

        run_to_rest(&mut e);
        assert!(!e.is_animating());
        assert_eq!(e.display(), e.target());
        assert!(e.velocity().is_zero());
        assert!(e.target().tx > 40.0);
    }

    #[test]
    fn test_no_frames_after_release_with_zero_velocity() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        let _ = e.pointer_move(p(1, 25.0, 0.0, FRAME));
        // Hold still: the last move carries no displacement
        let _ = e.pointer_move(p(1, 25.0, 0.0, 2.0 * FRAME));
        assert!(e.velocity().is_zero());

        let _ = e.pointer_up(1);
        run_to_rest(&mut e);
        assert_eq!(e.target().tx, 25.0);
        assert_eq!(e.display().tx, 25.0);

        for _ in 0..5 {
            assert_eq!(e.tick(), FrameRequest::Skip);
        }
        assert_eq!(e.state(), AnimationState::Idle);
        assert_eq!(e.display().tx, 25.0);
    }

    #[test]
    fn test_release_at_rest_schedules_nothing() {
        let mut e = engine();
        assert_eq!(e.pointer_down(p(1, 5.0, 5.0, 0.0)), FrameRequest::Skip);
        assert_eq!(e.pointer_up(1), FrameRequest::Skip);
        assert!(!e.is_animating());
    }

    #[test]
    fn test_pinch_scales_by_distance_ratio() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 150.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 250.0, 200.0, 0.0));
        let _ = e.pointer_move(p(2, 350.0, 200.0, FRAME));

        assert!((e.target().scale - 2.0).abs() < 1e-9);
        assert!(e.velocity().is_zero());
    }

    #[test]
    fn test_pinch_scale_clamps_to_max() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 200.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 201.0, 200.0, 0.0));
        let _ = e.pointer_move(p(2, 300.0, 200.0, FRAME));

        assert_eq!(e.target().scale, 4.0);
    }

    #[test]
    fn test_pinch_scale_clamps_to_min() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 400.0, 200.0, 0.0));
        let _ = e.pointer_move(p(2, 1.0, 200.0, FRAME));

        assert_eq!(e.target().scale, 0.3);
    }

    #[test]
    fn test_pinch_keeps_midpoint_fixed() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 50.0, 80.0, 0.0));
        let _ = e.pointer_down(p(2, 150.0, 80.0, 0.0));

        // New midpoint is (87.5, 80)
        let before = e.target().image_point_at(e.viewport(), 87.5, 80.0);
        let _ = e.pointer_move(p(1, 25.0, 80.0, FRAME));
        let after = e.target().image_point_at(e.viewport(), 87.5, 80.0);

        assert!((after.0 - before.0).abs() < 1e-9);
        assert!((after.1 - before.1).abs() < 1e-9);
        assert!(e.target().scale > 1.0);
    }

    #[test]
    fn test_untracked_pointer_is_ignored() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        assert_eq!(e.pointer_move(p(42, 90.0, 90.0, FRAME)), FrameRequest::Skip);
        assert_eq!(e.pointer_up(42), FrameRequest::Skip);
        assert_eq!(e.pointer_cancel(42), FrameRequest::Skip);
        assert_eq!(e.target(), Transform::IDENTITY);
        assert_eq!(e.pointer_count(), 1);
    }

    #[test]
    fn test_third_pointer_does_not_drive_pinch() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 100.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 200.0, 200.0, 0.0));
        let _ = e.pointer_down(p(3, 300.0, 300.0, 0.0));

        let _ = e.pointer_move(p(3, 0.0, 0.0, FRAME));
        assert_eq!(e.target(), Transform::IDENTITY);

        let _ = e.pointer_move(p(2, 300.0, 200.0, FRAME));
        assert!((e.target().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_set_change_resets_pinch_baseline() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 100.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 200.0, 200.0, 0.0));
        let _ = e.pointer_down(p(3, 400.0, 200.0, 0.0));
        let _ = e.pointer_up(1);

        // New primary pair (2, 3) is 200 apart; moving 3 to 300 halves it
        let _ = e.pointer_move(p(3, 300.0, 200.0, FRAME));
        assert!((e.target().scale - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_to_pan_handoff() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 100.0, 200.0, 0.0));
        let _ = e.pointer_down(p(2, 200.0, 200.0, 0.0));
        let _ = e.pointer_up(2);

        let _ = e.pointer_move(p(1, 110.0, 200.0, FRAME));
        assert_eq!(e.target(), Transform::new(10.0, 0.0, 1.0));
    }

    #[test]
    fn test_cancel_drops_fling() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        let _ = e.pointer_move(p(1, 30.0, 0.0, FRAME));
        let _ = e.pointer_cancel(1);
        assert!(e.velocity().is_zero());

        run_to_rest(&mut e);
        assert_eq!(e.target().tx, 30.0);
    }

    #[test]
    fn test_wheel_zoom_about_cursor() {
        let mut e = engine();
        let before = e.target().image_point_at(e.viewport(), 300.0, 100.0);
        assert_eq!(e.zoom_at(1.5, 300.0, 100.0), FrameRequest::Schedule);
        let after = e.target().image_point_at(e.viewport(), 300.0, 100.0);

        assert!((e.target().scale - 1.5).abs() < 1e-9);
        assert!((after.0 - before.0).abs() < 1e-9);
        assert!((after.1 - before.1).abs() < 1e-9);

        assert_eq!(e.zoom_at(0.0, 0.0, 0.0), FrameRequest::Skip);
        assert_eq!(e.zoom_at(f64::NAN, 0.0, 0.0), FrameRequest::Skip);
    }

    #[test]
    fn test_display_eases_toward_target() {
        let mut e = engine();
        let _ = e.zoom_at(2.0, 200.0, 200.0);

        let _ = e.tick();
        assert!((e.display().scale - 1.15).abs() < 1e-9);
        let _ = e.tick();
        assert!((e.display().scale - (1.15 + 0.85 * 0.15)).abs() < 1e-9);

        run_to_rest(&mut e);
        assert_eq!(e.display().scale, 2.0);
    }

    #[test]
    fn test_reset_returns_to_identity() {
        let mut e = engine();
        let _ = e.pointer_down(p(1, 0.0, 0.0, 0.0));
        let _ = e.pointer_move(p(1, 50.0, 50.0, FRAME));
        let _ = e.zoom_at(3.0, 10.0, 10.0);

        e.reset();
        assert_eq!(e.display(), Transform::IDENTITY);
        assert_eq!(e.target(), Transform::IDENTITY);
        assert_eq!(e.pointer_count(), 0);
        // The frame scheduled before the reset is now stale
        assert_eq!(e.tick(), FrameRequest::Skip);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> GestureTransformEngine {
        GestureTransformEngine::new(GestureConfig::default(), Size::new(800.0, 600.0))
    }

    proptest! {
        /// Property: Scale stays within [0.3, 4.0] for any pinch sequence.
        #[test]
        fn prop_scale_always_clamped(
            factors in prop::collection::vec(0.001f64..1000.0, 1..20),
            x in 0.0f64..800.0,
            y in 0.0f64..600.0,
        ) {
            let mut e = engine();
            for factor in factors {
                let _ = e.zoom_at(factor, x, y);
                prop_assert!(e.target().scale >= 0.3);
                prop_assert!(e.target().scale <= 4.0);
            }
            while e.tick().should_schedule() {}
            prop_assert!(e.display().scale >= 0.3 && e.display().scale <= 4.0);
        }

        /// Property: The image point under the focal point is unchanged by a
        /// pinch update, clamped or not.
        #[test]
        fn prop_focal_point_preserved(
            tx in -300.0f64..300.0,
            ty in -300.0f64..300.0,
            start_factor in 0.3f64..4.0,
            factor in 0.05f64..20.0,
            x in 0.0f64..800.0,
            y in 0.0f64..600.0,
        ) {
            let mut e = engine();
            e.apply_pointer_delta(tx, ty, 16.67);
            e.apply_pinch(start_factor, 400.0, 300.0);

            let before = e.target().image_point_at(e.viewport(), x, y);
            e.apply_pinch(factor, x, y);
            let after = e.target().image_point_at(e.viewport(), x, y);

            prop_assert!((after.0 - before.0).abs() < 1e-6);
            prop_assert!((after.1 - before.1).abs() < 1e-6);
        }

        /// Property: A fling always comes to rest with display equal to target.
        #[test]
        fn prop_fling_converges(
            dx in -200.0f64..200.0,
            dy in -200.0f64..200.0,
            dt in 1.0f64..100.0,
        ) {
            let mut e = engine();
            let _ = e.pointer_down(PointerSample::new(1, 400.0, 300.0, 0.0));
            let _ = e.pointer_move(PointerSample::new(1, 400.0 + dx, 300.0 + dy, dt));
            let _ = e.pointer_up(1);

            let mut frames = 0;
            while e.tick().should_schedule() {
                frames += 1;
                prop_assert!(frames < 2_000);
            }
            prop_assert_eq!(e.display(), e.target());
            prop_assert!(e.velocity().is_zero());
            prop_assert_eq!(e.tick(), FrameRequest::Skip);
        }
    }
}
