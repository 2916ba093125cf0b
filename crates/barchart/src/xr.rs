//! Seam between the chart and whatever runtime provides AR sessions and hit-testing.

use crate::context::{ChartContext, EventQueue, HitTestState, HostCommand};
use glam::Mat4;

/// Hint shown when the runtime has no AR support.
pub const XR_UNAVAILABLE_HINT: &str = "WebXR not available - fallback 3D view enabled.";

pub trait XrHost {
    /// Whether AR sessions can be started at all.
    fn is_supported(&self) -> bool;

    fn is_presenting(&self) -> bool;

    /// Carry out a chart request. Results come back as events on `queue`,
    /// possibly on a later frame.
    fn execute(&mut self, command: HostCommand, queue: &mut EventQueue);

    /// Hit poses for the current frame, nearest first.
    fn hit_test(&mut self) -> Vec<Mat4>;
}

/// One frame: apply queued events, step the chart, then hand its requests to the host.
pub fn run_frame<H: XrHost + ?Sized>(ctx: &mut ChartContext, host: &mut H, queue: &mut EventQueue) {
    ctx.drain(queue);

    let presenting = host.is_presenting();
    let hits = if presenting && ctx.hit_test == HitTestState::Ready {
        host.hit_test()
    } else {
        Vec::new()
    };

    for command in ctx.frame(presenting, &hits) {
        host.execute(command, queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ChartEvent;
    use glam::Vec3;

    /// Answers a hit-test request on the next frame and always reports one hit.
    #[derive(Default)]
    struct MockHost {
        presenting: bool,
        requests: usize,
        hit_test_calls: usize,
    }

    impl XrHost for MockHost {
        fn is_supported(&self) -> bool {
            true
        }

        fn is_presenting(&self) -> bool {
            self.presenting
        }

        fn execute(&mut self, command: HostCommand, queue: &mut EventQueue) {
            match command {
                HostCommand::RequestHitTestSource => {
                    self.requests += 1;
                    queue.push(ChartEvent::HitTestSourceReady);
                }
            }
        }

        fn hit_test(&mut self) -> Vec<Mat4> {
            self.hit_test_calls += 1;
            vec![Mat4::from_translation(Vec3::new(0.0, 0.0, -1.5))]
        }
    }

    #[test]
    fn desktop_frames_never_touch_hit_testing() {
        let mut ctx = ChartContext::default();
        let mut host = MockHost::default();
        let mut queue = EventQueue::new();

        for _ in 0..3 {
            run_frame(&mut ctx, &mut host, &mut queue);
        }
        assert_eq!(host.requests, 0);
        assert_eq!(host.hit_test_calls, 0);
        assert!(ctx.scene.controls_enabled);
    }

    #[test]
    fn session_requests_source_then_shows_reticle_and_places() {
        let mut ctx = ChartContext::default();
        let mut host = MockHost {
            presenting: true,
            ..Default::default()
        };
        let mut queue = EventQueue::new();

        run_frame(&mut ctx, &mut host, &mut queue);
        assert_eq!(host.requests, 1);
        assert_eq!(ctx.hit_test, HitTestState::Requested);
        assert!(!ctx.reticle.visible);

        run_frame(&mut ctx, &mut host, &mut queue);
        assert_eq!(host.requests, 1);
        assert_eq!(ctx.hit_test, HitTestState::Ready);
        assert!(ctx.reticle.visible);

        queue.push(ChartEvent::Select);
        run_frame(&mut ctx, &mut host, &mut queue);
        // The select ran before the frame step, which then re-showed the reticle.
        assert!(ctx.placement.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.5), 1e-6));
        assert!(ctx.reticle.visible);
    }

    #[test]
    fn session_end_resets_and_next_session_requests_again() {
        let mut ctx = ChartContext::default();
        let mut host = MockHost {
            presenting: true,
            ..Default::default()
        };
        let mut queue = EventQueue::new();
        run_frame(&mut ctx, &mut host, &mut queue);
        run_frame(&mut ctx, &mut host, &mut queue);

        host.presenting = false;
        queue.push(ChartEvent::SessionEnded);
        run_frame(&mut ctx, &mut host, &mut queue);
        assert_eq!(ctx.hit_test, HitTestState::Idle);
        assert!(ctx.scene.ground_visible);

        host.presenting = true;
        run_frame(&mut ctx, &mut host, &mut queue);
        assert_eq!(host.requests, 2);
    }
}
