//! Desktop stand-in for an AR runtime.
//!
//! Sessions are toggled from the UI, the hit-test source is granted on the
//! next frame, and hits are where the pointer ray meets the floor (y = 0).

use barchart::context::{ChartEvent, EventQueue, HostCommand};
use barchart::picking::Ray;
use barchart::XrHost;
use glam::Mat4;

/// Reticle size multiplier; desktop scenes are measured in chart units, not metres.
pub const SIMULATED_RETICLE_SCALE: f32 = 40.0;

#[derive(Debug, Default)]
pub struct SimulatedXr {
    supported: bool,
    presenting: bool,
    pointer_ray: Option<Ray>,
}

impl SimulatedXr {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            ..Default::default()
        }
    }

    /// Start or end a session, announcing it on `queue`.
    pub fn toggle_session(&mut self, queue: &mut EventQueue) {
        if !self.supported {
            log::warn!("AR session requested but XR is not supported");
            return;
        }
        self.presenting = !self.presenting;
        queue.push(if self.presenting {
            ChartEvent::SessionStarted
        } else {
            ChartEvent::SessionEnded
        });
    }

    pub fn set_pointer_ray(&mut self, ray: Option<Ray>) {
        self.pointer_ray = ray;
    }
}

impl XrHost for SimulatedXr {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_presenting(&self) -> bool {
        self.presenting
    }

    fn execute(&mut self, command: HostCommand, queue: &mut EventQueue) {
        match command {
            HostCommand::RequestHitTestSource => {
                if self.presenting {
                    log::debug!("Granting floor hit-test source");
                    queue.push(ChartEvent::HitTestSourceReady);
                }
            }
        }
    }

    fn hit_test(&mut self) -> Vec<Mat4> {
        self.pointer_ray
            .and_then(|ray| ray.intersect_plane_y(0.0).map(|t| ray.at(t)))
            .map(|point| vec![Mat4::from_translation(point)])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unsupported_runtime_never_presents() {
        let mut xr = SimulatedXr::new(false);
        let mut queue = EventQueue::new();
        xr.toggle_session(&mut queue);
        assert!(!xr.is_presenting());
        assert!(queue.is_empty());
    }

    #[test]
    fn toggle_announces_start_and_end() {
        let mut xr = SimulatedXr::new(true);
        let mut queue = EventQueue::new();
        xr.toggle_session(&mut queue);
        assert!(xr.is_presenting());
        assert!(matches!(queue.pop(), Some(ChartEvent::SessionStarted)));
        xr.toggle_session(&mut queue);
        assert!(!xr.is_presenting());
        assert!(matches!(queue.pop(), Some(ChartEvent::SessionEnded)));
    }

    #[test]
    fn hits_are_pointer_on_floor() {
        let mut xr = SimulatedXr::new(true);
        assert!(xr.hit_test().is_empty());

        xr.set_pointer_ray(Some(Ray::new(Vec3::new(5.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 1.0))));
        let hits = xr.hit_test();
        assert_eq!(hits.len(), 1);
        assert!(hits[0]
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(5.0, 0.0, 10.0), 1e-5));

        // Looking up never reaches the floor.
        xr.set_pointer_ray(Some(Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y)));
        assert!(xr.hit_test().is_empty());
    }

    #[test]
    fn source_granted_only_while_presenting() {
        let mut xr = SimulatedXr::new(true);
        let mut queue = EventQueue::new();
        xr.execute(HostCommand::RequestHitTestSource, &mut queue);
        assert!(queue.is_empty());

        xr.toggle_session(&mut queue);
        queue.pop();
        xr.execute(HostCommand::RequestHitTestSource, &mut queue);
        assert!(matches!(queue.pop(), Some(ChartEvent::HitTestSourceReady)));
    }
}
