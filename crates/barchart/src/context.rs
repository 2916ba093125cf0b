//! Chart state and the event queue that drives it.
//!
//! All mutation goes through [`ChartContext::apply`] (queued events) and
//! [`ChartContext::frame`] (once per rendered frame). The host never touches
//! the fields directly; it reads them to render.

use crate::dataset::Dataset;
use crate::layout::{build_layout, legend, Bar, BarLayout, LayoutParams, LegendEntry};
use crate::picking::{pick, Ray, TOOLTIP_OFFSET};
use crate::presentation::{PresentationMode, SceneConfig, AR_SCALE};
use glam::{Mat4, Quat, Vec2, Vec3};
use std::collections::VecDeque;

/// Input to the chart, in arrival order.
#[derive(Debug, Clone)]
pub enum ChartEvent {
    /// A fresh load; rebuilds the layout.
    DataLoaded(Dataset),
    /// Pointer moved. `ray` is in world space, `screen` in logical pixels.
    PointerMoved { ray: Ray, screen: Vec2 },
    PointerLeft,
    SessionStarted,
    /// Host ended the AR session; hit-test state is dropped.
    SessionEnded,
    HitTestSourceReady,
    /// Controller select while presenting.
    Select,
}

/// Requests from the chart to the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    RequestHitTestSource,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ChartEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ChartEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<ChartEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitTestState {
    #[default]
    Idle,
    Requested,
    Ready,
}

/// Where the chart sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub visible: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            visible: true,
        }
    }
}

impl Placement {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    pub visible: bool,
    pub pose: Mat4,
}

impl Default for Reticle {
    fn default() -> Self {
        Self {
            visible: false,
            pose: Mat4::IDENTITY,
        }
    }
}

/// Floating label next to the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub position: Vec2,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ChartContext {
    pub params: LayoutParams,
    pub ar_scale: f32,
    pub layout: BarLayout,
    /// Bumped on every rebuild so hosts can tell when to re-upload bars.
    pub revision: u64,
    pub legend: Vec<LegendEntry>,
    pub mode: PresentationMode,
    pub scene: SceneConfig,
    pub placement: Placement,
    pub reticle: Reticle,
    pub hit_test: HitTestState,
    /// Index into `layout.bars` of the bar under the pointer.
    pub hovered: Option<usize>,
    pub tooltip: Option<Tooltip>,
}

impl Default for ChartContext {
    fn default() -> Self {
        Self::new(LayoutParams::default(), AR_SCALE)
    }
}

impl ChartContext {
    pub fn new(params: LayoutParams, ar_scale: f32) -> Self {
        Self {
            params,
            ar_scale,
            layout: BarLayout::default(),
            revision: 0,
            legend: Vec::new(),
            mode: PresentationMode::Desktop,
            scene: SceneConfig::for_mode(PresentationMode::Desktop, ar_scale),
            placement: Placement::default(),
            reticle: Reticle::default(),
            hit_test: HitTestState::Idle,
            hovered: None,
            tooltip: None,
        }
    }

    /// Chart-to-world transform.
    pub fn chart_transform(&self) -> Mat4 {
        self.placement.transform()
    }

    /// Apply every queued event in order.
    pub fn drain(&mut self, queue: &mut EventQueue) {
        while let Some(event) = queue.pop() {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: ChartEvent) {
        match event {
            ChartEvent::DataLoaded(dataset) => self.rebuild(&dataset),
            ChartEvent::PointerMoved { ray, screen } => self.hover(&ray, screen),
            ChartEvent::PointerLeft => self.clear_hover(),
            ChartEvent::SessionStarted => {
                log::info!("AR session started");
            }
            ChartEvent::SessionEnded => {
                log::info!("AR session ended");
                self.hit_test = HitTestState::Idle;
            }
            ChartEvent::HitTestSourceReady => {
                if self.hit_test == HitTestState::Requested {
                    self.hit_test = HitTestState::Ready;
                } else {
                    log::debug!("Ignoring hit-test source in state {:?}", self.hit_test);
                }
            }
            ChartEvent::Select => self.place_at_reticle(),
        }
    }

    /// Per-frame step. `hits` are the host's hit poses, first one nearest.
    pub fn frame(&mut self, presenting: bool, hits: &[Mat4]) -> Vec<HostCommand> {
        let mut commands = Vec::new();

        if presenting {
            if self.hit_test == HitTestState::Idle {
                self.hit_test = HitTestState::Requested;
                commands.push(HostCommand::RequestHitTestSource);
            }

            if self.hit_test == HitTestState::Ready {
                match hits.first() {
                    Some(pose) => {
                        self.reticle.visible = true;
                        self.reticle.pose = *pose;
                    }
                    None => self.reticle.visible = false,
                }
            }
        }

        self.set_mode(PresentationMode::from_presenting(presenting));
        commands
    }

    fn set_mode(&mut self, mode: PresentationMode) {
        if mode != self.mode {
            log::debug!("Presentation mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.scene = SceneConfig::for_mode(mode, self.ar_scale);
        self.placement.scale = self.scene.chart_scale;
    }

    fn rebuild(&mut self, dataset: &Dataset) {
        self.layout = build_layout(&dataset.records, &self.params);
        self.legend = legend(self.layout.groups);
        self.revision += 1;
        self.clear_hover();
        log::info!(
            "Chart rebuilt: {} bars, global max {}",
            self.layout.bars.len(),
            self.layout.global_max
        );
    }

    fn hover(&mut self, ray: &Ray, screen: Vec2) {
        match pick(&self.layout, &self.chart_transform(), ray) {
            Some(hit) => {
                let (title, body) = hit.meta.tooltip_lines();
                self.hovered = Some(hit.index);
                self.tooltip = Some(Tooltip {
                    position: screen + TOOLTIP_OFFSET,
                    title,
                    body,
                });
            }
            None => self.clear_hover(),
        }
    }

    pub fn hovered_bar(&self) -> Option<&Bar> {
        self.hovered.and_then(|i| self.layout.bars.get(i))
    }

    fn clear_hover(&mut self) {
        self.hovered = None;
        self.tooltip = None;
    }

    fn place_at_reticle(&mut self) {
        if !self.reticle.visible {
            return;
        }
        let (_, rotation, translation) = self.reticle.pose.to_scale_rotation_translation();
        self.placement = Placement {
            position: translation,
            rotation,
            scale: self.ar_scale,
            visible: true,
        };
        self.reticle.visible = false;
        log::info!("Chart placed at {:?}", translation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    fn loaded() -> ChartContext {
        let mut ctx = ChartContext::default();
        ctx.apply(ChartEvent::DataLoaded(Dataset::from_records(vec![
            Record::new(2000, vec![10.0, 20.0]),
            Record::new(2001, vec![5.0, 40.0]),
        ])));
        ctx
    }

    fn hit_pose() -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.5),
            Vec3::new(1.0, -0.5, -2.0),
        )
    }

    #[test]
    fn queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(ChartEvent::SessionStarted);
        queue.push(ChartEvent::Select);
        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(ChartEvent::SessionStarted)));
        assert!(matches!(queue.pop(), Some(ChartEvent::Select)));
        assert!(queue.is_empty());
    }

    #[test]
    fn data_loaded_builds_layout_and_legend() {
        let ctx = loaded();
        assert_eq!(ctx.layout.bars.len(), 4);
        assert_eq!(ctx.legend.len(), 2);
        assert_eq!(ctx.revision, 1);
    }

    #[test]
    fn hover_shows_and_hides_tooltip() {
        let mut ctx = loaded();
        let bar = *ctx.layout.get(1, 1).unwrap();
        let mut queue = EventQueue::new();
        queue.push(ChartEvent::PointerMoved {
            ray: Ray::new(Vec3::new(bar.center.x, 500.0, bar.center.z), Vec3::NEG_Y),
            screen: Vec2::new(100.0, 50.0),
        });
        ctx.drain(&mut queue);

        assert_eq!(ctx.hovered_bar().map(|b| b.meta), Some(bar.meta));
        let tip = ctx.tooltip.clone().unwrap();
        assert_eq!(tip.position, Vec2::new(110.0, 60.0));
        assert_eq!(tip.title, "2001");

        ctx.apply(ChartEvent::PointerMoved {
            ray: Ray::new(Vec3::new(400.0, 500.0, 0.0), Vec3::NEG_Y),
            screen: Vec2::ZERO,
        });
        assert!(ctx.hovered.is_none());
        assert!(ctx.tooltip.is_none());
    }

    #[test]
    fn mode_switch_touches_only_controls_ground_and_scale() {
        let mut ctx = loaded();
        ctx.frame(false, &[]);
        let before = ctx.clone();

        ctx.frame(true, &[]);
        assert!(!ctx.scene.controls_enabled);
        assert!(!ctx.scene.ground_visible);
        assert_eq!(ctx.placement.scale, AR_SCALE);
        assert_eq!(ctx.layout, before.layout);
        assert_eq!(ctx.placement.position, before.placement.position);
        assert_eq!(ctx.placement.visible, before.placement.visible);
        assert_eq!(ctx.reticle, before.reticle);

        ctx.frame(false, &[]);
        assert_eq!(ctx.scene, before.scene);
        assert_eq!(ctx.placement, before.placement);
    }

    #[test]
    fn hit_test_source_requested_once_per_session() {
        let mut ctx = loaded();
        assert!(ctx.frame(false, &[]).is_empty());
        assert_eq!(ctx.frame(true, &[]), vec![HostCommand::RequestHitTestSource]);
        assert!(ctx.frame(true, &[]).is_empty());

        ctx.apply(ChartEvent::SessionEnded);
        assert_eq!(ctx.hit_test, HitTestState::Idle);
        assert_eq!(ctx.frame(true, &[]), vec![HostCommand::RequestHitTestSource]);
    }

    #[test]
    fn reticle_follows_first_hit_once_ready() {
        let mut ctx = loaded();
        ctx.frame(true, &[hit_pose()]);
        // Source not ready yet.
        assert!(!ctx.reticle.visible);

        ctx.apply(ChartEvent::HitTestSourceReady);
        ctx.frame(true, &[hit_pose(), Mat4::IDENTITY]);
        assert!(ctx.reticle.visible);
        assert_eq!(ctx.reticle.pose, hit_pose());

        ctx.frame(true, &[]);
        assert!(!ctx.reticle.visible);
    }

    #[test]
    fn select_places_chart_at_reticle() {
        let mut ctx = loaded();
        ctx.frame(true, &[]);
        ctx.apply(ChartEvent::HitTestSourceReady);
        ctx.frame(true, &[hit_pose()]);

        ctx.apply(ChartEvent::Select);
        assert!(!ctx.reticle.visible);
        assert!(ctx.placement.visible);
        assert_eq!(ctx.placement.scale, AR_SCALE);
        assert!(ctx.placement.position.abs_diff_eq(Vec3::new(1.0, -0.5, -2.0), 1e-5));
        let alignment = ctx.placement.rotation.dot(Quat::from_rotation_y(0.5)).abs();
        assert!((alignment - 1.0).abs() < 1e-5);
    }

    #[test]
    fn select_without_reticle_is_a_no_op() {
        let mut ctx = loaded();
        let before = ctx.placement;
        ctx.apply(ChartEvent::Select);
        assert_eq!(ctx.placement, before);
    }

    #[test]
    fn stray_source_ready_is_ignored() {
        let mut ctx = loaded();
        ctx.apply(ChartEvent::HitTestSourceReady);
        assert_eq!(ctx.hit_test, HitTestState::Idle);
    }

    #[test]
    fn hover_tracks_the_picked_bar_among_identical_rows() {
        let mut ctx = ChartContext::default();
        ctx.apply(ChartEvent::DataLoaded(Dataset::from_records(vec![
            Record::new(2000, vec![10.0]),
            Record::new(2000, vec![10.0]),
        ])));
        let second = *ctx.layout.get(0, 1).unwrap();
        assert_eq!(second.meta, ctx.layout.get(0, 0).unwrap().meta);

        ctx.apply(ChartEvent::PointerMoved {
            ray: Ray::new(Vec3::new(second.center.x, 500.0, second.center.z), Vec3::NEG_Y),
            screen: Vec2::ZERO,
        });
        assert_eq!(ctx.hovered, Some(1));
        assert_eq!(ctx.hovered_bar().map(|b| b.center), Some(second.center));
    }

    #[test]
    fn reload_clears_hover() {
        let mut ctx = loaded();
        let bar = *ctx.layout.get(0, 0).unwrap();
        ctx.apply(ChartEvent::PointerMoved {
            ray: Ray::new(Vec3::new(bar.center.x, 500.0, bar.center.z), Vec3::NEG_Y),
            screen: Vec2::ZERO,
        });
        assert!(ctx.hovered.is_some());

        ctx.apply(ChartEvent::DataLoaded(Dataset::default()));
        assert!(ctx.hovered.is_none());
        assert!(ctx.layout.is_empty());
    }
}
