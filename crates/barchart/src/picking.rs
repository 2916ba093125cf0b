//! Pointer picking against the bar grid.

use crate::layout::{Bar, BarLayout, BarMeta};
use glam::{Mat4, Vec2, Vec3};

/// Tooltip offset from the pointer, in logical pixels.
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Not necessarily normalised; hit distances are in units of `dir`.
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// The same ray expressed in another frame.
    pub fn transformed(&self, m: &Mat4) -> Self {
        Self {
            origin: m.transform_point3(self.origin),
            dir: m.transform_vector3(self.dir),
        }
    }

    /// Distance to the horizontal plane `y = height`, if the ray reaches it.
    pub fn intersect_plane_y(&self, height: f32) -> Option<f32> {
        if self.dir.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.dir.y;
        (t >= 0.0).then_some(t)
    }
}

/// Nearest bar under a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub distance: f32,
    pub meta: BarMeta,
}

/// Pointer position (relative to the viewport) → normalised device coordinates.
pub fn pointer_to_ndc(pointer: Vec2, viewport_origin: Vec2, viewport_size: Vec2) -> Vec2 {
    let rel = (pointer - viewport_origin) / viewport_size.max(Vec2::ONE);
    Vec2::new(rel.x * 2.0 - 1.0, -rel.y * 2.0 + 1.0)
}

/// World-space ray through an NDC point, for a projection with depth in `[0, 1]`.
pub fn ray_from_ndc(ndc: Vec2, view_proj: &Mat4) -> Ray {
    let inv = view_proj.inverse();
    let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
    Ray::new(near, far - near)
}

/// Slab test. Returns the entry distance (or 0 when the origin is inside).
pub fn ray_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.dir[axis];
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        None
    } else {
        Some(t_near.max(0.0))
    }
}

/// Nearest bar hit by a world-space `ray`, with the chart placed by `chart_transform`.
pub fn pick(layout: &BarLayout, chart_transform: &Mat4, ray: &Ray) -> Option<Hit> {
    let local = ray.transformed(&chart_transform.inverse());
    pick_local(&layout.bars, &local)
}

fn pick_local(bars: &[Bar], ray: &Ray) -> Option<Hit> {
    bars.iter()
        .enumerate()
        .filter_map(|(index, bar)| {
            ray_box(ray, bar.min(), bar.max()).map(|distance| Hit {
                index,
                distance,
                meta: bar.meta,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use crate::layout::{build_layout, LayoutParams};
    use glam::Quat;

    fn layout() -> BarLayout {
        build_layout(
            &[
                Record::new(2000, vec![10.0, 20.0]),
                Record::new(2001, vec![5.0, 40.0]),
            ],
            &LayoutParams::default(),
        )
    }

    #[test]
    fn ndc_corners() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(pointer_to_ndc(Vec2::ZERO, Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(size, Vec2::ZERO, size), Vec2::new(1.0, -1.0));
        assert_eq!(
            pointer_to_ndc(Vec2::new(150.0, 80.0), Vec2::new(50.0, 30.0), size),
            Vec2::ZERO
        );
    }

    #[test]
    fn slab_test_hits_and_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.5, -5.0), Vec3::Z);
        assert_eq!(ray_box(&ray, Vec3::ZERO - 1.0, Vec3::ONE), Some(4.0));

        let miss = Ray::new(Vec3::new(3.0, 0.5, -5.0), Vec3::Z);
        assert_eq!(ray_box(&miss, Vec3::ZERO - 1.0, Vec3::ONE), None);

        let behind = Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::Z);
        assert_eq!(ray_box(&behind, Vec3::ZERO - 1.0, Vec3::ONE), None);

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray_box(&inside, Vec3::ZERO - 1.0, Vec3::ONE), Some(0.0));
    }

    #[test]
    fn top_down_ray_picks_bar_below() {
        let layout = layout();
        let target = layout.get(1, 1).unwrap();
        let ray = Ray::new(
            Vec3::new(target.center.x, 1000.0, target.center.z),
            Vec3::NEG_Y,
        );
        let hit = pick(&layout, &Mat4::IDENTITY, &ray).unwrap();
        assert_eq!(hit.meta, target.meta);
        assert!((hit.distance - (1000.0 - target.height())).abs() < 1e-3);
    }

    #[test]
    fn nearest_bar_wins_along_a_row() {
        let layout = layout();
        // Along +z through the first column: group 0 is at z = -10, group 1 at z = 10.
        let first = layout.get(0, 0).unwrap();
        let ray = Ray::new(Vec3::new(first.center.x, 1.0, -100.0), Vec3::Z);
        assert_eq!(pick(&layout, &Mat4::IDENTITY, &ray).unwrap().meta.group, 0);

        let reverse = Ray::new(Vec3::new(first.center.x, 1.0, 100.0), Vec3::NEG_Z);
        assert_eq!(pick(&layout, &Mat4::IDENTITY, &reverse).unwrap().meta.group, 1);
    }

    #[test]
    fn empty_space_picks_nothing() {
        let ray = Ray::new(Vec3::new(500.0, 1000.0, 0.0), Vec3::NEG_Y);
        assert!(pick(&layout(), &Mat4::IDENTITY, &ray).is_none());
    }

    #[test]
    fn picking_respects_chart_transform() {
        let layout = layout();
        let target = layout.get(1, 1).unwrap();
        let offset = Vec3::new(50.0, 0.0, -30.0);
        let transform =
            Mat4::from_scale_rotation_translation(Vec3::splat(0.25), Quat::IDENTITY, offset);

        let world = offset + target.center * 0.25;
        let ray = Ray::new(Vec3::new(world.x, 100.0, world.z), Vec3::NEG_Y);
        let hit = pick(&layout, &transform, &ray).unwrap();
        assert_eq!(hit.meta, target.meta);

        // The untransformed position no longer hits anything there.
        let stale = Ray::new(
            Vec3::new(target.center.x, 1000.0, target.center.z),
            Vec3::NEG_Y,
        );
        assert!(pick(&layout, &transform, &stale).is_none());
    }

    #[test]
    fn ray_from_ndc_centre_looks_at_target() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 200.0, 400.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(50f32.to_radians(), 16.0 / 9.0, 0.1, 10_000.0);
        let ray = ray_from_ndc(Vec2::ZERO, &(proj * view));

        let expected = (Vec3::ZERO - Vec3::new(0.0, 200.0, 400.0)).normalize();
        assert!(ray.dir.normalize().abs_diff_eq(expected, 1e-3));
        let t = ray.intersect_plane_y(0.0).unwrap();
        assert!(ray.at(t).abs_diff_eq(Vec3::ZERO, 0.5));
    }
}
