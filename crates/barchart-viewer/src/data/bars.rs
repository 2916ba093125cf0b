use crate::data::types::{BarInstance, BarsGpu};
use barchart::layout::BarLayout;
use barchart::ChartContext;
use rayon::prelude::*;
use wgpu::util::DeviceExt;

/// One instance per bar, in layout order. The hovered bar is flagged for highlighting.
pub fn bar_instances(layout: &BarLayout, hovered: Option<usize>) -> Vec<BarInstance> {
    layout
        .bars
        .par_iter()
        .enumerate()
        .map(|(i, bar)| BarInstance {
            center: bar.center.to_array(),
            size: bar.size.to_array(),
            color: bar.color,
            highlight: if hovered == Some(i) { 1.0 } else { 0.0 },
        })
        .collect()
}

impl BarsGpu {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        Self {
            vtx: create_instance_buffer(device, &[], capacity),
            capacity: capacity.max(1),
            instances_len: 0,
            synced: None,
        }
    }

    /// Re-upload instances when the layout or the hovered bar changed.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, chart: &ChartContext) {
        let hovered = chart.hovered.filter(|&i| i < chart.layout.bars.len());
        let key = (chart.revision, hovered);
        if self.synced == Some(key) {
            return;
        }

        let instances = bar_instances(&chart.layout, hovered);
        let len = instances.len() as u32;

        if len > self.capacity {
            log::debug!("Growing bar instance buffer {} -> {}", self.capacity, len);
            self.vtx = create_instance_buffer(device, &instances, len);
            self.capacity = len;
        } else if !instances.is_empty() {
            queue.write_buffer(&self.vtx, 0, bytemuck::cast_slice(&instances));
        }

        self.instances_len = len;
        self.synced = Some(key);
    }
}

fn create_instance_buffer(device: &wgpu::Device, instances: &[BarInstance], capacity: u32) -> wgpu::Buffer {
    let usage = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;
    if instances.is_empty() {
        return device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bar Instances"),
            size: (capacity.max(1) as usize * std::mem::size_of::<BarInstance>()) as u64,
            usage,
            mapped_at_creation: false,
        });
    }
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Bar Instances"),
        contents: bytemuck::cast_slice(instances),
        usage,
    })
}
