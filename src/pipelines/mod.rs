//! Render pipelines for the fixed-function frame.
//!
//! - `basic` builds one pipeline per topology and depth mode
//! - `light` holds the per-segment globals uniform (projection and lights)
//! - `text` draws the frame's text runs with glyphon

use std::collections::HashMap;

use crate::render::frame::Topology;

pub mod basic;
pub mod light;
pub mod text;

/// Every pipeline a frame may need, keyed by topology and depth testing.
#[derive(Debug)]
pub struct Pipelines {
    pipelines: HashMap<(Topology, bool), wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        globals_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mut pipelines = HashMap::new();
        for topology in [Topology::PointList, Topology::LineList, Topology::TriangleList] {
            for depth_test in [false, true] {
                let pipeline = basic::mk_frame_pipeline(
                    device,
                    config,
                    globals_layout,
                    texture_layout,
                    topology,
                    depth_test,
                );
                pipelines.insert((topology, depth_test), pipeline);
            }
        }
        Self { pipelines }
    }

    pub fn get(&self, topology: Topology, depth_test: bool) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&(topology, depth_test))
    }
}
