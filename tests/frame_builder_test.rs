use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use still_life::{
    data_structures::vertex::{FLAG_COLOR_TRACKING, FLAG_LIGHTING, FLAG_TEXTURING, FrameVertex},
    render::{
        Capability, LightSource, Primitive, RenderContext, Spot, Viewport,
        frame::{FrameBuilder, Topology, assemble},
    },
};

use crate::common::test_utils::approx;

mod common;

type Builder = FrameBuilder<Rc<u32>>;

fn triangle(ctx: &mut Builder) {
    ctx.begin(Primitive::Triangles);
    ctx.vertex([0.0, 0.0, 0.0]);
    ctx.vertex([1.0, 0.0, 0.0]);
    ctx.vertex([0.0, 1.0, 0.0]);
    ctx.end();
}

fn tagged(n: usize) -> Vec<FrameVertex> {
    (0..n)
        .map(|i| FrameVertex {
            position: [i as f32, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            color: [1.0; 4],
            tex_coords: [0.0; 2],
            ambient: [0.0; 4],
            diffuse: [0.0; 4],
            specular: [0.0; 4],
            emissive: [0.0; 4],
            shininess: 1.0,
            flags: 0,
        })
        .collect()
}

fn xs(vertices: &[FrameVertex]) -> Vec<f32> {
    vertices.iter().map(|v| v.position[0]).collect()
}

#[test]
fn should_fan_polygons_into_triangles() {
    let (topology, vertices) = assemble(Primitive::Polygon, &tagged(5));

    assert_eq!(topology, Topology::TriangleList);
    assert_eq!(
        xs(&vertices),
        vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0, 0.0, 3.0, 4.0]
    );
}

#[test]
fn should_drop_incomplete_lines_and_triangles() {
    let (topology, lines) = assemble(Primitive::Lines, &tagged(3));
    assert_eq!(topology, Topology::LineList);
    assert_eq!(lines.len(), 2);

    let (_, triangles) = assemble(Primitive::Triangles, &tagged(5));
    assert_eq!(triangles.len(), 3);

    let (topology, points) = assemble(Primitive::Points, &tagged(1));
    assert_eq!(topology, Topology::PointList);
    assert_eq!(points.len(), 1);

    let (_, degenerate) = assemble(Primitive::Polygon, &tagged(2));
    assert!(degenerate.is_empty());
}

#[test]
fn should_transform_vertices_into_eye_space() {
    let mut ctx = Builder::new();
    ctx.translate(1.0, 2.0, 3.0);
    ctx.scale(2.0, 2.0, 2.0);
    ctx.normal([0.0, 0.0, 1.0]);
    ctx.begin(Primitive::Points);
    ctx.vertex([1.0, 1.0, 1.0]);
    ctx.end();

    let frame = ctx.finish();
    let v = frame.segments[0].batches[0].vertices[0];
    assert_eq!(v.position, [3.0, 4.0, 5.0]);
    assert!(approx(v.normal[2], 0.5));
}

#[test]
fn should_restore_matrices_on_pop() {
    let mut ctx = Builder::new();
    ctx.push_matrix();
    ctx.translate(5.0, 0.0, 0.0);
    ctx.push_matrix();
    ctx.rotate(90.0, [0.0, 1.0, 0.0]);
    assert_eq!(ctx.stack_depth(), 2);
    ctx.pop_matrix();
    assert_eq!(
        ctx.modelview(),
        Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0))
    );
    ctx.pop_matrix();
    assert_eq!(ctx.modelview(), Matrix4::identity());

    // An unbalanced pop leaves everything as it is.
    ctx.translate(1.0, 0.0, 0.0);
    ctx.pop_matrix();
    assert_eq!(ctx.stack_depth(), 0);
    assert_eq!(
        ctx.modelview(),
        Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))
    );
}

#[test]
fn should_ignore_zero_rotation_axis() {
    let mut ctx = Builder::new();
    ctx.rotate(45.0, [0.0, 0.0, 0.0]);
    assert_eq!(ctx.modelview(), Matrix4::identity());
}

#[test]
fn should_merge_primitives_sharing_topology_and_texture() {
    let wood = Rc::new(1);
    let mut ctx = Builder::new();
    ctx.enable(Capability::Texturing);
    ctx.bind_texture(&wood);
    triangle(&mut ctx);
    ctx.bind_texture(&wood.clone());
    triangle(&mut ctx);

    let frame = ctx.finish();
    assert_eq!(frame.segments.len(), 1);
    assert_eq!(frame.segments[0].batches.len(), 1);
    assert_eq!(frame.segments[0].batches[0].vertices.len(), 6);
}

#[test]
fn should_split_batches_on_texture_identity() {
    let mut ctx = Builder::new();
    ctx.enable(Capability::Texturing);
    ctx.bind_texture(&Rc::new(1));
    triangle(&mut ctx);
    // Equal value, different texture.
    ctx.bind_texture(&Rc::new(1));
    triangle(&mut ctx);
    ctx.begin(Primitive::Lines);
    ctx.vertex([0.0, 0.0, 0.0]);
    ctx.vertex([1.0, 0.0, 0.0]);
    ctx.end();

    let frame = ctx.finish();
    let topologies: Vec<Topology> = frame.segments[0]
        .batches
        .iter()
        .map(|b| b.topology)
        .collect();
    assert_eq!(
        topologies,
        vec![
            Topology::TriangleList,
            Topology::TriangleList,
            Topology::LineList
        ]
    );
}

#[test]
fn should_not_attach_texture_while_texturing_is_off() {
    let mut ctx = Builder::new();
    ctx.bind_texture(&Rc::new(1));
    triangle(&mut ctx);

    let frame = ctx.finish();
    assert!(frame.segments[0].batches[0].texture.is_none());
}

#[test]
fn should_record_capabilities_as_vertex_flags() {
    let mut ctx = Builder::new();
    ctx.enable(Capability::Lighting);
    ctx.enable(Capability::Texturing);
    ctx.begin(Primitive::Points);
    ctx.vertex([0.0, 0.0, 0.0]);
    ctx.end();
    ctx.disable(Capability::Lighting);
    ctx.enable(Capability::ColorTracking);
    ctx.color([0.5, 0.5, 0.5, 1.0]);
    ctx.begin(Primitive::Points);
    ctx.vertex([0.0, 0.0, 0.0]);
    ctx.end();

    let frame = ctx.finish();
    let vertices = &frame.segments[0].batches[0].vertices;
    assert_eq!(vertices[0].flags, FLAG_LIGHTING | FLAG_TEXTURING);
    assert_eq!(vertices[1].flags, FLAG_COLOR_TRACKING | FLAG_TEXTURING);
    assert_eq!(vertices[1].color, [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn should_start_a_segment_when_draw_state_changes() {
    let mut ctx = Builder::new();
    ctx.set_viewport(Viewport::full(800, 600));
    ctx.enable(Capability::DepthTest);
    triangle(&mut ctx);
    triangle(&mut ctx);
    ctx.set_viewport(Viewport {
        x: 640,
        y: 480,
        width: 160,
        height: 120,
    });
    ctx.disable(Capability::DepthTest);
    triangle(&mut ctx);
    ctx.set_viewport(Viewport::full(800, 600));
    ctx.enable(Capability::DepthTest);
    triangle(&mut ctx);

    let frame = ctx.finish();
    assert_eq!(frame.segments.len(), 3);
    assert_eq!(frame.segments[0].vertex_count(), 6);
    assert!(frame.segments[0].state.depth_test);
    assert!(!frame.segments[1].state.depth_test);
    assert_eq!(frame.segments[1].state.viewport.map(|v| v.x), Some(640));
    assert_eq!(frame.segments[2].state, frame.segments[0].state);
}

#[test]
fn should_not_create_segments_without_geometry() {
    let mut ctx = Builder::new();
    ctx.set_projection(Matrix4::from_scale(2.0));
    ctx.set_global_ambient([0.5, 0.5, 0.5, 1.0]);
    ctx.flush();

    assert!(ctx.finish().segments.is_empty());
}

#[test]
fn should_clear_the_frame() {
    let mut ctx = Builder::new();
    triangle(&mut ctx);
    ctx.clear([0.1, 0.2, 0.3, 1.0]);
    triangle(&mut ctx);

    let frame = ctx.finish();
    assert_eq!(frame.clear, Some([0.1, 0.2, 0.3, 1.0]));
    assert_eq!(frame.segments.len(), 1);
    assert_eq!(frame.segments[0].vertex_count(), 3);
}

#[test]
fn should_store_lights_in_eye_space() {
    let mut ctx = Builder::new();
    ctx.translate(0.0, 0.0, -5.0);
    ctx.set_light(
        0,
        &LightSource {
            position: [0.0, 1.0, 0.0, 1.0],
            spot: Some(Spot {
                direction: [0.0, -1.0, 0.0],
                cutoff_deg: 30.0,
            }),
            ..Default::default()
        },
    );
    // Beyond the last slot.
    ctx.set_light(2, &LightSource::default());
    ctx.load_identity();
    triangle(&mut ctx);

    let frame = ctx.finish();
    let lights = &frame.segments[0].state.lights;
    let spot = lights[0].expect("light 0 not set");
    assert_eq!(spot.position, [0.0, 1.0, -5.0, 1.0]);
    assert_eq!(spot.spot.map(|s| s.direction), Some([0.0, -1.0, 0.0]));
    assert!(lights[1].is_none());
}

#[test]
fn should_ignore_vertices_outside_begin_and_end() {
    let mut ctx = Builder::new();
    ctx.vertex([1.0, 1.0, 1.0]);
    ctx.end();
    ctx.begin(Primitive::Triangles);
    ctx.vertex([0.0, 0.0, 0.0]);
    ctx.flush();
    ctx.end();

    assert!(ctx.finish().segments.is_empty());
}

#[test]
fn should_project_text_relative_to_its_viewport() {
    let mut ctx = Builder::new();
    let viewport = Viewport {
        x: 100,
        y: 50,
        width: 200,
        height: 100,
    };
    ctx.set_viewport(viewport);
    ctx.color([1.0, 0.0, 0.0, 1.0]);
    ctx.translate(0.5, 0.5, 0.0);

    ctx.text([0.0, 0.0, 0.0], 0.5, "label");
    ctx.text([0.0, 0.0, 0.0], 0.5, "");
    let frame = ctx.finish();

    assert_eq!(frame.texts.len(), 1);
    let run = &frame.texts[0];
    assert_eq!(run.text, "label");
    assert_eq!(run.colour, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(run.viewport, Some(viewport));
    assert!(approx(run.anchor[0], 0.75));
    assert!(approx(run.anchor[1], 0.25));
    assert!(approx(run.size, 0.25));
    let (rect, [left, top], line_height) = run.placement(400, 200);
    assert_eq!(rect, viewport);
    assert!(approx(left, 250.0));
    assert!(approx(top, 75.0));
    assert!(approx(line_height, 25.0));
    assert!(frame.segments.is_empty());
}

#[test]
fn should_skip_text_behind_the_eye_or_inside_a_primitive() {
    let mut ctx = Builder::new();
    ctx.set_projection(cgmath::perspective(cgmath::Deg(45.0), 1.0, 1.0, 100.0));

    ctx.text([0.0, 0.0, 5.0], 1.0, "behind");
    ctx.begin(Primitive::Triangles);
    ctx.text([0.0, 0.0, -5.0], 1.0, "inside");
    ctx.end();
    ctx.text([0.0, 0.0, -5.0], 1.0, "ahead");

    let texts: Vec<String> = ctx.finish().texts.into_iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["ahead".to_string()]);
}

#[test]
fn should_drop_text_on_clear() {
    let mut ctx = Builder::new();
    ctx.text([0.0, 0.0, 0.0], 0.1, "stale");

    ctx.clear([0.0, 0.0, 0.0, 1.0]);

    assert!(ctx.frame().texts.is_empty());
}

#[test]
fn should_fit_viewports_to_the_surface() {
    let inside = Viewport {
        x: 10,
        y: 10,
        width: 20,
        height: 20,
    };
    let overhanging = Viewport {
        x: 90,
        y: 120,
        width: 50,
        height: 50,
    };

    assert_eq!(Viewport::fit(None, 100, 80), Viewport::full(100, 80));
    assert_eq!(Viewport::fit(Some(inside), 100, 80), inside);
    assert_eq!(
        Viewport::fit(Some(overhanging), 100, 80),
        Viewport {
            x: 90,
            y: 79,
            width: 10,
            height: 1,
        }
    );
    assert_eq!(Viewport::fit(None, 0, 0), Viewport::full(1, 1));
}
