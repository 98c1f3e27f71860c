use super::*;
use crate::assets::{Geometry, Texture, Vertex};
use crate::gpu::resources::{upload_geometry, upload_texture, MeshHandles};
use crate::math::{Mat3, Mat4};

const RED: u32 = 0xFFFF_0000;
const GREEN: u32 = 0xFF00_FF00;

fn device() -> SoftwareDevice {
    let mut device = SoftwareDevice::new(8, 8);
    device.viewport(0, 0, 8, 8);
    device
}

fn pool_program(device: &mut SoftwareDevice) -> ProgramId {
    let program = device
        .create_program(&[
            (ShaderStage::Vertex, include_str!("../../../shaders/pool.vert")),
            (ShaderStage::Fragment, include_str!("../../../shaders/pool.frag")),
        ])
        .expect("pool shaders link");
    device.use_program(Some(program));
    set(device, program, "ModelView", UniformValue::Mat4(Mat4::identity().to_cols_array()));
    set(device, program, "Projection", UniformValue::Mat4(Mat4::identity().to_cols_array()));
    set(device, program, "View", UniformValue::Mat4(Mat4::identity().to_cols_array()));
    set(device, program, "NormalMatrix", UniformValue::Mat3(Mat3::identity().to_cols_array()));
    program
}

fn set(device: &mut SoftwareDevice, program: ProgramId, name: &str, value: UniformValue) {
    let location = device.uniform_location(program, name).expect(name);
    device.program_uniform(program, location, value);
}

/// A triangle covering the middle of the viewport at depth `z`, with `color`
/// in the normal slot.
fn triangle(device: &mut SoftwareDevice, z: f32, color: [f32; 3]) -> MeshHandles {
    let vertex = |x: f32, y: f32, uv: [f32; 2]| Vertex::new([x, y, z], color, uv);
    let geometry = Geometry::from_triangles([[
        vertex(-1.0, -1.0, [0.0, 0.0]),
        vertex(1.0, -1.0, [1.0, 0.0]),
        vertex(0.0, 1.0, [0.5, 1.0]),
    ]]);
    upload_geometry(device, &geometry)
}

fn draw(device: &mut SoftwareDevice, mesh: MeshHandles) {
    device.bind_vertex_array(Some(mesh.vertex_array));
    device.draw_arrays(Primitive::Triangles, 0, mesh.vertex_count);
}

#[test]
fn names_are_unique_and_deletion_frees_them() {
    let mut device = device();
    let vao = device.create_vertex_array();
    let buffer = device.create_buffer();
    let texture = device.create_texture();
    assert_ne!(vao.get(), buffer.get());
    assert_ne!(buffer.get(), texture.get());
    assert_eq!(
        device.resource_counts(),
        ResourceCounts {
            vertex_arrays: 1,
            buffers: 1,
            textures: 1,
            programs: 0,
        }
    );

    device.bind_vertex_array(Some(vao));
    device.delete_vertex_array(vao);
    device.delete_buffer(buffer);
    device.delete_texture(texture);
    assert_eq!(device.resource_counts(), ResourceCounts::default());
    assert_eq!(device.bound_vertex_array(), None);
}

#[test]
fn buffer_storage_is_immutable() {
    let mut device = device();
    let buffer = device.create_buffer();
    device.bind_array_buffer(Some(buffer));
    device.buffer_storage(&[1.0, 2.0, 3.0]);
    device.buffer_storage(&[4.0]);
    assert_eq!(device.buffer_len(buffer), Some(3));
}

#[test]
fn upload_leaves_vertex_array_unbound() {
    let mut device = device();
    let mesh = triangle(&mut device, 0.0, [1.0, 0.0, 0.0]);
    assert_eq!(mesh.vertex_count, 3);
    assert_eq!(device.bound_vertex_array(), None);
    assert_eq!(device.buffer_len(mesh.buffer), Some(24));
}

#[test]
fn untextured_draw_outputs_vertex_colour() {
    let mut device = device();
    pool_program(&mut device);
    let mesh = triangle(&mut device, 0.0, [1.0, 0.0, 0.0]);
    device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

    draw(&mut device, mesh);

    assert_eq!(device.pixel(4, 4), Some(RED));
    assert_eq!(device.pixel(0, 0), Some(BLACK));
    let stats = device.stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.triangles, 1);
    assert!(stats.fragments > 0);
}

#[test]
fn depth_test_keeps_the_nearer_surface() {
    let mut device = device();
    pool_program(&mut device);
    device.enable(Capability::DepthTest);
    let near = triangle(&mut device, -0.5, [0.0, 1.0, 0.0]);
    let far = triangle(&mut device, 0.5, [1.0, 0.0, 0.0]);
    device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

    draw(&mut device, near);
    draw(&mut device, far);
    assert_eq!(device.pixel(4, 4), Some(GREEN));
}

#[test]
fn without_depth_test_the_last_draw_wins() {
    let mut device = device();
    pool_program(&mut device);
    let near = triangle(&mut device, -0.5, [0.0, 1.0, 0.0]);
    let far = triangle(&mut device, 0.5, [1.0, 0.0, 0.0]);

    draw(&mut device, near);
    draw(&mut device, far);
    assert_eq!(device.pixel(4, 4), Some(RED));
}

#[test]
fn culling_drops_clockwise_triangles() {
    let mut device = device();
    pool_program(&mut device);
    device.enable(Capability::CullFace);
    let vertex = |x: f32, y: f32| Vertex::new([x, y, 0.0], [1.0, 1.0, 1.0], [0.0, 0.0]);
    let clockwise = Geometry::from_triangles([[vertex(-1.0, -1.0), vertex(0.0, 1.0), vertex(1.0, -1.0)]]);
    let mesh = upload_geometry(&mut device, &clockwise);

    draw(&mut device, mesh);
    assert_eq!(device.stats().triangles, 0);
    assert_eq!(device.pixel(4, 4), Some(0));
}

#[test]
fn draw_without_vertex_array_is_ignored() {
    let mut device = device();
    pool_program(&mut device);
    device.draw_arrays(Primitive::Triangles, 0, 3);
    assert_eq!(device.stats(), DrawStats::default());
}

#[test]
fn textured_draw_samples_the_unit_named_by_the_sampler() {
    let mut device = device();
    let program = pool_program(&mut device);
    let red = Texture::new(1, 1, 3, vec![255, 0, 0]).expect("valid texture");
    let green = Texture::new(1, 1, 3, vec![0, 255, 0]).expect("valid texture");
    upload_texture(&mut device, 2, &red);
    upload_texture(&mut device, 5, &green);

    set(&mut device, program, "isRenderTexture", UniformValue::Int(1));
    set(&mut device, program, "lightModel", UniformValue::Int(1));
    set(&mut device, program, "ambientLight.ambient", UniformValue::Vec3([1.0; 3]));
    set(&mut device, program, "material.ambient", UniformValue::Vec3([1.0; 3]));
    set(&mut device, program, "sampler", UniformValue::Int(5));

    let mesh = triangle(&mut device, 0.0, [0.0, 0.0, 1.0]);
    draw(&mut device, mesh);
    assert_eq!(device.pixel(4, 4), Some(GREEN));

    set(&mut device, program, "sampler", UniformValue::Int(2));
    draw(&mut device, mesh);
    assert_eq!(device.pixel(4, 4), Some(RED));
}

#[test]
fn textured_draw_with_empty_unit_is_black() {
    let mut device = device();
    let program = pool_program(&mut device);
    set(&mut device, program, "isRenderTexture", UniformValue::Int(1));
    set(&mut device, program, "lightModel", UniformValue::Int(1));
    set(&mut device, program, "ambientLight.ambient", UniformValue::Vec3([1.0; 3]));
    set(&mut device, program, "material.ambient", UniformValue::Vec3([1.0; 3]));
    set(&mut device, program, "sampler", UniformValue::Int(9));
    device.clear(ClearFlags::COLOR);

    let mesh = triangle(&mut device, 0.0, [1.0, 1.0, 1.0]);
    draw(&mut device, mesh);
    assert_eq!(device.pixel(4, 4), Some(BLACK));
    assert!(device.stats().fragments > 0);
}

#[test]
fn texture_upload_builds_mip_chain_on_its_unit() {
    let mut device = device();
    let texture = Texture::new(4, 2, 4, vec![200; 4 * 2 * 4]).expect("valid texture");
    let id = upload_texture(&mut device, 3, &texture);

    assert_eq!(device.texture_on_unit(3), Some(id));
    assert_eq!(device.texture_on_unit(0), None);
    let info = device.texture_info(id).expect("texture exists");
    assert_eq!((info.width, info.height), (4, 2));
    assert_eq!(info.mip_levels, 3);
    assert_eq!(info.params, crate::gpu::resources::BALL_SAMPLER);
}

#[test]
fn mistyped_uniform_is_ignored() {
    let mut device = device();
    let program = pool_program(&mut device);
    set(&mut device, program, "lightModel", UniformValue::Int(2));
    set(&mut device, program, "lightModel", UniformValue::Float(3.0));
    assert_eq!(
        device.uniform_value(program, "lightModel"),
        Some(UniformValue::Int(2))
    );
}

#[test]
fn uniforms_start_at_zero() {
    let mut device = device();
    let program = device
        .create_program(&[
            (ShaderStage::Vertex, include_str!("../../../shaders/pool.vert")),
            (ShaderStage::Fragment, include_str!("../../../shaders/pool.frag")),
        ])
        .expect("pool shaders link");
    assert_eq!(
        device.uniform_value(program, "material.shininess"),
        Some(UniformValue::Float(0.0))
    );
    assert_eq!(device.uniform_value(program, "missing"), None);
}

#[test]
fn frame_bytes_cover_the_colour_buffer() {
    let mut device = device();
    device.clear(ClearFlags::COLOR);
    assert_eq!(device.frame_bytes().len(), 8 * 8 * 4);
    device.resize(4, 2);
    assert_eq!(device.pixels().len(), 8);
}
