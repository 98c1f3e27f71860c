use std::path::Path;

use bilhar::bench::{EdgeFunctionRasterizer, FrameBuffer, ScreenVertex, VertexColorShader, COLOR, VARYING_COUNT};
use bilhar::config::SceneConfig;
use bilhar::gpu::SoftwareDevice;
use bilhar::scene::PoolScene;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn create_buffers() -> (Vec<u32>, Vec<f32>) {
    let len = (BUFFER_WIDTH * BUFFER_HEIGHT) as usize;
    (vec![0u32; len], vec![1.0f32; len])
}

fn vertex(x: f32, y: f32, depth: f32) -> ScreenVertex {
    let mut varyings = [0.0; VARYING_COUNT];
    varyings[COLOR] = 1.0;
    ScreenVertex::new(x, y, depth, 1.0, &varyings)
}

fn small_triangle() -> [ScreenVertex; 3] {
    [vertex(100.0, 100.0, 0.5), vertex(110.0, 120.0, 0.5), vertex(120.0, 100.0, 0.5)]
}

fn medium_triangle() -> [ScreenVertex; 3] {
    [vertex(100.0, 100.0, 0.5), vertex(200.0, 300.0, 0.5), vertex(300.0, 100.0, 0.5)]
}

fn large_triangle() -> [ScreenVertex; 3] {
    [vertex(50.0, 50.0, 0.5), vertex(400.0, 550.0, 0.5), vertex(750.0, 100.0, 0.5)]
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let rasterizer = EdgeFunctionRasterizer::new();

    for (name, triangle) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        for depth_test in [false, true] {
            let id = if depth_test { "depth_tested" } else { "no_depth" };
            group.bench_with_input(BenchmarkId::new(id, name), &triangle, |b, tri| {
                let (mut color, mut depth) = create_buffers();
                b.iter(|| {
                    depth.fill(1.0);
                    let mut fb = FrameBuffer::new(&mut color, &mut depth, BUFFER_WIDTH, BUFFER_HEIGHT);
                    rasterizer.fill_triangle(black_box(tri), &mut fb, &VertexColorShader, depth_test)
                });
            });
        }
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_triangles");
    let rasterizer = EdgeFunctionRasterizer::new();

    let triangles: Vec<[ScreenVertex; 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                [vertex(x, y, 0.5), vertex(x + 17.5, y + 25.0, 0.5), vertex(x + 35.0, y, 0.5)]
            })
        })
        .collect();

    group.bench_function("edge_function_400_triangles", |b| {
        let (mut color, mut depth) = create_buffers();
        b.iter(|| {
            depth.fill(1.0);
            let mut fb = FrameBuffer::new(&mut color, &mut depth, BUFFER_WIDTH, BUFFER_HEIGHT);
            for tri in &triangles {
                rasterizer.fill_triangle(black_box(tri), &mut fb, &VertexColorShader, true);
            }
        });
    });

    group.finish();
}

fn benchmark_scene_frame(c: &mut Criterion) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut config = SceneConfig::default();
    config.assets.vertex_shader = root.join("shaders/pool.vert");
    config.assets.fragment_shader = root.join("shaders/pool.frag");
    config.assets.model_dir = root.join("textures");
    config.assets.texture_dir = root.join("textures");

    let device = SoftwareDevice::new(config.window.width, config.window.height);
    let Ok(mut scene) = PoolScene::new(device, &config) else {
        eprintln!("pool shaders failed to build; skipping scene benchmark");
        return;
    };

    c.bench_function("pool_scene_frame", |b| {
        b.iter(|| {
            scene.display();
            black_box(scene.device().pixels().len())
        });
    });
}

criterion_group!(benches, benchmark_single_triangle, benchmark_many_triangles, benchmark_scene_frame);
criterion_main!(benches);
