use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glb_viewer::loaders::{generate_normals, Decoder, GltfDecoder};
use serde_json::json;

/// Flat `n x n` quad grid: positions and u32 indices
fn grid_mesh(n: u32) -> (Vec<[f32; 3]>, Vec<u32>) {
    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for z in 0..=n {
        for x in 0..=n {
            let h = ((x as f32) * 0.3).sin() * ((z as f32) * 0.2).cos();
            positions.push([x as f32, h, z as f32]);
        }
    }

    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for z in 0..n {
        for x in 0..n {
            let i = z * (n + 1) + x;
            indices.extend_from_slice(&[i, i + n + 1, i + 1, i + 1, i + n + 1, i + n + 2]);
        }
    }
    (positions, indices)
}

/// Pack the grid as a single-node GLB without normals
fn grid_glb(n: u32) -> Vec<u8> {
    let (positions, indices) = grid_mesh(n);

    let mut bin = Vec::new();
    for p in &positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let index_offset = bin.len();
    for i in &indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "terrain", "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": index_offset },
            { "buffer": 0, "byteOffset": index_offset, "byteLength": bin.len() - index_offset }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": positions.len(), "type": "VEC3",
                "min": [0.0, -1.0, 0.0], "max": [n as f32, 1.0, n as f32]
            },
            { "bufferView": 1, "componentType": 5125, "count": indices.len(), "type": "SCALAR" }
        ]
    });

    let mut json = serde_json::to_vec(&document).unwrap_or_default();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

fn bench_generate_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_normals");
    for n in [32u32, 128, 512] {
        let (positions, indices) = grid_mesh(n);
        group.throughput(Throughput::Elements((indices.len() / 3) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| generate_normals(black_box(&positions), black_box(&indices)))
        });
    }
    group.finish();
}

fn bench_decode_glb(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_glb");
    group.sample_size(20);
    for n in [64u32, 256] {
        let bytes = grid_glb(n);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| {
                let asset = GltfDecoder.decode("terrain.glb", black_box(bytes), None);
                black_box(asset.map(|a| a.triangle_count()).unwrap_or(0))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate_normals, bench_decode_glb);
criterion_main!(benches);
