//! Benchmarks for the render pipeline: resampling and full PNG renders.
//!
//! Run with: cargo bench --bench render_benchmarks

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use isobar::geo::{tile_bounds_mercator, BoundingBox, Crs, TileCoord};
use isobar::interpolation::get_interpolator;
use isobar::render::{render_png, reproject, GridSlice, OutputGrid, RenderRequest, ValueRange};
use isobar::{AppState, AttributeValue, Config, Dimension, Metadata, Variable};
use ndarray::Array2;

/// A smooth global temperature-like field on a regular lat/lon grid
fn generate_global_grid(n_lon: usize, n_lat: usize) -> GridSlice {
    let lons: Vec<f64> = (0..n_lon).map(|i| i as f64 * 360.0 / n_lon as f64).collect();
    let lats: Vec<f64> = (0..n_lat)
        .map(|j| -90.0 + (j as f64 + 0.5) * 180.0 / n_lat as f64)
        .collect();
    let values = Array2::from_shape_fn((n_lat, n_lon), |(j, i)| {
        let lat = lats[j].to_radians();
        let lon = lons[i].to_radians();
        (273.15 + 30.0 * lat.cos() + 5.0 * (3.0 * lon).sin()) as f32
    });
    GridSlice { values, lons, lats }
}

fn coordinate(metadata: &mut Metadata, name: &str, values: Vec<f64>, units: &str) {
    metadata.dimensions.insert(
        name.to_string(),
        Dimension {
            name: name.to_string(),
            size: values.len(),
            is_unlimited: false,
        },
    );
    metadata.variables.insert(
        name.to_string(),
        Variable {
            name: name.to_string(),
            dimensions: vec![name.to_string()],
            shape: vec![values.len()],
            attributes: HashMap::from([(
                "units".to_string(),
                AttributeValue::Text(units.to_string()),
            )]),
            dtype: "Double".to_string(),
        },
    );
    metadata.coordinates.insert(name.to_string(), values);
}

/// An in-memory state holding one `t2m(lat, lon)` field
fn create_state(n_lon: usize, n_lat: usize) -> AppState {
    let grid = generate_global_grid(n_lon, n_lat);
    let mut metadata = Metadata::default();
    coordinate(&mut metadata, "lat", grid.lats.clone(), "degrees_north");
    coordinate(&mut metadata, "lon", grid.lons.clone(), "degrees_east");
    metadata.variables.insert(
        "t2m".to_string(),
        Variable {
            name: "t2m".to_string(),
            dimensions: vec!["lat".to_string(), "lon".to_string()],
            shape: vec![n_lat, n_lon],
            attributes: HashMap::new(),
            dtype: "Float".to_string(),
        },
    );

    let data = HashMap::from([("t2m".to_string(), grid.values.into_dyn())]);
    AppState::new(Config::default(), metadata, data)
}

fn bench_reproject(c: &mut Criterion) {
    let mut group = c.benchmark_group("reproject");
    let grid = generate_global_grid(1440, 720);

    for size in [256u32, 512, 1024] {
        group.throughput(Throughput::Elements((size * size) as u64));

        for method in ["nearest", "bilinear"] {
            let interpolator = get_interpolator(method).unwrap();

            let output = OutputGrid::new(
                Crs::Epsg4326,
                BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
                size,
                size,
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{}_4326", method), size),
                &output,
                |b, output| {
                    b.iter(|| reproject(black_box(&grid), output, interpolator.as_ref()).unwrap())
                },
            );

            let tile = TileCoord::new(2, 1, 1).unwrap();
            let output = OutputGrid::new(Crs::Epsg3857, tile_bounds_mercator(&tile), size, size);
            group.bench_with_input(
                BenchmarkId::new(format!("{}_3857", method), size),
                &output,
                |b, output| {
                    b.iter(|| reproject(black_box(&grid), output, interpolator.as_ref()).unwrap())
                },
            );
        }
    }

    group.finish();
}

fn bench_render_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_png");
    let state = create_state(1440, 720);

    let bbox_request = RenderRequest {
        parameter: "t2m".to_string(),
        time: None,
        bbox: BoundingBox::new(-30.0, 20.0, 60.0, 70.0),
        crs: Crs::Epsg4326,
        width: 800,
        height: 400,
        crop: true,
        range: ValueRange::auto(),
        colormap: "rainbow".to_string(),
        resampling: "bilinear".to_string(),
    };
    group.bench_function("bbox_800x400", |b| {
        b.iter(|| render_png(black_box(&state), &bbox_request).unwrap())
    });

    let tile = TileCoord::new(3, 4, 2).unwrap();
    let tile_request = RenderRequest {
        bbox: tile_bounds_mercator(&tile),
        crs: Crs::Epsg3857,
        width: 256,
        height: 256,
        crop: false,
        range: ValueRange::fixed(250.0, 310.0),
        colormap: "coolwarm".to_string(),
        ..bbox_request.clone()
    };
    group.bench_function("tile_256", |b| {
        b.iter(|| render_png(black_box(&state), &tile_request).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_reproject, bench_render_png);
criterion_main!(benches);
