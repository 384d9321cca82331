use criterion::{criterion_group, criterion_main, Criterion};
use detdecode::{decode_image, DecodeConfig, DeltasView, RoiBox, ScoresView};
use std::hint::black_box;

/// Deterministic pseudo-random score rows without an RNG dependency.
fn make_probs(num_rois: usize, num_classes: usize) -> Vec<f32> {
    let mut probs = Vec::with_capacity(num_rois * num_classes);
    for roi in 0..num_rois {
        let mut row: Vec<f32> = (0..num_classes)
            .map(|c| (((roi * 31 + c * 17) ^ (roi * c + 7)) % 101) as f32 + 1.0)
            .collect();
        let sum: f32 = row.iter().sum();
        for p in row.iter_mut() {
            *p /= sum;
        }
        probs.extend_from_slice(&row);
    }
    probs
}

fn make_deltas(num_rois: usize, num_classes: usize) -> Vec<f32> {
    (0..num_rois * num_classes * 4)
        .map(|i| ((i * 37 + 11) % 200) as f32 / 100.0 - 1.0)
        .collect()
}

fn make_rois(num_rois: usize) -> Vec<RoiBox> {
    (0..num_rois)
        .map(|i| {
            let y1 = ((i * 53) % 80) as f32 / 100.0;
            let x1 = ((i * 29) % 80) as f32 / 100.0;
            RoiBox::new(y1, x1, y1 + 0.15, x1 + 0.15)
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let num_rois = 2000;
    let num_classes = 81;
    let probs_data = make_probs(num_rois, num_classes);
    let deltas_data = make_deltas(num_rois, num_classes);
    let rois = make_rois(num_rois);

    let probs = ScoresView::from_slice(&probs_data, num_rois, num_classes).unwrap();
    let deltas = DeltasView::from_slice(&deltas_data, num_rois, num_classes).unwrap();

    let cfg = DecodeConfig {
        min_confidence: Some(0.1),
        ..DecodeConfig::default()
    };
    c.bench_function("decode_image_2000x81", |b| {
        b.iter(|| black_box(decode_image(probs, deltas, &rois, (800, 1333), &cfg).unwrap()));
    });

    let cfg_unguarded = DecodeConfig {
        min_confidence: None,
        ..DecodeConfig::default()
    };
    c.bench_function("decode_image_2000x81_no_floor", |b| {
        b.iter(|| {
            black_box(decode_image(probs, deltas, &rois, (800, 1333), &cfg_unguarded).unwrap())
        });
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
