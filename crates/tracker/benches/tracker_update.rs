use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tracker::{BoundingBox, Detection, ObjectClass, Tracker, TrackerConfig};

fn scene(frame: usize) -> Vec<Detection> {
    (0..25)
        .map(|i| {
            let x = 40.0 * i as f64 + 2.0 * frame as f64;
            let y = 200.0 + 10.0 * (i % 5) as f64;
            let confidence = if i % 5 == 0 { 0.35 } else { 0.85 };
            Detection::new(BoundingBox::new(x, y, x + 35.0, y + 30.0), ObjectClass::Car, confidence)
        })
        .collect()
}

fn bench_update(c: &mut Criterion) {
    let frames: Vec<Vec<Detection>> = (0..100).map(scene).collect();

    c.bench_function("tracker_update_25_detections", |b| {
        b.iter(|| {
            let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
            for detections in &frames {
                black_box(tracker.update(black_box(detections)));
            }
        })
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
