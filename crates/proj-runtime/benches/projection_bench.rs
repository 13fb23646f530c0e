use criterion::{black_box, criterion_group, criterion_main, Criterion};
use proj_core::Model;

fn build_model(n_scenarios: usize) -> Model {
    let mut model = Model::default();
    let base = model.scenarios[1].clone();
    model.scenarios = (0..n_scenarios)
        .map(|i| {
            let mut s = base.clone();
            s.name = format!("S{i}");
            s.new_partners_per_month += i as f64;
            s
        })
        .collect();
    model
}

fn bench_projection(c: &mut Criterion) {
    let model = build_model(5);
    c.bench_function("project 5 scenarios x 12m", |b| {
        b.iter(|| black_box(proj_runtime::project_model(black_box(&model))))
    });
    c.bench_function("project + pivot", |b| {
        b.iter(|| {
            let p = proj_runtime::project_model(&model);
            black_box(proj_runtime::pivot_chart_rows(&p))
        })
    });
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
