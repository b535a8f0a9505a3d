use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use deen_domain::{Buffer, Direction};
use deen_engine::Chain;
use deen_plugins::PluginRegistry;
use std::sync::Arc;

fn sample_json(entries: usize) -> Vec<u8> {
    let body: Vec<String> = (0..entries)
        .rev()
        .map(|i| format!("\"key{i}\":{{\"id\":{i},\"tags\":[\"a\",\"b\"]}}"))
        .collect();
    format!("{{{}}}", body.join(",")).into_bytes()
}

fn bench_single_plugins(c: &mut Criterion) {
    let registry = PluginRegistry::with_builtins().unwrap();
    let data = vec![0xa5u8; 64 * 1024];
    let mut group = c.benchmark_group("plugins_64k");

    for key in ["base64", "hex", "url", "zlib", "sha256"] {
        let plugin = registry.lookup(key).unwrap();
        group.bench_with_input(BenchmarkId::new("process", key), &data, |b, data| {
            b.iter(|| black_box(plugin.process(black_box(data))))
        });
    }

    let json = sample_json(500);
    let formatter = registry.lookup("json_formatter").unwrap();
    group.bench_with_input(BenchmarkId::new("process", "json_formatter"), &json, |b, json| {
        b.iter(|| black_box(formatter.process(black_box(json))))
    });

    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let registry = Arc::new(PluginRegistry::with_builtins().unwrap());
    let mut group = c.benchmark_group("cascade");

    for depth in [2usize, 8, 32] {
        let mut chain = Chain::with_root(Arc::clone(&registry), Buffer::from(vec![7u8; 4096]));
        for i in 0..depth {
            let direction = if i % 2 == 0 {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            chain.append("base64", direction).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("set_root", depth), &depth, |b, _| {
            let mut flip = 0u8;
            b.iter(|| {
                flip = flip.wrapping_add(1);
                chain.set_root(Buffer::from(vec![flip; 4096]));
                black_box(chain.final_output().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_plugins, bench_cascade);
criterion_main!(benches);
