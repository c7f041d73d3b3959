use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::cell::RefCell;
use std::rc::Rc;
use synckit_bridge::{
    BridgeConfig, DocumentContext, MemoryEngine, ParticipantId, RopeBuffer, SyncBridge, TextBuffer,
};

fn attach(content: &str) -> (SyncBridge<RopeBuffer, MemoryEngine, ()>, Rc<RefCell<RopeBuffer>>) {
    let doc = DocumentContext::new("bench");
    let hub = MemoryEngine::new(doc.clone(), content);
    let buffer = Rc::new(RefCell::new(RopeBuffer::new()));
    let bridge = SyncBridge::attach(buffer.clone(), hub, (), BridgeConfig::new(doc)).unwrap();
    (bridge, buffer)
}

/// Sequential local typing, each keystroke forwarded to the engine
fn bench_local_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge_local_typing");

    for size in [10, 100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let (_bridge, buffer) = attach("");
                for i in 0..size {
                    black_box(buffer.borrow_mut().replace(i, 0, "a").unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Remote inserts applied under suppression
fn bench_remote_inserts(c: &mut Criterion) {
    c.bench_function("bridge_remote_inserts_1000", |b| {
        b.iter_batched(
            || attach(""),
            |(mut bridge, _buffer)| {
                for i in 0..1000 {
                    bridge.on_remote_insert(i, "a");
                }
                black_box(bridge)
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Remote inserts in front of many live cursors
fn bench_cursor_shifting(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge_cursor_shifting");

    for cursors in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(cursors), cursors, |b, &cursors| {
            b.iter_batched(
                || {
                    let (mut bridge, buffer) = attach(&"x".repeat(1000));
                    for n in 0..cursors {
                        let id = ParticipantId::new(format!("peer-{n}"));
                        bridge.on_remote_caret_move(&id, 500 + n);
                    }
                    (bridge, buffer)
                },
                |(mut bridge, _buffer)| {
                    for _ in 0..100 {
                        bridge.on_remote_insert(0, "y");
                    }
                    black_box(bridge)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_local_typing,
    bench_remote_inserts,
    bench_cursor_shifting
);
criterion_main!(benches);
