//! Benchmarks the assignment ledger's atomic-replace persistence: writing
//! an assignment and reloading the ledger from disk (§4.5's crash-safety
//! path, exercised rather than just the in-memory map).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marcus::coordination::AssignmentLedger;
use marcus::domain::models::TaskStatus;
use tempfile::tempdir;
use tokio::runtime::Runtime;

fn bench_add_and_reload(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("ledger_add_then_reload", |b| {
        b.iter(|| {
            rt.block_on(async {
                let dir = tempdir().unwrap();
                let path = dir.path().join("ledger.json");
                let ledger = AssignmentLedger::load(&path).await.unwrap();
                ledger.add("agent-1", "task-1", TaskStatus::Todo).await.unwrap();

                let reloaded = AssignmentLedger::load(&path).await.unwrap();
                black_box(reloaded.get("agent-1").await);
            });
        });
    });
}

criterion_group!(benches, bench_add_and_reload);
criterion_main!(benches);
