#[macro_use]
extern crate criterion;

use criterion::Criterion;
use uuid::Uuid;

use falkoga_core::events::{AttackEvent, AttackType, Protocol};
use falkoga_core::hub::BroadcastHub;

fn sample_batch(len: usize) -> Vec<AttackEvent> {
    (0..len)
        .map(|i| AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "203.0.113.10".into(),
            target_ip: "198.51.100.20".into(),
            source_lat: 35.86,
            source_lon: 104.2,
            target_lat: 37.09,
            target_lon: -95.71,
            source_country: "CN".into(),
            target_country: "US".into(),
            attack_type: AttackType::Ddos,
            severity: 5,
            port: 443,
            protocol: Protocol::Tcp,
            timestamp_ms: i as i64,
        })
        .collect()
}

fn bench_hub_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub_fanout");

    for subscribers in [1, 16, 256] {
        group.throughput(criterion::Throughput::Elements(subscribers as u64));
        group.bench_function(format!("subscribers_{}", subscribers), |b| {
            let hub = BroadcastHub::new(1024);
            let mut receivers: Vec<_> = (0..subscribers).map(|_| hub.subscribe()).collect();
            let batch = sample_batch(4);
            b.iter(|| {
                hub.publish(&batch);
                // drain so buffers never fill between iterations
                for (_, rx) in receivers.iter_mut() {
                    while rx.try_recv().is_ok() {}
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hub_fanout);
criterion_main!(benches);
