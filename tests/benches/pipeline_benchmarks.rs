//! # Ingestion Pipeline Benchmarks
//!
//! | Path | Operation | Target |
//! |------|-----------|--------|
//! | Worker | Decode a queued envelope (both layers) | < 50µs for 10 records |
//! | Broker | Policy check on topic delivery | < 1µs |
//! | Broker | Put object → queued message | < 100µs |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ip_02_provisioning::{
    queue_delivery_policy, CloudServices, Provisioner, ProvisioningApi, ProvisioningConfig,
};
use shared_bus::{InMemoryCloud, ObjectStoreService, QueueService};
use shared_types::{decode_event_records, encode_event_records, EventRecord};

const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:NewOrderEvents";
const QUEUE: &str = "arn:aws:sqs:us-east-1:123456789012:ShippingQueue";
const TS: &str = "2026-11-27T00:00:00.000Z";

// ============================================================================
// Envelope decoding (worker hot path)
// ============================================================================

fn bench_envelope_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope-decode");

    for size in [1usize, 10, 100] {
        let records: Vec<EventRecord> = (0..size)
            .map(|i| EventRecord::new("black-friday-orders", format!("order-{i}.json"), 94))
            .collect();
        let body = encode_event_records(TOPIC, &records, "us-east-1", TS)
            .expect("benchmark body encodes");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("decode", size), &body, |b, body| {
            b.iter(|| black_box(decode_event_records(body).map(|r| r.len())))
        });
    }
    group.finish();
}

// ============================================================================
// Resource policy evaluation
// ============================================================================

fn bench_policy_check(c: &mut Criterion) {
    let policy = queue_delivery_policy(QUEUE, TOPIC);

    c.bench_function("policy-allows-scoped-source", |b| {
        b.iter(|| {
            black_box(policy.allows(
                "sns.amazonaws.com",
                "sqs:SendMessage",
                black_box(QUEUE),
                black_box(TOPIC),
            ))
        })
    });
}

// ============================================================================
// Object creation through the in-memory topology
// ============================================================================

fn bench_object_to_queue(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("benchmark runtime");
    let cloud = Arc::new(InMemoryCloud::new());
    let config = ProvisioningConfig::default().with_bucket_name("bench-orders");
    let topology = runtime.block_on(async {
        let provisioner = Provisioner::new(CloudServices::from_shared(cloud.clone()), config)
            .expect("valid config");
        provisioner.setup().await.topology.expect("setup succeeds")
    });

    let mut group = c.benchmark_group("object-to-queue");
    group.measurement_time(Duration::from_secs(5));
    group.bench_function("put-receive-delete", |b| {
        b.to_async(&runtime).iter(|| async {
            cloud
                .put_object("bench-orders", "order.json", b"{}".to_vec(), "application/json")
                .await
                .expect("put");
            let batch = cloud
                .receive_messages(&topology.queue.url, 1, Duration::ZERO)
                .await
                .expect("receive");
            for message in batch {
                cloud
                    .delete_message(&topology.queue.url, &message.receipt_handle)
                    .await
                    .expect("delete");
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_envelope_decode,
    bench_policy_check,
    bench_object_to_queue
);
criterion_main!(benches);
