//! Benchmarks for the local generation path
//!
//! This benchmark measures:
//! - Template fallback generation per category
//! - Payload validation of remote responses
//! - Full orchestrator round trips on a warm cache

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use flowsmith::cache::CacheKeyGenerator;
use flowsmith::remote::validate_payload;
use flowsmith::{CallerContext, FallbackGenerator, GenerationRequest, Subtask, WorkflowGenerator};

const SAMPLE_PAYLOAD: &str = r#"```json
{
  "title": "Candidate Screening Pipeline",
  "description": "Scores applicants and books interviews",
  "complexity": "high",
  "estimatedTimeSavings": 240,
  "steps": [
    {"type": "trigger", "name": "Application received", "integration": "Greenhouse"},
    {"type": "condition", "name": "Meets requirements"},
    {"type": "action", "name": "Book interview", "integration": "Google Calendar"},
    {"type": "output", "name": "Notify hiring manager", "integration": "Slack"}
  ]
}
```"#;

fn bench_fallback_generation(c: &mut Criterion) {
    let generator = FallbackGenerator::builtin().expect("builtin catalog");
    let subtasks = [
        ("onboarding", Subtask::new("b1", "Onboard new hires")),
        ("payroll", Subtask::new("b2", "Monthly payroll and timesheet review")),
        ("generic", Subtask::new("b3", "Water the office plants")),
    ];

    let mut group = c.benchmark_group("fallback_generation");
    group.throughput(Throughput::Elements(1));
    for (label, subtask) in subtasks.iter() {
        group.bench_with_input(BenchmarkId::new("generate", label), subtask, |b, s| {
            b.iter(|| generator.generate(black_box(s), "en", 1))
        });
    }
    group.finish();
}

fn bench_payload_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_validation");
    group.throughput(Throughput::Bytes(SAMPLE_PAYLOAD.len() as u64));
    group.bench_function("fenced_payload", |b| {
        b.iter(|| validate_payload(black_box(SAMPLE_PAYLOAD)))
    });
    group.finish();
}

fn bench_cache_keys(c: &mut Criterion) {
    let keys = CacheKeyGenerator::new().with_salt("bench");
    let request = GenerationRequest::new("task-1", "Email Marketing Automation")
        .with_caller_context(CallerContext::for_identity("user@example.com"));

    c.bench_function("cache_key_generate", |b| {
        b.iter(|| keys.generate(black_box(&request)))
    });
}

fn bench_warm_cache_round_trip(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let generator = WorkflowGenerator::builder()
        .fallback_only(true)
        .build()
        .expect("generator");
    let request = GenerationRequest::new("warm-1", "Weekly KPI dashboard");
    rt.block_on(generator.generate(&request));

    c.bench_function("generate_cache_hit", |b| {
        b.to_async(&rt).iter(|| generator.generate(black_box(&request)))
    });
}

criterion_group!(
    benches,
    bench_fallback_generation,
    bench_payload_validation,
    bench_cache_keys,
    bench_warm_cache_round_trip
);
criterion_main!(benches);
