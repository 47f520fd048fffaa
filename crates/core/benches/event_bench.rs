//! 이벤트 모델 벤치마크
//!
//! 단위 변환, 이벤트 생성, 직렬화 성능을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use gclog_core::event::{EventData, GcEvent, GenerationalData, LogEventType};
use gclog_core::types::{Memory, Occupancy, ThreadTimes, Trigger};
use gclog_core::units;

fn create_par_new() -> GcEvent {
    GcEvent::new(
        LogEventType::ParNew,
        46_674,
        30_123,
        "46674.719: [GC (Allocation Failure) 46674.719: [ParNew: 306688K->34048K(306688K), 0.0301230 secs]",
        EventData::Generational(Box::new(GenerationalData {
            trigger: Trigger::AllocationFailure,
            young: Some(Occupancy::new(
                Memory::from_kilobytes(306_688),
                Memory::from_kilobytes(34_048),
                Memory::from_kilobytes(306_688),
            )),
            times: Some(ThreadTimes {
                user: 18,
                sys: 0,
                real: 3,
            }),
            ..GenerationalData::default()
        })),
    )
}

fn bench_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("units");
    group.throughput(Throughput::Elements(1));

    group.bench_function("secs_to_micros", |b| {
        b.iter(|| units::secs_to_micros(black_box("12.3447910")))
    });

    group.bench_function("secs_to_micros_comma", |b| {
        b.iter(|| units::secs_to_micros(black_box("12,3447910")))
    });

    group.bench_function("size_to_bytes_fractional", |b| {
        b.iter(|| units::size_to_bytes(black_box("21.6M")))
    });

    group.bench_function("micros_to_millis", |b| {
        b.iter(|| units::micros_to_millis(black_box(12_344_791)))
    });

    group.bench_function("trigger_from_log", |b| {
        b.iter(|| Trigger::from_log(black_box("G1 Evacuation Pause")))
    });

    group.finish();
}

fn bench_event(c: &mut Criterion) {
    let event = create_par_new();

    let mut group = c.benchmark_group("event");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create_par_new", |b| b.iter(create_par_new));

    group.bench_function("accessors", |b| {
        b.iter(|| {
            let e = black_box(&event);
            (e.trigger(), e.young(), e.parallelism(), e.end_timestamp())
        })
    });

    group.bench_function("to_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&event)))
    });

    group.bench_function("display", |b| {
        b.iter(|| format!("{}", black_box(&event)))
    });

    group.finish();
}

criterion_group!(benches, bench_units, bench_event);
criterion_main!(benches);
