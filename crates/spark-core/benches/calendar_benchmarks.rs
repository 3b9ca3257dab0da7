use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spark_core::calendar::{generate_month_grid, CalendarCursor};
use spark_core::date_query::{filter_grid_by_query, resolve_suggestion};
use spark_core::models::{Task, TaskPriority};
use spark_core::projection::{Projection, View};

fn bench_month_grid(c: &mut Criterion) {
    c.bench_function("generate_month_grid", |b| {
        b.iter(|| generate_month_grid(black_box(2024), black_box(1)))
    });

    c.bench_function("navigate_one_year", |b| {
        b.iter(|| {
            let mut cursor = CalendarCursor::new(2024, 0);
            for _ in 0..12 {
                cursor = cursor.next();
            }
            black_box(cursor)
        })
    });
}

fn bench_date_query(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let grid = generate_month_grid(2024, 2);

    let mut group = c.benchmark_group("filter_grid_by_query");
    for query in ["", "fri", "1", "tom"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| filter_grid_by_query(black_box(&grid), query, today))
        });
    }
    group.finish();

    c.bench_function("resolve_suggestion", |b| {
        b.iter(|| resolve_suggestion(black_box("wed"), today))
    });
}

fn bench_projection(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let priorities = [
        TaskPriority::None,
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
    ];
    let tasks: Vec<Task> = (0..1_000u64)
        .map(|i| Task {
            title: format!("Task {}", i),
            priority: priorities[(i % 4) as usize],
            due_date: today.checked_add_days(Days::new(i % 30)),
            is_someday: i % 17 == 0,
            ..Default::default()
        })
        .collect();
    let projection = Projection::new(today, Vec::new(), Vec::new());

    let mut group = c.benchmark_group("projection_view");
    for view in [View::Today, View::Upcoming] {
        group.bench_with_input(BenchmarkId::from_parameter(view), &view, |b, view| {
            b.iter(|| projection.view(black_box(&tasks), *view).len())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_month_grid, bench_date_query, bench_projection);
criterion_main!(benches);
