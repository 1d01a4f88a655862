//! Benchmarks for the analysis pipeline
//!
//! Measures scanning and unused-variable reporting on generated programs
//! of a few thousand lines, the size of a typical legacy 4GL module.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fglscope::analysis::{analyze, UsageMatcher};
use fglscope::outline;
use fglscope::parser::scan;

/// Create a program with the given number of functions
fn create_program(functions: usize) -> String {
    let mut text = String::from("GLOBALS\n  DEFINE g_user STRING\nEND GLOBALS\n\nMAIN\n");
    text.push_str("  DEFINE l_i, l_unused INTEGER\n");
    for i in 0..functions {
        text.push_str(&format!("  CALL f_{}(l_i)\n", i));
    }
    text.push_str("END MAIN\n\n");

    for i in 0..functions {
        text.push_str(&format!("FUNCTION f_{}(p_id)\n", i));
        text.push_str("  DEFINE p_id INTEGER\n");
        text.push_str("  DEFINE l_rec RECORD\n");
        text.push_str("      id INTEGER,\n");
        text.push_str("      name VARCHAR(40),\n");
        text.push_str("      amount DECIMAL(10,2)\n");
        text.push_str("  END RECORD\n");
        text.push_str("  DEFINE l_cnt, l_tmp INTEGER   # counters\n");
        text.push_str("  SELECT * INTO l_rec.* FROM t WHERE id = p_id\n");
        text.push_str("  IF l_rec.amount > 0 THEN\n");
        text.push_str("    LET l_cnt = l_cnt + 1\n");
        text.push_str("  END IF\n");
        text.push_str("  RETURN l_cnt\n");
        text.push_str("END FUNCTION\n\n");
    }
    text
}

/// Benchmark block scanning alone
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for functions in [50, 200, 500].iter() {
        let text = create_program(*functions);

        group.bench_with_input(BenchmarkId::new("functions", functions), &text, |b, text| {
            b.iter(|| black_box(scan(text)));
        });
    }

    group.finish();
}

/// Benchmark the full pipeline (scan + unused-variable report)
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for functions in [50, 200, 500].iter() {
        let text = create_program(*functions);

        group.bench_with_input(BenchmarkId::new("functions", functions), &text, |b, text| {
            b.iter(|| black_box(analyze(text).diagnostics.len()));
        });
    }

    group.finish();
}

/// Benchmark compiling and applying the usage rules for one name
fn bench_usage_rules(c: &mut Criterion) {
    let lines = [
        "LET l_cnt = l_cnt + 1",
        "CALL f(a, b, l_cnt)",
        "SELECT * INTO l_rec.* FROM t",
        "DISPLAY 'total:', l_total",
    ];

    c.bench_function("usage_matcher_new", |b| {
        b.iter(|| black_box(UsageMatcher::new("l_total")));
    });

    let matcher = UsageMatcher::new("l_total");
    c.bench_function("usage_match_lines", |b| {
        b.iter(|| {
            for line in lines.iter() {
                black_box(matcher.match_line(line));
            }
        });
    });
}

/// Benchmark outline rendering
fn bench_outline(c: &mut Criterion) {
    let tree = scan(&create_program(500));
    c.bench_function("outline_render_500", |b| {
        b.iter(|| black_box(outline::render(&tree)));
    });
}

criterion_group!(
    benches,
    bench_scan,
    bench_analyze,
    bench_usage_rules,
    bench_outline
);
criterion_main!(benches);
