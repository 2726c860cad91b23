//! Benchmarks for end-to-end extraction
//!
//! Measures extraction over the customer fixture and over synthetic jobs
//! with a growing number of stages.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dsxlens_engine::{DsxExtractor, Validator};

const FIXTURE: &str = include_str!("../../dsxlens-parser/tests/fixtures/customer_load.dsx");

/// Generate a linear job of N connector stages linked in sequence
fn generate_job(num_stages: usize) -> String {
    let ids: Vec<String> = (0..num_stages).map(|i| format!("V0S{}", i)).collect();
    let names: Vec<String> = (0..num_stages).map(|i| format!("stage_{}", i)).collect();
    let links: Vec<String> = (1..num_stages).map(|i| format!("lnk_{}", i)).collect();
    let pins: Vec<String> = (1..num_stages).map(|i| format!("V0S{}P1", i - 1)).collect();
    let targets: Vec<String> = (1..num_stages).map(|i| format!("V0S{}", i)).collect();

    let mut doc = format!(
        "BEGIN HEADER\n   ToolVersion \"8\"\nEND HEADER\nBEGIN DSJOB\n   Identifier \"Generated\"\n   BEGIN DSRECORD\n      Identifier \"V0\"\n      StageList \"{}\"\n      StageNames \"{}\"\n      LinkNames \"{}\"\n      LinkSourcePinIDs \"{}\"\n      LinkTargetStageIDs \"{}\"\n   END DSRECORD\n",
        ids.join("|"),
        names.join("|"),
        links.join("|"),
        pins.join("|"),
        targets.join("|"),
    );

    for i in 0..num_stages {
        let context = if i + 1 == num_stages { 2 } else { 1 };
        doc.push_str(&format!(
            "   BEGIN DSRECORD\n      Identifier \"V0S{i}\"\n      Name \"stage_{i}\"\n      StageType \"OracleConnectorPX\"\n      BEGIN DSSUBRECORD\n         Name \"XMLProperties\"\n         Value =+=+=+=\n<Properties><Context type='int'>{context}</Context><TableName><![CDATA[SCHEMA.TABLE_{i}]]></TableName></Properties>\n=+=+=+=\n      END DSSUBRECORD\n   END DSRECORD\n"
        ));
        doc.push_str(&format!(
            "   BEGIN DSRECORD\n      Identifier \"V0S{i}P1\"\n      OLEType \"CCustomOutput\"\n      Name \"lnk_{}\"\n      Partner \"V0S{}|V0S{}P0\"\n      BEGIN DSSUBRECORD\n         Name \"COL_{i}\"\n         SqlType \"12\"\n         Precision \"40\"\n      END DSSUBRECORD\n   END DSRECORD\n",
            i + 1,
            i + 1,
            i + 1,
        ));
    }

    doc.push_str("END DSJOB\n");
    doc
}

fn bench_fixture(c: &mut Criterion) {
    let extractor = DsxExtractor::default();

    c.bench_function("extract_fixture", |b| {
        b.iter(|| black_box(extractor.extract(black_box(FIXTURE), false)))
    });

    c.bench_function("extract_fixture_with_estimate", |b| {
        b.iter(|| black_box(extractor.extract(black_box(FIXTURE), true)))
    });
}

fn bench_generated_jobs(c: &mut Criterion) {
    let mut group = c.benchmark_group("generated_jobs");
    let extractor = DsxExtractor::default();

    for num_stages in [10, 50, 200].iter() {
        let doc = generate_job(*num_stages);

        group.bench_with_input(BenchmarkId::new("extract", num_stages), &doc, |b, doc| {
            b.iter(|| black_box(extractor.extract(doc, false)))
        });

        let job = extractor.extract(&doc, false);
        group.bench_with_input(BenchmarkId::new("validate", num_stages), &job, |b, job| {
            b.iter(|| black_box(Validator::validate(job)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fixture, bench_generated_jobs);
criterion_main!(benches);
