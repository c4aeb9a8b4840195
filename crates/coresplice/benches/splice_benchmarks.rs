//! Splicing performance benchmarks.
//!
//! Measures conversion and measurement export across site sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use coresplice::{
    ExportOptions, MeasurementData, SectionSummary, SparseSplice, Splicer, TableReader,
};
use std::io::Write;
use tempfile::NamedTempFile;

const SECTIONS_PER_CORE: usize = 6;
const SECTION_LENGTH: f64 = 1.5;

/// Section Summary for three holes of `cores` cores, each hole offset a little.
fn generate_section_summary(cores: usize) -> String {
    let mut data = String::from(
        "Site,Hole,Core,Tool,Section,TopDepth,BottomDepth,TopDepthScaled,BottomDepthScaled,CuratedLength,Gaps\n",
    );
    for (h, hole) in ["A", "B", "C"].iter().enumerate() {
        for core in 1..=cores {
            let core_top = h as f64 * 0.7 + (core - 1) as f64 * 9.5;
            for section in 1..=SECTIONS_PER_CORE {
                let top = core_top + (section - 1) as f64 * SECTION_LENGTH;
                let bottom = top + SECTION_LENGTH;
                data.push_str(&format!(
                    "1,{hole},{core},H,{section},{top:.3},{bottom:.3},{top:.3},{bottom:.3},{SECTION_LENGTH},\n"
                ));
            }
        }
    }
    data
}

/// Sparse splice alternating between holes A and B, one interval per core.
fn generate_sparse_splice(cores: usize) -> String {
    let mut data = String::from(
        "Site,Hole,Core,Tool,TopSection,TopOffset,BottomSection,BottomOffset,SpliceType,Gap,DataUsed,Comment\n",
    );
    for core in 1..=cores {
        let hole = if core % 2 == 1 { "A" } else { "B" };
        let join = if core == 1 { "" } else { "TIE" };
        data.push_str(&format!("1,{hole},{core},H,1,20,{SECTIONS_PER_CORE},100,{join},,NGR,\n"));
    }
    data
}

/// Ten measurements per section of hole A and B.
fn generate_measurements(cores: usize) -> String {
    let mut data = String::from("Site,Hole,Core,Tool,Section,Depth,NGR\n");
    for (h, hole) in ["A", "B"].iter().enumerate() {
        for core in 1..=cores {
            let core_top = h as f64 * 0.7 + (core - 1) as f64 * 9.5;
            for section in 1..=SECTIONS_PER_CORE {
                for step in 0..10 {
                    let depth = core_top + (section - 1) as f64 * SECTION_LENGTH + step as f64 * 0.15;
                    data.push_str(&format!("1,{hole},{core},H,{section},{depth:.3},{}\n", step * 3));
                }
            }
        }
    }
    data
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
    temp.write_all(content.as_bytes()).unwrap();
    temp
}

/// Benchmark sparse splice conversion, tables already loaded.
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let reader = TableReader::new();

    for cores in [10, 50, 200].iter() {
        let sections = temp_file(&generate_section_summary(*cores));
        let splice = temp_file(&generate_sparse_splice(*cores));
        let summary = SectionSummary::load(&reader, sections.path()).unwrap();
        let sparse = SparseSplice::load(&reader, splice.path()).unwrap();

        group.throughput(Throughput::Elements(*cores as u64));
        group.bench_with_input(BenchmarkId::new("cores", cores), &(summary, sparse), |b, (summary, sparse)| {
            let splicer = Splicer::new();
            b.iter(|| black_box(splicer.convert(summary, sparse, None).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark loading and mapping a Section Summary file.
fn bench_load_section_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_section_summary");
    let reader = TableReader::new();

    for cores in [10, 50, 200].iter() {
        let data = generate_section_summary(*cores);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("cores", cores), &data, |b, data| {
            b.iter_with_setup(
                || temp_file(data),
                |temp| black_box(SectionSummary::load(&reader, temp.path()).unwrap()),
            )
        });
    }

    group.finish();
}

/// Benchmark splicing measurement rows.
fn bench_splice_measurements(c: &mut Criterion) {
    let mut group = c.benchmark_group("splice_measurements");
    let reader = TableReader::new();

    for cores in [10, 50].iter() {
        let sections = temp_file(&generate_section_summary(*cores));
        let splice = temp_file(&generate_sparse_splice(*cores));
        let measurements = temp_file(&generate_measurements(*cores));
        let summary = SectionSummary::load(&reader, sections.path()).unwrap();
        let sparse = SparseSplice::load(&reader, splice.path()).unwrap();
        let data = MeasurementData::load(&reader, measurements.path(), "Depth").unwrap();

        let splicer = Splicer::new();
        let converted = splicer.convert(&summary, &sparse, None).unwrap();
        let options = ExportOptions::default();

        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_function(BenchmarkId::new("cores", cores), |b| {
            b.iter(|| {
                black_box(
                    splicer
                        .splice_measurements(&converted.affine, &converted.sit, &data, &options)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_convert,
    bench_load_section_summary,
    bench_splice_measurements,
);
criterion_main!(benches);
