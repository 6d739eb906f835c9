use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pagegrab_core::{Document, extract, extract_document, parse_availability, placeholder_document};

fn bench_parse(c: &mut Criterion) {
    let article = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let large = article.repeat(200);

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("article", "2KB"), &article, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("large", "400KB"), &large, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let doc = Document::parse(&html);

    c.bench_function("extract", |b| b.iter(|| extract(black_box(&html))));
    c.bench_function("extract_document", |b| b.iter(|| extract_document(black_box(&doc))));
}

fn bench_archive_response(c: &mut Criterion) {
    let body = r#"{"archived_snapshots":{"closest":{"available":true,"status":"200","url":"http://web.archive.org/web/2020/https://example.com/"}}}"#;

    c.bench_function("parse_availability", |b| b.iter(|| parse_availability(black_box(body))));
}

fn bench_placeholder(c: &mut Criterion) {
    let path = std::path::Path::new("scrape_screenshot.png");

    c.bench_function("placeholder_document", |b| {
        b.iter(|| placeholder_document(black_box("https://example.com/page/Article"), path))
    });
}

criterion_group!(benches, bench_parse, bench_extract, bench_archive_response, bench_placeholder);
criterion_main!(benches);
