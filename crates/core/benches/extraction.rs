use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use shelfnote_core::{
    CommerceRecord, Document, ExtractedRecord, PreprocessConfig, clean_text, extract_article, extract_commerce,
    preprocess_html, render,
};

const BOOK_URL: &str = "https://www.amazon.com/Dune-Frank-Herbert/dp/0441013597";

fn bench_parse(c: &mut Criterion) {
    let commerce = std::fs::read_to_string("../../tests/fixtures/commerce_page.html").unwrap();
    let article = std::fs::read_to_string("../../tests/fixtures/article_page.html").unwrap();

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("commerce", commerce.len()), &commerce, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("article", article.len()), &article, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let commerce = std::fs::read_to_string("../../tests/fixtures/commerce_page.html").unwrap();
    let article = std::fs::read_to_string("../../tests/fixtures/article_page.html").unwrap();

    c.bench_function("extract_commerce", |b| b.iter(|| extract_commerce(black_box(&commerce), BOOK_URL)));
    c.bench_function("extract_article", |b| b.iter(|| extract_article(black_box(&article))));
}

fn bench_preprocess(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/commerce_page.html").unwrap();
    let config = PreprocessConfig::commerce();

    c.bench_function("preprocess", |b| b.iter(|| preprocess_html(black_box(&html), &config)));
}

fn bench_clean_text(c: &mut Criterion) {
    let paragraph = "<p>Set on the desert planet <i>Arrakis</i>,&nbsp;a story<br>of spice &amp; politics.</p>\n";
    let html = paragraph.repeat(200);

    c.bench_function("clean_text", |b| b.iter(|| clean_text(black_box(&html))));
}

fn bench_render(c: &mut Criterion) {
    let record = ExtractedRecord::Commerce(CommerceRecord {
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        category: "Science Fiction".into(),
        category_url: Some("https://www.amazon.com/b?node=16272".into()),
        description: "Set on the desert planet Arrakis.".repeat(20),
        source_url: BOOK_URL.into(),
    });
    let template = "# {{book-creator:title}}\nby {{book-creator:author}}\n\n{{book-creator:summary}}\n\n\
                    {{book-creator:genre-link}} | {{book-creator:amazon-link}}\n";

    c.bench_function("render", |b| b.iter(|| render(black_box(template), &record)));
}

criterion_group!(benches, bench_parse, bench_extraction, bench_preprocess, bench_clean_text, bench_render);
criterion_main!(benches);
