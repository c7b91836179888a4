// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kalamari_intercept::{is_valid_header_value, is_valid_http_token, UrlPattern};

fn url_pattern_benchmark(c: &mut Criterion) {
    let patterns = vec![
        UrlPattern::pathname("/login"),
        UrlPattern::string("https://example.com/api/*"),
        UrlPattern::string("https://example.com/static/app.js"),
    ];
    let compiled: Vec<_> = patterns.iter().filter_map(|p| p.compile().ok()).collect();

    let urls = vec![
        "https://example.com/login",
        "https://example.com/api/users?page=2",
        "https://example.com/home",
        "https://cdn.example.com/static/app.js",
    ];

    c.bench_function("url_pattern_match", |b| {
        b.iter(|| {
            for url in &urls {
                for pattern in &compiled {
                    black_box(pattern.matches(url));
                }
            }
        })
    });

    c.bench_function("url_pattern_compile", |b| {
        b.iter(|| {
            for pattern in &patterns {
                black_box(pattern.compile().is_ok());
            }
        })
    });
}

fn token_validation_benchmark(c: &mut Criterion) {
    let values = vec!["GET", "X-Custom-Header", "GE T", "text/html; charset=utf-8"];

    c.bench_function("http_token_check", |b| {
        b.iter(|| {
            for value in &values {
                black_box(is_valid_http_token(value));
                black_box(is_valid_header_value(value));
            }
        })
    });
}

criterion_group!(benches, url_pattern_benchmark, token_validation_benchmark);
criterion_main!(benches);
