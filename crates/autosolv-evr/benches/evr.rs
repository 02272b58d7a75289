use criterion::{black_box, criterion_group, criterion_main, Criterion};
use autosolv_evr::{rpmvercmp, Dependency, Evr};

fn bench_rpmvercmp(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "1.2.4"),
        ("2.4.0~rc1", "2.4.0"),
        ("1.0^git20200101", "1.0"),
        ("5.5p10", "5.5p1"),
        ("1.010", "1.9"),
        ("xyz10", "xyz10.1"),
    ];

    c.bench_function("rpmvercmp", |b| {
        b.iter(|| {
            for (a, bver) in cases {
                black_box(rpmvercmp(black_box(a), black_box(bver)));
            }
        })
    });
}

fn bench_evr_parse(c: &mut Criterion) {
    let evrs = ["1:2.28-9.fc30", "3.0.12-17.el7", "0.9.8~beta2-1", "2020.04.20"];

    c.bench_function("evr_parse", |b| {
        b.iter(|| {
            for evr in evrs {
                black_box(Evr::parse(black_box(evr)).ok());
            }
        })
    });
}

fn bench_dependency_match(c: &mut Criterion) {
    let requires = Dependency::parse("glibc >= 2.28-1").unwrap();
    let provides: Vec<Dependency> = ["glibc = 2.27-5", "glibc = 2.28-9.fc30", "glibc"]
        .iter()
        .map(|s| Dependency::parse(s).unwrap())
        .collect();

    c.bench_function("dependency_matches", |b| {
        b.iter(|| {
            for provide in &provides {
                black_box(requires.matches(black_box(provide)));
            }
        })
    });
}

criterion_group!(benches, bench_rpmvercmp, bench_evr_parse, bench_dependency_match);
criterion_main!(benches);
