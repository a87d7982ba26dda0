use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docx2chapters::chapters::split_chapters;
use docx2chapters::profile::ProfileLoader;
use docx2chapters::transform::{fold_acronyms, normalize, HeadingRules};
use std::hint::black_box;

/// Generate converter-like output with the given number of paragraphs per chapter
fn generate_document(paragraphs: usize) -> String {
    let mut content = String::from("\\textbf{Thesis draft}\n\nBackground and Significance\n\n");

    for chapter in 1..=3 {
        match chapter {
            2 => content.push_str("Chapter 2\n\nLiterature review\n\n"),
            3 => content.push_str(
                "\\textbf{Chapter 3}\n\n\\textbf{3. Research Methodology}\n\n",
            ),
            _ => {}
        }
        for i in 0..paragraphs {
            if i % 20 == 0 {
                content.push_str("\\textbf{Colloids}\n\n\\textbf{Sample Preparation}\n\n");
            }
            content.push_str(&format!(
                "Natural Rubber Latex (NRL) paragraph {} holds ~{}% solids at 25 °C; \
                 the \"jammed\" state — see NRL & DLS data, CO2 × H2O.\n\n",
                i,
                i % 70
            ));
        }
    }

    content
}

fn bench_pipeline(c: &mut Criterion) {
    let profile = ProfileLoader::embedded().expect("embedded profile");
    let rules = HeadingRules::from_profile(&profile).expect("rules");

    let mut group = c.benchmark_group("pipeline");
    for paragraphs in [50, 500] {
        let document = generate_document(paragraphs);
        group.throughput(Throughput::Bytes(document.len() as u64));

        group.bench_with_input(BenchmarkId::new("normalize", paragraphs), &document, |b, doc| {
            b.iter(|| normalize(black_box(doc)))
        });

        group.bench_with_input(BenchmarkId::new("acronyms", paragraphs), &document, |b, doc| {
            b.iter(|| fold_acronyms(black_box(doc), &profile.acronyms))
        });

        group.bench_with_input(BenchmarkId::new("headings", paragraphs), &document, |b, doc| {
            b.iter(|| rules.apply(black_box(doc)))
        });

        group.bench_with_input(BenchmarkId::new("full", paragraphs), &document, |b, doc| {
            b.iter(|| {
                let text = normalize(black_box(doc));
                let text = fold_acronyms(&text, &profile.acronyms).text;
                split_chapters(&rules.apply(&text))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
