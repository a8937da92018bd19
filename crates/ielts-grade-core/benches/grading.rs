use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ielts_grade_core::grader::grade;
use ielts_grade_core::parser::{parse_quiz_str, QuizFormat};
use ielts_grade_core::quiz::{grade_attempt, Attempt};
use ielts_grade_core::submission::Submission;

fn generate_quiz_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[quiz]
id = "bench"
title = "Benchmark"
scoring_type = "ielts_academic_reading"
"#,
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
id = "open_{i}"
type = "short_answer"
correct_answer = "answer {i}|the answer {i}"

[[questions]]
id = "table_{i}"
type = "table_completion"
question = "[field 1] then [field 2]"
field_answers = ["{i}.5 billion", "{i} million"]
"#
        ));
    }
    s
}

fn attempt_for(n: usize) -> Attempt {
    let mut attempt = Attempt {
        id: "bench".into(),
        ..Default::default()
    };
    for i in 0..n {
        attempt
            .answers
            .insert(format!("open_{i}"), Submission::text(format!("The Answer {i}")));
        attempt.answers.insert(
            format!("table_{i}"),
            Submission::fields([(1, format!("{i}.5 billion")), (2, "wrong".to_string())]),
        );
    }
    attempt
}

fn bench_grade_question(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_question");

    let quiz = parse_quiz_str(&generate_quiz_toml(1), QuizFormat::Toml, Path::new("bench.toml"))
        .unwrap();
    let open = &quiz.items[0].question;
    let table = &quiz.items[1].question;
    let text = Submission::text("the answer 0");
    let fields = Submission::fields([(1, "0.5 billion"), (2, "0 million")]);

    group.bench_function("open_text", |b| {
        b.iter(|| grade(black_box(open), black_box(&text)))
    });

    group.bench_function("table_completion", |b| {
        b.iter(|| grade(black_box(table), black_box(&fields)))
    });

    group.finish();
}

fn bench_grade_attempt(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_attempt");

    for n in [5, 20] {
        let quiz = parse_quiz_str(&generate_quiz_toml(n), QuizFormat::Toml, Path::new("bench.toml"))
            .unwrap();
        let attempt = attempt_for(n);
        group.bench_function(format!("{}_questions", n * 2), |b| {
            b.iter(|| grade_attempt(black_box(&quiz), black_box(&attempt)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grade_question, bench_grade_attempt);
criterion_main!(benches);
