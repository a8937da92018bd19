//! The `ielts-grade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_once(Path::new("ielts-grade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("quizzes")?;
    write_once(Path::new("quizzes/example.toml"), EXAMPLE_QUIZ)?;

    std::fs::create_dir_all("attempts")?;
    write_once(Path::new("attempts/example.json"), EXAMPLE_ATTEMPTS)?;

    println!("\nNext steps:");
    println!("  1. Run: ielts-grade validate --quiz quizzes/example.toml");
    println!(
        "  2. Run: ielts-grade grade --quiz quizzes/example.toml --attempts attempts/example.json"
    );

    Ok(())
}

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ielts-grade configuration

parallelism = 4
output_dir = "./ielts-grade-results"
default_format = "text"
# pass_percentage = 60.0
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Listening Quiz"
description = "A short quiz to get started"
scoring_type = "ielts_listening"

[[questions]]
id = "q1"
type = "short_answer"
instructions = "Write ONE WORD ONLY."
question = "What colour is the bus?"
correct_answer = "red"

[[questions]]
id = "q2"
type = "true_false"
question = "The bus leaves every ten minutes."
correct_answer = "true"

[[questions]]
id = "q3"
type = "summary_completion"
question = "The museum opens at [field 1] and closes at [field 2]."

[questions.summary_fields.1]
answer = "9 am|nine am|9"

[questions.summary_fields.2]
answer = "5 pm|five pm|5"
"#;

const EXAMPLE_ATTEMPTS: &str = r#"[
  {
    "id": "example-1",
    "learner": "Sample Learner",
    "answers": {
      "q1": "Red",
      "q2": "not given",
      "q3": { "1": "9 AM", "2": "5 pm" }
    }
  }
]
"#;
