//! The `ielts-grade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use ielts_grade_core::parser;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let files = if quiz_path.is_dir() {
        parser::quiz_files(&quiz_path)?
    } else {
        vec![quiz_path]
    };

    let mut total_warnings = 0;

    for file in &files {
        let (quiz, warnings) = parser::parse_quiz_with_warnings(file)?;
        println!(
            "Quiz: {} ({} questions, {} points, {})",
            quiz.title,
            quiz.items.len(),
            quiz.max_score(),
            quiz.scoring_type
        );

        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
