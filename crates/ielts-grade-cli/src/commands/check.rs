//! The `ielts-grade check` command.

use anyhow::Result;

use ielts_grade_core::alternatives::parse_alternatives;
use ielts_grade_core::field::evaluate_open;
use ielts_grade_core::normalize::normalize;

pub fn execute(accepted: String, answer: String) -> Result<()> {
    let set = parse_alternatives(&accepted)?;
    let outcome = evaluate_open(&answer, &set);

    println!("Accepted:   {}", set.alternatives().join(" | "));
    println!("Normalized: {}", normalize(&answer));
    println!("Outcome:    {outcome}");

    Ok(())
}
