//! The `ielts-grade band` command.

use anyhow::Result;

use ielts_grade_core::band::{band_score, ScoringType};

pub fn execute(score: u32, scoring: String) -> Result<()> {
    let scoring: ScoringType = scoring.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let Some(band) = band_score(score, scoring) else {
        anyhow::bail!("{scoring} scoring has no band table");
    };

    if let Some(max) = scoring.max_raw_score() {
        if score > max {
            eprintln!("Warning: raw score {score} is above the table maximum of {max}");
        }
    }

    println!("Band {band:.1}");
    Ok(())
}
