//! Prints the usable questions found in a spreadsheet.

use anyhow::Context;
use std::path::Path;
use voxpop_core::questions::filter_question_rows;
use voxpop_infrastructure::spreadsheet::read_first_column;

pub fn execute(file: &Path) -> anyhow::Result<()> {
    let rows =
        read_first_column(file).with_context(|| format!("reading {}", file.display()))?;
    let total = rows.len();
    let questions = filter_question_rows(rows);
    anyhow::ensure!(
        !questions.is_empty(),
        "{} contains no usable questions",
        file.display()
    );

    println!(
        "{} usable questions ({} rows dropped):",
        questions.len(),
        total - questions.len()
    );
    for (i, question) in questions.iter().enumerate() {
        println!("{}. {question}", i + 1);
    }
    Ok(())
}
