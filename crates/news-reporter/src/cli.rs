//! Interactive prompt loop.

use crate::{Reporter, ReporterResult};
use std::io::{BufRead, Write};

/// Outcome counts of an interactive session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub sent: usize,
    pub failed: usize,
    pub invalid: usize,
}

/// Prompt for items until the user declines to continue or input ends.
pub async fn interactive<R: BufRead, W: Write>(
    reporter: &Reporter,
    mut input: R,
    mut output: W,
) -> ReporterResult<SessionSummary> {
    let mut summary = SessionSummary::default();

    loop {
        let Some(source) = prompt(&mut input, &mut output, "Enter news source: ")? else {
            break;
        };
        let Some(headline) = prompt(&mut input, &mut output, "Enter news headline: ")? else {
            break;
        };

        if source.is_empty() || headline.is_empty() {
            writeln!(output, "Invalid input. Input must not be blank.")?;
            summary.invalid += 1;
        } else if reporter.add_post(&source, &headline).await {
            writeln!(output, "News sent successfully")?;
            summary.sent += 1;
        } else {
            writeln!(output, "Failed to send news. Try again")?;
            summary.failed += 1;
        }

        let again = prompt(
            &mut input,
            &mut output,
            "Enter 'y' if you would like to post again, or other key to exit: ",
        )?;
        if !matches!(again.as_deref(), Some(answer) if answer.eq_ignore_ascii_case("y")) {
            break;
        }
    }

    Ok(summary)
}

/// Write `message`, then read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> ReporterResult<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
