//! Interactive loop driving one calculator from lines of key input.

use std::io::{BufRead, Write};

use anyhow::Result;
use calc_core::format::format_number;
use calc_core::{CalculatorState, ExpressionState};
use clap::ValueEnum;
use tracing::{debug, warn};

use crate::keys::{expand_keys, expression_key, standard_key};

/// Which calculator the REPL drives
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Immediate-execution calculator
    Standard,
    /// Free-text expression calculator
    Expression,
}

/// A calculator the REPL can feed a line of keys to
trait Session {
    /// Apply a line; returns the memory register if a memory key was pressed.
    fn feed(&mut self, line: &str) -> Result<Option<f64>>;
    /// Current display
    fn render(&self) -> String;
}

impl Session for CalculatorState {
    fn feed(&mut self, line: &str) -> Result<Option<f64>> {
        let mut memory = None;
        for token in expand_keys(line, standard_key)? {
            memory = self.press(token).or(memory);
        }
        Ok(memory)
    }

    fn render(&self) -> String {
        format!("[{}] {}", self.clear_label(), self.display())
    }
}

impl Session for ExpressionState {
    fn feed(&mut self, line: &str) -> Result<Option<f64>> {
        let mut memory = None;
        for key in expand_keys(line, expression_key)? {
            memory = self.press(key).or(memory);
        }
        Ok(memory)
    }

    fn render(&self) -> String {
        match (self.is_fresh(), self.last_expression()) {
            (true, Some(last)) => format!("{} {}", last, self.result_text()),
            _ => format!("{} | {}", self.text(), self.result_text()),
        }
    }
}

/// Run the loop until `quit`, `exit` or end of input.
pub fn run(mode: Mode, input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut session: Box<dyn Session> = match mode {
        Mode::Standard => Box::new(CalculatorState::new()),
        Mode::Expression => Box::new(ExpressionState::new()),
    };
    debug!(?mode, "repl started");

    writeln!(output, "{}", session.render())?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if matches!(trimmed, "quit" | "exit") {
            break;
        }

        match session.feed(trimmed) {
            Ok(Some(memory)) => {
                writeln!(output, "{}", session.render())?;
                writeln!(output, "M = {}", format_number(memory))?;
            }
            Ok(None) => writeln!(output, "{}", session.render())?,
            Err(e) => {
                warn!(line = trimmed, error = %e, "rejected input");
                writeln!(output, "error: {}", e)?;
            }
        }
        write!(output, "> ")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn transcript(mode: Mode, input: &str) -> String {
        let mut output = Vec::new();
        run(mode, Cursor::new(input), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_standard_session() {
        let out = transcript(Mode::Standard, "5 + 3 =\nquit\n");
        assert!(out.starts_with("[AC] 0\n"));
        assert!(out.contains("[C] 8\n"));
    }

    #[test]
    fn test_standard_memory_readout() {
        let out = transcript(Mode::Standard, "7 M+\n");
        assert!(out.contains("M = 7\n"));
    }

    #[test]
    fn test_expression_session() {
        let out = transcript(Mode::Expression, "2+3*4\n=\n");
        assert!(out.contains("2+3*4 | 0\n"));
        assert!(out.contains("2+3*4= 14\n"));
    }

    #[test]
    fn test_bad_key_keeps_session() {
        let out = transcript(Mode::Expression, "2 #\n2+2=\n");
        assert!(out.contains("error: unknown key '#'"));
        assert!(out.contains("2+2= 4\n"));
    }
}
