// AMACAD cluster analysis: Aggregation and exploration of clustering simulation results
// Copyright (C) 2024-2025 The AMACAD analysis authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Numbered menus on a line based terminal.

use std::io::{BufRead, Write};

use itertools::Itertools;

/// Answer to a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// The user asked to quit, or the input ended.
    Quit,
    /// The answer did not contain any valid option.
    Nothing,
    /// Indices of the chosen options, in the order they were entered.
    Picked(Vec<usize>),
}

/// Parse a comma separated answer to a menu with `n` options, where index `n` means `Quit`.
///
/// `Quit` is only recognized as the first token. Tokens that are not numbers or out of range are
/// dropped, as are repeated indices.
pub fn parse_selection(line: &str, n: usize) -> Choice {
    let tokens = line
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect_vec();
    if tokens.first().and_then(|t| t.parse::<usize>().ok()) == Some(n) {
        return Choice::Quit;
    }
    let picked = tokens
        .into_iter()
        .filter_map(|t| t.parse::<usize>().ok())
        .filter(|i| *i < n)
        .unique()
        .collect_vec();
    if picked.is_empty() {
        Choice::Nothing
    } else {
        Choice::Picked(picked)
    }
}

pub const PROMPT: &str = "Select (comma-separated for multiple choice): ";

/// Input and output port of an interactive session.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn say(&mut self, msg: impl AsRef<str>) -> std::io::Result<()> {
        writeln!(self.output, "{}", msg.as_ref())
    }

    /// Read a line without its line ending. Returns `None` at the end of the input.
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Show a numbered menu of `options` followed by `Quit`, and wait for a non-empty answer.
    pub fn menu<S: AsRef<str>>(&mut self, header: &str, options: &[S]) -> std::io::Result<Choice> {
        writeln!(self.output)?;
        writeln!(self.output, "{header}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "{i}.) {}", option.as_ref())?;
        }
        writeln!(self.output, "{}.) Quit", options.len())?;

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;
            match self.read_line()? {
                None => return Ok(Choice::Quit),
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(parse_selection(&line, options.len())),
            }
        }
    }

    /// Ask a yes/no question, where an empty answer means yes and the end of the input means no.
    pub fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;
        Ok(match self.read_line()? {
            None => false,
            Some(answer) => !answer.to_lowercase().starts_with('n'),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("0", 3), Choice::Picked(vec![0]));
        assert_eq!(parse_selection("2, 0,1", 3), Choice::Picked(vec![2, 0, 1]));
        assert_eq!(parse_selection("3", 3), Choice::Quit);
        assert_eq!(parse_selection(" 3 ,1", 3), Choice::Quit);
        // quit is only recognized as the first token
        assert_eq!(parse_selection("1,3", 3), Choice::Picked(vec![1]));
        assert_eq!(parse_selection("1,x,7,-1,1", 3), Choice::Picked(vec![1]));
        assert_eq!(parse_selection("x", 3), Choice::Nothing);
        assert_eq!(parse_selection("9,10", 3), Choice::Nothing);
        assert_eq!(parse_selection(",", 3), Choice::Nothing);
        assert_eq!(parse_selection("0", 0), Choice::Quit);
    }

    #[test]
    fn test_menu() {
        let input = "\n\n1,0\n";
        let mut console = Console::new(input.as_bytes(), Vec::new());
        let choice = console.menu("Algorithm:", &["A", "B"]).unwrap();
        assert_eq!(choice, Choice::Picked(vec![1, 0]));
        let output = String::from_utf8(console.output().clone()).unwrap();
        assert_eq!(
            output,
            format!("\nAlgorithm:\n0.) A\n1.) B\n2.) Quit\n{PROMPT}{PROMPT}{PROMPT}")
        );

        // end of input
        assert_eq!(console.menu("Algorithm:", &["A"]).unwrap(), Choice::Quit);
    }

    #[test]
    fn test_confirm() {
        let mut console = Console::new("\nY\nn\nNo\n".as_bytes(), Vec::new());
        assert!(console.confirm("Again? (Y/n)").unwrap());
        assert!(console.confirm("Again? (Y/n)").unwrap());
        assert!(!console.confirm("Again? (Y/n)").unwrap());
        assert!(!console.confirm("Again? (Y/n)").unwrap());
        assert!(!console.confirm("Again? (Y/n)").unwrap());
    }
}
