use std::io;
use std::io::BufRead;
use std::io::Write;

use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;
use crate::table::selection_table;

/// Asks a human to choose one instance out of several.
pub trait Selector {
    /// Returns the index of the chosen instance.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSelection`] if the choice is out of range
    fn pick(&mut self, instances: &[Instance]) -> Result<usize>;
}

/// Prints a numbered table and reads the chosen row number from a line of
/// input. There is no reprompt on bad input.
pub struct TableSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TableSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TableSelector<io::StdinLock<'static>, io::Stdout> {
    /// Selector on the process' stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Selector for TableSelector<R, W> {
    fn pick(&mut self, instances: &[Instance]) -> Result<usize> {
        writeln!(self.output, "{}", selection_table(instances))?;
        write!(
            self.output,
            "\nMore than one instance matched your criteria, pick one to log into: "
        )?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        debug!(input = line.trim(), "read selection");

        let max = instances.len();
        match line.trim().parse::<usize>() {
            Ok(pick) if (1..=max).contains(&pick) => Ok(pick - 1),
            _ => Err(Error::InvalidSelection { max }),
        }
    }
}
