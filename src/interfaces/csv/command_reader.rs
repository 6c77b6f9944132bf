use crate::error::{PaymentError, Result};
use crate::interfaces::command::{Command, CommandRecord};
use std::io::Read;

/// Reads payment commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It trims whitespace and accepts rows that leave trailing columns out.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates commands.
    ///
    /// A malformed row yields an error and the iterator moves on to the next one.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(PaymentError::from)
                .and_then(|record: CommandRecord| Command::try_from(record))
        })
    }
}
