use crate::domain::purchase::Purchase;
use crate::error::{CheckoutError, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads purchases from a JSON Lines source, one purchase per line.
///
/// Each line is decoded on its own, so a malformed line yields an error for
/// that line only and the stream carries on. Blank lines are skipped.
pub struct PurchaseReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> PurchaseReader<R> {
    /// Creates a new `PurchaseReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes purchases.
    pub fn purchases(self) -> impl Iterator<Item = Result<Purchase>> {
        self.reader
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line).map_err(CheckoutError::from)
            })
    }
}
