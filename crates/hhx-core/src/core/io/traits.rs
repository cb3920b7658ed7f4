use crate::core::models::event::EventStore;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing files of generator events.
///
/// Implementors provide a streaming reader and a writer; the collecting and
/// path-based methods are built on top of them.
pub trait EventFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Lazy iterator over the events of one input, in file order.
    type Reader<R: BufRead>: Iterator<Item = Result<EventStore, Self::Error>>;

    /// Wraps a buffered reader in a streaming event reader.
    fn reader<R: BufRead>(reader: R) -> Self::Reader<R>;

    /// Writes events to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(events: &[EventStore], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads every event from a buffered reader into memory.
    ///
    /// # Errors
    ///
    /// Returns the first parse or I/O error encountered.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<EventStore>, Self::Error> {
        Self::reader(reader).collect()
    }

    /// Opens a file for streaming. Events are parsed as the reader is advanced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn open<P: AsRef<Path>>(path: P) -> Result<Self::Reader<BufReader<File>>, Self::Error> {
        let file = File::open(path)?;
        Ok(Self::reader(BufReader::new(file)))
    }

    /// Writes events to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(events: &[EventStore], path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(events, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
