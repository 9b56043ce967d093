//! Appending arrays to an output stream one at a time

use crate::array::Array;
use crate::container::{write_header, write_one, WriteOptions};
use crate::error::{Error, Result};
use hashbrown::HashSet;
use log::debug;
use std::io::Write;

/// Record of the names already written in a session
pub trait NameTracker {
    fn has_been_written(&self, name: &str) -> bool;
    fn mark_written(&mut self, name: &str);
}

/// Names held in a hash set
#[derive(Debug, Clone, Default)]
pub struct WrittenNames {
    names: HashSet<String>,
}

impl WrittenNames {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameTracker for WrittenNames {
    fn has_been_written(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn mark_written(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

/// Writer that emits the header before the first array and then appends
/// one top-level element per call
pub struct IncrementalWriter<W: Write, T: NameTracker = WrittenNames> {
    sink: W,
    options: WriteOptions,
    header_written: bool,
    names: T,
}

impl<W: Write> IncrementalWriter<W> {
    pub fn new(sink: W, options: WriteOptions) -> Self {
        Self::with_tracker(sink, options, WrittenNames::default())
    }
}

impl<W: Write, T: NameTracker> IncrementalWriter<W, T> {
    pub fn with_tracker(sink: W, options: WriteOptions, names: T) -> Self {
        Self {
            sink,
            options,
            header_written: false,
            names,
        }
    }

    /// Append one array
    ///
    /// Invalid or duplicate names fail before anything reaches the sink.
    pub fn write(&mut self, array: &Array) -> Result<()> {
        if self.names.has_been_written(array.name()) {
            return Err(Error::argument(format!(
                "array '{}' has already been written",
                array.name()
            )));
        }
        let element = write_one(array, &self.options)?;

        if !self.header_written {
            self.sink.write_all(&write_header(&self.options))?;
            self.header_written = true;
            debug!("wrote container header");
        }
        self.sink.write_all(&element)?;
        self.names.mark_written(array.name());
        debug!("appended '{}' ({} bytes)", array.name(), element.len());
        Ok(())
    }

    pub fn has_been_written(&self, name: &str) -> bool {
        self.names.has_been_written(name)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Finish the session, writing the header if no array was written
    pub fn finish(mut self) -> Result<W> {
        if !self.header_written {
            self.sink.write_all(&write_header(&self.options))?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_header_for_many_arrays() {
        let options = WriteOptions::default().with_compression(false);
        let mut writer = IncrementalWriter::new(Vec::new(), options);
        for name in ["a", "b", "c"] {
            writer.write(&Array::scalar(name, 1.0)).unwrap();
        }
        let bytes = writer.finish().unwrap();
        let signatures = bytes
            .windows(19)
            .filter(|w| *w == b"MATLAB 5.0 MAT-file")
            .count();
        assert_eq!(signatures, 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut writer = IncrementalWriter::new(Vec::new(), WriteOptions::default());
        writer.write(&Array::scalar("x", 1.0)).unwrap();
        assert!(writer.has_been_written("x"));
        let err = writer.write(&Array::scalar("x", 2.0)).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let mut writer = IncrementalWriter::new(Vec::new(), WriteOptions::default());
        assert!(writer.write(&Array::scalar("1bad", 1.0)).is_err());
        assert!(writer.sink.is_empty());
    }

    #[test]
    fn test_finish_without_arrays_writes_header() {
        let writer = IncrementalWriter::new(Vec::new(), WriteOptions::default());
        assert_eq!(writer.finish().unwrap().len(), 128);
    }
}
