//! Path-level reading and writing of MAT-files

use super::{default_provider, BufferProvider};
use crate::array::Array;
use crate::container::{self, ArrayMap, ReadOptions, WriteOptions};
use crate::error::Result;
use crate::incremental::IncrementalWriter;
use log::debug;
use mat5_core::MatHeader;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A MAT-file on disk
pub struct MatFile {
    path: PathBuf,
    provider: Box<dyn BufferProvider>,
}

impl MatFile {
    /// Refer to `path` using the default buffer provider
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_provider(path, default_provider())
    }

    pub fn with_provider<P: AsRef<Path>>(path: P, provider: Box<dyn BufferProvider>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header of a level 5 file
    pub fn header(&self) -> Result<MatHeader> {
        let buffer = self.provider.acquire(&self.path)?;
        let header = container::parse_header(buffer.as_slice());
        self.provider.release(buffer);
        header
    }

    /// Decode every array
    pub fn read_all(&self) -> Result<ArrayMap> {
        self.read_with(&ReadOptions::default())
    }

    /// Decode the arrays the options select
    pub fn read_with(&self, options: &ReadOptions) -> Result<ArrayMap> {
        let buffer = self.provider.acquire(&self.path)?;
        let result = container::read_all(buffer.as_slice(), options);
        self.provider.release(buffer);
        result
    }

    /// Decode a single array by name
    pub fn read_one(&self, name: &str) -> Result<Option<Array>> {
        let buffer = self.provider.acquire(&self.path)?;
        let result = container::read_one(buffer.as_slice(), name);
        self.provider.release(buffer);
        result
    }

    /// Write arrays to `path`, replacing any existing file
    ///
    /// All arrays are validated before the file is created.
    pub fn write<'a, P, I>(path: P, arrays: I, options: &WriteOptions) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = &'a Array>,
    {
        let bytes = container::write_all(arrays, options)?;
        std::fs::write(path.as_ref(), &bytes)?;
        debug!("wrote {} ({} bytes)", path.as_ref().display(), bytes.len());
        Ok(())
    }

    /// Start an incremental session writing to `path`
    pub fn create<P: AsRef<Path>>(
        path: P,
        options: WriteOptions,
    ) -> Result<IncrementalWriter<BufWriter<File>>> {
        let file = File::create(path)?;
        Ok(IncrementalWriter::new(BufWriter::new(file), options))
    }
}

impl std::fmt::Debug for MatFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatFile").field("path", &self.path).finish()
    }
}

/// Read several files on the rayon thread pool
///
/// Results come back in the order of `paths`; one failing file does not
/// affect the others.
pub fn read_files_parallel<P>(paths: &[P], options: &ReadOptions) -> Vec<Result<ArrayMap>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|p| MatFile::open(p).read_with(options))
        .collect()
}
