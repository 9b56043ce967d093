//! Whole-container reading and writing
//!
//! A level 5 container is the 128-byte header followed by top-level
//! elements, each either a plain `miMATRIX` or an `miCOMPRESSED` block
//! wrapping exactly one `miMATRIX`. Level 4 containers have no header and
//! are handed to [`crate::legacy`].

use crate::array::Array;
use crate::compression::{deflate, inflate, DEFAULT_LEVEL};
use crate::cursor::ByteCursor;
use crate::decoder::ElementDecoder;
use crate::encoder::ElementEncoder;
use crate::error::{Error, Result};
use crate::filter::{ArrayFilter, NameFilter};
use crate::legacy;
use hashbrown::HashMap;
use log::{debug, trace, warn};
use mat5_core::{is_legacy, ByteOrder, DataType, MatHeader, Tag};

/// Default cap on the inflated size of one compressed element
pub const DEFAULT_INFLATE_LIMIT: usize = 1 << 34;

/// Options for reading containers
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Top-level arrays to decode
    pub filter: ArrayFilter,
    /// Reject top-level elements of unknown type instead of skipping them
    pub strict_types: bool,
    /// Largest accepted inflated size of one compressed element
    pub inflate_limit: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            filter: ArrayFilter::all(),
            strict_types: true,
            inflate_limit: DEFAULT_INFLATE_LIMIT,
        }
    }
}

impl ReadOptions {
    pub fn with_filter(mut self, filter: ArrayFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    pub fn with_inflate_limit(mut self, limit: usize) -> Self {
        self.inflate_limit = limit;
        self
    }
}

/// Options for writing containers
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Wrap each top-level array in its own compressed block
    pub compress: bool,
    /// Header text; must start with the level 5 signature to be readable
    pub description: String,
    /// Byte order of everything after the header
    pub byte_order: ByteOrder,
    /// Pack payloads of up to four bytes next to their tags
    pub compact_tags: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: true,
            description: default_description(),
            byte_order: ByteOrder::Little,
            compact_tags: false,
        }
    }
}

impl WriteOptions {
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Header text; the level 5 signature is put in front when missing
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_compact_tags(mut self, compact: bool) -> Self {
        self.compact_tags = compact;
        self
    }

    pub(crate) fn encoder(&self) -> ElementEncoder {
        ElementEncoder::new(self.byte_order).with_compact_tags(self.compact_tags)
    }

    pub(crate) fn header(&self) -> MatHeader {
        MatHeader::new(&self.description, self.byte_order)
    }
}

fn default_description() -> String {
    format!(
        "MATLAB 5.0 MAT-file, Platform: {}, Created by: mat5",
        std::env::consts::OS
    )
}

/// Decoded arrays by name, in file order
///
/// A later array with the same name replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayMap {
    arrays: Vec<Array>,
    index: HashMap<String, usize>,
}

impl ArrayMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, array: Array) {
        match self.index.get(array.name()) {
            Some(&i) => self.arrays[i] = array,
            None => {
                self.index.insert(array.name().to_string(), self.arrays.len());
                self.arrays.push(array);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Array> {
        self.index.get(name).map(|&i| &self.arrays[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Array> {
        let i = *self.index.get(name)?;
        Some(&mut self.arrays[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(Array::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Array> {
        self.arrays.iter()
    }

    /// Remove an array, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<Array> {
        let i = self.index.remove(name)?;
        let array = self.arrays.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(array)
    }

    pub fn into_vec(self) -> Vec<Array> {
        self.arrays
    }
}

impl IntoIterator for ArrayMap {
    type Item = Array;
    type IntoIter = std::vec::IntoIter<Array>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArrayMap {
    type Item = &'a Array;
    type IntoIter = std::slice::Iter<'a, Array>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.iter()
    }
}

impl FromIterator<Array> for ArrayMap {
    fn from_iter<I: IntoIterator<Item = Array>>(iter: I) -> Self {
        let mut map = ArrayMap::new();
        for array in iter {
            map.insert(array);
        }
        map
    }
}

/// Parse and validate the container header
pub fn parse_header(buffer: &[u8]) -> Result<MatHeader> {
    let header = MatHeader::from_bytes(buffer)?;
    debug!(
        "MAT-file header: version 0x{:04x}, {} byte order, \"{}\"",
        header.version,
        header.byte_order,
        header.description_str()
    );
    Ok(header)
}

/// Encode the 128-byte container header
pub fn write_header(options: &WriteOptions) -> [u8; MatHeader::SIZE] {
    options.header().to_bytes_array()
}

/// Decode every array accepted by the options' filter
pub fn read_all(buffer: &[u8], options: &ReadOptions) -> Result<ArrayMap> {
    let mut arrays = ArrayMap::new();
    visit_arrays(buffer, options, &options.filter, |array| {
        arrays.insert(array);
        true
    })?;
    debug!("decoded {} arrays", arrays.len());
    Ok(arrays)
}

/// Decode the first array called `name`
///
/// Decoding stops as soon as the array is found.
pub fn read_one(buffer: &[u8], name: &str) -> Result<Option<Array>> {
    let options = ReadOptions::default();
    let filter = |n: &str| n == name;
    let mut found = None;
    visit_arrays(buffer, &options, &filter, |array| {
        found = Some(array);
        false
    })?;
    Ok(found)
}

/// Walk the top-level elements, handing accepted arrays to `visit`
///
/// `visit` returns `false` to stop early.
fn visit_arrays<F>(
    buffer: &[u8],
    options: &ReadOptions,
    filter: &dyn NameFilter,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(Array) -> bool,
{
    if is_legacy(buffer) {
        debug!("no level 5 header, reading level 4 container");
        for array in legacy::read_all(buffer)? {
            if filter.matches(array.name()) && !visit(array) {
                break;
            }
        }
        return Ok(());
    }

    let header = parse_header(buffer)?;
    let order = header.byte_order;
    let decoder = ElementDecoder::new(filter);
    let mut cursor = ByteCursor::new(&buffer[MatHeader::SIZE..], order);

    while !cursor.is_at_end() {
        let offset = MatHeader::SIZE + cursor.position();
        let (tag, payload) = cursor.read_element()?;
        let decoded = match DataType::from_u32(tag.type_code) {
            Some(DataType::Matrix) => decoder.decode(payload, order, true)?,
            Some(DataType::Compressed) => {
                let inflated = inflate(payload, options.inflate_limit)?;
                decode_compressed(&decoder, &inflated, order)?
            }
            _ if options.strict_types => {
                return Err(Error::format(format!(
                    "unexpected top-level element of type {} at offset {offset}",
                    tag.type_code
                )))
            }
            _ => {
                warn!(
                    "skipping top-level element of type {} at offset {offset}",
                    tag.type_code
                );
                None
            }
        };
        if let Some(array) = decoded {
            trace!("read '{}' at offset {offset}", array.name());
            if !visit(array) {
                break;
            }
        }
    }
    Ok(())
}

/// Decode the single matrix element inside an inflated block
fn decode_compressed(
    decoder: &ElementDecoder<'_>,
    inflated: &[u8],
    order: ByteOrder,
) -> Result<Option<Array>> {
    let mut inner = ByteCursor::new(inflated, order);
    let (tag, payload) = inner.read_element()?;
    if tag.type_code != DataType::Matrix.to_u32() {
        return Err(Error::format(format!(
            "compressed block holds an element of type {}, expected miMATRIX",
            tag.type_code
        )));
    }
    if !inner.is_at_end() {
        return Err(Error::format(format!(
            "compressed block has {} bytes after its matrix element",
            inner.remaining()
        )));
    }
    decoder.decode(payload, order, true)
}

/// Serialize one top-level array, compressed if requested
///
/// Suitable for appending to a stream that already has a header.
pub fn write_one(array: &Array, options: &WriteOptions) -> Result<Vec<u8>> {
    let element = options.encoder().encode(array)?;
    if !options.compress {
        return Ok(element);
    }
    let packed = deflate(&element, DEFAULT_LEVEL);
    let size = u32::try_from(packed.len()).map_err(|_| {
        Error::capacity(format!("compressed array '{}' exceeds 4 GiB", array.name()))
    })?;
    trace!(
        "compressed '{}' from {} to {} bytes",
        array.name(),
        element.len(),
        packed.len()
    );
    let mut out = Vec::with_capacity(packed.len() + 8);
    out.extend_from_slice(&Tag::new(DataType::Compressed, size).encode(options.byte_order));
    out.extend_from_slice(&packed);
    Ok(out)
}

/// Serialize a complete container
///
/// Every array is encoded before any output is produced, so an invalid
/// array leaves nothing half written.
pub fn write_all<'a, I>(arrays: I, options: &WriteOptions) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Array>,
{
    let elements = arrays
        .into_iter()
        .map(|a| write_one(a, options))
        .collect::<Result<Vec<_>>>()?;
    let mut out = Vec::with_capacity(MatHeader::SIZE + elements.iter().map(Vec::len).sum::<usize>());
    out.extend_from_slice(&write_header(options));
    for element in elements {
        out.extend_from_slice(&element);
    }
    debug!("wrote container of {} bytes", out.len());
    Ok(out)
}
