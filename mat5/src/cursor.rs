//! Positioned, byte-order-aware reader over a container buffer
//!
//! Every nested element is decoded through its own cursor over exactly the
//! bytes its tag declared, so a composite decode cannot move a sibling's
//! position.

use crate::error::{Error, Result};
use mat5_core::{ByteOrder, DataType, Tag};

/// Reader over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// New cursor at position zero
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Byte order applied to multi-byte reads
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Look at the next `n` bytes without consuming them
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::format(format!(
                "unexpected end of data at offset {}: wanted {} bytes, {} left",
                self.pos,
                n,
                self.remaining()
            )));
        }
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Consume the next `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(self.order.read_u32(bytes))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(self.order.read_i32(bytes))
    }

    /// Read the next tag header
    ///
    /// For a compact tag the four payload bytes are left unread.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let (tag, consumed) = Tag::parse(&self.data[self.pos..], self.order)?;
        self.pos += consumed;
        Ok(tag)
    }

    /// Read a whole data element: tag, payload and padding
    ///
    /// Returns the tag and exactly the payload bytes it declared.
    /// Compressed elements carry no padding. Padding missing at the very
    /// end of the buffer is tolerated.
    pub fn read_element(&mut self) -> Result<(Tag, &'a [u8])> {
        let start = self.pos;
        let tag = self.read_tag()?;
        if tag.compact {
            let packed = self.read_bytes(4)?;
            return Ok((tag, &packed[..tag.size as usize]));
        }

        let payload = self.read_bytes(tag.size as usize).map_err(|_| {
            Error::format(format!(
                "element at offset {} declares {} bytes but only {} remain",
                start,
                tag.size,
                self.remaining()
            ))
        })?;

        let padding = if tag.type_code == DataType::Compressed.to_u32() {
            0
        } else {
            tag.padding()
        };
        let skip = padding.min(self.remaining());
        self.pos += skip;
        Ok((tag, payload))
    }
}
