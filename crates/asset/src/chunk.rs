//! Bounded cursor over a chunk-structured byte buffer.
//!
//! Every chunk starts with a 6-byte header: a little-endian `u16` tag followed by a
//! `u32` length that covers the header itself. The reader keeps a stack of the chunks
//! it has entered; every read is checked against the innermost declared boundary and
//! leaving a chunk asserts that the cursor sits exactly on its end.

use crate::error::{AssetError, AssetResult};

/// Size of a chunk header in bytes (tag + length).
pub const HEADER_LEN: usize = 6;

/// Decoded chunk header plus its position in the source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: u16,
    /// Declared total length, header included.
    pub length: u32,
    /// Byte offset of the header in the source buffer.
    pub offset: usize,
}

impl ChunkHeader {
    /// Offset one past the last byte of this chunk.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length as usize
    }

    /// Number of content bytes following the header.
    #[inline]
    pub fn body_len(&self) -> usize {
        self.length as usize - HEADER_LEN
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    tag: u16,
    start: usize,
    end: usize,
}

pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    frames: Vec<Frame>,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            frames: Vec::new(),
        }
    }

    #[inline]
    fn bound(&self) -> usize {
        self.frames.last().map_or(self.data.len(), |f| f.end)
    }

    /// Bytes left before the innermost chunk boundary.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bound() - self.pos
    }

    /// Truncation at the cursor, attributed to the innermost open chunk.
    fn truncated(&self, needed: usize, available: usize) -> AssetError {
        AssetError::TruncatedInput {
            tag: self.frames.last().map(|f| f.tag),
            offset: self.pos,
            needed,
            available,
        }
    }

    fn take(&mut self, n: usize) -> AssetResult<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(self.truncated(n, available));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> AssetResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> AssetResult<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> AssetResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> AssetResult<f32> {
        self.take_array().map(f32::from_le_bytes)
    }

    /// Read `n` consecutive floats. The whole range is bounds-checked up front so a
    /// bogus count fails before anything is allocated.
    pub fn read_f32_array(&mut self, n: usize) -> AssetResult<Vec<f32>> {
        let needed = n
            .checked_mul(4)
            .ok_or_else(|| self.truncated(usize::MAX, self.remaining()))?;
        let bytes = self.take(needed)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Read a NUL-terminated string (lossy UTF-8). The terminator must lie inside the
    /// current chunk.
    pub fn read_cstring(&mut self) -> AssetResult<String> {
        let window = &self.data[self.pos..self.bound()];
        let Some(len) = window.iter().position(|&b| b == 0) else {
            return Err(self.truncated(window.len() + 1, window.len()));
        };
        let text = String::from_utf8_lossy(&window[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }

    /// Read a chunk header at the cursor.
    ///
    /// A header whose declared length cannot even hold itself, or that reaches past its
    /// parent's boundary, is a `MalformedChunk`. A top-level chunk that reaches past the
    /// end of the input is `TruncatedInput`.
    pub fn read_header(&mut self) -> AssetResult<ChunkHeader> {
        let offset = self.pos;
        let available = self.remaining();
        if available < HEADER_LEN {
            return Err(self.truncated(HEADER_LEN, available));
        }
        let tag = self.read_u16()?;
        let length = self.read_u32()?;
        let header = ChunkHeader {
            tag,
            length,
            offset,
        };

        if (length as usize) < HEADER_LEN {
            return Err(AssetError::MalformedChunk {
                tag,
                offset,
                declared: length as usize,
                consumed: HEADER_LEN,
            });
        }

        let bound = self.bound();
        let end = offset.checked_add(length as usize).unwrap_or(usize::MAX);
        if end > bound {
            return Err(match self.frames.last() {
                None => AssetError::TruncatedInput {
                    tag: Some(tag),
                    offset,
                    needed: length as usize,
                    available: bound - offset,
                },
                Some(_) => AssetError::MalformedChunk {
                    tag,
                    offset,
                    declared: length as usize,
                    consumed: bound - offset,
                },
            });
        }
        Ok(header)
    }

    /// Header of the next child of the current chunk, or `None` once the cursor sits on
    /// the boundary. Leftover bytes too short to form a header mean the parent's declared
    /// length disagrees with its children.
    pub fn next_child(&mut self) -> AssetResult<Option<ChunkHeader>> {
        match self.remaining() {
            0 => Ok(None),
            n if n < HEADER_LEN => Err(match self.frames.last() {
                Some(frame) => AssetError::MalformedChunk {
                    tag: frame.tag,
                    offset: frame.start,
                    declared: frame.end - frame.start,
                    consumed: self.pos - frame.start,
                },
                None => self.truncated(HEADER_LEN, n),
            }),
            _ => self.read_header().map(Some),
        }
    }

    /// Enter the chunk whose header was just read. Subsequent reads are bounded by its end.
    /// The returned frame is handed back to `exit_child`.
    fn enter_child(&mut self, header: &ChunkHeader) -> Frame {
        debug_assert_eq!(self.pos, header.offset + HEADER_LEN);
        let frame = Frame {
            tag: header.tag,
            start: header.offset,
            end: header.end(),
        };
        self.frames.push(frame);
        frame
    }

    /// Leave `frame`, which must be the innermost chunk. The cursor must sit exactly on
    /// its declared end.
    fn exit_child(&mut self, frame: Frame) -> AssetResult<()> {
        self.frames.pop();
        if self.pos != frame.end {
            return Err(AssetError::MalformedChunk {
                tag: frame.tag,
                offset: frame.start,
                declared: frame.end - frame.start,
                consumed: self.pos - frame.start,
            });
        }
        Ok(())
    }

    /// Run `f` inside `header`'s chunk, checking the boundary on the way out.
    /// This is the only way into a chunk, so every enter is paired with its exit.
    pub fn descend<T>(
        &mut self,
        header: &ChunkHeader,
        f: impl FnOnce(&mut Self) -> AssetResult<T>,
    ) -> AssetResult<T> {
        let frame = self.enter_child(header);
        let out = f(self)?;
        self.exit_child(frame)?;
        Ok(out)
    }

    /// Skip a chunk whose header was just read, trusting its declared length.
    pub fn skip_chunk(&mut self, header: &ChunkHeader) {
        debug_assert!(header.end() <= self.bound());
        self.pos = header.end();
    }

    /// Jump to the end of the innermost chunk, discarding whatever is left in it.
    pub fn skip_rest(&mut self) {
        self.pos = self.bound();
    }
}
