//! Primitive encoding/decoding for the amino binary format.
//!
//! Implements unsigned varints, signed (zig-zag) varints, fixed-width
//! little-endian integers and the growable output buffer used by the encoder.

use crate::limits::MAX_VARINT_BYTES;

// =============================================================================
// VARINTS
// =============================================================================

/// A varint encoded into a stack buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarintBuf {
    buf: [u8; MAX_VARINT_BYTES],
    len: u8,
}

impl VarintBuf {
    /// Returns the encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// Returns the number of encoded bytes (1 to 10).
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false: a varint occupies at least one byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for VarintBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for VarintBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VarintBuf({:02x?})", self.as_bytes())
    }
}

/// Encodes `x` into `buf` and returns the number of bytes written.
#[inline]
pub fn put_uvarint(buf: &mut [u8; MAX_VARINT_BYTES], mut x: u64) -> usize {
    let mut i = 0;
    while x >= 0x80 {
        buf[i] = (x as u8) | 0x80;
        x >>= 7;
        i += 1;
    }
    buf[i] = x as u8;
    i + 1
}

/// Encodes an unsigned integer as a little-endian base-128 varint.
#[inline]
pub fn encode_uvarint(x: u64) -> VarintBuf {
    let mut buf = [0u8; MAX_VARINT_BYTES];
    let len = put_uvarint(&mut buf, x);
    VarintBuf {
        buf,
        len: len as u8,
    }
}

/// Encodes a signed integer as a zig-zag varint.
#[inline]
pub fn encode_varint(x: i64) -> VarintBuf {
    encode_uvarint(zigzag_encode(x))
}

/// Returns the number of bytes `x` occupies as a varint.
#[inline]
pub fn uvarint_len(x: u64) -> usize {
    let bits = 64 - (x | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decodes an unsigned varint from the start of `buf`.
///
/// Returns the value and the number of bytes read (> 0). On failure the
/// value is 0 and the count says why:
///
/// - `0`: the buffer ended before a terminating byte (too small)
/// - `< 0`: the value does not fit in 64 bits (overflow), and `-count` is
///   the number of bytes read
pub fn decode_uvarint(buf: &[u8]) -> (u64, isize) {
    let mut x: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_BYTES {
            return (0, -(i as isize + 1));
        }
        if byte < 0x80 {
            if i == MAX_VARINT_BYTES - 1 && byte > 1 {
                return (0, -(i as isize + 1));
            }
            return (x | (byte as u64) << shift, i as isize + 1);
        }
        x |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
    }
    (0, 0)
}

/// Decodes a zig-zag varint from the start of `buf`.
///
/// The count follows the same convention as [`decode_uvarint`].
pub fn decode_varint(buf: &[u8]) -> (i64, isize) {
    let (ux, n) = decode_uvarint(buf);
    if n <= 0 {
        return (0, n);
    }
    (zigzag_decode(ux), n)
}

// =============================================================================
// ZIGZAG ENCODING
// =============================================================================

/// Encodes a signed integer using zigzag encoding.
///
/// Shifts the bit pattern left by one and complements it for negative
/// numbers, so small magnitudes stay small:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a zigzag-encoded unsigned integer back to signed.
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
///
/// A single growable buffer; every write appends. Call [`Writer::reserve`]
/// before writing payloads whose length is known up front.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Wraps an existing buffer, appending after its current contents.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// Reserves room for at least `additional` more bytes.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned varint.
    #[inline]
    pub fn write_uvarint(&mut self, value: u64) {
        // Single-byte values dominate (tags, short lengths).
        if value < 0x80 {
            self.buf.push(value as u8);
            return;
        }
        self.buf.extend_from_slice(encode_uvarint(value).as_bytes());
    }

    /// Writes a signed varint (zigzag encoded).
    #[inline]
    pub fn write_varint(&mut self, value: i64) {
        self.write_uvarint(zigzag_encode(value));
    }

    /// Writes a little-endian u32.
    #[inline]
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian u64.
    #[inline]
    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length-prefixed byte string.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.reserve(MAX_VARINT_BYTES + bytes.len());
        self.write_uvarint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }
}
