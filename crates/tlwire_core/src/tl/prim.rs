//! TL wire primitives layered over [`Cursor`] and [`Writer`].

use crate::tl::bytes::{Cursor, Writer};
use crate::tl::{Result, TlError};

/// Boxed `boolTrue` constructor id.
pub const BOOL_TRUE_ID: u32 = 0x997275b5;
/// Boxed `boolFalse` constructor id.
pub const BOOL_FALSE_ID: u32 = 0xbc799737;
/// Boxed vector constructor id.
pub const VECTOR_ID: u32 = 0x1cb5c415;
/// `gzip_packed` constructor id.
pub const GZIP_PACKED_ID: u32 = 0x3072cfa1;

/// Smallest first length byte that switches to the 3-byte length form.
const LONG_LEN_MARKER: u8 = 0xfe;
/// Largest byte string representable by the 3-byte length form.
pub const MAX_BYTES_LEN: usize = 0x00ff_ffff;

/// Write a boolean as its boxed constant.
pub fn write_bool(writer: &mut Writer, value: bool) {
	writer.write_u32_le(if value { BOOL_TRUE_ID } else { BOOL_FALSE_ID });
}

/// Read a boxed boolean constant.
pub fn read_bool(cursor: &mut Cursor<'_>) -> Result<bool> {
	let at = cursor.pos();
	match cursor.read_u32_le()? {
		BOOL_TRUE_ID => Ok(true),
		BOOL_FALSE_ID => Ok(false),
		id => Err(TlError::UnknownConstructor { id, at }),
	}
}

/// Write a length-prefixed, zero-padded byte string.
pub fn write_bytes(writer: &mut Writer, data: &[u8]) -> Result<()> {
	let len = data.len();
	if len > MAX_BYTES_LEN {
		return Err(TlError::mismatch("bytes", format!("length {len} exceeds {MAX_BYTES_LEN}")));
	}

	let header = if len < usize::from(LONG_LEN_MARKER) {
		writer.write_u8(len as u8);
		1
	} else {
		writer.write_u8(LONG_LEN_MARKER);
		writer.write_u24_le(len as u32);
		4
	};
	writer.write_raw(data);
	writer.write_zeros(padding(header + len));
	Ok(())
}

/// Read a length-prefixed, zero-padded byte string.
///
/// Any first byte of `0xfe` or above introduces a 3-byte length. The cursor does not move when
/// the declared length overruns the buffer.
pub fn read_bytes<'a>(cursor: &mut Cursor<'a>) -> Result<&'a [u8]> {
	let mut ahead = cursor.clone();
	let first = ahead.read_u8()?;
	let (header, len) = if first >= LONG_LEN_MARKER {
		(4, ahead.read_u24_le()? as usize)
	} else {
		(1, usize::from(first))
	};

	let total = header + len + padding(header + len);
	if total > cursor.remaining() {
		return Err(TlError::BufferUnderflow {
			at: cursor.pos(),
			need: total,
			rem: cursor.remaining(),
		});
	}

	let raw = cursor.read_exact(total)?;
	Ok(&raw[header..header + len])
}

/// Exact encoded size of a byte string with `len` payload bytes.
pub fn bytes_encoded_len(len: usize) -> usize {
	let header = if len < usize::from(LONG_LEN_MARKER) { 1 } else { 4 };
	header + len + padding(header + len)
}

/// Write vector framing: optional boxed marker, then element count.
pub fn write_vector_header(writer: &mut Writer, bare: bool, count: usize) -> Result<()> {
	let count = i32::try_from(count).map_err(|_| TlError::mismatch("vector", format!("element count {count} exceeds i32")))?;
	if !bare {
		writer.write_u32_le(VECTOR_ID);
	}
	writer.write_i32_le(count);
	Ok(())
}

/// Read vector framing and return the element count.
///
/// Counts whose elements cannot fit in the remaining bytes, given each element takes at least
/// `min_elem_len` bytes, fail with `BufferUnderflow` before any element is read. Counts that fit
/// but exceed `max` fail with `VectorTooLarge`.
pub fn read_vector_header(cursor: &mut Cursor<'_>, bare: bool, max: usize, min_elem_len: usize) -> Result<usize> {
	if !bare {
		let at = cursor.pos();
		let marker = cursor.read_u32_le()?;
		if marker != VECTOR_ID {
			return Err(TlError::BadVectorMarker { got: marker, at });
		}
	}

	let at = cursor.pos();
	let raw = cursor.read_i32_le()?;
	let count = usize::try_from(raw).map_err(|_| TlError::VectorTooLarge {
		count: i64::from(raw),
		max,
		at,
	})?;
	let need = count.saturating_mul(min_elem_len);
	if need > cursor.remaining() {
		return Err(TlError::BufferUnderflow {
			at: cursor.pos(),
			need,
			rem: cursor.remaining(),
		});
	}
	if count > max {
		return Err(TlError::VectorTooLarge {
			count: i64::from(raw),
			max,
			at,
		});
	}
	Ok(count)
}

fn padding(len: usize) -> usize {
	(4 - len % 4) % 4
}
