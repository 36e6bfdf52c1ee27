use crate::tl::{Result, TlError};

/// Simple bounded cursor over an immutable byte slice.
///
/// A failed read leaves the position at the start of the read that failed.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Whether every byte has been consumed.
	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(underflow(self, n));
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a fixed-size byte block.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a single byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64_le(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian IEEE-754 `f64`.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read a 3-byte little-endian unsigned integer.
	pub fn read_u24_le(&mut self) -> Result<u32> {
		let raw: [u8; 3] = self.read_array()?;
		Ok(u32::from(raw[0]) | (u32::from(raw[1]) << 8) | (u32::from(raw[2]) << 16))
	}

	/// Return the next little-endian `u32` without consuming it.
	pub fn peek_u32_le(&self) -> Result<u32> {
		self.clone().read_u32_le()
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		let _ = self.read_exact(n)?;
		Ok(())
	}
}

fn underflow(cursor: &Cursor<'_>, need: usize) -> TlError {
	TlError::BufferUnderflow {
		at: cursor.pos,
		need,
		rem: cursor.remaining(),
	}
}

/// Growable output buffer for wire encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Writer {
	bytes: Vec<u8>,
}

impl Writer {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty writer with reserved capacity.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			bytes: Vec::with_capacity(capacity),
		}
	}

	/// Number of bytes written so far.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Borrow written bytes.
	pub fn as_slice(&self) -> &[u8] {
		&self.bytes
	}

	/// Consume the writer and return its bytes.
	pub fn into_inner(self) -> Vec<u8> {
		self.bytes
	}

	/// Drop everything written after `len`.
	pub fn truncate(&mut self, len: usize) {
		self.bytes.truncate(len);
	}

	/// Append raw bytes.
	pub fn write_raw(&mut self, raw: &[u8]) {
		self.bytes.extend_from_slice(raw);
	}

	/// Append `n` zero bytes.
	pub fn write_zeros(&mut self, n: usize) {
		self.bytes.resize(self.bytes.len() + n, 0);
	}

	/// Append one byte.
	pub fn write_u8(&mut self, value: u8) {
		self.bytes.push(value);
	}

	/// Append a little-endian `u32`.
	pub fn write_u32_le(&mut self, value: u32) {
		self.write_raw(&value.to_le_bytes());
	}

	/// Append a little-endian `i32`.
	pub fn write_i32_le(&mut self, value: i32) {
		self.write_raw(&value.to_le_bytes());
	}

	/// Append a little-endian `i64`.
	pub fn write_i64_le(&mut self, value: i64) {
		self.write_raw(&value.to_le_bytes());
	}

	/// Append a little-endian IEEE-754 `f64`.
	pub fn write_f64_le(&mut self, value: f64) {
		self.write_raw(&value.to_le_bytes());
	}

	/// Append the low three bytes of `value`, little-endian.
	pub fn write_u24_le(&mut self, value: u32) {
		self.write_raw(&value.to_le_bytes()[..3]);
	}
}

impl From<Writer> for Vec<u8> {
	fn from(writer: Writer) -> Self {
		writer.bytes
	}
}
