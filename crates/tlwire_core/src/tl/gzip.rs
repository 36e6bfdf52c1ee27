use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::tl::bytes::Writer;
use crate::tl::prim::{GZIP_PACKED_ID, write_bytes};
use crate::tl::{Result, TlError};

/// Default ceiling for inflated `gzip_packed` payloads.
pub const DEFAULT_MAX_UNPACKED_BYTES: usize = 64 * 1024 * 1024;
/// gzip member magic.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gzip-compress `data`.
pub fn pack(data: &[u8]) -> Result<Vec<u8>> {
	let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
	encoder.write_all(data)?;
	Ok(encoder.finish()?)
}

/// Wrap an already encoded boxed value as a `gzip_packed` object.
pub fn pack_object(encoded: &[u8]) -> Result<Vec<u8>> {
	let packed = pack(encoded)?;
	let mut writer = Writer::with_capacity(packed.len() + 8);
	writer.write_u32_le(GZIP_PACKED_ID);
	write_bytes(&mut writer, &packed)?;
	Ok(writer.into_inner())
}

/// Inflate a gzip stream, failing once output exceeds `limit` bytes.
pub fn unpack(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	unpack_at(raw, limit, 0)
}

pub(crate) fn unpack_at(raw: &[u8], limit: usize, at: usize) -> Result<Vec<u8>> {
	if !raw.starts_with(&GZIP_MAGIC) {
		return Err(TlError::CorruptPacked {
			at,
			reason: "missing gzip magic".to_owned(),
		});
	}

	let mut decoder = GzDecoder::new(raw);
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf).map_err(|err| TlError::CorruptPacked {
			at,
			reason: err.to_string(),
		})?;
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(TlError::UnpackedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}
