mod bytes;
mod codec;
mod decl;
mod error;
mod gzip;
mod handle;
mod id;
mod json;
mod parse;
mod prim;
mod registry;
mod schema;
mod value;

/// Bounded read cursor and growable write buffer.
pub use bytes::{Cursor, Writer};
/// Encode/decode entry points and decoding limits.
pub use codec::{DecodeOptions, decode, decode_as, decode_bare, decode_from, encode, encode_as, encode_bare, encoded_len};
/// Error, classification, and result aliases.
pub use error::{ErrorClass, Result, TlError};
/// `gzip_packed` helpers.
pub use gzip::{DEFAULT_MAX_UNPACKED_BYTES, pack, pack_object, unpack};
/// Atomically replaceable shared registry.
pub use handle::RegistryHandle;
/// Canonical signatures and id inference.
pub use id::{canonical_signature, infer_id, signature_id};
/// JSON schema loader.
pub use json::parse_json;
/// TL text parser and file loader.
pub use parse::{ParseOptions, load_schema, parse_schema, parse_schema_with};
/// Wire primitive readers and writers.
pub use prim::{
	BOOL_FALSE_ID, BOOL_TRUE_ID, GZIP_PACKED_ID, MAX_BYTES_LEN, VECTOR_ID, bytes_encoded_len, read_bool, read_bytes, read_vector_header, write_bool,
	write_bytes, write_vector_header,
};
/// Id and name lookup over a validated schema.
pub use registry::{Registry, TypeDef};
/// Normalized schema model.
pub use schema::{AbstractType, DefKind, Definition, FieldType, OBJECT_TYPE, ParameterDef, Primitive, Schema};
/// Decoded runtime value types.
pub use value::{FieldValue, ObjectValue, Value};
