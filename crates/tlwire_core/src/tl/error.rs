use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, TlError>;

/// Errors produced while loading schemas and transcoding TL values.
#[derive(Debug, Error)]
pub enum TlError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON schema document could not be deserialized.
	#[error("json schema: {0}")]
	Json(#[from] serde_json::Error),
	/// Malformed schema declaration.
	#[error("parse error at line {line} in `{decl}`: {reason}")]
	Parse {
		/// 1-based line where the declaration starts (0 for JSON sources).
		line: usize,
		/// Declaration name, or its leading text when no name could be read.
		decl: String,
		/// Human-readable failure reason.
		reason: String,
	},
	/// Two definitions share one numeric id.
	#[error("duplicate id 0x{id:08x}: first={first}, second={second}")]
	DuplicateId {
		/// Colliding id.
		id: u32,
		/// Name of the definition registered first.
		first: String,
		/// Name of the conflicting definition.
		second: String,
	},
	/// Two definitions share one qualified name.
	#[error("duplicate definition name {name}")]
	DuplicateName {
		/// Colliding qualified name.
		name: String,
	},
	/// A parameter or result type names nothing in the schema.
	#[error("unresolved type {name} referenced by {decl}")]
	UnresolvedType {
		/// Definition holding the reference.
		decl: String,
		/// Type name that failed to resolve.
		name: String,
	},
	/// A flag field names a flags word that is not an earlier `#` field.
	#[error("flag field {field} in {decl} references unknown flags word {flags}")]
	UnknownFlagsField {
		/// Definition holding the flag field.
		decl: String,
		/// Flag-gated parameter name.
		field: String,
		/// Referenced flags word name.
		flags: String,
	},
	/// A bare reference to an abstract type needs exactly one constructor.
	#[error("bare reference %{name} in {decl} needs exactly one constructor, found {count}")]
	AmbiguousBareType {
		/// Definition holding the reference.
		decl: String,
		/// Abstract type name.
		name: String,
		/// Number of constructors found for the type.
		count: usize,
	},
	/// Wire id is not present in the registry.
	#[error("unknown constructor 0x{id:08x} at offset {at}")]
	UnknownConstructor {
		/// Id read from the wire.
		id: u32,
		/// Offset where the id starts.
		at: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("buffer underflow at offset {at}, need {need} bytes, remaining {rem}")]
	BufferUnderflow {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Boxed constructor does not belong to the statically expected type.
	#[error("unexpected constructor {got} (0x{id:08x}) at offset {at}, expected {expected}")]
	UnexpectedConstructor {
		/// Expected abstract type or constructor name.
		expected: String,
		/// Name of the constructor found on the wire.
		got: String,
		/// Id found on the wire.
		id: u32,
		/// Offset where the id starts.
		at: usize,
	},
	/// Vector framing marker was not the boxed vector id.
	#[error("bad vector marker 0x{got:08x} at offset {at}")]
	BadVectorMarker {
		/// Marker read from the wire.
		got: u32,
		/// Offset where the marker starts.
		at: usize,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Vector length exceeded configured limit or was negative.
	#[error("vector length {count} at offset {at} exceeds max {max}")]
	VectorTooLarge {
		/// Declared element count.
		count: i64,
		/// Maximum permitted element count.
		max: usize,
		/// Offset where the count starts.
		at: usize,
	},
	/// Inflated `gzip_packed` payload exceeded configured safety limit.
	#[error("unpacked output exceeded limit {limit} bytes")]
	UnpackedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// `gzip_packed` payload could not be inflated.
	#[error("corrupt packed payload at offset {at}: {reason}")]
	CorruptPacked {
		/// Offset where the packed byte string starts.
		at: usize,
		/// Inflater failure text.
		reason: String,
	},
	/// Runtime value does not fit the definition it is being encoded as.
	#[error("encode mismatch in {decl}: {reason}")]
	EncodeMismatch {
		/// Definition (or field path) being encoded.
		decl: String,
		/// What did not match.
		reason: String,
	},
	/// Requested definition name was not found.
	#[error("definition not found: {name}")]
	DefinitionNotFound {
		/// Requested qualified name.
		name: String,
	},
}

/// Coarse error classes used by callers to decide between skipping and aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
	/// Load-time schema failure; fatal to registry construction.
	Schema,
	/// Unrecognized wire variant; the caller may skip the value.
	UnknownConstructor,
	/// Truncated or corrupted input.
	BufferUnderflow,
	/// Runtime value shape does not match its definition.
	EncodeMismatch,
	/// Configured safety limit or static type check rejected the input.
	Limit,
	/// Underlying IO failure.
	Io,
}

impl TlError {
	/// Classify this error into the coarse taxonomy.
	pub fn class(&self) -> ErrorClass {
		match self {
			Self::Io(_) => ErrorClass::Io,
			Self::Json(_)
			| Self::Parse { .. }
			| Self::DuplicateId { .. }
			| Self::DuplicateName { .. }
			| Self::UnresolvedType { .. }
			| Self::UnknownFlagsField { .. }
			| Self::AmbiguousBareType { .. } => ErrorClass::Schema,
			Self::UnknownConstructor { .. } | Self::BadVectorMarker { .. } => ErrorClass::UnknownConstructor,
			Self::BufferUnderflow { .. } | Self::CorruptPacked { .. } => ErrorClass::BufferUnderflow,
			Self::EncodeMismatch { .. } | Self::DefinitionNotFound { .. } => ErrorClass::EncodeMismatch,
			Self::UnexpectedConstructor { .. }
			| Self::DecodeDepthExceeded { .. }
			| Self::VectorTooLarge { .. }
			| Self::UnpackedTooLarge { .. } => ErrorClass::Limit,
		}
	}

	/// Whether the failure is local to one encode/decode call.
	pub fn is_recoverable(&self) -> bool {
		!matches!(self.class(), ErrorClass::Schema | ErrorClass::Io)
	}

	pub(crate) fn parse(line: usize, decl: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Parse {
			line,
			decl: decl.into(),
			reason: reason.into(),
		}
	}

	pub(crate) fn mismatch(decl: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::EncodeMismatch {
			decl: decl.into(),
			reason: reason.into(),
		}
	}
}
