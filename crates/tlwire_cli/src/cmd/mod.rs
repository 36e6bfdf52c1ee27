/// Payload decode command.
pub mod decode;
/// Canonical signature and id audit command.
pub mod id;
/// Schema summary command.
pub mod info;
/// Value tree and JSON rendering.
pub mod print;
/// Definition listing command.
pub mod schema;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod util;

/// Failures surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
	/// Library failure while loading, parsing, or decoding.
	#[error(transparent)]
	Tl(#[from] tlwire::tl::TlError),
	/// `--hex` payload is not valid hexadecimal.
	#[error("invalid hex payload: {0}")]
	Hex(#[from] hex::FromHexError),
	/// Payload file could not be read.
	#[error("read {path}: {source}")]
	Read {
		/// Path given on the command line.
		path: String,
		/// Underlying IO failure.
		source: std::io::Error,
	},
	/// Named definition or type is absent from the schema.
	#[error("{0} not found in schema")]
	NotFound(String),
}
