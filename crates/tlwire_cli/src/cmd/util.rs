use std::path::Path;

use tlwire::tl::{Registry, load_schema};

use crate::cmd::CliError;

/// Load a TL or JSON schema file and build its registry.
pub(crate) fn load_registry(path: &Path) -> Result<Registry, CliError> {
	Ok(Registry::build(load_schema(path)?)?)
}

/// Render a constructor id the way schemas spell it.
pub(crate) fn id_hex(id: u32) -> String {
	format!("0x{id:08x}")
}

/// Decode a hex payload, ignoring whitespace and an optional `0x` prefix.
pub(crate) fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
	let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
	let compact = compact.strip_prefix("0x").unwrap_or(&compact);
	Ok(hex::decode(compact)?)
}

/// Print pretty JSON to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("failed to serialize json output: {err}"),
	}
}
