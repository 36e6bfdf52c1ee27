use std::path::PathBuf;

use tlwire::tl::{Cursor, DecodeOptions, FieldType, Value, decode_as, decode_bare, decode_from};

use crate::cmd::CliError;
use crate::cmd::print::{PrintOptions, print_value, value_to_json};
use crate::cmd::util::{emit_json, load_registry, parse_hex};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	/// Payload as hex text; whitespace and a `0x` prefix are ignored.
	#[arg(long, required_unless_present = "file", conflicts_with = "file")]
	pub hex: Option<String>,
	/// Read the raw payload from a file instead.
	#[arg(long)]
	pub file: Option<PathBuf>,
	/// Decode as a static type such as `Vector<User>` instead of a self-describing boxed object.
	#[arg(long = "type", conflicts_with = "bare")]
	pub type_name: Option<String>,
	/// Decode as a bare constructor (no id prefix).
	#[arg(long)]
	pub bare: Option<String>,
	/// Skip result-type checks and leave `gzip_packed` wrappers unexpanded.
	#[arg(long)]
	pub inspect: bool,
	#[arg(long)]
	pub max_depth: Option<u32>,
	#[arg(long)]
	pub json: bool,
}

/// Decode one payload and print the value tree.
pub fn run(args: Args) -> Result<(), CliError> {
	let Args {
		schema,
		hex,
		file,
		type_name,
		bare,
		inspect,
		max_depth,
		json,
	} = args;

	let payload = match (hex, file) {
		(Some(text), _) => parse_hex(&text)?,
		(None, Some(path)) => std::fs::read(&path).map_err(|source| CliError::Read {
			path: path.display().to_string(),
			source,
		})?,
		(None, None) => Vec::new(),
	};

	let registry = load_registry(&schema)?;
	let mut options = if inspect { DecodeOptions::for_inspect() } else { DecodeOptions::default() };
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}

	let mut trailing = None;
	let value = if let Some(type_name) = type_name {
		let ty: FieldType = type_name.parse()?;
		decode_as(&registry, &payload, &ty, &options)?
	} else if let Some(name) = bare {
		Value::Object(decode_bare(&registry, &payload, &name, &options)?)
	} else {
		let mut cursor = Cursor::new(&payload);
		let object = decode_from(&registry, &mut cursor, &options)?;
		trailing = Some(cursor.remaining());
		Value::Object(object)
	};

	if json {
		emit_json(&DecodeJson {
			bytes: payload.len(),
			trailing,
			value: value_to_json(&value),
		});
		return Ok(());
	}

	println!("bytes: {}", payload.len());
	if let Some(trailing) = trailing {
		println!("trailing: {trailing}");
	}
	print_value(&value, 0, 0, PrintOptions::default());

	Ok(())
}

#[derive(serde::Serialize)]
struct DecodeJson {
	bytes: usize,
	trailing: Option<usize>,
	value: serde_json::Value,
}

#[cfg(test)]
mod tests;
