use std::path::Path;

use tracing::{debug, warn};

use crate::tl::decl::parse_declaration;
use crate::tl::id::signature_id;
use crate::tl::json::parse_json;
use crate::tl::schema::{DefKind, Definition, Schema};
use crate::tl::{Result, TlError};

/// Options controlling TL text parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
	/// Kind assigned to declarations before any section marker.
	pub default_kind: DefKind,
	/// Log a warning when an explicit id differs from the inferred one.
	pub verify_ids: bool,
}

impl Default for ParseOptions {
	fn default() -> Self {
		Self {
			default_kind: DefKind::Constructor,
			verify_ids: false,
		}
	}
}

impl ParseOptions {
	/// Options that also cross-check explicit ids against canonical signatures.
	pub fn verifying() -> Self {
		Self {
			verify_ids: true,
			..Self::default()
		}
	}
}

/// Parse TL schema text with default options.
pub fn parse_schema(source: &str) -> Result<Schema> {
	parse_schema_with(source, &ParseOptions::default())
}

/// Parse TL schema text into a validated [`Schema`].
///
/// Declarations are collected first and references are resolved afterwards, so a parameter may
/// name a type declared further down.
pub fn parse_schema_with(source: &str, options: &ParseOptions) -> Result<Schema> {
	let mut kind = options.default_kind;
	let mut layer = None;
	let mut constructors = Vec::new();
	let mut methods = Vec::new();

	let mut pending = String::new();
	let mut start_line = 0;

	for (idx, raw) in source.lines().enumerate() {
		let line_no = idx + 1;
		let (code, comment) = match raw.split_once("//") {
			Some((code, comment)) => (code, Some(comment)),
			None => (raw, None),
		};
		if let Some(found) = comment.and_then(layer_comment) {
			layer = Some(found);
		}

		let trimmed = code.trim();
		if trimmed.starts_with("---") {
			if !pending.trim().is_empty() {
				return Err(TlError::parse(start_line, head(&pending), "declaration not terminated by `;`"));
			}
			kind = match trimmed {
				"---types---" => DefKind::Constructor,
				"---functions---" => DefKind::Method,
				_ => return Err(TlError::parse(line_no, trimmed, "unknown section marker")),
			};
			continue;
		}

		let mut rest = code;
		while let Some(end) = rest.find(';') {
			if pending.trim().is_empty() {
				start_line = line_no;
			}
			pending.push_str(&rest[..end]);
			if let Some(def) = parse_declaration(&pending, start_line, kind)? {
				if options.verify_ids {
					check_id(&def, start_line);
				}
				match def.kind {
					DefKind::Constructor => constructors.push(def),
					DefKind::Method => methods.push(def),
				}
			}
			pending.clear();
			rest = &rest[end + 1..];
		}
		if !rest.trim().is_empty() {
			if pending.trim().is_empty() {
				start_line = line_no;
			}
			pending.push_str(rest);
			pending.push(' ');
		}
	}

	if !pending.trim().is_empty() {
		return Err(TlError::parse(start_line, head(&pending), "declaration not terminated by `;`"));
	}

	finish(layer, constructors, methods)
}

/// Load a schema file, choosing the JSON loader for `.json` paths.
pub fn load_schema(path: &Path) -> Result<Schema> {
	let source = std::fs::read_to_string(path)?;
	let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
	debug!(path = %path.display(), json = is_json, "loading schema");
	if is_json { parse_json(&source) } else { parse_schema(&source) }
}

/// Assemble and validate a schema from collected definitions.
pub(crate) fn finish(layer: Option<u32>, constructors: Vec<Definition>, methods: Vec<Definition>) -> Result<Schema> {
	let schema = Schema::new(layer, constructors, methods);
	schema.validate()?;
	debug!(
		layer = ?schema.layer,
		types = schema.types.len(),
		constructors = schema.constructors.len(),
		methods = schema.methods.len(),
		"parsed schema"
	);
	Ok(schema)
}

fn layer_comment(comment: &str) -> Option<u32> {
	let rest = comment.trim().strip_prefix("LAYER")?;
	rest.trim().parse().ok()
}

fn check_id(def: &Definition, line: usize) {
	let inferred = signature_id(def);
	if inferred != def.id {
		warn!(
			line,
			name = %def.name,
			declared = format_args!("{:08x}", def.id),
			inferred = format_args!("{inferred:08x}"),
			"explicit id differs from canonical signature"
		);
	}
}

fn head(text: &str) -> String {
	text.split_whitespace().next().unwrap_or_default().to_owned()
}
