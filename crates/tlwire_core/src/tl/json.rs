//! JSON schema loader for the published `{constructors, methods}` layout.

use serde::Deserialize;
use tracing::trace;

use crate::tl::decl::{is_builtin, is_ident, parse_type};
use crate::tl::id::signature_id;
use crate::tl::parse::finish;
use crate::tl::schema::{DefKind, Definition, FieldType, ParameterDef};
use crate::tl::{Result, TlError};

#[derive(Debug, Deserialize)]
struct JsonSchema {
	#[serde(default, alias = "layer")]
	version: Option<NumberOrText>,
	#[serde(default)]
	constructors: Vec<JsonConstructor>,
	#[serde(default)]
	methods: Vec<JsonMethod>,
}

#[derive(Debug, Deserialize)]
struct JsonConstructor {
	id: Option<NumberOrText>,
	predicate: String,
	#[serde(default)]
	params: Vec<JsonParam>,
	#[serde(rename = "type")]
	ty: String,
}

#[derive(Debug, Deserialize)]
struct JsonMethod {
	id: Option<NumberOrText>,
	method: String,
	#[serde(default)]
	params: Vec<JsonParam>,
	#[serde(rename = "type")]
	ty: String,
}

#[derive(Debug, Deserialize)]
struct JsonParam {
	name: String,
	#[serde(rename = "type")]
	ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
	Number(i64),
	Text(String),
}

/// Parse a JSON schema document into a validated [`Schema`](crate::tl::Schema).
///
/// Ids may be signed decimal (`"-1132882121"`) or hex (`"bc799737"`); a missing id is inferred.
pub fn parse_json(source: &str) -> Result<crate::tl::Schema> {
	let doc: JsonSchema = serde_json::from_str(source)?;

	let layer = match doc.version {
		None => None,
		Some(NumberOrText::Number(raw)) => u32::try_from(raw).ok(),
		Some(NumberOrText::Text(raw)) => raw.trim().parse().ok(),
	};

	let mut constructors = Vec::with_capacity(doc.constructors.len());
	for item in doc.constructors {
		if is_builtin(&item.predicate, &[], &item.ty) || item.ty.contains(' ') {
			trace!(name = %item.predicate, "skipping built-in constructor");
			continue;
		}
		constructors.push(build(DefKind::Constructor, &item.predicate, item.id, &item.params, &item.ty)?);
	}

	let mut methods = Vec::with_capacity(doc.methods.len());
	for item in doc.methods {
		methods.push(build(DefKind::Method, &item.method, item.id, &item.params, &item.ty)?);
	}

	finish(layer, constructors, methods)
}

fn build(kind: DefKind, name: &str, id: Option<NumberOrText>, params: &[JsonParam], ty: &str) -> Result<Definition> {
	if !is_ident(name) {
		return Err(TlError::parse(0, name, "invalid definition name"));
	}

	let mut generics: Vec<Box<str>> = Vec::new();
	for param in params {
		if let Some(generic) = param.ty.strip_prefix('!')
			&& !generics.iter().any(|item| item.as_ref() == generic)
		{
			generics.push(generic.into());
		}
	}

	let mut out = Vec::with_capacity(params.len());
	for param in params {
		let ty = parse_type(&param.ty, &generics).map_err(|reason| TlError::parse(0, name, reason))?;
		out.push(ParameterDef {
			name: param.name.as_str().into(),
			ty,
		});
	}

	let result = match kind {
		DefKind::Constructor => {
			if !is_ident(ty) {
				return Err(TlError::parse(0, name, format!("constructor result `{ty}` is not a type name")));
			}
			FieldType::named(ty)
		}
		DefKind::Method => parse_type(ty, &generics).map_err(|reason| TlError::parse(0, name, reason))?,
	};

	let mut def = Definition {
		kind,
		name: name.into(),
		id: 0,
		generics,
		params: out,
		result,
	};
	def.id = match id {
		Some(raw) => parse_id(name, raw)?,
		None => signature_id(&def),
	};
	Ok(def)
}

fn parse_id(name: &str, raw: NumberOrText) -> Result<u32> {
	let bad = |text: &str| TlError::parse(0, name, format!("invalid id `{text}`"));
	let from_decimal = |value: i64| {
		i32::try_from(value)
			.map(|id| id as u32)
			.or_else(|_| u32::try_from(value))
			.map_err(|_| bad(&value.to_string()))
	};
	match raw {
		NumberOrText::Number(value) => from_decimal(value),
		NumberOrText::Text(text) => {
			let trimmed = text.trim();
			let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
			if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
				trimmed.parse::<i64>().map_err(|_| bad(trimmed)).and_then(from_decimal)
			} else {
				let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
				u32::from_str_radix(hex, 16).map_err(|_| bad(trimmed))
			}
		}
	}
}
