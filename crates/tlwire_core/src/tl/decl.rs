use tracing::trace;

use crate::tl::id::signature_id;
use crate::tl::schema::{DefKind, Definition, FieldType, ParameterDef, Primitive};
use crate::tl::{Result, TlError};

/// Parse one `;`-terminated declaration into a definition.
///
/// Returns `Ok(None)` for built-in declarations (`int ? = Int`, `vector#1cb5c415 ...`) that the
/// codec handles natively. Missing ids are inferred from the canonical signature.
pub(crate) fn parse_declaration(text: &str, line: usize, kind: DefKind) -> Result<Option<Definition>> {
	let text = text.trim().trim_end_matches(';').trim();
	let Some((lhs, rhs)) = text.split_once('=') else {
		return Err(TlError::parse(line, leading(text), "missing `=`"));
	};

	let mut tokens = lhs.split_whitespace();
	let Some(head) = tokens.next() else {
		return Err(TlError::parse(line, leading(text), "missing declaration name"));
	};
	let (name, explicit_id) = match head.split_once('#') {
		Some((name, hex)) => {
			let id = u32::from_str_radix(hex, 16).map_err(|_| TlError::parse(line, name, format!("invalid hex id `{hex}`")))?;
			(name, Some(id))
		}
		None => (head, None),
	};
	if !is_ident(name) {
		return Err(TlError::parse(line, leading(text), format!("invalid name `{name}`")));
	}

	let rest: Vec<&str> = tokens.collect();
	let rhs = rhs.trim();
	if is_builtin(name, &rest, rhs) {
		trace!(line, name, "skipping built-in declaration");
		return Ok(None);
	}

	let mut generics: Vec<Box<str>> = Vec::new();
	let mut raw_params = Vec::with_capacity(rest.len());
	for token in rest {
		if let Some(inner) = token.strip_prefix('{') {
			let inner = inner
				.strip_suffix('}')
				.ok_or_else(|| TlError::parse(line, name, format!("unterminated generic `{token}`")))?;
			match inner.split_once(':') {
				Some((generic, "Type")) if is_ident(generic) => generics.push(generic.into()),
				_ => return Err(TlError::parse(line, name, format!("generic `{token}` must be `{{X:Type}}`"))),
			}
			continue;
		}

		let Some((param, ty)) = token.split_once(':') else {
			return Err(TlError::parse(line, name, format!("parameter `{token}` has no type")));
		};
		if !is_ident(param) {
			return Err(TlError::parse(line, name, format!("invalid parameter name `{param}`")));
		}
		raw_params.push((param, ty));
	}

	let mut params: Vec<ParameterDef> = Vec::with_capacity(raw_params.len());
	for (param, ty) in raw_params {
		if params.iter().any(|item| item.name.as_ref() == param) {
			return Err(TlError::parse(line, name, format!("duplicate parameter `{param}`")));
		}
		let ty = parse_type(ty, &generics).map_err(|reason| TlError::parse(line, name, reason))?;
		params.push(ParameterDef { name: param.into(), ty });
	}

	let result = match kind {
		DefKind::Constructor => {
			if !is_ident(rhs) {
				return Err(TlError::parse(line, name, format!("constructor result `{rhs}` is not a type name")));
			}
			FieldType::named(rhs)
		}
		DefKind::Method => parse_type(rhs, &generics).map_err(|reason| TlError::parse(line, name, reason))?,
	};

	let mut def = Definition {
		kind,
		name: name.into(),
		id: 0,
		generics,
		params,
		result,
	};
	def.id = match explicit_id {
		Some(id) => id,
		None => {
			let id = signature_id(&def);
			trace!(line, name, id = format_args!("{id:08x}"), "inferred id");
			id
		}
	};
	Ok(Some(def))
}

/// Parse a declaration outside of any section, picking the kind from its result type.
pub(crate) fn parse_standalone(text: &str) -> Result<Definition> {
	let kind = match text.trim().trim_end_matches(';').split_once('=') {
		Some((_, rhs)) if is_ident(rhs.trim()) && !declares_generic(text, rhs.trim()) => DefKind::Constructor,
		_ => DefKind::Method,
	};
	parse_declaration(text, 1, kind)?.ok_or_else(|| TlError::parse(1, leading(text), "built-in declaration has no id"))
}

/// Parse a parameter or result type expression.
pub(crate) fn parse_type(text: &str, generics: &[Box<str>]) -> std::result::Result<FieldType, String> {
	let text = text.trim();
	if text.is_empty() {
		return Err("empty type".to_owned());
	}

	if let Some((cond, inner)) = text.split_once('?') {
		let (flags, bit) = cond
			.rsplit_once('.')
			.ok_or_else(|| format!("flag condition `{cond}` is not `name.bit`"))?;
		let bit = bit
			.parse::<u8>()
			.ok()
			.filter(|bit| *bit < 32)
			.ok_or_else(|| format!("flag bit `{bit}` must be 0..31"))?;
		if !is_ident(flags) {
			return Err(format!("invalid flags word `{flags}`"));
		}
		let inner = parse_type(inner, generics)?;
		if matches!(inner, FieldType::Flag { .. }) {
			return Err(format!("nested flag condition in `{text}`"));
		}
		return Ok(FieldType::Flag {
			flags: flags.into(),
			bit,
			inner: Box::new(inner),
		});
	}

	if let Some(name) = text.strip_prefix('!') {
		if !generics.iter().any(|item| item.as_ref() == name) {
			return Err(format!("`!{name}` does not name a generic parameter"));
		}
		return Ok(FieldType::TypeParam { name: name.into(), bang: true });
	}
	if generics.iter().any(|item| item.as_ref() == text) {
		return Ok(FieldType::TypeParam { name: text.into(), bang: false });
	}
	if let Some(kind) = Primitive::from_name(text) {
		return Ok(FieldType::Primitive(kind));
	}

	let (percent, body) = match text.strip_prefix('%') {
		Some(body) => (true, body),
		None => (false, text),
	};

	if let Some(open) = body.find('<') {
		let base = &body[..open];
		let inner = body[open + 1..]
			.strip_suffix('>')
			.ok_or_else(|| format!("unbalanced `<` in `{text}`"))?;
		let mut args = split_args(inner)?
			.into_iter()
			.map(|arg| parse_type(arg, generics))
			.collect::<std::result::Result<Vec<_>, _>>()?;

		if matches!(base, "Vector" | "vector") {
			if args.len() != 1 {
				return Err(format!("vector takes one argument, got {}", args.len()));
			}
			let elem = args.pop().map(Box::new).ok_or_else(|| "vector without element type".to_owned())?;
			return Ok(FieldType::Vector {
				elem,
				bare: percent || base == "vector",
			});
		}

		if !is_ident(base) {
			return Err(format!("invalid type name `{base}`"));
		}
		return Ok(FieldType::Named {
			name: base.into(),
			args,
			bare: percent || FieldType::names_constructor(base),
		});
	}

	if !is_ident(body) {
		return Err(format!("invalid type name `{body}`"));
	}
	Ok(FieldType::Named {
		name: body.into(),
		args: Vec::new(),
		bare: percent || FieldType::names_constructor(body),
	})
}

fn split_args(inner: &str) -> std::result::Result<Vec<&str>, String> {
	let mut out = Vec::new();
	let mut depth = 0_i32;
	let mut start = 0;
	for (idx, ch) in inner.char_indices() {
		match ch {
			'<' => depth += 1,
			'>' => depth -= 1,
			',' if depth == 0 => {
				out.push(&inner[start..idx]);
				start = idx + 1;
			}
			_ => {}
		}
		if depth < 0 {
			return Err(format!("unbalanced `>` in `{inner}`"));
		}
	}
	if depth != 0 {
		return Err(format!("unbalanced `<` in `{inner}`"));
	}
	out.push(&inner[start..]);
	Ok(out)
}

pub(crate) fn is_builtin(name: &str, rest: &[&str], rhs: &str) -> bool {
	if name == "vector" {
		return true;
	}
	if rest.iter().any(|token| *token == "?" || *token == "#" || token.contains('[')) {
		return true;
	}
	let scalar = |text: &str| Primitive::from_name(text).is_some_and(|kind| !matches!(kind, Primitive::Bool | Primitive::True));
	scalar(name) && scalar(rhs)
}

fn declares_generic(text: &str, name: &str) -> bool {
	text.split_whitespace().any(|token| token.strip_prefix('{').and_then(|inner| inner.split_once(':')).is_some_and(|(generic, _)| generic == name))
}

pub(crate) fn is_ident(text: &str) -> bool {
	!text.is_empty()
		&& !text.starts_with('.')
		&& !text.ends_with('.')
		&& !text.starts_with(|ch: char| ch.is_ascii_digit())
		&& text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
}

fn leading(text: &str) -> String {
	text.split_whitespace().next().unwrap_or_default().chars().take(48).collect()
}
