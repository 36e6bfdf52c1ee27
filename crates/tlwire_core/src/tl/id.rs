//! Constructor id inference from canonical declaration signatures.
//!
//! The canonical form is `name [X:Type ...] [param:type ...] = Result` with `bytes` parameters
//! written as `string`, `Vector<T>` written as `Vector T`, and zero-width `flags.N?true`
//! parameters omitted. The id is the CRC-32 of that text.

use crate::tl::Result;
use crate::tl::decl::parse_standalone;
use crate::tl::schema::{DefKind, Definition, FieldType, Primitive};

/// Build the canonical signature used for id inference.
pub fn canonical_signature(def: &Definition) -> String {
	let mut out = String::from(def.name.as_ref());
	for generic in &def.generics {
		out.push(' ');
		out.push_str(generic);
		out.push_str(":Type");
	}
	for param in &def.params {
		if let Some((_, _, FieldType::Primitive(Primitive::True))) = param.ty.as_flag() {
			continue;
		}
		out.push(' ');
		out.push_str(&param.name);
		out.push(':');
		push_type(&mut out, &param.ty, true);
	}
	out.push_str(" = ");
	match (def.kind, &def.result) {
		(DefKind::Constructor, FieldType::Named { name, .. }) => out.push_str(name),
		(_, result) => push_type(&mut out, result, false),
	}
	out
}

/// CRC-32 of the canonical signature.
pub fn signature_id(def: &Definition) -> u32 {
	crc32fast::hash(canonical_signature(def).as_bytes())
}

/// Infer the id of a single declaration, ignoring any explicit `#id` it carries.
pub fn infer_id(declaration: &str) -> Result<u32> {
	let def = parse_standalone(declaration)?;
	Ok(signature_id(&def))
}

fn push_type(out: &mut String, ty: &FieldType, top: bool) {
	match ty {
		FieldType::Primitive(Primitive::Bytes) if top => out.push_str("string"),
		FieldType::Primitive(kind) => out.push_str(kind.as_str()),
		FieldType::TypeParam { name, bang } => {
			if *bang {
				out.push('!');
			}
			out.push_str(name);
		}
		FieldType::Vector { elem, bare } => {
			out.push_str(if *bare { "vector " } else { "Vector " });
			push_type(out, elem, false);
		}
		FieldType::Flag { flags, bit, inner } => {
			out.push_str(flags);
			out.push('.');
			out.push_str(&bit.to_string());
			out.push('?');
			push_type(out, inner, true);
		}
		FieldType::Named { name, args, bare } => {
			if *bare && !FieldType::names_constructor(name) {
				out.push('%');
			}
			out.push_str(name);
			for arg in args {
				out.push(' ');
				push_type(out, arg, false);
			}
		}
	}
}
