use crate::tl::bytes::{Cursor, Writer};
use crate::tl::gzip::{DEFAULT_MAX_UNPACKED_BYTES, unpack_at};
use crate::tl::prim::{
	BOOL_FALSE_ID, BOOL_TRUE_ID, GZIP_PACKED_ID, MAX_BYTES_LEN, bytes_encoded_len, read_bool, read_bytes, read_vector_header, write_bytes,
	write_vector_header,
};
use crate::tl::schema::{Definition, FieldType, OBJECT_TYPE, Primitive};
use crate::tl::value::{FieldValue, ObjectValue, Value};
use crate::tl::{Registry, Result, TlError};

/// Runtime limits and behavior switches for wire decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting depth of objects and vectors.
	pub max_depth: u32,
	/// Maximum allowed vector element count.
	pub max_vector_len: usize,
	/// Reject boxed constructors that do not belong to the declared abstract type.
	pub check_result_type: bool,
	/// Inflate `gzip_packed` wrappers wherever a boxed value is expected.
	pub unpack_gzip: bool,
	/// Ceiling for one inflated `gzip_packed` payload.
	pub max_unpacked_bytes: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_vector_len: 1 << 20,
			check_result_type: true,
			unpack_gzip: true,
			max_unpacked_bytes: DEFAULT_MAX_UNPACKED_BYTES,
		}
	}
}

impl DecodeOptions {
	/// Preset for inspecting captured payloads: permissive typing, wrappers left as-is.
	pub fn for_inspect() -> Self {
		Self {
			check_result_type: false,
			unpack_gzip: false,
			..Self::default()
		}
	}
}

/// Encode a boxed object: constructor id followed by its fields.
pub fn encode(registry: &Registry, value: &ObjectValue) -> Result<Vec<u8>> {
	let def = definition_for(registry, value)?;
	let mut writer = Writer::new();
	Encoder { registry }.object(&mut writer, def, value, false)?;
	Ok(writer.into_inner())
}

/// Encode an object without its constructor id.
pub fn encode_bare(registry: &Registry, value: &ObjectValue) -> Result<Vec<u8>> {
	let def = definition_for(registry, value)?;
	let mut writer = Writer::new();
	Encoder { registry }.object(&mut writer, def, value, true)?;
	Ok(writer.into_inner())
}

/// Append a value of a known static type to `writer`.
pub fn encode_as(registry: &Registry, ty: &FieldType, value: &Value, writer: &mut Writer) -> Result<()> {
	let slot = Slot { decl: "value", field: "" };
	Encoder { registry }.value(writer, ty, value, slot)
}

/// Exact encoded size of a boxed object, computed without writing.
pub fn encoded_len(registry: &Registry, value: &ObjectValue) -> Result<usize> {
	let def = definition_for(registry, value)?;
	let mut counter = Counter::default();
	Encoder { registry }.object(&mut counter, def, value, false)?;
	Ok(counter.0)
}

/// Decode one boxed object from the start of `bytes`.
///
/// Trailing bytes are ignored; use [`decode_from`] to observe how much was consumed.
pub fn decode(registry: &Registry, bytes: &[u8], opt: &DecodeOptions) -> Result<ObjectValue> {
	decode_from(registry, &mut Cursor::new(bytes), opt)
}

/// Decode one boxed object at the cursor, leaving the cursor after it.
///
/// On failure the cursor is left at the read that failed.
pub fn decode_from(registry: &Registry, cursor: &mut Cursor<'_>, opt: &DecodeOptions) -> Result<ObjectValue> {
	let decoder = Decoder { registry, opt };
	match decoder.boxed(cursor, Expect::Any, 0)? {
		Value::Object(object) => Ok(object),
		other => Err(TlError::mismatch("decode", format!("expected object, got {}", other.kind()))),
	}
}

/// Decode a bare object of the named constructor or method.
pub fn decode_bare(registry: &Registry, bytes: &[u8], name: &str, opt: &DecodeOptions) -> Result<ObjectValue> {
	let def = registry
		.constructor(name)
		.or_else(|| registry.method(name))
		.ok_or_else(|| TlError::DefinitionNotFound { name: name.to_owned() })?;
	let mut cursor = Cursor::new(bytes);
	Decoder { registry, opt }.fields(&mut cursor, def, 0)
}

/// Decode a value of a known static type, e.g. a method's return type.
pub fn decode_as(registry: &Registry, bytes: &[u8], ty: &FieldType, opt: &DecodeOptions) -> Result<Value> {
	let mut cursor = Cursor::new(bytes);
	Decoder { registry, opt }.value(&mut cursor, ty, 0)
}

fn definition_for<'r>(registry: &'r Registry, value: &ObjectValue) -> Result<&'r Definition> {
	let def = registry
		.get(value.id)
		.ok_or_else(|| TlError::mismatch(value.name.as_ref(), format!("unknown constructor id {:08x}", value.id)))?;
	if !value.name.is_empty() && value.name != def.name {
		return Err(TlError::mismatch(
			value.name.as_ref(),
			format!("id {:08x} belongs to {}", value.id, def.name),
		));
	}
	Ok(def)
}

trait Sink {
	fn word(&mut self, value: u32);
	fn long(&mut self, value: i64);
	fn double(&mut self, value: f64);
	fn raw(&mut self, raw: &[u8]);
	fn bytes(&mut self, data: &[u8]) -> Result<()>;
	fn vector_header(&mut self, bare: bool, count: usize) -> Result<()>;
}

impl Sink for Writer {
	fn word(&mut self, value: u32) {
		self.write_u32_le(value);
	}

	fn long(&mut self, value: i64) {
		self.write_i64_le(value);
	}

	fn double(&mut self, value: f64) {
		self.write_f64_le(value);
	}

	fn raw(&mut self, raw: &[u8]) {
		self.write_raw(raw);
	}

	fn bytes(&mut self, data: &[u8]) -> Result<()> {
		write_bytes(self, data)
	}

	fn vector_header(&mut self, bare: bool, count: usize) -> Result<()> {
		write_vector_header(self, bare, count)
	}
}

#[derive(Default)]
struct Counter(usize);

impl Sink for Counter {
	fn word(&mut self, _: u32) {
		self.0 += 4;
	}

	fn long(&mut self, _: i64) {
		self.0 += 8;
	}

	fn double(&mut self, _: f64) {
		self.0 += 8;
	}

	fn raw(&mut self, raw: &[u8]) {
		self.0 += raw.len();
	}

	fn bytes(&mut self, data: &[u8]) -> Result<()> {
		if data.len() > MAX_BYTES_LEN {
			return Err(TlError::mismatch("bytes", format!("length {} exceeds {MAX_BYTES_LEN}", data.len())));
		}
		self.0 += bytes_encoded_len(data.len());
		Ok(())
	}

	fn vector_header(&mut self, bare: bool, count: usize) -> Result<()> {
		if i32::try_from(count).is_err() {
			return Err(TlError::mismatch("vector", format!("element count {count} exceeds i32")));
		}
		self.0 += if bare { 4 } else { 8 };
		Ok(())
	}
}

/// Location of a value being encoded, rendered only on error.
#[derive(Clone, Copy)]
struct Slot<'a> {
	decl: &'a str,
	field: &'a str,
}

impl Slot<'_> {
	fn err(self, reason: impl Into<String>) -> TlError {
		if self.field.is_empty() {
			TlError::mismatch(self.decl, reason)
		} else {
			TlError::mismatch(format!("{}.{}", self.decl, self.field), reason)
		}
	}
}

struct Encoder<'r> {
	registry: &'r Registry,
}

impl Encoder<'_> {
	fn object<S: Sink>(&self, out: &mut S, def: &Definition, value: &ObjectValue, bare: bool) -> Result<()> {
		if value.id != def.id {
			return Err(TlError::mismatch(
				def.name.as_ref(),
				format!("object carries id {:08x}, expected {:08x}", value.id, def.id),
			));
		}

		for field in &value.fields {
			match def.param(&field.name) {
				None => return Err(TlError::mismatch(def.name.as_ref(), format!("unknown field `{}`", field.name))),
				Some(param) if param.ty.is_nat() => {
					return Err(TlError::mismatch(
						def.name.as_ref(),
						format!("flags word `{}` is derived and cannot be set", field.name),
					));
				}
				Some(_) => {}
			}
		}

		let words = flag_words(def, value);

		if !bare {
			out.word(def.id);
		}

		for param in &def.params {
			let slot = Slot {
				decl: &def.name,
				field: &param.name,
			};

			if param.ty.is_nat() {
				let word = words.iter().find(|(name, _)| *name == param.name.as_ref()).map_or(0, |(_, word)| *word);
				out.word(word);
				continue;
			}

			if let Some((_, _, inner)) = param.ty.as_flag() {
				let Some(field) = value.get(&param.name) else {
					continue;
				};
				if matches!(inner, FieldType::Primitive(Primitive::True)) {
					match field {
						Value::True | Value::Bool(_) => continue,
						other => return Err(slot.err(format!("expected true, got {}", other.kind()))),
					}
				}
				self.value(out, inner, field, slot)?;
				continue;
			}

			let field = value.get(&param.name).ok_or_else(|| slot.err("missing field"))?;
			self.value(out, &param.ty, field, slot)?;
		}

		Ok(())
	}

	fn value<S: Sink>(&self, out: &mut S, ty: &FieldType, value: &Value, slot: Slot<'_>) -> Result<()> {
		match (ty, value) {
			(FieldType::Primitive(kind), _) => self.primitive(out, *kind, value, slot),
			(FieldType::Vector { elem, bare }, Value::Vector(items)) => {
				out.vector_header(*bare, items.len())?;
				for item in items {
					self.value(out, elem, item, slot)?;
				}
				Ok(())
			}
			(FieldType::Named { name, bare: true, .. }, Value::Object(object)) => {
				let def = self
					.registry
					.bare_target(name)
					.ok_or_else(|| slot.err(format!("no constructor for bare {name}")))?;
				self.object(out, def, object, true)
			}
			(FieldType::Named { name, bare: false, .. }, Value::Object(object)) => {
				let def = self.boxed_definition(object, slot)?;
				if !self.registry.accepts(name, def) {
					return Err(slot.err(format!("{} is not a constructor of {name}", def.name)));
				}
				self.object(out, def, object, false)
			}
			(FieldType::TypeParam { .. }, Value::Object(object)) => {
				let def = self.boxed_definition(object, slot)?;
				self.object(out, def, object, false)
			}
			(FieldType::Flag { inner, .. }, _) => self.value(out, inner, value, slot),
			(_, other) => Err(slot.err(format!("expected {ty}, got {}", other.kind()))),
		}
	}

	fn primitive<S: Sink>(&self, out: &mut S, kind: Primitive, value: &Value, slot: Slot<'_>) -> Result<()> {
		match (kind, value) {
			(Primitive::Int, Value::Int(v)) => out.word(*v as u32),
			(Primitive::Nat, Value::Int(v)) => out.word(*v as u32),
			(Primitive::Long, Value::Long(v)) => out.long(*v),
			(Primitive::Double, Value::Double(v)) => out.double(*v),
			(Primitive::Int128, Value::Int128(raw)) => out.raw(raw),
			(Primitive::Int256, Value::Int256(raw)) => out.raw(raw),
			(Primitive::String | Primitive::Bytes, Value::String(text)) => return out.bytes(text.as_bytes()),
			(Primitive::String | Primitive::Bytes, Value::Bytes(data)) => return out.bytes(data),
			(Primitive::Bool, Value::Bool(v)) => out.word(if *v { BOOL_TRUE_ID } else { BOOL_FALSE_ID }),
			(Primitive::True, Value::True | Value::Bool(true)) => {}
			(_, other) => return Err(slot.err(format!("expected {}, got {}", kind.as_str(), other.kind()))),
		}
		Ok(())
	}

	fn boxed_definition(&self, object: &ObjectValue, slot: Slot<'_>) -> Result<&Definition> {
		self.registry
			.get(object.id)
			.ok_or_else(|| slot.err(format!("unknown constructor id {:08x}", object.id)))
	}
}

/// Compute every flags word of `def` from the fields present in `value`.
fn flag_words<'d>(def: &'d Definition, value: &ObjectValue) -> Vec<(&'d str, u32)> {
	let mut words: Vec<(&str, u32)> = def.flag_words().map(|param| (param.name.as_ref(), 0)).collect();
	for param in &def.params {
		let Some((flags, bit, inner)) = param.ty.as_flag() else {
			continue;
		};
		let present = match value.get(&param.name) {
			None => false,
			Some(Value::Bool(false)) => !matches!(inner, FieldType::Primitive(Primitive::True)),
			Some(_) => true,
		};
		if present && let Some((_, word)) = words.iter_mut().find(|(name, _)| *name == flags) {
			*word |= 1 << bit;
		}
	}
	words
}

#[derive(Clone, Copy)]
enum Expect<'a> {
	Any,
	Type(&'a str),
}

struct Decoder<'r> {
	registry: &'r Registry,
	opt: &'r DecodeOptions,
}

impl Decoder<'_> {
	fn boxed(&self, cursor: &mut Cursor<'_>, expect: Expect<'_>, depth: u32) -> Result<Value> {
		if depth > self.opt.max_depth {
			return Err(TlError::DecodeDepthExceeded { max_depth: self.opt.max_depth });
		}
		if let Some(inflated) = self.inflate(cursor)? {
			return self.boxed(&mut Cursor::new(&inflated), expect, depth + 1);
		}

		let at = cursor.pos();
		let id = cursor.peek_u32_le()?;
		let def = self.registry.resolve_at(id, at)?;
		if let Expect::Type(expected) = expect
			&& self.opt.check_result_type
			&& !self.registry.accepts(expected, def)
		{
			return Err(TlError::UnexpectedConstructor {
				expected: expected.to_owned(),
				got: def.name.to_string(),
				id,
				at,
			});
		}
		cursor.skip(4)?;
		Ok(Value::Object(self.fields(cursor, def, depth + 1)?))
	}

	/// Inflate a `gzip_packed` wrapper at the cursor, if present and enabled.
	fn inflate(&self, cursor: &mut Cursor<'_>) -> Result<Option<Vec<u8>>> {
		if !self.opt.unpack_gzip || cursor.peek_u32_le().ok() != Some(GZIP_PACKED_ID) {
			return Ok(None);
		}

		let at = cursor.pos();
		let mut ahead = cursor.clone();
		ahead.skip(4)?;
		let packed = read_bytes(&mut ahead)?;
		let inflated = unpack_at(packed, self.opt.max_unpacked_bytes, at)?;
		*cursor = ahead;
		Ok(Some(inflated))
	}

	fn fields(&self, cursor: &mut Cursor<'_>, def: &Definition, depth: u32) -> Result<ObjectValue> {
		if depth > self.opt.max_depth {
			return Err(TlError::DecodeDepthExceeded { max_depth: self.opt.max_depth });
		}

		let mut words: Vec<(&str, u32)> = Vec::new();
		let mut fields = Vec::with_capacity(def.params.len());
		for param in &def.params {
			if param.ty.is_nat() {
				words.push((param.name.as_ref(), cursor.read_u32_le()?));
				continue;
			}

			let value = match param.ty.as_flag() {
				Some((flags, bit, inner)) => {
					let word = words.iter().find(|(name, _)| *name == flags).map_or(0, |(_, word)| *word);
					if word & (1 << bit) == 0 {
						continue;
					}
					self.value(cursor, inner, depth)?
				}
				None => self.value(cursor, &param.ty, depth)?,
			};
			fields.push(FieldValue {
				name: param.name.clone(),
				value,
			});
		}

		Ok(ObjectValue {
			id: def.id,
			name: def.name.clone(),
			fields,
		})
	}

	fn value(&self, cursor: &mut Cursor<'_>, ty: &FieldType, depth: u32) -> Result<Value> {
		match ty {
			FieldType::Primitive(kind) => primitive(cursor, *kind),
			FieldType::Vector { elem, bare } => {
				if !*bare && let Some(inflated) = self.inflate(cursor)? {
					return self.value(&mut Cursor::new(&inflated), ty, depth + 1);
				}
				if depth + 1 > self.opt.max_depth {
					return Err(TlError::DecodeDepthExceeded { max_depth: self.opt.max_depth });
				}
				let count = read_vector_header(cursor, *bare, self.opt.max_vector_len, min_encoded_len(elem))?;
				let mut items = Vec::with_capacity(count);
				for _ in 0..count {
					items.push(self.value(cursor, elem, depth + 1)?);
				}
				Ok(Value::Vector(items))
			}
			FieldType::Named { name, bare: true, .. } => {
				let def = self
					.registry
					.bare_target(name)
					.ok_or_else(|| TlError::DefinitionNotFound { name: name.to_string() })?;
				Ok(Value::Object(self.fields(cursor, def, depth + 1)?))
			}
			FieldType::Named { name, bare: false, .. } => {
				let expect = if name.as_ref() == OBJECT_TYPE { Expect::Any } else { Expect::Type(name) };
				self.boxed(cursor, expect, depth)
			}
			FieldType::TypeParam { .. } => self.boxed(cursor, Expect::Any, depth),
			FieldType::Flag { inner, .. } => self.value(cursor, inner, depth),
		}
	}
}

fn primitive(cursor: &mut Cursor<'_>, kind: Primitive) -> Result<Value> {
	Ok(match kind {
		Primitive::Int => Value::Int(cursor.read_i32_le()?),
		Primitive::Nat => Value::Int(cursor.read_u32_le()? as i32),
		Primitive::Long => Value::Long(cursor.read_i64_le()?),
		Primitive::Double => Value::Double(cursor.read_f64_le()?),
		Primitive::Int128 => Value::Int128(cursor.read_array()?),
		Primitive::Int256 => Value::Int256(cursor.read_array()?),
		Primitive::Bool => Value::Bool(read_bool(cursor)?),
		Primitive::True => Value::True,
		Primitive::Bytes => Value::Bytes(read_bytes(cursor)?.to_vec()),
		Primitive::String => match String::from_utf8(read_bytes(cursor)?.to_vec()) {
			Ok(text) => Value::String(text),
			Err(err) => Value::Bytes(err.into_bytes()),
		},
	})
}

/// Smallest wire size of one value of `ty`, used to reject impossible vector counts early.
fn min_encoded_len(ty: &FieldType) -> usize {
	match ty {
		FieldType::Primitive(kind) => kind.fixed_len().unwrap_or(4),
		FieldType::Vector { bare, .. } => {
			if *bare {
				4
			} else {
				8
			}
		}
		FieldType::Named { bare: false, .. } | FieldType::TypeParam { .. } => 4,
		FieldType::Named { bare: true, .. } | FieldType::Flag { .. } => 0,
	}
}

#[cfg(test)]
mod tests;
