use tlwire::tl::{ObjectValue, Value};

use crate::cmd::util::id_hex;

/// Output truncation and formatting limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of fields printed for a single object.
	pub max_fields_per_object: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for vectors.
	pub max_vector_items: usize,
	/// Maximum number of leading bytes shown for byte strings.
	pub max_bytes_preview: usize,
	/// Maximum recursive print depth for nested vectors/objects.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_object: 80,
			max_string_len: 200,
			max_vector_items: 16,
			max_bytes_preview: 16,
			max_print_depth: 8,
		}
	}
}

/// Print one decoded value tree.
pub fn print_value(value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Vector(items) => {
			if depth >= options.max_print_depth {
				println!("{pad}[... {} items]", items.len());
				return;
			}
			println!("{pad}[");
			for item in items.iter().take(options.max_vector_items) {
				print_value(item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_vector_items {
				println!("{pad}  ... {} more", items.len() - options.max_vector_items);
			}
			println!("{pad}]");
		}
		Value::Object(item) => print_object(item, indent, depth, options),
		scalar => println!("{pad}{}", render_scalar(scalar, options)),
	}
}

/// Print one object with its constructor header.
pub fn print_object(item: &ObjectValue, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	if depth >= options.max_print_depth {
		println!("{pad}{} {{ ... }}", object_header(item));
		return;
	}
	if item.fields.is_empty() {
		println!("{pad}{} {{}}", object_header(item));
		return;
	}

	println!("{pad}{} {{", object_header(item));
	for field in item.fields.iter().take(options.max_fields_per_object) {
		print!("{pad}  {} = ", field.name);
		if matches!(field.value, Value::Object(_) | Value::Vector(_)) {
			println!();
			print_value(&field.value, indent + 4, depth + 1, options);
		} else {
			println!("{}", render_scalar(&field.value, options));
		}
	}
	if item.fields.len() > options.max_fields_per_object {
		println!("{pad}  ... {} more fields", item.fields.len() - options.max_fields_per_object);
	}
	println!("{pad}}}");
}

fn object_header(item: &ObjectValue) -> String {
	format!("{}#{:08x}", item.name, item.id)
}

/// Single-line rendering for non-container values.
pub(crate) fn render_scalar(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Int(v) => v.to_string(),
		Value::Long(v) => v.to_string(),
		Value::Double(v) => v.to_string(),
		Value::Bool(v) => v.to_string(),
		Value::True => "true".to_owned(),
		Value::Int128(v) => format!("0x{}", hex::encode(v)),
		Value::Int256(v) => format!("0x{}", hex::encode(v)),
		Value::String(v) => format!("\"{}\"", truncate(v, options.max_string_len)),
		Value::Bytes(v) => {
			let shown = v.len().min(options.max_bytes_preview);
			let ellipsis = if v.len() > shown { "..." } else { "" };
			format!("bytes[{}] {}{ellipsis}", v.len(), hex::encode(&v[..shown]))
		}
		Value::Vector(items) => format!("[{} items]", items.len()),
		Value::Object(item) => format!("{} {{ ... }}", object_header(item)),
	}
}

/// JSON rendering of a decoded value; objects carry their constructor under `_`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
	match value {
		Value::Int(v) => serde_json::Value::from(*v),
		Value::Long(v) => serde_json::Value::from(*v),
		Value::Double(v) => serde_json::Value::from(*v),
		Value::Bool(v) => serde_json::Value::from(*v),
		Value::True => serde_json::Value::Bool(true),
		Value::Int128(v) => serde_json::Value::from(hex::encode(v)),
		Value::Int256(v) => serde_json::Value::from(hex::encode(v)),
		Value::String(v) => serde_json::Value::from(v.as_str()),
		Value::Bytes(v) => serde_json::Value::from(hex::encode(v)),
		Value::Vector(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
		Value::Object(item) => object_to_json(item),
	}
}

/// JSON rendering of one object.
pub fn object_to_json(item: &ObjectValue) -> serde_json::Value {
	let mut map = serde_json::Map::with_capacity(item.fields.len() + 2);
	map.insert("_".to_owned(), serde_json::Value::from(item.name.as_ref()));
	map.insert("_id".to_owned(), serde_json::Value::from(id_hex(item.id)));
	for field in &item.fields {
		map.insert(field.name.to_string(), value_to_json(&field.value));
	}
	serde_json::Value::Object(map)
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
