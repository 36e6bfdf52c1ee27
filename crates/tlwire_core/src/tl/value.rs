/// Value tree encoded from and decoded into TL wire bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// 32-bit signed integer.
	Int(i32),
	/// 64-bit signed integer.
	Long(i64),
	/// IEEE-754 double.
	Double(f64),
	/// Boxed `Bool` constant.
	Bool(bool),
	/// Presence marker for a `flags.N?true` field.
	True,
	/// 128-bit integer as raw wire bytes.
	Int128([u8; 16]),
	/// 256-bit integer as raw wire bytes.
	Int256([u8; 32]),
	/// Opaque byte string.
	Bytes(Vec<u8>),
	/// UTF-8 byte string.
	String(String),
	/// Vector elements in wire order.
	Vector(Vec<Value>),
	/// Constructor or method call with named fields.
	Object(ObjectValue),
}

impl Value {
	/// Short kind label used in mismatch messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Int(_) => "int",
			Self::Long(_) => "long",
			Self::Double(_) => "double",
			Self::Bool(_) => "Bool",
			Self::True => "true",
			Self::Int128(_) => "int128",
			Self::Int256(_) => "int256",
			Self::Bytes(_) => "bytes",
			Self::String(_) => "string",
			Self::Vector(_) => "vector",
			Self::Object(_) => "object",
		}
	}

	/// Borrow the object payload, if any.
	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Widen `Int` or `Long` to `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(i64::from(*value)),
			Self::Long(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow a UTF-8 string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}
}

impl From<ObjectValue> for Value {
	fn from(value: ObjectValue) -> Self {
		Self::Object(value)
	}
}

/// Constructor instance with its fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
	/// Constructor or method id.
	pub id: u32,
	/// Constructor or method name from the schema.
	pub name: Box<str>,
	/// Field values, excluding derived flags words.
	pub fields: Vec<FieldValue>,
}

impl ObjectValue {
	/// Empty object for the given constructor.
	pub fn new(id: u32, name: impl Into<Box<str>>) -> Self {
		Self {
			id,
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Append a field, builder style.
	pub fn with(mut self, name: impl Into<Box<str>>, value: impl Into<Value>) -> Self {
		self.set(name, value);
		self
	}

	/// Insert or replace a field.
	pub fn set(&mut self, name: impl Into<Box<str>>, value: impl Into<Value>) {
		let name = name.into();
		let value = value.into();
		match self.fields.iter_mut().find(|field| field.name == name) {
			Some(field) => field.value = value,
			None => self.fields.push(FieldValue { name, value }),
		}
	}

	/// Look up a field by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Take a field out, returning its value.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		let idx = self.fields.iter().position(|field| field.name.as_ref() == name)?;
		Some(self.fields.remove(idx).value)
	}
}

/// Named object field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Parameter name.
	pub name: Box<str>,
	/// Field payload.
	pub value: Value,
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Long(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Double(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Vector(value)
	}
}
