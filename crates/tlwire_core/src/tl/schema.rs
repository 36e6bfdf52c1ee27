use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::tl::{Result, TlError};

/// Abstract type name that accepts any boxed constructor.
pub const OBJECT_TYPE: &str = "Object";

/// Wire primitive kinds understood without schema lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
	/// 32-bit signed integer.
	Int,
	/// 64-bit signed integer.
	Long,
	/// IEEE-754 double.
	Double,
	/// 128-bit raw block.
	Int128,
	/// 256-bit raw block.
	Int256,
	/// UTF-8 text framed as a byte string.
	String,
	/// Raw byte string.
	Bytes,
	/// Boxed boolean constant.
	Bool,
	/// Zero-width presence marker, only meaningful behind a flag.
	True,
	/// `#` natural number; used as a flags word.
	Nat,
}

impl Primitive {
	/// Map a schema type token to a primitive kind.
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"#" => return Some(Self::Nat),
			"true" => return Some(Self::True),
			"Bool" | "bool" => return Some(Self::Bool),
			_ => {}
		}

		match name.to_ascii_lowercase().as_str() {
			"int" => Some(Self::Int),
			"long" => Some(Self::Long),
			"double" => Some(Self::Double),
			"int128" => Some(Self::Int128),
			"int256" => Some(Self::Int256),
			"string" => Some(Self::String),
			"bytes" => Some(Self::Bytes),
			_ => None,
		}
	}

	/// Schema spelling of the primitive.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Int => "int",
			Self::Long => "long",
			Self::Double => "double",
			Self::Int128 => "int128",
			Self::Int256 => "int256",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::Bool => "Bool",
			Self::True => "true",
			Self::Nat => "#",
		}
	}

	/// Encoded size for fixed-width primitives.
	pub fn fixed_len(self) -> Option<usize> {
		match self {
			Self::Int | Self::Nat | Self::Bool => Some(4),
			Self::Long | Self::Double => Some(8),
			Self::Int128 => Some(16),
			Self::Int256 => Some(32),
			Self::True => Some(0),
			Self::String | Self::Bytes => None,
		}
	}
}

/// Resolved type of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
	/// Built-in wire primitive.
	Primitive(Primitive),
	/// Reference to an abstract type (boxed) or a single constructor (bare).
	Named {
		/// Qualified type or constructor name.
		name: Box<str>,
		/// Generic arguments, empty for ordinary references.
		args: Vec<FieldType>,
		/// Whether the value is written without its constructor id.
		bare: bool,
	},
	/// `Vector<T>` (boxed) or `vector<T>` (bare) framing.
	Vector {
		/// Element type.
		elem: Box<FieldType>,
		/// Whether the vector marker is omitted.
		bare: bool,
	},
	/// Optional field gated by one bit of an earlier flags word.
	Flag {
		/// Name of the owning `#` parameter.
		flags: Box<str>,
		/// Bit index inside the flags word.
		bit: u8,
		/// Type of the value when present.
		inner: Box<FieldType>,
	},
	/// Generic type parameter, `X` or `!X`.
	TypeParam {
		/// Parameter name from `{X:Type}`.
		name: Box<str>,
		/// Whether written as `!X` (a boxed value of any type).
		bang: bool,
	},
}

impl FieldType {
	/// Shorthand for a boxed named reference.
	pub fn named(name: &str) -> Self {
		Self::Named {
			name: name.into(),
			args: Vec::new(),
			bare: false,
		}
	}

	/// Whether this is the `#` flags word type.
	pub fn is_nat(&self) -> bool {
		matches!(self, Self::Primitive(Primitive::Nat))
	}

	/// Return `(flags, bit, inner)` for flag-gated fields.
	pub fn as_flag(&self) -> Option<(&str, u8, &FieldType)> {
		match self {
			Self::Flag { flags, bit, inner } => Some((flags, *bit, inner)),
			_ => None,
		}
	}

	/// Whether a bare reference targets a constructor directly (lower-case spelling).
	pub(crate) fn names_constructor(name: &str) -> bool {
		short_name(name).chars().next().is_some_and(|ch| ch.is_ascii_lowercase())
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(kind) => f.write_str(kind.as_str()),
			Self::Named { name, args, bare } => {
				if *bare && !Self::names_constructor(name) {
					f.write_str("%")?;
				}
				f.write_str(name)?;
				if !args.is_empty() {
					f.write_str("<")?;
					for (idx, arg) in args.iter().enumerate() {
						if idx > 0 {
							f.write_str(",")?;
						}
						write!(f, "{arg}")?;
					}
					f.write_str(">")?;
				}
				Ok(())
			}
			Self::Vector { elem, bare } => write!(f, "{}<{elem}>", if *bare { "vector" } else { "Vector" }),
			Self::Flag { flags, bit, inner } => write!(f, "{flags}.{bit}?{inner}"),
			Self::TypeParam { name, bang } => write!(f, "{}{name}", if *bang { "!" } else { "" }),
		}
	}
}

impl FromStr for FieldType {
	type Err = TlError;

	/// Parse a standalone type reference such as `Vector<User>` or `%Message`.
	fn from_str(text: &str) -> Result<Self> {
		crate::tl::decl::parse_type(text.trim(), &[]).map_err(|reason| TlError::parse(0, text.trim(), reason))
	}
}

/// One declared parameter; declaration order is wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDef {
	/// Parameter name.
	pub name: Box<str>,
	/// Resolved parameter type.
	pub ty: FieldType,
}

/// Whether a definition is a data constructor or an RPC method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefKind {
	/// Concrete variant of an abstract type.
	Constructor,
	/// Remote function with a declared return type.
	Method,
}

impl DefKind {
	/// Render kind as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Constructor => "constructor",
			Self::Method => "method",
		}
	}
}

/// A constructor or method with its numeric id and ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
	/// Constructor or method.
	pub kind: DefKind,
	/// Qualified name, e.g. `messages.getHistory`.
	pub name: Box<str>,
	/// Wire id.
	pub id: u32,
	/// Generic parameter names from `{X:Type}`.
	pub generics: Vec<Box<str>>,
	/// Parameters in declaration order.
	pub params: Vec<ParameterDef>,
	/// Owning abstract type for constructors; return type for methods.
	pub result: FieldType,
}

impl Definition {
	/// Namespace prefix, if any.
	pub fn namespace(&self) -> Option<&str> {
		namespace(&self.name)
	}

	/// Name without namespace.
	pub fn short_name(&self) -> &str {
		short_name(&self.name)
	}

	/// Name of the owning abstract type for constructors.
	pub fn result_type_name(&self) -> Option<&str> {
		match (&self.kind, &self.result) {
			(DefKind::Constructor, FieldType::Named { name, .. }) => Some(name),
			_ => None,
		}
	}

	/// Look up a parameter by name.
	pub fn param(&self, name: &str) -> Option<&ParameterDef> {
		self.params.iter().find(|param| param.name.as_ref() == name)
	}

	/// Iterate `#` flags-word parameters.
	pub fn flag_words(&self) -> impl Iterator<Item = &ParameterDef> {
		self.params.iter().filter(|param| param.ty.is_nat())
	}
}

impl fmt::Display for Definition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{:08x}", self.name, self.id)?;
		for generic in &self.generics {
			write!(f, " {{{generic}:Type}}")?;
		}
		for param in &self.params {
			write!(f, " {}:{}", param.name, param.ty)?;
		}
		write!(f, " = {};", self.result)
	}
}

impl FromStr for Definition {
	type Err = TlError;

	/// Parse one standalone declaration. A plain identifier on the right-hand side makes it a
	/// constructor, anything else a method. A missing `#id` is inferred.
	fn from_str(text: &str) -> Result<Self> {
		crate::tl::decl::parse_standalone(text)
	}
}

/// Abstract (boxed) type that constructors belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractType {
	/// Qualified type name, e.g. `messages.Chats`.
	pub name: Box<str>,
}

impl AbstractType {
	/// Namespace prefix, if any.
	pub fn namespace(&self) -> Option<&str> {
		namespace(&self.name)
	}
}

/// Normalized schema: abstract types, constructors, and methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
	/// Schema layer from `// LAYER N` or the JSON `version` key.
	pub layer: Option<u32>,
	/// Abstract types in first-reference order.
	pub types: Vec<AbstractType>,
	/// Constructor definitions in source order.
	pub constructors: Vec<Definition>,
	/// Method definitions in source order.
	pub methods: Vec<Definition>,
}

impl Schema {
	/// Assemble a schema, deriving abstract types from constructor results.
	pub fn new(layer: Option<u32>, constructors: Vec<Definition>, methods: Vec<Definition>) -> Self {
		let mut seen = HashSet::new();
		let mut types = Vec::new();
		for item in &constructors {
			if let Some(name) = item.result_type_name()
				&& seen.insert(name.to_owned())
			{
				types.push(AbstractType { name: name.into() });
			}
		}

		Self {
			layer,
			types,
			constructors,
			methods,
		}
	}

	/// Append another schema's definitions, keeping the higher layer.
	///
	/// Used to combine a transport schema with an API schema; call [`Schema::validate`] afterwards.
	pub fn merge(self, other: Schema) -> Self {
		let layer = self.layer.max(other.layer);
		let mut constructors = self.constructors;
		constructors.extend(other.constructors);
		let mut methods = self.methods;
		methods.extend(other.methods);
		Self::new(layer, constructors, methods)
	}

	/// Iterate constructors then methods.
	pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
		self.constructors.iter().chain(self.methods.iter())
	}

	/// Check the schema invariants: unique ids and names, resolvable references, valid flags.
	pub fn validate(&self) -> Result<()> {
		let mut ids: HashMap<u32, &str> = HashMap::new();
		let mut ctor_names = HashSet::new();
		let mut method_names = HashSet::new();
		for item in self.definitions() {
			if let Some(first) = ids.insert(item.id, &item.name) {
				return Err(TlError::DuplicateId {
					id: item.id,
					first: first.to_owned(),
					second: item.name.to_string(),
				});
			}
			let names = match item.kind {
				DefKind::Constructor => &mut ctor_names,
				DefKind::Method => &mut method_names,
			};
			if !names.insert(item.name.as_ref()) {
				return Err(TlError::DuplicateName { name: item.name.to_string() });
			}
		}

		let mut ctor_count: HashMap<&str, usize> = HashMap::new();
		for item in &self.constructors {
			let Some(name) = item.result_type_name() else {
				return Err(TlError::UnresolvedType {
					decl: item.name.to_string(),
					name: item.result.to_string(),
				});
			};
			*ctor_count.entry(name).or_insert(0) += 1;
		}

		let refs = References {
			ctor_names: &ctor_names,
			ctor_count: &ctor_count,
		};
		for item in self.definitions() {
			check_flags(item)?;
			for param in &item.params {
				refs.check(item, &param.ty)?;
			}
			if item.kind == DefKind::Method {
				refs.check(item, &item.result)?;
			}
		}

		Ok(())
	}
}

struct References<'a> {
	ctor_names: &'a HashSet<&'a str>,
	ctor_count: &'a HashMap<&'a str, usize>,
}

impl References<'_> {
	fn check(&self, decl: &Definition, ty: &FieldType) -> Result<()> {
		match ty {
			FieldType::Primitive(_) => Ok(()),
			FieldType::TypeParam { name, .. } => {
				if decl.generics.iter().any(|item| item == name) {
					Ok(())
				} else {
					Err(unresolved(decl, name))
				}
			}
			FieldType::Vector { elem, .. } => self.check(decl, elem),
			FieldType::Flag { inner, .. } => self.check(decl, inner),
			FieldType::Named { name, args, bare } => {
				for arg in args {
					self.check(decl, arg)?;
				}
				if *bare && FieldType::names_constructor(name) {
					return if self.ctor_names.contains(name.as_ref()) {
						Ok(())
					} else {
						Err(unresolved(decl, name))
					};
				}
				if name.as_ref() == OBJECT_TYPE && !*bare {
					return Ok(());
				}
				match (self.ctor_count.get(name.as_ref()), bare) {
					(None, _) => Err(unresolved(decl, name)),
					(Some(1), true) | (Some(_), false) => Ok(()),
					(Some(count), true) => Err(TlError::AmbiguousBareType {
						decl: decl.name.to_string(),
						name: name.to_string(),
						count: *count,
					}),
				}
			}
		}
	}
}

fn check_flags(decl: &Definition) -> Result<()> {
	for (idx, param) in decl.params.iter().enumerate() {
		let Some((flags, bit, _)) = param.ty.as_flag() else {
			continue;
		};
		let declared_before = decl.params[..idx].iter().any(|item| item.name.as_ref() == flags && item.ty.is_nat());
		if !declared_before || bit >= 32 {
			return Err(TlError::UnknownFlagsField {
				decl: decl.name.to_string(),
				field: param.name.to_string(),
				flags: format!("{flags}.{bit}"),
			});
		}
	}
	Ok(())
}

fn unresolved(decl: &Definition, name: &str) -> TlError {
	TlError::UnresolvedType {
		decl: decl.name.to_string(),
		name: name.to_owned(),
	}
}

fn namespace(name: &str) -> Option<&str> {
	name.rsplit_once('.').map(|(ns, _)| ns)
}

fn short_name(name: &str) -> &str {
	name.rsplit_once('.').map_or(name, |(_, short)| short)
}
