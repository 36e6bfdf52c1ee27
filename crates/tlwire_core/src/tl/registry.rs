use std::collections::HashMap;

use tracing::debug;

use crate::tl::schema::{AbstractType, DefKind, Definition, FieldType, OBJECT_TYPE, Schema};
use crate::tl::value::ObjectValue;
use crate::tl::{Result, TlError};

#[derive(Debug, Clone, Copy)]
enum Slot {
	Constructor(usize),
	Method(usize),
}

/// Borrowed view over any named schema entry.
#[derive(Debug, Clone, Copy)]
pub enum TypeDef<'a> {
	/// Abstract boxed type.
	Abstract(&'a AbstractType),
	/// Data constructor.
	Constructor(&'a Definition),
	/// RPC method.
	Method(&'a Definition),
}

impl<'a> TypeDef<'a> {
	/// Underlying constructor or method, if this is not an abstract type.
	pub fn definition(self) -> Option<&'a Definition> {
		match self {
			Self::Constructor(def) | Self::Method(def) => Some(def),
			Self::Abstract(_) => None,
		}
	}
}

/// Immutable id and name indexes over a validated schema.
///
/// Built once and shared read-only; use [`RegistryHandle`](crate::tl::RegistryHandle) to swap in
/// a rebuilt registry.
#[derive(Debug)]
pub struct Registry {
	schema: Schema,
	by_id: HashMap<u32, Slot>,
	constructors_by_name: HashMap<Box<str>, usize>,
	methods_by_name: HashMap<Box<str>, usize>,
	types_by_name: HashMap<Box<str>, usize>,
	constructors_by_type: HashMap<Box<str>, Vec<usize>>,
}

impl Registry {
	/// Validate `schema` and build lookup indexes.
	pub fn build(schema: Schema) -> Result<Self> {
		schema.validate()?;

		let mut by_id = HashMap::with_capacity(schema.constructors.len() + schema.methods.len());
		let mut constructors_by_name = HashMap::with_capacity(schema.constructors.len());
		let mut constructors_by_type: HashMap<Box<str>, Vec<usize>> = HashMap::new();
		for (idx, item) in schema.constructors.iter().enumerate() {
			by_id.insert(item.id, Slot::Constructor(idx));
			constructors_by_name.insert(item.name.clone(), idx);
			if let Some(owner) = item.result_type_name() {
				constructors_by_type.entry(owner.into()).or_default().push(idx);
			}
		}

		let mut methods_by_name = HashMap::with_capacity(schema.methods.len());
		for (idx, item) in schema.methods.iter().enumerate() {
			by_id.insert(item.id, Slot::Method(idx));
			methods_by_name.insert(item.name.clone(), idx);
		}

		let types_by_name = schema.types.iter().enumerate().map(|(idx, item)| (item.name.clone(), idx)).collect();

		debug!(
			layer = ?schema.layer,
			types = schema.types.len(),
			constructors = schema.constructors.len(),
			methods = schema.methods.len(),
			"built registry"
		);

		Ok(Self {
			schema,
			by_id,
			constructors_by_name,
			methods_by_name,
			types_by_name,
			constructors_by_type,
		})
	}

	/// Parse TL text and build a registry in one step.
	pub fn from_tl(source: &str) -> Result<Self> {
		Self::build(crate::tl::parse_schema(source)?)
	}

	/// Borrow the underlying schema.
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Schema layer, if declared.
	pub fn layer(&self) -> Option<u32> {
		self.schema.layer
	}

	/// Look up a constructor or method by wire id.
	pub fn get(&self, id: u32) -> Option<&Definition> {
		match *self.by_id.get(&id)? {
			Slot::Constructor(idx) => self.schema.constructors.get(idx),
			Slot::Method(idx) => self.schema.methods.get(idx),
		}
	}

	/// Resolve a wire id, failing with [`TlError::UnknownConstructor`].
	pub fn resolve(&self, id: u32) -> Result<&Definition> {
		self.resolve_at(id, 0)
	}

	pub(crate) fn resolve_at(&self, id: u32, at: usize) -> Result<&Definition> {
		self.get(id).ok_or(TlError::UnknownConstructor { id, at })
	}

	/// Look up any named entry: constructor, then method, then abstract type.
	pub fn by_name(&self, name: &str) -> Option<TypeDef<'_>> {
		if let Some(def) = self.constructor(name) {
			return Some(TypeDef::Constructor(def));
		}
		if let Some(def) = self.method(name) {
			return Some(TypeDef::Method(def));
		}
		self.abstract_type(name).map(TypeDef::Abstract)
	}

	/// Look up a constructor by qualified name.
	pub fn constructor(&self, name: &str) -> Option<&Definition> {
		self.constructors_by_name.get(name).and_then(|idx| self.schema.constructors.get(*idx))
	}

	/// Look up a method by qualified name.
	pub fn method(&self, name: &str) -> Option<&Definition> {
		self.methods_by_name.get(name).and_then(|idx| self.schema.methods.get(*idx))
	}

	/// Look up an abstract type by qualified name.
	pub fn abstract_type(&self, name: &str) -> Option<&AbstractType> {
		self.types_by_name.get(name).and_then(|idx| self.schema.types.get(*idx))
	}

	/// Iterate the constructors of an abstract type in declaration order.
	pub fn constructors_of<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a Definition> + use<'a> {
		self.constructors_by_type
			.get(type_name)
			.map(Vec::as_slice)
			.unwrap_or_default()
			.iter()
			.filter_map(|idx| self.schema.constructors.get(*idx))
	}

	/// Constructor written by a bare reference: a named constructor or the sole one of `%Type`.
	pub fn bare_target(&self, name: &str) -> Option<&Definition> {
		if FieldType::names_constructor(name) {
			return self.constructor(name);
		}
		let mut iter = self.constructors_of(name);
		let first = iter.next()?;
		iter.next().is_none().then_some(first)
	}

	/// Whether a boxed value built by `def` is acceptable where `expected` is declared.
	pub fn accepts(&self, expected: &str, def: &Definition) -> bool {
		expected == OBJECT_TYPE || (def.kind == DefKind::Constructor && def.result_type_name() == Some(expected))
	}

	/// Start an empty object for a constructor or method name.
	pub fn object(&self, name: &str) -> Result<ObjectValue> {
		let def = self
			.constructor(name)
			.or_else(|| self.method(name))
			.ok_or_else(|| TlError::DefinitionNotFound { name: name.to_owned() })?;
		Ok(ObjectValue::new(def.id, def.name.clone()))
	}
}
