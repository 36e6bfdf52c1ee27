use std::path::PathBuf;

use tlwire::tl::{Definition, TypeDef};

use crate::cmd::CliError;
use crate::cmd::util::{emit_json, id_hex, load_registry};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	/// Constructor, method, or abstract type to show; abstract types list their constructors.
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List schema definitions with ids and resolved parameter types.
pub fn run(args: Args) -> Result<(), CliError> {
	let Args { schema: path, name, json } = args;

	let registry = load_registry(&path)?;
	let defs: Vec<&Definition> = match name.as_deref() {
		None => registry.schema().definitions().collect(),
		Some(name) => match registry.by_name(name) {
			Some(TypeDef::Abstract(ty)) => registry.constructors_of(&ty.name).collect(),
			Some(TypeDef::Constructor(def) | TypeDef::Method(def)) => vec![def],
			None => return Err(CliError::NotFound(name.to_owned())),
		},
	};

	if json {
		emit_json(&SchemaJson {
			path: path.display().to_string(),
			layer: registry.layer(),
			definitions: defs.iter().map(|def| definition_json(def)).collect(),
		});
		return Ok(());
	}

	println!("kind\tid\tdeclaration");
	for def in defs {
		println!("{}\t{}\t{def}", def.kind.as_str(), id_hex(def.id));
	}

	Ok(())
}

fn definition_json(def: &Definition) -> DefinitionJson {
	DefinitionJson {
		kind: def.kind.as_str(),
		id: id_hex(def.id),
		name: def.name.to_string(),
		generics: def.generics.iter().map(|name| name.to_string()).collect(),
		params: def
			.params
			.iter()
			.map(|param| ParamJson {
				name: param.name.to_string(),
				type_name: param.ty.to_string(),
			})
			.collect(),
		result: def.result.to_string(),
	}
}

#[derive(serde::Serialize)]
struct ParamJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
}

#[derive(serde::Serialize)]
struct DefinitionJson {
	kind: &'static str,
	id: String,
	name: String,
	generics: Vec<String>,
	params: Vec<ParamJson>,
	result: String,
}

#[derive(serde::Serialize)]
struct SchemaJson {
	path: String,
	layer: Option<u32>,
	definitions: Vec<DefinitionJson>,
}

#[cfg(test)]
mod tests;
