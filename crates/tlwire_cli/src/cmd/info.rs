use std::collections::BTreeMap;
use std::path::PathBuf;

use tlwire::tl::DefKind;

use crate::cmd::CliError;
use crate::cmd::util::{emit_json, load_registry};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print layer, definition counts, and per-namespace totals.
pub fn run(args: Args) -> Result<(), CliError> {
	let Args { schema: path, json } = args;

	let registry = load_registry(&path)?;
	let schema = registry.schema();

	let mut namespaces: BTreeMap<String, NamespaceJson> = BTreeMap::new();
	for def in schema.definitions() {
		let entry = namespaces.entry(def.namespace().unwrap_or("").to_owned()).or_default();
		match def.kind {
			DefKind::Constructor => entry.constructors += 1,
			DefKind::Method => entry.methods += 1,
		}
	}

	if json {
		emit_json(&InfoJson {
			path: path.display().to_string(),
			layer: schema.layer,
			types: schema.types.len(),
			constructors: schema.constructors.len(),
			methods: schema.methods.len(),
			namespaces,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("layer: {}", schema.layer.map_or_else(|| "-".to_owned(), |layer| layer.to_string()));
	println!("types: {}", schema.types.len());
	println!("constructors: {}", schema.constructors.len());
	println!("methods: {}", schema.methods.len());
	println!("namespace\tconstructors\tmethods");
	for (name, counts) in &namespaces {
		let name = if name.is_empty() { "-" } else { name };
		println!("{name}\t{}\t{}", counts.constructors, counts.methods);
	}

	Ok(())
}

#[derive(Default, serde::Serialize)]
struct NamespaceJson {
	constructors: usize,
	methods: usize,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	layer: Option<u32>,
	types: usize,
	constructors: usize,
	methods: usize,
	namespaces: BTreeMap<String, NamespaceJson>,
}
