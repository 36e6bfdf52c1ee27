use std::path::PathBuf;

use tlwire::tl::{Definition, canonical_signature, signature_id};

use crate::cmd::CliError;
use crate::cmd::util::{emit_json, id_hex, load_registry};

#[derive(clap::Args)]
pub struct Args {
	/// Declaration such as `boolTrue = Bool` (an explicit `#id` is compared, not trusted).
	#[arg(required_unless_present = "audit", conflicts_with = "audit")]
	pub declaration: Option<String>,
	/// Schema whose explicit ids are checked against their canonical signatures.
	#[arg(long)]
	pub audit: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Print canonical signatures and CRC-32 ids.
pub fn run(args: Args) -> Result<(), CliError> {
	let Args { declaration, audit, json } = args;

	let rows: Vec<IdJson> = match (declaration, audit) {
		(Some(text), _) => {
			let def: Definition = text.parse()?;
			let declared = text.split_whitespace().next().is_some_and(|head| head.contains('#'));
			vec![id_row(&def, declared)]
		}
		(None, Some(path)) => {
			let registry = load_registry(&path)?;
			registry
				.schema()
				.definitions()
				.map(|def| id_row(def, true))
				.filter(|row| !row.matches)
				.collect()
		}
		(None, None) => Vec::new(),
	};

	if json {
		emit_json(&rows);
		return Ok(());
	}

	for row in &rows {
		println!("name: {}", row.name);
		println!("signature: {}", row.signature);
		println!("inferred: {}", row.inferred);
		if let Some(declared) = &row.declared {
			println!("declared: {declared}{}", if row.matches { "" } else { " (mismatch)" });
		}
	}

	Ok(())
}

fn id_row(def: &Definition, declared: bool) -> IdJson {
	let inferred = signature_id(def);
	IdJson {
		name: def.name.to_string(),
		signature: canonical_signature(def),
		inferred: id_hex(inferred),
		declared: declared.then(|| id_hex(def.id)),
		matches: !declared || def.id == inferred,
	}
}

#[derive(serde::Serialize)]
struct IdJson {
	name: String,
	signature: String,
	inferred: String,
	declared: Option<String>,
	matches: bool,
}
