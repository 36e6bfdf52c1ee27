use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use tlwire_testkit::{fixture_path as shared_fixture_path, target_dir as workspace_target_dir};

static TLWIRE_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_arg(name: &str) -> String {
	shared_fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_tlwire(args: &[&str]) -> Output {
	Command::new(tlwire_bin()).args(args).output().expect("tlwire command executes")
}

pub(crate) fn run_tlwire_stdout(args: &[&str]) -> String {
	let output = run_tlwire(args);
	assert!(
		output.status.success(),
		"tlwire command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout is utf8")
}

pub(crate) fn run_tlwire_json(args: &[&str]) -> serde_json::Value {
	let stdout = run_tlwire_stdout(args);
	serde_json::from_str(&stdout).expect("stdout should be valid json")
}

fn tlwire_bin() -> &'static PathBuf {
	TLWIRE_BIN.get_or_init(resolve_tlwire_bin)
}

fn resolve_tlwire_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_tlwire") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "tlwire.exe" } else { "tlwire" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "tlwire"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build tlwire binary at {}", bin.display());

	bin
}
