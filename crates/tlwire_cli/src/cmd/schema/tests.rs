use crate::cmd::test_support::{fixture_arg, run_tlwire, run_tlwire_json, run_tlwire_stdout};

#[test]
fn schema_json_lists_resolved_parameters() {
	let fixture = fixture_arg("api_sample.tl");
	let json = run_tlwire_json(&["schema", &fixture, "--name", "username", "--json"]);

	assert_eq!(json["layer"], 158);
	let def = &json["definitions"][0];
	assert_eq!(def["kind"], "constructor");
	assert_eq!(def["id"], "0xb4073647");
	assert_eq!(def["params"][1]["name"], "editable");
	assert_eq!(def["params"][1]["type"], "flags.0?true");
	assert_eq!(def["result"], "Username");
}

#[test]
fn abstract_type_name_lists_its_constructors() {
	let fixture = fixture_arg("api_sample.tl");
	let stdout = run_tlwire_stdout(&["schema", &fixture, "--name", "Peer"]);

	assert!(stdout.contains("constructor\t0x59511722\tpeerUser#59511722 user_id:long = Peer;"));
	assert!(stdout.contains("peerChat#36c6019a"));
	assert!(!stdout.contains("inputPeerUser"));
}

#[test]
fn generic_method_renders_its_type_parameter() {
	let fixture = fixture_arg("api_sample.json");
	let json = run_tlwire_json(&["schema", &fixture, "--name", "invokeWithLayer", "--json"]);

	let def = &json["definitions"][0];
	assert_eq!(def["kind"], "method");
	assert_eq!(def["generics"][0], "X");
	assert_eq!(def["params"][1]["type"], "!X");
	assert_eq!(def["result"], "X");
}

#[test]
fn unknown_name_fails() {
	let fixture = fixture_arg("api_sample.tl");
	let output = run_tlwire(&["schema", &fixture, "--name", "nope"]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("nope not found"));
}
