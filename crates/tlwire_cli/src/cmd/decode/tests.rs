use crate::cmd::test_support::{fixture_arg, run_tlwire, run_tlwire_json, run_tlwire_stdout};

#[test]
fn boxed_ping_decodes_to_json() {
	let fixture = fixture_arg("mtproto.tl");
	let json = run_tlwire_json(&["decode", &fixture, "--hex", "0xec77be7a 0807060504030201", "--json"]);

	assert_eq!(json["bytes"], 12);
	assert_eq!(json["trailing"], 0);
	assert_eq!(json["value"]["_"], "ping");
	assert_eq!(json["value"]["_id"], "0x7abe77ec");
	assert_eq!(json["value"]["ping_id"], 0x0102_0304_0506_0708_i64);
}

#[test]
fn text_output_prints_tree_and_trailing_bytes() {
	let fixture = fixture_arg("mtproto.tl");
	let stdout = run_tlwire_stdout(&["decode", &fixture, "--hex", "c5737734 0100000000000000 0200000000000000 00000000"]);

	assert!(stdout.contains("bytes: 24"));
	assert!(stdout.contains("trailing: 4"));
	assert!(stdout.contains("pong#347773c5 {"));
	assert!(stdout.contains("  msg_id = 1"));
	assert!(stdout.contains("  ping_id = 2"));
}

#[test]
fn static_type_decodes_boxed_vector() {
	let fixture = fixture_arg("api_sample.tl");
	let json = run_tlwire_json(&[
		"decode",
		&fixture,
		"--hex",
		"15c4b51c 02000000 0100000000000000 0200000000000000",
		"--type",
		"Vector<long>",
		"--json",
	]);

	assert_eq!(json["value"], serde_json::json!([1, 2]));
	assert!(json["trailing"].is_null());
}

#[test]
fn bare_constructor_skips_id_and_flags_word() {
	let fixture = fixture_arg("api_sample.tl");
	let json = run_tlwire_json(&["decode", &fixture, "--hex", "02000000 05647572 6f760000", "--bare", "username", "--json"]);

	assert_eq!(json["value"]["_"], "username");
	assert_eq!(json["value"]["active"], true);
	assert_eq!(json["value"]["username"], "durov");
	assert!(json["value"].get("flags").is_none());
	assert!(json["value"].get("editable").is_none());
}

#[test]
fn unknown_constructor_fails_with_offset() {
	let fixture = fixture_arg("mtproto.tl");
	let output = run_tlwire(&["decode", &fixture, "--hex", "efbeadde"]);

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("unknown constructor 0xdeadbeef at offset 0"), "stderr: {stderr}");
}

#[test]
fn malformed_hex_is_rejected() {
	let fixture = fixture_arg("mtproto.tl");
	let output = run_tlwire(&["decode", &fixture, "--hex", "zz"]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid hex payload"));
}
