#![allow(missing_docs)]

use tlwire::tl::{
	DecodeOptions, FieldType, ParseOptions, Registry, TlError, Value, Writer, decode, decode_as, encode, encode_as, encoded_len, load_schema, parse_json,
	parse_schema_with,
};
use tlwire_testkit::{fixture_path, read_fixture, read_json_fixture};

fn api() -> Registry {
	Registry::build(load_schema(&fixture_path("api_sample.tl")).expect("load api_sample.tl")).expect("registry")
}

#[test]
fn text_and_json_sources_describe_the_same_schema() {
	let from_text = load_schema(&fixture_path("api_sample.tl")).expect("text");
	let from_json = load_schema(&fixture_path("api_sample.json")).expect("json");

	assert_eq!(from_text.layer, Some(158));
	assert_eq!(from_text, from_json);
}

#[test]
fn json_fixture_publishes_signed_decimal_ids() {
	let doc = read_json_fixture("api_sample.json");
	let first = &doc["constructors"][1];
	assert_eq!(first["predicate"], "boolFalse");
	assert_eq!(first["id"], "-1132882121");

	let schema = parse_json(&doc.to_string()).expect("reparse");
	assert_eq!(schema.constructors[0].id, 0xbc799737);
}

#[test]
fn user_with_two_flag_words_round_trips() {
	let registry = api();
	let photo = registry
		.object("userProfilePhoto")
		.expect("photo")
		.with("has_video", Value::True)
		.with("photo_id", 77_i64)
		.with("stripped_thumb", vec![1_u8, 2, 3])
		.with("dc_id", 2);
	let handle = registry.object("username").expect("username").with("active", Value::True).with("username", "durov");
	let user = registry
		.object("user")
		.expect("user")
		.with("bot", Value::True)
		.with("bot_can_edit", Value::True)
		.with("id", 42_i64)
		.with("first_name", "Pavel")
		.with("photo", photo)
		.with("usernames", vec![Value::from(handle)]);

	let bytes = encode(&registry, &user).expect("encode");
	let flags = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
	let flags2 = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
	assert_eq!(flags, (1 << 14) | (1 << 1) | (1 << 5));
	assert_eq!(flags2, (1 << 1) | 1);
	assert_eq!(encoded_len(&registry, &user).expect("len"), bytes.len());

	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, user);
}

#[test]
fn method_result_vector_decodes_by_declared_type() {
	let registry = api();
	let method = registry.method("users.getUsers").expect("method");
	let result = Value::Vector(vec![
		Value::from(registry.object("userEmpty").expect("userEmpty").with("id", 1_i64)),
		Value::from(registry.object("user").expect("user").with("id", 2_i64).with("username", "two")),
	]);

	let mut writer = Writer::new();
	encode_as(&registry, &method.result, &result, &mut writer).expect("encode");
	let decoded = decode_as(&registry, writer.as_slice(), &method.result, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, result);

	let wrong = FieldType::named("InputPeer");
	let err = decode_as(&registry, &writer.as_slice()[8..], &wrong, &DecodeOptions::default()).expect_err("User is not InputPeer");
	assert!(matches!(err, TlError::UnexpectedConstructor { ref got, .. } if got == "userEmpty"));
}

#[test]
fn layered_send_message_call() {
	let registry = api();
	let peer = registry.object("inputPeerUser").expect("peer").with("user_id", 5_i64).with("access_hash", -9_i64);
	let send = registry
		.object("messages.sendMessage")
		.expect("send")
		.with("silent", Value::True)
		.with("peer", peer)
		.with("message", "hello")
		.with("random_id", 123_i64);
	let call = registry.object("invokeWithLayer").expect("invoke").with("layer", 158).with("query", send);

	let bytes = encode(&registry, &call).expect("encode");
	assert_eq!(&bytes[..4], &0xda9b0d0d_u32.to_le_bytes());
	assert_eq!(&bytes[8..12], &0x7010259f_u32.to_le_bytes());
	assert_eq!(&bytes[12..16], &(1_u32 << 5).to_le_bytes());
	assert_eq!(decode(&registry, &bytes, &DecodeOptions::default()).expect("decode"), call);
}

#[test]
fn verifying_parse_accepts_consistent_ids() {
	let schema = parse_schema_with(&read_fixture("api_sample.tl"), &ParseOptions::verifying()).expect("parse");
	assert_eq!(schema.methods.len(), 5);
	assert_eq!(schema.constructors.len(), 25);
}
