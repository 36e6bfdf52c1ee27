use super::{DecodeOptions, decode, decode_as, decode_bare, decode_from, encode, encode_as, encode_bare, encoded_len};
use crate::tl::bytes::{Cursor, Writer};
use crate::tl::gzip::pack_object;
use crate::tl::prim::VECTOR_ID;
use crate::tl::schema::{FieldType, Primitive};
use crate::tl::{ErrorClass, ObjectValue, Registry, TlError, Value};

const SCHEMA: &str = "
boolFalse#bc799737 = Bool;
boolTrue#997275b5 = Bool;
true#3fedd339 = True;

pinnedMessage#aabbccdd flags:# pinned:flags.0?true id:int = Message;
textMessage#aabb0001 flags:# silent:flags.0?true text:string reply_to:flags.2?int tags:flags.3?Vector<string> = Message;

message msg_id:long seqno:int bytes:int body:Object = Envelope;
msg_container#73f1f8dc messages:vector<%Envelope> = MessageContainer;

future_salt#0949d9dc valid_since:int valid_until:int salt:long = FutureSalt;
future_salts#ae500895 req_msg_id:long now:int salts:vector<future_salt> = FutureSalts;

grid#0a0a0a0a rows:Vector<Vector<int>> = Grid;
node#00000010 next:Node = Node;
leaf#00000011 = Node;
blob#00000020 data:bytes label:string = Blob;

---functions---

messages.getPinned#10000001 peer:int = Vector<long>;
invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X;
";

fn registry() -> Registry {
	Registry::from_tl(SCHEMA).expect("schema")
}

fn words(bytes: &[u8]) -> Vec<u32> {
	bytes
		.chunks_exact(4)
		.map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect()
}

#[test]
fn flags_word_is_derived_from_present_fields() {
	let registry = registry();
	let value = registry.object("pinnedMessage").expect("ctor").with("pinned", Value::True).with("id", 42);

	let bytes = encode(&registry, &value).expect("encode");
	assert_eq!(bytes, vec![0xdd, 0xcc, 0xbb, 0xaa, 0x01, 0, 0, 0, 0x2a, 0, 0, 0]);

	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, value);
}

#[test]
fn absent_or_false_true_flag_clears_bit() {
	let registry = registry();
	let absent = registry.object("pinnedMessage").expect("ctor").with("id", 7);
	let falsy = absent.clone().with("pinned", false);

	for value in [&absent, &falsy] {
		let bytes = encode(&registry, value).expect("encode");
		assert_eq!(words(&bytes), vec![0xaabbccdd, 0, 7]);
	}

	let decoded = decode(&registry, &encode(&registry, &falsy).expect("encode"), &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, absent);
}

#[test]
fn multiple_flag_bits_round_trip() {
	let registry = registry();
	let value = registry
		.object("textMessage")
		.expect("ctor")
		.with("text", "hi")
		.with("reply_to", 9)
		.with("tags", vec![Value::from("a"), Value::from("b")]);

	let bytes = encode(&registry, &value).expect("encode");
	assert_eq!(words(&bytes[..8]), vec![0xaabb0001, 0b1100]);
	assert_eq!(encoded_len(&registry, &value).expect("len"), bytes.len());

	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, value);
}

#[test]
fn unknown_id_is_recoverable_and_keeps_cursor() {
	let registry = registry();
	let bytes = 0xdeadbeef_u32.to_le_bytes();
	let mut cursor = Cursor::new(&bytes);

	let err = decode_from(&registry, &mut cursor, &DecodeOptions::default()).expect_err("unknown");
	assert!(matches!(err, TlError::UnknownConstructor { id: 0xdeadbeef, at: 0 }));
	assert_eq!(err.class(), ErrorClass::UnknownConstructor);
	assert!(err.is_recoverable());
	assert_eq!(cursor.pos(), 0);
}

#[test]
fn truncated_payload_underflows() {
	let registry = registry();
	let value = registry.object("future_salt").expect("ctor").with("valid_since", 1).with("valid_until", 2).with("salt", 3_i64);
	let bytes = encode(&registry, &value).expect("encode");

	let err = decode(&registry, &bytes[..bytes.len() - 3], &DecodeOptions::default()).expect_err("short");
	assert_eq!(err.class(), ErrorClass::BufferUnderflow);
}

#[test]
fn bare_constructor_vector_omits_ids() {
	let registry = registry();
	let salt = |n: i64| {
		Value::from(
			registry
				.object("future_salt")
				.expect("ctor")
				.with("valid_since", 10)
				.with("valid_until", 20)
				.with("salt", n),
		)
	};
	let value = registry
		.object("future_salts")
		.expect("ctor")
		.with("req_msg_id", 5_i64)
		.with("now", 11)
		.with("salts", vec![salt(1), salt(2)]);

	let bytes = encode(&registry, &value).expect("encode");
	// id + long + int + count + 2 * (int + int + long)
	assert_eq!(bytes.len(), 4 + 8 + 4 + 4 + 2 * 16);
	assert_eq!(words(&bytes[16..20]), vec![2]);

	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, value);
}

#[test]
fn container_of_bare_envelopes_with_object_bodies() {
	let registry = registry();
	let body = registry.object("pinnedMessage").expect("ctor").with("id", 1);
	let envelope = registry
		.object("message")
		.expect("ctor")
		.with("msg_id", 100_i64)
		.with("seqno", 1)
		.with("bytes", 12)
		.with("body", body);
	let container = registry.object("msg_container").expect("ctor").with("messages", vec![Value::from(envelope)]);

	let bytes = encode(&registry, &container).expect("encode");
	assert_eq!(words(&bytes[..8]), vec![0x73f1f8dc, 1]);
	assert_eq!(words(&bytes[8 + 8 + 8..8 + 8 + 8 + 4]), vec![0xaabbccdd]);

	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, container);
}

#[test]
fn nested_vectors_round_trip() {
	let registry = registry();
	let rows = vec![
		Value::Vector(vec![Value::Int(1), Value::Int(2)]),
		Value::Vector(Vec::new()),
		Value::Vector(vec![Value::Int(3)]),
	];
	let value = registry.object("grid").expect("ctor").with("rows", rows);

	let bytes = encode(&registry, &value).expect("encode");
	assert_eq!(
		words(&bytes),
		vec![0x0a0a0a0a, VECTOR_ID, 3, VECTOR_ID, 2, 1, 2, VECTOR_ID, 0, VECTOR_ID, 1, 3]
	);
	assert_eq!(decode(&registry, &bytes, &DecodeOptions::default()).expect("decode"), value);
}

#[test]
fn encode_rejects_shape_mismatches() {
	let registry = registry();

	let missing = registry.object("pinnedMessage").expect("ctor");
	let err = encode(&registry, &missing).expect_err("missing id");
	assert!(matches!(err, TlError::EncodeMismatch { ref decl, .. } if decl == "pinnedMessage.id"));

	let unknown = registry.object("pinnedMessage").expect("ctor").with("id", 1).with("colour", 2);
	assert!(matches!(encode(&registry, &unknown), Err(TlError::EncodeMismatch { .. })));

	let flags = registry.object("pinnedMessage").expect("ctor").with("id", 1).with("flags", 1);
	assert!(matches!(encode(&registry, &flags), Err(TlError::EncodeMismatch { .. })));

	let wrong_kind = registry.object("pinnedMessage").expect("ctor").with("id", "one");
	assert!(matches!(encode(&registry, &wrong_kind), Err(TlError::EncodeMismatch { .. })));

	let wrong_type = registry.object("node").expect("ctor").with("next", registry.object("blob").expect("ctor"));
	let err = encode(&registry, &wrong_type).expect_err("blob is not a Node");
	assert_eq!(err.class(), ErrorClass::EncodeMismatch);
}

#[test]
fn decode_checks_declared_result_type() {
	let registry = registry();
	let mut writer = Writer::new();
	writer.write_u32_le(0x00000010);
	writer.write_u32_le(0xaabbccdd);
	writer.write_u32_le(0);
	writer.write_i32_le(1);

	let err = decode(&registry, writer.as_slice(), &DecodeOptions::default()).expect_err("Message in Node slot");
	assert!(matches!(err, TlError::UnexpectedConstructor { ref expected, at: 4, .. } if expected == "Node"));

	let lenient = decode(&registry, writer.as_slice(), &DecodeOptions::for_inspect()).expect("lenient");
	assert_eq!(lenient.get("next").and_then(Value::as_object).map(|object| object.id), Some(0xaabbccdd));
}

#[test]
fn depth_limit_stops_deep_chains() {
	let registry = registry();
	let mut value = registry.object("leaf").expect("leaf");
	for _ in 0..10 {
		value = registry.object("node").expect("node").with("next", value);
	}
	let bytes = encode(&registry, &value).expect("encode");

	let opt = DecodeOptions {
		max_depth: 4,
		..DecodeOptions::default()
	};
	let err = decode(&registry, &bytes, &opt).expect_err("too deep");
	assert!(matches!(err, TlError::DecodeDepthExceeded { max_depth: 4 }));
	assert!(decode(&registry, &bytes, &DecodeOptions::default()).is_ok());
}

#[test]
fn vector_length_limit_applies() {
	let registry = registry();
	let mut writer = Writer::new();
	writer.write_u32_le(VECTOR_ID);
	writer.write_i32_le(5);
	for item in 0..5_i64 {
		writer.write_i64_le(item);
	}
	let ty = FieldType::Vector {
		elem: Box::new(FieldType::Primitive(Primitive::Long)),
		bare: false,
	};
	let opt = DecodeOptions {
		max_vector_len: 4,
		..DecodeOptions::default()
	};

	let err = decode_as(&registry, writer.as_slice(), &ty, &opt).expect_err("too long");
	assert!(matches!(err, TlError::VectorTooLarge { count: 5, max: 4, .. }));
	assert_eq!(err.class(), ErrorClass::Limit);
}

#[test]
fn method_return_type_decodes_with_decode_as() {
	let registry = registry();
	let method = registry.method("messages.getPinned").expect("method");
	let result = Value::Vector(vec![Value::Long(-1), Value::Long(i64::MAX)]);

	let mut writer = Writer::new();
	encode_as(&registry, &method.result, &result, &mut writer).expect("encode");
	assert_eq!(writer.len(), 8 + 16);

	let decoded = decode_as(&registry, writer.as_slice(), &method.result, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, result);
}

#[test]
fn generic_query_wraps_a_method_call() {
	let registry = registry();
	let inner = registry.object("messages.getPinned").expect("method").with("peer", 77);
	let call = registry.object("invokeWithLayer").expect("method").with("layer", 158).with("query", inner);

	let bytes = encode(&registry, &call).expect("encode");
	assert_eq!(words(&bytes), vec![0xda9b0d0d, 158, 0x10000001, 77]);
	assert_eq!(decode(&registry, &bytes, &DecodeOptions::default()).expect("decode"), call);
}

#[test]
fn gzip_packed_is_unpacked_transparently() {
	let registry = registry();
	let salt = registry.object("future_salt").expect("ctor").with("valid_since", 1).with("valid_until", 2).with("salt", 3_i64);
	let plain = encode(&registry, &salt).expect("encode");
	let packed = pack_object(&plain).expect("pack");

	let decoded = decode(&registry, &packed, &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, salt);

	let err = decode(&registry, &packed, &DecodeOptions::for_inspect()).expect_err("wrapper left alone");
	assert!(matches!(err, TlError::UnknownConstructor { id: 0x3072cfa1, .. }));
}

#[test]
fn nested_gzip_layers_count_toward_depth() {
	let registry = registry();
	let salt = registry.object("future_salt").expect("ctor").with("valid_since", 1).with("valid_until", 2).with("salt", 3_i64);
	let mut bytes = encode(&registry, &salt).expect("encode");
	for _ in 0..3 {
		bytes = pack_object(&bytes).expect("pack");
	}

	let opt = DecodeOptions {
		max_depth: 1,
		..DecodeOptions::default()
	};
	let err = decode(&registry, &bytes, &opt).expect_err("too many layers");
	assert!(matches!(err, TlError::DecodeDepthExceeded { max_depth: 1 }));
	assert_eq!(err.class(), ErrorClass::Limit);
	assert_eq!(decode(&registry, &bytes, &DecodeOptions::default()).expect("decode"), salt);
}

#[test]
fn invalid_utf8_string_decodes_as_bytes() {
	let registry = registry();
	let value = registry
		.object("blob")
		.expect("ctor")
		.with("data", vec![0xff_u8, 0x00])
		.with("label", vec![0xc3_u8, 0x28]);

	let bytes = encode(&registry, &value).expect("encode");
	let decoded = decode(&registry, &bytes, &DecodeOptions::default()).expect("decode");

	assert_eq!(decoded.get("label"), Some(&Value::Bytes(vec![0xc3, 0x28])));
	assert_eq!(decoded, value);
}

#[test]
fn bare_encoding_skips_id() {
	let registry = registry();
	let salt = registry.object("future_salt").expect("ctor").with("valid_since", 1).with("valid_until", 2).with("salt", 3_i64);

	let bare = encode_bare(&registry, &salt).expect("bare");
	let boxed = encode(&registry, &salt).expect("boxed");
	assert_eq!(&boxed[4..], bare.as_slice());

	let decoded = decode_bare(&registry, &bare, "future_salt", &DecodeOptions::default()).expect("decode");
	assert_eq!(decoded, salt);

	let err = decode_bare(&registry, &bare, "nothing", &DecodeOptions::default()).expect_err("unknown name");
	assert!(matches!(err, TlError::DefinitionNotFound { .. }));
}

#[test]
fn object_name_must_match_id() {
	let registry = registry();
	let forged = ObjectValue::new(0x0949d9dc, "leaf");
	assert!(matches!(encode(&registry, &forged), Err(TlError::EncodeMismatch { .. })));
}
