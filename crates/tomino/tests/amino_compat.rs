//! Byte-for-byte compatibility with amino's binary encoding.
//!
//! Amino's binary form is protobuf-compatible, so every case is checked both
//! against hand-computed bytes and against prost's encoding helpers.

use prost::encoding::{self, WireType as ProstWireType, encode_key, encode_varint};
use serde_json::json;
use tomino::codec::{encode, encode_json};
use tomino::schema::{BuildOptions, generate};
use tomino::{
    BasicKind, FieldDesc, FieldFlags, Record, ScalarKind, StructRecord, StructValue, TypeDesc,
    TypePath, TypeUniverse, Value, validate_struct,
};

const PKG: &str = "github.com/thehowl/tomino/generator";

fn test_type_path() -> TypePath {
    TypePath::new(PKG, "TestType")
}

fn basic(kind: BasicKind) -> TypeDesc {
    TypeDesc::basic(kind)
}

/// The compatibility fixture.
fn universe() -> TypeUniverse {
    TypeUniverse::new().with(
        test_type_path(),
        TypeDesc::strukt(vec![
            FieldDesc::new("Time", TypeDesc::named("time", "Time")),
            FieldDesc::new("Duration", TypeDesc::named("time", "Duration")),
            FieldDesc::new("FixedUint", basic(BasicKind::Uint64)).with_tag(r#"binary:"fixed64""#),
            FieldDesc::new("Byte", basic(BasicKind::Byte)),
            FieldDesc::new("Bytes", TypeDesc::slice(basic(BasicKind::Byte))),
            FieldDesc::new("ByteArr", TypeDesc::array(4, basic(BasicKind::Byte))),
            FieldDesc::new("ZeroArr", TypeDesc::array(0, basic(BasicKind::Byte))),
            FieldDesc::new("IntPtr", TypeDesc::pointer(basic(BasicKind::Int))),
            FieldDesc::new(
                "Slice",
                TypeDesc::slice(TypeDesc::strukt(vec![
                    FieldDesc::new("A", basic(BasicKind::Int)).with_tag(r#"json:"A""#),
                    FieldDesc::new("B", basic(BasicKind::Int)).with_tag(r#"json:"B""#),
                ])),
            ),
            FieldDesc::new("testName", basic(BasicKind::String)).unexported(),
        ]),
    )
}

fn test_type() -> StructRecord {
    let mut records = generate(&universe(), &[test_type_path()], BuildOptions::default())
        .expect("fixture builds and validates");
    records.remove(0)
}

fn value(fields: StructValue) -> Value {
    Value::Struct(fields)
}

fn pair(a: i64, b: i64) -> Value {
    Value::Struct(StructValue::new().with("A", a).with("B", b))
}

/// `ByteArr` at its zero value, present in every encoding.
const ZERO_BYTE_ARR: [u8; 6] = [0x32, 0x04, 0x00, 0x00, 0x00, 0x00];

/// Protobuf encoding of a length-delimited field holding `payload`.
fn prost_nested(tag: u32, payload: &[u8], buf: &mut Vec<u8>) {
    encode_key(tag, ProstWireType::LengthDelimited, buf);
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}

#[test]
fn test_fixture_shape() {
    let record = test_type();
    assert_eq!(record.name, "TestType");
    assert_eq!(record.source, format!("{PKG}.TestType"));

    let rendered: Vec<String> = record.fields.iter().map(|f| f.to_string()).collect();
    assert_eq!(
        rendered,
        [
            "0001=Time[] { struct Time }",
            "0002=Duration[] { struct Duration }",
            "0003=FixedUint[fixed64] { uint64 }",
            "0004=Byte[] { uint8 }",
            "0005=Bytes[] { bytes }",
            "0006=ByteArr[] { [4]bytes }",
            "0007=ZeroArr[] { [0]bytes }",
            "0008=IntPtr[write_empty] { *int64 }",
            "0009=Slice[] { []struct{2 fields} }",
        ]
    );
}

#[test]
fn test_fixture_tags() {
    let record = test_type();
    let tags: Vec<Vec<u8>> = record
        .fields
        .iter()
        .map(|f| f.present_tag().unwrap().as_bytes().to_vec())
        .collect();
    assert_eq!(
        tags,
        [
            vec![0x0a],
            vec![0x12],
            vec![0x19],
            vec![0x20],
            vec![0x2a],
            vec![0x32],
            vec![0x3a],
            vec![0x40],
            vec![0x4a],
        ]
    );
}

#[test]
fn test_empty() {
    // Arrays are never empty, so only ByteArr is written.
    assert_eq!(encode(&test_type(), &Value::Null).unwrap(), ZERO_BYTE_ARR);
    assert_eq!(
        encode(&test_type(), &value(StructValue::new())).unwrap(),
        ZERO_BYTE_ARR
    );

    let mut prost_buf = Vec::new();
    encoding::bytes::encode(6, &vec![0u8; 4], &mut prost_buf);
    assert_eq!(prost_buf, ZERO_BYTE_ARR);
}

#[test]
fn test_int_ptr() {
    let record = test_type();
    for (n, expected) in [
        (0i64, vec![0x40, 0x00]),
        (123, vec![0x40, 0xf6, 0x01]),
        (-1337, vec![0x40, 0xf1, 0x14]),
    ] {
        let got = encode(&record, &value(StructValue::new().with("IntPtr", n))).unwrap();
        assert_eq!(got[..6], ZERO_BYTE_ARR);
        assert_eq!(got[6..], expected[..], "IntPtr = {n}");

        let mut prost_buf = ZERO_BYTE_ARR.to_vec();
        encoding::sint64::encode(8, &n, &mut prost_buf);
        assert_eq!(got, prost_buf, "IntPtr = {n}");
    }
}

#[test]
fn test_time_duration() {
    let v = value(
        StructValue::new()
            .with("Time", Value::timestamp(900_000, 0))
            .with("Duration", Value::duration(-1337, 1)),
    );
    let got = encode(&test_type(), &v).unwrap();

    let mut time = Vec::new();
    encoding::uint64::encode(1, &900_000u64, &mut time);
    let mut duration = Vec::new();
    encoding::uint64::encode(1, &((-1337i64) as u64), &mut duration);
    encoding::uint32::encode(2, &1u32, &mut duration);
    let mut expected = Vec::new();
    prost_nested(1, &time, &mut expected);
    prost_nested(2, &duration, &mut expected);
    expected.extend_from_slice(&ZERO_BYTE_ARR);
    assert_eq!(got, expected);

    // Time: 0a 04 08 a0 f7 36
    assert_eq!(&got[..6], &[0x0a, 0x04, 0x08, 0xa0, 0xf7, 0x36]);
    // Duration seconds are ten bytes of two's complement varint.
    assert_eq!(&got[6..9], &[0x12, 0x0d, 0x08]);
    assert_eq!(&got[19..21], &[0x10, 0x01]);
    assert_eq!(&got[21..], &ZERO_BYTE_ARR);
}

#[test]
fn test_bytes() {
    let record = test_type();
    for len in [4usize, 1000, 1_000_000] {
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let got = encode(&record, &value(StructValue::new().with("Bytes", data.clone()))).unwrap();

        let mut expected = Vec::new();
        encoding::bytes::encode(5, &data, &mut expected);
        expected.extend_from_slice(&ZERO_BYTE_ARR);
        assert_eq!(got.len(), expected.len(), "len {len}");
        assert!(got == expected, "len {len}");
    }

    let got = encode(&record, &value(StructValue::new().with("Bytes", vec![1u8, 2, 3, 4]))).unwrap();
    assert_eq!(got[..6], [0x2a, 0x04, 1, 2, 3, 4]);
    assert_eq!(got[6..], ZERO_BYTE_ARR);
}

#[test]
fn test_byte_array() {
    let got = encode(
        &test_type(),
        &value(StructValue::new().with("ByteArr", [1u8, 2, 3, 4])),
    )
    .unwrap();
    assert_eq!(got, [0x32, 0x04, 1, 2, 3, 4]);

    let mut expected = Vec::new();
    encoding::bytes::encode(6, &vec![1u8, 2, 3, 4], &mut expected);
    assert_eq!(got, expected);
}

#[test]
fn test_slice() {
    let v = value(StructValue::new().with("Slice", vec![pair(1, 5), pair(0, 4), pair(1337, 0)]));
    let got = encode(&test_type(), &v).unwrap();

    let mut expected = ZERO_BYTE_ARR.to_vec();
    for (a, b) in [(1i64, 5i64), (0, 4), (1337, 0)] {
        let mut elem = Vec::new();
        if a != 0 {
            encoding::sint64::encode(1, &a, &mut elem);
        }
        if b != 0 {
            encoding::sint64::encode(2, &b, &mut elem);
        }
        prost_nested(9, &elem, &mut expected);
    }
    assert_eq!(got, expected);
    assert_eq!(
        got[6..],
        [
            0x4a, 0x04, 0x08, 0x02, 0x10, 0x0a, //
            0x4a, 0x02, 0x10, 0x08, //
            0x4a, 0x03, 0x08, 0xf2, 0x14,
        ]
    );
}

#[test]
fn test_fixed64() {
    let got = encode(
        &test_type(),
        &value(StructValue::new().with("FixedUint", 0xdead_beefu64)),
    )
    .unwrap();
    assert_eq!(got[..9], [0x19, 0xef, 0xbe, 0xad, 0xde, 0x00, 0x00, 0x00, 0x00]);

    let mut expected = Vec::new();
    encoding::fixed64::encode(3, &0xdead_beefu64, &mut expected);
    expected.extend_from_slice(&ZERO_BYTE_ARR);
    assert_eq!(got, expected);
}

#[test]
fn test_byte_field() {
    let got = encode(&test_type(), &value(StructValue::new().with("Byte", 7u8))).unwrap();
    let mut expected = Vec::new();
    encoding::uint32::encode(4, &7u32, &mut expected);
    expected.extend_from_slice(&ZERO_BYTE_ARR);
    assert_eq!(got, expected);
    assert_eq!(got[..2], [0x20, 0x07]);
}

#[test]
fn test_json_encoding() {
    let v = value(
        StructValue::new()
            .with("Duration", Value::duration(5, 1))
            .with("IntPtr", 123i64)
            .with("Slice", vec![pair(1, 2)]),
    );
    assert_eq!(
        encode_json(&test_type(), &v).unwrap(),
        json!({
            "Time": { "seconds": "0", "nanoseconds": 0 },
            "Duration": { "seconds": "5", "nanoseconds": 1 },
            "FixedUint": "0",
            "Byte": 0,
            "Bytes": "",
            "ByteArr": "AAAAAA==",
            "ZeroArr": "",
            "IntPtr": "123",
            "Slice": [{ "A": "1", "B": "2" }],
        })
    );
}

#[test]
fn test_fixture_from_json_matches() {
    let json = r#"{
        "types": [{
            "package": "github.com/thehowl/tomino/generator",
            "name": "TestType",
            "underlying": {
                "kind": "struct",
                "fields": [
                    { "name": "Time", "type": { "kind": "named", "package": "time", "name": "Time" } },
                    { "name": "Duration", "type": { "kind": "named", "package": "time", "name": "Duration" } },
                    {
                        "name": "FixedUint",
                        "type": { "kind": "basic", "name": "uint64" },
                        "annotations": { "binary": "fixed64" }
                    },
                    { "name": "Byte", "type": { "kind": "basic", "name": "byte" } },
                    { "name": "Bytes", "type": { "kind": "slice", "elem": { "kind": "basic", "name": "byte" } } },
                    {
                        "name": "ByteArr",
                        "type": { "kind": "array", "len": 4, "elem": { "kind": "basic", "name": "byte" } }
                    },
                    {
                        "name": "ZeroArr",
                        "type": { "kind": "array", "len": 0, "elem": { "kind": "basic", "name": "byte" } }
                    },
                    { "name": "IntPtr", "type": { "kind": "pointer", "elem": { "kind": "basic", "name": "int" } } },
                    {
                        "name": "Slice",
                        "type": {
                            "kind": "slice",
                            "elem": {
                                "kind": "struct",
                                "fields": [
                                    { "name": "A", "type": { "kind": "basic", "name": "int" }, "annotations": { "json": "A" } },
                                    { "name": "B", "type": { "kind": "basic", "name": "int" }, "annotations": { "json": "B" } }
                                ]
                            }
                        }
                    },
                    { "name": "testName", "exported": false, "type": { "kind": "basic", "name": "string" } }
                ]
            }
        }]
    }"#;
    let universe = TypeUniverse::from_json(json).unwrap();
    let records = generate(&universe, &[test_type_path()], BuildOptions::default()).unwrap();
    assert_eq!(records[0], test_type());
}

#[test]
fn test_unsafe_float_roundtrip_bits() {
    let record = StructRecord::named(
        "F",
        "test.F",
        vec![
            tomino::StructField::new("F", Record::scalar(ScalarKind::Float64), 1)
                .with_flags(FieldFlags::UNSAFE),
        ],
    );
    validate_struct(&record).unwrap();
    let got = encode(&record, &value(StructValue::new().with("F", -2.5f64))).unwrap();
    let mut expected = Vec::new();
    encoding::double::encode(1, &-2.5f64, &mut expected);
    assert_eq!(got, expected);
}

#[test]
fn test_trees_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StructRecord>();
    assert_send_sync::<Record>();
    assert_send_sync::<TypeUniverse>();
    assert_send_sync::<Value>();
}
