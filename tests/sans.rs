mod support;

use dbfstream::sans::{
    Codepage, Value,
    descriptor::{self, DESCRIPTOR_LENGTH},
    header::{self, Date, ShortRead},
    record,
};
use support::TableBuilder;

#[test]
fn decode_header() {
    let data = TableBuilder::new()
        .field("NAME", 'C', 10)
        .record(b' ', &["Ada"])
        .record(b' ', &["Grace"])
        .build();

    let header = header::decode(&data).unwrap();

    assert_eq!(header.version, 0x03);
    assert_eq!(header.format, "FoxBASE+/dBase III PLUS, no memo");
    assert_eq!(
        header.last_update,
        Date {
            year: 2024,
            month: 3,
            day: 15
        }
    );
    assert_eq!(header.record_count, 2);
    assert_eq!(header.header_length, 65);
    assert_eq!(header.record_length, 11);
    assert_eq!(header.descriptor_block_length(), 33);
    assert_eq!(header.expected_length(), 65 + 2 * 11);
    assert!(header.fields.is_empty());
    assert!(!header.has_memo());
    assert_eq!(header.level(), 3);
}

#[test]
fn decode_header_format_codes() {
    let memo = TableBuilder::new().version(0x8B).build();
    let header = header::decode(&memo).unwrap();
    assert_eq!(header.format, "dBASE IV with memo");
    assert!(header.has_memo());

    let unknown = TableBuilder::new().version(0x42).build();
    assert_eq!(header::decode(&unknown).unwrap().format, "unknown");
}

#[test]
fn decode_header_ignores_implausible_content() {
    let mut data = [0xFF; 32];
    data[0] = 0x00;

    let header = header::decode(&data).unwrap();
    assert_eq!(header.format, "unknown");
    assert_eq!(header.record_count, u32::MAX);
    assert_eq!(header.last_update.year, 1900 + 255);
}

#[test]
fn decode_header_short() {
    let error = header::decode(&[0x03; 31]).unwrap_err();
    assert_eq!(
        error,
        ShortRead {
            needed: 32,
            available: 31
        }
    );
}

#[test]
fn decode_descriptors() {
    let table = TableBuilder::new()
        .field("NAME", 'C', 10)
        .field_at("SALARY", 'N', 12, 999)
        .field("LONGESTNAME", 'L', 1);
    let data = table.build();
    let block = &data[32..table.header_length() as usize];

    let fields = descriptor::decode(block);

    assert_eq!(fields.len(), 3);
    assert_eq!(&*fields[0].name, "NAME");
    assert_eq!(fields[0].kind, 'C');
    assert_eq!(fields[0].displacement, 1);
    assert_eq!(fields[0].length, 10);
    assert_eq!(&*fields[1].name, "SALARY");
    assert_eq!(fields[1].displacement, 999);
    assert_eq!(fields[1].length, 12);
    assert_eq!(&*fields[2].name, "LONGESTNAME");
}

#[test]
fn decode_descriptors_ignores_remainder() {
    let mut block = vec![0; DESCRIPTOR_LENGTH + 5];
    block[..3].copy_from_slice(b"QTY");
    block[11] = b'N';
    block[16] = 4;
    block[17] = 1;
    block[18] = 0b010;

    let fields = descriptor::decode(&block);

    assert_eq!(fields.len(), 1);
    assert_eq!(&*fields[0].name, "QTY");
    assert_eq!(fields[0].decimals, 1);
    assert!(fields[0].is_nullable());
    assert!(!fields[0].is_system());
    assert!(!fields[0].is_binary());
}

#[test]
fn decode_descriptors_without_entries() {
    assert!(descriptor::decode(&[]).is_empty());
    assert!(descriptor::decode(&[0x0D]).is_empty());
    assert!(descriptor::decode(&[0; DESCRIPTOR_LENGTH - 1]).is_empty());
}

#[test]
fn decode_record() {
    let table = TableBuilder::new()
        .field("NAME", 'C', 6)
        .field("SCORE", 'N', 5)
        .field("OK", 'L', 1);
    let data = table.build();
    let fields = descriptor::decode(&data[32..table.header_length() as usize]);

    let record = record::decode(
        b"*  Bo    9.5f",
        &fields,
        Codepage::default(),
        7,
    );

    assert_eq!(record.sequence, 7);
    assert!(record.deleted);
    assert_eq!(record.get("NAME"), Some(&Value::Text("Bo".into())));
    assert_eq!(record.get("SCORE"), Some(&Value::Number(9.5)));
    assert_eq!(record.get("OK"), Some(&Value::Logical(false)));
    assert_eq!(record.get("MISSING"), None);

    let names: Vec<_> = record.values.iter().map(|(n, _)| &**n).collect();
    assert_eq!(names, ["NAME", "SCORE", "OK"]);
}

#[test]
fn decode_short_record_as_blank() {
    let table = TableBuilder::new()
        .field("A", 'C', 3)
        .field("B", 'N', 3);
    let data = table.build();
    let fields = descriptor::decode(&data[32..table.header_length() as usize]);

    let record = record::decode(b" xy", &fields, Codepage::default(), 1);

    assert!(!record.deleted);
    assert_eq!(record.get("A"), Some(&Value::Text("xy".into())));
    assert!(record.get("B").and_then(Value::as_f64).unwrap().is_nan());
}

#[test]
fn coerce_values() {
    assert_eq!(record::coerce('C', "text"), Value::Text("text".into()));
    assert_eq!(record::coerce('N', "123"), Value::Number(123.0));
    for text in ["inf", "-infinity", "NaN", "1e400"] {
        let value = record::coerce('N', text).as_f64().unwrap();
        assert!(value.is_nan(), "{text}");
    }
    assert_eq!(record::coerce('L', "T"), Value::Logical(true));
    assert_eq!(record::coerce('L', "t"), Value::Logical(true));
    assert_eq!(record::coerce('L', "true"), Value::Logical(false));
    assert_eq!(record::coerce('D', "20240315"), Value::Text("20240315".into()));
    assert_eq!(record::coerce('F', "1.5"), Value::Text("1.5".into()));
}

#[test]
fn display_values() {
    assert_eq!(Value::Text("abc".into()).to_string(), "abc");
    assert_eq!(Value::Number(7.5).to_string(), "7.5");
    assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::Logical(true).to_string(), "true");
}

#[test]
fn codepage_labels() {
    assert_eq!(Codepage::default().name(), "UTF-8");
    assert_eq!(Codepage::for_label("latin1").unwrap().name(), "windows-1252");
    assert_eq!(Codepage::for_label(" cp866 ").unwrap().name(), "IBM866");
    assert!(Codepage::for_label("not-a-codepage").is_err());
}
