use chrono::{DateTime, FixedOffset, NaiveDate};
use std::io::Write;
use xmldecode::demo::{Address, Employee};
use xmldecode::{
    ChoiceValue, Customized, Decoder, DecoderOptions, Enumerator, EnumerationValue, FieldInfo,
    FormattingMode, Reflect, SequenceValue, Severity, Target,
};

#[derive(Debug, Default, PartialEq)]
enum Pick {
    #[default]
    Empty,
    A(i32),
    B(i32),
    C(String),
    Items(Vec<i32>),
}

const PICK: &[FieldInfo] = &[
    FieldInfo::new("a", 0, FormattingMode::DEFAULT),
    FieldInfo::new("b", 1, FormattingMode::DEFAULT),
    FieldInfo::new("c", 2, FormattingMode::DEFAULT),
    FieldInfo::new("item", 3, FormattingMode::REPEATABLE),
];

impl ChoiceValue for Pick {
    fn selections(&self) -> &'static [FieldInfo] {
        PICK
    }

    fn selection_id(&self) -> Option<i32> {
        match self {
            Pick::Empty => None,
            Pick::A(_) => Some(0),
            Pick::B(_) => Some(1),
            Pick::C(_) => Some(2),
            Pick::Items(_) => Some(3),
        }
    }

    fn make_selection(&mut self, id: i32) -> bool {
        *self = match id {
            0 => Pick::A(0),
            1 => Pick::B(0),
            2 => Pick::C(String::new()),
            3 => Pick::Items(Vec::new()),
            _ => return false,
        };
        true
    }

    fn selection_mut(&mut self) -> Option<&mut dyn Reflect> {
        match self {
            Pick::Empty => None,
            Pick::A(v) | Pick::B(v) => Some(v),
            Pick::C(v) => Some(v),
            Pick::Items(v) => Some(v),
        }
    }
}

impl Reflect for Pick {
    fn target(&mut self) -> Target<'_> {
        Target::Choice(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Color {
    #[default]
    Red,
    Green,
}

const COLORS: &[Enumerator] = &[Enumerator::new("RED", 0), Enumerator::new("GREEN", 1)];

impl EnumerationValue for Color {
    fn enumerators(&self) -> &'static [Enumerator] {
        COLORS
    }

    fn set_value(&mut self, value: i32) -> bool {
        *self = match value {
            0 => Color::Red,
            1 => Color::Green,
            _ => return false,
        };
        true
    }
}

impl Reflect for Color {
    fn target(&mut self) -> Target<'_> {
        Target::Enumeration(self)
    }
}

#[derive(Debug, Default, PartialEq)]
struct Percent(u8);

impl Customized for Percent {
    type Base = u8;

    fn from_base(base: u8) -> Result<Self, String> {
        if base <= 100 {
            Ok(Percent(base))
        } else {
            Err(format!("{base} is over 100"))
        }
    }
}

impl Reflect for Percent {
    fn target(&mut self) -> Target<'_> {
        Target::Customized(self)
    }
}

/// Declares a sequence struct together with its field table.
macro_rules! sequence {
    ($name:ident { $($id:literal => $field:ident: $ty:ty = ($tag:literal, $mode:expr)),* $(,)? }) => {
        #[derive(Debug, Default, PartialEq)]
        struct $name {
            $($field: $ty,)*
        }

        impl SequenceValue for $name {
            fn fields(&self) -> &'static [FieldInfo] {
                const FIELDS: &[FieldInfo] = &[$(FieldInfo::new($tag, $id, $mode)),*];
                FIELDS
            }

            fn field_mut(&mut self, id: i32) -> Option<&mut dyn Reflect> {
                match id {
                    $($id => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }

        impl Reflect for $name {
            fn target(&mut self) -> Target<'_> {
                Target::Sequence(self)
            }
        }
    };
}

sequence!(Measure {
    0 => unit: String = ("unit", FormattingMode::ATTRIBUTE),
    1 => value: f64 = ("value", FormattingMode::SIMPLE_CONTENT),
});

sequence!(Stats {
    0 => samples: Vec<i32> = ("samples", FormattingMode::LIST),
    1 => tags: Vec<String> = ("tags", FormattingMode::DEFAULT),
    2 => color: Color = ("color", FormattingMode::DEFAULT),
    3 => score: Percent = ("score", FormattingMode::DEFAULT),
});

sequence!(Blob {
    0 => hex: Vec<u8> = ("hex", FormattingMode::HEX),
    1 => raw: Vec<u8> = ("raw", FormattingMode::DEFAULT),
    2 => b64: Vec<u8> = ("b64", FormattingMode::BASE64),
});

sequence!(Outer {
    0 => id: i32 = ("id", FormattingMode::DEFAULT),
    1 => address: Address = ("address", FormattingMode::UNTAGGED),
    2 => pick: Pick = ("pick", FormattingMode::UNTAGGED),
});

sequence!(Readings {
    0 => vals: Option<Vec<i32>> = ("vals", FormattingMode::NILLABLE),
    1 => age: Option<i32> = ("age", FormattingMode::NILLABLE),
    2 => n: i32 = ("n", FormattingMode::DEFAULT),
    3 => taken: Option<NaiveDate> = ("taken", FormattingMode::DEFAULT),
    4 => stamp: DateTime<FixedOffset> = ("stamp", FormattingMode::DEFAULT),
});

sequence!(Twice {
    0 => first: String = ("first", FormattingMode::SIMPLE_CONTENT),
    1 => second: String = ("second", FormattingMode::SIMPLE_CONTENT),
});

/// Counts how often the decoder reaches for one of its fields.
#[derive(Debug, Default)]
struct CallCounter {
    value: i32,
    calls: usize,
}

impl SequenceValue for CallCounter {
    fn fields(&self) -> &'static [FieldInfo] {
        const FIELDS: &[FieldInfo] = &[FieldInfo::new("value", 0, FormattingMode::DEFAULT)];
        FIELDS
    }

    fn field_mut(&mut self, id: i32) -> Option<&mut dyn Reflect> {
        self.calls += 1;
        match id {
            0 => Some(&mut self.value),
            _ => None,
        }
    }
}

impl Reflect for CallCounter {
    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

fn decode<T: Reflect + Default>(xml: &str, options: DecoderOptions) -> (T, Decoder<'static>, usize) {
    let mut decoder = Decoder::new(options);
    let mut value = T::default();
    let errors = decoder
        .decode_bytes(xml.as_bytes(), &mut value, Some("test.xml"))
        .unwrap();
    (value, decoder, errors)
}

const EMPLOYEE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Employee>
    <name>Bob</name>
    <homeAddress>
        <street>Some Street</street>
        <city>Some City</city>
        <state>Some State</state>
    </homeAddress>
    <age>21</age>
</Employee>
"#;

#[test]
fn test_decode_employee() {
    let (employee, decoder, errors) = decode::<Employee>(EMPLOYEE, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.error_severity(), Severity::NoError);
    assert_eq!(
        employee,
        Employee {
            name: "Bob".to_string(),
            home_address: Some(Address {
                street: "Some Street".to_string(),
                city: "Some City".to_string(),
                state: "Some State".to_string(),
            }),
            age: 21,
        }
    );
}

#[test]
fn test_entities_in_text() {
    let (employee, _, errors) = decode::<Employee>(
        "<Employee><name>Tom &amp; Jerry &#x21;</name></Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(employee.name, "Tom & Jerry !");
}

#[test]
fn test_unknown_element_skipped() {
    let xml = "<Employee><name>Bob</name><nickname><first>B</first></nickname><age>21</age></Employee>";
    let (employee, decoder, errors) = decode::<Employee>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
    assert_eq!(employee.age, 21);
}

#[test]
fn test_unknown_element_is_error_when_not_skipping() {
    let xml = "<Employee><name>Bob</name><nickname><first>B</first></nickname><age>21</age></Employee>";
    let options = DecoderOptions::new().with_skip_unknown_elements(false);
    let (employee, decoder, errors) = decode::<Employee>(xml, options);
    assert_eq!(errors, 1);
    assert_eq!(decoder.num_unknown_elements_skipped(), 0);
    assert!(decoder.logged_messages().contains("Unable to decode sub-element 'nickname'."));
    assert_eq!(employee.name, "Bob");
    assert_eq!(employee.age, 21);
}

#[test]
fn test_empty_nillable_element_is_null() {
    let (employee, _, errors) = decode::<Employee>(
        "<Employee><name>Bob</name><homeAddress/><age>21</age></Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(employee.home_address, None);

    let (employee, _, errors) = decode::<Employee>(
        "<Employee><homeAddress></homeAddress></Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(employee.home_address, None);
}

#[test]
fn test_nillable_element_with_content_is_present() {
    let (employee, _, errors) = decode::<Employee>(
        "<Employee><homeAddress><city>Paris</city></homeAddress></Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    let address = employee.home_address.unwrap();
    assert_eq!(address.city, "Paris");
    assert_eq!(address.street, "");
}

#[test]
fn test_bad_field_keeps_siblings() {
    let xml = "<Employee><name>Bob</name><homeAddress><city>Paris</city></homeAddress><age>abc</age></Employee>";
    let (employee, decoder, errors) = decode::<Employee>(xml, DecoderOptions::default());
    assert!(errors > 0);
    assert_eq!(decoder.error_severity(), Severity::Error);
    assert!(decoder.logged_messages().contains("Unable to parse \"abc\""));
    assert_eq!(employee.name, "Bob");
    assert_eq!(employee.home_address.map(|a| a.city), Some("Paris".to_string()));
    assert_eq!(employee.age, 0);
}

#[test]
fn test_messages_carry_position() {
    let xml = "<Employee>\n  <age>abc</age>\n</Employee>";
    let (_, decoder, _) = decode::<Employee>(xml, DecoderOptions::default());
    let first = &decoder.diagnostics()[0];
    assert_eq!(first.uri, "test.xml");
    assert_eq!(first.line, 2);
    assert!(decoder.logged_messages().starts_with("test.xml:2."));
}

#[test]
fn test_choice_allows_one_selection() {
    let (pick, decoder, errors) =
        decode::<Pick>("<pick><b>1</b><c>2</c></pick>", DecoderOptions::default());
    assert!(errors > 0);
    assert!(decoder
        .logged_messages()
        .contains("Only one selection is permitted inside choice."));
    assert_eq!(pick, Pick::B(1));
}

#[test]
fn test_choice_without_selection() {
    let (pick, decoder, errors) = decode::<Pick>("<pick></pick>", DecoderOptions::default());
    assert_eq!(errors, 1);
    assert!(decoder.logged_messages().contains("No elements selected in choice."));
    assert_eq!(pick, Pick::Empty);
}

#[test]
fn test_repeatable_selection() {
    let (pick, _, errors) = decode::<Pick>(
        "<pick><item>1</item><item>2</item><item>3</item></pick>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(pick, Pick::Items(vec![1, 2, 3]));
}

#[test]
fn test_attribute_and_simple_content() {
    let (measure, _, errors) =
        decode::<Measure>(r#"<m unit="cm"> 2.5 </m>"#, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(measure.unit, "cm");
    assert_eq!(measure.value, 2.5);
}

#[test]
fn test_bad_attribute_value() {
    let (employee, decoder, errors) = decode::<Employee>(
        r#"<Employee age="old"><name>x</name></Employee>"#,
        DecoderOptions::default(),
    );
    assert!(errors > 0);
    assert!(decoder
        .logged_messages()
        .contains("Unable to parse \"old\" (for 'age' attribute)."));
    assert_eq!(employee.name, "x");
}

#[test]
fn test_element_field_as_attribute_warns() {
    let (employee, decoder, errors) =
        decode::<Employee>(r#"<Employee age="30"/>"#, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.warning_count(), 1);
    assert!(decoder.logged_messages().contains("'IS_ATTRIBUTE' flag"));
    assert_eq!(employee.age, 30);
}

#[test]
fn test_unknown_attribute() {
    let xml = r#"<Employee id="7"><age>1</age></Employee>"#;
    let (_, decoder, errors) = decode::<Employee>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.warning_count(), 0);

    let options = DecoderOptions::new().with_skip_unknown_elements(false);
    let (_, decoder, errors) = decode::<Employee>(xml, options);
    assert_eq!(errors, 0);
    assert_eq!(decoder.warning_count(), 1);
    assert!(decoder.logged_messages().contains("Unknown attribute 'id'."));
}

#[test]
fn test_stray_characters_warn() {
    let (employee, decoder, errors) = decode::<Employee>(
        "<Employee>oops<age>4</age></Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(decoder.error_severity(), Severity::Warning);
    assert_eq!(employee.age, 4);
}

#[test]
fn test_lists_and_repetition() {
    let xml = "<s>
        <samples> 1 2
            3 </samples>
        <tags>a</tags>
        <tags>b</tags>
        <color>GREEN</color>
        <score>42</score>
    </s>";
    let (stats, _, errors) = decode::<Stats>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(stats.samples, vec![1, 2, 3]);
    assert_eq!(stats.tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(stats.color, Color::Green);
    assert_eq!(stats.score, Percent(42));
}

#[test]
fn test_enumeration_by_number() {
    let (stats, _, errors) = decode::<Stats>("<s><color>1</color></s>", DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(stats.color, Color::Green);
}

#[test]
fn test_scalar_rejections() {
    let xml = "<s><samples>1 x 3</samples><color>BLUE</color><score>142</score></s>";
    let (stats, decoder, errors) = decode::<Stats>(xml, DecoderOptions::default());
    assert!(errors >= 3);
    assert!(stats.samples.is_empty());
    assert_eq!(stats.color, Color::Red);
    assert_eq!(stats.score, Percent(0));
    let messages = decoder.logged_messages();
    assert!(messages.contains("\"BLUE\""));
    assert!(messages.contains("customized type"));
}

#[test]
fn test_byte_encodings() {
    let xml = "<blob><hex>00FF</hex><raw>hi</raw><b64>aGk=</b64></blob>";
    let (blob, _, errors) = decode::<Blob>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(blob.hex, vec![0x00, 0xFF]);
    assert_eq!(blob.raw, b"hi".to_vec());
    assert_eq!(blob.b64, b"hi".to_vec());
}

#[test]
fn test_odd_hex_leaves_field_empty() {
    let (blob, decoder, errors) =
        decode::<Blob>("<blob><hex>0</hex><raw>x</raw></blob>", DecoderOptions::default());
    assert!(errors > 0);
    assert!(blob.hex.is_empty());
    assert_eq!(blob.raw, b"x".to_vec());
    assert!(decoder
        .logged_messages()
        .contains("Unable to end parsing list or binary type"));
}

#[test]
fn test_untagged_fields_are_flattened() {
    let xml = "<o><id>1</id><street>Main</street><city>Oslo</city><a>4</a></o>";
    let (outer, decoder, errors) = decode::<Outer>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.num_unknown_elements_skipped(), 0);
    assert_eq!(outer.id, 1);
    assert_eq!(outer.address.street, "Main");
    assert_eq!(outer.address.city, "Oslo");
    assert_eq!(outer.pick, Pick::A(4));
}

#[test]
fn test_untagged_element_name_is_not_a_tag() {
    let (outer, decoder, errors) =
        decode::<Outer>("<o><address>x</address></o>", DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
    assert_eq!(outer.address, Address::default());
}

#[test]
fn test_conflicting_simple_content_is_fatal() {
    let (_, decoder, errors) = decode::<Twice>("<t>x</t>", DecoderOptions::default());
    assert_eq!(errors, 1);
    assert_eq!(decoder.error_severity(), Severity::Fatal);
}

#[test]
fn test_depth_limit_stops_decoding() {
    let xml = "<p><a><b><c><d/></c></b></a><value>9</value></p>";
    let options = DecoderOptions::new().with_max_depth(3);
    let (counter, decoder, errors) = decode::<CallCounter>(xml, options);
    assert_eq!(errors, 1);
    assert_eq!(decoder.error_severity(), Severity::Fatal);
    assert_eq!(decoder.diagnostics().len(), 1);
    assert!(decoder
        .logged_messages()
        .contains("Maximum allowed depth of 3 exceeded."));
    assert_eq!(counter.calls, 0);
    assert_eq!(counter.value, 0);
}

#[test]
fn test_depth_counts_root() {
    let options = DecoderOptions::new().with_max_depth(2);
    let (employee, decoder, _) = decode::<Employee>(EMPLOYEE, options);
    assert_eq!(decoder.error_severity(), Severity::Fatal);
    assert_eq!(employee.name, "Bob");
    assert_eq!(employee.age, 0);
}

#[test]
fn test_malformed_document() {
    let (employee, decoder, errors) = decode::<Employee>(
        "<Employee><name>Bob</name><age>3</Employee>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 1);
    assert_eq!(decoder.error_severity(), Severity::Fatal);
    assert_eq!(employee.name, "Bob");
}

#[test]
fn test_decode_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EMPLOYEE.as_bytes()).unwrap();

    let mut decoder = Decoder::default();
    let mut employee = Employee::default();
    let errors = decoder.decode_file(file.path(), &mut employee).unwrap();
    assert_eq!(errors, 0);
    assert_eq!(employee.age, 21);
}

#[test]
fn test_open_then_decode_by_root_name() {
    let mut decoder = Decoder::default();
    decoder.open_bytes(EMPLOYEE.as_bytes(), None).unwrap();
    assert_eq!(decoder.root_name(), Some("Employee"));

    let mut employee = Employee {
        age: 99,
        ..Employee::default()
    };
    assert_eq!(decoder.decode(&mut employee).unwrap(), 0);
    decoder.close();
    assert_eq!(employee.name, "Bob");
}

#[test]
fn test_warnings_go_to_warning_stream() {
    let mut errors_out = Vec::new();
    let mut warnings_out = Vec::new();
    {
        let mut decoder = Decoder::default();
        decoder.set_error_stream(&mut errors_out);
        decoder.set_warning_stream(&mut warnings_out);
        let mut employee = Employee::default();
        let errors = decoder
            .decode_reader(&b"<Employee>oops</Employee>"[..], &mut employee, Some("w.xml"))
            .unwrap();
        assert_eq!(errors, 0);
    }
    assert!(errors_out.is_empty());
    let text = String::from_utf8(warnings_out).unwrap();
    assert!(text.starts_with("w.xml:1."));
    assert!(text.contains(": Warning: Unexpected characters: \"oops\"."));
}

#[test]
fn test_unknown_choice_selection_is_skipped() {
    let (pick, decoder, errors) = decode::<Pick>("<pick><z>1</z></pick>", DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
    assert!(decoder.logged_messages().is_empty());
    assert_eq!(pick, Pick::Empty);
}

#[test]
fn test_nillable_repetition_keeps_every_element() {
    let (readings, _, errors) = decode::<Readings>(
        "<r><vals>1</vals><vals>2</vals></r>",
        DecoderOptions::default(),
    );
    assert_eq!(errors, 0);
    assert_eq!(readings.vals, Some(vec![1, 2]));

    let (readings, _, errors) =
        decode::<Readings>("<r><vals>1</vals><vals/></r>", DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(readings.vals, Some(vec![1]));

    let (readings, _, errors) = decode::<Readings>("<r><vals/></r>", DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(readings.vals, None);
}

#[test]
fn test_xsi_nil_attribute() {
    let xml = r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
        <age xsi:nil="true"/>
        <n>1</n>
    </r>"#;
    let (readings, decoder, errors) = decode::<Readings>(xml, DecoderOptions::default());
    assert_eq!(errors, 0, "{}", decoder.logged_messages());
    assert_eq!(readings.age, None);
    assert_eq!(readings.n, 1);

    let xml = r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><age xsi:nil="false">5</age></r>"#;
    let (readings, _, errors) = decode::<Readings>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(readings.age, Some(5));
}

#[test]
fn test_doubled_sign_is_rejected() {
    let (value, decoder, errors) = decode::<i32>("<n>+-5</n>", DecoderOptions::default());
    assert_eq!(errors, 1);
    assert!(decoder.logged_messages().contains("Unable to parse \"+-5\""));
    assert_eq!(value, 0);
}

#[test]
fn test_dates_and_times() {
    let xml = "<r><taken>2024-03-01</taken><stamp>2024-03-01T12:00:00+01:00</stamp></r>";
    let (readings, _, errors) = decode::<Readings>(xml, DecoderOptions::default());
    assert_eq!(errors, 0);
    assert_eq!(readings.taken, NaiveDate::from_ymd_opt(2024, 3, 1));
    assert_eq!(readings.stamp.to_rfc3339(), "2024-03-01T12:00:00+01:00");

    let (readings, decoder, errors) =
        decode::<Readings>("<r><taken>2024-13-01</taken><n>3</n></r>", DecoderOptions::default());
    assert!(errors > 0);
    assert!(decoder.logged_messages().contains("invalid date value"));
    assert_eq!(readings.n, 3);
}

#[test]
fn test_invalid_utf8_in_cdata_is_fatal() {
    let mut decoder = Decoder::default();
    let mut value = String::new();
    let errors = decoder
        .decode_bytes(b"<s><![CDATA[a\xFFb]]></s>", &mut value, None)
        .unwrap();
    assert_eq!(errors, 1);
    assert_eq!(decoder.error_severity(), Severity::Fatal);
    assert!(!value.contains('\u{FFFD}'));
}
