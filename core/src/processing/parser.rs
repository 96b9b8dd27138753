use log::debug;

use crate::prelude::{SensorError, SensorResult};
use crate::wire::{
    GnssReading, ImuId, ImuReading, ParsedMessage, RawMessage, SensorTag, Timestamp, Vector3,
};

const SEGMENT_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// Decodes one raw batch entry. Only non-text entries are rejected outright.
pub fn parse_raw(message: &RawMessage) -> SensorResult<ParsedMessage> {
    match message {
        RawMessage::Text(line) => Ok(parse_line(line)),
        RawMessage::Other(value) => Err(SensorError::UnexpectedParse(format!(
            "expected a text line, got {}",
            value
        ))),
    }
}

/// Decodes every segment of a line. Short segments and unknown tags are
/// skipped; a later segment with the same tag replaces an earlier one.
pub fn parse_line(message: &str) -> ParsedMessage {
    let mut parsed = ParsedMessage::default();

    for segment in message.split(SEGMENT_SEPARATOR) {
        let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
        let tag = SensorTag::from_field(fields[0]);

        if fields.len() < tag.required_fields() {
            debug!(
                "dropping {:?} segment with {} of {} fields",
                tag,
                fields.len(),
                tag.required_fields()
            );
            continue;
        }

        match tag {
            SensorTag::Imu0 => parsed.set_imu(decode_imu(ImuId::Imu0, &fields)),
            SensorTag::Imu1 => parsed.set_imu(decode_imu(ImuId::Imu1, &fields)),
            SensorTag::Gnss => parsed.gnss = Some(decode_gnss(&fields)),
            SensorTag::Unknown => {}
        }
    }

    parsed
}

fn decode_imu(imu: ImuId, fields: &[&str]) -> ImuReading {
    ImuReading {
        imu,
        timestamp: Timestamp {
            sec: parse_field(fields[1]),
            nsec: parse_field(fields[2]),
        },
        orientation: decode_vector(&fields[3..6]),
        angular_velocity: decode_vector(&fields[6..9]),
        linear_acceleration: decode_vector(&fields[9..12]),
    }
}

fn decode_gnss(fields: &[&str]) -> GnssReading {
    GnssReading {
        latitude: parse_field(fields[1]),
        longitude: parse_field(fields[2]),
        altitude: parse_field(fields[3]),
    }
}

fn decode_vector(fields: &[&str]) -> Vector3 {
    Vector3::new(
        parse_field(fields[0]),
        parse_field(fields[1]),
        parse_field(fields[2]),
    )
}

/// Reads the longest numeric prefix after leading whitespace; NaN if none.
pub fn parse_field(field: &str) -> f64 {
    let trimmed = field.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    numeric_prefix(trimmed)
        .parse()
        .unwrap_or(f64::NAN)
}

fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return &text[..end + "Infinity".len()];
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut mantissa_digits = int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[end + 1..]);
        if mantissa_digits + frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    &text[..end]
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const IMU0_LINE: &str = "imu0,1,2,0.1,0.2,0.3,1.5,-2.5,3.5,9.8,-0.1,0.02";

    #[test]
    fn imu_fields_decode_positionally() {
        let parsed = parse_line(IMU0_LINE);
        let imu = parsed.imu0.unwrap();
        assert_eq!(imu.imu, ImuId::Imu0);
        assert_eq!(imu.timestamp, Timestamp { sec: 1.0, nsec: 2.0 });
        assert_eq!(imu.orientation, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(imu.angular_velocity, Vector3::new(1.5, -2.5, 3.5));
        assert_eq!(imu.linear_acceleration, Vector3::new(9.8, -0.1, 0.02));
        assert!(parsed.imu1.is_none());
        assert!(parsed.gnss.is_none());
    }

    #[test]
    fn combined_line_yields_imu_and_gnss() {
        let parsed = parse_line("imu0,1,2,0,0,0,0,0,0,0,0,0;gnss,10.5,20.5,30.5");
        let imu = parsed.imu0.unwrap();
        assert_eq!(imu.timestamp, Timestamp { sec: 1.0, nsec: 2.0 });
        assert_eq!(imu.angular_velocity, Vector3::default());
        assert_eq!(imu.linear_acceleration, Vector3::default());
        assert_eq!(
            parsed.gnss,
            Some(GnssReading {
                latitude: 10.5,
                longitude: 20.5,
                altitude: 30.5,
            })
        );
    }

    #[test]
    fn short_segment_is_dropped_without_affecting_siblings() {
        let parsed = parse_line("imu1,1,2,3;gnss,1,2,3;imu0,1,2,0,0,0,0,0,0,0,0");
        assert!(parsed.imu1.is_none());
        assert!(parsed.imu0.is_none());
        assert!(parsed.gnss.is_some());
    }

    #[test]
    fn unknown_tags_produce_empty_message() {
        assert!(parse_line("garbage").is_empty());
        assert!(parse_line("").is_empty());
        assert!(parse_line("baro,1,2,3;;").is_empty());
    }

    #[test]
    fn later_duplicate_segment_wins() {
        let parsed = parse_line(
            "imu0,1,0,0,0,0,1,1,1,0,0,0;imu0,2,0,0,0,0,7,8,9,0,0,0",
        );
        let imu = parsed.imu0.unwrap();
        assert_eq!(imu.timestamp.sec, 2.0);
        assert_eq!(imu.angular_velocity, Vector3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn bad_numbers_become_nan() {
        let parsed = parse_line("gnss,abc,,12.5");
        let gnss = parsed.gnss.unwrap();
        assert!(gnss.latitude.is_nan());
        assert!(gnss.longitude.is_nan());
        assert_eq!(gnss.altitude, 12.5);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let parsed = parse_line("gnss,1,2,3,4,5");
        assert_eq!(parsed.gnss.unwrap().altitude, 3.0);
    }

    #[test]
    fn numeric_prefix_is_lenient() {
        assert_eq!(parse_field(" 42"), 42.0);
        assert_eq!(parse_field("3\r\n"), 3.0);
        assert_eq!(parse_field("\u{FEFF}1.5"), 1.5);
        assert_eq!(parse_field("12abc"), 12.0);
        assert_eq!(parse_field("-1.5e3x"), -1500.0);
        assert_eq!(parse_field("2e"), 2.0);
        assert_eq!(parse_field(".5"), 0.5);
        assert_eq!(parse_field("7."), 7.0);
        assert_eq!(parse_field("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_field("-").is_nan());
        assert!(parse_field(".").is_nan());
        assert!(parse_field("nan").is_nan());
        assert!(parse_field("x1").is_nan());
    }

    #[test]
    fn non_text_entry_is_rejected() {
        let result = parse_raw(&RawMessage::Other(json!({ "imu0": 1 })));
        assert!(matches!(result, Err(SensorError::UnexpectedParse(_))));
        assert!(parse_raw(&RawMessage::from("gnss,1,2,3")).is_ok());
    }
}
