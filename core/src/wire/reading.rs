use serde::{Deserialize, Serialize};

/// Tag carried in field 0 of every segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorTag {
    Imu0,
    Imu1,
    Gnss,
    Unknown,
}

impl SensorTag {
    pub fn from_field(field: &str) -> Self {
        match field {
            "imu0" => SensorTag::Imu0,
            "imu1" => SensorTag::Imu1,
            "gnss" => SensorTag::Gnss,
            _ => SensorTag::Unknown,
        }
    }

    /// Minimum number of comma-separated fields, tag included.
    pub fn required_fields(self) -> usize {
        match self {
            SensorTag::Imu0 | SensorTag::Imu1 => 12,
            SensorTag::Gnss => 4,
            SensorTag::Unknown => 0,
        }
    }
}

/// Which of the two inertial units produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImuId {
    Imu0,
    Imu1,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Sensor timestamp split the way the producer emits it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub sec: f64,
    pub nsec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuReading {
    pub imu: ImuId,
    pub timestamp: Timestamp,
    pub orientation: Vector3,
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssReading {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Readings decoded from one raw line, at most one per tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub imu0: Option<ImuReading>,
    pub imu1: Option<ImuReading>,
    pub gnss: Option<GnssReading>,
}

impl ParsedMessage {
    pub fn is_empty(&self) -> bool {
        self.imu0.is_none() && self.imu1.is_none() && self.gnss.is_none()
    }

    /// Stores an IMU reading in its slot, replacing any earlier one.
    pub fn set_imu(&mut self, reading: ImuReading) {
        match reading.imu {
            ImuId::Imu0 => self.imu0 = Some(reading),
            ImuId::Imu1 => self.imu1 = Some(reading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_is_exact() {
        assert_eq!(SensorTag::from_field("imu0"), SensorTag::Imu0);
        assert_eq!(SensorTag::from_field("gnss"), SensorTag::Gnss);
        assert_eq!(SensorTag::from_field("IMU0"), SensorTag::Unknown);
        assert_eq!(SensorTag::from_field(""), SensorTag::Unknown);
    }

    #[test]
    fn set_imu_overwrites_same_slot() {
        let mut parsed = ParsedMessage::default();
        let mut reading = ImuReading {
            imu: ImuId::Imu1,
            timestamp: Timestamp::default(),
            orientation: Vector3::default(),
            angular_velocity: Vector3::new(1.0, 1.0, 1.0),
            linear_acceleration: Vector3::default(),
        };
        parsed.set_imu(reading.clone());
        reading.angular_velocity = Vector3::new(2.0, 2.0, 2.0);
        parsed.set_imu(reading);

        assert!(parsed.imu0.is_none());
        assert_eq!(parsed.imu1.unwrap().angular_velocity.x, 2.0);
    }
}
