use serde::{Deserialize, Serialize};

use crate::processing::smoothing::moving_average;
use crate::wire::reading::{GnssReading, ImuReading, Vector3};

/// Three equally long per-axis sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl AxisColumns {
    /// Appends all three components together so the axes never drift apart.
    pub fn push(&mut self, vector: &Vector3) {
        self.x.push(vector.x);
        self.y.push(vector.y);
        self.z.push(vector.z);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Applies the centered moving average to every axis.
    pub fn smoothed(&self, window_size: usize) -> Self {
        Self {
            x: moving_average(&self.x, window_size),
            y: moving_average(&self.y, window_size),
            z: moving_average(&self.z, window_size),
        }
    }

    fn latest(&self, max_points: usize) -> Self {
        Self {
            x: tail(&self.x, max_points),
            y: tail(&self.y, max_points),
            z: tail(&self.z, max_points),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImuColumns {
    pub angular_velocity: AxisColumns,
    pub linear_acceleration: AxisColumns,
}

impl ImuColumns {
    pub fn push(&mut self, reading: &ImuReading) {
        self.angular_velocity.push(&reading.angular_velocity);
        self.linear_acceleration.push(&reading.linear_acceleration);
    }

    pub fn len(&self) -> usize {
        self.angular_velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angular_velocity.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl From<&GnssReading> for GnssFix {
    fn from(reading: &GnssReading) -> Self {
        Self {
            latitude: reading.latitude,
            longitude: reading.longitude,
            altitude: reading.altitude,
        }
    }
}

/// Column-oriented result of one batch request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedBatch {
    pub imu0: ImuColumns,
    pub imu1: ImuColumns,
    pub gnss: Vec<GnssFix>,
}

impl AggregatedBatch {
    pub fn is_empty(&self) -> bool {
        self.imu0.is_empty() && self.imu1.is_empty() && self.gnss.is_empty()
    }

    /// Copy holding only the newest `max_points` entries of every sequence.
    pub fn latest(&self, max_points: usize) -> Self {
        Self {
            imu0: ImuColumns {
                angular_velocity: self.imu0.angular_velocity.latest(max_points),
                linear_acceleration: self.imu0.linear_acceleration.latest(max_points),
            },
            imu1: ImuColumns {
                angular_velocity: self.imu1.angular_velocity.latest(max_points),
                linear_acceleration: self.imu1.linear_acceleration.latest(max_points),
            },
            gnss: tail(&self.gnss, max_points),
        }
    }

    /// Appends another batch after this one, preserving input order.
    pub fn extend(&mut self, other: AggregatedBatch) {
        extend_axes(&mut self.imu0.angular_velocity, other.imu0.angular_velocity);
        extend_axes(&mut self.imu0.linear_acceleration, other.imu0.linear_acceleration);
        extend_axes(&mut self.imu1.angular_velocity, other.imu1.angular_velocity);
        extend_axes(&mut self.imu1.linear_acceleration, other.imu1.linear_acceleration);
        self.gnss.extend(other.gnss);
    }
}

fn extend_axes(target: &mut AxisColumns, source: AxisColumns) {
    target.x.extend(source.x);
    target.y.extend(source.y);
    target.z.extend(source.z);
}

fn tail<T: Clone>(values: &[T], max_points: usize) -> Vec<T> {
    let start = values.len().saturating_sub(max_points);
    values[start..].to_vec()
}
