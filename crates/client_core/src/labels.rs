//! Human readable labels for slider positions.

use std::fmt;

/// Label shown next to the cluster-count slider.
pub fn k_label(value: u32) -> String {
    if value == 0 {
        "Auto".to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BWeightLevel {
    None,
    Low,
    Medium,
    VeryHigh,
}

impl BWeightLevel {
    pub fn from_value(value: u32) -> Self {
        match value {
            0..=499 => BWeightLevel::None,
            500..=4_999 => BWeightLevel::Low,
            5_000..=15_000 => BWeightLevel::Medium,
            _ => BWeightLevel::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BWeightLevel::None => "None",
            BWeightLevel::Low => "Low",
            BWeightLevel::Medium => "Medium",
            BWeightLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for BWeightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label shown next to the golden-ratio weight slider.
pub fn b_weight_label(value: u32) -> &'static str {
    BWeightLevel::from_value(value).as_str()
}
