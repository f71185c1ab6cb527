//! Core data models for the car price estimator
//!
//! The Feature Record is the one structured input the model sees. Field
//! names, their order and every categorical label are part of the
//! `car-features` schema that model artifacts are checked against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the feature schema emitted by this build
pub const SCHEMA_NAME: &str = "car-features";

/// Version of the feature schema emitted by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Field names exactly as the model was trained on them
pub mod fields {
    pub const BRAND: &str = "Brand";
    pub const CONDITION: &str = "Condition";
    pub const FUEL_TYPE: &str = "FuelType";
    pub const TRANSMISSION: &str = "Transmission";
    pub const DRIVE_TYPE: &str = "DriveType";
    pub const BODY_TYPE: &str = "BodyType";
    pub const ACCIDENT_HISTORY: &str = "AccidentHistory";
    pub const INSURANCE: &str = "Insurance";
    pub const REGISTRATION_STATUS: &str = "RegistrationStatus";
    pub const CAR_AGE: &str = "CarAge";
    pub const MILEAGE: &str = "Mileage(km)";
    pub const ENGINE_SIZE: &str = "EngineSize(L)";
    pub const HORSEPOWER: &str = "Horsepower";
    pub const TORQUE: &str = "Torque";
    pub const DOORS: &str = "Doors";
    pub const SEATS: &str = "Seats";
    pub const FUEL_EFFICIENCY: &str = "FuelEfficiency(L/100km)";
}

/// Error returned when a label is not part of a categorical domain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {field} (expected one of: {expected})")]
pub struct UnknownLabel {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:expr, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every variant, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Labels as the model was trained on them
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| UnknownLabel {
                        field: $field,
                        value: s.to_string(),
                        expected: Self::LABELS.join(", "),
                    })
            }
        }
    };
}

/// Integer-valued choice lists (Doors, Seats). Serialized as JSON numbers.
macro_rules! integer_choice {
    ($(#[$meta:meta])* $name:ident, $field:expr, { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const LABELS: &'static [&'static str] = &[$(stringify!($value)),+];

            pub fn value(&self) -> u8 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($value)),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> u8 {
                v.value()
            }
        }

        impl TryFrom<u8> for $name {
            type Error = UnknownLabel;

            fn try_from(n: u8) -> Result<Self, Self::Error> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.value() == n)
                    .ok_or_else(|| UnknownLabel {
                        field: $field,
                        value: n.to_string(),
                        expected: Self::LABELS.join(", "),
                    })
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| UnknownLabel {
                        field: $field,
                        value: s.to_string(),
                        expected: Self::LABELS.join(", "),
                    })
            }
        }
    };
}

categorical!(Brand, fields::BRAND, {
    Toyota => "Toyota",
    Honda => "Honda",
    Ford => "Ford",
    Bmw => "BMW",
    Mercedes => "Mercedes",
    Hyundai => "Hyundai",
    Kia => "Kia",
});

categorical!(Condition, fields::CONDITION, {
    New => "New",
    Used => "Used",
    Certified => "Certified",
});

categorical!(FuelType, fields::FUEL_TYPE, {
    Petrol => "Petrol",
    Diesel => "Diesel",
    Hybrid => "Hybrid",
    Electric => "Electric",
});

categorical!(Transmission, fields::TRANSMISSION, {
    Manual => "Manual",
    Automatic => "Automatic",
});

categorical!(DriveType, fields::DRIVE_TYPE, {
    Fwd => "FWD",
    Rwd => "RWD",
    Awd => "AWD",
});

categorical!(BodyType, fields::BODY_TYPE, {
    Sedan => "Sedan",
    Suv => "SUV",
    Hatchback => "Hatchback",
    Coupe => "Coupe",
});

categorical!(
    /// Used for both accident history and insurance
    YesNo, "Yes/No", {
    Yes => "Yes",
    No => "No",
});

categorical!(RegistrationStatus, fields::REGISTRATION_STATUS, {
    Registered => "Registered",
    Unregistered => "Unregistered",
});

integer_choice!(Doors, fields::DOORS, {
    Two => 2,
    Three => 3,
    Four => 4,
    Five => 5,
});

integer_choice!(Seats, fields::SEATS, {
    Two => 2,
    Four => 4,
    Five => 5,
    Seven => 7,
});

/// Kind of value a field carries, with its label domain where it has one
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Categorical(&'static [&'static str]),
    IntegerChoice(&'static [&'static str]),
    Integer,
    Float,
}

impl FieldKind {
    /// Labels a one-hot encoder must cover, if the field is a choice list
    pub fn labels(&self) -> Option<&'static [&'static str]> {
        match self {
            FieldKind::Categorical(labels) | FieldKind::IntegerChoice(labels) => Some(*labels),
            FieldKind::Integer | FieldKind::Float => None,
        }
    }

    /// Whether the field has a numeric value usable by scaling encoders
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldKind::Categorical(_))
    }
}

/// Definition of one schema field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Number of fields in a Feature Record
pub const FIELD_COUNT: usize = 17;

/// The `car-features` v1 schema, in record order
pub const FIELDS: [FieldDef; FIELD_COUNT] = [
    FieldDef { name: fields::BRAND, kind: FieldKind::Categorical(Brand::LABELS) },
    FieldDef { name: fields::CONDITION, kind: FieldKind::Categorical(Condition::LABELS) },
    FieldDef { name: fields::FUEL_TYPE, kind: FieldKind::Categorical(FuelType::LABELS) },
    FieldDef { name: fields::TRANSMISSION, kind: FieldKind::Categorical(Transmission::LABELS) },
    FieldDef { name: fields::DRIVE_TYPE, kind: FieldKind::Categorical(DriveType::LABELS) },
    FieldDef { name: fields::BODY_TYPE, kind: FieldKind::Categorical(BodyType::LABELS) },
    FieldDef { name: fields::ACCIDENT_HISTORY, kind: FieldKind::Categorical(YesNo::LABELS) },
    FieldDef { name: fields::INSURANCE, kind: FieldKind::Categorical(YesNo::LABELS) },
    FieldDef {
        name: fields::REGISTRATION_STATUS,
        kind: FieldKind::Categorical(RegistrationStatus::LABELS),
    },
    FieldDef { name: fields::CAR_AGE, kind: FieldKind::Integer },
    FieldDef { name: fields::MILEAGE, kind: FieldKind::Integer },
    FieldDef { name: fields::ENGINE_SIZE, kind: FieldKind::Float },
    FieldDef { name: fields::HORSEPOWER, kind: FieldKind::Integer },
    FieldDef { name: fields::TORQUE, kind: FieldKind::Integer },
    FieldDef { name: fields::DOORS, kind: FieldKind::IntegerChoice(Doors::LABELS) },
    FieldDef { name: fields::SEATS, kind: FieldKind::IntegerChoice(Seats::LABELS) },
    FieldDef { name: fields::FUEL_EFFICIENCY, kind: FieldKind::Float },
];

/// Look up a field's position in the record
pub fn field_index(name: &str) -> Option<usize> {
    FIELDS.iter().position(|f| f.name == name)
}

/// A single field value as seen by the feature encoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Category(&'static str),
    Choice { label: &'static str, value: i64 },
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// Label used for one-hot matching
    pub fn label(&self) -> Option<&'static str> {
        match self {
            FieldValue::Category(label) | FieldValue::Choice { label, .. } => Some(*label),
            _ => None,
        }
    }

    /// Numeric value used by scaling encoders
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Category(_) => None,
            FieldValue::Choice { value, .. } | FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Float(v) => Some(*v),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Category(label) | FieldValue::Choice { label, .. } => f.write_str(label),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Feature record submitted for one prediction
///
/// Serializes with the exact trained field names, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecord {
    #[serde(rename = "Brand")]
    pub brand: Brand,
    #[serde(rename = "Condition")]
    pub condition: Condition,
    #[serde(rename = "FuelType")]
    pub fuel_type: FuelType,
    #[serde(rename = "Transmission")]
    pub transmission: Transmission,
    #[serde(rename = "DriveType")]
    pub drive_type: DriveType,
    #[serde(rename = "BodyType")]
    pub body_type: BodyType,
    #[serde(rename = "AccidentHistory")]
    pub accident_history: YesNo,
    #[serde(rename = "Insurance")]
    pub insurance: YesNo,
    #[serde(rename = "RegistrationStatus")]
    pub registration_status: RegistrationStatus,
    #[serde(rename = "CarAge")]
    pub car_age: u32,
    #[serde(rename = "Mileage(km)")]
    pub mileage_km: u64,
    #[serde(rename = "EngineSize(L)")]
    pub engine_size_l: f64,
    #[serde(rename = "Horsepower")]
    pub horsepower: u32,
    #[serde(rename = "Torque")]
    pub torque: u32,
    #[serde(rename = "Doors")]
    pub doors: Doors,
    #[serde(rename = "Seats")]
    pub seats: Seats,
    #[serde(rename = "FuelEfficiency(L/100km)")]
    pub fuel_efficiency: f64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            brand: Brand::default(),
            condition: Condition::default(),
            fuel_type: FuelType::default(),
            transmission: Transmission::default(),
            drive_type: DriveType::default(),
            body_type: BodyType::default(),
            accident_history: YesNo::default(),
            insurance: YesNo::default(),
            registration_status: RegistrationStatus::default(),
            car_age: 3,
            mileage_km: 30_000,
            engine_size_l: 1.5,
            horsepower: 120,
            torque: 150,
            doors: Doors::default(),
            seats: Seats::default(),
            fuel_efficiency: 6.5,
        }
    }
}

impl FeatureRecord {
    /// Ordered `(name, value)` view of the record, matching [`FIELDS`]
    pub fn values(&self) -> [(&'static str, FieldValue); FIELD_COUNT] {
        [
            (fields::BRAND, FieldValue::Category(self.brand.label())),
            (fields::CONDITION, FieldValue::Category(self.condition.label())),
            (fields::FUEL_TYPE, FieldValue::Category(self.fuel_type.label())),
            (fields::TRANSMISSION, FieldValue::Category(self.transmission.label())),
            (fields::DRIVE_TYPE, FieldValue::Category(self.drive_type.label())),
            (fields::BODY_TYPE, FieldValue::Category(self.body_type.label())),
            (fields::ACCIDENT_HISTORY, FieldValue::Category(self.accident_history.label())),
            (fields::INSURANCE, FieldValue::Category(self.insurance.label())),
            (
                fields::REGISTRATION_STATUS,
                FieldValue::Category(self.registration_status.label()),
            ),
            (fields::CAR_AGE, FieldValue::Integer(self.car_age as i64)),
            // Saturates; mileage never wraps negative
            (
                fields::MILEAGE,
                FieldValue::Integer(i64::try_from(self.mileage_km).unwrap_or(i64::MAX)),
            ),
            (fields::ENGINE_SIZE, FieldValue::Float(self.engine_size_l)),
            (fields::HORSEPOWER, FieldValue::Integer(self.horsepower as i64)),
            (fields::TORQUE, FieldValue::Integer(self.torque as i64)),
            (
                fields::DOORS,
                FieldValue::Choice { label: self.doors.label(), value: self.doors.value() as i64 },
            ),
            (
                fields::SEATS,
                FieldValue::Choice { label: self.seats.label(), value: self.seats.value() as i64 },
            ),
            (fields::FUEL_EFFICIENCY, FieldValue::Float(self.fuel_efficiency)),
        ]
    }

    /// Value of a single field by its schema name
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        field_index(name).map(|i| self.values()[i].1)
    }
}

/// Price estimate returned by the predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub price: f64,
    pub model_version: String,
    pub generated_at: i64,
}
