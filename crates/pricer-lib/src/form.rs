//! Input collector: the form controls and their current values
//!
//! Each record field is shown as one control with a fixed domain and a
//! default. The only validation is what the control kind enforces on its
//! own: choice lists accept their options and nothing else, sliders clamp
//! to their bounds, the mileage field clamps at zero. Fields are never
//! checked against each other.

use crate::error::FormError;
use crate::models::{
    fields, BodyType, Brand, Condition, Doors, DriveType, FeatureRecord, FieldValue, FuelType,
    RegistrationStatus, Seats, Transmission, YesNo, FIELD_COUNT,
};
use serde::Serialize;
use std::str::FromStr;

/// Sidebar section a control is grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CarSpecifications,
    NumericDetails,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::CarSpecifications => "Car Specifications",
            Section::NumericDetails => "Numeric Details",
        }
    }
}

/// Kind of input control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlKind {
    Choice { options: &'static [&'static str] },
    Slider { min: f64, max: f64, step: f64 },
    /// Unbounded above
    Number { min: f64, step: f64 },
}

impl ControlKind {
    /// Clamp a numeric submission into the control's range
    pub fn clamp(&self, value: f64) -> f64 {
        match self {
            ControlKind::Slider { min, max, .. } => value.clamp(*min, *max),
            ControlKind::Number { min, .. } => value.max(*min),
            ControlKind::Choice { .. } => value,
        }
    }

    /// Integer controls step by whole units
    pub fn is_integral(&self) -> bool {
        match self {
            ControlKind::Slider { step, .. } | ControlKind::Number { step, .. } => step.fract() == 0.0,
            ControlKind::Choice { .. } => false,
        }
    }
}

/// One labeled form control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Control {
    pub field: &'static str,
    pub label: &'static str,
    pub section: Section,
    #[serde(flatten)]
    pub kind: ControlKind,
}

const fn choice(field: &'static str, label: &'static str, options: &'static [&'static str]) -> Control {
    Control {
        field,
        label,
        section: Section::CarSpecifications,
        kind: ControlKind::Choice { options },
    }
}

const fn slider(field: &'static str, label: &'static str, min: f64, max: f64, step: f64) -> Control {
    Control {
        field,
        label,
        section: Section::NumericDetails,
        kind: ControlKind::Slider { min, max, step },
    }
}

/// All controls, in display order (which is also record order)
pub const CONTROLS: [Control; FIELD_COUNT] = [
    choice(fields::BRAND, "Brand", Brand::LABELS),
    choice(fields::CONDITION, "Condition", Condition::LABELS),
    choice(fields::FUEL_TYPE, "Fuel Type", FuelType::LABELS),
    choice(fields::TRANSMISSION, "Transmission", Transmission::LABELS),
    choice(fields::DRIVE_TYPE, "Drive Type", DriveType::LABELS),
    choice(fields::BODY_TYPE, "Body Type", BodyType::LABELS),
    choice(fields::ACCIDENT_HISTORY, "Accident History", YesNo::LABELS),
    choice(fields::INSURANCE, "Insurance", YesNo::LABELS),
    choice(fields::REGISTRATION_STATUS, "Registration Status", RegistrationStatus::LABELS),
    slider(fields::CAR_AGE, "Car Age (years)", 0.0, 30.0, 1.0),
    Control {
        field: fields::MILEAGE,
        label: "Mileage (km)",
        section: Section::NumericDetails,
        kind: ControlKind::Number { min: 0.0, step: 1.0 },
    },
    slider(fields::ENGINE_SIZE, "Engine Size (L)", 0.8, 6.0, 0.01),
    slider(fields::HORSEPOWER, "Horsepower", 50.0, 1000.0, 1.0),
    slider(fields::TORQUE, "Torque", 50.0, 1500.0, 1.0),
    Control {
        field: fields::DOORS,
        label: "Doors",
        section: Section::NumericDetails,
        kind: ControlKind::Choice { options: Doors::LABELS },
    },
    Control {
        field: fields::SEATS,
        label: "Seats",
        section: Section::NumericDetails,
        kind: ControlKind::Choice { options: Seats::LABELS },
    },
    slider(fields::FUEL_EFFICIENCY, "Fuel Efficiency (L/100km)", 2.0, 20.0, 0.01),
];

/// Look up the control for a field
pub fn control(field: &str) -> Option<&'static Control> {
    CONTROLS.iter().find(|c| c.field == field)
}

/// Current values of every control
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    record: FeatureRecord,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// All controls at their defaults
    pub fn new() -> Self {
        Self {
            record: FeatureRecord::default(),
        }
    }

    /// Start from an existing record, clamping numbers as the controls would
    pub fn from_record(record: FeatureRecord) -> Self {
        let mut state = Self { record };
        state.clamp_numbers();
        state
    }

    fn clamp_numbers(&mut self) {
        let r = &mut self.record;
        r.car_age = clamp_int(fields::CAR_AGE, r.car_age as f64) as u32;
        r.mileage_km = clamp_int(fields::MILEAGE, r.mileage_km as f64) as u64;
        r.engine_size_l = clamp_float(fields::ENGINE_SIZE, r.engine_size_l);
        r.horsepower = clamp_int(fields::HORSEPOWER, r.horsepower as f64) as u32;
        r.torque = clamp_int(fields::TORQUE, r.torque as f64) as u32;
        r.fuel_efficiency = clamp_float(fields::FUEL_EFFICIENCY, r.fuel_efficiency);
    }

    /// Update one control from its submitted text
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        let control = control(field).ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        let raw = raw.trim();
        let r = &mut self.record;

        match control.field {
            fields::BRAND => r.brand = parse_choice::<Brand>(control, raw)?,
            fields::CONDITION => r.condition = parse_choice::<Condition>(control, raw)?,
            fields::FUEL_TYPE => r.fuel_type = parse_choice::<FuelType>(control, raw)?,
            fields::TRANSMISSION => r.transmission = parse_choice::<Transmission>(control, raw)?,
            fields::DRIVE_TYPE => r.drive_type = parse_choice::<DriveType>(control, raw)?,
            fields::BODY_TYPE => r.body_type = parse_choice::<BodyType>(control, raw)?,
            fields::ACCIDENT_HISTORY => r.accident_history = parse_choice::<YesNo>(control, raw)?,
            fields::INSURANCE => r.insurance = parse_choice::<YesNo>(control, raw)?,
            fields::REGISTRATION_STATUS => {
                r.registration_status = parse_choice::<RegistrationStatus>(control, raw)?
            }
            fields::DOORS => r.doors = parse_choice::<Doors>(control, raw)?,
            fields::SEATS => r.seats = parse_choice::<Seats>(control, raw)?,
            fields::CAR_AGE => r.car_age = parse_number(control, raw)? as u32,
            fields::MILEAGE => r.mileage_km = parse_number(control, raw)? as u64,
            fields::ENGINE_SIZE => r.engine_size_l = parse_number(control, raw)?,
            fields::HORSEPOWER => r.horsepower = parse_number(control, raw)? as u32,
            fields::TORQUE => r.torque = parse_number(control, raw)? as u32,
            fields::FUEL_EFFICIENCY => r.fuel_efficiency = parse_number(control, raw)?,
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Apply several submissions in order
    ///
    /// Every valid submission is applied. A rejected one leaves its control
    /// unchanged and is returned with the others that failed.
    pub fn apply<'a, I>(&mut self, submissions: I) -> Result<(), Vec<FormError>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let errors: Vec<FormError> = submissions
            .into_iter()
            .filter_map(|(field, raw)| self.set(field, raw).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Current value of one control
    pub fn value(&self, field: &str) -> Option<FieldValue> {
        self.record.value(field)
    }

    /// Assemble the Feature Record from the current values
    pub fn record(&self) -> FeatureRecord {
        self.record.clone()
    }
}

fn parse_choice<T>(control: &Control, raw: &str) -> Result<T, FormError>
where
    T: FromStr,
{
    raw.parse::<T>().map_err(|_| FormError::UnknownOption {
        field: control.field,
        value: raw.to_string(),
    })
}

/// Parse and clamp a numeric submission; integral controls reject fractions
fn parse_number(control: &Control, raw: &str) -> Result<f64, FormError> {
    let invalid = || FormError::InvalidNumber {
        field: control.field,
        value: raw.to_string(),
    };
    let value = if control.kind.is_integral() {
        raw.parse::<i64>().map_err(|_| invalid())? as f64
    } else {
        raw.parse::<f64>().map_err(|_| invalid())?
    };
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(control.kind.clamp(value))
}

fn clamp_int(field: &str, value: f64) -> f64 {
    clamp_float(field, value).round()
}

fn clamp_float(field: &str, value: f64) -> f64 {
    control(field).map(|c| c.kind.clamp(value)).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FIELDS;

    #[test]
    fn test_controls_cover_record_in_order() {
        let controls: Vec<&str> = CONTROLS.iter().map(|c| c.field).collect();
        let record: Vec<&str> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(controls, record);
    }

    #[test]
    fn test_sections() {
        assert_eq!(
            CONTROLS.iter().filter(|c| c.section == Section::CarSpecifications).count(),
            9
        );
        assert_eq!(control(fields::DOORS).unwrap().section, Section::NumericDetails);
        assert_eq!(Section::NumericDetails.title(), "Numeric Details");
    }

    #[test]
    fn test_new_form_holds_defaults() {
        let form = FormState::new();
        assert_eq!(form.record(), FeatureRecord::default());
        assert_eq!(form.value(fields::CAR_AGE), Some(FieldValue::Integer(3)));
        assert_eq!(form.value(fields::BRAND), Some(FieldValue::Category("Toyota")));
    }

    #[test]
    fn test_set_choice() {
        let mut form = FormState::new();
        form.set(fields::BRAND, "Mercedes").unwrap();
        form.set(fields::SEATS, "7").unwrap();
        assert_eq!(form.record().brand, Brand::Mercedes);
        assert_eq!(form.record().seats, Seats::Seven);
    }

    #[test]
    fn test_choice_rejects_unknown_option() {
        let mut form = FormState::new();
        let err = form.set(fields::DOORS, "6").unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownOption {
                field: fields::DOORS,
                value: "6".to_string()
            }
        );
        assert_eq!(form.record(), FeatureRecord::default());
    }

    #[test]
    fn test_sliders_clamp_to_bounds() {
        let mut form = FormState::new();
        form.set(fields::CAR_AGE, "45").unwrap();
        form.set(fields::HORSEPOWER, "10").unwrap();
        form.set(fields::ENGINE_SIZE, "7.25").unwrap();
        form.set(fields::FUEL_EFFICIENCY, "1.0").unwrap();
        let record = form.record();
        assert_eq!(record.car_age, 30);
        assert_eq!(record.horsepower, 50);
        assert_eq!(record.engine_size_l, 6.0);
        assert_eq!(record.fuel_efficiency, 2.0);
    }

    #[test]
    fn test_slider_boundaries_accepted() {
        let mut form = FormState::new();
        form.set(fields::CAR_AGE, "0").unwrap();
        assert_eq!(form.record().car_age, 0);
        form.set(fields::CAR_AGE, "30").unwrap();
        assert_eq!(form.record().car_age, 30);
    }

    #[test]
    fn test_mileage_has_no_upper_bound() {
        let mut form = FormState::new();
        form.set(fields::MILEAGE, "0").unwrap();
        assert_eq!(form.record().mileage_km, 0);
        form.set(fields::MILEAGE, "1500000").unwrap();
        assert_eq!(form.record().mileage_km, 1_500_000);
        form.set(fields::MILEAGE, "-20").unwrap();
        assert_eq!(form.record().mileage_km, 0);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut form = FormState::new();
        assert!(matches!(
            form.set(fields::CAR_AGE, "3.5"),
            Err(FormError::InvalidNumber { .. })
        ));
        assert!(form.set(fields::ENGINE_SIZE, "NaN").is_err());
        assert!(form.set(fields::TORQUE, "").is_err());
        assert_eq!(form.record(), FeatureRecord::default());
    }

    #[test]
    fn test_unknown_field() {
        let mut form = FormState::new();
        assert_eq!(
            form.set("Colour", "Red"),
            Err(FormError::UnknownField("Colour".to_string()))
        );
    }

    #[test]
    fn test_apply_keeps_valid_submissions_around_rejected_ones() {
        let mut form = FormState::new();
        let errors = form
            .apply([
                (fields::BRAND, "Kia"),
                (fields::DOORS, "9"),
                (fields::SEATS, "5"),
                (fields::TORQUE, "lots"),
            ])
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], FormError::UnknownOption { field: fields::DOORS, .. }));
        assert!(matches!(errors[1], FormError::InvalidNumber { field: fields::TORQUE, .. }));

        let record = form.record();
        assert_eq!(record.brand, Brand::Kia);
        assert_eq!(record.seats, Seats::Five);
        assert_eq!(record.doors, Doors::default());
        assert_eq!(record.torque, FeatureRecord::default().torque);
    }

    #[test]
    fn test_no_cross_field_validation() {
        let mut form = FormState::new();
        form.apply([(fields::DOORS, "2"), (fields::BODY_TYPE, "Sedan"), (fields::SEATS, "7")])
            .unwrap();
        assert_eq!(form.record().seats, Seats::Seven);
    }

    #[test]
    fn test_from_record_clamps() {
        let record = FeatureRecord {
            car_age: 90,
            torque: 20,
            engine_size_l: 0.1,
            ..FeatureRecord::default()
        };
        let form = FormState::from_record(record);
        assert_eq!(form.record().car_age, 30);
        assert_eq!(form.record().torque, 50);
        assert_eq!(form.record().engine_size_l, 0.8);
    }

    #[test]
    fn test_from_record_keeps_huge_mileage_positive() {
        let record = FeatureRecord {
            mileage_km: u64::MAX,
            ..FeatureRecord::default()
        };
        let form = FormState::from_record(record);
        assert_eq!(form.value(fields::MILEAGE), Some(FieldValue::Integer(i64::MAX)));
    }

    #[test]
    fn test_schema_serialization() {
        let json = serde_json::to_value(control(fields::CAR_AGE).unwrap()).unwrap();
        assert_eq!(json["control"], "slider");
        assert_eq!(json["min"], 0.0);
        assert_eq!(json["max"], 30.0);
        assert_eq!(json["label"], "Car Age (years)");
        assert_eq!(json["section"], "numeric_details");
    }
}
