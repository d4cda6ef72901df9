//! Appointment form input for no-show prediction.
//!
//! Encodes the human-facing choices (gender, SMS reminder, shift) into the
//! integer codes the trained model was fitted on. The result is a
//! `RawInputRecord`; slot order is the schema's business, not the form's.

use serde::{Deserialize, Serialize};

use super::record::RawInputRecord;

/// Field names as emitted into the raw record.
pub mod field {
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const SMS_RECEIVED: &str = "SMSreceived";
    pub const SPECIALTY: &str = "specialty";
    pub const PLACE: &str = "place";
    pub const APPOINTMENT_SHIFT: &str = "appointment_shift";
}

/// Oldest age the form accepts.
pub const MAX_AGE: u32 = 100;

/// Error for a textual choice that matches no known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ChoiceError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Male = 1, Female = 0.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 0,
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(ChoiceError {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// Time of day the appointment is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    /// Morning = 0, Afternoon = 1, Evening = 2.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Morning => 0,
            Self::Afternoon => 1,
            Self::Evening => 2,
        }
    }
}

impl std::str::FromStr for Shift {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            _ => Err(ChoiceError {
                kind: "shift",
                value: s.to_string(),
            }),
        }
    }
}

/// Parse a yes/no answer.
///
/// # Errors
/// Returns `ChoiceError` for anything other than yes/no (y/n, true/false).
pub fn parse_yes_no(s: &str) -> Result<bool, ChoiceError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        _ => Err(ChoiceError {
            kind: "yes/no answer",
            value: s.to_string(),
        }),
    }
}

/// Human-friendly appointment details as entered by staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentForm {
    /// Age in years (0-100)
    pub age: u32,

    pub gender: Gender,

    /// Whether an SMS reminder was sent
    pub sms_received: bool,

    /// Medical specialty code
    pub specialty: u32,

    /// City code
    pub place: u32,

    pub shift: Shift,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self {
            age: 35,
            gender: Gender::Male,
            sms_received: true,
            specialty: 1,
            place: 1,
            shift: Shift::Morning,
        }
    }
}

impl AppointmentForm {
    /// Validate that all fields are within expected ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.age > MAX_AGE {
            errors.push(format!("Age {} out of range [0, {MAX_AGE}]", self.age));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Encode into a raw record keyed by model column names.
    #[must_use]
    pub fn to_record(&self) -> RawInputRecord {
        RawInputRecord::new()
            .with(field::AGE, self.age)
            .with(field::GENDER, self.gender.code())
            .with(field::SMS_RECEIVED, i64::from(self.sms_received))
            .with(field::SPECIALTY, self.specialty)
            .with(field::PLACE, self.place)
            .with(field::APPOINTMENT_SHIFT, self.shift.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RawValue;

    #[test]
    fn test_encodings() {
        assert_eq!(Gender::Male.code(), 1);
        assert_eq!(Gender::Female.code(), 0);
        assert_eq!(Shift::Morning.code(), 0);
        assert_eq!(Shift::Afternoon.code(), 1);
        assert_eq!(Shift::Evening.code(), 2);
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("FEMALE".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" Evening ".parse::<Shift>(), Ok(Shift::Evening));
        assert_eq!(parse_yes_no("Yes"), Ok(true));
        assert_eq!(parse_yes_no("no"), Ok(false));
        assert!("night".parse::<Shift>().is_err());
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn test_to_record() {
        let form = AppointmentForm {
            age: 62,
            gender: Gender::Female,
            sms_received: false,
            specialty: 4,
            place: 17,
            shift: Shift::Afternoon,
        };
        let record = form.to_record();

        assert_eq!(record.len(), 6);
        assert_eq!(record.get(field::AGE), Some(&RawValue::Integer(62)));
        assert_eq!(record.get(field::GENDER), Some(&RawValue::Integer(0)));
        assert_eq!(record.get(field::SMS_RECEIVED), Some(&RawValue::Integer(0)));
        assert_eq!(record.get(field::SPECIALTY), Some(&RawValue::Integer(4)));
        assert_eq!(record.get(field::PLACE), Some(&RawValue::Integer(17)));
        assert_eq!(
            record.get(field::APPOINTMENT_SHIFT),
            Some(&RawValue::Integer(1))
        );
    }

    #[test]
    fn test_validation() {
        assert!(AppointmentForm::default().validate().is_ok());

        let invalid = AppointmentForm {
            age: 130,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }
}
