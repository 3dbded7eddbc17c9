use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::Coordinate;

const POSTAL_CODE_DIGITS: usize = 8;
const POSTAL_CODE_PREFIX: usize = 5;
const STATE_CODE_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDraft {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub complement: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub complement: Option<String>,
}

impl AddressDraft {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.latitude = Some(coordinate.latitude);
        self.longitude = Some(coordinate.longitude);
    }

    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn ensure_complete(&self) -> Result<(), AppError> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "missing required address fields: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn apply(&mut self, patch: AddressPatch) {
        let before = self.clone();

        if let Some(street) = patch.street {
            self.street = street;
        }
        if let Some(number) = patch.number {
            self.number = number;
        }
        if let Some(neighborhood) = patch.neighborhood {
            self.neighborhood = neighborhood;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(state) = patch.state {
            self.state = state.to_uppercase().chars().take(STATE_CODE_LEN).collect();
        }
        if let Some(postal_code) = patch.postal_code {
            self.postal_code = format_postal_code(&postal_code);
        }
        if let Some(complement) = patch.complement {
            self.complement = complement;
        }

        if format_address(self) != format_address(&before) {
            self.latitude = None;
            self.longitude = None;
        }
    }
}

pub fn format_address(draft: &AddressDraft) -> String {
    let mut address = format!("{}, {}", draft.street, draft.number);
    if !draft.complement.is_empty() {
        address.push_str(&format!(" ({})", draft.complement));
    }
    address.push_str(&format!(
        " - {}, {} - {}",
        draft.neighborhood, draft.city, draft.state
    ));
    if !draft.postal_code.is_empty() {
        address.push_str(", ");
        address.push_str(&draft.postal_code.replacen('-', "", 1));
    }
    address
}

/// Input mask for Brazilian CEP values: keeps at most eight digits and
/// inserts the hyphen after the fifth one. Never rejects input.
pub fn format_postal_code(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(POSTAL_CODE_DIGITS)
        .collect();

    if digits.len() <= POSTAL_CODE_PREFIX {
        digits
    } else {
        format!(
            "{}-{}",
            &digits[..POSTAL_CODE_PREFIX],
            &digits[POSTAL_CODE_PREFIX..]
        )
    }
}
