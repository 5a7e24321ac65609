use legends_api::NewRegistration;
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

/// Optional leading `+`, then 10 to 15 digits. Whitespace anywhere is ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&compact)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    TeamName,
    Participant1,
    Participant2,
    Phone1,
    Phone2,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::TeamName,
        FormField::Participant1,
        FormField::Participant2,
        FormField::Phone1,
        FormField::Phone2,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::TeamName => "Team Name",
            FormField::Participant1 => "Participant 1",
            FormField::Participant2 => "Participant 2",
            FormField::Phone1 => "Phone 1",
            FormField::Phone2 => "Phone 2",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please generate a unique code first!")]
    MissingCode,
    #[error("Please fill in all required fields!")]
    MissingField(FormField),
    #[error("Please enter valid phone numbers!")]
    InvalidPhone(FormField),
}

impl ValidationError {
    /// A missing code is a nudge, the rest are errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationError::MissingCode)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub team_name: String,
    pub participant1: String,
    pub participant2: String,
    pub phone1: String,
    pub phone2: String,
    pub focus: FormField,
    /// A registration request is in flight; submit is disabled.
    pub submitting: bool,
}

impl RegistrationForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::TeamName => &self.team_name,
            FormField::Participant1 => &self.participant1,
            FormField::Participant2 => &self.participant2,
            FormField::Phone1 => &self.phone1,
            FormField::Phone2 => &self.phone2,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::TeamName => &mut self.team_name,
            FormField::Participant1 => &mut self.participant1,
            FormField::Participant2 => &mut self.participant2,
            FormField::Phone1 => &mut self.phone1,
            FormField::Phone2 => &mut self.phone2,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() {
            self.value_mut(self.focus).push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.value_mut(self.focus).pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Clears every field. Focus returns to the first one.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks the form against the held code and builds the request body.
    /// Fields are trimmed; phones are sent as typed (trimmed).
    pub fn validate(&self, held_code: Option<&str>) -> Result<NewRegistration, ValidationError> {
        if held_code.is_none_or(|code| code.trim().is_empty()) {
            return Err(ValidationError::MissingCode);
        }

        if let Some(field) = FormField::ALL
            .into_iter()
            .find(|f| self.value(*f).trim().is_empty())
        {
            return Err(ValidationError::MissingField(field));
        }

        for field in [FormField::Phone1, FormField::Phone2] {
            if !is_valid_phone(self.value(field)) {
                return Err(ValidationError::InvalidPhone(field));
            }
        }

        Ok(NewRegistration {
            participant1: self.participant1.trim().to_string(),
            participant2: self.participant2.trim().to_string(),
            phone1: self.phone1.trim().to_string(),
            phone2: self.phone2.trim().to_string(),
            team_name: self.team_name.trim().to_string(),
        })
    }
}
