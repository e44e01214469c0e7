use unicode_segmentation::UnicodeSegmentation;

const MIN_NAME_GRAPHEMES: usize = 2;
const TICKET_LEN: std::ops::RangeInclusive<usize> = 6..=12;

/// A validated registration, ready to be written to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    /// Uppercased
    pub ticket_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    #[error("YESS Ticket ID is required")]
    TicketRequired,
    #[error("Please enter a valid YESS Ticket ID")]
    TicketInvalid,
}

/// Per-field failures, so a form can show each one next to its input.
#[derive(Clone, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("Please fix the errors below")]
pub struct RegistrationErrors {
    pub name: Option<FieldError>,
    pub ticket_id: Option<FieldError>,
}

pub fn validate_registration(name: &str, ticket_id: &str) -> Result<Registration, RegistrationErrors> {
    let name = name.trim();
    let ticket_id = ticket_id.trim();

    let errors = RegistrationErrors {
        name: validate_name(name).err(),
        ticket_id: validate_ticket(ticket_id).err(),
    };

    if errors.name.is_some() || errors.ticket_id.is_some() {
        return Err(errors);
    }

    Ok(Registration {
        name: name.to_string(),
        ticket_id: ticket_id.to_ascii_uppercase(),
    })
}

fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if name.graphemes(true).count() < MIN_NAME_GRAPHEMES {
        return Err(FieldError::NameTooShort);
    }
    Ok(())
}

fn validate_ticket(ticket_id: &str) -> Result<(), FieldError> {
    if ticket_id.is_empty() {
        return Err(FieldError::TicketRequired);
    }
    if !TICKET_LEN.contains(&ticket_id.len()) || !ticket_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(FieldError::TicketInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_is_case_insensitive_and_uppercased() {
        for ticket in ["YESS001", "yess001", "  YeSs001 "] {
            let reg = validate_registration("Alice", ticket).unwrap();
            assert_eq!(reg.ticket_id, "YESS001");
        }
    }

    #[test]
    fn short_ticket_is_rejected() {
        let errors = validate_registration("Alice", "ab").unwrap_err();
        assert_eq!(errors.ticket_id, Some(FieldError::TicketInvalid));
        assert_eq!(errors.name, None);
    }

    #[test]
    fn ticket_rules() {
        assert!(validate_ticket("ABCDEF").is_ok());
        assert!(validate_ticket("ABCDEF123456").is_ok());
        assert_eq!(validate_ticket("ABCDEF1234567"), Err(FieldError::TicketInvalid));
        assert_eq!(validate_ticket("YESS-01"), Err(FieldError::TicketInvalid));
        // Six characters but non-ASCII digits are not allowed
        assert_eq!(validate_ticket("YESS٠١"), Err(FieldError::TicketInvalid));
        assert_eq!(validate_ticket(""), Err(FieldError::TicketRequired));
    }

    #[test]
    fn name_rules() {
        let errors = validate_registration("   ", "YESS001").unwrap_err();
        assert_eq!(errors.name, Some(FieldError::NameRequired));

        let errors = validate_registration("A", "YESS001").unwrap_err();
        assert_eq!(errors.name, Some(FieldError::NameTooShort));

        // One grapheme made of two code points is still too short
        let errors = validate_registration("e\u{301}", "YESS001").unwrap_err();
        assert_eq!(errors.name, Some(FieldError::NameTooShort));

        assert_eq!(validate_registration("  Al ", "YESS001").unwrap().name, "Al");
    }

    #[test]
    fn both_fields_reported_together() {
        let errors = validate_registration("", "").unwrap_err();
        assert_eq!(errors.name, Some(FieldError::NameRequired));
        assert_eq!(errors.ticket_id, Some(FieldError::TicketRequired));
    }
}
