//! Configuration errors

use super::FleetError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> FleetError {
    FleetError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> FleetError {
    FleetError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> FleetError {
    FleetError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a config read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> FleetError {
    FleetError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_fill_fields() {
        assert!(matches!(
            not_found("a.json"),
            FleetError::ConfigNotFound { path } if path == "a.json"
        ));
        assert!(matches!(
            parse_failed("a.json", "bad"),
            FleetError::ConfigParseFailed { reason, .. } if reason == "bad"
        ));
        assert!(matches!(
            invalid("no schedules"),
            FleetError::ConfigInvalid { message } if message == "no schedules"
        ));
        assert!(matches!(
            read_failed("a.json", "denied"),
            FleetError::ConfigReadFailed { path, .. } if path == "a.json"
        ));
    }
}
