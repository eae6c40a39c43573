//! Payload checks that run before anything touches the database.

use crate::error::{ErrorCode, ErrorStruct};
use crate::model::{ConfigNodeChanges, DeviceChanges, NewConfigNode, NewDevice, Patch};

pub struct RequestValidator;

impl RequestValidator {
    /// Non-blank, no control characters.
    pub fn name(field: &str, value: &str) -> Result<(), ErrorStruct> {
        if value.trim().is_empty() {
            return Err(ErrorCode::RequestBodyLack.at(&[field]).with_input(value));
        }
        if value.chars().any(char::is_control) {
            return Err(ErrorCode::RequestBodyContainsInvalidChar
                .at(&[field])
                .with_input(value));
        }
        Ok(())
    }

    /// Must be a well-formed JSON document.
    pub fn json_document(field: &str, value: &str) -> Result<(), ErrorStruct> {
        serde_json::from_str::<serde_json::Value>(value).map_err(|e| {
            ErrorCode::RequestBodyInvalid
                .at(&[field])
                .with_input(value)
                .with_ctx(
                    [("error".to_string(), e.to_string().into())]
                        .into_iter()
                        .collect(),
                )
        })?;
        Ok(())
    }

    pub fn new_config_node(new: &NewConfigNode) -> Result<(), ErrorStruct> {
        Self::name("name", &new.name)?;
        Self::json_document("autoinstall_config", &new.autoinstall_config)
    }

    pub fn config_node_changes(changes: &ConfigNodeChanges) -> Result<(), ErrorStruct> {
        match &changes.name {
            Patch::Value(name) => Self::name("name", name)?,
            Patch::Null => return Err(ErrorCode::RequestBodyLack.at(&["name"])),
            Patch::Undefined => {}
        }
        match &changes.autoinstall_config {
            Patch::Value(config) => Self::json_document("autoinstall_config", config)?,
            Patch::Null => return Err(ErrorCode::RequestBodyLack.at(&["autoinstall_config"])),
            Patch::Undefined => {}
        }
        Ok(())
    }

    pub fn new_device(new: &NewDevice) -> Result<(), ErrorStruct> {
        Self::name("name", &new.name)
    }

    pub fn device_changes(changes: &DeviceChanges) -> Result<(), ErrorStruct> {
        match &changes.name {
            Patch::Value(name) => Self::name("name", name)?,
            Patch::Null => return Err(ErrorCode::RequestBodyLack.at(&["name"])),
            Patch::Undefined => {}
        }
        if changes.config_node_id.is_null() {
            return Err(ErrorCode::RequestBodyLack.at(&["config_node_id"]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_missing() {
        let err = RequestValidator::name("name", "   ").unwrap_err();
        assert!(err.is(ErrorCode::RequestBodyLack));
        assert_eq!(err.loc, Some(vec!["name".to_string()]));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = RequestValidator::name("name", "a\u{0}b").unwrap_err();
        assert!(err.is(ErrorCode::RequestBodyContainsInvalidChar));
        assert!(RequestValidator::name("name", "Büro > 2").is_ok());
    }

    #[test]
    fn autoinstall_config_must_be_json() {
        let new = NewConfigNode {
            name: "A".into(),
            parent_id: None,
            autoinstall_config: "{not json".into(),
        };
        let err = RequestValidator::new_config_node(&new).unwrap_err();
        assert!(err.is(ErrorCode::RequestBodyInvalid));
        assert_eq!(err.loc, Some(vec!["autoinstall_config".to_string()]));

        let ok = NewConfigNode {
            autoinstall_config: r#"{"version": 1}"#.into(),
            ..new
        };
        assert!(RequestValidator::new_config_node(&ok).is_ok());
    }

    #[test]
    fn absent_fields_are_not_checked() {
        assert!(RequestValidator::config_node_changes(&ConfigNodeChanges::default()).is_ok());
        let changes = DeviceChanges {
            name: Patch::Value(String::new()),
            ..Default::default()
        };
        assert!(RequestValidator::device_changes(&changes).is_err());
    }

    #[test]
    fn null_for_required_field_is_lack() {
        let changes = ConfigNodeChanges {
            autoinstall_config: Patch::Null,
            ..Default::default()
        };
        let err = RequestValidator::config_node_changes(&changes).unwrap_err();
        assert!(err.is(ErrorCode::RequestBodyLack));
        assert_eq!(err.loc, Some(vec!["autoinstall_config".to_string()]));

        // parent_id is nullable.
        let detach = ConfigNodeChanges {
            parent_id: Patch::Null,
            ..Default::default()
        };
        assert!(RequestValidator::config_node_changes(&detach).is_ok());
    }
}
