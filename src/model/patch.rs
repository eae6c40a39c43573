//! Tri-state field for partial updates: absent, explicit null, or a value.

use serde::{Deserialize, Deserializer};

use crate::error::{ErrorCode, ErrorStruct};

/// Use with `#[serde(default)]` so a missing key deserializes to `Undefined`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Undefined,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Patch::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Patch::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply to a required field. Explicit null is rejected with `loc = [field]`.
    pub fn apply_required(self, field: &str, target: &mut T) -> Result<(), ErrorStruct> {
        match self {
            Patch::Undefined => Ok(()),
            Patch::Null => Err(ErrorCode::RequestBodyLack.at(&[field])),
            Patch::Value(v) => {
                *target = v;
                Ok(())
            }
        }
    }

    /// Apply to a nullable field. Explicit null clears it.
    pub fn apply_nullable(self, target: &mut Option<T>) {
        match self {
            Patch::Undefined => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Patch::Null, Patch::Value))
    }
}
