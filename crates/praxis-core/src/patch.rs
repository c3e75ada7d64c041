//! [`Patch`] — a three-state field wrapper for partial updates.
//!
//! JSON update payloads need to distinguish "field absent" (leave the stored
//! value alone) from "field present with `null`" (clear the stored value).
//! A bare `Option` collapses the two; `Patch` keeps them apart:
//!
//! - field missing → [`Patch::Keep`] (via `#[serde(default)]`)
//! - field `null` → [`Patch::Clear`]
//! - field with a value → [`Patch::Set`]

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
  /// Leave the stored value unchanged.
  #[default]
  Keep,
  /// Clear the stored value to NULL.
  Clear,
  /// Overwrite the stored value.
  Set(T),
}

impl<T> Patch<T> {
  pub fn is_keep(&self) -> bool {
    matches!(self, Patch::Keep)
  }

  /// The value to write, given what is currently stored.
  pub fn resolve(self, current: Option<T>) -> Option<T> {
    match self {
      Patch::Keep => current,
      Patch::Clear => None,
      Patch::Set(v) => Some(v),
    }
  }

  /// The new value if this patch sets one.
  pub fn set(&self) -> Option<&T> {
    match self {
      Patch::Set(v) => Some(v),
      _ => None,
    }
  }
}

// Fields of this type must carry `#[serde(default)]` so that an absent key
// deserialises to `Keep` rather than failing.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(v) => Patch::Set(v),
      None => Patch::Clear,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Deserialize)]
  struct Payload {
    #[serde(default)]
    notes: Patch<String>,
  }

  #[test]
  fn absent_field_keeps() {
    let p: Payload = serde_json::from_str("{}").unwrap();
    assert_eq!(p.notes, Patch::Keep);
  }

  #[test]
  fn null_field_clears() {
    let p: Payload = serde_json::from_str(r#"{"notes":null}"#).unwrap();
    assert_eq!(p.notes, Patch::Clear);
  }

  #[test]
  fn value_field_sets() {
    let p: Payload = serde_json::from_str(r#"{"notes":"hello"}"#).unwrap();
    assert_eq!(p.notes, Patch::Set("hello".to_string()));
  }

  #[test]
  fn resolve_against_current() {
    let current = Some("old".to_string());
    assert_eq!(Patch::Keep.resolve(current.clone()), Some("old".to_string()));
    assert_eq!(Patch::<String>::Clear.resolve(current.clone()), None);
    assert_eq!(
      Patch::Set("new".to_string()).resolve(current),
      Some("new".to_string())
    );
  }
}
