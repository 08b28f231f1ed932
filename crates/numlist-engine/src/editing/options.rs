use serde::{Deserialize, Serialize};

use crate::editing::decoration::DecorationStyle;

/// How numbers are maintained after an item is added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenumberPolicy {
    /// Only a newly created item is numbered (`previous + 1`); later items
    /// keep their numbers.
    #[default]
    NewItemOnly,
    /// After every insertion or removal, walk the chain and renumber every
    /// following item.
    FollowChain,
}

/// Tunables for list tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Layout unit used to quantize caret y positions into line keys.
    pub line_key_unit: f64,
    pub renumber: RenumberPolicy,
    /// Extra bottom inset added on top of the on-screen keyboard height.
    pub keyboard_padding: f64,
    pub decoration: DecorationStyle,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            line_key_unit: 1.0,
            renumber: RenumberPolicy::default(),
            keyboard_padding: 100.0,
            decoration: DecorationStyle::default(),
        }
    }
}
