//! # Attribute Modifiers
//!
//! Numeric player attributes (max health, attack speed) carry a base value
//! plus named modifiers. The rewards core owns exactly one modifier per
//! bonus and identifies it by a fixed [`ModifierId`].

use serde::{Deserialize, Serialize};

/// Attributes the core touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Maximum health.
    MaxHealth,
    /// Attack speed.
    AttackSpeed,
}

/// Stable modifier identity (a UUID in the host engine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u128);

/// Pure Heart max-health modifier.
pub const PURE_HEART_MODIFIER: ModifierId = ModifierId(0xa3d8_9f7e_5c8d_4f3a_9b2e_1d4c_6e8f_0a1b);

/// Attack speed reward modifier.
pub const ATTACK_SPEED_MODIFIER: ModifierId = ModifierId(0x5e1f_27c4_0b9a_4d6e_8f31_7a2c_c94d_11e8);

/// A single named additive modifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    /// Identity used for replace/remove.
    pub id: ModifierId,
    /// Display name.
    pub name: String,
    /// Amount added to the base value.
    pub amount: f64,
}

impl AttributeModifier {
    /// Creates an additive modifier.
    #[must_use]
    pub fn addition(id: ModifierId, name: impl Into<String>, amount: f64) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
        }
    }
}

/// Host attribute instance.
pub trait AttributeHandle {
    /// Unmodified value.
    fn base_value(&self) -> f64;

    /// All modifiers currently attached.
    fn modifiers(&self) -> &[AttributeModifier];

    /// Attaches a modifier. Callers remove any previous one with the same id first.
    fn add_modifier(&mut self, modifier: AttributeModifier);

    /// Detaches and returns the modifier with `id`.
    fn remove_modifier(&mut self, id: ModifierId) -> Option<AttributeModifier>;

    /// The modifier with `id`, if attached.
    fn modifier(&self, id: ModifierId) -> Option<&AttributeModifier> {
        self.modifiers().iter().find(|m| m.id == id)
    }

    /// Effective value: the base plus every modifier amount.
    fn value(&self) -> f64 {
        self.base_value() + self.modifiers().iter().map(|m| m.amount).sum::<f64>()
    }
}

/// In-memory attribute instance.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInstance {
    base: f64,
    modifiers: Vec<AttributeModifier>,
}

impl AttributeInstance {
    /// Creates an attribute with `base` and no modifiers.
    #[must_use]
    pub const fn new(base: f64) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    /// Adds a modifier, builder style.
    #[must_use]
    pub fn with_modifier(mut self, modifier: AttributeModifier) -> Self {
        self.add_modifier(modifier);
        self
    }
}

impl AttributeHandle for AttributeInstance {
    fn base_value(&self) -> f64 {
        self.base
    }

    fn modifiers(&self) -> &[AttributeModifier] {
        &self.modifiers
    }

    fn add_modifier(&mut self, modifier: AttributeModifier) {
        self.modifiers.retain(|m| m.id != modifier.id);
        self.modifiers.push(modifier);
    }

    fn remove_modifier(&mut self, id: ModifierId) -> Option<AttributeModifier> {
        let index = self.modifiers.iter().position(|m| m.id == id)?;
        Some(self.modifiers.remove(index))
    }
}
