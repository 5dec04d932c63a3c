//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// construct a new one. Constructors are the only place invariants are checked,
/// so an invalid value object can never exist.
///
/// Example:
/// - `Money` built from `1000/100` equals `Money` built from `10/1`
/// - a `Discount` with `end <= start` cannot be constructed
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
