//! "Unspecified" sentinels for partially-updated fields.
//!
//! Every field of a world object starts out unspecified and is filled in as
//! updates arrive. Floats use NaN, small enumerations with no legal negative
//! value use -1, reference-typed fields use `None` and tri-states use
//! `BoolState::Unknown`. Keeping the convention behind one trait lets the
//! merge helpers below serve every field.

use artemis_core::BoolState;

/// A field type with a reserved "not specified" value.
pub trait Sentinel: Clone {
    /// The reserved value.
    const UNSPECIFIED: Self;

    /// Whether this value carries information.
    fn is_specified(&self) -> bool;
}

impl Sentinel for f32 {
    const UNSPECIFIED: Self = f32::NAN;

    fn is_specified(&self) -> bool {
        !self.is_nan()
    }
}

impl Sentinel for i8 {
    const UNSPECIFIED: Self = -1;

    fn is_specified(&self) -> bool {
        *self != -1
    }
}

impl Sentinel for i32 {
    const UNSPECIFIED: Self = -1;

    fn is_specified(&self) -> bool {
        *self != -1
    }
}

impl Sentinel for BoolState {
    const UNSPECIFIED: Self = BoolState::Unknown;

    fn is_specified(&self) -> bool {
        self.is_known()
    }
}

impl<T: Clone> Sentinel for Option<T> {
    const UNSPECIFIED: Self = None;

    fn is_specified(&self) -> bool {
        self.is_some()
    }
}

/// Overwrite `current` with `update` if the update is specified.
#[inline]
pub fn merge_field<T: Sentinel>(current: &mut T, update: &T) {
    if update.is_specified() {
        *current = update.clone();
    }
}

/// Slot-wise [`merge_field`] over fixed-size tables.
#[inline]
pub fn merge_slots<T: Sentinel, const N: usize>(current: &mut [T; N], update: &[T; N]) {
    for (slot, value) in current.iter_mut().zip(update) {
        merge_field(slot, value);
    }
}

/// Equality that treats any two unspecified values as equal.
///
/// NaN never compares equal to itself, so derived `PartialEq` would make
/// an unspecified float unequal to its own copy.
#[inline]
pub fn field_eq<T: Sentinel + PartialEq>(a: &T, b: &T) -> bool {
    match (a.is_specified(), b.is_specified()) {
        (false, false) => true,
        (true, true) => a == b,
        _ => false,
    }
}

/// Slot-wise [`field_eq`].
#[inline]
pub fn slots_eq<T: Sentinel + PartialEq, const N: usize>(a: &[T; N], b: &[T; N]) -> bool {
    a.iter().zip(b).all(|(x, y)| field_eq(x, y))
}

/// Whether a slice of values contains anything specified.
#[inline]
pub fn any_specified<T: Sentinel>(values: &[T]) -> bool {
    values.iter().any(Sentinel::is_specified)
}

/// Range-check a small enumerated value, allowing the -1 sentinel.
pub(crate) fn check_range(
    field: &'static str,
    value: i8,
    max: i8,
) -> Result<i8, crate::WorldError> {
    if value == i8::UNSPECIFIED || (0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(crate::WorldError::OutOfRange {
            field,
            value: i64::from(value),
        })
    }
}
