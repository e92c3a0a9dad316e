//! "Provided value or fallback" resolution for optional fields

use duplicate::duplicate_item;
use std::borrow::Cow;

/// Type with a well-known unset value
pub trait Zero {
	fn is_zero(&self) -> bool;
}

impl Zero for String {
	fn is_zero(&self) -> bool {
		self.is_empty()
	}
}

impl Zero for &str {
	fn is_zero(&self) -> bool {
		self.is_empty()
	}
}

impl Zero for Cow<'_, str> {
	fn is_zero(&self) -> bool {
		self.is_empty()
	}
}

#[duplicate_item(
	int_type;
	[i8]; [i16]; [i32]; [i64]; [i128]; [isize];
	[u8]; [u16]; [u32]; [u64]; [u128]; [usize];
)]
impl Zero for int_type {
	fn is_zero(&self) -> bool {
		*self == 0
	}
}

// -0.0 compares equal to 0.0, NaN is never zero
#[duplicate_item(
	float_type;
	[f32]; [f64];
)]
impl Zero for float_type {
	fn is_zero(&self) -> bool {
		*self == 0.0
	}
}

impl<T> Zero for Option<T> {
	fn is_zero(&self) -> bool {
		self.is_none()
	}
}

/// Returns `fallback` if `provided` is unset, `provided` otherwise
///
/// `fallback` is returned verbatim, even if it is unset itself.
pub fn resolve<T: Zero>(provided: T, fallback: T) -> T {
	if provided.is_zero() {
		fallback
	} else {
		provided
	}
}
