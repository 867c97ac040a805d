//! Lenient claim value conversion.
//!
//! Claim values are strings; session fields are typed. A value that does not
//! convert yields the target's zero value and no error.

use uuid::Uuid;

use tenantry_core::{TenantId, UserId};

/// Conversion from a raw claim value.
pub trait FromClaim: Sized {
    /// `None` when the value is not a valid `Self`.
    fn from_claim(value: &str) -> Option<Self>;
}

/// Convert a (possibly missing) claim value, falling back to `T::default()`.
pub fn convert_or_default<T: FromClaim + Default>(value: Option<&str>) -> T {
    value.and_then(T::from_claim).unwrap_or_default()
}

impl FromClaim for String {
    fn from_claim(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromClaim for bool {
    fn from_claim(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

macro_rules! impl_from_claim_parse {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromClaim for $t {
                fn from_claim(value: &str) -> Option<Self> {
                    value.trim().parse().ok()
                }
            }
        )*
    };
}

impl_from_claim_parse!(i16, i32, i64, u16, u32, u64, Uuid, TenantId, UserId);

/// Nullable targets: a bad value becomes `None` rather than failing.
impl<T: FromClaim> FromClaim for Option<T> {
    fn from_claim(value: &str) -> Option<Self> {
        Some(T::from_claim(value))
    }
}
