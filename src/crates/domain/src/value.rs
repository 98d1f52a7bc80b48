use std::fmt::{self, Display};

// Helper macro to define aggregate ID newtypes and common trait impls
macro_rules! define_id {
    ($name:ident $(, $extra:ident)*) => {
        #[derive(Debug, Clone, PartialEq $(, $extra)*)]
        pub struct $name(i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(CounterId, Eq, Hash, Copy);

impl CounterId {
    /// Well-known identity used when the counter row is created.
    ///
    /// Identities are positive, so once this row exists it is also the first
    /// row in identity order.
    pub const CANONICAL: CounterId = CounterId(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_is_the_smallest_positive_identity() {
        assert_eq!(CounterId::CANONICAL.as_i64(), 1);
        assert_eq!(CounterId::from(1), CounterId::CANONICAL);
        assert_eq!(i64::from(CounterId::from(42)), 42);
        assert_eq!(CounterId::from(7).to_string(), "7");
    }
}
