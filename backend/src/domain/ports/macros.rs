//! Helper macro for port error enums.

/// Declare a `thiserror` enum whose variants all carry named fields, plus a
/// snake_case constructor per variant taking each field as `impl Into<T>`.
///
/// ```ignore
/// define_port_error! {
///     pub enum StoreError {
///         Connection { message: String } => "connection failed: {message}",
///     }
/// }
/// let err = StoreError::connection("refused");
/// ```
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            ::paste::paste! {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
