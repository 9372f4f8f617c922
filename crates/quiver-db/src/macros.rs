//! Macros for declaring models.
//!
//! The [`define_model!`] macro generates a struct that embeds a
//! [`Record`](crate::model::Record) and implements [`Model`](crate::Model),
//! which in turn gives it the fluent and active-record methods.

/// Declares a model type.
///
/// # Syntax
///
/// ```ignore
/// define_model!(User);
/// define_model!(pub Account, table = "accounts");
/// define_model!(Person, table = "people", primary_key = "person_id");
/// ```
///
/// Without `table`, the table name is derived from the type name
/// (`FluentUser` maps to `fluent_user`); without `primary_key`, it is `id`.
///
/// The first form expands to roughly:
///
/// ```ignore
/// #[derive(Debug)]
/// struct User {
///     record: quiver_db::model::Record,
/// }
///
/// impl User {
///     pub fn new(registry: quiver_db::Registry) -> Self { ... }
/// }
///
/// impl quiver_db::Model for User { ... }
/// ```
///
/// # Usage
///
/// ```rust
/// use quiver_db::{define_model, Model, Registry};
///
/// define_model!(UserGroup);
/// define_model!(Legacy, table = "tbl_legacy", primary_key = "legacy_no");
///
/// let registry = Registry::new();
/// assert_eq!(UserGroup::new(registry.clone()).table_name(), "user_group");
///
/// let legacy = Legacy::new(registry);
/// assert_eq!(legacy.table_name(), "tbl_legacy");
/// assert_eq!(legacy.primary_key_name(), "legacy_no");
/// ```
#[macro_export]
macro_rules! define_model {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident
        $(, table = $table:literal)?
        $(, primary_key = $pk:literal)?
        $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        $vis struct $name {
            record: $crate::model::Record,
        }

        impl $name {
            /// An empty, transient model on the default connection.
            pub fn new(registry: $crate::Registry) -> Self {
                Self {
                    record: $crate::model::Record::new(registry),
                }
            }
        }

        impl $crate::model::Model for $name {
            fn record(&self) -> &$crate::model::Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut $crate::model::Record {
                &mut self.record
            }

            fn with_record(&self, record: $crate::model::Record) -> Self {
                Self { record }
            }

            $(
                fn table_name(&self) -> String {
                    $table.to_string()
                }
            )?

            $(
                fn primary_key_name(&self) -> String {
                    $pk.to_string()
                }
            )?
        }
    };
}
