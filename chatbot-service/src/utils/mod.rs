pub mod form;

pub use form::FormFields;
