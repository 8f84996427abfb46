pub mod field_model;
pub mod fields;
pub mod widget;

pub use field_model::{FieldOptions, ScalarField};
pub use fields::{
    BooleanField, CharField, CharKind, ChoiceField, DateField, DecimalField, IntegerField,
};
pub use widget::{CheckboxInput, PasswordInput, Select, TextInput, Widget};
