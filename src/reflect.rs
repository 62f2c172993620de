//! Metadata and accessors a target type exposes to the decoder.
//!
//! A decodable type implements [`Reflect`], which hands out a [`Target`]
//! view tagged with the value's [`Category`]. Aggregates describe their
//! members with static [`FieldInfo`] tables and give mutable access to a
//! member by id; scalars take over conversion from text.

use crate::formatting::FormattingMode;
use crate::scalar::ScalarError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Shape of a value, the key used to pick a decoding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sequence,
    Choice,
    Array,
    Simple,
    CustomizedType,
    Enumeration,
    NullableValue,
}

impl Category {
    /// Scalar categories can be decoded from a single run of text.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Category::Simple | Category::CustomizedType | Category::Enumeration
        )
    }
}

/// Static description of a sequence field or a choice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub id: i32,
    pub formatting: FormattingMode,
}

impl FieldInfo {
    pub const fn new(name: &'static str, id: i32, formatting: FormattingMode) -> Self {
        Self {
            name,
            id,
            formatting,
        }
    }
}

/// Find the element-bound entry called `name`.
///
/// Untagged entries have no element of their own and never match.
pub fn lookup_element<'f>(infos: &'f [FieldInfo], name: &str) -> Option<&'f FieldInfo> {
    infos
        .iter()
        .find(|info| info.name == name && !info.formatting.contains(FormattingMode::UNTAGGED))
}

/// Find the entry called `name`, whatever its flags.
pub fn lookup_name<'f>(infos: &'f [FieldInfo], name: &str) -> Option<&'f FieldInfo> {
    infos.iter().find(|info| info.name == name)
}

/// One named value of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerator {
    pub name: &'static str,
    pub value: i32,
}

impl Enumerator {
    pub const fn new(name: &'static str, value: i32) -> Self {
        Self { name, value }
    }
}

/// Mutable view of a value, tagged by category.
///
/// `Text` and `Bytes` are the string and byte-vector special cases of
/// `Simple` and `Array`; they can be encoded several ways, so the decoder
/// treats them separately.
pub enum Target<'a> {
    Sequence(&'a mut dyn SequenceValue),
    Choice(&'a mut dyn ChoiceValue),
    Array(&'a mut dyn ArrayValue),
    Bytes(&'a mut Vec<u8>),
    Simple(&'a mut dyn SimpleValue),
    Text(&'a mut String),
    Customized(&'a mut dyn CustomizedValue),
    Enumeration(&'a mut dyn EnumerationValue),
    Nullable(&'a mut dyn NullableValue),
}

impl Target<'_> {
    pub fn category(&self) -> Category {
        match self {
            Target::Sequence(_) => Category::Sequence,
            Target::Choice(_) => Category::Choice,
            Target::Array(_) | Target::Bytes(_) => Category::Array,
            Target::Simple(_) | Target::Text(_) => Category::Simple,
            Target::Customized(_) => Category::CustomizedType,
            Target::Enumeration(_) => Category::Enumeration,
            Target::Nullable(_) => Category::NullableValue,
        }
    }
}

/// A value the decoder can populate.
pub trait Reflect {
    fn target(&mut self) -> Target<'_>;

    /// View of a `Vec<Self>`. Overridden by `u8` so byte vectors are
    /// reported as [`Target::Bytes`].
    #[doc(hidden)]
    fn vec_target(vec: &mut Vec<Self>) -> Target<'_>
    where
        Self: Sized + Default,
    {
        Target::Array(vec)
    }
}

/// A struct-like aggregate with a fixed set of fields.
pub trait SequenceValue {
    fn fields(&self) -> &'static [FieldInfo];
    fn field_mut(&mut self, id: i32) -> Option<&mut dyn Reflect>;
}

/// A union-like aggregate with at most one active selection.
pub trait ChoiceValue {
    fn selections(&self) -> &'static [FieldInfo];
    /// Id of the active selection, `None` when nothing is selected.
    fn selection_id(&self) -> Option<i32>;
    /// Make `id` the active selection, dropping the previous one.
    ///
    /// Returns `false` for an id the choice does not know.
    fn make_selection(&mut self, id: i32) -> bool;
    fn selection_mut(&mut self) -> Option<&mut dyn Reflect>;
}

/// A growable homogeneous sequence.
pub trait ArrayValue {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&mut self);
    /// Drop every element from `len` on.
    fn truncate(&mut self, len: usize);
    /// Append a default element and return it.
    fn push_default(&mut self) -> &mut dyn Reflect;
    fn element_category(&self) -> Category;
}

/// A scalar converted from trimmed text.
pub trait SimpleValue {
    fn parse_text(&mut self, text: &str, mode: FormattingMode) -> Result<(), ScalarError>;
}

/// A scalar decoded through a base representation and then validated.
pub trait CustomizedValue {
    fn convert_from_text(&mut self, text: &str, mode: FormattingMode) -> Result<(), ScalarError>;
}

/// Implemented by restricted types built from a simple base type.
///
/// Every `Customized` type is a [`CustomizedValue`]; its `Reflect`
/// implementation returns `Target::Customized(self)`.
pub trait Customized: Sized {
    type Base: SimpleValue + Default;

    fn from_base(base: Self::Base) -> Result<Self, String>;
}

impl<C: Customized> CustomizedValue for C {
    fn convert_from_text(&mut self, text: &str, mode: FormattingMode) -> Result<(), ScalarError> {
        let mut base = C::Base::default();
        base.parse_text(text, mode)?;
        *self = C::from_base(base).map_err(ScalarError::Rejected)?;
        Ok(())
    }
}

/// A scalar restricted to a closed set of named values.
pub trait EnumerationValue {
    fn enumerators(&self) -> &'static [Enumerator];
    /// Returns `false` when `value` is not one of the enumerators.
    fn set_value(&mut self, value: i32) -> bool;

    /// Assign from an enumerator name or its integer value.
    fn set_from_token(&mut self, token: &str) -> bool {
        let by_name = self
            .enumerators()
            .iter()
            .find(|e| e.name == token)
            .map(|e| e.value);
        match by_name.or_else(|| token.parse::<i32>().ok()) {
            Some(value) => self.set_value(value),
            None => false,
        }
    }
}

/// A value that is either absent or holds one wrapped value.
pub trait NullableValue {
    fn is_null(&self) -> bool;
    /// Make the value present (default-constructed if it was absent) and return it.
    fn make_value(&mut self) -> &mut dyn Reflect;
    fn reset(&mut self);
}

/// Assign one scalar token to a scalar-shaped target.
///
/// Used for list items, which are decoded without a context of their own.
pub fn assign_scalar(target: Target<'_>, text: &str, mode: FormattingMode) -> Result<(), ScalarError> {
    match target {
        Target::Simple(value) => value.parse_text(text, mode),
        Target::Text(value) => value.parse_text(text, mode),
        Target::Customized(value) => value.convert_from_text(text, mode),
        Target::Enumeration(value) => {
            if value.set_from_token(text) {
                Ok(())
            } else {
                Err(ScalarError::Invalid { kind: "enumeration" })
            }
        }
        Target::Nullable(value) => assign_scalar(value.make_value().target(), text, mode),
        Target::Bytes(_) | Target::Array(_) | Target::Sequence(_) | Target::Choice(_) => {
            Err(ScalarError::Invalid { kind: "scalar" })
        }
    }
}

macro_rules! reflect_simple {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn target(&mut self) -> Target<'_> {
                    Target::Simple(self)
                }
            }
        )*
    };
}

reflect_simple!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<FixedOffset>,
);

impl Reflect for u8 {
    fn target(&mut self) -> Target<'_> {
        Target::Simple(self)
    }

    fn vec_target(vec: &mut Vec<u8>) -> Target<'_>
    where
        Self: Sized + Default,
    {
        Target::Bytes(vec)
    }
}

impl Reflect for String {
    fn target(&mut self) -> Target<'_> {
        Target::Text(self)
    }
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn target(&mut self) -> Target<'_> {
        T::vec_target(self)
    }
}

impl<T: Reflect + Default> ArrayValue for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        let index = Vec::len(self);
        self.push(T::default());
        &mut self[index]
    }

    fn element_category(&self) -> Category {
        let mut sample = T::default();
        sample.target().category()
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Nullable(self)
    }
}

impl<T: Reflect + Default> NullableValue for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn make_value(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn reset(&mut self) {
        *self = None;
    }
}
