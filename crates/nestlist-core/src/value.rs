//! Values written to and read from nested lists.
//!
//! - [`Storable`] is what callers write: a string-convertible value, an
//!   existing list handle, or a sequence that becomes an anonymous sublist.
//! - [`Element`] is what a slot reads back as: a plain string or a handle.
//! - [`FlatValue`] is the fully materialized form with no handles left.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ListError, ListResult};
use crate::list::NestedList;

/// A value accepted by `set`, `push` and `append_many`.
///
/// Types opt in through `From` impls; anything implementing
/// [`Display`](fmt::Display) can opt in explicitly with
/// [`Storable::display`].
#[derive(Clone, Debug, PartialEq)]
pub enum Storable {
    /// Stored verbatim.
    Value(String),
    /// Stored as the list's reference token.
    List(NestedList),
    /// Stored as a new anonymous list holding each item, in order.
    Seq(Vec<Storable>),
}

impl Storable {
    /// Store any displayable value by its string representation.
    pub fn display(value: &impl fmt::Display) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Storable {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Storable {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<&String> for Storable {
    fn from(value: &String) -> Self {
        Self::Value(value.clone())
    }
}

macro_rules! storable_via_to_string {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Storable {
                fn from(value: $ty) -> Self {
                    Self::Value(value.to_string())
                }
            }
        )*
    };
}

storable_via_to_string!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl From<NestedList> for Storable {
    fn from(list: NestedList) -> Self {
        Self::List(list)
    }
}

impl From<&NestedList> for Storable {
    fn from(list: &NestedList) -> Self {
        Self::List(list.clone())
    }
}

impl<T: Into<Storable>> From<Vec<T>> for Storable {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Storable>, const N: usize> From<[T; N]> for Storable {
    fn from(items: [T; N]) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Storable>> From<&[T]> for Storable {
    fn from(items: &[T]) -> Self {
        Self::Seq(items.iter().cloned().map(Into::into).collect())
    }
}

impl From<Element> for Storable {
    fn from(element: Element) -> Self {
        match element {
            Element::Value(v) => Self::Value(v),
            Element::List(list) => Self::List(list),
        }
    }
}

impl From<FlatValue> for Storable {
    fn from(value: FlatValue) -> Self {
        match value {
            FlatValue::Value(v) => Self::Value(v),
            FlatValue::List(items) => items.into(),
        }
    }
}

impl TryFrom<serde_json::Value> for Storable {
    type Error = ListError;

    /// Strings, numbers and booleans store as strings, arrays as sublists.
    /// `null` and objects have no list representation.
    fn try_from(value: serde_json::Value) -> ListResult<Self> {
        use serde_json::Value as Json;

        match value {
            Json::String(s) => Ok(Self::Value(s)),
            Json::Number(n) => Ok(Self::Value(n.to_string())),
            Json::Bool(b) => Ok(Self::Value(b.to_string())),
            Json::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<ListResult<Vec<_>>>()
                .map(Self::Seq),
            Json::Null => Err(ListError::TypeNotStorable("null".into())),
            Json::Object(map) => Err(ListError::TypeNotStorable(format!(
                "object with {} fields",
                map.len()
            ))),
        }
    }
}

/// One slot of a list as read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// A plain string value.
    Value(String),
    /// A handle to the list the slot references.
    List(NestedList),
}

impl Element {
    /// The plain value, if this slot holds one.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::List(_) => None,
        }
    }

    /// The referenced list, if this slot holds one.
    pub fn as_list(&self) -> Option<&NestedList> {
        match self {
            Self::List(list) => Some(list),
            Self::Value(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl PartialEq<str> for Element {
    fn eq(&self, other: &str) -> bool {
        self.as_value() == Some(other)
    }
}

impl PartialEq<&str> for Element {
    fn eq(&self, other: &&str) -> bool {
        self.as_value() == Some(*other)
    }
}

impl PartialEq<NestedList> for Element {
    fn eq(&self, other: &NestedList) -> bool {
        self.as_list() == Some(other)
    }
}

/// A deeply materialized value containing no references.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatValue {
    Value(String),
    List(Vec<FlatValue>),
}

impl FlatValue {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FlatValue]> {
        match self {
            Self::List(items) => Some(items),
            Self::Value(_) => None,
        }
    }
}

impl From<&str> for FlatValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for FlatValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl<T: Into<FlatValue>> From<Vec<T>> for FlatValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl PartialEq<str> for FlatValue {
    fn eq(&self, other: &str) -> bool {
        self.as_value() == Some(other)
    }
}

impl PartialEq<&str> for FlatValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_value() == Some(*other)
    }
}

impl From<&FlatValue> for serde_json::Value {
    fn from(value: &FlatValue) -> Self {
        match value {
            FlatValue::Value(v) => Self::String(v.clone()),
            FlatValue::List(items) => Self::Array(items.iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_store_as_strings() {
        assert_eq!(Storable::from("a"), Storable::Value("a".into()));
        assert_eq!(Storable::from(42u32), Storable::Value("42".into()));
        assert_eq!(Storable::from(-7i64), Storable::Value("-7".into()));
        assert_eq!(Storable::from(1.5f64), Storable::Value("1.5".into()));
        assert_eq!(Storable::from(true), Storable::Value("true".into()));
        assert_eq!(Storable::from('x'), Storable::Value("x".into()));
    }

    #[test]
    fn display_opt_in() {
        struct Point(i32, i32);
        impl fmt::Display for Point {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}, {})", self.0, self.1)
            }
        }
        assert_eq!(
            Storable::display(&Point(1, 2)),
            Storable::Value("(1, 2)".into())
        );
    }

    #[test]
    fn nested_vectors_become_sequences() {
        let s: Storable = vec![vec!["a", "b"], vec!["c"]].into();
        assert_eq!(
            s,
            Storable::Seq(vec![
                Storable::Seq(vec!["a".into(), "b".into()]),
                Storable::Seq(vec!["c".into()]),
            ])
        );
        let from_slice: Storable = (&["x", "y"][..]).into();
        assert_eq!(from_slice, Storable::from(["x", "y"]));
    }

    #[test]
    fn flat_value_converts_back_to_storable() {
        let flat: FlatValue = vec![FlatValue::from("a"), vec!["b"].into()].into();
        assert_eq!(
            Storable::from(flat),
            Storable::Seq(vec!["a".into(), Storable::Seq(vec!["b".into()])])
        );
    }

    #[test]
    fn json_scalars_and_arrays_are_storable() {
        let s = Storable::try_from(json!(["a", 1, true, ["b"]])).unwrap();
        assert_eq!(
            s,
            Storable::Seq(vec![
                "a".into(),
                "1".into(),
                "true".into(),
                Storable::Seq(vec!["b".into()]),
            ])
        );
    }

    #[test]
    fn json_null_and_objects_are_not_storable() {
        assert!(matches!(
            Storable::try_from(json!(null)),
            Err(ListError::TypeNotStorable(_))
        ));
        assert!(matches!(
            Storable::try_from(json!({"k": "v"})),
            Err(ListError::TypeNotStorable(_))
        ));
        assert!(matches!(
            Storable::try_from(json!(["ok", {"k": "v"}])),
            Err(ListError::TypeNotStorable(_))
        ));
    }

    #[test]
    fn flat_value_serializes_untagged() {
        let flat: FlatValue = vec![FlatValue::from("t1"), vec!["s1", "s2"].into()].into();
        assert_eq!(
            serde_json::to_value(&flat).unwrap(),
            json!(["t1", ["s1", "s2"]])
        );
        assert_eq!(serde_json::Value::from(&flat), json!(["t1", ["s1", "s2"]]));
        let parsed: FlatValue = serde_json::from_value(json!(["t1", ["s1", "s2"]])).unwrap();
        assert_eq!(parsed, flat);
    }

    #[test]
    fn flat_value_string_comparison() {
        assert_eq!(FlatValue::from("a"), "a");
        assert_ne!(FlatValue::from(vec!["a"]), "a");
    }
}
