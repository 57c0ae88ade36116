//! JavaScript value representation.
//!
//! This module provides the core `Value` enum that represents all possible
//! JavaScript values the property-access core handles. Objects are referenced
//! by [`ObjectId`] handles into the object heap owned by the runtime.

use std::fmt;
use std::rc::Rc;

/// Largest valid array index (2^32 - 2).
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// Handle to an object living in the runtime's object heap.
///
/// Identity comparison of two handles is identity comparison of the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Index of this object in the heap arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Represents any JavaScript value.
///
/// Primitive values are stored inline, while objects are referenced by ID.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.5);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer (fits in 32 bits)
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(Rc<str>),
    /// Heap-allocated object
    Object(ObjectId),
}

impl Value {
    /// Creates a number value, using the `Smi` representation when the
    /// number is an integer that fits in 32 bits (and is not `-0`).
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::number(7.0), Value::Smi(7));
    /// assert_eq!(Value::number(0.5), Value::Double(0.5));
    /// ```
    pub fn number(n: f64) -> Self {
        if n.fract() == 0.0
            && n >= i32::MIN as f64
            && n <= i32::MAX as f64
            && !(n == 0.0 && n.is_sign_negative())
        {
            Value::Smi(n as i32)
        } else {
            Value::Double(n)
        }
    }

    /// Creates a string value.
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// Returns whether this value is truthy in JavaScript semantics.
    ///
    /// ```
    /// use core_types::{ObjectId, Value};
    ///
    /// assert!(!Value::Undefined.is_truthy());
    /// assert!(!Value::Smi(0).is_truthy());
    /// assert!(!Value::Double(f64::NAN).is_truthy());
    /// assert!(!Value::string("").is_truthy());
    /// assert!(Value::Object(ObjectId(0)).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) => *n != 0,
            Value::Double(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Returns the JavaScript typeof result for this value.
    ///
    /// Callable objects cannot be told apart from plain objects without the
    /// heap, so every object reports `"object"` here.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// True for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// True if this value is an object reference.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the object handle if this value is an object.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the numeric value for `Smi` and `Double`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Smi(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts this value to an array index if it is one.
    ///
    /// Numbers qualify when they are non-negative integers no larger than
    /// [`MAX_ARRAY_INDEX`]; strings qualify when they are the canonical
    /// decimal spelling of such an integer (`"7"`, but not `"07"` or `"7.0"`).
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::Smi(3).to_array_index(), Some(3));
    /// assert_eq!(Value::string("12").to_array_index(), Some(12));
    /// assert_eq!(Value::string("012").to_array_index(), None);
    /// assert_eq!(Value::Smi(-1).to_array_index(), None);
    /// ```
    pub fn to_array_index(&self) -> Option<u32> {
        match self {
            Value::Smi(n) if *n >= 0 => Some(*n as u32),
            Value::Double(n) => {
                if n.fract() == 0.0 && *n >= 0.0 && *n <= MAX_ARRAY_INDEX as f64 {
                    Some(*n as u32)
                } else {
                    None
                }
            }
            Value::String(s) => to_array_index(s),
            _ => None,
        }
    }

    /// Converts this value to the string used as a property key.
    ///
    /// Objects convert to `"[object Object]"`; user-defined `toString`
    /// hooks are not consulted at this layer.
    pub fn to_property_key(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

/// Parses a canonical array-index string.
pub fn to_array_index(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    let mut acc: u64 = 0;
    for b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        acc = acc * 10 + u64::from(b - b'0');
    }
    if acc > u64::from(MAX_ARRAY_INDEX) {
        return None;
    }
    Some(acc as u32)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

/// JavaScript `String()` conversion for primitive values.
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Undefined.to_string(), "undefined");
/// assert_eq!(Value::Double(2.0).to_string(), "2");
/// assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
        }
    }
}
