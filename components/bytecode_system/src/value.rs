//! Constant pool values
//!
//! Literal values embedded in a chunk's constant pool.

/// Constant pool entry
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript undefined
    Undefined,
    /// JavaScript null
    Null,
    /// JavaScript boolean
    Boolean(bool),
    /// JavaScript number (IEEE 754 double)
    Number(f64),
    /// JavaScript string
    String(String),
}

impl Value {
    /// Converts the constant to a runtime value.
    ///
    /// ```
    /// use bytecode_system::Value;
    ///
    /// assert_eq!(Value::Number(7.0).to_runtime(), core_types::Value::Smi(7));
    /// ```
    pub fn to_runtime(&self) -> core_types::Value {
        match self {
            Value::Undefined => core_types::Value::Undefined,
            Value::Null => core_types::Value::Null,
            Value::Boolean(b) => core_types::Value::Boolean(*b),
            Value::Number(n) => core_types::Value::number(*n),
            Value::String(s) => core_types::Value::string(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
