//! Contract compliance tests for core_types
//!
//! These tests verify the public API the memory manager and interpreter
//! depend on.

use core_types::{to_array_index, ErrorKind, JsError, ObjectId, Value, MAX_ARRAY_INDEX};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value enum must have all specified variants
    #[test]
    fn test_value_variants_exist() {
        let _: Value = Value::Undefined;
        let _: Value = Value::Null;
        let _: Value = Value::Boolean(true);
        let _: Value = Value::Smi(0);
        let _: Value = Value::Double(0.0);
        let _: Value = Value::string("s");
        let _: Value = Value::Object(ObjectId(0));
    }

    /// Contract: ObjectId is a Copy handle usable as a map key
    #[test]
    fn test_object_id_is_copy_and_hashable() {
        use std::collections::HashSet;
        let a = ObjectId(1);
        let b = a;
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    /// Contract: array-index helpers agree for strings and values
    #[test]
    fn test_array_index_helpers_agree() {
        for s in ["0", "1", "42", "007", "x", "4294967295"] {
            assert_eq!(to_array_index(s), Value::string(s).to_array_index());
        }
        assert_eq!(to_array_index("4294967294"), Some(MAX_ARRAY_INDEX));
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    /// Contract: JsError exposes kind and message fields
    #[test]
    fn test_js_error_fields() {
        let error = JsError {
            kind: ErrorKind::TypeError,
            message: "test".to_string(),
        };
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert_eq!(error.message, "test");
    }
}
