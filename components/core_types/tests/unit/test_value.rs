//! Unit tests for Value enum

use core_types::{ObjectId, Value};

#[cfg(test)]
mod value_creation_tests {
    use super::*;

    #[test]
    fn test_value_smi_extremes() {
        assert!(matches!(Value::Smi(i32::MAX), Value::Smi(n) if n == i32::MAX));
        assert!(matches!(Value::Smi(i32::MIN), Value::Smi(n) if n == i32::MIN));
    }

    #[test]
    fn test_value_from_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(5), Value::Smi(5));
        assert_eq!(Value::from(2.0), Value::Smi(2));
        assert_eq!(Value::from(2.5), Value::Double(2.5));
        assert_eq!(Value::from("foo"), Value::string("foo"));
        assert_eq!(Value::from(ObjectId(3)), Value::Object(ObjectId(3)));
    }

    #[test]
    fn test_number_out_of_smi_range_stays_double() {
        let big = i32::MAX as f64 + 1.0;
        assert_eq!(Value::number(big), Value::Double(big));
    }
}

#[cfg(test)]
mod value_semantics_tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Double(0.0).is_truthy());
        assert!(Value::string("0").is_truthy());
        assert!(Value::Smi(-1).is_truthy());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Boolean(false).type_of(), "boolean");
        assert_eq!(Value::Double(1.5).type_of(), "number");
        assert_eq!(Value::string("s").type_of(), "string");
        assert_eq!(Value::Object(ObjectId(0)).type_of(), "object");
    }

    #[test]
    fn test_nullish() {
        assert!(Value::Undefined.is_nullish());
        assert!(Value::Null.is_nullish());
        assert!(!Value::Smi(0).is_nullish());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Smi(42).to_string(), "42");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Object(ObjectId(1)).to_string(), "[object Object]");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Smi(3).as_number(), Some(3.0));
        assert_eq!(Value::Double(0.25).as_number(), Some(0.25));
        assert_eq!(Value::string("3").as_number(), None);
    }
}

#[cfg(test)]
mod array_index_tests {
    use super::*;

    #[test]
    fn test_numeric_keys() {
        assert_eq!(Value::Smi(0).to_array_index(), Some(0));
        assert_eq!(Value::Double(10.0).to_array_index(), Some(10));
        assert_eq!(Value::Double(-0.5).to_array_index(), None);
    }

    #[test]
    fn test_string_keys_must_be_canonical() {
        assert_eq!(Value::string("0").to_array_index(), Some(0));
        assert_eq!(Value::string("00").to_array_index(), None);
        assert_eq!(Value::string("1e3").to_array_index(), None);
        assert_eq!(Value::string(" 1").to_array_index(), None);
    }

    #[test]
    fn test_non_key_values() {
        assert_eq!(Value::Undefined.to_array_index(), None);
        assert_eq!(Value::Boolean(true).to_array_index(), None);
        assert_eq!(Value::Object(ObjectId(0)).to_array_index(), None);
    }
}
