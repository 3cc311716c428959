//! Property tests for value conversion.

use bindui_value::{EnumType, TypeTag, Value, convert, convert_or_zero};
use proptest::prelude::*;

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1e12f64..1e12).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Str),
    ]
}

fn scalar_tag_strategy() -> impl Strategy<Value = TypeTag> {
    prop_oneof![
        Just(TypeTag::Bool),
        Just(TypeTag::Int),
        Just(TypeTag::Float),
        Just(TypeTag::Str),
    ]
}

proptest! {
    #[test]
    fn identity_conversion_preserves_value(value in scalar_strategy()) {
        let tag = match &value {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            _ => unreachable!(),
        };
        prop_assert_eq!(convert(&value, &tag), Some(value));
    }

    #[test]
    fn converted_value_matches_target_tag(value in scalar_strategy(), tag in scalar_tag_strategy()) {
        if let Some(out) = convert(&value, &tag) {
            let matches = matches!(
                (&out, &tag),
                (Value::Bool(_), TypeTag::Bool)
                    | (Value::Int(_), TypeTag::Int)
                    | (Value::Float(_), TypeTag::Float)
                    | (Value::Str(_), TypeTag::Str)
            );
            prop_assert!(matches, "converted to {out:?} for {tag:?}");
        }
    }

    #[test]
    fn conversion_never_mutates_the_input(value in scalar_strategy(), tag in scalar_tag_strategy()) {
        let snapshot = value.clone();
        let _ = convert(&value, &tag);
        prop_assert_eq!(value, snapshot);
    }

    #[test]
    fn fallback_always_yields_target_shape(value in scalar_strategy(), tag in scalar_tag_strategy()) {
        let out = convert_or_zero(&value, &tag);
        prop_assert_eq!(out.kind(), tag.zero().kind());
    }

    #[test]
    fn int_float_round_trip_is_exact_for_small_ints(i in -(1i64 << 52)..(1i64 << 52)) {
        let widened = convert(&Value::Int(i), &TypeTag::Float).unwrap();
        prop_assert_eq!(convert(&widened, &TypeTag::Int), Some(Value::Int(i)));
    }

    #[test]
    fn any_boxing_round_trips(value in scalar_strategy()) {
        let boxed = convert(&value, &TypeTag::Any).unwrap();
        let tag = match &value {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            _ => unreachable!(),
        };
        prop_assert_eq!(convert(&boxed, &tag), Some(value));
    }

    #[test]
    fn only_known_variants_parse_into_enums(name in "[a-z]{1,6}") {
        let ty = EnumType::new("Mode", &["on", "off"]);
        let parsed = convert(&Value::Str(name.clone()), &TypeTag::Enum(ty));
        prop_assert_eq!(parsed.is_some(), name == "on" || name == "off");
    }
}
