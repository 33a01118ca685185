use serde_json::Value;

/// Collects the leaves of a (serialized) metadata record.
///
/// Leaves are keyed by the name of the field they are stored in;
/// nested records contribute their leaves without any prefix. Null
/// values are skipped and every item of a list is reported under the
/// name of the list.
pub(crate) fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut leaves = vec![];
    if let Value::Object(map) = value {
        for (key, value) in map {
            visit(key, value, &mut leaves);
        }
    }

    leaves
}

fn visit(key: &str, value: &Value, leaves: &mut Vec<(String, Value)>) {
    match value {
        Value::Null => (),
        Value::Object(_) => leaves.extend(flatten(value)),
        Value::Array(items) => {
            for item in items {
                visit(key, item, leaves);
            }
        }
        _ => leaves.push((key.to_string(), value.clone())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flatten_nested_values() {
        let value = json!({
            "a": 1,
            "b": null,
            "c": { "d": "x", "e": [true, null, false] },
            "f": [{ "g": 2 }, { "g": 3 }],
        });

        let leaves = flatten(&value);
        assert_eq!(
            leaves,
            vec![
                ("a".to_string(), json!(1)),
                ("d".to_string(), json!("x")),
                ("e".to_string(), json!(true)),
                ("e".to_string(), json!(false)),
                ("g".to_string(), json!(2)),
                ("g".to_string(), json!(3)),
            ]
        );
    }

    #[test]
    fn flatten_scalar() {
        assert!(flatten(&json!("a")).is_empty());
        assert!(flatten(&json!({})).is_empty());
    }
}
