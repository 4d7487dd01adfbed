//! Custom attribute utilities
//!
//! Magento entities carry a `custom_attributes` list of
//! `{"attribute_code": ..., "value": ...}` pairs. Attribute values are
//! always strings on the wire, whatever their logical type. These free
//! functions read and edit that list in place.

use serde_json::Value;

use crate::api::models::Entity;

const CUSTOM_ATTRIBUTES: &str = "custom_attributes";

fn custom_attributes(item: &Entity) -> Option<&Vec<Value>> {
    item.get(CUSTOM_ATTRIBUTES).and_then(Value::as_array)
}

/// Get a custom attribute value by code.
pub fn get_custom_attribute<'a>(item: &'a Entity, attribute_code: &str) -> Option<&'a Value> {
    custom_attributes(item)?
        .iter()
        .find(|attribute| attribute.get("attribute_code").and_then(Value::as_str) == Some(attribute_code))
        .and_then(|attribute| attribute.get("value"))
}

/// Get a custom attribute as a string.
pub fn get_custom_attribute_str<'a>(item: &'a Entity, attribute_code: &str) -> Option<&'a str> {
    get_custom_attribute(item, attribute_code).and_then(Value::as_str)
}

/// Get a boolean custom attribute.
///
/// The API stores booleans as `"0"`/`"1"`; any non-zero integer counts as
/// true, like it does server-side.
pub fn get_boolean_custom_attribute(item: &Entity, attribute_code: &str) -> Option<bool> {
    match get_custom_attribute(item, attribute_code)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_i64()? != 0),
        Value::String(s) => s.parse::<i64>().ok().map(|n| n != 0),
        _ => None,
    }
}

/// All custom attributes as an ordered code-to-value mapping.
pub fn get_custom_attributes_map(item: &Entity) -> Entity {
    let mut map = Entity::new();
    if let Some(attributes) = custom_attributes(item) {
        for attribute in attributes {
            if let (Some(Value::String(code)), Some(value)) =
                (attribute.get("attribute_code"), attribute.get("value"))
            {
                map.insert(code.clone(), value.clone());
            }
        }
    }
    map
}

/// Serialize a value the way the API stores attribute values.
pub fn serialize_attribute_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Set a custom attribute in an item, in place.
pub fn set_custom_attribute(item: &mut Entity, attribute_code: &str, value: Value) {
    set_custom_attributes(item, [(attribute_code.to_string(), value)]);
}

/// Set several custom attributes in an item, in place. Existing codes are
/// overwritten, new ones appended in order.
pub fn set_custom_attributes(
    item: &mut Entity,
    attributes: impl IntoIterator<Item = (String, Value)>,
) {
    let list = item
        .entry(CUSTOM_ATTRIBUTES.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(list) = list.as_array_mut() else {
        return;
    };

    for (attribute_code, value) in attributes {
        let serialized = Value::String(serialize_attribute_value(&value));
        let existing = list.iter_mut().find(|attribute| {
            attribute.get("attribute_code").and_then(Value::as_str) == Some(attribute_code.as_str())
        });
        match existing {
            Some(attribute) => {
                if let Some(attribute) = attribute.as_object_mut() {
                    attribute.insert("value".to_string(), serialized);
                }
            }
            None => {
                let mut attribute = Entity::new();
                attribute.insert("attribute_code".to_string(), Value::String(attribute_code));
                attribute.insert("value".to_string(), serialized);
                list.push(Value::Object(attribute));
            }
        }
    }
}

/// Delete a custom attribute from an item, in place. Returns whether it was
/// present.
pub fn delete_custom_attribute(item: &mut Entity, attribute_code: &str) -> bool {
    delete_custom_attributes(item, [attribute_code]) > 0
}

/// Delete several custom attributes from an item, in place. Returns how many
/// entries were removed.
pub fn delete_custom_attributes<'a>(
    item: &mut Entity,
    attribute_codes: impl IntoIterator<Item = &'a str>,
) -> usize {
    let codes: Vec<&str> = attribute_codes.into_iter().collect();
    let Some(list) = item.get_mut(CUSTOM_ATTRIBUTES).and_then(Value::as_array_mut) else {
        return 0;
    };
    let before = list.len();
    list.retain(|attribute| {
        !attribute
            .get("attribute_code")
            .and_then(Value::as_str)
            .is_some_and(|code| codes.contains(&code))
    });
    before - list.len()
}
