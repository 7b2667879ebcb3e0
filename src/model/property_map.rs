//! PropertyMap — the attribute bag stored in a well or carried by a vertex.

use hashbrown::HashMap;
use super::Value;

/// A map of attribute names to values.
pub type PropertyMap = HashMap<String, Value>;

/// The attributes held by one well. Every component created through the
/// primary path carries an `id`.
pub type Component = PropertyMap;

/// The reserved identifier attribute.
pub const ID: &str = "id";

/// Build a component holding only an `id`.
pub fn component(id: impl Into<String>) -> Component {
    let mut c = Component::new();
    c.insert(ID.to_owned(), Value::String(id.into()));
    c
}

/// True when every key in `criteria` is matched by `props`.
/// Keys of `props` that `criteria` does not mention are ignored. An absent
/// criterion (`Null`, `""`, NaN) is met by a missing or absent attribute,
/// and numbers compare by value.
pub fn matches(criteria: &PropertyMap, props: &PropertyMap) -> bool {
    criteria.iter().all(|(key, want)| match props.get(key) {
        Some(have) => want.same_as(have),
        None => !want.has_value(),
    })
}

/// Render a property map with sorted keys, e.g. `{conc: 2, id: buffer}`.
pub fn describe(props: &PropertyMap) -> String {
    let mut keys: Vec<&String> = props.keys().collect();
    keys.sort();
    let parts: Vec<String> = keys
        .into_iter()
        .map(|k| format!("{k}: {}", props[k]))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
