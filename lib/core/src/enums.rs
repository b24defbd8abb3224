// Enumeration helper for the `enum` field option
use serde_json::Value;

/// An enumeration whose variants map to stored values
pub trait SchemaEnum: Sized + 'static {
    const VARIANTS: &'static [Self];

    fn to_value(&self) -> Value;
}

/// Underlying values of every variant, in declaration order
pub fn enum_values<E: SchemaEnum>() -> Vec<Value> {
    E::VARIANTS.iter().map(E::to_value).collect()
}
