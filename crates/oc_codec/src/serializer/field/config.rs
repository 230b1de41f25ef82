use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// FieldSerializerConfig

/// Options of a [`FieldSerializer`](super::FieldSerializer).
///
/// A serializer keeps the config it was given until
/// [`update_config`](super::FieldSerializer::update_config) replaces it.
/// Missing keys take their default when deserialized.
///
/// # Examples
///
/// ```
/// use oc_codec::serializer::field::FieldSerializerConfig;
///
/// let config: FieldSerializerConfig =
///     serde_json::from_str(r#"{ "serialize_transient": true }"#).unwrap();
///
/// assert!(config.serialize_transient);
/// assert!(config.optimized_generics);
/// assert!(config.var_int);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSerializerConfig {
    /// Resolve type-variable fields against the type arguments supplied for
    /// each instantiation. Without it such fields are written with a type
    /// tag. Default is `true`.
    pub optimized_generics: bool,
    /// Non-primitive fields may hold null and are preceded by a marker.
    /// Default is `true`.
    pub fields_can_be_null: bool,
    /// `i32` and `i64` fields use variable-length encoding. Default is `true`.
    pub var_int: bool,
    /// Transient fields are copied. Default is `true`.
    pub copy_transient: bool,
    /// Transient fields are written and read. Default is `false`.
    pub serialize_transient: bool,
}

impl Default for FieldSerializerConfig {
    fn default() -> Self {
        Self {
            optimized_generics: true,
            fields_can_be_null: true,
            var_int: true,
            copy_transient: true,
            serialize_transient: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldSerializerConfig;

    #[test]
    fn ron_round_trip() {
        let config = FieldSerializerConfig {
            fields_can_be_null: false,
            copy_transient: false,
            ..Default::default()
        };
        let text = ron::to_string(&config).unwrap();
        let back: FieldSerializerConfig = ron::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: FieldSerializerConfig = ron::from_str("(var_int: false)").unwrap();
        assert_eq!(
            config,
            FieldSerializerConfig {
                var_int: false,
                ..Default::default()
            }
        );
    }
}
