//! Prometheus rule group to ARM resource conversion

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use super::rules::{convert_duration, convert_rules};
use super::ObjectConverter;
use crate::arm::{parameter_ref, ArmResource, DEFAULT_INTERVAL};
use crate::config::ConversionOptions;
use crate::error::{type_name, ConvertError};

// `name` and `limit` belong to the resource wrapper, not to its properties.
static GROUP_PROPERTIES_CONVERTER: Lazy<ObjectConverter> = Lazy::new(|| {
    ObjectConverter::builder(group_extended_props)
        .converter("interval", convert_duration)
        .converter("rules", convert_rules)
        .exclude("name")
        .exclude("limit")
        .build()
});

fn group_extended_props(_: &ConversionOptions) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("interval".to_string(), json!(DEFAULT_INTERVAL));
    props.insert(
        "scopes".to_string(),
        json!([parameter_ref("azureMonitorWorkspace")]),
    );
    props.insert("clusterName".to_string(), json!(parameter_ref("clusterName")));
    props
}

fn group_fields(group: &Value) -> Result<&Map<String, Value>, ConvertError> {
    group.as_object().ok_or_else(|| ConvertError::NotAnObject {
        what: "Rule group",
        found: type_name(group),
    })
}

/// Convert a rule group into the `properties` of an Azure rule group
pub fn convert_group_properties(
    group: &Value,
    options: &ConversionOptions,
) -> Result<Map<String, Value>, ConvertError> {
    GROUP_PROPERTIES_CONVERTER.convert(group_fields(group)?, options)
}

/// Convert a rule group into an ARM resource
///
/// # Errors
///
/// Fails if the group is not a mapping, or if any of its durations or rules
/// cannot be converted.
pub fn convert_group(group: &Value, options: &ConversionOptions) -> Result<ArmResource, ConvertError> {
    let properties = convert_group_properties(group, options)?;
    let name = group_fields(group)?
        .get("name")
        .filter(|name| !name.is_null())
        .cloned();

    Ok(ArmResource::rule_group(name, properties))
}
