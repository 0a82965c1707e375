//! Azure Resource Manager template model
//!
//! Only the parts of the deployment template format the converter emits are
//! modelled. Resources reference template parameters through ARM expressions
//! such as `[parameters('clusterName')]`, which ARM resolves at deployment
//! time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ConversionOptions;

/// Deployment template schema URI
pub const DEPLOYMENT_TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";

/// Template content version
pub const CONTENT_VERSION: &str = "1.0.0.0";

/// Resource type of an Azure Prometheus rule group
pub const RESOURCE_TYPE: &str = "Microsoft.AlertsManagement/prometheusRuleGroups";

/// API version of [`RESOURCE_TYPE`] the resources are written against
pub const API_VERSION: &str = "2023-03-01";

/// Evaluation interval used when a group does not set one
pub const DEFAULT_INTERVAL: &str = "PT1M";

/// Build an ARM parameter reference expression
///
/// ```
/// use az_prom_rules_converter::arm::parameter_ref;
///
/// assert_eq!(parameter_ref("clusterName"), "[parameters('clusterName')]");
/// ```
pub fn parameter_ref(name: &str) -> String {
    format!("[parameters('{}')]", name)
}

/// Metadata attached to a template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmParameterMetadata {
    pub description: String,
}

/// A template parameter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmParameter {
    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArmParameterMetadata>,
}

impl ArmParameter {
    fn string(description: &str) -> Self {
        Self {
            param_type: "string".to_string(),
            default_value: None,
            metadata: Some(ArmParameterMetadata {
                description: description.to_string(),
            }),
        }
    }

    /// Replace the default value when `value` is present and non-empty
    fn override_default(&mut self, value: Option<&String>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.default_value = Some(v.clone());
        }
    }
}

/// The four parameters every generated template declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmParameters {
    pub location: ArmParameter,
    pub cluster_name: ArmParameter,
    pub action_group_id: ArmParameter,
    pub azure_monitor_workspace: ArmParameter,
}

impl ArmParameters {
    /// Parameter definitions with `options` applied as default values
    pub fn from_options(options: &ConversionOptions) -> Self {
        let mut params = Self {
            location: ArmParameter {
                param_type: "string".to_string(),
                default_value: Some("[resourceGroup().location]".to_string()),
                metadata: None,
            },
            cluster_name: ArmParameter::string("Cluster name"),
            action_group_id: ArmParameter::string("Action Group ResourceId"),
            azure_monitor_workspace: ArmParameter::string(
                "ResourceId of Azure monitor workspace to associate to",
            ),
        };
        params
            .cluster_name
            .override_default(options.cluster_name.as_ref());
        params
            .action_group_id
            .override_default(options.action_group_id.as_ref());
        params
            .azure_monitor_workspace
            .override_default(options.azure_monitor_workspace.as_ref());
        params.location.override_default(options.location.as_ref());
        params
    }
}

/// A `Microsoft.AlertsManagement/prometheusRuleGroups` resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmResource {
    /// Group name; absent only when the source group had none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub api_version: String,

    pub location: String,

    pub properties: Map<String, Value>,
}

impl ArmResource {
    /// Create a rule group resource located at the `location` parameter
    pub fn rule_group(name: Option<Value>, properties: Map<String, Value>) -> Self {
        Self {
            name,
            resource_type: RESOURCE_TYPE.to_string(),
            api_version: API_VERSION.to_string(),
            location: parameter_ref("location"),
            properties,
        }
    }
}

/// A complete ARM deployment template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmTemplate {
    #[serde(rename = "$schema")]
    pub schema: String,

    pub content_version: String,

    pub parameters: ArmParameters,

    pub variables: Map<String, Value>,

    pub resources: Vec<ArmResource>,
}

impl ArmTemplate {
    /// Empty template declaring the standard parameters
    pub fn skeleton(options: &ConversionOptions) -> Self {
        Self {
            schema: DEPLOYMENT_TEMPLATE_SCHEMA.to_string(),
            content_version: CONTENT_VERSION.to_string(),
            parameters: ArmParameters::from_options(options),
            variables: Map::new(),
            resources: Vec::new(),
        }
    }
}
