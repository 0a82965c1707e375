//! End-to-end conversion tests
//!
//! These tests run the full flow on realistic rule files and check the
//! resulting ARM template.

use az_prom_rules_converter::config::ConversionOptions;
use az_prom_rules_converter::error::ErrorKind;
use az_prom_rules_converter::pipeline::{convert, run};
use serde_json::{json, Value};

const RULES_YAML: &str = include_str!("fixtures/rules.yml");
const RULES_JSON: &str = include_str!("fixtures/rules.json");

fn full_options() -> ConversionOptions {
    ConversionOptions::new()
        .with_cluster_name("c")
        .with_action_group_id("a")
        .with_azure_monitor_workspace("w")
        .with_location("l")
}

fn template_value(input: &str, options: &ConversionOptions) -> Value {
    let result = run(input, options);
    assert!(result.success, "conversion failed: {:?}", result.error);
    result.output.expect("successful run must carry output")
}

#[test]
fn test_minimal_group_with_options() {
    let rules = r#"
groups:
  - name: minimal
    rules:
      - record: job:up:sum
        expr: sum by (job) (up)
"#;
    let template = template_value(rules, &full_options());

    let resources = template["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["apiVersion"], "2023-03-01");
    assert_eq!(
        resources[0]["type"],
        "Microsoft.AlertsManagement/prometheusRuleGroups"
    );

    let params = &template["parameters"];
    assert_eq!(params["clusterName"]["defaultValue"], "c");
    assert_eq!(params["actionGroupId"]["defaultValue"], "a");
    assert_eq!(params["azureMonitorWorkspace"]["defaultValue"], "w");
    assert_eq!(params["location"]["defaultValue"], "l");
}

#[test]
fn test_full_template() {
    let template = template_value(RULES_YAML, &ConversionOptions::default());

    assert_eq!(
        template["$schema"],
        "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#"
    );
    assert_eq!(template["contentVersion"], "1.0.0.0");
    assert_eq!(template["variables"], json!({}));

    let resources = template["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["name"], "node-exporter");
    assert_eq!(resources[1]["name"], "kubernetes-apps");

    let first = &resources[0];
    assert_eq!(first["location"], "[parameters('location')]");
    assert_eq!(
        first["properties"]["scopes"],
        json!(["[parameters('azureMonitorWorkspace')]"])
    );
    assert_eq!(first["properties"]["clusterName"], "[parameters('clusterName')]");
    assert_eq!(first["properties"]["interval"], "PT1M");

    let recording = &first["properties"]["rules"][0];
    assert_eq!(recording["record"], "instance:node_cpu_utilisation:rate5m");
    assert!(recording.get("expr").is_none());
    assert!(recording["expression"].as_str().unwrap().starts_with("1 - avg"));
    assert_eq!(recording["labels"], json!({"source": "node-exporter"}));
    assert!(recording.get("severity").is_none());

    let alerting = &first["properties"]["rules"][1];
    assert_eq!(alerting["alert"], "NodeFilesystemAlmostOutOfSpace");
    assert_eq!(alerting["for"], "PT30M");
    assert_eq!(alerting["severity"], 3);
    assert_eq!(
        alerting["resolveConfiguration"],
        json!({"autoResolve": true, "timeToResolve": "PT10M"})
    );
    assert_eq!(
        alerting["actions"],
        json!([{"actionGroupId": "[parameters('actionGroupId')]"}])
    );
    assert_eq!(
        alerting["annotations"]["summary"],
        "Filesystem has less than 5% space left."
    );

    // Group without an interval falls back to one minute
    assert_eq!(resources[1]["properties"]["interval"], "PT1M");
    assert_eq!(resources[1]["properties"]["rules"][0]["for"], "PT15M");
}

#[test]
fn test_yaml_and_json_inputs_agree() {
    let from_yaml = template_value(RULES_YAML, &ConversionOptions::default());
    let from_yaml_parser = template_value(RULES_JSON, &ConversionOptions::default());
    let from_json_mode = template_value(RULES_JSON, &ConversionOptions::new().with_json(true));

    assert_eq!(from_yaml, from_yaml_parser);
    assert_eq!(from_yaml, from_json_mode);
}

#[test]
fn test_shared_labels_through_merge_keys() {
    let rules = r#"
groups:
  - name: web
    rules:
      - alert: HighLatency
        expr: latency_seconds > 1
        labels: &common
          team: ops
      - alert: HighErrorRate
        expr: error_ratio > 0.05
        labels:
          <<: *common
          tier: web
"#;
    let template = template_value(rules, &ConversionOptions::default());
    let rules = &template["resources"][0]["properties"]["rules"];
    assert_eq!(rules[0]["labels"], json!({"team": "ops"}));
    assert_eq!(rules[1]["labels"], json!({"team": "ops", "tier": "web"}));
}

#[test]
fn test_empty_input() {
    let err = convert("", &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::EmptyInput);
    assert_eq!(err.title, "Input is empty");
}

#[test]
fn test_invalid_duration_fails_group() {
    let rules = r#"
groups:
  - name: broken
    rules:
      - alert: Broken
        expr: up == 0
        for: "0"
"#;
    // `0` passes the Prometheus schema but is not a convertible duration
    let err = convert(rules, &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::GroupConversion);
    assert_eq!(err.title, "Error converting group 0");
    assert_eq!(err.details["group"]["name"], "broken");
}

#[test]
fn test_invalid_duration_with_skip_validation() {
    let rules = r#"
groups:
  - name: broken
    rules:
      - alert: Broken
        expr: up == 0
        for: 10 minutes
"#;
    let options = ConversionOptions::new().with_skip_validation(true);
    let err = convert(rules, &options).unwrap_err();
    assert_eq!(err.title, "Error converting group 0");
}

#[test]
fn test_schema_rejects_invalid_duration() {
    let rules = r#"
groups:
  - name: broken
    rules:
      - alert: Broken
        expr: up == 0
        for: 10 minutes
"#;
    let err = convert(rules, &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SchemaValidation);
    assert_eq!(err.title, "Failed to validate Prometheus Rules Schema");
    assert!(err.details[0]["instancePath"]
        .as_str()
        .is_some_and(|p| p.starts_with("/groups/0/rules/0")));
}

#[test]
fn test_unknown_fields_rejected_unless_skipped() {
    let rules = r#"
groups:
  - name: extra
    query_offset: 1m
    rules: []
"#;
    let err = convert(rules, &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SchemaValidation);

    // Without validation the unknown field is carried into the properties
    let options = ConversionOptions::new().with_skip_validation(true);
    let template = convert(rules, &options).unwrap();
    assert_eq!(template.resources[0].properties["query_offset"], "1m");
}

#[test]
fn test_parse_error() {
    let err = convert("groups: [", &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);

    let err = convert("groups: []", &ConversionOptions::new().with_json(true)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.title, "Failed to parse JSON input");
}

#[test]
fn test_no_groups() {
    let template = convert("groups: []", &ConversionOptions::default()).unwrap();
    assert!(template.resources.is_empty());
}

#[test]
fn test_concurrent_conversions() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let options = ConversionOptions::new().with_cluster_name(format!("cluster-{}", i));
                let template = convert(RULES_YAML, &options).unwrap();
                (i, template)
            })
        })
        .collect();

    for handle in handles {
        let (i, template) = handle.join().unwrap();
        assert_eq!(template.resources.len(), 2);
        assert_eq!(
            template.parameters.cluster_name.default_value,
            Some(format!("cluster-{}", i))
        );
    }
}
