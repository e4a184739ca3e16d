use querygraph_core::{GraphModel, LineageRecord, ViewFrame};
use schemars::generate::SchemaSettings;
use serde_json::Value;

fn schema_for<T: schemars::JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07().into_generator();
    serde_json::to_value(generator.into_root_schema_for::<T>()).expect("serialize schema")
}

fn required(schema: &Value) -> Vec<&str> {
    schema["required"]
        .as_array()
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[test]
fn lineage_record_contract() {
    let schema = schema_for::<LineageRecord>();
    let mut fields = required(&schema);
    fields.sort_unstable();

    assert_eq!(
        fields,
        vec!["created_at", "id", "query", "source_tables", "target_tables"]
    );
    assert_eq!(schema["properties"]["source_tables"]["type"], "array");
    assert!(schema["properties"].get("updated_at").is_some());
}

#[test]
fn graph_model_contract() {
    let schema = schema_for::<GraphModel>();
    let mut fields = required(&schema);
    fields.sort_unstable();

    assert_eq!(fields, vec!["bounds", "edges", "nodes"]);
}

#[test]
fn view_frame_schema_generates() {
    let schema = schema_for::<ViewFrame>();
    assert!(schema.get("oneOf").is_some() || schema.get("anyOf").is_some());
}
