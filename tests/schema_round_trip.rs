use formtree::field::{FieldId, FieldNode, Forest, IdAllocator};
use formtree::registry::FieldTypeRegistry;
use formtree::schema::{build_schema_from_fields, build_uischema_from_fields, convert_schema_to_fields};

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn id(s: &str) -> FieldId {
    FieldId::new(s)
}

fn leaf(i: &str, ty: &str, label: &str, key: &str, schema: Value) -> FieldNode {
    FieldNode::leaf(id(i), ty, label, key)
        .with_schema(schema)
        .with_uischema(json!({"type": "Control"}))
}

fn contact_form() -> Forest {
    let name_row = FieldNode::layout(
        id("row"),
        "horizontal-layout",
        "",
        "HorizontalLayout",
        vec![
            leaf("first", "text", "First Name", "first_name", json!({"type": "string"})).with_required(true),
            leaf("last", "text", "Last Name", "last_name", json!({"type": "string"})),
        ],
    );
    let address = FieldNode::object(
        id("addr"),
        "Address",
        "address",
        vec![
            leaf("city", "text", "City", "city", json!({"type": "string"})).with_required(true),
            leaf("zip", "integer", "Zip", "zip", json!({"type": "integer"})),
        ],
    );
    let tags = FieldNode::array(id("tags"), "Tags", "tags", vec![])
        .with_schema(json!({"type": "array", "items": {"type": "string"}, "uniqueItems": true}));

    vec![
        name_row,
        leaf("email", "email", "Email", "email", json!({"type": "string", "format": "email"})).with_required(true),
        leaf("age", "number", "Age", "age", json!({"type": "number", "minimum": 0})),
        leaf("plan", "select", "Plan", "plan", json!({"type": "string", "enum": ["a", "b", "c", "d"]})),
        leaf("agree", "checkbox", "Agree", "agree", json!({"type": "boolean"})),
        address,
        tags,
    ]
}

#[test]
fn schema_survives_convert_and_rebuild() {
    let original = build_schema_from_fields(&contact_form()).to_json_schema();

    let forest = convert_schema_to_fields(&original, &FieldTypeRegistry::builtin(), &mut IdAllocator::new());
    let rebuilt = build_schema_from_fields(&forest).to_json_schema();

    assert_eq!(rebuilt, original);
}

#[test]
fn property_order_follows_the_forest() {
    let out = build_schema_from_fields(&contact_form());
    let keys: Vec<&str> = out.properties.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["first_name", "last_name", "email", "age", "plan", "agree", "address", "tags"]
    );
    assert_eq!(out.required, vec!["first_name".to_string(), "email".to_string()]);
}

#[test]
fn address_scenario() {
    let forest = vec![FieldNode::object(
        id("a"),
        "Address",
        "address",
        vec![leaf("c", "text", "City", "city", json!({"type": "string"})).with_required(true)],
    )];

    let out = build_schema_from_fields(&forest);
    assert_eq!(
        out.to_json_schema(),
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "title": "Address",
                    "properties": {"city": {"type": "string", "title": "City"}},
                    "required": ["city"]
                }
            },
            "required": []
        })
    );
}

#[test]
fn imported_forest_renders_scoped_controls() {
    let schema = json!({
        "type": "object",
        "properties": {
            "address": {
                "type": "object",
                "title": "Address",
                "properties": {"city": {"type": "string", "title": "City"}}
            },
            "people": {
                "type": "array",
                "items": {"type": "object", "properties": {"name": {"type": "string"}}}
            }
        }
    });
    let forest = convert_schema_to_fields(&schema, &FieldTypeRegistry::builtin(), &mut IdAllocator::new());
    let ui = build_uischema_from_fields(&forest);

    let group = &ui["elements"][0];
    assert_eq!(group["type"], json!("Group"));
    assert_eq!(
        group["elements"][0]["elements"][0]["scope"],
        json!("#/properties/address/properties/city")
    );

    let people = &ui["elements"][1];
    assert_eq!(people["scope"], json!("#/properties/people"));
    assert_eq!(
        people["options"]["detail"]["elements"][0]["scope"],
        json!("#/properties/name")
    );
}
