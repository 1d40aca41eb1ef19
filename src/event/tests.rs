use super::*;
use serde_json::json;

fn snapshot_json(day: serde_json::Value, decision: &str) -> serde_json::Value {
    json!({
        "day": day,
        "money": 100,
        "energy": 50.5,
        "crops": [{"type": "Corn", "planted_at": 1}],
        "decision": decision
    })
}

#[test]
fn test_parse_valid_message() {
    let payload = json!({
        "gpt35": snapshot_json(json!(1), "T1 Plant Corn"),
        "gpt4": snapshot_json(json!(1), "T2 Harvest Wheat"),
    })
    .to_string();

    let message = parse_message(&payload).unwrap();
    assert_eq!(message.gpt35.day, Day::Number(1));
    assert_eq!(message.gpt35.money, 100.0);
    assert_eq!(message.gpt35.energy, 50.5);
    assert_eq!(message.gpt35.crops[0].crop_type, "Corn");
    assert_eq!(message.gpt4.decision, "T2 Harvest Wheat");
    assert!(message.gpt4.harvested_crops.is_none());
    assert_eq!(message.chart_day(), Day::Number(1));
}

#[test]
fn test_parse_closing_message() {
    let mut final_snapshot = snapshot_json(json!("Final"), "Competition finished");
    final_snapshot["harvested_crops"] = json!({"Corn": 4});
    let payload = json!({"gpt35": final_snapshot.clone(), "gpt4": final_snapshot}).to_string();

    let message = parse_message(&payload).unwrap();
    assert_eq!(message.gpt4.day, Day::Final);
    assert_eq!(
        message.gpt4.harvested_crops.as_ref().unwrap().get("Corn"),
        Some(&4)
    );
}

#[test]
fn test_negative_gauges_are_accepted() {
    let mut snapshot = snapshot_json(json!(3), "1 Buy Corn 2");
    snapshot["money"] = json!(-12.5);
    snapshot["energy"] = json!(-3);
    let payload = json!({"gpt35": snapshot.clone(), "gpt4": snapshot}).to_string();

    let message = parse_message(&payload).unwrap();
    assert_eq!(message.gpt35.money, -12.5);
    assert_eq!(message.gpt4.energy, -3.0);
}

#[test]
fn test_missing_gpt4_fails() {
    let payload = json!({"gpt35": snapshot_json(json!(1), "1 Plant Corn")}).to_string();

    let result = parse_message(&payload);
    assert_eq!(result.unwrap_err(), PayloadError::MissingAgent("gpt4"));
}

#[test]
fn test_missing_field_fails() {
    let mut broken = snapshot_json(json!(1), "1 Plant Corn");
    broken.as_object_mut().unwrap().remove("decision");
    let payload = json!({"gpt35": snapshot_json(json!(1), "1 Plant Corn"), "gpt4": broken})
        .to_string();

    match parse_message(&payload).unwrap_err() {
        PayloadError::InvalidSnapshot { agent, .. } => assert_eq!(agent, "gpt4"),
        other => panic!("Expected InvalidSnapshot, got {:?}", other),
    }
}

#[test]
fn test_unknown_day_label_fails() {
    let payload = json!({
        "gpt35": snapshot_json(json!("Tomorrow"), "1 Plant Corn"),
        "gpt4": snapshot_json(json!(1), "1 Plant Corn"),
    })
    .to_string();

    assert!(matches!(
        parse_message(&payload).unwrap_err(),
        PayloadError::InvalidSnapshot { agent: "gpt35", .. }
    ));
}

#[test]
fn test_day_ordering_and_display() {
    assert!(Day::Number(50) < Day::Final);
    assert!(Day::Number(1) < Day::Number(2));
    assert_eq!(Day::Number(7).to_string(), "7");
    assert_eq!(Day::Final.to_string(), "Final");
    assert_eq!(Day::Final.number(), None);
}

#[test]
fn test_day_serializes_like_the_wire() {
    assert_eq!(serde_json::to_value(Day::Number(4)).unwrap(), json!(4));
    assert_eq!(serde_json::to_value(Day::Final).unwrap(), json!("Final"));
}

#[test]
fn test_agent_keys() {
    assert_eq!(AgentId::Gpt35.key(), "gpt35");
    assert_eq!(AgentId::Gpt4.label(), "GPT-4");
}
