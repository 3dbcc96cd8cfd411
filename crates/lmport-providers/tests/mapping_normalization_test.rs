use lmport_providers::{InputDocument, Normalizer, read_input};
use lmport_testing::MappingConversationBuilder;
use lmport_testing::assertions::{
    assert_assistant_step_counts, assert_message_roles, assert_unique_step_ids,
};
use lmport_types::{ExportDefaults, FixedClock, LmConversation, SYSTEM_PROMPT_KEY};
use serde_json::{Value, json};
use std::path::Path;

const NOW: i64 = 1_800_000_000_000;

fn normalize(raw: &Value) -> LmConversation {
    let defaults = ExportDefaults::default();
    let clock = FixedClock(NOW);
    Normalizer::new(&defaults, &clock).normalize(raw)
}

fn to_json(conversation: &LmConversation) -> Value {
    serde_json::to_value(conversation).expect("conversation serializes")
}

fn texts(conversation: &LmConversation) -> Vec<Vec<String>> {
    conversation
        .messages
        .iter()
        .map(|m| {
            m.primary()
                .map(|v| v.texts().into_iter().map(String::from).collect())
                .unwrap_or_default()
        })
        .collect()
}

#[test]
fn test_messages_follow_timestamps_not_mapping_order() -> anyhow::Result<()> {
    let raw = MappingConversationBuilder::new("Order")
        .user("first", 1000)
        .assistant("answer", 2000)
        .user("second", 1500)
        .build();

    let conv = normalize(&raw);
    let value = to_json(&conv);

    assert_message_roles(&value, &["user", "user", "assistant"])?;
    assert_eq!(
        texts(&conv),
        vec![vec!["first"], vec!["second"], vec!["answer"]]
    );
    Ok(())
}

#[test]
fn test_consecutive_assistant_nodes_become_one_message() -> anyhow::Result<()> {
    let raw = MappingConversationBuilder::new("Steps")
        .user("go", 1)
        .assistant("step one", 3)
        .assistant("step two", 2)
        .assistant("step three", 4)
        .build();

    let conv = normalize(&raw);
    let value = to_json(&conv);

    assert_message_roles(&value, &["user", "assistant"])?;
    assert_assistant_step_counts(&value, &[3])?;
    assert_unique_step_ids(&value)?;
    assert_eq!(texts(&conv)[1], vec!["step two", "step one", "step three"]);
    Ok(())
}

#[test]
fn test_same_timestamp_puts_assistant_before_user() -> anyhow::Result<()> {
    let raw = MappingConversationBuilder::new("Tie")
        .user("question", 1000)
        .assistant("reply", 1000)
        .build();

    let conv = normalize(&raw);

    assert_message_roles(&to_json(&conv), &["assistant", "user"])?;
    assert_eq!(texts(&conv), vec![vec!["reply"], vec!["question"]]);
    Ok(())
}

#[test]
fn test_full_ties_keep_document_order() -> anyhow::Result<()> {
    let raw = json!({
        "title": "Document order",
        "create_time": 1_700_000_000,
        "mapping": {
            "zz": {"message": {
                "author": {"role": "assistant"},
                "create_time": 5,
                "content": {"parts": ["first in document"]}
            }},
            "aa": {"message": {
                "author": {"role": "assistant"},
                "create_time": 5,
                "content": {"parts": ["second in document"]}
            }},
            "sys-b": {"message": {
                "author": {"role": "system"},
                "create_time": 1,
                "content": {"parts": ["prompt b"]}
            }},
            "sys-a": {"message": {
                "author": {"role": "system"},
                "create_time": 1,
                "content": {"parts": ["prompt a"]}
            }}
        },
        "pluginConfigs": {"z": 1, "a": 2}
    });

    let conv = normalize(&raw);

    assert_assistant_step_counts(&to_json(&conv), &[2])?;
    assert_eq!(texts(&conv), vec![vec!["first in document", "second in document"]]);
    assert_eq!(conv.system_prompt, "prompt b");
    let keys: Vec<&str> = conv.plugin_configs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a"]);
    Ok(())
}

#[test]
fn test_hidden_messages_never_surface() {
    let raw = MappingConversationBuilder::new("Hidden")
        .hidden("system", "secret instructions", 1)
        .hidden("user", "invisible", 2)
        .user("visible", 3)
        .build();

    let conv = normalize(&raw);

    assert_eq!(conv.system_prompt, "");
    assert_eq!(texts(&conv), vec![vec!["visible"]]);
}

#[test]
fn test_empty_content_is_dropped() {
    let raw = MappingConversationBuilder::new("Empty")
        .empty_node()
        .user("   ", 1)
        .message("assistant", json!({"parts": [""]}), 2)
        .message("assistant", Value::Null, 3)
        .user("real", 4)
        .build();

    let conv = normalize(&raw);

    assert_eq!(conv.messages.len(), 1);
    assert_eq!(texts(&conv), vec![vec!["real"]]);
}

#[test]
fn test_earliest_system_prompt_wins() {
    let raw = MappingConversationBuilder::new("Prompts")
        .system("A", 500)
        .system("B", 200)
        .user("hi", 600)
        .build();

    let conv = normalize(&raw);

    assert_eq!(conv.system_prompt, "B");
    assert_eq!(
        conv.per_chat_prediction_config.get(SYSTEM_PROMPT_KEY),
        Some(&json!("B"))
    );
    // System messages are not part of the transcript
    assert_eq!(texts(&conv), vec![vec!["hi"]]);
}

#[test]
fn test_conversation_system_prompt_is_fallback_only() {
    let raw = MappingConversationBuilder::new("Fallback")
        .system_prompt("Be brief.")
        .user("hi", 1)
        .build();

    let conv = normalize(&raw);

    assert_eq!(conv.system_prompt, "Be brief.");
    assert_eq!(
        conv.per_chat_prediction_config.get(SYSTEM_PROMPT_KEY),
        Some(&json!(""))
    );
}

#[test]
fn test_token_count_is_quarter_of_chars() {
    let raw = MappingConversationBuilder::new("Tokens")
        .user(&"x".repeat(400), 1)
        .build();

    assert_eq!(normalize(&raw).token_count, 100);
}

#[test]
fn test_created_at_conversions() {
    let seconds = MappingConversationBuilder::new("s").create_time(1_700_000_000.5).build();
    assert_eq!(normalize(&seconds).created_at, 1_700_000_000_500);

    let millis = MappingConversationBuilder::new("ms")
        .create_time(1_700_000_000_123_i64)
        .build();
    assert_eq!(normalize(&millis).created_at, 1_700_000_000_123);

    let missing = MappingConversationBuilder::new("none").create_time(Value::Null).build();
    assert_eq!(normalize(&missing).created_at, NOW);
}

#[test]
fn test_step_ids_use_created_at_and_span_messages() {
    let raw = MappingConversationBuilder::new("Ids")
        .create_time(10)
        .assistant("a", 1)
        .user("q", 2)
        .assistant("b", 3)
        .assistant("c", 4)
        .build();

    let value = to_json(&normalize(&raw));
    let ids: Vec<&str> = value["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["versions"][0]["steps"].as_array())
        .flatten()
        .map(|s| s["stepIdentifier"].as_str().unwrap())
        .collect();

    assert_eq!(ids, vec!["10000-0", "10000-1", "10000-2"]);
}

#[test]
fn test_defaults_flow_into_stubs() {
    let defaults = ExportDefaults::new("my-local-model", 0.2);
    let clock = FixedClock(NOW);
    let raw = MappingConversationBuilder::new("Defaults")
        .assistant("a", 1)
        .build();

    let value = to_json(&Normalizer::new(&defaults, &clock).normalize(&raw));

    assert_eq!(value["lastUsedModel"]["identifier"], "my-local-model");
    assert_eq!(
        value["messages"][0]["versions"][0]["senderInfo"]["senderName"],
        "my-local-model"
    );
    assert_eq!(
        value["messages"][0]["versions"][0]["steps"][0]["genInfo"]["identifier"],
        "my-local-model"
    );
    assert_eq!(
        value["perChatPredictionConfig"]["fields"][0]["value"],
        json!(0.2)
    );
}

#[test]
fn test_passthrough_fields_are_copied() {
    let raw = MappingConversationBuilder::new("Extras")
        .field("notes", json!(["n1"]))
        .field("pluginConfigs", json!({"web": {"on": true}}))
        .field("looseFiles", json!("not-a-list"))
        .user("hi", 1)
        .build();

    let conv = normalize(&raw);

    assert_eq!(conv.notes, vec![json!("n1")]);
    assert_eq!(conv.plugin_configs.get("web"), Some(&json!({"on": true})));
    assert!(conv.loose_files.is_empty());
}

#[test]
fn test_sample_export() -> anyhow::Result<()> {
    let InputDocument::Batch(conversations) =
        read_input(Path::new("tests/samples/chatgpt_conversations.json"))?
    else {
        anyhow::bail!("sample should be a batch");
    };
    assert_eq!(conversations.len(), 2);

    let rust = normalize(&conversations[0]);
    let value = to_json(&rust);

    assert_eq!(rust.name, "$Work$ Borrow checker questions");
    assert_eq!(rust.created_at, 1_700_000_000_123);
    assert_eq!(rust.system_prompt, "");
    // The tool output splits the assistant run in two
    assert_message_roles(&value, &["user", "assistant", "assistant", "user"])?;
    assert_assistant_step_counts(&value, &[1, 1])?;

    let texts = texts(&rust);
    assert_eq!(texts[0], vec!["Why does `&mut` need to be unique?"]);
    assert_eq!(texts[1], vec!["Because aliasing plus mutation breaks memory safety."]);
    assert_eq!(texts[2], vec!["See the Rustonomicon chapter."]);
    assert!(texts[3][0].ends_with("What about this diagram?"));

    let dinner = normalize(&conversations[1]);
    assert_eq!(dinner.created_at, 1_700_100_000_000);
    assert_eq!(dinner.system_prompt, "You are a chef.");
    assert_eq!(dinner.messages.len(), 2);
    Ok(())
}

#[test]
fn test_user_message_snapshot() {
    let raw = MappingConversationBuilder::new("Snap").user("hi", 1).build();
    let conv = normalize(&raw);

    insta::assert_json_snapshot!(conv.messages[0], @r###"
    {
      "versions": [
        {
          "type": "singleStep",
          "role": "user",
          "content": [
            {
              "type": "text",
              "text": "hi",
              "fromDraftModel": false,
              "isStructural": false
            }
          ]
        }
      ],
      "currentlySelected": 0
    }
    "###);
}
