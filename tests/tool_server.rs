//! Scripted tool server sessions over in-memory streams.
//!
//! Run with: cargo test --test tool_server

use serde_json::{json, Value};
use slidedeck::{ExternalTools, McpServer, ServerConfig};

fn server() -> McpServer {
    McpServer::new(ServerConfig::default().with_tools(ExternalTools::default()))
}

fn request(id: u64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({"name": name, "arguments": arguments}))
}

/// Feed `lines` to a server and collect one parsed response per output line.
async fn run_session(lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut output = Vec::new();
    server().serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn handshake_then_list_tools() {
    let responses = run_session(&[
        request(1, "initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}})),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        String::new(),
        request(2, "tools/list", json!({})),
        request(3, "ping", json!({})),
    ])
    .await;

    // the notification and the blank line produce nothing
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");

    let names: Vec<&str> = responses[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "create_presentation",
            "extract_text_inventory",
            "apply_text_replacements",
            "rearrange_slides",
            "create_thumbnail_grid",
            "unpack_office_document",
            "pack_office_document",
            "validate_office_document",
        ]
    );
    assert_eq!(responses[2]["result"], json!({}));
}

#[tokio::test]
async fn create_edit_and_inspect_a_deck() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    let edited = dir.path().join("edited.pptx");
    let reordered = dir.path().join("reordered.pptx");

    let responses = run_session(&[
        tool_call(
            1,
            "create_presentation",
            json!({
                "output_path": deck,
                "slides": [
                    {"shapes": [{"type": "textbox", "text": "Cover"}]},
                    {"shapes": [{"type": "textbox", "text": "Body"}]}
                ]
            }),
        ),
        tool_call(
            2,
            "apply_text_replacements",
            json!({
                "pptx_path": deck,
                "replacements_json": json!({"slide-1": {"shape-0": [{"text": "New body"}]}}).to_string(),
                "output_path": edited
            }),
        ),
        tool_call(
            3,
            "rearrange_slides",
            json!({"template_path": edited, "output_path": reordered, "slide_sequence": "1,0"}),
        ),
        tool_call(4, "extract_text_inventory", json!({"pptx_path": reordered})),
    ])
    .await;

    assert_eq!(responses.len(), 4);
    for response in &responses {
        assert_eq!(response["result"]["isError"], false, "{}", response);
    }
    assert_eq!(
        tool_text(&responses[0]),
        format!("Created presentation with 2 slides: {}", deck.display())
    );
    assert!(tool_text(&responses[1]).starts_with("Successfully applied replacements."));

    let inventory: Value = serde_json::from_str(tool_text(&responses[3])).unwrap();
    assert_eq!(inventory["slide-0"]["shape-0"]["paragraphs"][0]["text"], "New body");
    // the cover was not listed, so its text was cleared
    assert!(inventory.get("slide-1").is_none());
}

#[tokio::test]
async fn tool_failures_are_results_not_protocol_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pptx");

    let responses = run_session(&[
        tool_call(1, "extract_text_inventory", json!({"pptx_path": missing})),
        tool_call(2, "rearrange_slides", json!({"template_path": missing})),
        tool_call(3, "make_coffee", json!({})),
        request(4, "tools/call", json!({"arguments": {}})),
    ])
    .await;

    assert_eq!(responses[0]["result"]["isError"], true);
    assert_eq!(
        tool_text(&responses[0]),
        format!("Error: File not found: {}", missing.display())
    );

    assert_eq!(responses[1]["result"]["isError"], true);
    assert!(tool_text(&responses[1]).starts_with("Error: Invalid arguments for rearrange_slides"));

    assert_eq!(tool_text(&responses[2]), "Unknown tool: make_coffee");

    assert_eq!(responses[3]["error"]["code"], -32602);
    assert_eq!(responses[3]["id"], 4);
}

#[tokio::test]
async fn malformed_lines_do_not_end_the_session() {
    let responses = run_session(&[
        "not json".to_string(),
        json!({"jsonrpc": "2.0", "id": 7}).to_string(),
        request(8, "ping", json!({})),
    ])
    .await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["error"]["code"], -32600);
    assert_eq!(responses[2]["id"], 8);
}
