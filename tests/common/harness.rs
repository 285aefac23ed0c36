//! Test harness for a small canvas.
//!
//! Provides a pre-wired editor mirroring a realistic three-node workflow,
//! plus builders for the JSON document fixtures the level tests share.

#![allow(dead_code)]

use std::sync::Once;

use workflow_canvas::{Point, WorkflowDocument, WorkflowEditor, MAIN_CHANNEL};

/// Install a test-writer subscriber once per process so `--nocapture` runs
/// show the editor's debug events.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A three-node linear workflow: Webhook -> Filter -> Send email.
///
/// Node positions follow the 300-pixel column rhythm the canvas lays new
/// nodes out in, so anchor math in tests stays easy to check by hand.
pub struct CanvasHarness {
    pub editor: WorkflowEditor,
}

impl CanvasHarness {
    /// Editor with the three nodes placed but nothing connected.
    pub fn unconnected() -> Self {
        init_tracing();
        let mut editor = WorkflowEditor::new();
        editor.add_node("Webhook", Point::new(0.0, 0.0));
        editor.add_node("Filter", Point::new(300.0, 40.0));
        editor.add_node("Send email", Point::new(600.0, 40.0));
        Self { editor }
    }

    /// Editor with the linear chain fully wired.
    pub fn connected() -> Self {
        let mut harness = Self::unconnected();
        harness.connect("Webhook", "Filter");
        harness.connect("Filter", "Send email");
        harness
    }

    /// Drag-to-connect two nodes on the main channel, slot 0 to slot 0.
    pub fn connect(&mut self, source: &str, target: &str) {
        self.editor.begin_connection(source, MAIN_CHANNEL, 0);
        self.editor
            .complete_connection(target, MAIN_CHANNEL, 0)
            .expect("test connection should validate");
    }
}

/// The JSON form of the same three-node workflow.
pub fn sample_document_json() -> &'static str {
    r#"{
        "name": "Notify on new order",
        "nodes": [
            { "name": "Webhook", "type": "webhook", "position": [0, 0] },
            { "name": "Filter", "type": "if", "position": [300, 40] },
            { "name": "Send email", "type": "emailSend", "position": [600, 40] }
        ],
        "connections": {
            "Webhook": { "main": [[{ "node": "Filter", "type": "main", "index": 0 }]] },
            "Filter": { "main": [[{ "node": "Send email", "type": "main", "index": 0 }]] }
        }
    }"#
}

/// Parse the sample document, panicking on fixture rot.
pub fn sample_document() -> WorkflowDocument {
    WorkflowDocument::from_json(sample_document_json()).expect("sample document should parse")
}
