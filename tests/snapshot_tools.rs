//! take_snapshot / wait_for against an in-memory page

use async_trait::async_trait;
use kodegen_tools_snapshot::tools::{TakeSnapshotArgs, WaitForArgs};
use kodegen_tools_snapshot::{
    SnapshotError, SnapshotNode, SnapshotSource, TakeSnapshotTool, TextSampler, Tool,
    ToolCategory, ToolError, WaitConfig, WaitError, WaitForTool, await_text,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Page whose text changes after a number of samples
struct FakePage {
    tree: SnapshotNode,
    texts: Mutex<Vec<String>>,
    samples: AtomicUsize,
    verbose_requests: AtomicUsize,
}

impl FakePage {
    fn new(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            tree: checkout_tree(),
            texts: Mutex::new(texts.iter().rev().map(|t| t.to_string()).collect()),
            samples: AtomicUsize::new(0),
            verbose_requests: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SnapshotSource for FakePage {
    async fn raw_tree(&self, verbose: bool) -> Result<SnapshotNode, SnapshotError> {
        if verbose {
            self.verbose_requests.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.tree.clone())
    }
}

#[async_trait]
impl TextSampler for FakePage {
    async fn sample_text(&self) -> Result<String, SnapshotError> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        let mut texts = self.texts.lock().expect("texts lock");
        Ok(if texts.len() > 1 {
            texts.pop().unwrap_or_default()
        } else {
            texts.last().cloned().unwrap_or_default()
        })
    }
}

fn checkout_tree() -> SnapshotNode {
    SnapshotNode::new("1_0", "RootWebArea")
        .with_name("Checkout")
        .with_children(vec![
            SnapshotNode::new("1_1", "none"),
            SnapshotNode::new("1_2", "button")
                .with_name("Save")
                .with_children(vec![SnapshotNode::new("1_3", "option").with_name("Express")]),
        ])
}

fn fast_wait_config() -> WaitConfig {
    WaitConfig {
        default_timeout_ms: 1_000,
        max_timeout_ms: 10_000,
        initial_poll_interval_ms: 10,
        max_poll_interval_ms: 50,
    }
}

fn snapshot_args(json: serde_json::Value) -> TakeSnapshotArgs {
    serde_json::from_value(json).expect("valid take_snapshot args")
}

#[tokio::test]
async fn take_snapshot_without_filter_returns_raw_tree() {
    let page = FakePage::new(&[]);
    let tool = TakeSnapshotTool::new(page.clone());

    let response = tool.run(snapshot_args(serde_json::json!({}))).await.expect("snapshot");

    assert_eq!(response.snapshot(), Some(&checkout_tree()));
    assert_eq!(page.verbose_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn take_snapshot_applies_caller_filter() {
    let tool = TakeSnapshotTool::new(FakePage::new(&[]));

    let response = tool
        .run(snapshot_args(serde_json::json!({
            "verbose": true,
            "filter": {"ignoreRoles": ["none", "option"]}
        })))
        .await
        .expect("snapshot");

    let text = response.render().await.expect("render");
    assert_eq!(
        text,
        "## Latest page snapshot\n\
         uid=1_0 RootWebArea \"Checkout\"\n  \
         uid=1_2 button \"Save\"\n"
    );
}

#[tokio::test]
async fn take_snapshot_preserve_overrides_ignore() {
    let tool = TakeSnapshotTool::new(FakePage::new(&[]));

    let response = tool
        .run(snapshot_args(serde_json::json!({
            "filter": {"ignoreRoles": ["none", "option"], "preserveRoles": ["Option"]}
        })))
        .await
        .expect("snapshot");

    let snapshot = response.snapshot().expect("snapshot included");
    assert!(snapshot.find("1_1").is_none());
    assert_eq!(snapshot.find("1_3").map(|n| n.role.as_str()), Some("option"));
}

#[tokio::test]
async fn take_snapshot_rejects_blank_roles() {
    let tool = TakeSnapshotTool::new(FakePage::new(&[]));

    let err = tool
        .run(snapshot_args(serde_json::json!({"filter": {"ignoreRoles": [" "]}})))
        .await
        .expect_err("blank role");

    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn take_snapshot_execute_produces_content() {
    let tool = TakeSnapshotTool::new(FakePage::new(&[]));
    let contents = tool.execute(TakeSnapshotArgs::default()).await.expect("execute");
    assert_eq!(contents.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wait_for_returns_found_line_and_fresh_snapshot() {
    let page = FakePage::new(&["Loading...", "Loading...", "Done: Save"]);
    let tool = WaitForTool::new(page.clone(), fast_wait_config(), CancellationToken::new());

    let response = tool
        .run(WaitForArgs {
            text: "Save".to_string(),
            timeout: Some(5_000),
        })
        .await
        .expect("text appears");

    assert_eq!(page.samples.load(Ordering::SeqCst), 3);
    assert_eq!(response.lines(), ["Element with text \"Save\" found."]);
    assert_eq!(response.snapshot(), Some(&checkout_tree()));

    let text = response.render().await.expect("render");
    assert!(text.starts_with("Element with text \"Save\" found.\n## Latest page snapshot\n"));
}

#[tokio::test(start_paused = true)]
async fn wait_for_times_out_with_sought_text() {
    let tool = WaitForTool::new(
        FakePage::new(&["Loading..."]),
        fast_wait_config(),
        CancellationToken::new(),
    );

    let err = tool
        .run(WaitForArgs {
            text: "Save".to_string(),
            timeout: Some(100),
        })
        .await
        .expect_err("never appears");

    match err {
        ToolError::Wait(WaitError::Timeout { text, elapsed }) => {
            assert_eq!(text, "Save");
            assert!(elapsed >= Duration::from_millis(100));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn session_cancellation_aborts_wait() {
    let session_token = CancellationToken::new();
    let tool = WaitForTool::new(FakePage::new(&["Loading..."]), fast_wait_config(), session_token.clone());

    let waiting = tokio::spawn(async move {
        tool.run(WaitForArgs {
            text: "Save".to_string(),
            timeout: None,
        })
        .await
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    session_token.cancel();

    let err = waiting.await.expect("task joins").expect_err("cancelled");
    assert!(matches!(err, ToolError::Wait(WaitError::Cancelled { .. })));
}

#[tokio::test(start_paused = true)]
async fn await_text_polls_until_found() {
    let page = FakePage::new(&["Loading...", "Order confirmed"]);

    let outcome = await_text(
        page.as_ref(),
        "confirmed",
        Duration::from_secs(5),
        &CancellationToken::new(),
    )
    .await
    .expect("text appears");

    assert_eq!(outcome.samples, 2);
}

#[tokio::test]
async fn wait_for_rejects_oversized_timeout() {
    let tool = WaitForTool::new(FakePage::new(&["Save"]), fast_wait_config(), CancellationToken::new());

    let err = tool
        .run(WaitForArgs {
            text: "Save".to_string(),
            timeout: Some(60_000),
        })
        .await
        .expect_err("exceeds max");

    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[test]
fn tool_metadata_matches_surface() {
    assert_eq!(<TakeSnapshotTool<FakePage> as Tool>::name(), "take_snapshot");
    assert_eq!(<TakeSnapshotTool<FakePage> as Tool>::category(), ToolCategory::Debugging);
    assert!(!<TakeSnapshotTool<FakePage> as Tool>::read_only());

    assert_eq!(<WaitForTool<FakePage> as Tool>::name(), "wait_for");
    assert_eq!(<WaitForTool<FakePage> as Tool>::category(), ToolCategory::Navigation);
    assert!(<WaitForTool<FakePage> as Tool>::read_only());

    let schema = <TakeSnapshotTool<FakePage> as Tool>::input_schema();
    let properties = schema["properties"].as_object().expect("object schema");
    assert!(properties.contains_key("filePath"));
    assert!(properties.contains_key("filter"));
}
