//! Common test utilities for workflow integration tests.

use workflow_tests::WorkflowTestContext;

/// Create a workflow test context with both services healthy.
pub async fn setup() -> WorkflowTestContext {
    WorkflowTestContext::new()
        .await
        .expect("Failed to create workflow test context")
}

/// Returns true if SKIP_WORKFLOW_TESTS env var is set.
pub fn should_skip() -> bool {
    std::env::var("SKIP_WORKFLOW_TESTS").is_ok()
}

/// Skip workflow tests when SKIP_WORKFLOW_TESTS is set.
#[macro_export]
macro_rules! skip_if_no_services {
    () => {
        if common::should_skip() {
            eprintln!("Skipping workflow test (SKIP_WORKFLOW_TESTS is set)");
            return;
        }
    };
}
