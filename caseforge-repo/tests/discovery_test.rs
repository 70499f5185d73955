//! End-to-end discovery over an in-memory host

use caseforge_core::AccountScope;
use caseforge_repo::{
    fetch_text, ArtifactCollector, FileLocator, MemoryBranch, MemoryHost, MemoryRepository,
    SourceHost, UNDECODED_ARTIFACT_PLACEHOLDER,
};
use std::sync::Arc;

#[tokio::test]
async fn test_report_scenario() {
    let host: Arc<dyn SourceHost> = Arc::new(
        MemoryHost::new().with_repository(
            MemoryRepository::new("acme/repoA").with_branch(
                MemoryBranch::new("main")
                    .with_file("jobs/report.py", "def build_report():\n    return 'ok'\n")
                    .with_file("jobs/spec.pdf", "%PDF-1.4 acceptance criteria"),
            ),
        ),
    );

    let outcome = FileLocator::new(host.clone(), AccountScope::AuthenticatedUser)
        .locate("report.py")
        .await
        .unwrap();
    let file_match = outcome.first_match().unwrap();
    assert_eq!(file_match.repository.full_name, "acme/repoA");
    assert_eq!(file_match.branch.name, "main");
    assert_eq!(file_match.path, "jobs/report.py");

    let text = fetch_text(host.as_ref(), file_match).await.unwrap();
    assert!(text.contains("build_report"));

    let artifacts = ArtifactCollector::new(host, ".pdf")
        .collect(file_match)
        .await
        .unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].file_name, "spec.pdf");
    assert_ne!(artifacts[0].content, UNDECODED_ARTIFACT_PLACEHOLDER);
}

#[tokio::test]
async fn test_failing_repository_does_not_abort_search() {
    let host = MemoryHost::new()
        .with_repository(
            MemoryRepository::new("acme/r1").with_branch(
                MemoryBranch::new("main")
                    .with_file("src/lib.py", "")
                    .with_tree_failure("HTTP 500 listing tree"),
            ),
        )
        .with_repository(MemoryRepository::new("acme/r-empty").with_branch(MemoryBranch::new("main")))
        .with_repository(MemoryRepository::new("acme/r-nobranches").with_branch_failure("HTTP 409"))
        .with_repository(
            MemoryRepository::new("acme/r2")
                .with_branch(MemoryBranch::new("main").with_file("src/target.py", "")),
        );

    let outcome = FileLocator::new(Arc::new(host), AccountScope::AuthenticatedUser)
        .locate("target.py")
        .await
        .unwrap();

    let file_match = outcome.first_match().unwrap();
    assert_eq!(file_match.repository.full_name, "acme/r2");
    assert_eq!(outcome.repositories_scanned, 4);

    let skipped: Vec<&str> = outcome
        .failures
        .iter()
        .map(|f| f.repository.as_str())
        .collect();
    assert_eq!(skipped, vec!["acme/r1", "acme/r-empty", "acme/r-nobranches"]);
    assert!(outcome.failures[0].reason.contains("HTTP 500"));
}

#[tokio::test]
async fn test_first_enumerated_repository_wins() {
    let build = |first: &str, second: &str| {
        MemoryHost::new()
            .with_repository(
                MemoryRepository::new(first)
                    .with_branch(MemoryBranch::new("main").with_file("pkg/util.py", "first")),
            )
            .with_repository(
                MemoryRepository::new(second)
                    .with_branch(MemoryBranch::new("main").with_file("util.py", "second")),
            )
    };

    for _ in 0..3 {
        let outcome = FileLocator::new(
            Arc::new(build("acme/zeta", "acme/alpha")),
            AccountScope::AuthenticatedUser,
        )
        .locate("util.py")
        .await
        .unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(
            outcome.first_match().unwrap().repository.full_name,
            "acme/zeta"
        );
    }

    let reversed = FileLocator::new(
        Arc::new(build("acme/alpha", "acme/zeta")),
        AccountScope::AuthenticatedUser,
    )
    .locate("util.py")
    .await
    .unwrap();
    assert_eq!(
        reversed.into_first_match().unwrap().repository.full_name,
        "acme/alpha"
    );
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let host = MemoryHost::new().with_listing_failure("Bad credentials");
    let result = FileLocator::new(Arc::new(host), AccountScope::AuthenticatedUser)
        .locate("report.py")
        .await;
    assert!(result.unwrap_err().is_fatal());
}

#[tokio::test]
async fn test_organization_scope_limits_search() {
    let host = MemoryHost::new()
        .with_repository(
            MemoryRepository::new("other/tools")
                .with_branch(MemoryBranch::new("main").with_file("report.py", "")),
        )
        .with_repository(
            MemoryRepository::new("acme/jobs")
                .with_branch(MemoryBranch::new("main").with_file("jobs/report.py", "")),
        );

    let outcome = FileLocator::new(
        Arc::new(host),
        AccountScope::Organization("acme".to_string()),
    )
    .locate("report.py")
    .await
    .unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].repository.full_name, "acme/jobs");
}
