pub mod branch;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

/// Fixed keys under which pull-request metadata is attached to the run
/// context. These are an external contract with downstream consumers.
pub const GITLAB_PROJECT_URL: &str = "ci.gitlab.mergerequest.projectUrl";
pub const GITLAB_PIPELINE_ID: &str = "ci.gitlab.pipelineId";
pub const PULL_REQUEST_KEY: &str = "ci.pullrequest.key";
pub const PULL_REQUEST_BRANCH: &str = "ci.pullrequest.branch";
pub const PULL_REQUEST_BASE: &str = "ci.pullrequest.base";

/// CI platform recognized from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CiPlatform {
    #[serde(rename = "gitlab-ci")]
    GitLabCi,
    #[serde(rename = "azure-pipelines")]
    AzurePipelines,
}

/// Pull-request context detected from the CI environment. Every field is
/// optional; whatever the environment does not provide is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CiContext {
    pub platform: Option<CiPlatform>,
    pub properties: BTreeMap<&'static str, String>,
}

impl CiContext {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Detect the CI context from the process environment.
pub fn detect() -> CiContext {
    detect_from(|key| std::env::var(key).ok())
}

/// Detect the CI context through an explicit read-only lookup. The two
/// platform branches are independent and non-exclusive; boolean flags
/// parse case-insensitively and an absent flag counts as false.
pub fn detect_from(lookup: impl Fn(&str) -> Option<String>) -> CiContext {
    let mut context = CiContext::default();

    if is_flag_set(lookup("GITLAB_CI")) {
        context.platform = Some(CiPlatform::GitLabCi);
        if let Some(url) = lookup("CI_MERGE_REQUEST_PROJECT_URL") {
            context.properties.insert(GITLAB_PROJECT_URL, url);
        }
        if let Some(pipeline_id) = lookup("CI_PIPELINE_ID") {
            context.properties.insert(GITLAB_PIPELINE_ID, pipeline_id);
        }
    }

    if is_flag_set(lookup("TF_BUILD")) {
        context.platform.get_or_insert(CiPlatform::AzurePipelines);
        if let Some(id) = lookup("SYSTEM_PULLREQUEST_PULLREQUESTID") {
            context.properties.insert(PULL_REQUEST_KEY, id);
        }
        let from_fork = is_flag_set(lookup("SYSTEM_PULLREQUEST_ISFORK"));
        if let Some(source) = lookup("SYSTEM_PULLREQUEST_SOURCEBRANCH") {
            context
                .properties
                .insert(PULL_REQUEST_BRANCH, branch::normalize_branch(&source, from_fork));
        }
        if let Some(target) = lookup("SYSTEM_PULLREQUEST_TARGETBRANCH") {
            context
                .properties
                .insert(PULL_REQUEST_BASE, branch::normalize_branch(&target, false));
        }
    }

    debug!(
        platform = ?context.platform,
        properties = context.properties.len(),
        "detected CI context"
    );
    context
}

fn is_flag_set(value: Option<String>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn detect_in(env: &HashMap<String, String>) -> CiContext {
        detect_from(|key| env.get(key).cloned())
    }

    #[test]
    fn test_no_flags_yields_empty_context() {
        let context = detect_in(&env_of(&[("CI_PIPELINE_ID", "42")]));
        assert!(context.platform.is_none());
        assert!(context.properties.is_empty());
    }

    #[test]
    fn test_gitlab_attaches_exactly_present_values() {
        let env = env_of(&[
            ("GITLAB_CI", "true"),
            ("CI_PIPELINE_ID", "42"),
            ("CI_MERGE_REQUEST_PROJECT_URL", "http://x"),
        ]);
        let context = detect_in(&env);
        assert_eq!(context.platform, Some(CiPlatform::GitLabCi));
        assert_eq!(context.properties.len(), 2);
        assert_eq!(context.property(GITLAB_PIPELINE_ID), Some("42"));
        assert_eq!(context.property(GITLAB_PROJECT_URL), Some("http://x"));
    }

    #[test]
    fn test_gitlab_omits_missing_values() {
        let env = env_of(&[("GITLAB_CI", "true"), ("CI_PIPELINE_ID", "42")]);
        let context = detect_in(&env);
        assert_eq!(context.properties.len(), 1);
        assert!(context.property(GITLAB_PROJECT_URL).is_none());
    }

    #[test]
    fn test_azure_attaches_id_and_normalized_branches() {
        let env = env_of(&[
            ("TF_BUILD", "True"),
            ("SYSTEM_PULLREQUEST_PULLREQUESTID", "7"),
            ("SYSTEM_PULLREQUEST_SOURCEBRANCH", "refs/heads/master"),
            ("SYSTEM_PULLREQUEST_TARGETBRANCH", "refs/heads/main"),
        ]);
        let context = detect_in(&env);
        assert_eq!(context.platform, Some(CiPlatform::AzurePipelines));
        assert_eq!(context.properties.len(), 3);
        assert_eq!(context.property(PULL_REQUEST_KEY), Some("7"));
        assert_eq!(context.property(PULL_REQUEST_BRANCH), Some("master"));
        assert_eq!(context.property(PULL_REQUEST_BASE), Some("main"));
    }

    #[test]
    fn test_azure_fork_flag_applies_to_source_branch_only() {
        let env = env_of(&[
            ("TF_BUILD", "true"),
            ("SYSTEM_PULLREQUEST_ISFORK", "TRUE"),
            (
                "SYSTEM_PULLREQUEST_SOURCEBRANCH",
                "refs/heads/users/raisa/feature/new-feature",
            ),
            (
                "SYSTEM_PULLREQUEST_TARGETBRANCH",
                "refs/heads/users/raisa/main",
            ),
        ]);
        let context = detect_in(&env);
        assert_eq!(
            context.property(PULL_REQUEST_BRANCH),
            Some("feature/new-feature")
        );
        // Target branch never gets fork stripping.
        assert_eq!(context.property(PULL_REQUEST_BASE), Some("users/raisa/main"));
    }

    #[test]
    fn test_both_platforms_attach_independently() {
        let env = env_of(&[
            ("GITLAB_CI", "true"),
            ("CI_PIPELINE_ID", "42"),
            ("TF_BUILD", "true"),
            ("SYSTEM_PULLREQUEST_PULLREQUESTID", "7"),
        ]);
        let context = detect_in(&env);
        assert_eq!(context.platform, Some(CiPlatform::GitLabCi));
        assert_eq!(context.properties.len(), 2);
        assert_eq!(context.property(PULL_REQUEST_KEY), Some("7"));
    }

    #[test]
    fn test_false_flag_is_ignored() {
        let env = env_of(&[("GITLAB_CI", "false"), ("CI_PIPELINE_ID", "42")]);
        let context = detect_in(&env);
        assert!(context.platform.is_none());
        assert!(context.properties.is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let env = env_of(&[
            ("TF_BUILD", "true"),
            ("SYSTEM_PULLREQUEST_PULLREQUESTID", "7"),
            ("SYSTEM_PULLREQUEST_SOURCEBRANCH", "refs/heads/master"),
        ]);
        assert_eq!(detect_in(&env), detect_in(&env));
    }
}
