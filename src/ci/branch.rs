/// Ref prefix used by the host for branch references.
const HEADS_PREFIX: &str = "refs/heads/";

/// Reduce a platform ref string to a plain branch name.
///
/// Refs without the `refs/heads/` prefix pass through unchanged. With the
/// prefix stripped, a ref coming from a fork additionally loses its two
/// leading path segments (the `users/<user>/` indirection), so
/// `refs/heads/users/raisa/feature/x` becomes `feature/x`. When a segment
/// separator is missing the remainder is kept as-is rather than emptied.
/// Malformed refs are not validated; they pass through best-effort.
pub fn normalize_branch(ref_name: &str, from_fork: bool) -> String {
    let Some(stripped) = ref_name.strip_prefix(HEADS_PREFIX) else {
        return ref_name.to_string();
    };

    let mut branch = stripped;
    if from_fork {
        for _ in 0..2 {
            if let Some(index) = branch.find('/') {
                branch = &branch[index + 1..];
            }
        }
    }

    branch.to_string()
}
