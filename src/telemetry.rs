use crate::client::ReviewError;

/// Fire-and-forget failure reporting. Implementations must never block or
/// fail the calling path; the review flow does not depend on them.
pub trait FailureSink: Send + Sync {
    fn capture(
        &self,
        error: &ReviewError,
        tags: &[(&'static str, String)],
        extra: &[(&'static str, String)],
    );
}

/// Production sink: one structured log event per captured failure.
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn capture(
        &self,
        error: &ReviewError,
        tags: &[(&'static str, String)],
        extra: &[(&'static str, String)],
    ) {
        let tags = join_pairs(tags);
        let extra = join_pairs(extra);
        tracing::error!(error = %error, tags = %tags, extra = %extra, "review request failed");
    }
}

fn join_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
