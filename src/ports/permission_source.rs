//! Permission Source Port - Microphone/recording capability.

use async_trait::async_trait;

/// Reports whether recording permission has been granted.
///
/// Read once per start request; the answer is not cached by the session.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn has_permission(&self) -> bool;
}
