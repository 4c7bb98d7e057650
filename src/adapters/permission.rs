//! Static permission source.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ports::PermissionSource;

/// Permission flag set by the host (or a test).
#[derive(Debug, Clone, Default)]
pub struct StaticPermission {
    granted: Arc<AtomicBool>,
}

impl StaticPermission {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

#[async_trait]
impl PermissionSource for StaticPermission {
    async fn has_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}
