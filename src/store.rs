use async_trait::async_trait;

use crate::config::ExtraLink;

/// Read-only access to the externally managed extra link.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// The most recently configured extra link, if any.
    async fn latest_extra_link(&self) -> Option<ExtraLink>;
}

/// Link store backed by the `[extra_link]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticLinkStore {
    link: Option<ExtraLink>,
}

impl StaticLinkStore {
    pub fn new(link: Option<ExtraLink>) -> Self {
        Self { link }
    }
}

#[async_trait]
impl LinkStore for StaticLinkStore {
    async fn latest_extra_link(&self) -> Option<ExtraLink> {
        self.link.clone()
    }
}
