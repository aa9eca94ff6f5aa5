use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::identity::IdentityVerifier;
use crate::lang::{Lang, LocaleCatalog};
use crate::services::{HttpImageHost, HttpSiteHooks, ImageHost, Publisher, SiteHooks};
use crate::store::{
    MemoryPersonnelStore, MemoryPostStore, PersonnelStore, PostStore, SeaPersonnelStore,
    SeaPostStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub personnel: Arc<dyn PersonnelStore>,
    pub posts: Arc<dyn PostStore>,
    /// Cache invalidation and push notification queue
    pub publisher: Publisher,
    pub images: Arc<dyn ImageHost>,
    pub identity: Arc<IdentityVerifier>,
    pub locales: Arc<LocaleCatalog>,
    /// Language for requests that name none
    pub default_lang: Lang,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect the configured backend and start the hook delivery task
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let (personnel, posts): (Arc<dyn PersonnelStore>, Arc<dyn PostStore>) =
            match config.database.backend {
                StoreBackend::Postgres => {
                    let conn = db::init_database(&config.database).await?;
                    (
                        Arc::new(SeaPersonnelStore::new(conn.clone())),
                        Arc::new(SeaPostStore::new(conn)),
                    )
                }
                StoreBackend::Memory => {
                    tracing::warn!("Using the in-memory store; records are lost on restart");
                    (
                        Arc::new(MemoryPersonnelStore::new()),
                        Arc::new(MemoryPostStore::new()),
                    )
                }
            };

        let hooks: Arc<dyn SiteHooks> = Arc::new(HttpSiteHooks::new(config.site.clone()));
        let images: Arc<dyn ImageHost> = Arc::new(HttpImageHost::new(config.upload.clone()));
        let identity = IdentityVerifier::from_config(&config.auth)?;
        let locales = LocaleCatalog::load(&config.site.locales_dir);

        Ok(Self::new(
            personnel,
            posts,
            Publisher::spawn(hooks),
            images,
            identity,
            locales,
            config,
        ))
    }

    pub fn new(
        personnel: Arc<dyn PersonnelStore>,
        posts: Arc<dyn PostStore>,
        publisher: Publisher,
        images: Arc<dyn ImageHost>,
        identity: IdentityVerifier,
        locales: LocaleCatalog,
        config: Config,
    ) -> Self {
        let default_lang = config.site.default_lang.parse().unwrap_or_else(|e| {
            tracing::warn!("{}; falling back to ms", e);
            Lang::Ms
        });

        Self {
            personnel,
            posts,
            publisher,
            images,
            identity: Arc::new(identity),
            locales: Arc::new(locales),
            default_lang,
            config: Arc::new(config),
        }
    }
}

/// State over the in-memory stores and recording fakes
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::identity::testing::config as auth_config;
    use crate::services::site::testing::RecordingHooks;
    use crate::services::upload::testing::FakeImageHost;

    pub struct TestApp {
        pub state: AppState,
        pub personnel: Arc<MemoryPersonnelStore>,
        pub posts: Arc<MemoryPostStore>,
        pub hooks: Arc<RecordingHooks>,
        pub images: Arc<FakeImageHost>,
    }

    pub fn test_app(admins: &[&str]) -> TestApp {
        let mut config = Config::default();
        config.auth = auth_config(admins);
        config.site.base_url = "https://school.example".to_string();

        let personnel = Arc::new(MemoryPersonnelStore::new());
        let posts = Arc::new(MemoryPostStore::new());
        let hooks = Arc::new(RecordingHooks::default());
        let images = Arc::new(FakeImageHost::default());

        let mut locales = LocaleCatalog::default();
        locales.insert(Lang::Ms, serde_json::json!({ "home": "Laman Utama" }));

        let state = AppState::new(
            personnel.clone(),
            posts.clone(),
            Publisher::spawn(hooks.clone()),
            images.clone(),
            IdentityVerifier::from_config(&config.auth).unwrap(),
            locales,
            config,
        );

        TestApp {
            state,
            personnel,
            posts,
            hooks,
            images,
        }
    }
}
