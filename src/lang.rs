//! Language context
//!
//! The language is resolved per request (query `lang`, then the `lang`
//! cookie, then `Accept-Language`, then the configured default) and passed
//! around as a plain value.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ms,
    Zh,
    En,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Ms, Lang::Zh, Lang::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Ms => "ms",
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }

    /// Records carry Malay and Chinese text only; Chinese is used for `zh`
    /// when present, Malay otherwise.
    pub fn pick<'a>(&self, ms: &'a str, zh: Option<&'a str>) -> &'a str {
        match (self, zh) {
            (Lang::Zh, Some(zh)) if !zh.trim().is_empty() => zh,
            _ => ms,
        }
    }

    /// First tag of an `Accept-Language` header we can serve
    pub fn from_accept_language(header: &str) -> Option<Lang> {
        header
            .split(',')
            .map(|part| part.split(';').next().unwrap_or("").trim())
            .find_map(|tag| tag.parse().ok())
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = String;

    /// Accepts bare codes and regional tags (`zh-TW`, `ms-MY`); `my` is Malay.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
        match primary.as_str() {
            "ms" | "my" => Ok(Lang::Ms),
            "zh" => Ok(Lang::Zh),
            "en" => Ok(Lang::En),
            _ => Err(format!("unsupported language: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Ok(Query(q)) = Query::<LangQuery>::from_request_parts(parts, state).await {
            if let Some(lang) = q.lang.and_then(|l| l.parse().ok()) {
                return Ok(lang);
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(lang) = jar.get("lang").and_then(|c| c.value().parse().ok()) {
            return Ok(lang);
        }

        let accepted = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Lang::from_accept_language);

        Ok(accepted.unwrap_or(state.default_lang))
    }
}

/// UI strings per language, loaded once at start-up
#[derive(Debug, Default)]
pub struct LocaleCatalog {
    entries: HashMap<Lang, Value>,
}

impl LocaleCatalog {
    /// Read `<dir>/<lang>.json` for every language. Missing or broken files
    /// are logged and leave that language empty.
    pub fn load(dir: &Path) -> Self {
        let mut entries = HashMap::new();
        for lang in Lang::ALL {
            let path = dir.join(format!("{}.json", lang));
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));
            match parsed {
                Ok(value) => {
                    entries.insert(lang, value);
                }
                Err(e) => tracing::warn!("Locale file {} not loaded: {}", path.display(), e),
            }
        }
        tracing::info!("Loaded {} locale file(s) from {}", entries.len(), dir.display());
        Self { entries }
    }

    pub fn insert(&mut self, lang: Lang, strings: Value) {
        self.entries.insert(lang, strings);
    }

    pub fn get(&self, lang: Lang) -> Option<&Value> {
        self.entries.get(&lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("zh-TW".parse::<Lang>(), Ok(Lang::Zh));
        assert_eq!("ms_MY".parse::<Lang>(), Ok(Lang::Ms));
        assert_eq!("my".parse::<Lang>(), Ok(Lang::Ms));
        assert_eq!("EN".parse::<Lang>(), Ok(Lang::En));
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_accept_language_takes_first_supported() {
        assert_eq!(Lang::from_accept_language("fr-FR,fr;q=0.9,zh-CN;q=0.8"), Some(Lang::Zh));
        assert_eq!(Lang::from_accept_language("de"), None);
    }

    #[test]
    fn test_pick_falls_back_on_blank_chinese() {
        assert_eq!(Lang::Zh.pick("Guru", Some("老师")), "老师");
        assert_eq!(Lang::Zh.pick("Guru", Some("  ")), "Guru");
        assert_eq!(Lang::En.pick("Guru", Some("老师")), "Guru");
    }

    #[test]
    fn test_catalog_load_skips_missing_files() {
        let dir = std::env::temp_dir().join(format!("schoolsite-locales-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ms.json"), r#"{"home":"Laman Utama"}"#).unwrap();
        std::fs::write(dir.join("zh.json"), "not json").unwrap();

        let catalog = LocaleCatalog::load(&dir);
        assert_eq!(catalog.get(Lang::Ms).unwrap()["home"], "Laman Utama");
        assert!(catalog.get(Lang::Zh).is_none());
        assert!(catalog.get(Lang::En).is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
