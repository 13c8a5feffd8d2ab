// src/ingest/config.rs
//! The static source list: name -> (feed URL, category tag).
//!
//! Editing this list (built-in or file) is the only way to add or remove sources.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSource;

pub const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";

const CRYPTO: &str = "Crypto News";
const FINANCIAL: &str = "Financial News";
const MACRO: &str = "Macro News";

/// Built-in sources, in the order they are processed.
pub fn default_sources() -> Vec<FeedSource> {
    [
        ("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/", CRYPTO),
        ("Cointelegraph", "https://cointelegraph.com/rss", CRYPTO),
        ("Decrypt", "https://decrypt.co/feed/rss", CRYPTO),
        ("CryptoSlate", "https://cryptoslate.com/feed/", CRYPTO),
        ("BeInCrypto", "https://beincrypto.com/feed/", CRYPTO),
        ("Bitcoin.com", "https://news.bitcoin.com/feed/", CRYPTO),
        ("NewsBTC", "https://www.newsbtc.com/feed/", CRYPTO),
        ("AmbCrypto", "https://ambcrypto.com/feed", CRYPTO),
        ("CryptoNews.com", "https://cryptonews.com/news/feed", CRYPTO),
        ("Blockonomi", "https://blockonomi.com/feed/", CRYPTO),
        ("DailyCoin", "https://dailycoin.com/feed/", CRYPTO),
        ("CoinGape", "https://coingape.com/feed", CRYPTO),
        ("Yahoo Finance", "https://finance.yahoo.com/news/rssindex", FINANCIAL),
        (
            "Investopedia",
            "https://www.investopedia.com/feedbuilder/feed/getfeed/?feedName=rss_headline",
            FINANCIAL,
        ),
        (
            "CNBC Top News",
            "https://www.cnbc.com/id/100003114/device/rss/rss.html",
            FINANCIAL,
        ),
        ("MarketWatch", "https://www.marketwatch.com/rss/topstories", FINANCIAL),
        (
            "CNBC Economy",
            "https://www.cnbc.com/id/20910258/device/rss/rss.html",
            MACRO,
        ),
    ]
    .into_iter()
    .map(|(name, url, tag)| FeedSource::new(name, url, tag))
    .collect()
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in [`default_sources`]
pub fn load_sources_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSource>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<FeedSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<FeedSource>> {
    let v: Vec<FeedSource> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim every field, drop incomplete rows and repeated names (first one wins).
fn clean_list(items: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let src = FeedSource::new(it.name.trim(), it.url.trim(), it.tag.trim());
        if src.name.is_empty() || src.url.is_empty() || src.tag.is_empty() {
            continue;
        }
        if seen.insert(src.name.clone()) {
            out.push(src);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn builtin_list_has_expected_shape() {
        let v = default_sources();
        assert_eq!(v.len(), 17);
        assert_eq!(v[0].name, "CoinDesk");
        assert_eq!(v.iter().filter(|s| s.tag == CRYPTO).count(), 12);
        assert_eq!(v.iter().filter(|s| s.tag == FINANCIAL).count(), 4);
        assert_eq!(v.last().unwrap().tag, MACRO);
        assert!(v.iter().all(|s| s.name == s.name.trim()));
    }

    #[test]
    fn dedup_trim_and_formats_work() {
        let toml = r#"
[[sources]]
name = " CoinDesk "
url = "https://c.test/rss"
tag = "Crypto News"

[[sources]]
name = "CoinDesk"
url = "https://dup.test/rss"
tag = "Crypto News"

[[sources]]
name = "NoUrl"
url = ""
tag = "Crypto News"
"#;
        let json = r#"[{"name":"MarketWatch","url":" https://m.test ","tag":"Financial News"}]"#;
        let toml_out = parse_toml(toml).unwrap();
        assert_eq!(
            toml_out,
            vec![FeedSource::new("CoinDesk", "https://c.test/rss", "Crypto News")]
        );
        let json_out = parse_json(json).unwrap();
        assert_eq!(
            json_out,
            vec![FeedSource::new("MarketWatch", "https://m.test", "Financial News")]
        );
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_FEEDS_PATH);

        // No files in the temp CWD -> built-in list
        let v = load_sources_default().unwrap();
        assert_eq!(v, default_sources());

        // Env wins
        let p_json = tmp.path().join("feeds.json");
        fs::write(&p_json, r#"[{"name":"X","url":"https://x.test","tag":"T"}]"#).unwrap();
        env::set_var(ENV_FEEDS_PATH, p_json.display().to_string());
        let v2 = load_sources_default().unwrap();
        assert_eq!(v2, vec![FeedSource::new("X", "https://x.test", "T")]);

        // Env pointing nowhere is an error, not a silent fallback
        env::set_var(ENV_FEEDS_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_sources_default().is_err());
        env::remove_var(ENV_FEEDS_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
