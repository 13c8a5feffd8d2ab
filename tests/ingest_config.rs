// tests/ingest_config.rs
use crypto_news_feed::config::AppConfig;
use crypto_news_feed::ingest::config::{
    default_sources, load_sources_default, load_sources_from, ENV_FEEDS_PATH,
};
use crypto_news_feed::ingest::types::FeedSource;
use std::time::Duration;
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feeds.toml");
    fs::write(
        &p_toml,
        r#"
[[sources]]
name = " CNBC Economy"
url = "https://cnbc.test/economy"
tag = "Macro News"

[[sources]]
name = "Empty tag"
url = "https://x.test"
tag = ""
"#,
    )
    .unwrap();
    let v = load_sources_from(&p_toml).unwrap();
    assert_eq!(
        v,
        vec![FeedSource::new("CNBC Economy", "https://cnbc.test/economy", "Macro News")]
    );

    let p_json = dir.path().join("feeds.json");
    fs::write(
        &p_json,
        r#"[{"name":"Decrypt","url":"https://decrypt.test/rss","tag":"Crypto News"}]"#,
    )
    .unwrap();
    let vj = load_sources_from(&p_json).unwrap();
    assert_eq!(vj[0].name, "Decrypt");

    let p_bad = dir.path().join("feeds.yaml");
    fs::write(&p_bad, "sources:\n  - name: nope\n").unwrap();
    assert!(load_sources_from(&p_bad).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the test never reads a real config/ directory.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_FEEDS_PATH);

    // 1) Nothing on disk -> built-in list
    assert_eq!(load_sources_default().unwrap(), default_sources());

    // 2) JSON fallback in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("feeds.json"),
        r#"[{"name":"J","url":"https://j.test","tag":"T"}]"#,
    )
    .unwrap();
    assert_eq!(load_sources_default().unwrap()[0].name, "J");

    // 3) TOML beats JSON
    fs::write(
        cfg_dir.join("feeds.toml"),
        "[[sources]]\nname = \"T\"\nurl = \"https://t.test\"\ntag = \"T\"\n",
    )
    .unwrap();
    assert_eq!(load_sources_default().unwrap()[0].name, "T");

    // 4) ENV beats both
    let p_env = tmp.path().join("env.json");
    fs::write(&p_env, r#"[{"name":"E","url":"https://e.test","tag":"T"}]"#).unwrap();
    env::set_var(ENV_FEEDS_PATH, p_env.display().to_string());
    assert_eq!(load_sources_default().unwrap()[0].name, "E");

    env::remove_var(ENV_FEEDS_PATH);
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn app_config_reads_env_and_ignores_garbage() {
    env::set_var("NEWS_FETCH_TIMEOUT_SECS", "3");
    env::set_var("NEWS_CACHE_TTL_MS", "not-a-number");
    env::remove_var("NEWS_USER_AGENT");

    let cfg = AppConfig::from_env();
    assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
    assert_eq!(cfg.cache_ttl, AppConfig::default().cache_ttl);
    assert!(cfg.user_agent.starts_with("crypto-news-feed/"));

    env::remove_var("NEWS_FETCH_TIMEOUT_SECS");
    env::remove_var("NEWS_CACHE_TTL_MS");
}
