//! Integration tests for configuration files and logging setup.

use mimepart::config::{load_config_from, save_config_to, Config};
use mimepart::parser::part::scan_part;
use mimepart::{logging, MimeError, MimePart};

const LATIN1_PART: &[u8] = b"Content-Type: text/plain\r\n\r\nna\xefve\r\n";

const UNKNOWN_CHARSET_PART: &[u8] = b"Content-Type: text/plain; charset=x-klingon\r\n\
Content-Transfer-Encoding: x-uuencode\r\n\
\r\n\
qapla'\r\n";

fn part_from(raw: &[u8], config: &Config) -> MimePart {
    MimePart::with_config("1", scan_part(raw, 0), raw.to_vec(), &config.decoding)
}

// ─── Config files ───────────────────────────────────────────────────

#[test]
fn test_saved_config_drives_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut cfg = Config::default();
    cfg.decoding.default_charset = "iso-8859-1".to_string();
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path);
    let part = part_from(LATIN1_PART, &loaded);
    assert_eq!(part.decoded().unwrap(), "naïve\r\n");
}

#[test]
fn test_hand_written_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[decoding]\nstrict = true\n").unwrap();

    let cfg = load_config_from(&path);
    assert!(cfg.decoding.strict);
    assert_eq!(cfg.decoding.default_charset, "utf-8");
}

#[test]
fn test_broken_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "decoding = [").unwrap();

    let cfg = load_config_from(&path);
    let part = part_from(UNKNOWN_CHARSET_PART, &cfg);
    assert_eq!(part.decoded().unwrap(), "qapla'\r\n");
}

#[test]
fn test_strict_config_rejects_unknown_names() {
    let mut cfg = Config::default();
    cfg.decoding.strict = true;

    let part = part_from(UNKNOWN_CHARSET_PART, &cfg);
    let err = part.decoded().unwrap_err();
    assert!(matches!(err, MimeError::UnsupportedEncoding(ref e) if e == "x-uuencode"));

    let mut part = part;
    part.set_transfer_decoder(
        |bytes: &[u8], _: Option<&str>| -> mimepart::Result<Vec<u8>> { Ok(bytes.to_vec()) },
    );
    let err = part.decoded().unwrap_err();
    assert!(matches!(err, MimeError::UnsupportedCharset(ref c) if c == "x-klingon"));
}

// ─── Logging ────────────────────────────────────────────────────────

#[test]
fn test_logging_to_file_in_cache_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.general.cache_dir = Some(dir.path().join("cache"));
    cfg.general.log_to_file = true;

    let log_file = logging::init(&cfg).expect("file logging enabled");
    assert_eq!(log_file, dir.path().join("cache").join("mimepart.log"));
    assert!(log_file.exists());
}
