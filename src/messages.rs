//! Localized Error Messages
//!
//! The client reports [`ErrorKind`]s; turning them into text for people is
//! done here, through a table keyed by `(kind, locale)`. The default table
//! ships English and Russian entries. Callers can replace any entry.

use crate::error::{Error, ErrorKind};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Languages the default table has texts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Parses a language tag, falling back to English for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Message texts keyed by error kind and locale.
#[derive(Debug, Clone)]
pub struct MessageTable {
    entries: HashMap<(ErrorKind, Locale), Cow<'static, str>>,
}

impl MessageTable {
    /// An empty table. Rendering falls back to the bare error detail.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Sets the text for one `(kind, locale)` pair.
    pub fn set(&mut self, kind: ErrorKind, locale: Locale, text: impl Into<Cow<'static, str>>) {
        self.entries.insert((kind, locale), text.into());
    }

    /// Looks up a text, falling back to the English entry.
    pub fn get(&self, kind: ErrorKind, locale: Locale) -> Option<&str> {
        self.entries
            .get(&(kind, locale))
            .or_else(|| self.entries.get(&(kind, Locale::En)))
            .map(|text| &**text)
    }

    /// Renders `"<localized text>: <error detail>"`.
    pub fn render(&self, err: &Error, locale: Locale) -> String {
        match self.get(err.kind(), locale) {
            Some(text) => format!("{}: {}", text, err),
            None => err.to_string(),
        }
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (kind, en, ru) in DEFAULT_TEXTS {
            table.set(*kind, Locale::En, *en);
            table.set(*kind, Locale::Ru, *ru);
        }
        table
    }
}

const DEFAULT_TEXTS: &[(ErrorKind, &str, &str)] = &[
    (
        ErrorKind::Connection,
        "Failed to open connect to Redis",
        "Не удалось открыть соединение с Redis",
    ),
    (
        ErrorKind::CommandFailed,
        "Service is temporarily unavailable",
        "Сервис временно не работает",
    ),
    (
        ErrorKind::ReplyUnavailable,
        "Unable to read reply from Redis for command",
        "Невозможно прочитать ответ Redis-а для команды",
    ),
    (
        ErrorKind::Io,
        "Connection to Redis broke while reading reply",
        "Соединение с Redis прервалось при чтении ответа",
    ),
    (ErrorKind::Server, "Redis error", "Ошибка Redis"),
    (
        ErrorKind::UnexpectedReplyFormat,
        "Redis error Non-protocol answer",
        "Ошибка Redis Неведомый ответ не по протоколу",
    ),
    (
        ErrorKind::Protocol,
        "Malformed reply from Redis",
        "Некорректный ответ Redis",
    ),
    (
        ErrorKind::KeyNotFound,
        "Can't found in Redis key",
        "Не могу найти в Redis-е ключ",
    ),
];
