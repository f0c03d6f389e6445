use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One unit of annotation-scoped resources: `(translation, book, chapter)`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterId {
    pub translation: String,
    pub book: u16,
    pub chapter: u16,
}

impl ChapterId {
    pub fn new(translation: impl Into<String>, book: u16, chapter: u16) -> Self {
        Self {
            translation: translation.into(),
            book,
            chapter,
        }
    }

    /// Key segment identifying this chapter in the persistence layer.
    pub fn storage_segment(&self) -> String {
        format!("{}:{}:{}", self.translation, self.book, self.chapter)
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.translation, self.book, self.chapter)
    }
}

#[derive(Clone, Copy, Debug, Error)]
#[error("invalid chapter id, expected `translation:book:chapter`")]
pub struct InvalidChapterId;

impl FromStr for ChapterId {
    type Err = InvalidChapterId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let translation = parts.next().filter(|t| !t.is_empty());

        let (Some(translation), Some(book), Some(chapter)) =
            (translation, parts.next(), parts.next())
        else {
            return Err(InvalidChapterId);
        };

        let book = book.parse().map_err(|_| InvalidChapterId)?;
        let chapter = chapter.parse().map_err(|_| InvalidChapterId)?;

        Ok(Self::new(translation, book, chapter))
    }
}

/// Coordinate of a single word within a chapter: `verse:wordIndexWithinVerse`.
///
/// Serialized as the `"verse:word"` string so it can key a JSON map.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WordCoord {
    pub verse: u32,
    pub word: u32,
}

impl WordCoord {
    #[must_use]
    pub const fn new(verse: u32, word: u32) -> Self {
        Self { verse, word }
    }
}

impl fmt::Display for WordCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.verse, self.word)
    }
}

#[derive(Clone, Copy, Debug, Error)]
#[error("invalid word coordinate, expected `verse:word`")]
pub struct InvalidWordCoord;

impl FromStr for WordCoord {
    type Err = InvalidWordCoord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verse, word) = s.split_once(':').ok_or(InvalidWordCoord)?;

        let verse = verse.parse().map_err(|_| InvalidWordCoord)?;
        let word = word.parse().map_err(|_| InvalidWordCoord)?;

        Ok(Self { verse, word })
    }
}

impl Serialize for WordCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WordCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WordCoordVisitor;

        impl Visitor<'_> for WordCoordVisitor {
            type Value = WordCoord;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a `verse:word` coordinate string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(WordCoordVisitor)
    }
}
