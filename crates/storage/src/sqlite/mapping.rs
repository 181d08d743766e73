use sqlx::Row;
use vocab_core::model::{CardId, Track, VocabularyCard};

use crate::repository::StorageError;

pub(crate) const CARD_COLUMNS: &str =
    "id, prompt, answer, pronunciation, category, word_type, level, notes, example, created_at";

/// Backing table for a track. Only ever one of these fixed names, so it is
/// safe to splice into SQL.
pub(crate) fn table_name(track: Track) -> &'static str {
    match track {
        Track::French => "cards_fr",
        Track::English => "cards_en",
    }
}

pub(crate) fn ser<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn card_id_to_i64(id: CardId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("card_id overflow".into()))
}

pub(crate) fn card_id_from_i64(v: i64) -> Result<CardId, StorageError> {
    u64::try_from(v)
        .map(CardId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid card_id: {v}")))
}

pub(crate) fn count_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid count: {v}")))
}

pub(crate) fn map_card_row(row: &sqlx::sqlite::SqliteRow) -> Result<VocabularyCard, StorageError> {
    Ok(VocabularyCard::from_persisted(
        card_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("prompt").map_err(ser)?,
        row.try_get("answer").map_err(ser)?,
        row.try_get("pronunciation").map_err(ser)?,
        row.try_get("category").map_err(ser)?,
        row.try_get("word_type").map_err(ser)?,
        row.try_get("level").map_err(ser)?,
        row.try_get("notes").map_err(ser)?,
        row.try_get("example").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

/// `?N, ?N+1, ...` placeholders for an `IN (...)` list.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
