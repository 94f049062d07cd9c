//! Profile drafts on disk.
//!
//! Saved drafts are a version byte followed by pretty JSON. Plain JSON files
//! (what a person writes by hand) are read as well.

use crate::error::{ClientError, ClientResult};
use crate::profile::ProfileDraft;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

pub const DRAFT_VERSION_V1: u8 = 1u8;

pub(crate) fn serialize<T>(value: &T) -> ClientResult<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let data = serde_json::to_vec_pretty(value)?;

    let mut result = vec![DRAFT_VERSION_V1];
    result.extend(data);

    Ok(result)
}

pub(crate) fn deserialize<T>(bytes: &[u8]) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let Some((version, data)) = bytes.split_first() else {
        return Err(ClientError::Config("draft file is empty".to_string()));
    };

    match *version {
        DRAFT_VERSION_V1 => Ok(serde_json::from_slice(data)?),
        b'{' => Ok(serde_json::from_slice(bytes)?),
        other => Err(ClientError::Config(format!(
            "unsupported draft version: {other}"
        ))),
    }
}

pub async fn load(path: &Path) -> ClientResult<ProfileDraft> {
    let bytes = tokio::fs::read(path).await?;
    deserialize(skip_whitespace(&bytes))
}

pub async fn save(path: &Path, draft: &ProfileDraft) -> ClientResult<()> {
    let bytes = serialize(draft)?;
    tokio::fs::write(path, bytes).await?;
    log::debug!("draft saved to {}", path.display());
    Ok(())
}

/// Writes `current` only when it differs from the draft that was loaded.
pub async fn save_if_changed(
    path: &Path,
    loaded: &ProfileDraft,
    current: &ProfileDraft,
) -> ClientResult<bool> {
    if loaded == current {
        return Ok(false);
    }
    save(path, current).await?;
    Ok(true)
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
