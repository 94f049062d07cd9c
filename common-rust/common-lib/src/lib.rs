//! Shared definitions for the follow client: the backend wire contract and the
//! user-facing model the client derives from it.

pub mod model;
pub mod wire;

pub use model::{
    FollowDirection, FollowEdge, FollowEntry, FollowStatus, ManagedUser, UserSummary,
    PLACEHOLDER_AVATAR_URL,
};
pub use wire::{EdgeItem, EdgeList, ErrorMessage, NewUserRecord, RawUser, UserPatch};

/// JSON schemas of every payload exchanged with the backend, keyed by type name.
pub fn contract_schemas() -> Vec<(&'static str, serde_json::Value)> {
    use schemars::schema_for;

    vec![
        ("RawUser", schema_for!(RawUser).to_value()),
        ("EdgeItem", schema_for!(EdgeItem).to_value()),
        ("EdgeList", schema_for!(EdgeList).to_value()),
        ("NewUserRecord", schema_for!(NewUserRecord).to_value()),
        ("UserPatch", schema_for!(UserPatch).to_value()),
        ("ErrorMessage", schema_for!(ErrorMessage).to_value()),
    ]
}
