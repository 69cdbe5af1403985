//! Mutation kinds and the tags each one invalidates.
//!
//! The table is data, not control flow: [`INVALIDATION_TABLE`] is the single
//! authority on what a successful mutation marks stale.

use std::fmt;

use recipebox_api_types::Id;

use super::keys::{Tag, TagType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Login,
    Register,
    CreateRecipe,
    UpdateRecipe,
    DeleteRecipe,
    UpsertRating,
    DeleteRating,
}

impl MutationKind {
    pub const ALL: [MutationKind; 7] = [
        Self::Login,
        Self::Register,
        Self::CreateRecipe,
        Self::UpdateRecipe,
        Self::DeleteRecipe,
        Self::UpsertRating,
        Self::DeleteRating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::CreateRecipe => "create-recipe",
            Self::UpdateRecipe => "update-recipe",
            Self::DeleteRecipe => "delete-recipe",
            Self::UpsertRating => "upsert-rating",
            Self::DeleteRating => "delete-rating",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared invalidation: a whole tag family, or the family scoped to the
/// mutation's target id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Coarse(TagType),
    ScopedToTarget(TagType),
}

pub const INVALIDATION_TABLE: &[(MutationKind, &[Target])] = &[
    (MutationKind::Login, &[]),
    (MutationKind::Register, &[]),
    (MutationKind::CreateRecipe, &[Target::Coarse(TagType::Recipe)]),
    (MutationKind::UpdateRecipe, &[Target::Coarse(TagType::Recipe)]),
    (MutationKind::DeleteRecipe, &[Target::Coarse(TagType::Recipe)]),
    (
        MutationKind::UpsertRating,
        &[
            Target::Coarse(TagType::Recipe),
            Target::ScopedToTarget(TagType::Rating),
        ],
    ),
    (MutationKind::DeleteRating, &[Target::Coarse(TagType::Recipe)]),
];

/// Declared targets for `kind`.
pub fn declared(kind: MutationKind) -> &'static [Target] {
    INVALIDATION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Concrete tags to invalidate after `kind` succeeded against `target_id`.
///
/// A scoped target with no id to scope to widens to the coarse tag, so an
/// invalidation is never silently dropped.
pub fn resolve(kind: MutationKind, target_id: Option<Id>) -> Vec<Tag> {
    declared(kind)
        .iter()
        .map(|target| match (*target, target_id) {
            (Target::Coarse(family), _) => Tag::coarse(family),
            (Target::ScopedToTarget(family), Some(id)) => Tag::with_id(family, id),
            (Target::ScopedToTarget(family), None) => Tag::coarse(family),
        })
        .collect()
}
