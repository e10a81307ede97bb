//! Roles and permissions.
//!
//! Group membership and granted permissions are rows in `user_groups` and
//! `group_permissions`. They are read fresh for every request; nothing here
//! is cached across requests, so elevation takes effect immediately.

use crate::constants::{MANAGERS_GROUP, PERM_SEND_MASS_EMAIL};
use crate::orm::{ads, group_permissions, groups, permissions, user_groups, users};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::HashSet;

/// Groups and permissions held by one user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roles {
    groups: HashSet<String>,
    permissions: HashSet<String>,
}

impl Roles {
    pub fn new<G, P>(groups: G, permissions: P) -> Self
    where
        G: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        Self {
            groups: groups.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.contains(name)
    }

    pub fn has_permission(&self, codename: &str) -> bool {
        self.permissions.contains(codename)
    }

    pub fn is_manager(&self) -> bool {
        self.in_group(MANAGERS_GROUP)
    }

    pub fn can_send_mass_email(&self) -> bool {
        self.has_permission(PERM_SEND_MASS_EMAIL)
    }
}

/// Loads the groups of `user_id` and every permission granted through them.
pub async fn load_roles<C>(db: &C, user_id: i32) -> Result<Roles, DbErr>
where
    C: ConnectionTrait,
{
    let group_ids: Vec<i32> = user_groups::Entity::find()
        .filter(user_groups::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|ug| ug.group_id)
        .collect();

    if group_ids.is_empty() {
        return Ok(Roles::default());
    }

    let group_names = groups::Entity::find()
        .filter(groups::Column::Id.is_in(group_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.name);

    let permission_ids: Vec<i32> = group_permissions::Entity::find()
        .filter(group_permissions::Column::GroupId.is_in(group_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|gp| gp.permission_id)
        .collect();

    let codenames = if permission_ids.is_empty() {
        Vec::new()
    } else {
        permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| p.codename)
            .collect()
    };

    Ok(Roles::new(group_names, codenames))
}

/// True when `user` wrote `ad`.
pub fn is_ad_author(user: &users::Model, ad: &ads::Model) -> bool {
    user.id == ad.author_id
}
