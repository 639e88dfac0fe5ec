//! User entity.

use serde::{Deserialize, Serialize};

use crate::model::{seed_date, EntityKind, Record, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields required to create a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl Record for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewUser, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn seed() -> Vec<Self> {
        vec![
            seed_user(1, "John Doe", "john@example.com", "admin", (2023, 1, 1), (2023, 12, 1)),
            seed_user(2, "Jane Smith", "jane@example.com", "user", (2023, 2, 1), (2023, 11, 1)),
            seed_user(3, "Bob Johnson", "bob@example.com", "user", (2023, 3, 1), (2023, 10, 1)),
        ]
    }
}

fn seed_user(
    id: u64,
    name: &str,
    email: &str,
    role: &str,
    created: (i32, u32, u32),
    updated: (i32, u32, u32),
) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        created_at: seed_date(created.0, created.1, created.2),
        updated_at: seed_date(updated.0, updated.1, updated.2),
    }
}
