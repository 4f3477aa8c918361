//! User accounts.
//!
//! Users are owned by the accounts subsystem; the finance core reads them
//! for authorization and notification targeting.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Actor, EngineError, util::impl_text_enum, util::parse_uuid};

/// Account-level role shared across subsystems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Director,
    Accountant,
    Driver,
    Teacher,
    Parent,
}

impl_text_enum!(Role, "role", {
    Director => "DIRECTOR",
    Accountant => "ACCOUNTANT",
    Driver => "DRIVER",
    Teacher => "TEACHER",
    Parent => "PARENT",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: String,
    pub role: Role,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.phone_number
        } else {
            &self.full_name
        }
    }

    pub(crate) fn into_actor(self, employee_id: Option<Uuid>) -> Actor {
        Actor {
            user_id: self.id,
            phone_number: self.phone_number,
            full_name: self.full_name,
            role: self.role,
            is_superuser: self.is_superuser,
            employee_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub full_name: String,
    pub role: String,
    pub is_superuser: bool,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            role: Role::try_from(model.role.as_str())?,
            phone_number: model.phone_number,
            full_name: model.full_name,
            is_superuser: model.is_superuser,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, EngineError> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| EngineError::field("password", err.to_string()))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_text() {
        assert_eq!(Role::try_from("ACCOUNTANT").unwrap(), Role::Accountant);
        assert_eq!(Role::Parent.as_str(), "PARENT");
        assert!(Role::try_from("ADMIN").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-hash"));
    }
}
