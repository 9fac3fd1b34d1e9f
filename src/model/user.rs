use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Asha")]
    pub name: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    /// argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl NewUser {
    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password_hash,
            role: self.role,
        }
    }
}
