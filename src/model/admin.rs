/// Administrator account. Identified at login by `email`.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
