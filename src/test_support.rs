//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    auth::password::hash_password,
    config::Config,
    leave::balance::LeaveAllowances,
    model::{
        admin::Admin,
        employee::Employee,
        principal::{Principal, PrincipalSummary},
    },
    store::{MemoryStore, PrincipalStore},
};

pub const JWT_SECRET: &str = "test-secret";

pub const ADMIN_ID: &str = "admin-1";
pub const ALICE_ID: &str = "emp-1";
pub const BOB_ID: &str = "emp-2";
pub const CAROL_ID: &str = "emp-3";

// (id, name, employee id). Each employee's password is their employee id.
const EMPLOYEES: [(&str, &str, &str); 3] = [
    (ALICE_ID, "Alice", "EMP001"),
    (BOB_ID, "Bob", "EMP002"),
    (CAROL_ID, "Carol", "EMP003"),
];

// Hashing is the slow part of every fixture; do it once per test binary.
static ADMIN_HASH: Lazy<String> = Lazy::new(|| hash_password("admin123").unwrap());
static EMPLOYEE_HASHES: Lazy<Vec<String>> = Lazy::new(|| {
    EMPLOYEES
        .iter()
        .map(|(_, _, code)| hash_password(code).unwrap())
        .collect()
});

pub fn config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: None,
        jwt_secret: JWT_SECRET.into(),
        token_ttl: 86_400,
        api_prefix: "/api".into(),
        rate_login_per_min: 1000,
        rate_protected_per_min: 1000,
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
        allowances: LeaveAllowances::default(),
        seed_admin: None,
    }
}

/// One admin (`admin@example.com` / `admin123`) and employees
/// EMP001..EMP003 (Alice, Bob, Carol).
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store
        .insert_admin(&Admin {
            id: ADMIN_ID.into(),
            name: "Admin".into(),
            email: "admin@example.com".into(),
            password_hash: ADMIN_HASH.clone(),
        })
        .await
        .unwrap();

    for ((id, name, code), hash) in EMPLOYEES.iter().zip(EMPLOYEE_HASHES.iter()) {
        store
            .insert_employee(&Employee {
                id: id.to_string(),
                name: name.to_string(),
                employee_id: code.to_string(),
                email: format!("{}@company.com", name.to_lowercase()),
                password_hash: hash.clone(),
                department: "Engineering".into(),
                designation: "Developer".into(),
                salary: 50_000.0,
                date_of_birth: None,
                gender: None,
                marital_status: None,
                image: None,
            })
            .await
            .unwrap();
    }

    store
}

pub async fn summary(store: &MemoryStore, id: &str) -> PrincipalSummary {
    if let Some(admin) = store.find_admin_by_id(id).await.unwrap() {
        return Principal::Admin(admin).summary();
    }
    let employee = store.find_employee_by_id(id).await.unwrap().unwrap();
    Principal::Employee(employee).summary()
}
