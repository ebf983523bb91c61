//! Service implementations.
//!
//! Each service wraps the shared state and owns one slice of the REST
//! surface. Handlers in [`crate::routes`] only extract input and call these.

pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod health_service;
pub mod order_service;
pub mod review_service;

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory state and catalog fixtures for service and router tests.

    use std::sync::Arc;

    use feast_core::{Menu, Money, Restaurant, User};
    use feast_db::{Database, DbConfig, NewMenu, NewRestaurant, NewUser};

    use crate::config::AppConfig;
    use crate::state::AppState;

    pub async fn state() -> Arc<AppState> {
        state_with(|_| None).await
    }

    /// State built from a config lookup, e.g. to turn on strict transitions.
    pub async fn state_with<F>(lookup: F) -> Arc<AppState>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig::from_lookup(lookup).unwrap();
        Arc::new(AppState::new(db, config))
    }

    /// Inserts an account directly with a placeholder hash; log-in tests go
    /// through `AuthService::register` instead.
    pub async fn user(state: &Arc<AppState>, email: &str) -> User {
        state
            .db
            .users()
            .create(&NewUser {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn restaurant(state: &Arc<AppState>, name: &str, latitude: f64, longitude: f64) -> Restaurant {
        state
            .db
            .catalog()
            .insert_restaurant(&NewRestaurant {
                name: name.to_string(),
                logo: None,
                category: "indonesian".to_string(),
                address: format!("{} street", name),
                latitude,
                longitude,
            })
            .await
            .unwrap()
    }

    pub async fn menu(state: &Arc<AppState>, restaurant_id: i64, name: &str, price: i64) -> Menu {
        state
            .db
            .catalog()
            .insert_menu(&NewMenu {
                restaurant_id,
                name: name.to_string(),
                description: None,
                price: Money::from_minor(price),
                image: None,
            })
            .await
            .unwrap()
    }
}
