use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing;
use voyage_core::password::{hash_password, verify_password};
use voyage_core::types::{new_id, User, UserPreferences};
use voyage_core::{ServiceError, ServiceResult, StoreError, TravelContext};

const DEFAULT_AVATAR: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face";
const DEFAULT_ROLE: &str = "USER";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
    pub preferences: Option<UserPreferences>,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn validate_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    ctx: TravelContext,
}

impl UserService {
    pub fn new(ctx: TravelContext) -> Self {
        Self { ctx }
    }

    pub async fn register(&self, request: Registration) -> ServiceResult<User> {
        let email = request.email.trim().to_string();
        if email.is_empty() {
            return Err(ServiceError::Validation("Email is required".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(ServiceError::Validation("Invalid email format".to_string()));
        }
        validate_password(&request.password)?;

        if self.ctx.stores.users.exists_by_email(&email).await? {
            return Err(email_taken());
        }

        let now = Utc::now();
        let user = User {
            id: new_id(),
            email,
            password_hash: hash_password(&request.password),
            full_name: request
                .full_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "User".to_string()),
            avatar: Some(DEFAULT_AVATAR.to_string()),
            phone: request.phone,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            address: request.address,
            role: DEFAULT_ROLE.to_string(),
            preferences: UserPreferences::default(),
            created_at: now,
            updated_at: now,
        };

        self.ctx.stores.users.insert(&user).await.map_err(|e| match e {
            StoreError::Duplicate(_) => email_taken(),
            other => other.into(),
        })?;
        tracing::info!("User {} registered", user.id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self.ctx.stores.users.find_by_email(email.trim()).await?;
        match user {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            _ => Err(ServiceError::Validation("Invalid credentials".to_string())),
        }
    }

    pub async fn find(&self, id: &str) -> ServiceResult<User> {
        self.ctx
            .stores
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn update(&self, id: &str, changes: UserUpdate) -> ServiceResult<User> {
        let mut user = self.find(id).await?;

        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = changes.gender {
            user.gender = Some(gender);
        }
        if let Some(address) = changes.address {
            user.address = Some(address);
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(preferences) = changes.preferences {
            user.preferences = preferences;
        }
        if let Some(password) = changes.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password);
        }
        user.updated_at = Utc::now();

        self.ctx.stores.users.save(&user).await?;
        Ok(user)
    }

    pub async fn change_password(&self, id: &str, new_password: &str) -> ServiceResult<()> {
        validate_password(new_password)?;

        let mut user = self.find(id).await?;
        user.password_hash = hash_password(new_password);
        user.updated_at = Utc::now();
        self.ctx.stores.users.save(&user).await?;

        tracing::info!("Password changed for user {}", id);
        Ok(())
    }
}

fn email_taken() -> ServiceError {
    ServiceError::Conflict("Email already exists".to_string())
}
