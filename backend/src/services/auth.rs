//! Authentication service for business registration, login, and tokens

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{validate_business_name, validate_password, validate_username, User, UserRole};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::recipe::RecipeService;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new business with its first admin
#[derive(Debug, Deserialize)]
pub struct RegisterBusinessInput {
    pub business_name: String,
    pub username: String,
    pub password: String,
}

/// Input for adding a user to an existing business
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Input for login
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub business_name: String,
    pub username: String,
    pub password: String,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub business_id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub business_id: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    business_id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn role(&self) -> AppResult<UserRole> {
        UserRole::parse(&self.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown user role: {}", self.role)))
    }
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new business with an admin account and starter recipes
    pub async fn register_business(
        &self,
        input: RegisterBusinessInput,
    ) -> AppResult<RegisterResponse> {
        let business_name = input.business_name.trim();
        validate_business_name(business_name)
            .map_err(|msg| AppError::validation("business_name", msg))?;
        validate_credentials(&input.username, &input.password)?;

        let password_hash = hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let business_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO businesses (name) VALUES ($1) RETURNING id",
        )
        .bind(business_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "business name"))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (business_id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(&input.username)
        .bind(&password_hash)
        .bind(UserRole::Admin.as_str())
        .fetch_one(&mut *tx)
        .await?;

        RecipeService::new(self.db.clone())
            .seed_defaults_in(&mut tx, user_id)
            .await?;

        tx.commit().await?;

        tracing::info!("Registered business {} ({})", business_name, business_id);

        let tokens = self.generate_token(user_id, business_id, UserRole::Admin)?;

        Ok(RegisterResponse {
            business_id,
            user_id,
            tokens,
        })
    }

    /// Add a user to a business; the username must be unused in that business
    pub async fn create_user(&self, business_id: Uuid, input: CreateUserInput) -> AppResult<User> {
        validate_credentials(&input.username, &input.password)?;
        let password_hash = hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (business_id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, business_id, username, password_hash, role, created_at
            "#,
        )
        .bind(business_id)
        .bind(&input.username)
        .bind(&password_hash)
        .bind(input.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "username"))?;

        RecipeService::new(self.db.clone())
            .seed_defaults_in(&mut tx, row.id)
            .await?;

        tx.commit().await?;

        Ok(User {
            role: row.role()?,
            id: row.id,
            business_id: row.business_id,
            username: row.username,
            created_at: row.created_at,
        })
    }

    /// Authenticate a user of a named business
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.business_id, u.username, u.password_hash, u.role, u.created_at
            FROM users u
            JOIN businesses b ON b.id = u.business_id
            WHERE b.name = $1 AND u.username = $2
            "#,
        )
        .bind(input.business_name.trim())
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.generate_token(user.id, user.business_id, user.role()?)
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        business_id: Uuid,
        role: UserRole,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            business_id: business_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}

fn validate_credentials(username: &str, password: &str) -> AppResult<()> {
    validate_username(username).map_err(|msg| AppError::validation("username", msg))?;
    validate_password(password).map_err(|msg| AppError::validation("password", msg))?;
    Ok(())
}

fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(secret: &str, expiry: i64) -> AuthService {
        // connect_lazy never opens a connection, so no database is needed
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bakery_test")
            .unwrap();
        AuthService {
            db,
            jwt_secret: secret.to_string(),
            access_token_expiry: expiry,
        }
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let auth = service("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let business_id = Uuid::new_v4();

        let tokens = auth
            .generate_token(user_id, business_id, UserRole::Staff)
            .unwrap();
        let claims = auth.validate_token(&tokens.access_token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.business_id, business_id.to_string());
        assert_eq!(claims.role, UserRole::Staff);
        assert_eq!(tokens.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_is_rejected() {
        let issuer = service("secret-a", 3600);
        let verifier = service("secret-b", 3600);

        let tokens = issuer
            .generate_token(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin)
            .unwrap();

        assert!(matches!(
            verifier.validate_token(&tokens.access_token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        // Past the default 60 second leeway
        let auth = service("test-secret", -120);
        let tokens = auth
            .generate_token(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin)
            .unwrap();
        assert!(auth.validate_token(&tokens.access_token).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("baker_01", "long-enough").is_ok());
        assert!(matches!(
            validate_credentials("ab", "long-enough"),
            Err(AppError::Validation { field, .. }) if field == "username"
        ));
        assert!(matches!(
            validate_credentials("baker_01", "short"),
            Err(AppError::Validation { field, .. }) if field == "password"
        ));
    }
}
