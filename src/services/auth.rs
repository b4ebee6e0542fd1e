use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{AuthResponse, LoginInput, Role, User};
use crate::database::repositories::UserRepository;
use crate::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const INVALID_CREDENTIALS: &str = "Invalid email, password or role";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_hr_or_admin(&self) -> bool {
        self.role.is_hr_or_admin()
    }

    pub fn is_staff(&self) -> bool {
        self.role.can_process_requests()
    }

    pub fn requires_hr_or_admin(&self) -> Result<(), AppError> {
        if self.is_hr_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only HR or administrators can perform this action".to_string(),
            ))
        }
    }

    pub fn requires_self_or_hr(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.sub == user_id || self.is_hr_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot access another user's data".to_string(),
            ))
        }
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let (Some(token), Some(config)) = (token, req.app_data::<Data<Config>>()) else {
            log::debug!("Missing or malformed authorization header");
            return ready(Err(AppError::Unauthorized.into()));
        };

        match decode_token(token, &config.jwt_secret) {
            Ok(claims) => ready(Ok(claims)),
            Err(e) => {
                log::debug!("Rejected token: {}", e);
                ready(Err(AppError::Unauthorized.into()))
            }
        }
    }
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        AppError::internal_server_error_message("Failed to hash password")
    })
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    config: Config,
}

impl AuthService {
    pub fn new(user_repository: UserRepository, config: Config) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    /// Check an (email, password, role) triple. Every mismatch yields the same
    /// invalid-argument error so callers cannot probe which part was wrong.
    pub async fn authenticate(&self, input: &LoginInput) -> Result<User, AppError> {
        let user = self
            .user_repository
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

        let password_matches = verify(&input.password, &user.password_hash).unwrap_or(false);

        if !password_matches || user.role != input.role {
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, AppError> {
        let user = self.authenticate(&input).await?;
        let token = self.generate_token(&user)?;

        log::info!("User {} logged in as {}", user.id, user.role);

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode_token(token, &self.config.jwt_secret).map_err(|_| AppError::Unauthorized)
    }

    pub async fn current_user(&self, claims: &Claims) -> Result<User, AppError> {
        self.user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify(current_password, &user.password_hash).unwrap_or(false) {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)?;
        self.user_repository
            .update_password(user_id, &password_hash)
            .await?;

        Ok(())
    }

    pub fn generate_token(&self, user: &User) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(self.config.jwt_expiration_days))
            .ok_or_else(|| AppError::internal_server_error_message("Invalid token expiry"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| {
            log::error!("Failed to sign token: {}", e);
            AppError::internal_server_error_message("Failed to sign token")
        })
    }
}
