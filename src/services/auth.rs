use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::password_policy::PasswordPolicy;
use crate::auth::{AuthService, TokenPair, UserRole};
use crate::db::{DatabaseAccess, DbPool};
use crate::entities::{
    administrator, establishment, factory, password_reset_token, retail_store, retailer, supplier,
    user,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::mailer::{EmailMessage, Mailer};

const RESET_TOKEN_LEN: usize = 48;
const RESET_TOKEN_TTL_HOURS: i64 = 2;

/// Registration, sign-in/out and password reset flows.
#[derive(Clone)]
pub struct AuthFlowService {
    db: DatabaseAccess,
    auth: Arc<AuthService>,
    mailer: Arc<Mailer>,
    policy: PasswordPolicy,
    event_sender: Option<Arc<EventSender>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EstablishmentData {
    #[validate(length(min = 1, max = 255, message = "Establishment name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Registration number is required"))]
    pub registration_number: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    pub password: String,
    /// 1 = admin, 2 = supplier, 3 = retailer
    pub role: i16,
    pub phone: Option<String>,
    /// Tax identification number, required for suppliers and retailers
    pub tax_identification_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub iban: Option<String>,
    /// Required for suppliers and retailers
    #[validate]
    pub establishment: Option<EstablishmentData>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub admin_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub retailer_id: Option<i64>,
    /// `{establishment_id}-{supplier_id}` when a factory was created
    pub factory_id: Option<String>,
    /// `{establishment_id}-{retailer_id}` when a store was created
    pub retail_store_id: Option<String>,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignInResponse {
    pub user_id: i64,
    pub username: String,
    pub role: i16,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

struct RoleArtifacts {
    admin_id: Option<i64>,
    supplier_id: Option<i64>,
    retailer_id: Option<i64>,
    establishment_id: Option<i64>,
}

impl AuthFlowService {
    pub fn new(
        db: Arc<DbPool>,
        auth: Arc<AuthService>,
        mailer: Arc<Mailer>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db: DatabaseAccess::new(db),
            auth,
            mailer,
            policy: PasswordPolicy::default(),
            event_sender,
        }
    }

    /// Register an account with its role profile and premises, all in one
    /// transaction. A failure at any step leaves no partial account.
    #[instrument(skip(self, request), fields(username = %request.username, role = request.role))]
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        request.validate()?;

        let role = UserRole::from_code(request.role)
            .ok_or_else(|| ServiceError::RegistrationFailed("Invalid user type.".to_string()))?;

        self.policy
            .validate(&request.password, Some(&request.username))
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if !self.username_available(&request.username).await? {
            return Err(ServiceError::Conflict("username is already taken".to_string()));
        }
        let email_taken = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.clone()))
            .count(self.db.pool())
            .await?
            > 0;
        if email_taken {
            return Err(ServiceError::Conflict("email is already registered".to_string()));
        }

        let password_hash = self
            .auth
            .hash_password(&request.password)
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        let this = self.clone();
        let (new_user, artifacts) = self
            .db
            .transaction("auth.register", move |txn| {
                Box::pin(async move { this.register_in_txn(txn, &request, role, password_hash).await })
            })
            .await?;
        info!(user_id = new_user.id, "user registered");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::UserRegistered {
                    user_id: new_user.id,
                    role: role.code(),
                })
                .await;
        }

        let tokens = self
            .auth
            .generate_token_pair(new_user.id, &new_user.username, role)
            .map_err(|e| ServiceError::JwtError(e.to_string()))?;

        let factory_id = match (artifacts.establishment_id, artifacts.supplier_id) {
            (Some(est), Some(sup)) => Some(format!("{est}-{sup}")),
            _ => None,
        };
        let retail_store_id = match (artifacts.establishment_id, artifacts.retailer_id) {
            (Some(est), Some(ret)) => Some(format!("{est}-{ret}")),
            _ => None,
        };

        Ok(RegisterResponse {
            user_id: new_user.id,
            admin_id: artifacts.admin_id,
            supplier_id: artifacts.supplier_id,
            retailer_id: artifacts.retailer_id,
            factory_id,
            retail_store_id,
            tokens,
        })
    }

    async fn register_in_txn(
        &self,
        txn: &DatabaseTransaction,
        request: &RegisterRequest,
        role: UserRole,
        password_hash: String,
    ) -> Result<(user::Model, RoleArtifacts), ServiceError> {
        let new_user = user::ActiveModel {
            username: Set(request.username.clone()),
            email: Set(request.email.clone()),
            password_hash: Set(password_hash),
            role: Set(role.code()),
            phone: Set(request.phone.clone()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let mut artifacts = RoleArtifacts {
            admin_id: None,
            supplier_id: None,
            retailer_id: None,
            establishment_id: None,
        };

        match role {
            UserRole::Admin => {
                let admin = administrator::ActiveModel {
                    user_id: Set(new_user.id),
                    access_level: Set(1),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                artifacts.admin_id = Some(admin.id);
            }
            UserRole::Supplier => {
                let establishment_id = self
                    .insert_establishment(txn, request, new_user.id, "suppliers")
                    .await?;
                let profile = self.profile_fields(request, "suppliers")?;

                let new_supplier = supplier::ActiveModel {
                    user_id: Set(new_user.id),
                    tax_identification_number: Set(profile.0),
                    bank_account_number: Set(profile.1),
                    iban: Set(profile.2),
                    compliance_indicator: Set(1),
                    complaint_count: Set(0),
                    positive_review_count: Set(0),
                    last_modified_by: Set(new_user.id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                factory::ActiveModel {
                    supplier_id: Set(new_supplier.id),
                    establishment_id: Set(establishment_id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                artifacts.supplier_id = Some(new_supplier.id);
                artifacts.establishment_id = Some(establishment_id);
            }
            UserRole::Retailer => {
                let establishment_id = self
                    .insert_establishment(txn, request, new_user.id, "retailers")
                    .await?;
                let profile = self.profile_fields(request, "retailers")?;

                let new_retailer = retailer::ActiveModel {
                    user_id: Set(new_user.id),
                    tax_identification_number: Set(profile.0),
                    bank_account_number: Set(profile.1),
                    iban: Set(profile.2),
                    compliance_indicator: Set(1),
                    complaint_count: Set(0),
                    last_modified_by: Set(new_user.id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                retail_store::ActiveModel {
                    retailer_id: Set(new_retailer.id),
                    establishment_id: Set(establishment_id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                artifacts.retailer_id = Some(new_retailer.id);
                artifacts.establishment_id = Some(establishment_id);
            }
        }

        Ok((new_user, artifacts))
    }

    async fn insert_establishment(
        &self,
        txn: &DatabaseTransaction,
        request: &RegisterRequest,
        user_id: i64,
        role_label: &str,
    ) -> Result<i64, ServiceError> {
        let data = request.establishment.as_ref().ok_or_else(|| {
            ServiceError::RegistrationFailed(format!(
                "Establishment data is required for {role_label}."
            ))
        })?;

        let row = establishment::ActiveModel {
            name: Set(data.name.clone()),
            registration_number: Set(data.registration_number.clone()),
            contact_email: Set(data.contact_email.clone()),
            contact_phone: Set(data.contact_phone.clone()),
            logo_url: Set(data.logo_url.clone()),
            last_modified_by: Set(user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(row.id)
    }

    fn profile_fields(
        &self,
        request: &RegisterRequest,
        role_label: &str,
    ) -> Result<(String, String, String), ServiceError> {
        match (
            &request.tax_identification_number,
            &request.bank_account_number,
            &request.iban,
        ) {
            (Some(tin), Some(account), Some(iban)) => {
                Ok((tin.clone(), account.clone(), iban.clone()))
            }
            _ => Err(ServiceError::RegistrationFailed(format!(
                "Tax identification number, bank account and IBAN are required for {role_label}."
            ))),
        }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, ServiceError> {
        request.validate()?;

        let account = user::Entity::find()
            .filter(user::Column::Username.eq(request.username.clone()))
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid credentials".to_string()))?;

        if account.status == user::STATUS_DELETED || account.status == user::STATUS_REJECTED {
            return Err(ServiceError::AuthError("account is not active".to_string()));
        }

        let verified = self
            .auth
            .verify_password(&request.password, &account.password_hash)
            .map_err(|e| ServiceError::HashError(e.to_string()))?;
        if !verified {
            warn!(user_id = account.id, "failed sign-in attempt");
            return Err(ServiceError::AuthError("invalid credentials".to_string()));
        }

        let role = UserRole::from_code(account.role)
            .ok_or_else(|| ServiceError::InternalError("corrupt role code".to_string()))?;
        let tokens = self
            .auth
            .generate_token_pair(account.id, &account.username, role)
            .map_err(|e| ServiceError::JwtError(e.to_string()))?;

        Ok(SignInResponse {
            user_id: account.id,
            username: account.username,
            role: account.role,
            tokens,
        })
    }

    pub async fn sign_out(&self, claims: &crate::auth::Claims) -> Result<(), ServiceError> {
        self.auth.revoke_token(claims).await;
        Ok(())
    }

    pub async fn username_available(&self, username: &str) -> Result<bool, ServiceError> {
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(self.db.pool())
            .await?
            > 0;
        Ok(!taken)
    }

    /// Issue a reset token and mail it. Always succeeds from the caller's
    /// point of view so the endpoint cannot be used to probe for accounts.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        let Some(account) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.pool())
            .await?
        else {
            info!("password reset requested for unknown email");
            return Ok(());
        };

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();

        password_reset_token::ActiveModel {
            user_id: Set(account.id),
            token: Set(token.clone()),
            expires_at: Set(Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS)),
            used: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.pool())
        .await?;

        self.mailer
            .send(EmailMessage {
                to: account.email.clone(),
                subject: "Password Reset | Souk".to_string(),
                text: format!(
                    "use this token to reset your password within {RESET_TOKEN_TTL_HOURS} hours: {token}"
                ),
                html: None,
            })
            .await?;

        Ok(())
    }

    #[instrument(skip(self, token, new_password))]
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let row = password_reset_token::Entity::find()
            .filter(password_reset_token::Column::Token.eq(token))
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid reset token".to_string()))?;

        if row.used || row.expires_at < Utc::now() {
            return Err(ServiceError::AuthError("reset token has expired".to_string()));
        }

        let account = user::Entity::find_by_id(row.user_id)
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        self.policy
            .validate(new_password, Some(&account.username))
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let password_hash = self
            .auth
            .hash_password(new_password)
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        self.db
            .transaction("auth.password_reset", move |txn| {
                Box::pin(async move {
                    let mut account: user::ActiveModel = account.into();
                    account.password_hash = Set(password_hash);
                    account.update(txn).await?;

                    let mut row: password_reset_token::ActiveModel = row.into();
                    row.used = Set(true);
                    row.update(txn).await?;
                    Ok::<(), ServiceError>(())
                })
            })
            .await
    }
}
