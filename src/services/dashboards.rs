use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    complaint, establishment, factory, product, purchase, retail_store, retailer, supplier, user,
};
use crate::errors::ServiceError;

/// Role dashboards: aggregate overviews and profile/premises updates.
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RetailerOverview {
    pub retailer: retailer::Model,
    pub establishment: Option<establishment::Model>,
    pub purchase_count: u64,
    pub open_complaint_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierOverview {
    pub supplier: supplier::Model,
    pub establishment: Option<establishment::Model>,
    pub product_count: u64,
    pub purchase_count: u64,
    pub open_complaint_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSummary {
    pub pending_users: u64,
    pub active_users: u64,
    pub total_purchases: u64,
    pub open_complaints: u64,
    pub listed_products: u64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTradingProfileRequest {
    pub tax_identification_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub iban: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEstablishmentRequest {
    pub name: Option<String>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn retailer_overview(&self, user_id: i64) -> Result<RetailerOverview, ServiceError> {
        let db = self.db.as_ref();
        let profile = self.retailer_for_user(user_id).await?;

        let establishment = self.establishment_for_retailer(profile.id).await?;

        let purchase_count = purchase::Entity::find()
            .filter(purchase::Column::RetailerId.eq(profile.id))
            .count(db)
            .await?;

        let open_complaint_count = self.open_complaints_for(user_id).await?;

        Ok(RetailerOverview {
            retailer: profile,
            establishment,
            purchase_count,
            open_complaint_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn supplier_overview(&self, user_id: i64) -> Result<SupplierOverview, ServiceError> {
        let db = self.db.as_ref();
        let profile = self.supplier_for_user(user_id).await?;

        let establishment = self.establishment_for_supplier(profile.id).await?;

        let product_count = product::Entity::find()
            .filter(product::Column::SupplierId.eq(profile.id))
            .count(db)
            .await?;
        let purchase_count = purchase::Entity::find()
            .filter(purchase::Column::SupplierId.eq(profile.id))
            .count(db)
            .await?;
        let open_complaint_count = self.open_complaints_for(user_id).await?;

        Ok(SupplierOverview {
            supplier: profile,
            establishment,
            product_count,
            purchase_count,
            open_complaint_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn admin_summary(&self) -> Result<AdminSummary, ServiceError> {
        let db = self.db.as_ref();
        let pending_users = user::Entity::find()
            .filter(user::Column::Status.eq(user::STATUS_PENDING))
            .count(db)
            .await?;
        let active_users = user::Entity::find()
            .filter(user::Column::Status.eq(user::STATUS_ACTIVE))
            .count(db)
            .await?;
        let total_purchases = purchase::Entity::find().count(db).await?;
        let open_complaints = complaint::Entity::find()
            .filter(complaint::Column::Status.eq(complaint::STATUS_OPEN))
            .count(db)
            .await?;
        let listed_products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .count(db)
            .await?;

        Ok(AdminSummary {
            pending_users,
            active_users,
            total_purchases,
            open_complaints,
            listed_products,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_retailer_profile(
        &self,
        user_id: i64,
        request: UpdateTradingProfileRequest,
    ) -> Result<retailer::Model, ServiceError> {
        request.validate()?;
        let profile = self.retailer_for_user(user_id).await?;

        let mut active: retailer::ActiveModel = profile.into();
        if let Some(tin) = request.tax_identification_number {
            active.tax_identification_number = Set(tin);
        }
        if let Some(account) = request.bank_account_number {
            active.bank_account_number = Set(account);
        }
        if let Some(iban) = request.iban {
            active.iban = Set(iban);
        }
        active.last_modified_by = Set(user_id);
        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_supplier_profile(
        &self,
        user_id: i64,
        request: UpdateTradingProfileRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let profile = self.supplier_for_user(user_id).await?;

        let mut active: supplier::ActiveModel = profile.into();
        if let Some(tin) = request.tax_identification_number {
            active.tax_identification_number = Set(tin);
        }
        if let Some(account) = request.bank_account_number {
            active.bank_account_number = Set(account);
        }
        if let Some(iban) = request.iban {
            active.iban = Set(iban);
        }
        active.last_modified_by = Set(user_id);
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Update the establishment behind the retailer's store.
    #[instrument(skip(self, request))]
    pub async fn update_store(
        &self,
        user_id: i64,
        request: UpdateEstablishmentRequest,
    ) -> Result<establishment::Model, ServiceError> {
        request.validate()?;
        let profile = self.retailer_for_user(user_id).await?;
        let establishment = self
            .establishment_for_retailer(profile.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retail store".to_string()))?;
        self.apply_establishment_update(establishment, request, user_id)
            .await
    }

    /// Update the establishment behind the supplier's factory.
    #[instrument(skip(self, request))]
    pub async fn update_factory(
        &self,
        user_id: i64,
        request: UpdateEstablishmentRequest,
    ) -> Result<establishment::Model, ServiceError> {
        request.validate()?;
        let profile = self.supplier_for_user(user_id).await?;
        let establishment = self
            .establishment_for_supplier(profile.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Factory".to_string()))?;
        self.apply_establishment_update(establishment, request, user_id)
            .await
    }

    async fn apply_establishment_update(
        &self,
        establishment: establishment::Model,
        request: UpdateEstablishmentRequest,
        user_id: i64,
    ) -> Result<establishment::Model, ServiceError> {
        let mut active: establishment::ActiveModel = establishment.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(email) = request.contact_email {
            active.contact_email = Set(Some(email));
        }
        if let Some(phone) = request.contact_phone {
            active.contact_phone = Set(Some(phone));
        }
        if let Some(logo_url) = request.logo_url {
            active.logo_url = Set(Some(logo_url));
        }
        active.last_modified_by = Set(user_id);
        Ok(active.update(self.db.as_ref()).await?)
    }

    async fn retailer_for_user(&self, user_id: i64) -> Result<retailer::Model, ServiceError> {
        retailer::Entity::find()
            .filter(retailer::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retailer profile".to_string()))
    }

    async fn supplier_for_user(&self, user_id: i64) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find()
            .filter(supplier::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier profile".to_string()))
    }

    async fn establishment_for_retailer(
        &self,
        retailer_id: i64,
    ) -> Result<Option<establishment::Model>, ServiceError> {
        let store = retail_store::Entity::find()
            .filter(retail_store::Column::RetailerId.eq(retailer_id))
            .one(self.db.as_ref())
            .await?;
        match store {
            Some(store) => Ok(establishment::Entity::find_by_id(store.establishment_id)
                .one(self.db.as_ref())
                .await?),
            None => Ok(None),
        }
    }

    async fn establishment_for_supplier(
        &self,
        supplier_id: i64,
    ) -> Result<Option<establishment::Model>, ServiceError> {
        let owned = factory::Entity::find()
            .filter(factory::Column::SupplierId.eq(supplier_id))
            .one(self.db.as_ref())
            .await?;
        match owned {
            Some(owned) => Ok(establishment::Entity::find_by_id(owned.establishment_id)
                .one(self.db.as_ref())
                .await?),
            None => Ok(None),
        }
    }

    async fn open_complaints_for(&self, user_id: i64) -> Result<u64, ServiceError> {
        let count = complaint::Entity::find()
            .filter(
                Condition::any()
                    .add(complaint::Column::FiledByUserId.eq(user_id))
                    .add(complaint::Column::AgainstUserId.eq(user_id)),
            )
            .filter(complaint::Column::Status.eq(complaint::STATUS_OPEN))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
