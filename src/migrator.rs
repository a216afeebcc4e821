use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_account_tables::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_purchase_tables::Migration),
            Box::new(m20240101_000004_create_compliance_tables::Migration),
            Box::new(m20240101_000005_create_notifications_table::Migration),
            Box::new(m20240101_000006_create_outbox_events_table::Migration),
            Box::new(m20240101_000007_create_password_reset_tokens_table::Migration),
        ]
    }
}

mod m20240101_000001_create_account_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_account_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).small_integer().not_null())
                        .col(
                            ColumnDef::new(Users::Status)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Establishments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Establishments::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Establishments::Name).string().not_null())
                        .col(
                            ColumnDef::new(Establishments::RegistrationNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Establishments::ContactEmail).string().null())
                        .col(ColumnDef::new(Establishments::ContactPhone).string().null())
                        .col(ColumnDef::new(Establishments::LogoUrl).string().null())
                        .col(
                            ColumnDef::new(Establishments::LastModifiedBy)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Establishments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Establishments::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Retailers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Retailers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Retailers::UserId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Retailers::TaxIdentificationNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Retailers::BankAccountNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Retailers::Iban).string().not_null())
                        .col(
                            ColumnDef::new(Retailers::ComplianceIndicator)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Retailers::ComplaintCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Retailers::LastModifiedBy)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Retailers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Retailers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UserId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::TaxIdentificationNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::BankAccountNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Iban).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::ComplianceIndicator)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Suppliers::ComplaintCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::PositiveReviewCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::LastModifiedBy)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Administrators::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Administrators::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Administrators::UserId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Administrators::AccessLevel)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Administrators::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RetailStores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RetailStores::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(RetailStores::RetailerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RetailStores::EstablishmentId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RetailStores::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Factories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Factories::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Factories::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Factories::EstablishmentId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Factories::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_role_status")
                        .table(Users::Table)
                        .col(Users::Role)
                        .col(Users::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Table::drop().table(Factories::Table).to_owned(),
                Table::drop().table(RetailStores::Table).to_owned(),
                Table::drop().table(Administrators::Table).to_owned(),
                Table::drop().table(Suppliers::Table).to_owned(),
                Table::drop().table(Retailers::Table).to_owned(),
                Table::drop().table(Establishments::Table).to_owned(),
                Table::drop().table(Users::Table).to_owned(),
            ] {
                manager.drop_table(table).await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        Role,
        Status,
        Phone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Establishments {
        Table,
        Id,
        Name,
        RegistrationNumber,
        ContactEmail,
        ContactPhone,
        LogoUrl,
        LastModifiedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Retailers {
        Table,
        Id,
        UserId,
        TaxIdentificationNumber,
        BankAccountNumber,
        Iban,
        ComplianceIndicator,
        ComplaintCount,
        LastModifiedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        UserId,
        TaxIdentificationNumber,
        BankAccountNumber,
        Iban,
        ComplianceIndicator,
        ComplaintCount,
        PositiveReviewCount,
        LastModifiedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Administrators {
        Table,
        Id,
        UserId,
        AccessLevel,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum RetailStores {
        Table,
        Id,
        RetailerId,
        EstablishmentId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Factories {
        Table,
        Id,
        SupplierId,
        EstablishmentId,
        CreatedAt,
    }
}

mod m20240101_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Products::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(ColumnDef::new(Products::Category).string().not_null())
                        .col(ColumnDef::new(Products::Industry).string().not_null())
                        .col(ColumnDef::new(Products::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(Products::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Products::MinimumOrderQuantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Products::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::ImageUrl).string().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_supplier_id")
                        .table(Products::Table)
                        .col(Products::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Quotations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotations::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Quotations::RetailerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotations::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotations::Status)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Quotations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quotations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        SupplierId,
        Name,
        Description,
        Category,
        Industry,
        UnitPrice,
        Currency,
        MinimumOrderQuantity,
        InStock,
        IsActive,
        ImageUrl,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Quotations {
        Table,
        Id,
        RetailerId,
        SupplierId,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_purchase_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Purchases::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Purchases::QuotationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::RetailerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::Status)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Purchases::PaymentAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::PaymentCurrency)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::PaymentExchangeRate)
                                .decimal()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Purchases::PaymentMethod)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::PaymentReference).string().null())
                        .col(
                            ColumnDef::new(Purchases::ReconciliationReference)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::ExternalPayReference)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Purchases::SupplierIban).string().null())
                        .col(
                            ColumnDef::new(Purchases::SupplierBankAccount)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Purchases::SupplierBankName).string().null())
                        .col(
                            ColumnDef::new(Purchases::LastModifiedBy)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Purchases::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_retailer_id")
                        .table(Purchases::Table)
                        .col(Purchases::RetailerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_supplier_id")
                        .table(Purchases::Table)
                        .col(Purchases::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseTransactions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseTransactions::PurchaseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseTransactions::Status)
                                .small_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseTransactions::Details)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseTransactions::LastModifiedBy)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_transactions_purchase_id")
                        .table(PurchaseTransactions::Table)
                        .col(PurchaseTransactions::PurchaseId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Purchases {
        Table,
        Id,
        QuotationId,
        RetailerId,
        SupplierId,
        Status,
        PaymentAmount,
        PaymentCurrency,
        PaymentExchangeRate,
        PaymentMethod,
        PaymentReference,
        ReconciliationReference,
        ExternalPayReference,
        SupplierIban,
        SupplierBankAccount,
        SupplierBankName,
        LastModifiedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseTransactions {
        Table,
        Id,
        PurchaseId,
        Status,
        Details,
        LastModifiedBy,
        CreatedAt,
    }
}

mod m20240101_000004_create_compliance_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_compliance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Complaints::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Complaints::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Complaints::QuotationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Complaints::ComplaintType)
                                .small_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Complaints::Description).string().not_null())
                        .col(
                            ColumnDef::new(Complaints::Status)
                                .small_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Complaints::FiledByUserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Complaints::AgainstUserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Complaints::ResolutionNotes).string().null())
                        .col(ColumnDef::new(Complaints::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Complaints::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_complaints_quotation_id")
                        .table(Complaints::Table)
                        .col(Complaints::QuotationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reviews::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Reviews::SupplierId).big_integer().not_null())
                        .col(ColumnDef::new(Reviews::RetailerId).big_integer().not_null())
                        .col(ColumnDef::new(Reviews::Rating).small_integer().not_null())
                        .col(ColumnDef::new(Reviews::Comments).string().null())
                        .col(ColumnDef::new(Reviews::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Complaints::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Complaints {
        Table,
        Id,
        QuotationId,
        ComplaintType,
        Description,
        Status,
        FiledByUserId,
        AgainstUserId,
        ResolutionNotes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Reviews {
        Table,
        Id,
        SupplierId,
        RetailerId,
        Rating,
        Comments,
        CreatedAt,
    }
}

mod m20240101_000005_create_notifications_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Notifications::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::NotificationType)
                                .small_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::Priority)
                                .small_integer()
                                .not_null()
                                .default(2),
                        )
                        .col(ColumnDef::new(Notifications::Subject).string().not_null())
                        .col(ColumnDef::new(Notifications::Details).string().not_null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_id")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        UserId,
        NotificationType,
        Priority,
        Subject,
        Details,
        IsRead,
        CreatedAt,
    }
}

mod m20240101_000006_create_outbox_events_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_outbox_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboxEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboxEvents::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::AggregateType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::AggregateId)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::EventType).string().not_null())
                        .col(ColumnDef::new(OutboxEvents::Payload).json().not_null())
                        .col(
                            ColumnDef::new(OutboxEvents::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::Attempts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::AvailableAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::LastError).string().null())
                        .col(
                            ColumnDef::new(OutboxEvents::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::ProcessedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outbox_events_status_available_at")
                        .table(OutboxEvents::Table)
                        .col(OutboxEvents::Status)
                        .col(OutboxEvents::AvailableAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboxEvents::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum OutboxEvents {
        Table,
        Id,
        AggregateType,
        AggregateId,
        EventType,
        Payload,
        Status,
        Attempts,
        AvailableAt,
        LastError,
        CreatedAt,
        ProcessedAt,
    }
}

mod m20240101_000007_create_password_reset_tokens_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_password_reset_tokens_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PasswordResetTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PasswordResetTokens::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::Token)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::Used)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum PasswordResetTokens {
        Table,
        Id,
        UserId,
        Token,
        ExpiresAt,
        Used,
        CreatedAt,
    }
}
