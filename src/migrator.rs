use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_products_table::Migration),
            Box::new(m20250301_000002_create_orders_table::Migration),
            Box::new(m20250301_000003_create_transaction_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_products_table"
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
                            ColumnDef::new(Products::Sku)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Category).string().not_null())
                        .col(ColumnDef::new(Products::Stock).integer().not_null())
                        .col(
                            ColumnDef::new(Products::LowStockThreshold)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(ColumnDef::new(Products::Link).string())
                        .col(ColumnDef::new(Products::Image).string())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::LastUpdated).timestamp_with_time_zone())
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
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Sku,
        Name,
        Category,
        Stock,
        LowStockThreshold,
        Link,
        Image,
        CreatedAt,
        LastUpdated,
    }
}

mod m20250301_000002_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::Tracking).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryType).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::Name).string().not_null())
                        .col(ColumnDef::new(Orders::Receiver).string())
                        .col(ColumnDef::new(Orders::Phone).string())
                        .col(ColumnDef::new(Orders::Address).string())
                        .col(ColumnDef::new(Orders::Items).json().not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            // Fulfillment looks orders up by tracking number and lists
            // pending work by status + delivery type.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_tracking")
                        .table(Orders::Table)
                        .col(Orders::Tracking)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status_delivery_type")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .col(Orders::DeliveryType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        Tracking,
        DeliveryType,
        Status,
        Name,
        Receiver,
        Phone,
        Address,
        Items,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_transaction_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_transaction_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TransactionLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransactionLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransactionLogs::EntryType).string().not_null())
                        .col(ColumnDef::new(TransactionLogs::DeliveryType).string())
                        .col(ColumnDef::new(TransactionLogs::OrderNumber).string())
                        .col(ColumnDef::new(TransactionLogs::TrackingNumber).string())
                        .col(ColumnDef::new(TransactionLogs::CustomerName).string())
                        .col(ColumnDef::new(TransactionLogs::CustomerNameLower).string())
                        .col(ColumnDef::new(TransactionLogs::Operator).string().not_null())
                        .col(ColumnDef::new(TransactionLogs::Sku).string())
                        .col(ColumnDef::new(TransactionLogs::Quantity).integer())
                        .col(ColumnDef::new(TransactionLogs::Items).json().not_null())
                        .col(ColumnDef::new(TransactionLogs::SkuList).string().not_null())
                        .col(
                            ColumnDef::new(TransactionLogs::ProductNameTokens)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Every search facet constrains entry type and orders by
            // creation time descending.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaction_logs_entry_type_created_at")
                        .table(TransactionLogs::Table)
                        .col(TransactionLogs::EntryType)
                        .col(TransactionLogs::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaction_logs_order_number")
                        .table(TransactionLogs::Table)
                        .col(TransactionLogs::OrderNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaction_logs_tracking_number")
                        .table(TransactionLogs::Table)
                        .col(TransactionLogs::TrackingNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaction_logs_customer_name_lower")
                        .table(TransactionLogs::Table)
                        .col(TransactionLogs::CustomerNameLower)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransactionLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TransactionLogs {
        Table,
        Id,
        EntryType,
        DeliveryType,
        OrderNumber,
        TrackingNumber,
        CustomerName,
        CustomerNameLower,
        Operator,
        Sku,
        Quantity,
        Items,
        SkuList,
        ProductNameTokens,
        CreatedAt,
    }
}
