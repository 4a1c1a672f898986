pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub email: String,
        pub display_name: String,
        pub role: RoleDb,
        pub created_at: DateTimeUtc,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum RoleDb {
        #[sea_orm(string_value = "STREAMER")]
        Streamer,
        #[sea_orm(string_value = "CREATOR")]
        Creator,
        #[sea_orm(string_value = "ADMIN")]
        Admin,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod profiles {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: i64,
        pub balance: i64,
        pub payout_details: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod contents {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "contents")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub title: String,
        pub url: String,
        pub kind: ContentKindDb,
        pub status: ContentStatusDb,
        pub review_notes: Option<String>,
        pub submitted_at: DateTimeUtc,
        pub approved_at: Option<DateTimeUtc>,
        pub approved_by: Option<i64>,
        pub creator_id: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum ContentKindDb {
        #[sea_orm(string_value = "YOUTUBE")]
        Youtube,
        #[sea_orm(string_value = "SPOTIFY")]
        Spotify,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum ContentStatusDb {
        #[sea_orm(string_value = "PENDING")]
        Pending,
        #[sea_orm(string_value = "APPROVED")]
        Approved,
        #[sea_orm(string_value = "REJECTED")]
        Rejected,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::users::Entity",
            from = "Column::CreatorId",
            to = "super::users::Column::Id"
        )]
        Creator,
    }

    impl Related<super::users::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Creator.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod products {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub price: i64,
        pub in_stock: bool,
        pub purchase_count: i64,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod payments {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "payments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub reference: String,
        pub user_id: i64,
        pub product_id: i64,
        pub amount: i64,
        pub status: PaymentStatusDb,
        #[sea_orm(column_type = "Text", nullable)]
        pub payment_data: Option<String>,
        pub paid_at: Option<DateTimeUtc>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum PaymentStatusDb {
        #[sea_orm(string_value = "PENDING")]
        Pending,
        #[sea_orm(string_value = "COMPLETED")]
        Completed,
        #[sea_orm(string_value = "FAILED")]
        Failed,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod purchases {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "purchases")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: i64,
        pub product_id: i64,
        pub amount: i64,
        #[sea_orm(unique)]
        pub payment_id: i64,
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod transactions {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "transactions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub reference: String,
        pub user_id: i64,
        pub amount: i64,
        pub kind: TransactionKindDb,
        pub status: TransactionStatusDb,
        pub payment_id: Option<i64>,
        #[sea_orm(column_type = "Text", nullable)]
        pub metadata: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum TransactionKindDb {
        #[sea_orm(string_value = "PURCHASE")]
        Purchase,
        #[sea_orm(string_value = "WITHDRAWAL")]
        Withdrawal,
    }

    #[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
    pub enum TransactionStatusDb {
        #[sea_orm(string_value = "PENDING")]
        Pending,
        #[sea_orm(string_value = "COMPLETED")]
        Completed,
        #[sea_orm(string_value = "FAILED")]
        Failed,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod plans {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "plans")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub amount: i64,
        pub interval: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sessions {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub fingerprint: String,
        pub user_id: i64,
        pub issued_at: DateTimeUtc,
        pub expires_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use streamrich_domain::model::{
    ContentKind, ContentStatus, PaymentStatus, Role, TransactionKind, TransactionStatus,
};

impl From<Role> for users::RoleDb {
    fn from(value: Role) -> Self {
        match value {
            Role::Streamer => Self::Streamer,
            Role::Creator => Self::Creator,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<users::RoleDb> for Role {
    fn from(value: users::RoleDb) -> Self {
        match value {
            users::RoleDb::Streamer => Self::Streamer,
            users::RoleDb::Creator => Self::Creator,
            users::RoleDb::Admin => Self::Admin,
        }
    }
}

impl From<ContentKind> for contents::ContentKindDb {
    fn from(value: ContentKind) -> Self {
        match value {
            ContentKind::Youtube => Self::Youtube,
            ContentKind::Spotify => Self::Spotify,
        }
    }
}

impl From<contents::ContentKindDb> for ContentKind {
    fn from(value: contents::ContentKindDb) -> Self {
        match value {
            contents::ContentKindDb::Youtube => Self::Youtube,
            contents::ContentKindDb::Spotify => Self::Spotify,
        }
    }
}

impl From<ContentStatus> for contents::ContentStatusDb {
    fn from(value: ContentStatus) -> Self {
        match value {
            ContentStatus::Pending => Self::Pending,
            ContentStatus::Approved => Self::Approved,
            ContentStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<contents::ContentStatusDb> for ContentStatus {
    fn from(value: contents::ContentStatusDb) -> Self {
        match value {
            contents::ContentStatusDb::Pending => Self::Pending,
            contents::ContentStatusDb::Approved => Self::Approved,
            contents::ContentStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<PaymentStatus> for payments::PaymentStatusDb {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Completed => Self::Completed,
            PaymentStatus::Failed => Self::Failed,
        }
    }
}

impl From<payments::PaymentStatusDb> for PaymentStatus {
    fn from(value: payments::PaymentStatusDb) -> Self {
        match value {
            payments::PaymentStatusDb::Pending => Self::Pending,
            payments::PaymentStatusDb::Completed => Self::Completed,
            payments::PaymentStatusDb::Failed => Self::Failed,
        }
    }
}

impl From<TransactionKind> for transactions::TransactionKindDb {
    fn from(value: TransactionKind) -> Self {
        match value {
            TransactionKind::Purchase => Self::Purchase,
            TransactionKind::Withdrawal => Self::Withdrawal,
        }
    }
}

impl From<transactions::TransactionKindDb> for TransactionKind {
    fn from(value: transactions::TransactionKindDb) -> Self {
        match value {
            transactions::TransactionKindDb::Purchase => Self::Purchase,
            transactions::TransactionKindDb::Withdrawal => Self::Withdrawal,
        }
    }
}

impl From<TransactionStatus> for transactions::TransactionStatusDb {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Failed => Self::Failed,
        }
    }
}

impl From<transactions::TransactionStatusDb> for TransactionStatus {
    fn from(value: transactions::TransactionStatusDb) -> Self {
        match value {
            transactions::TransactionStatusDb::Pending => Self::Pending,
            transactions::TransactionStatusDb::Completed => Self::Completed,
            transactions::TransactionStatusDb::Failed => Self::Failed,
        }
    }
}
