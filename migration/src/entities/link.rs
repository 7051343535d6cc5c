use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// "text" | "file"
    pub kind: String,
    /// 文本内容，或文件类型链接的 blob handle
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub original_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
    pub password_hash: Option<String>,
    pub view_count: i64,
    pub max_views: Option<i64>,
    pub owner_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
