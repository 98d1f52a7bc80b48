//! `SeaORM` Entity for counters table

use domain::counter::Counter;
use domain::value::CounterId;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[sea_orm(column_type = "BigInteger")]
    pub id: i64,
    #[sea_orm(column_type = "BigInteger")]
    pub count: i64,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Counter {
    fn from(model: Model) -> Self {
        Counter {
            id: CounterId::from(model.id),
            count: model.count,
            updated_at: model.updated_at,
        }
    }
}
