//! The Postgres `products` table behind the catalog.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
    ActiveValue::NotSet,
};
use uuid::Uuid;

use crate::{
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    models::Product,
};

pub async fn list_products(conn: &DatabaseConnection) -> Result<Vec<Product>, DbErr> {
    Products::find()
        .order_by_asc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect()
}

pub async fn insert_product(conn: &DatabaseConnection, product: &Product) -> Result<Product, DbErr> {
    let active = ActiveModel {
        id: Set(product.id),
        name: Set(product.name.clone()),
        category: Set(product.category.clone()),
        price: Set(product.price),
        stock: Set(stock_to_column(product.stock)?),
        created_at: Set(Utc::now().into()),
    };
    product_from_entity(active.insert(conn).await?)
}

/// Overwrites every mutable column with the catalog's current values.
pub async fn save_product(conn: &DatabaseConnection, product: &Product) -> Result<Product, DbErr> {
    let active = ActiveModel {
        id: Set(product.id),
        name: Set(product.name.clone()),
        category: Set(product.category.clone()),
        price: Set(product.price),
        stock: Set(stock_to_column(product.stock)?),
        created_at: NotSet,
    };
    product_from_entity(active.update(conn).await?)
}

pub async fn set_stock(conn: &DatabaseConnection, id: Uuid, stock: u32) -> Result<Option<Product>, DbErr> {
    let Some(existing) = Products::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut active: ActiveModel = existing.into();
    active.stock = Set(stock_to_column(stock)?);
    product_from_entity(active.update(conn).await?).map(Some)
}

fn stock_to_column(stock: u32) -> Result<i32, DbErr> {
    i32::try_from(stock).map_err(|_| DbErr::Custom(format!("stock {stock} out of range")))
}

fn product_from_entity(model: ProductModel) -> Result<Product, DbErr> {
    let stock = u32::try_from(model.stock)
        .map_err(|_| DbErr::Custom(format!("negative stock for product {}", model.id)))?;
    Ok(Product {
        id: model.id,
        name: model.name,
        category: model.category,
        price: model.price,
        stock,
    })
}
