use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;
use tracing::instrument;

use crate::entities::producto::{self, Entity as ProductoEntity};
use crate::errors::ServiceError;
use crate::services::allocation::loaned_quantity_on;

/// Product plus derived stock figures.
#[derive(Debug, Serialize)]
pub struct ProductoStock {
    #[serde(flatten)]
    pub producto: producto::Model,
    pub cantidad_prestada: i32,
    pub cantidad_disponible: i32,
}

#[derive(Clone)]
pub struct ProductoService {
    db: Arc<DatabaseConnection>,
}

impl ProductoService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        nombre_producto: String,
        cantidad_total: i32,
    ) -> Result<producto::Model, ServiceError> {
        if nombre_producto.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "El nombre del producto es requerido".to_string(),
            ));
        }
        if cantidad_total < 0 {
            return Err(ServiceError::ValidationError(
                "La cantidad no puede ser negativa".to_string(),
            ));
        }

        let active = producto::ActiveModel {
            nombre_producto: Set(nombre_producto),
            cantidad_total: Set(cantidad_total),
            ..Default::default()
        };

        Ok(active.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ProductoStock, ServiceError> {
        let db = &*self.db;

        let producto = ProductoEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Producto no encontrado".to_string()))?;

        self.with_stock(producto).await
    }

    /// All products with their derived availability, the inventory screen's
    /// data source.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProductoStock>, ServiceError> {
        let productos = ProductoEntity::find()
            .order_by_asc(producto::Column::Id)
            .all(&*self.db)
            .await?;

        let mut result = Vec::with_capacity(productos.len());
        for producto in productos {
            result.push(self.with_stock(producto).await?);
        }
        Ok(result)
    }

    async fn with_stock(&self, producto: producto::Model) -> Result<ProductoStock, ServiceError> {
        let cantidad_prestada = loaned_quantity_on(&*self.db, producto.id, None).await?;
        let cantidad_disponible = producto.cantidad_total - cantidad_prestada;
        Ok(ProductoStock {
            producto,
            cantidad_prestada,
            cantidad_disponible,
        })
    }

    /// Shrinking the total below what is currently loaned out would break
    /// the stock invariant, so that edit is rejected.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        nombre_producto: Option<String>,
        cantidad_total: Option<i32>,
    ) -> Result<producto::Model, ServiceError> {
        let db = &*self.db;

        let existing = ProductoEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Producto no encontrado".to_string()))?;

        if let Some(cantidad_total) = cantidad_total {
            let prestado = loaned_quantity_on(db, id, None).await?;
            if cantidad_total < prestado {
                return Err(ServiceError::ValidationError(format!(
                    "La cantidad total ({}) no puede ser menor que las unidades prestadas ({})",
                    cantidad_total, prestado
                )));
            }
        }

        let mut active: producto::ActiveModel = existing.into();
        if let Some(nombre) = nombre_producto {
            active.nombre_producto = Set(nombre);
        }
        if let Some(cantidad) = cantidad_total {
            active.cantidad_total = Set(cantidad);
        }

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = ProductoEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Producto no encontrado".to_string()));
        }
        Ok(())
    }
}
