use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::instrument;

use crate::entities::tipo_cancha::{self, Entity as TipoCanchaEntity};
use crate::errors::ServiceError;

#[derive(Clone)]
pub struct TipoCanchaService {
    db: Arc<DatabaseConnection>,
}

impl TipoCanchaService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        tipo: String,
        precio: Decimal,
    ) -> Result<tipo_cancha::Model, ServiceError> {
        if tipo.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "El tipo de cancha es requerido".to_string(),
            ));
        }

        let active = tipo_cancha::ActiveModel {
            tipo: Set(tipo),
            precio: Set(precio),
            ..Default::default()
        };

        Ok(active.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<tipo_cancha::Model, ServiceError> {
        TipoCanchaEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Tipo de cancha no encontrado".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<tipo_cancha::Model>, ServiceError> {
        Ok(TipoCanchaEntity::find()
            .order_by_asc(tipo_cancha::Column::Id)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        tipo: Option<String>,
        precio: Option<Decimal>,
    ) -> Result<tipo_cancha::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut active: tipo_cancha::ActiveModel = existing.into();
        if let Some(tipo) = tipo {
            active.tipo = Set(tipo);
        }
        if let Some(precio) = precio {
            active.precio = Set(precio);
        }

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = TipoCanchaEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Tipo de cancha no encontrado".to_string(),
            ));
        }
        Ok(())
    }
}
