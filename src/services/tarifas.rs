use std::sync::Arc;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::instrument;

use crate::entities::cancha::Entity as CanchaEntity;
use crate::entities::tarifa::{self, Entity as TarifaEntity};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct NewTarifa {
    pub id_cancha: i32,
    pub precio: Decimal,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
}

/// Legacy rate-table CRUD, kept for compatibility with existing data.
#[derive(Clone)]
pub struct TarifaService {
    db: Arc<DatabaseConnection>,
}

impl TarifaService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, nueva))]
    pub async fn create(&self, nueva: NewTarifa) -> Result<tarifa::Model, ServiceError> {
        if nueva.hora_inicio >= nueva.hora_fin {
            return Err(ServiceError::ValidationError(
                "La hora de inicio debe ser anterior a la hora de fin".to_string(),
            ));
        }

        let db = &*self.db;

        CanchaEntity::find_by_id(nueva.id_cancha)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;

        let active = tarifa::ActiveModel {
            id_cancha: Set(nueva.id_cancha),
            precio: Set(nueva.precio),
            hora_inicio: Set(nueva.hora_inicio),
            hora_fin: Set(nueva.hora_fin),
            ..Default::default()
        };

        Ok(active.insert(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<tarifa::Model, ServiceError> {
        TarifaEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Tarifa no encontrada".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<tarifa::Model>, ServiceError> {
        Ok(TarifaEntity::find()
            .order_by_asc(tarifa::Column::Id)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        precio: Option<Decimal>,
        hora_inicio: Option<NaiveTime>,
        hora_fin: Option<NaiveTime>,
    ) -> Result<tarifa::Model, ServiceError> {
        let existing = self.get(id).await?;

        let inicio = hora_inicio.unwrap_or(existing.hora_inicio);
        let fin = hora_fin.unwrap_or(existing.hora_fin);
        if inicio >= fin {
            return Err(ServiceError::ValidationError(
                "La hora de inicio debe ser anterior a la hora de fin".to_string(),
            ));
        }

        let mut active: tarifa::ActiveModel = existing.into();
        if let Some(precio) = precio {
            active.precio = Set(precio);
        }
        active.hora_inicio = Set(inicio);
        active.hora_fin = Set(fin);

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = TarifaEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Tarifa no encontrada".to_string()));
        }
        Ok(())
    }
}
