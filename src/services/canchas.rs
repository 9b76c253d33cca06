use std::sync::Arc;

use chrono::NaiveTime;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::cancha::{self, Entity as CanchaEntity, EstadoCancha};
use crate::entities::tipo_cancha::{self, Entity as TipoCanchaEntity};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct NewCancha {
    pub nombre_cancha: String,
    pub estado: EstadoCancha,
    pub id_tipo: i32,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
    pub hora_apertura: Option<NaiveTime>,
    pub hora_cierre: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default)]
pub struct CanchaChanges {
    pub nombre_cancha: Option<String>,
    pub estado: Option<EstadoCancha>,
    pub id_tipo: Option<i32>,
    pub ubicacion: Option<Option<String>>,
    pub capacidad: Option<Option<i32>>,
    pub hora_apertura: Option<Option<NaiveTime>>,
    pub hora_cierre: Option<Option<NaiveTime>>,
}

/// Field joined with its type, the shape the booking form consumes.
#[derive(Debug, Serialize)]
pub struct CanchaDetail {
    #[serde(flatten)]
    pub cancha: cancha::Model,
    #[serde(rename = "tipoCancha")]
    pub tipo_cancha: Option<tipo_cancha::Model>,
}

#[derive(Clone)]
pub struct CanchaService {
    db: Arc<DatabaseConnection>,
}

impl CanchaService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, nueva))]
    pub async fn create(&self, nueva: NewCancha) -> Result<cancha::Model, ServiceError> {
        let db = &*self.db;

        TipoCanchaEntity::find_by_id(nueva.id_tipo)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Tipo de cancha no encontrado".to_string()))?;

        let active = cancha::ActiveModel {
            nombre_cancha: Set(nueva.nombre_cancha),
            estado: Set(nueva.estado.as_str().to_string()),
            id_tipo: Set(nueva.id_tipo),
            ubicacion: Set(nueva.ubicacion),
            capacidad: Set(nueva.capacidad),
            hora_apertura: Set(nueva.hora_apertura),
            hora_cierre: Set(nueva.hora_cierre),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        info!(id_cancha = model.id, "Field created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<CanchaDetail, ServiceError> {
        let db = &*self.db;

        let (cancha, tipo_cancha) = CanchaEntity::find_by_id(id)
            .find_also_related(TipoCanchaEntity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;

        Ok(CanchaDetail { cancha, tipo_cancha })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CanchaDetail>, ServiceError> {
        let db = &*self.db;

        let rows = CanchaEntity::find()
            .find_also_related(TipoCanchaEntity)
            .order_by_asc(cancha::Column::Id)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(cancha, tipo_cancha)| CanchaDetail { cancha, tipo_cancha })
            .collect())
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: CanchaChanges,
    ) -> Result<cancha::Model, ServiceError> {
        let db = &*self.db;

        let existing = CanchaEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;

        if let Some(id_tipo) = changes.id_tipo {
            TipoCanchaEntity::find_by_id(id_tipo)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Tipo de cancha no encontrado".to_string()))?;
        }

        let mut active: cancha::ActiveModel = existing.into();
        if let Some(nombre) = changes.nombre_cancha {
            active.nombre_cancha = Set(nombre);
        }
        if let Some(estado) = changes.estado {
            active.estado = Set(estado.as_str().to_string());
        }
        if let Some(id_tipo) = changes.id_tipo {
            active.id_tipo = Set(id_tipo);
        }
        if let Some(ubicacion) = changes.ubicacion {
            active.ubicacion = Set(ubicacion);
        }
        if let Some(capacidad) = changes.capacidad {
            active.capacidad = Set(capacidad);
        }
        if let Some(hora_apertura) = changes.hora_apertura {
            active.hora_apertura = Set(hora_apertura);
        }
        if let Some(hora_cierre) = changes.hora_cierre {
            active.hora_cierre = Set(hora_cierre);
        }

        let updated = active.update(db).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = CanchaEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Cancha no encontrada".to_string()));
        }

        info!(id_cancha = id, "Field deleted");
        Ok(())
    }
}
