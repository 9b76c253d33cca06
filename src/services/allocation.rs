//! Equipment allocation engine.
//!
//! Creates loan records when a reservation is confirmed (rule table keyed by
//! field type) and services operator-initiated loans. Every stock check and
//! its loan insert share one transaction so active loans can never exceed a
//! product's total quantity.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::entities::prestamo::{self, Entity as PrestamoEntity, EstadoPrestamo};
use crate::entities::producto::{self, Entity as ProductoEntity};
use crate::entities::reserva::{self, Entity as ReservaEntity};
use crate::entities::{cancha::Entity as CanchaEntity, tipo_cancha::Entity as TipoCanchaEntity};
use crate::errors::{ServiceError, StockShortage};

/// Product names the automatic rule table allocates.
pub const PRODUCTO_BALON: &str = "Balón";
pub const PRODUCTO_CHALECOS: &str = "Chalecos";

/// One line of required equipment for a confirmed reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRule {
    pub producto: &'static str,
    pub cantidad: i32,
}

/// Fixed per-field-type equipment rule: one vest per player, plus a single
/// ball whenever vests are due. Unknown labels get nothing.
pub fn equipment_for_tipo(tipo: &str) -> Vec<EquipmentRule> {
    let chalecos = match tipo {
        "Fútbol 11" => 11,
        "Fútbol 7" => 7,
        "Fútbol 5" => 5,
        _ => 0,
    };

    if chalecos == 0 {
        return Vec::new();
    }

    vec![
        EquipmentRule {
            producto: PRODUCTO_BALON,
            cantidad: 1,
        },
        EquipmentRule {
            producto: PRODUCTO_CHALECOS,
            cantidad: chalecos,
        },
    ]
}

/// A requirement the engine could not satisfy. Reported as a warning; the
/// reservation itself stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationFailure {
    pub producto: String,
    pub motivo: String,
}

/// Result of running the engine for one reservation.
#[derive(Debug, Default, Serialize)]
pub struct AllocationOutcome {
    pub created: Vec<prestamo::Model>,
    pub failures: Vec<AllocationFailure>,
}

/// Loan joined with its product and reservation, the shape the admin
/// frontend lists.
#[derive(Debug, Serialize)]
pub struct PrestamoDetail {
    #[serde(flatten)]
    pub prestamo: prestamo::Model,
    pub producto: Option<producto::Model>,
    pub reserva: Option<reserva::Model>,
}

/// Loan count per estado.
#[derive(Debug, Serialize)]
pub struct EstadoConteo {
    pub estado: &'static str,
    pub cantidad: u64,
}

/// Fields an operator may change on an existing loan.
#[derive(Debug, Default, Deserialize)]
pub struct PrestamoChanges {
    pub cantidad_prestada: Option<i32>,
    pub estado: Option<String>,
}

/// Sum of active loaned units for a product, optionally ignoring one loan
/// (used when editing that loan in place).
pub async fn loaned_quantity_on<C: ConnectionTrait>(
    conn: &C,
    id_producto: i32,
    exclude_prestamo: Option<i32>,
) -> Result<i32, ServiceError> {
    let mut query = PrestamoEntity::find()
        .filter(prestamo::Column::IdProducto.eq(id_producto))
        .filter(prestamo::Column::Estado.eq(EstadoPrestamo::Activo.as_str()));

    if let Some(id) = exclude_prestamo {
        query = query.filter(prestamo::Column::Id.ne(id));
    }

    let loans = query.all(conn).await?;
    Ok(loans.iter().map(|p| p.cantidad_prestada).sum())
}

#[derive(Clone)]
pub struct AllocationService {
    db: Arc<DatabaseConnection>,
}

impl AllocationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Runs the rule table for a reservation that just became confirmed.
    ///
    /// Idempotent: a reservation that already has loans is skipped, so
    /// repeated confirmations (manual update plus the background sweep)
    /// never duplicate equipment.
    #[instrument(skip(self, reserva), fields(id_reserva = reserva.id))]
    pub async fn allocate_for_reserva(
        &self,
        reserva: &reserva::Model,
    ) -> Result<AllocationOutcome, ServiceError> {
        let db = &*self.db;

        let existing = PrestamoEntity::find()
            .filter(prestamo::Column::IdReserva.eq(reserva.id))
            .count(db)
            .await?;
        if existing > 0 {
            info!(
                id_reserva = reserva.id,
                existing, "Reservation already has loans; skipping allocation"
            );
            return Ok(AllocationOutcome::default());
        }

        let cancha = CanchaEntity::find_by_id(reserva.id_cancha)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;
        let tipo = TipoCanchaEntity::find_by_id(cancha.id_tipo)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Tipo de cancha no encontrado".to_string()))?;

        let mut outcome = AllocationOutcome::default();

        for rule in equipment_for_tipo(&tipo.tipo) {
            let producto = ProductoEntity::find()
                .filter(producto::Column::NombreProducto.eq(rule.producto))
                .one(db)
                .await?;

            let Some(producto) = producto else {
                warn!(producto = rule.producto, "Product missing from inventory");
                outcome.failures.push(AllocationFailure {
                    producto: rule.producto.to_string(),
                    motivo: "no está registrado en el inventario".to_string(),
                });
                continue;
            };

            match self
                .create_loan_checked(reserva.id, &producto, rule.cantidad)
                .await?
            {
                Ok(prestamo) => outcome.created.push(prestamo),
                Err(shortage) => {
                    warn!(
                        producto = %shortage.producto,
                        disponible = shortage.disponible,
                        solicitado = shortage.solicitado,
                        "Insufficient stock during automatic allocation"
                    );
                    outcome.failures.push(AllocationFailure {
                        producto: shortage.producto.clone(),
                        motivo: shortage.reason(),
                    });
                }
            }
        }

        info!(
            id_reserva = reserva.id,
            created = outcome.created.len(),
            failures = outcome.failures.len(),
            "Equipment allocation finished"
        );

        Ok(outcome)
    }

    /// Operator-initiated loan for an arbitrary (reserva, producto, cantidad)
    /// tuple, subject to the same stock rule as automatic allocation.
    #[instrument(skip(self))]
    pub async fn create_manual_loan(
        &self,
        id_reserva: i32,
        id_producto: i32,
        cantidad: i32,
    ) -> Result<prestamo::Model, ServiceError> {
        if cantidad < 1 {
            return Err(ServiceError::ValidationError(
                "La cantidad prestada debe ser mayor a 0".to_string(),
            ));
        }

        let db = &*self.db;

        ReservaEntity::find_by_id(id_reserva)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Reserva no encontrada".to_string()))?;

        let producto = ProductoEntity::find_by_id(id_producto)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Producto no encontrado".to_string()))?;

        match self
            .create_loan_checked(id_reserva, &producto, cantidad)
            .await?
        {
            Ok(prestamo) => {
                info!(id_prestamo = prestamo.id, "Manual loan created");
                Ok(prestamo)
            }
            Err(shortage) => Err(ServiceError::StockInsufficient(shortage)),
        }
    }

    /// Stock check and insert under one transaction. Returns the shortage
    /// instead of a loan when the product cannot cover the request.
    async fn create_loan_checked(
        &self,
        id_reserva: i32,
        producto: &producto::Model,
        cantidad: i32,
    ) -> Result<Result<prestamo::Model, StockShortage>, ServiceError> {
        let txn = self.db.begin().await?;

        let prestado = loaned_quantity_on(&txn, producto.id, None).await?;
        let disponible = producto.cantidad_total - prestado;

        if cantidad > disponible {
            // Dropping the transaction rolls it back.
            return Ok(Err(StockShortage {
                producto: producto.nombre_producto.clone(),
                disponible,
                solicitado: cantidad,
                total: producto.cantidad_total,
                prestado,
            }));
        }

        let active = prestamo::ActiveModel {
            id_reserva: Set(id_reserva),
            id_producto: Set(producto.id),
            cantidad_prestada: Set(cantidad),
            estado: Set(EstadoPrestamo::Activo.as_str().to_string()),
            ..Default::default()
        };

        let model = active.insert(&txn).await?;
        txn.commit().await?;

        Ok(Ok(model))
    }

    /// Applies operator edits to a loan. Changes that grow the active
    /// footprint (quantity bump, re-activation) re-run the stock check,
    /// excluding the loan's own current usage.
    #[instrument(skip(self, changes))]
    pub async fn update_loan(
        &self,
        id: i32,
        changes: PrestamoChanges,
    ) -> Result<prestamo::Model, ServiceError> {
        let db = &*self.db;

        let existing = PrestamoEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Préstamo no encontrado".to_string()))?;

        let nuevo_estado = match &changes.estado {
            Some(raw) => EstadoPrestamo::from_str(raw).ok_or_else(|| {
                ServiceError::InvalidStatus(format!(
                    "Estado inválido: {}. Estados válidos: {:?}",
                    raw,
                    EstadoPrestamo::ALL
                ))
            })?,
            None => EstadoPrestamo::from_str(&existing.estado)
                .unwrap_or(EstadoPrestamo::Activo),
        };
        let nueva_cantidad = changes.cantidad_prestada.unwrap_or(existing.cantidad_prestada);

        if nueva_cantidad < 1 {
            return Err(ServiceError::ValidationError(
                "La cantidad prestada debe ser mayor a 0".to_string(),
            ));
        }

        if nuevo_estado == EstadoPrestamo::Activo {
            let producto = ProductoEntity::find_by_id(existing.id_producto)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Producto no encontrado".to_string()))?;

            let txn = self.db.begin().await?;
            let prestado = loaned_quantity_on(&txn, producto.id, Some(id)).await?;
            let disponible = producto.cantidad_total - prestado;
            if nueva_cantidad > disponible {
                return Err(ServiceError::StockInsufficient(StockShortage {
                    producto: producto.nombre_producto.clone(),
                    disponible,
                    solicitado: nueva_cantidad,
                    total: producto.cantidad_total,
                    prestado,
                }));
            }

            let mut active: prestamo::ActiveModel = existing.into();
            active.cantidad_prestada = Set(nueva_cantidad);
            active.estado = Set(nuevo_estado.as_str().to_string());
            let updated = active.update(&txn).await?;
            txn.commit().await?;
            return Ok(updated);
        }

        let mut active: prestamo::ActiveModel = existing.into();
        active.cantidad_prestada = Set(nueva_cantidad);
        active.estado = Set(nuevo_estado.as_str().to_string());
        let updated = active.update(db).await?;

        Ok(updated)
    }

    /// PATCH /prestamos/:id/estado — estado-only change.
    pub async fn update_loan_estado(
        &self,
        id: i32,
        estado: &str,
    ) -> Result<prestamo::Model, ServiceError> {
        self.update_loan(
            id,
            PrestamoChanges {
                cantidad_prestada: None,
                estado: Some(estado.to_string()),
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_loan(&self, id: i32) -> Result<PrestamoDetail, ServiceError> {
        let db = &*self.db;

        let (prestamo, producto) = PrestamoEntity::find_by_id(id)
            .find_also_related(ProductoEntity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Préstamo no encontrado".to_string()))?;

        let reserva = ReservaEntity::find_by_id(prestamo.id_reserva).one(db).await?;

        Ok(PrestamoDetail {
            prestamo,
            producto,
            reserva,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_loans(&self) -> Result<Vec<PrestamoDetail>, ServiceError> {
        let db = &*self.db;

        let rows = PrestamoEntity::find()
            .find_also_related(ProductoEntity)
            .order_by_desc(prestamo::Column::CreatedAt)
            .all(db)
            .await?;

        let mut details = Vec::with_capacity(rows.len());
        for (prestamo, producto) in rows {
            let reserva = ReservaEntity::find_by_id(prestamo.id_reserva).one(db).await?;
            details.push(PrestamoDetail {
                prestamo,
                producto,
                reserva,
            });
        }

        Ok(details)
    }

    /// Loan counts bucketed by estado, for the loans dashboard.
    #[instrument(skip(self))]
    pub async fn loan_stats(&self) -> Result<Vec<EstadoConteo>, ServiceError> {
        let db = &*self.db;
        let mut stats = Vec::with_capacity(EstadoPrestamo::ALL.len());

        for estado in EstadoPrestamo::ALL {
            let cantidad = PrestamoEntity::find()
                .filter(prestamo::Column::Estado.eq(estado))
                .count(db)
                .await?;
            stats.push(EstadoConteo { estado, cantidad });
        }

        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn delete_loan(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = PrestamoEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Préstamo no encontrado".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table_matches_field_types() {
        let f11 = equipment_for_tipo("Fútbol 11");
        assert_eq!(
            f11,
            vec![
                EquipmentRule {
                    producto: PRODUCTO_BALON,
                    cantidad: 1
                },
                EquipmentRule {
                    producto: PRODUCTO_CHALECOS,
                    cantidad: 11
                },
            ]
        );

        assert_eq!(equipment_for_tipo("Fútbol 7")[1].cantidad, 7);
        assert_eq!(equipment_for_tipo("Fútbol 5")[1].cantidad, 5);
    }

    #[test]
    fn unknown_tipo_allocates_nothing() {
        assert!(equipment_for_tipo("Vóley playa").is_empty());
        assert!(equipment_for_tipo("").is_empty());
    }

    #[test]
    fn ball_only_accompanies_vests() {
        for tipo in ["Fútbol 11", "Fútbol 7", "Fútbol 5"] {
            let rules = equipment_for_tipo(tipo);
            assert!(rules.iter().any(|r| r.producto == PRODUCTO_BALON && r.cantidad == 1));
        }
    }
}
