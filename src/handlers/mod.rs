pub mod canchas;
pub mod common;
pub mod prestamos;
pub mod productos;
pub mod reservas;
pub mod tarifas;
pub mod tipo_canchas;
pub mod usuarios;

use std::sync::Arc;

use chrono_tz::Tz;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::allocation::AllocationService;
use crate::services::availability::AvailabilityService;
use crate::services::canchas::CanchaService;
use crate::services::dashboard::DashboardService;
use crate::services::productos::ProductoService;
use crate::services::reservations::ReservationService;
use crate::services::tarifas::TarifaService;
use crate::services::tipo_canchas::TipoCanchaService;
use crate::services::usuarios::UsuarioService;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub reservations: Arc<ReservationService>,
    pub allocation: Arc<AllocationService>,
    pub dashboard: Arc<DashboardService>,
    pub canchas: Arc<CanchaService>,
    pub tipo_canchas: Arc<TipoCanchaService>,
    pub productos: Arc<ProductoService>,
    pub usuarios: Arc<UsuarioService>,
    pub tarifas: Arc<TarifaService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, tz: Tz, cfg: &AppConfig) -> Self {
        let availability = AvailabilityService::new(db_pool.clone());
        let allocation = AllocationService::new(db_pool.clone());
        let reservations = Arc::new(ReservationService::new(
            db_pool.clone(),
            availability,
            allocation.clone(),
        ));
        let dashboard = Arc::new(DashboardService::new(
            db_pool.clone(),
            tz,
            cfg.dashboard_hours_per_day,
        ));

        Self {
            reservations,
            allocation: Arc::new(allocation),
            dashboard,
            canchas: Arc::new(CanchaService::new(db_pool.clone())),
            tipo_canchas: Arc::new(TipoCanchaService::new(db_pool.clone())),
            productos: Arc::new(ProductoService::new(db_pool.clone())),
            usuarios: Arc::new(UsuarioService::new(db_pool.clone())),
            tarifas: Arc::new(TarifaService::new(db_pool)),
        }
    }
}
