//! Helper harness for spinning up application state backed by an in-memory
//! SQLite database.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use golapp_api::{
    config::AppConfig,
    db::{self, DbConfig},
    handlers::AppServices,
    services::allocation::AllocationService,
    services::sweep::StatusSweep,
    AppState,
};

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );

        // A single pooled connection keeps the in-memory database alive and
        // shared for the whole test.
        let db_config = DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let db_arc = Arc::new(pool);
        let tz = cfg.facility_tz().expect("test timezone");
        let services = AppServices::new(db_arc.clone(), tz, &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };

        let router = Router::new()
            .nest("/api", golapp_api::api_routes())
            .with_state(state.clone());

        Self { router, state }
    }

    /// Fire one request through the real router.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// A sweep wired to this app's database, for injected-clock runs.
    pub fn sweep(&self, grace_secs: u64) -> StatusSweep {
        StatusSweep::new(
            self.state.db.clone(),
            AllocationService::new(self.state.db.clone()),
            self.state.config.facility_tz().unwrap(),
            grace_secs,
            3600,
        )
    }

    // ---- seeding helpers ----

    pub async fn seed_tipo(&self, tipo: &str, precio: Decimal) -> i32 {
        self.state
            .services
            .tipo_canchas
            .create(tipo.to_string(), precio)
            .await
            .expect("seed tipo_cancha")
            .id
    }

    pub async fn seed_cancha(&self, nombre: &str, id_tipo: i32) -> i32 {
        use golapp_api::entities::cancha::EstadoCancha;
        use golapp_api::services::canchas::NewCancha;

        self.state
            .services
            .canchas
            .create(NewCancha {
                nombre_cancha: nombre.to_string(),
                estado: EstadoCancha::Disponible,
                id_tipo,
                ubicacion: None,
                capacidad: None,
                hora_apertura: None,
                hora_cierre: None,
            })
            .await
            .expect("seed cancha")
            .id
    }

    pub async fn seed_usuario(&self, nombre: &str, correo: &str) -> i32 {
        use golapp_api::entities::usuario::Rol;
        use golapp_api::services::usuarios::NewUsuario;

        self.state
            .services
            .usuarios
            .create(NewUsuario {
                nombre: nombre.to_string(),
                correo: correo.to_string(),
                contrasena: "secreto123".to_string(),
                rol: Rol::Cliente,
                telefono: Some("3001234567".to_string()),
            })
            .await
            .expect("seed usuario")
            .id
    }

    pub async fn seed_producto(&self, nombre: &str, cantidad_total: i32) -> i32 {
        self.state
            .services
            .productos
            .create(nombre.to_string(), cantidad_total)
            .await
            .expect("seed producto")
            .id
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn assert_status_json(response: Response, expected: StatusCode) -> Value {
    assert_eq!(response.status(), expected, "unexpected status");
    response_json(response).await
}
