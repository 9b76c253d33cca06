//! User management. Passwords are stored as argon2 hashes; the login check
//! verifies against the hash and never compares plaintext.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument, warn};

use crate::entities::usuario::{self, Entity as UsuarioEntity, Rol};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct NewUsuario {
    pub nombre: String,
    pub correo: String,
    pub contrasena: String,
    pub rol: Rol,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UsuarioChanges {
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub contrasena: Option<String>,
    pub rol: Option<Rol>,
    pub telefono: Option<Option<String>>,
}

fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))
}

fn verify_password(plain: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct UsuarioService {
    db: Arc<DatabaseConnection>,
}

impl UsuarioService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, nuevo), fields(correo = %nuevo.correo))]
    pub async fn create(&self, nuevo: NewUsuario) -> Result<usuario::Model, ServiceError> {
        if nuevo.contrasena.len() < 6 {
            return Err(ServiceError::ValidationError(
                "La contraseña debe tener al menos 6 caracteres".to_string(),
            ));
        }

        let db = &*self.db;

        let duplicate = UsuarioEntity::find()
            .filter(usuario::Column::Correo.eq(nuevo.correo.clone()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::ValidationError(
                "El correo ya está registrado".to_string(),
            ));
        }

        let active = usuario::ActiveModel {
            nombre: Set(nuevo.nombre),
            correo: Set(nuevo.correo),
            contrasena: Set(hash_password(&nuevo.contrasena)?),
            rol: Set(nuevo.rol.as_str().to_string()),
            telefono: Set(nuevo.telefono),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        info!(id_usuario = model.id, "User created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<usuario::Model, ServiceError> {
        UsuarioEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<usuario::Model>, ServiceError> {
        Ok(UsuarioEntity::find()
            .order_by_asc(usuario::Column::Id)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: UsuarioChanges,
    ) -> Result<usuario::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut active: usuario::ActiveModel = existing.into();
        if let Some(nombre) = changes.nombre {
            active.nombre = Set(nombre);
        }
        if let Some(correo) = changes.correo {
            active.correo = Set(correo);
        }
        if let Some(contrasena) = changes.contrasena {
            if contrasena.len() < 6 {
                return Err(ServiceError::ValidationError(
                    "La contraseña debe tener al menos 6 caracteres".to_string(),
                ));
            }
            active.contrasena = Set(hash_password(&contrasena)?);
        }
        if let Some(rol) = changes.rol {
            active.rol = Set(rol.as_str().to_string());
        }
        if let Some(telefono) = changes.telefono {
            active.telefono = Set(telefono);
        }

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = UsuarioEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Usuario no encontrado".to_string()));
        }
        Ok(())
    }

    /// Verifies credentials against the stored hash. The same error is
    /// returned for unknown users and wrong passwords.
    #[instrument(skip(self, contrasena), fields(correo = %correo))]
    pub async fn login(
        &self,
        correo: &str,
        contrasena: &str,
    ) -> Result<usuario::Model, ServiceError> {
        let usuario = UsuarioEntity::find()
            .filter(usuario::Column::Correo.eq(correo))
            .one(&*self.db)
            .await?;

        match usuario {
            Some(usuario) if verify_password(contrasena, &usuario.contrasena) => {
                info!(id_usuario = usuario.id, "Login succeeded");
                Ok(usuario)
            }
            _ => {
                warn!("Login failed");
                Err(ServiceError::Unauthorized(
                    "Credenciales inválidas".to_string(),
                ))
            }
        }
    }
}
