use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_tipo_canchas_table::Migration),
            Box::new(m20250901_000002_create_usuarios_table::Migration),
            Box::new(m20250901_000003_create_canchas_table::Migration),
            Box::new(m20250901_000004_create_productos_table::Migration),
            Box::new(m20250901_000005_create_reservas_table::Migration),
            Box::new(m20250901_000006_create_prestamos_table::Migration),
            Box::new(m20250901_000007_create_tarifas_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250901_000001_create_tipo_canchas_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000001_create_tipo_canchas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TipoCanchas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TipoCanchas::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(TipoCanchas::Tipo).string().not_null())
                        .col(
                            ColumnDef::new(TipoCanchas::Precio)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(TipoCanchas::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(TipoCanchas::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TipoCanchas::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum TipoCanchas {
        Table,
        Id,
        Tipo,
        Precio,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000002_create_usuarios_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000002_create_usuarios_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Usuarios::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Usuarios::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Usuarios::Nombre).string().not_null())
                        .col(
                            ColumnDef::new(Usuarios::Correo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Usuarios::Contrasena).string().not_null())
                        .col(
                            ColumnDef::new(Usuarios::Rol)
                                .string()
                                .not_null()
                                .default("cliente"),
                        )
                        .col(ColumnDef::new(Usuarios::Telefono).string().null())
                        .col(ColumnDef::new(Usuarios::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Usuarios::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Usuarios::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Usuarios {
        Table,
        Id,
        Nombre,
        Correo,
        Contrasena,
        Rol,
        Telefono,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000003_create_canchas_table {
    use sea_orm_migration::prelude::*;

    use super::m20250901_000001_create_tipo_canchas_table::TipoCanchas;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000003_create_canchas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Canchas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Canchas::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Canchas::NombreCancha).string().not_null())
                        .col(
                            ColumnDef::new(Canchas::Estado)
                                .string()
                                .not_null()
                                .default("disponible"),
                        )
                        .col(ColumnDef::new(Canchas::IdTipo).integer().not_null())
                        .col(ColumnDef::new(Canchas::Ubicacion).string().null())
                        .col(ColumnDef::new(Canchas::Capacidad).integer().null())
                        .col(ColumnDef::new(Canchas::HoraApertura).time().null())
                        .col(ColumnDef::new(Canchas::HoraCierre).time().null())
                        .col(ColumnDef::new(Canchas::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Canchas::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_canchas_id_tipo")
                                .from(Canchas::Table, Canchas::IdTipo)
                                .to(TipoCanchas::Table, TipoCanchas::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Canchas::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Canchas {
        Table,
        Id,
        NombreCancha,
        Estado,
        IdTipo,
        Ubicacion,
        Capacidad,
        HoraApertura,
        HoraCierre,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000004_create_productos_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000004_create_productos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Productos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Productos::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Productos::NombreProducto).string().not_null())
                        .col(
                            ColumnDef::new(Productos::CantidadTotal)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Productos::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Productos::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Productos::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Productos {
        Table,
        Id,
        NombreProducto,
        CantidadTotal,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000005_create_reservas_table {
    use sea_orm_migration::prelude::*;

    use super::m20250901_000002_create_usuarios_table::Usuarios;
    use super::m20250901_000003_create_canchas_table::Canchas;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000005_create_reservas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservas::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Reservas::IdCancha).integer().not_null())
                        .col(ColumnDef::new(Reservas::IdUsuario).integer().not_null())
                        .col(ColumnDef::new(Reservas::FechaReserva).date().not_null())
                        .col(ColumnDef::new(Reservas::HoraInicio).time().not_null())
                        .col(ColumnDef::new(Reservas::HoraFin).time().not_null())
                        .col(
                            ColumnDef::new(Reservas::Estado)
                                .string()
                                .not_null()
                                .default("pendiente"),
                        )
                        .col(ColumnDef::new(Reservas::Observaciones).string().null())
                        .col(ColumnDef::new(Reservas::TelefonoCliente).string().null())
                        .col(ColumnDef::new(Reservas::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Reservas::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservas_id_cancha")
                                .from(Reservas::Table, Reservas::IdCancha)
                                .to(Canchas::Table, Canchas::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservas_id_usuario")
                                .from(Reservas::Table, Reservas::IdUsuario)
                                .to(Usuarios::Table, Usuarios::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // The conflict scan reads (id_cancha, fecha_reserva, estado).
            manager
                .create_index(
                    Index::create()
                        .name("idx_reservas_cancha_fecha_estado")
                        .table(Reservas::Table)
                        .col(Reservas::IdCancha)
                        .col(Reservas::FechaReserva)
                        .col(Reservas::Estado)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reservas::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Reservas {
        Table,
        Id,
        IdCancha,
        IdUsuario,
        FechaReserva,
        HoraInicio,
        HoraFin,
        Estado,
        Observaciones,
        TelefonoCliente,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000006_create_prestamos_table {
    use sea_orm_migration::prelude::*;

    use super::m20250901_000004_create_productos_table::Productos;
    use super::m20250901_000005_create_reservas_table::Reservas;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000006_create_prestamos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Prestamos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Prestamos::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Prestamos::IdReserva).integer().not_null())
                        .col(ColumnDef::new(Prestamos::IdProducto).integer().not_null())
                        .col(
                            ColumnDef::new(Prestamos::CantidadPrestada)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Prestamos::Estado)
                                .string()
                                .not_null()
                                .default("activo"),
                        )
                        .col(ColumnDef::new(Prestamos::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Prestamos::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_prestamos_id_reserva")
                                .from(Prestamos::Table, Prestamos::IdReserva)
                                .to(Reservas::Table, Reservas::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_prestamos_id_producto")
                                .from(Prestamos::Table, Prestamos::IdProducto)
                                .to(Productos::Table, Productos::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Stock derivation sums active loans per product.
            manager
                .create_index(
                    Index::create()
                        .name("idx_prestamos_producto_estado")
                        .table(Prestamos::Table)
                        .col(Prestamos::IdProducto)
                        .col(Prestamos::Estado)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Prestamos::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Prestamos {
        Table,
        Id,
        IdReserva,
        IdProducto,
        CantidadPrestada,
        Estado,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250901_000007_create_tarifas_table {
    use sea_orm_migration::prelude::*;

    use super::m20250901_000003_create_canchas_table::Canchas;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250901_000007_create_tarifas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tarifas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tarifas::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tarifas::IdCancha).integer().not_null())
                        .col(
                            ColumnDef::new(Tarifas::Precio)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Tarifas::HoraInicio).time().not_null())
                        .col(ColumnDef::new(Tarifas::HoraFin).time().not_null())
                        .col(ColumnDef::new(Tarifas::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Tarifas::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tarifas_id_cancha")
                                .from(Tarifas::Table, Tarifas::IdCancha)
                                .to(Canchas::Table, Canchas::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tarifas::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Tarifas {
        Table,
        Id,
        IdCancha,
        Precio,
        HoraInicio,
        HoraFin,
        CreatedAt,
        UpdatedAt,
    }
}
