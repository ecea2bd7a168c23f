use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Usuario::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Usuario::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Usuario::Nombre).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Usuario::Apellidos)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Usuario::Rut).string_len(9).not_null())
                    .col(ColumnDef::new(Usuario::FechaNacimiento).date().not_null())
                    .col(ColumnDef::new(Usuario::Cargo).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Institucion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Institucion::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Institucion::Nombre).string_len(64).not_null())
                    .col(ColumnDef::new(Institucion::Descripcion).text().not_null())
                    .col(
                        ColumnDef::new(Institucion::Direccion)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Institucion::FechaCreacion)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Proyecto::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Proyecto::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Proyecto::Nombre).string_len(64).not_null())
                    .col(ColumnDef::new(Proyecto::Descripcion).text().not_null())
                    .col(ColumnDef::new(Proyecto::FechaInicio).date().not_null())
                    .col(ColumnDef::new(Proyecto::FechaFin).date().not_null())
                    .col(ColumnDef::new(Proyecto::UsuarioId).integer().not_null())
                    .col(ColumnDef::new(Proyecto::InstitucionId).integer().not_null())
                    // NO ACTION: SQLite reports RESTRICT violations as code 1811
                    // (CONSTRAINT_TRIGGER), NO ACTION as 787 (CONSTRAINT_FOREIGNKEY)
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proyecto_usuario")
                            .from(Proyecto::Table, Proyecto::UsuarioId)
                            .to(Usuario::Table, Usuario::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proyecto_institucion")
                            .from(Proyecto::Table, Proyecto::InstitucionId)
                            .to(Institucion::Table, Institucion::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // servicio2 looks users up by rut; servicio1 and servicio4 scan projects
        manager
            .create_index(
                Index::create()
                    .name("idx_usuario_rut")
                    .table(Usuario::Table)
                    .col(Usuario::Rut)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proyecto_institucion_id")
                    .table(Proyecto::Table)
                    .col(Proyecto::InstitucionId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proyecto_usuario_id")
                    .table(Proyecto::Table)
                    .col(Proyecto::UsuarioId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proyecto_fecha_fin")
                    .table(Proyecto::Table)
                    .col(Proyecto::FechaFin)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Proyecto::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Institucion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Usuario::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Usuario {
    #[sea_orm(iden = "Usuario")]
    Table,
    Id,
    Nombre,
    Apellidos,
    Rut,
    FechaNacimiento,
    Cargo,
}

#[derive(DeriveIden)]
enum Institucion {
    #[sea_orm(iden = "Institucion")]
    Table,
    Id,
    Nombre,
    Descripcion,
    Direccion,
    FechaCreacion,
}

#[derive(DeriveIden)]
enum Proyecto {
    #[sea_orm(iden = "Proyecto")]
    Table,
    Id,
    Nombre,
    Descripcion,
    FechaInicio,
    FechaFin,
    UsuarioId,
    InstitucionId,
}
